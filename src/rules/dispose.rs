//! `Dispose(bool)` writes the missing dispose debug line.

use crate::{
    analysis::{classify_call, resolve_argument, CallShape},
    metadata::{names, MethodDef, MethodSignature},
    rules::{Confidence, MethodRule, RuleContext, RuleMetadata, RuleResult, Severity},
};

/// Flags `Dispose(bool)` methods that do not emit the missing dispose line.
///
/// The expected shape is
///
/// ```csharp
/// protected virtual void Dispose(bool disposing)
/// {
///     Debug.WriteLineIf(!disposing, "****** Missing Dispose() call for " + GetType().Name + ". ******");
///     ...
/// }
/// ```
///
/// The message may be a literal, a local holding one, a concatenation starting
/// with one, or a strongly typed resource property.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnsureMissDispStatement;

impl EnsureMissDispStatement {
    /// Rule texts.
    pub const METADATA: RuleMetadata = RuleMetadata {
        id: "EnsureMissDispStatement",
        problem: "The Dispose(bool) method doesn't contain a debug output that is triggered when called from the finalizer.",
        solution: "Add a 'Missing Dispose() call' output debug statement.",
    };
}

/// Returns true if `method` is an instance `void Dispose(bool)` with a body.
pub(crate) fn is_checked_dispose(method: &MethodDef) -> bool {
    method.matches(&MethodSignature::DISPOSE_BOOL) && method.has_body() && method.has_this()
}

/// Returns true if `method` is only compiled into builds without a debug symbol.
///
/// Methods without any `[Conditional]` attribute are compiled into every build.
fn is_release_only(method: &MethodDef, ctx: &RuleContext<'_>) -> bool {
    let mut conditionals = method.attributes_of(names::CONDITIONAL_ATTRIBUTE).peekable();
    if conditionals.peek().is_none() {
        return false;
    }

    !conditionals.any(|ca| ca.first_string().is_some_and(|s| ctx.dispose.is_debug_symbol(s)))
}

/// Check the body of a `Dispose(bool)` that passed [`is_checked_dispose`].
pub(crate) fn check_debug_statement(
    rule: &RuleMetadata,
    method: &MethodDef,
    ctx: &RuleContext<'_>,
) -> RuleResult {
    let Some(body) = method.body.as_ref() else {
        return RuleResult::DoesNotApply;
    };

    if is_release_only(method, ctx) {
        log::debug!(
            "{}::{}: not compiled for a debug build",
            method.declaring_type,
            method.name
        );
        return RuleResult::Success;
    }

    if !body.has_calls() {
        ctx.report_method(rule, method, None, Severity::Medium, Confidence::High);
        return RuleResult::Failure;
    }

    let diagnostic = ctx.dispose.diagnostic();
    for (index, instr) in body.iter() {
        let Some(target) = instr.call_target() else {
            continue;
        };
        if classify_call(target, ctx.analysis.assembly, &diagnostic) != CallShape::DiagnosticWrite {
            continue;
        }
        let Some(position) = target.params.iter().position(|p| p == names::STRING) else {
            continue;
        };

        let message = resolve_argument(body, index, position, &ctx.analysis);
        log::debug!(
            "{}::{}: diagnostic message at {} is {}",
            method.declaring_type,
            method.name,
            index,
            message
        );

        if message.as_str().is_some_and(|text| ctx.dispose.accepts(text)) {
            return RuleResult::Success;
        }
        ctx.report_method(rule, method, Some(index), Severity::Medium, Confidence::Normal);
        return RuleResult::Failure;
    }

    ctx.report_method(rule, method, None, Severity::Medium, Confidence::High);
    RuleResult::Failure
}

impl MethodRule for EnsureMissDispStatement {
    fn metadata(&self) -> &RuleMetadata {
        &Self::METADATA
    }

    fn check_method(&self, method: &MethodDef, ctx: &RuleContext<'_>) -> RuleResult {
        if !is_checked_dispose(method) {
            return RuleResult::DoesNotApply;
        }

        check_debug_statement(&Self::METADATA, method, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        disassembler::BodyBuilder,
        metadata::{CilAssembly, CustomAttribute, MethodDefBuilder, MethodModifiers, TypeDefBuilder},
        test::{
            check_method, concat2, fixture_assembly, get_type, resource_assembly, strings_getter,
            write_line_if,
        },
    };

    fn dispose_with(declaring_type: &str, body: BodyBuilder) -> MethodDef {
        MethodDefBuilder::new(declaring_type, "Dispose")
            .param(names::BOOLEAN)
            .modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG)
            .body(body.build().unwrap())
            .build()
    }

    fn single(method: MethodDef, assembly: CilAssembly) -> CilAssembly {
        let (ns, name) = method
            .declaring_type
            .rsplit_once('.')
            .unwrap_or(("", method.declaring_type.as_str()));
        let ty = TypeDefBuilder::new(ns, name)
            .implements(names::IDISPOSABLE)
            .method(method)
            .build();
        assembly.with_type(ty)
    }

    #[test]
    fn without_body() {
        let (result, defects) =
            check_method(&EnsureMissDispStatement, &fixture_assembly(), "Sample.NoBody");
        assert_eq!(result, RuleResult::DoesNotApply);
        assert!(defects.is_empty());
    }

    #[test]
    fn static_dispose() {
        let (result, _) =
            check_method(&EnsureMissDispStatement, &fixture_assembly(), "Sample.StaticDispose");
        assert_eq!(result, RuleResult::DoesNotApply);
    }

    #[test]
    fn missing_statement() {
        let (result, defects) =
            check_method(&EnsureMissDispStatement, &fixture_assembly(), "Sample.MissingStatement");
        assert_eq!(result, RuleResult::Failure);
        assert_eq!(defects.len(), 1);
        assert_eq!(defects[0].target, "Sample.MissingStatement::Dispose(System.Boolean)");
        assert_eq!(defects[0].instruction, None);
    }

    #[test]
    fn with_statement() {
        let (result, defects) =
            check_method(&EnsureMissDispStatement, &fixture_assembly(), "Sample.WithStatement");
        assert_eq!(result, RuleResult::Success);
        assert!(defects.is_empty());
    }

    #[test]
    fn nonstandard_text() {
        let (result, defects) =
            check_method(&EnsureMissDispStatement, &fixture_assembly(), "Sample.NonstandardText");
        assert_eq!(result, RuleResult::Failure);
        assert_eq!(defects.len(), 1);
        assert!(defects[0].instruction.is_some());
        assert_eq!(defects[0].severity, Severity::Medium);
        assert_eq!(defects[0].confidence, Confidence::Normal);
    }

    #[test]
    fn calls_without_diagnostic_write() {
        // base.Dispose(disposing) only
        let (result, defects) =
            check_method(&EnsureMissDispStatement, &fixture_assembly(), "Sample.Derived");
        assert_eq!(result, RuleResult::Failure);
        assert_eq!(defects[0].confidence, Confidence::High);
    }

    #[test]
    fn message_from_local() {
        let method = dispose_with(
            "Sample.Local",
            BodyBuilder::new()
                .local(names::STRING)
                .ldstr("Missing Dispose() call for Local")
                .stloc(0)
                .ldarg(1)
                .ldc_i4(0)
                .ceq()
                .ldloc(0)
                .call(write_line_if())
                .ret(),
        );
        let assembly = single(method, CilAssembly::new("Sample"));
        let (result, _) = check_method(&EnsureMissDispStatement, &assembly, "Sample.Local");
        assert_eq!(result, RuleResult::Success);
    }

    #[test]
    fn message_from_resource() {
        let direct = dispose_with(
            "Sample.Localized",
            BodyBuilder::new()
                .ldarg(1)
                .ldc_i4(0)
                .ceq()
                .call(strings_getter("get_IDS_MISSING"))
                .call(write_line_if())
                .ret(),
        );
        let with_table = single(direct.clone(), resource_assembly(true));
        let (result, _) = check_method(&EnsureMissDispStatement, &with_table, "Sample.Localized");
        assert_eq!(result, RuleResult::Success);

        let without_table = single(direct, resource_assembly(false));
        let (result, defects) =
            check_method(&EnsureMissDispStatement, &without_table, "Sample.Localized");
        assert_eq!(result, RuleResult::Failure);
        assert_eq!(defects[0].instruction, Some(4));
    }

    #[test]
    fn resource_prefix_of_concatenation() {
        let method = dispose_with(
            "Sample.Localized",
            BodyBuilder::new()
                .ldarg(1)
                .ldc_i4(0)
                .ceq()
                .call(strings_getter("get_IDS_MISSING"))
                .ldstr(" for Localized")
                .call(concat2())
                .call(write_line_if())
                .ret(),
        );
        let assembly = single(method, resource_assembly(true));
        let (result, _) = check_method(&EnsureMissDispStatement, &assembly, "Sample.Localized");
        assert_eq!(result, RuleResult::Success);
    }

    #[test]
    fn conditional_compilation() {
        let body = || BodyBuilder::new().ldarg(0).call(get_type()).pop().ret();

        let release = MethodDefBuilder::new("Sample.Release", "Dispose")
            .param(names::BOOLEAN)
            .attribute(CustomAttribute::conditional("RELEASE"))
            .body(body().build().unwrap())
            .build();
        let assembly = single(release, CilAssembly::new("Sample"));
        let (result, defects) = check_method(&EnsureMissDispStatement, &assembly, "Sample.Release");
        assert_eq!(result, RuleResult::Success);
        assert!(defects.is_empty());

        let debug = MethodDefBuilder::new("Sample.Debug", "Dispose")
            .param(names::BOOLEAN)
            .attribute(CustomAttribute::conditional("RELEASE"))
            .attribute(CustomAttribute::conditional("DEBUG"))
            .body(body().build().unwrap())
            .build();
        let assembly = single(debug, CilAssembly::new("Sample"));
        let (result, _) = check_method(&EnsureMissDispStatement, &assembly, "Sample.Debug");
        assert_eq!(result, RuleResult::Failure);
    }

    #[test]
    fn no_calls_fails_without_tracing() {
        let method = dispose_with("Sample.Empty", BodyBuilder::new().nop().ret());
        let assembly = single(method, CilAssembly::new("Sample"));
        let (result, defects) = check_method(&EnsureMissDispStatement, &assembly, "Sample.Empty");
        assert_eq!(result, RuleResult::Failure);
        assert_eq!(defects.len(), 1);
    }

    #[test]
    fn release_only_without_calls() {
        let method = MethodDefBuilder::new("Sample.Release", "Dispose")
            .param(names::BOOLEAN)
            .attribute(CustomAttribute::conditional("RELEASE"))
            .body(BodyBuilder::new().nop().ret().build().unwrap())
            .build();
        let assembly = single(method, CilAssembly::new("Sample"));
        let (result, defects) = check_method(&EnsureMissDispStatement, &assembly, "Sample.Release");
        assert_eq!(result, RuleResult::Success);
        assert!(defects.is_empty());
    }

    #[test]
    fn other_signatures() {
        let (result, _) =
            check_method(&EnsureMissDispStatement, &fixture_assembly(), "Sample.WithoutDisposeBool");
        assert_eq!(result, RuleResult::DoesNotApply);
    }
}
