//! Hierarchy-aware variants of the dispose debugging rules.
//!
//! In a hierarchy of disposable classes only the first class that becomes
//! disposable needs the finalizer and the debug line: derived classes override
//! `Dispose(bool)`, call the base implementation, and the base class prints the
//! message. These variants apply the base checks to that first class only.
//!
//! Classes deriving directly from a Windows Forms type are treated as that first
//! class too. Their base implements `IDisposable` but lives outside the analysed
//! assembly, and their `Dispose(bool)` override is the first one under the
//! author's control.

use crate::{
    metadata::{names, CilAssembly, MethodDef, MethodSignature, TypeDef},
    rules::{
        dispose::{check_debug_statement, is_checked_dispose, EnsureMissDispStatement},
        finalizer::{check_has_finalizer, is_checked_kind, EnsureFinalizer},
        MethodRule, RuleContext, RuleMetadata, RuleResult, TypeRule,
    },
};

/// Namespace whose types count as the root of a disposable hierarchy.
pub const WINDOWS_FORMS_NAMESPACE: &str = "System.Windows.Forms";

/// Returns true if `ty` is the first disposable class of its hierarchy.
///
/// That is a class that either derives directly from a Windows Forms type, or
/// implements `System.IDisposable` while none of its resolvable base types does.
#[must_use]
pub fn is_disposable_root(ty: &TypeDef, assembly: &CilAssembly) -> bool {
    if ty.is_interface() {
        return false;
    }

    let forms_base = ty.base.as_deref().is_some_and(|base| {
        base.rsplit_once('.')
            .is_some_and(|(ns, _)| ns == WINDOWS_FORMS_NAMESPACE)
    });
    if forms_base {
        return true;
    }

    assembly.implements(ty, names::IDISPOSABLE)
        && !assembly
            .base_types(ty)
            .into_iter()
            .any(|base| assembly.implements(base, names::IDISPOSABLE))
}

/// [`EnsureFinalizer`] restricted to disposable roots that declare `Dispose(bool)`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnsureDebugDisposeFinalizer;

impl EnsureDebugDisposeFinalizer {
    /// Rule texts.
    pub const METADATA: RuleMetadata = RuleMetadata {
        id: "EnsureDebugDisposeFinalizer",
        ..EnsureFinalizer::METADATA
    };
}

impl TypeRule for EnsureDebugDisposeFinalizer {
    fn metadata(&self) -> &RuleMetadata {
        &Self::METADATA
    }

    fn check_type(&self, ty: &TypeDef, ctx: &RuleContext<'_>) -> RuleResult {
        if !is_checked_kind(ty) || !is_disposable_root(ty, ctx.analysis.assembly) {
            return RuleResult::DoesNotApply;
        }

        if !ty.has_method(&MethodSignature::DISPOSE_BOOL) {
            return RuleResult::DoesNotApply;
        }

        check_has_finalizer(&Self::METADATA, ty, ctx)
    }
}

/// [`EnsureMissDispStatement`] restricted to the `Dispose(bool)` of disposable roots.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnsureDebugDisposeMissDispStatement;

impl EnsureDebugDisposeMissDispStatement {
    /// Rule texts.
    pub const METADATA: RuleMetadata = RuleMetadata {
        id: "EnsureDebugDisposeMissDispStatement",
        ..EnsureMissDispStatement::METADATA
    };
}

impl MethodRule for EnsureDebugDisposeMissDispStatement {
    fn metadata(&self) -> &RuleMetadata {
        &Self::METADATA
    }

    fn check_method(&self, method: &MethodDef, ctx: &RuleContext<'_>) -> RuleResult {
        if !is_checked_dispose(method) {
            return RuleResult::DoesNotApply;
        }

        let assembly = ctx.analysis.assembly;
        let Some(declaring) = assembly.type_by_name(&method.declaring_type) else {
            log::debug!(
                "{}: declaring type {} of {} not found",
                assembly.name(),
                method.declaring_type,
                method.name
            );
            return RuleResult::DoesNotApply;
        };
        if !is_disposable_root(declaring, assembly) {
            return RuleResult::DoesNotApply;
        }

        check_debug_statement(&Self::METADATA, method, ctx)
    }
}
