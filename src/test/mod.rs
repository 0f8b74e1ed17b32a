//! Shared test fixtures.
//!
//! Call targets used across the analysis tests, a generated resource class with
//! its embedded table, and an assembly holding the classic debug-dispose sample
//! types in the shapes the C# compiler emits for them.

use crate::{
    analysis::{AnalysisConfig, AnalysisContext, ResourceCache},
    disassembler::BodyBuilder,
    metadata::{
        names, resources::ResourceWriter, CallTarget, CilAssembly, CustomAttribute,
        MethodAccessFlags, MethodDef, MethodDefBuilder, MethodModifiers, MethodSignature,
        TypeDef, TypeDefBuilder,
    },
    rules::{Defect, DisposeRuleConfig, MethodRule, RuleContext, RuleResult, TypeRule},
};

/// Value of `IDS_MISSING` in the fixture resource table.
pub const IDS_MISSING_TEXT: &str = "missing dispose";

/// `static void Sample.Log::Write(string)`
pub fn sink() -> CallTarget {
    CallTarget::new_static("Sample.Log", "Write", &[names::STRING], names::VOID)
}

/// `System.Type System.Object::GetType()`
pub fn get_type() -> CallTarget {
    CallTarget::new_instance(names::OBJECT, "GetType", &[], "System.Type")
}

/// `string System.Object::ToString()`
pub fn to_string() -> CallTarget {
    CallTarget::new_instance(names::OBJECT, "ToString", &[], names::STRING)
}

/// `string System.Reflection.MemberInfo::get_Name()`
pub fn type_name() -> CallTarget {
    CallTarget::new_instance("System.Reflection.MemberInfo", "get_Name", &[], names::STRING)
}

/// `static void System.Diagnostics.Debug::WriteLineIf(bool, string)`
pub fn write_line_if() -> CallTarget {
    CallTarget::new_static(
        "System.Diagnostics.Debug",
        "WriteLineIf",
        &[names::BOOLEAN, names::STRING],
        names::VOID,
    )
}

/// `static string System.String::Concat(string, string)`
pub fn concat2() -> CallTarget {
    CallTarget::new_static(
        names::STRING,
        "Concat",
        &[names::STRING, names::STRING],
        names::STRING,
    )
}

/// `static string System.String::Concat(string, string, string)`
pub fn concat3() -> CallTarget {
    CallTarget::new_static(
        names::STRING,
        "Concat",
        &[names::STRING, names::STRING, names::STRING],
        names::STRING,
    )
}

/// A static string property getter of `Sample.Strings`.
pub fn strings_getter(name: &str) -> CallTarget {
    CallTarget::new_static("Sample.Strings", name, &[], names::STRING)
}

fn resource_getter(name: &str, key: &str) -> MethodDef {
    let resource_manager = CallTarget::new_static(
        "Sample.Strings",
        "get_ResourceManager",
        &[],
        "System.Resources.ResourceManager",
    );
    let get_string = CallTarget::new_instance(
        "System.Resources.ResourceManager",
        "GetString",
        &[names::STRING, "System.Globalization.CultureInfo"],
        names::STRING,
    );

    MethodDefBuilder::new("Sample.Strings", name)
        .returns(names::STRING)
        .access(MethodAccessFlags::ASSEM)
        .getter()
        .body(
            BodyBuilder::new()
                .call(resource_manager)
                .ldstr(key)
                .ldsfld(crate::metadata::Token::new(0x0400_0001))
                .callvirt(get_string)
                .ret()
                .build()
                .unwrap(),
        )
        .build()
}

/// An assembly with the generated resource class `Sample.Strings`.
///
/// The class exposes `IDS_MISSING` and `IDS_ABSENT`. With `with_table`, the
/// embedded `Sample.Strings.resources` maps `IDS_MISSING` to [`IDS_MISSING_TEXT`]
/// and has no `IDS_ABSENT`.
pub fn resource_assembly(with_table: bool) -> CilAssembly {
    let strings = TypeDefBuilder::new("Sample", "Strings")
        .attribute(CustomAttribute::generated_code(
            "System.Resources.Tools.StronglyTypedResourceBuilder",
            "4.0.0.0",
        ))
        .method(resource_getter("get_IDS_MISSING", "IDS_MISSING"))
        .method(resource_getter("get_IDS_ABSENT", "IDS_ABSENT"))
        .build();

    let assembly = CilAssembly::new("Sample").with_type(strings);
    if !with_table {
        return assembly;
    }

    let table = ResourceWriter::new()
        .add_string("IDS_MISSING", IDS_MISSING_TEXT)
        .add_string("IDS_OTHER", "unrelated")
        .build()
        .unwrap();
    assembly.with_resource("Sample.Strings.resources", table)
}

fn fullname(name: &str) -> String {
    format!("Sample.{name}")
}

/// `virtual` introducing a new vtable slot
fn new_virtual() -> MethodModifiers {
    MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG | MethodModifiers::NEW_SLOT
}

/// Interface implementation, `sealed virtual newslot`
fn interface_impl() -> MethodModifiers {
    new_virtual() | MethodModifiers::FINAL
}

fn dispose_bool_target(declaring_type: &str) -> CallTarget {
    CallTarget::new_instance(declaring_type, "Dispose", &[names::BOOLEAN], names::VOID)
}

/// `public void Dispose() { Dispose(true); GC.SuppressFinalize(this); }`
fn dispose(name: &str) -> MethodDef {
    let ty = fullname(name);
    let suppress =
        CallTarget::new_static("System.GC", "SuppressFinalize", &[names::OBJECT], names::VOID);

    MethodDefBuilder::new(&ty, "Dispose")
        .modifiers(interface_impl())
        .body(
            BodyBuilder::new()
                .nop()
                .ldarg(0)
                .ldc_i4(1)
                .callvirt(dispose_bool_target(&ty))
                .nop()
                .ldarg(0)
                .call(suppress)
                .nop()
                .ret()
                .build()
                .unwrap(),
        )
        .build()
}

/// `~Name() { Dispose(false); }`, wrapped in the base finalizer call.
fn finalizer(name: &str) -> MethodDef {
    let ty = fullname(name);
    let base_finalize = CallTarget::new_instance(names::OBJECT, "Finalize", &[], names::VOID);

    MethodDefBuilder::new(&ty, "Finalize")
        .access(MethodAccessFlags::FAMILY)
        .modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG)
        .body(
            BodyBuilder::new()
                .nop()
                .ldarg(0)
                .ldc_i4(0)
                .callvirt(dispose_bool_target(&ty))
                .nop()
                .ldarg(0)
                .call(base_finalize)
                .ret()
                .build()
                .unwrap(),
        )
        .build()
}

/// `protected virtual void Dispose(bool)` with `body`.
fn dispose_bool(name: &str, body: BodyBuilder) -> MethodDef {
    MethodDefBuilder::new(&fullname(name), "Dispose")
        .param(names::BOOLEAN)
        .access(MethodAccessFlags::FAMILY)
        .modifiers(new_virtual())
        .body(body.build().unwrap())
        .build()
}

/// `protected override void Dispose(bool d) { base.Dispose(d); }`
fn dispose_bool_override(name: &str, base: &str) -> MethodDef {
    MethodDefBuilder::new(&fullname(name), "Dispose")
        .param(names::BOOLEAN)
        .access(MethodAccessFlags::FAMILY)
        .modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG)
        .body(
            BodyBuilder::new()
                .nop()
                .ldarg(0)
                .ldarg(1)
                .call(dispose_bool_target(base))
                .nop()
                .ret()
                .build()
                .unwrap(),
        )
        .build()
}

fn empty_body() -> BodyBuilder {
    BodyBuilder::new().nop().ret()
}

fn constructor(name: &str, base: &str) -> MethodDef {
    MethodDefBuilder::new(&fullname(name), ".ctor")
        .modifiers(
            MethodModifiers::HIDE_BY_SIG
                | MethodModifiers::SPECIAL_NAME
                | MethodModifiers::RTSPECIAL_NAME,
        )
        .body(
            BodyBuilder::new()
                .ldarg(0)
                .call(CallTarget::new_instance(base, ".ctor", &[], names::VOID))
                .nop()
                .ret()
                .build()
                .unwrap(),
        )
        .build()
}

fn disposable(name: &str) -> TypeDefBuilder {
    TypeDefBuilder::new("Sample", name).implements(names::IDISPOSABLE)
}

fn with_statement() -> TypeDef {
    let body = BodyBuilder::new()
        .nop()
        .ldarg(1)
        .ldc_i4(0)
        .ceq()
        .ldstr("****** Missing Dispose() call for ")
        .ldarg(0)
        .call(get_type())
        .callvirt(to_string())
        .ldstr(" *******")
        .call(concat3())
        .call(write_line_if())
        .nop()
        .ret();

    disposable("WithStatement")
        .method(finalizer("WithStatement"))
        .method(dispose("WithStatement"))
        .method(dispose_bool("WithStatement", body))
        .build()
}

fn nonstandard_text() -> TypeDef {
    let body = BodyBuilder::new()
        .nop()
        .ldarg(1)
        .ldc_i4(0)
        .ceq()
        .ldstr("Just some gibberish")
        .call(write_line_if())
        .nop()
        .ret();

    disposable("NonstandardText")
        .method(dispose("NonstandardText"))
        .method(dispose_bool("NonstandardText", body))
        .build()
}

fn no_body() -> TypeDef {
    let abstract_dispose = MethodDefBuilder::new("Sample.NoBody", "Dispose")
        .param(names::BOOLEAN)
        .modifiers(new_virtual() | MethodModifiers::ABSTRACT)
        .build();

    disposable("NoBody")
        .method(dispose("NoBody"))
        .method(abstract_dispose)
        .build()
}

fn static_dispose() -> TypeDef {
    let static_dispose = MethodDefBuilder::new("Sample.StaticDispose", "Dispose")
        .param(names::BOOLEAN)
        .static_()
        .body(empty_body().build().unwrap())
        .build();

    disposable("StaticDispose")
        .method(dispose("StaticDispose"))
        .method(static_dispose)
        .build()
}

/// All sample types, in namespace `Sample`.
///
/// | Type | Shape |
/// |------|-------|
/// | `WithStatement` | finalizer, `Dispose(bool)` writes the concatenated message |
/// | `MissingStatement` | finalizer, empty `Dispose(bool)` |
/// | `NonstandardText` | `Dispose(bool)` writes an unrelated message |
/// | `NoBody` | abstract `Dispose(bool)` |
/// | `StaticDispose` | static `Dispose(bool)` |
/// | `Derived`, `DerivedDerived` | override `Dispose(bool)` and call the base |
/// | `DerivedControl`, `OtherDerivedControl` | the same over Windows Forms bases |
/// | `A`, `DisposableA` | disposable class over a plain base, empty `Dispose(bool)` |
/// | `NonDisposable` | `Dispose(bool)` without `IDisposable` |
/// | `WithFinalizer`, `WithDisposeNoFinalizer` | empty `Dispose(bool)`, with and without finalizer |
/// | `WithoutDispose` | plain class |
/// | `WithoutDisposeBool` | `IDisposable` with `Dispose()` only |
/// | `Interface` | interface extending `IDisposable` |
pub fn fixture_assembly() -> CilAssembly {
    let types = [
        with_statement(),
        disposable("MissingStatement")
            .method(finalizer("MissingStatement"))
            .method(dispose("MissingStatement"))
            .method(dispose_bool("MissingStatement", empty_body()))
            .build(),
        nonstandard_text(),
        no_body(),
        static_dispose(),
        TypeDefBuilder::new("Sample", "Derived")
            .base("Sample.WithStatement")
            .method(dispose_bool_override("Derived", "Sample.WithStatement"))
            .build(),
        TypeDefBuilder::new("Sample", "DerivedDerived")
            .base("Sample.Derived")
            .method(dispose_bool_override("DerivedDerived", "Sample.Derived"))
            .build(),
        TypeDefBuilder::new("Sample", "DerivedControl")
            .base("System.Windows.Forms.Control")
            .method(dispose_bool_override("DerivedControl", "System.Windows.Forms.Control"))
            .build(),
        TypeDefBuilder::new("Sample", "OtherDerivedControl")
            .base("System.Windows.Forms.DataGridViewColumn")
            .method(dispose_bool_override(
                "OtherDerivedControl",
                "System.Windows.Forms.DataGridViewColumn",
            ))
            .build(),
        TypeDefBuilder::new("Sample", "A")
            .method(constructor("A", names::OBJECT))
            .build(),
        disposable("DisposableA")
            .base("Sample.A")
            .method(dispose("DisposableA"))
            .method(dispose_bool("DisposableA", empty_body()))
            .build(),
        TypeDefBuilder::new("Sample", "NonDisposable")
            .method(
                MethodDefBuilder::new("Sample.NonDisposable", "Dispose")
                    .param(names::BOOLEAN)
                    .body(empty_body().build().unwrap())
                    .build(),
            )
            .build(),
        disposable("WithFinalizer")
            .method(constructor("WithFinalizer", names::OBJECT))
            .method(finalizer("WithFinalizer"))
            .method(dispose("WithFinalizer"))
            .method(dispose_bool("WithFinalizer", empty_body()))
            .build(),
        disposable("WithDisposeNoFinalizer")
            .method(constructor("WithDisposeNoFinalizer", names::OBJECT))
            .method(dispose("WithDisposeNoFinalizer"))
            .method(dispose_bool("WithDisposeNoFinalizer", empty_body()))
            .build(),
        TypeDefBuilder::new("Sample", "WithoutDispose")
            .method(constructor("WithoutDispose", names::OBJECT))
            .build(),
        disposable("WithoutDisposeBool")
            .method(
                MethodDefBuilder::new("Sample.WithoutDisposeBool", "Dispose")
                    .modifiers(interface_impl())
                    .body(empty_body().build().unwrap())
                    .build(),
            )
            .build(),
        TypeDefBuilder::interface("Sample", "Interface")
            .implements(names::IDISPOSABLE)
            .build(),
    ];

    types
        .into_iter()
        .fold(CilAssembly::new("Sample"), CilAssembly::with_type)
}

/// Run `rule` on the type `type_name` of `assembly` with default settings.
pub fn check_type(
    rule: &impl TypeRule,
    assembly: &CilAssembly,
    type_name: &str,
) -> (RuleResult, Vec<Defect>) {
    let ty = assembly.type_by_name(type_name).unwrap();
    with_context(assembly, |ctx| rule.check_type(ty, ctx))
}

/// Run `rule` on the `Dispose(bool)` of `type_name`, or on its first `Dispose`.
pub fn check_method(
    rule: &impl MethodRule,
    assembly: &CilAssembly,
    type_name: &str,
) -> (RuleResult, Vec<Defect>) {
    let ty = assembly.type_by_name(type_name).unwrap();
    let method = ty
        .find_method(&MethodSignature::DISPOSE_BOOL)
        .or_else(|| ty.methods.iter().find(|m| m.name == "Dispose"))
        .unwrap();
    with_context(assembly, |ctx| rule.check_method(method, ctx))
}

fn with_context(
    assembly: &CilAssembly,
    check: impl FnOnce(&RuleContext<'_>) -> RuleResult,
) -> (RuleResult, Vec<Defect>) {
    let config = AnalysisConfig::default();
    let cache = ResourceCache::new();
    let dispose = DisposeRuleConfig::default();
    let defects = boxcar::Vec::new();
    let ctx = RuleContext::new(
        AnalysisContext::new(assembly, &config, &cache),
        &dispose,
        &defects,
    );

    let result = check(&ctx);
    let reported = ctx.defects().cloned().collect();
    (result, reported)
}
