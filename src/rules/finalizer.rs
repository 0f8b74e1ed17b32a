//! Disposable types declare a finalizer.
//!
//! A finalizer calling `Dispose(false)` is what makes the missing dispose debug
//! line fire for objects that were dropped without being disposed:
//!
//! ```csharp
//! class HasFinalizer : IDisposable
//! {
//! #if DEBUG
//!     ~HasFinalizer() { Dispose(false); }
//! #endif
//!     public void Dispose() { Dispose(true); GC.SuppressFinalize(this); }
//!     protected virtual void Dispose(bool disposing)
//!     {
//!         Debug.WriteLineIf(!disposing, "****** Missing Dispose() call for " + GetType().Name + ". ******");
//!     }
//! }
//! ```

use crate::{
    metadata::{names, TypeDef, TypeFlavor},
    rules::{Confidence, RuleContext, RuleMetadata, RuleResult, Severity, TypeRule},
};

/// Flags disposable types that declare no finalizer.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnsureFinalizer;

impl EnsureFinalizer {
    /// Rule texts.
    pub const METADATA: RuleMetadata = RuleMetadata {
        id: "EnsureFinalizer",
        problem: "This type implements IDisposable but doesn't have a finalizer.",
        solution: "When debugging dispose issues add a finalizer, calling Dispose(false), to trigger debug output.",
    };
}

/// Returns true for the kinds of types the finalizer checks look at.
///
/// Enums, delegates, value types and generated types are skipped. Interfaces are
/// kept.
pub(crate) fn is_checked_kind(ty: &TypeDef) -> bool {
    !matches!(
        ty.flavor,
        TypeFlavor::Enum | TypeFlavor::Delegate | TypeFlavor::ValueType
    ) && !ty.is_generated_code()
}

/// Success if `ty` declares a finalizer, otherwise report it and fail.
pub(crate) fn check_has_finalizer(
    rule: &RuleMetadata,
    ty: &TypeDef,
    ctx: &RuleContext<'_>,
) -> RuleResult {
    if ty.has_finalizer() {
        return RuleResult::Success;
    }

    ctx.report_type(rule, ty, Severity::Medium, Confidence::High);
    RuleResult::Failure
}

impl TypeRule for EnsureFinalizer {
    fn metadata(&self) -> &RuleMetadata {
        &Self::METADATA
    }

    fn check_type(&self, ty: &TypeDef, ctx: &RuleContext<'_>) -> RuleResult {
        if !is_checked_kind(ty) {
            return RuleResult::DoesNotApply;
        }

        if !ctx.analysis.assembly.implements(ty, names::IDISPOSABLE) {
            return RuleResult::DoesNotApply;
        }

        check_has_finalizer(&Self::METADATA, ty, ctx)
    }
}
