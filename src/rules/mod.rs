//! Dispose debugging rules.
//!
//! These rules check that code following the debug-dispose pattern can report
//! objects that were never disposed: a disposable type declares a finalizer that
//! calls `Dispose(false)`, and `Dispose(bool)` emits a
//! `Debug.WriteLineIf(!disposing, "... Missing Dispose() call ...")` line when
//! reached from it.
//!
//! # Architecture
//!
//! Rules come in two kinds, checked against every type or every method of an
//! assembly:
//!
//! - [`TypeRule`] - a check over one [`TypeDef`]
//! - [`MethodRule`] - a check over one [`MethodDef`]
//!
//! A check returns a [`RuleResult`] and reports any [`Defect`] into the
//! [`RuleContext`] it was handed. The [`runner::Runner`] applies a set of rules to
//! a whole assembly in parallel and gathers verdicts and defects into a
//! [`runner::Report`].
//!
//! # Rules
//!
//! - [`finalizer::EnsureFinalizer`] - disposable types declare a finalizer
//! - [`dispose::EnsureMissDispStatement`] - `Dispose(bool)` writes the missing
//!   dispose debug line
//! - [`hierarchy::EnsureDebugDisposeFinalizer`] and
//!   [`hierarchy::EnsureDebugDisposeMissDispStatement`] - the same two checks,
//!   restricted to the first disposable type of each hierarchy
//!
//! # Usage
//!
//! ```rust
//! use dotlint::metadata::{names, CilAssembly, MethodDefBuilder, TypeDefBuilder};
//! use dotlint::rules::{runner::Runner, RuleResult};
//!
//! let widget = TypeDefBuilder::new("Sample", "Widget")
//!     .implements(names::IDISPOSABLE)
//!     .method(MethodDefBuilder::new("Sample.Widget", "Dispose").build())
//!     .build();
//! let assembly = CilAssembly::new("Sample").with_type(widget);
//!
//! let report = Runner::with_default_rules().run(&assembly);
//! assert_eq!(
//!     report.result_for("EnsureFinalizer", "Sample.Widget"),
//!     Some(RuleResult::Failure)
//! );
//! ```

pub mod dispose;
pub mod finalizer;
pub mod hierarchy;
pub mod runner;

use std::fmt;

use strum::{AsRefStr, Display, EnumIter};

use crate::{
    analysis::{AnalysisContext, DiagnosticMethod},
    disassembler::InstrIdx,
    metadata::{MethodDef, TypeDef},
};

/// Outcome of applying one rule to one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum RuleResult {
    /// The target is outside the rule's scope
    DoesNotApply,
    /// The target was checked and conforms
    Success,
    /// The target was checked and at least one defect was reported
    Failure,
}

/// How much a defect matters.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, AsRefStr,
)]
pub enum Severity {
    /// Must be fixed
    Critical,
    /// Should be fixed
    High,
    /// Worth fixing
    Medium,
    /// Cosmetic
    Low,
    /// Needs a human to decide
    Audit,
}

/// How sure a rule is about a defect.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter, AsRefStr,
)]
pub enum Confidence {
    /// Certain
    Total,
    /// Very likely
    High,
    /// Likely
    Normal,
    /// Possible
    Low,
}

/// Descriptive texts of a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMetadata {
    /// Stable identifier, used in reports
    pub id: &'static str,
    /// What is wrong when the rule fails
    pub problem: &'static str,
    /// How to fix it
    pub solution: &'static str,
}

/// A problem reported by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Defect {
    /// Identifier of the reporting rule
    pub rule: &'static str,
    /// Full name of the offending type, or `Type::Method(ParamType,...)` for methods
    pub target: String,
    /// The offending instruction, for defects located inside a body
    pub instruction: Option<InstrIdx>,
    /// How much it matters
    pub severity: Severity,
    /// How sure the rule is
    pub confidence: Confidence,
}

impl fmt::Display for Defect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}/{}]",
            self.rule, self.target, self.severity, self.confidence
        )?;
        if let Some(index) = self.instruction {
            write!(f, " at instruction {index}")?;
        }
        Ok(())
    }
}

/// Settings of the `Dispose(bool)` debug-statement checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisposeRuleConfig {
    /// Text the diagnostic message must contain, compared case-insensitively
    pub required_text: String,
    /// Conditional compilation symbols under which `Dispose(bool)` is still checked
    pub debug_symbols: Vec<String>,
    /// Full name of the type declaring the diagnostic write
    pub diagnostic_type: String,
    /// Name of the diagnostic write
    pub diagnostic_method: String,
}

impl Default for DisposeRuleConfig {
    fn default() -> Self {
        DisposeRuleConfig {
            required_text: "missing dispose".to_string(),
            debug_symbols: vec!["DEBUG".to_string(), "TRACE".to_string()],
            diagnostic_type: "System.Diagnostics.Debug".to_string(),
            diagnostic_method: "WriteLineIf".to_string(),
        }
    }
}

impl DisposeRuleConfig {
    /// The diagnostic write, as the call classifier expects it.
    #[must_use]
    pub fn diagnostic(&self) -> DiagnosticMethod<'_> {
        DiagnosticMethod {
            declaring_type: &self.diagnostic_type,
            name: &self.diagnostic_method,
        }
    }

    /// Returns true if `symbol` is one of the debug build symbols.
    #[must_use]
    pub fn is_debug_symbol(&self, symbol: &str) -> bool {
        self.debug_symbols.iter().any(|s| s == symbol)
    }

    /// Returns true if `text` contains the required text, ignoring case.
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        !text.is_empty()
            && text
                .to_lowercase()
                .contains(&self.required_text.to_lowercase())
    }
}

/// What a rule sees while checking one target.
///
/// The context is shared by all checks of one run, across threads. Defects are
/// appended to a lock-free vector owned by the caller.
#[derive(Clone, Copy)]
pub struct RuleContext<'a> {
    /// Assembly, analysis settings and resource cache of the run
    pub analysis: AnalysisContext<'a>,
    /// Settings of the dispose checks
    pub dispose: &'a DisposeRuleConfig,
    defects: &'a boxcar::Vec<Defect>,
}

impl<'a> RuleContext<'a> {
    /// A context reporting into `defects`.
    #[must_use]
    pub fn new(
        analysis: AnalysisContext<'a>,
        dispose: &'a DisposeRuleConfig,
        defects: &'a boxcar::Vec<Defect>,
    ) -> Self {
        RuleContext {
            analysis,
            dispose,
            defects,
        }
    }

    /// Report a defect on a whole type.
    pub fn report_type(
        &self,
        rule: &RuleMetadata,
        ty: &TypeDef,
        severity: Severity,
        confidence: Confidence,
    ) {
        self.push(Defect {
            rule: rule.id,
            target: ty.fullname(),
            instruction: None,
            severity,
            confidence,
        });
    }

    /// Report a defect on a method, optionally located at one instruction.
    pub fn report_method(
        &self,
        rule: &RuleMetadata,
        method: &MethodDef,
        instruction: Option<InstrIdx>,
        severity: Severity,
        confidence: Confidence,
    ) {
        self.push(Defect {
            rule: rule.id,
            target: method_target(method),
            instruction,
            severity,
            confidence,
        });
    }

    /// Defects reported so far.
    pub fn defects(&self) -> impl Iterator<Item = &Defect> {
        (0..self.defects.count()).filter_map(|i| self.defects.get(i))
    }

    fn push(&self, defect: Defect) {
        log::debug!("{defect}");
        self.defects.push(defect);
    }
}

/// The report name of a method, `Type::Method(ParamType,...)`.
#[must_use]
pub fn method_target(method: &MethodDef) -> String {
    format!(
        "{}::{}({})",
        method.declaring_type,
        method.name,
        method.params.join(",")
    )
}

/// A check over single types.
///
/// Implementations must be thread-safe; the runner checks types in parallel.
pub trait TypeRule: Send + Sync {
    /// Identifier and descriptive texts.
    fn metadata(&self) -> &RuleMetadata;

    /// Check `ty`, reporting defects into `ctx`.
    fn check_type(&self, ty: &TypeDef, ctx: &RuleContext<'_>) -> RuleResult;
}

/// A check over single methods.
///
/// Implementations must be thread-safe; the runner checks methods in parallel.
pub trait MethodRule: Send + Sync {
    /// Identifier and descriptive texts.
    fn metadata(&self) -> &RuleMetadata;

    /// Check `method`, reporting defects into `ctx`.
    fn check_method(&self, method: &MethodDef, ctx: &RuleContext<'_>) -> RuleResult;
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn required_text_ignores_case() {
        let config = DisposeRuleConfig::default();
        assert!(config.accepts("****** Missing Dispose() call for X. ******"));
        assert!(config.accepts("MISSING DISPOSE"));
        assert!(!config.accepts("Just some gibberish"));
        assert!(!config.accepts(""));
    }

    #[test]
    fn debug_symbols() {
        let config = DisposeRuleConfig::default();
        assert!(config.is_debug_symbol("DEBUG"));
        assert!(config.is_debug_symbol("TRACE"));
        assert!(!config.is_debug_symbol("RELEASE"));
        assert!(!config.is_debug_symbol("debug"));

        let diagnostic = config.diagnostic();
        assert_eq!(diagnostic, DiagnosticMethod::DEBUG_WRITE_LINE_IF);
    }

    #[test]
    fn severity_orders_most_severe_first() {
        let all: Vec<_> = Severity::iter().collect();
        assert_eq!(all.first(), Some(&Severity::Critical));
        assert!(Severity::High < Severity::Medium);
        assert_eq!(RuleResult::DoesNotApply.as_ref(), "DoesNotApply");
    }

    #[test]
    fn defect_display() {
        let defect = Defect {
            rule: "EnsureMissDispStatement",
            target: "Sample.Widget::Dispose(System.Boolean)".to_string(),
            instruction: Some(4),
            severity: Severity::Medium,
            confidence: Confidence::Normal,
        };
        assert_eq!(
            defect.to_string(),
            "EnsureMissDispStatement: Sample.Widget::Dispose(System.Boolean) [Medium/Normal] at instruction 4"
        );
    }
}
