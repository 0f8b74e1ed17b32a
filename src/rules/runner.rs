//! Apply rules to a whole assembly.
//!
//! The [`Runner`] checks every type against every registered [`TypeRule`] and
//! every method against every registered [`MethodRule`]. Checks are independent
//! and run on the rayon thread pool; they share the pass's resource cache and
//! append defects to one lock-free vector.

use std::collections::HashMap;

use rayon::prelude::*;

use crate::{
    analysis::{AnalysisConfig, AnalysisContext, ResourceCache},
    metadata::{CilAssembly, MethodDef},
    rules::{
        dispose::EnsureMissDispStatement,
        finalizer::EnsureFinalizer,
        hierarchy::{EnsureDebugDisposeFinalizer, EnsureDebugDisposeMissDispStatement},
        method_target, Defect, DisposeRuleConfig, MethodRule, RuleContext, RuleResult, TypeRule,
    },
};

/// The result of one rule on one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Identifier of the rule
    pub rule: &'static str,
    /// Full name of the type, or `Type::Method(ParamType,...)` for methods
    pub target: String,
    /// What the rule decided
    pub result: RuleResult,
}

/// Everything one run produced.
#[derive(Debug, Default, Clone)]
pub struct Report {
    /// One verdict per rule and target, types first
    pub verdicts: Vec<Verdict>,
    /// Reported defects, in no particular order
    pub defects: Vec<Defect>,
}

impl Report {
    /// The verdict of `rule` on `target`.
    ///
    /// A type can declare several methods of the same name; the first verdict
    /// recorded for the name is returned.
    #[must_use]
    pub fn result_for(&self, rule: &str, target: &str) -> Option<RuleResult> {
        self.verdicts
            .iter()
            .find(|v| v.rule == rule && v.target == target)
            .map(|v| v.result)
    }

    /// Number of verdicts equal to `result`.
    #[must_use]
    pub fn count(&self, result: RuleResult) -> usize {
        self.verdicts.iter().filter(|v| v.result == result).count()
    }

    /// Defects reported against `target`.
    pub fn defects_for<'a>(&'a self, target: &'a str) -> impl Iterator<Item = &'a Defect> + 'a {
        self.defects.iter().filter(move |d| d.target == target)
    }

    /// Number of verdicts per rule, grouped by result.
    #[must_use]
    pub fn summary(&self) -> HashMap<&'static str, HashMap<RuleResult, usize>> {
        let mut summary: HashMap<&'static str, HashMap<RuleResult, usize>> = HashMap::new();
        for verdict in &self.verdicts {
            *summary
                .entry(verdict.rule)
                .or_default()
                .entry(verdict.result)
                .or_default() += 1;
        }
        summary
    }

    /// Returns true if no rule failed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.count(RuleResult::Failure) == 0
    }
}

/// A set of rules and the settings they run with.
pub struct Runner {
    type_rules: Vec<Box<dyn TypeRule>>,
    method_rules: Vec<Box<dyn MethodRule>>,
    config: AnalysisConfig,
    dispose: DisposeRuleConfig,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// A runner without rules.
    #[must_use]
    pub fn new() -> Self {
        Runner {
            type_rules: Vec::new(),
            method_rules: Vec::new(),
            config: AnalysisConfig::default(),
            dispose: DisposeRuleConfig::default(),
        }
    }

    /// [`EnsureFinalizer`] and [`EnsureMissDispStatement`].
    #[must_use]
    pub fn with_default_rules() -> Self {
        Self::new()
            .type_rule(EnsureFinalizer)
            .method_rule(EnsureMissDispStatement)
    }

    /// [`EnsureDebugDisposeFinalizer`] and [`EnsureDebugDisposeMissDispStatement`].
    #[must_use]
    pub fn with_hierarchy_rules() -> Self {
        Self::new()
            .type_rule(EnsureDebugDisposeFinalizer)
            .method_rule(EnsureDebugDisposeMissDispStatement)
    }

    /// Register a type rule.
    #[must_use]
    pub fn type_rule(mut self, rule: impl TypeRule + 'static) -> Self {
        self.type_rules.push(Box::new(rule));
        self
    }

    /// Register a method rule.
    #[must_use]
    pub fn method_rule(mut self, rule: impl MethodRule + 'static) -> Self {
        self.method_rules.push(Box::new(rule));
        self
    }

    /// Replace the analysis settings.
    #[must_use]
    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the dispose check settings.
    #[must_use]
    pub fn dispose_config(mut self, dispose: DisposeRuleConfig) -> Self {
        self.dispose = dispose;
        self
    }

    /// Identifiers of the registered rules, type rules first.
    pub fn rule_ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.type_rules
            .iter()
            .map(|r| r.metadata().id)
            .chain(self.method_rules.iter().map(|r| r.metadata().id))
    }

    /// Check every type and method of `assembly`.
    #[must_use]
    pub fn run(&self, assembly: &CilAssembly) -> Report {
        let cache = ResourceCache::new();
        let defects = boxcar::Vec::new();
        let ctx = RuleContext::new(
            AnalysisContext::new(assembly, &self.config, &cache),
            &self.dispose,
            &defects,
        );

        let mut verdicts: Vec<Verdict> = assembly
            .types()
            .par_iter()
            .flat_map_iter(|ty| {
                self.type_rules.iter().map(move |rule| Verdict {
                    rule: rule.metadata().id,
                    target: ty.fullname(),
                    result: rule.check_type(ty, &ctx),
                })
            })
            .collect();

        let methods: Vec<&MethodDef> = assembly.methods().collect();
        verdicts.par_extend(methods.par_iter().flat_map_iter(|method| {
            self.method_rules.iter().map(move |rule| Verdict {
                rule: rule.metadata().id,
                target: method_target(method),
                result: rule.check_method(method, &ctx),
            })
        }));

        log::debug!(
            "{}: {} verdicts, {} resource tables loaded",
            assembly.name(),
            verdicts.len(),
            cache.loads()
        );

        let defects = ctx.defects().cloned().collect();
        Report { verdicts, defects }
    }
}
