//! Analysis configuration
//!
//! This module provides the ceilings and switches of the backward string tracer
//! and of the resource bundle lookup.

/// Configuration for one analysis pass
///
/// The tracer itself has no failure mode other than "unresolved"; these limits
/// only decide how early it gives up on large or adversarial bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Maximum number of instructions visited by one resolution (default: 4096)
    pub max_steps: usize,

    /// Maximum number of hops through local stores and concatenations (default: 64)
    pub max_depth: usize,

    /// Refuse to walk backward across a branch target (default: true)
    /// With this disabled, a join point is treated like straight-line code
    pub halt_at_join_points: bool,

    /// Keep parsed resource tables for the rest of the pass (default: true)
    pub cache_resources: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            max_steps: 4096,
            max_depth: 64,
            halt_at_join_points: true,
            cache_resources: true,
        }
    }
}

impl AnalysisConfig {
    /// Creates a configuration with small ceilings
    ///
    /// Suited for untrusted input where worst-case work matters more than recall.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            max_steps: 256,
            max_depth: 8,
            halt_at_join_points: true,
            cache_resources: true,
        }
    }

    /// Creates a configuration with large ceilings
    ///
    /// **Warning**: walking across join points may report a literal that only one of
    /// several incoming paths produces.
    #[must_use]
    pub fn permissive() -> Self {
        Self {
            max_steps: 1 << 20,
            max_depth: 1024,
            halt_at_join_points: false,
            cache_resources: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_config_presets() {
        let default = AnalysisConfig::default();
        assert_eq!(default.max_steps, 4096);
        assert_eq!(default.max_depth, 64);
        assert!(default.halt_at_join_points);
        assert!(default.cache_resources);

        let strict = AnalysisConfig::strict();
        assert!(strict.max_steps < default.max_steps);
        assert!(strict.max_depth < default.max_depth);
        assert!(strict.halt_at_join_points);

        let permissive = AnalysisConfig::permissive();
        assert!(permissive.max_steps > default.max_steps);
        assert!(!permissive.halt_at_join_points);
    }
}
