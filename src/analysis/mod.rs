//! Literal string provenance analysis.
//!
//! This module answers one question about a decoded method body: which literal
//! string does a given call receive as a given argument? The answer is recovered
//! by a linear backward walk over the instruction stream that follows local
//! variable round trips, `String.Concat` prefixes and generated resource getters.
//!
//! # Architecture
//!
//! The module is organized leaves first:
//!
//! - [`stack`] - Stack effect of single instructions
//! - [`locals`] - Nearest preceding store to a local slot
//! - [`shape`] - Classification of call targets into the few shapes that matter
//! - [`bundle`] - Resource table lookup and the per-pass cache
//! - [`resolver`] - The backward walk tying the others together
//!
//! The walk never returns an error. A shape it cannot follow, a branch target in
//! the way, a missing resource or an exhausted budget all produce
//! [`Resolution::Unresolved`], which callers treat as "not statically known".
//!
//! # Usage
//!
//! ```rust
//! use dotlint::analysis::{resolve_argument, AnalysisConfig, AnalysisContext, ResourceCache};
//! use dotlint::disassembler::BodyBuilder;
//! use dotlint::metadata::{names, CallTarget, CilAssembly};
//!
//! let concat = CallTarget::new_static(
//!     names::STRING,
//!     "Concat",
//!     &[names::STRING, names::STRING],
//!     names::STRING,
//! );
//! let write = CallTarget::new_static(
//!     "System.Diagnostics.Debug",
//!     "WriteLineIf",
//!     &[names::BOOLEAN, names::STRING],
//!     names::VOID,
//! );
//!
//! let body = BodyBuilder::new()
//!     .local(names::STRING)
//!     .ldarg(1)
//!     .ldstr("Missing Dispose() call for ")
//!     .ldloc(0)
//!     .call(concat)
//!     .call(write)
//!     .build()?;
//!
//! let assembly = CilAssembly::new("Sample");
//! let config = AnalysisConfig::default();
//! let cache = ResourceCache::new();
//! let ctx = AnalysisContext::new(&assembly, &config, &cache);
//!
//! let text = resolve_argument(&body, 4, 1, &ctx);
//! assert_eq!(text.as_str(), Some("Missing Dispose() call for "));
//! # Ok::<(), dotlint::Error>(())
//! ```

pub mod bundle;
pub mod config;
pub mod locals;
pub mod resolver;
pub mod shape;
pub mod stack;

pub use bundle::{
    lookup_resource_string, resource_table_name, AnalysisContext, ResourceCache,
    RESOURCE_TABLE_SUFFIX,
};
pub use config::AnalysisConfig;
pub use locals::{address_taken, find_store};
pub use resolver::{resolve_argument, Reason, Resolution};
pub use shape::{classify_call, CallShape, DiagnosticMethod};
pub use stack::{call_arity, stack_effect, StackEffect};
