//! The string-producer resolver.
//!
//! Given a call instruction and one of its formal arguments, [`resolve_argument`]
//! walks backward through the body to the instruction that pushed that argument
//! and classifies it:
//!
//! - `ldstr` yields its literal.
//! - `ldloc` continues from the value stored by the nearest preceding `stloc` to the
//!   same slot, unless an `ldloca` of the slot lies between the two.
//! - A call to `System.String::Concat` continues from its *first* operand.
//! - A call to a generated resource getter yields the value of its key in the
//!   backing resource table.
//!
//! Anything else, and every situation the walk cannot model, is
//! [`Resolution::Unresolved`]. The walk is a single loop over a current query
//! `(start, depth)`: each hop replaces the query, so the call stack stays flat no
//! matter what the body looks like.
//!
//! # Finding the producer
//!
//! Arguments sit on the evaluation stack with the last one on top. The walk starts
//! with `depth`, the number of slots above the wanted argument, and visits
//! instructions backward. An instruction pushing more values than `depth` produced
//! the wanted slot; otherwise `depth` grows by what it popped and shrinks by what it
//! pushed. The walk gives up at the start of the body, at an instruction with an
//! unknown stack effect, and, unless disabled, when stepping backward over a branch
//! target, since the stack above a join point depends on the incoming edge.
//!
//! ```rust
//! use dotlint::analysis::{resolve_argument, AnalysisConfig, AnalysisContext, Resolution, ResourceCache};
//! use dotlint::disassembler::BodyBuilder;
//! use dotlint::metadata::{names, CallTarget, CilAssembly};
//!
//! let write = CallTarget::new_static(
//!     "System.Diagnostics.Debug",
//!     "WriteLineIf",
//!     &[names::BOOLEAN, names::STRING],
//!     names::VOID,
//! );
//! let body = BodyBuilder::new()
//!     .local(names::STRING)
//!     .ldstr("missing dispose")
//!     .stloc(0)
//!     .ldc_i4(1)
//!     .ldloc(0)
//!     .call(write)
//!     .ret()
//!     .build()?;
//!
//! let assembly = CilAssembly::new("Sample");
//! let config = AnalysisConfig::default();
//! let cache = ResourceCache::new();
//! let ctx = AnalysisContext::new(&assembly, &config, &cache);
//!
//! assert_eq!(
//!     resolve_argument(&body, 4, 1, &ctx),
//!     Resolution::Resolved("missing dispose".to_string())
//! );
//! # Ok::<(), dotlint::Error>(())
//! ```

use std::fmt;

use strum::{AsRefStr, Display, EnumIter};

use crate::{
    analysis::{
        bundle::AnalysisContext,
        locals::{address_taken, find_store},
        shape::{classify_call, CallShape, DiagnosticMethod},
        stack::{stack_effect, StackEffect},
    },
    disassembler::{InstrIdx, MethodBody, OpCategory},
};

/// Why a resolution gave up.
///
/// Reasons exist for logs and diagnostics; every variant means the same thing to
/// a caller: the literal could not be determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum Reason {
    /// Reached the start of the body before finding the producer
    Exhausted,
    /// Met an instruction whose stack effect is not modelled
    UnknownEffect,
    /// Would have crossed a branch target
    JoinPoint,
    /// A local load without a preceding store to the same slot
    NoStore,
    /// The local's address was taken between the store and the load
    AddressTaken,
    /// The producer is not a literal, local, concatenation or resource getter
    Unsupported,
    /// The resource table or the key is absent
    ResourceMissing,
    /// The step or hop ceiling was hit
    Budget,
    /// The queried instruction is not a call with a resolved target
    NotACall,
    /// The argument position is outside the target's formal parameters
    BadPosition,
}

/// The outcome of a resolution: a literal, or nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The literal text the argument will hold
    Resolved(String),
    /// The text could not be determined statically
    Unresolved(Reason),
}

impl Resolution {
    /// Returns true if a literal was found.
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        matches!(self, Resolution::Resolved(_))
    }

    /// The resolved text.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Resolution::Resolved(text) => Some(text),
            Resolution::Unresolved(_) => None,
        }
    }

    /// The resolved text, consuming the result.
    #[must_use]
    pub fn into_string(self) -> Option<String> {
        match self {
            Resolution::Resolved(text) => Some(text),
            Resolution::Unresolved(_) => None,
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resolution::Resolved(text) => write!(f, "\"{text}\""),
            Resolution::Unresolved(reason) => write!(f, "unresolved ({reason})"),
        }
    }
}

/// Resolve the literal passed as formal argument `argument_position` to the call
/// at `call_site`.
///
/// `argument_position` counts declared parameters from 0; the receiver of an
/// instance call is not addressable.
#[must_use]
pub fn resolve_argument(
    body: &MethodBody,
    call_site: InstrIdx,
    argument_position: usize,
    ctx: &AnalysisContext<'_>,
) -> Resolution {
    let Some(target) = body.get(call_site).and_then(|instr| instr.call_target()) else {
        return unresolved(call_site, Reason::NotACall);
    };
    let Some(depth) = slot_depth(target.params.len(), argument_position) else {
        return unresolved(call_site, Reason::BadPosition);
    };

    let mut walk = Walk {
        body,
        ctx,
        steps: 0,
        hops: 0,
    };

    let resolution = walk.run(call_site, depth);
    log::debug!(
        "argument {} of {} at {}: {}",
        argument_position,
        target,
        call_site,
        resolution
    );
    resolution
}

/// Stack slots above formal argument `position` of a call taking `param_count`
/// formals. The receiver sits below every formal and never changes the result.
fn slot_depth(param_count: usize, position: usize) -> Option<usize> {
    (position < param_count).then(|| param_count - 1 - position)
}

fn unresolved(at: InstrIdx, reason: Reason) -> Resolution {
    log::trace!("unresolved at {}: {}", at, reason);
    Resolution::Unresolved(reason)
}

struct Walk<'a, 'c> {
    body: &'a MethodBody,
    ctx: &'a AnalysisContext<'c>,
    steps: usize,
    hops: usize,
}

impl Walk<'_, '_> {
    fn run(&mut self, mut start: InstrIdx, mut depth: usize) -> Resolution {
        loop {
            let producer = match self.find_producer(start, depth) {
                Ok(producer) => producer,
                Err(reason) => return unresolved(start, reason),
            };
            let Some(instr) = self.body.get(producer) else {
                return unresolved(producer, Reason::Exhausted);
            };
            log::trace!("producer at {}: {:?}", producer, instr);

            match instr.category {
                OpCategory::PushLiteral => {
                    return match instr.string_literal() {
                        Some(text) => Resolution::Resolved(text.to_string()),
                        None => unresolved(producer, Reason::Unsupported),
                    };
                }
                OpCategory::LoadLocal => {
                    let Some(store) = find_store(self.body, producer) else {
                        return unresolved(producer, Reason::NoStore);
                    };
                    if self.ctx.config.halt_at_join_points
                        && (store + 1..=producer).any(|i| self.body.is_join_point(i))
                    {
                        return unresolved(producer, Reason::JoinPoint);
                    }
                    if instr.local_index().is_some_and(|slot| {
                        address_taken(self.body, slot, store + 1..producer)
                    }) {
                        return unresolved(producer, Reason::AddressTaken);
                    }
                    if !self.hop() {
                        return unresolved(producer, Reason::Budget);
                    }

                    // The value about to be stored is the top of the stack at the store
                    start = store;
                    depth = 0;
                }
                OpCategory::Call => {
                    let Some(target) = instr.call_target() else {
                        return unresolved(producer, Reason::Unsupported);
                    };

                    match classify_call(
                        target,
                        self.ctx.assembly,
                        &DiagnosticMethod::DEBUG_WRITE_LINE_IF,
                    ) {
                        CallShape::Concatenation => {
                            let Some(first) = slot_depth(target.params.len(), 0) else {
                                return unresolved(producer, Reason::BadPosition);
                            };
                            if !self.hop() {
                                return unresolved(producer, Reason::Budget);
                            }

                            start = producer;
                            depth = first;
                        }
                        CallShape::ResourceAccessor {
                            declaring_type,
                            key,
                        } => {
                            log::trace!("resource getter {}: key {}", declaring_type, key);
                            return match self.ctx.lookup_resource(&declaring_type, &key) {
                                Some(text) => Resolution::Resolved(text),
                                None => unresolved(producer, Reason::ResourceMissing),
                            };
                        }
                        CallShape::DiagnosticWrite | CallShape::Unrecognized => {
                            return unresolved(producer, Reason::Unsupported);
                        }
                    }
                }
                OpCategory::LoadField
                | OpCategory::StoreLocal
                | OpCategory::Branch
                | OpCategory::Other => {
                    return unresolved(producer, Reason::Unsupported);
                }
            }
        }
    }

    /// The instruction that pushed the slot `depth` positions below the top of the
    /// stack as it is right before `start` executes.
    fn find_producer(&mut self, start: InstrIdx, depth: usize) -> Result<InstrIdx, Reason> {
        let mut need = depth;
        let mut index = start;

        loop {
            if self.ctx.config.halt_at_join_points && self.body.is_join_point(index) {
                return Err(Reason::JoinPoint);
            }

            let prev = self.body.prev(index).ok_or(Reason::Exhausted)?;

            self.steps += 1;
            if self.steps > self.ctx.config.max_steps {
                log::warn!(
                    "string resolution gave up after {} steps",
                    self.ctx.config.max_steps
                );
                return Err(Reason::Budget);
            }

            let instr = self.body.get(prev).ok_or(Reason::Exhausted)?;
            match stack_effect(instr) {
                StackEffect::Known { pops, pushes } => {
                    if need < pushes {
                        return Ok(prev);
                    }
                    need = need - pushes + pops;
                }
                StackEffect::Unknown => return Err(Reason::UnknownEffect),
            }

            index = prev;
        }
    }

    /// Count one hop; false once the hop ceiling is exceeded.
    fn hop(&mut self) -> bool {
        self.hops += 1;
        if self.hops > self.ctx.config.max_depth {
            log::warn!(
                "string resolution gave up after {} hops",
                self.ctx.config.max_depth
            );
            return false;
        }
        true
    }
}
