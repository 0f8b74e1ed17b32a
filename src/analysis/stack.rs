//! Stack effect of single instructions.
//!
//! The backward walk counts evaluation stack slots rather than instructions, so
//! every visited instruction has to say how many slots it consumes and produces.
//! Fixed-arity opcodes take the numbers from the opcode table; call-like opcodes
//! derive them from the resolved [`crate::metadata::CallTarget`]. Everything the
//! walk cannot model soundly reports [`StackEffect::Unknown`] and stops it.

use crate::disassembler::{Instruction, OpCategory, StackBehavior};

/// How an instruction changes the evaluation stack depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackEffect {
    /// Consumes `pops` slots, then produces `pushes` slots
    Known {
        /// Slots consumed
        pops: usize,
        /// Slots produced
        pushes: usize,
    },
    /// Not modelled; a walk reaching this instruction fails closed
    Unknown,
}

impl StackEffect {
    /// Pushes minus pops, `None` for [`StackEffect::Unknown`].
    #[must_use]
    pub fn net(&self) -> Option<isize> {
        match self {
            StackEffect::Known { pops, pushes } => {
                let pushes = isize::try_from(*pushes).ok()?;
                let pops = isize::try_from(*pops).ok()?;
                Some(pushes - pops)
            }
            StackEffect::Unknown => None,
        }
    }

    /// Returns true for [`StackEffect::Known`].
    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, StackEffect::Known { .. })
    }
}

/// The stack effect of `instr`.
///
/// - `call`/`callvirt` pop every argument including the receiver and push one
///   value unless the target returns `System.Void`.
/// - `newobj` pops only the formal arguments and pushes the new object.
/// - Instructions of the [`OpCategory::Branch`] category are unknown: the walk
///   never steps over control transfers.
/// - A call whose target could not be resolved is unknown.
#[must_use]
pub fn stack_effect(instr: &Instruction) -> StackEffect {
    if instr.category == OpCategory::Branch {
        return StackEffect::Unknown;
    }

    match instr.stack {
        StackBehavior::Fixed { pops, pushes } => StackEffect::Known {
            pops: usize::from(pops),
            pushes: usize::from(pushes),
        },
        StackBehavior::Varies => {
            let Some(target) = instr.call_target() else {
                return StackEffect::Unknown;
            };

            if instr.is_constructor_call() {
                StackEffect::Known {
                    pops: target.params.len(),
                    pushes: 1,
                }
            } else {
                StackEffect::Known {
                    pops: target.arg_count(),
                    pushes: usize::from(target.returns_value()),
                }
            }
        }
        StackBehavior::Unknown => StackEffect::Unknown,
    }
}

/// Number of stack values the call at `instr` consumes, receiver included.
///
/// `None` if `instr` is not a call with a resolved target.
#[must_use]
pub fn call_arity(instr: &Instruction) -> Option<usize> {
    match stack_effect(instr) {
        StackEffect::Known { pops, .. } if instr.is_call() => Some(pops),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        disassembler::{BodyBuilder, Operand},
        metadata::{names, CallTarget, Token},
    };

    fn concat() -> CallTarget {
        CallTarget::new_static(
            names::STRING,
            "Concat",
            &[names::STRING, names::STRING],
            names::STRING,
        )
    }

    #[test]
    fn fixed_effects() {
        let body = BodyBuilder::new()
            .ldstr("a")
            .stloc(0)
            .ldloc(0)
            .dup()
            .pop()
            .ceq()
            .nop()
            .build()
            .unwrap();

        let effects: Vec<_> = body
            .instructions()
            .iter()
            .map(|i| stack_effect(i).net())
            .collect();
        assert_eq!(
            effects,
            vec![Some(1), Some(-1), Some(1), Some(1), Some(-1), Some(-1), Some(0)]
        );
    }

    #[test]
    fn call_effects() {
        let to_string = CallTarget::new_instance(names::OBJECT, "ToString", &[], names::STRING);
        let write = CallTarget::new_static(
            "System.Diagnostics.Debug",
            "WriteLineIf",
            &[names::BOOLEAN, names::STRING],
            names::VOID,
        );
        let ctor = CallTarget::new_instance(
            "System.Text.StringBuilder",
            ".ctor",
            &[names::STRING],
            names::VOID,
        );

        let body = BodyBuilder::new()
            .call(concat())
            .callvirt(to_string)
            .call(write)
            .newobj(ctor)
            .build()
            .unwrap();
        let instrs = body.instructions();

        assert_eq!(stack_effect(&instrs[0]), StackEffect::Known { pops: 2, pushes: 1 });
        assert_eq!(stack_effect(&instrs[1]), StackEffect::Known { pops: 1, pushes: 1 });
        assert_eq!(stack_effect(&instrs[2]), StackEffect::Known { pops: 2, pushes: 0 });
        assert_eq!(stack_effect(&instrs[3]), StackEffect::Known { pops: 1, pushes: 1 });
        assert_eq!(call_arity(&instrs[2]), Some(2));
    }

    #[test]
    fn unknown_effects() {
        let body = BodyBuilder::new()
            .label("top")
            .ret()
            .br("top")
            .raw(0, crate::disassembler::opcodes::CALL, Operand::Token(Token::new(0x0A00_0001)))
            .build()
            .unwrap();
        let instrs = body.instructions();

        assert_eq!(stack_effect(&instrs[0]), StackEffect::Unknown);
        assert_eq!(stack_effect(&instrs[1]), StackEffect::Unknown);
        assert_eq!(stack_effect(&instrs[2]), StackEffect::Unknown);
        assert!(!stack_effect(&instrs[2]).is_known());
        assert_eq!(stack_effect(&instrs[2]).net(), None);
        assert_eq!(call_arity(&instrs[2]), None);
    }
}
