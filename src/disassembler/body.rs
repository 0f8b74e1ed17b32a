//! Method bodies as an indexable instruction arena.
//!
//! A [`MethodBody`] owns its instructions in a `Vec` and addresses them by
//! [`InstrIdx`]. Neighbor navigation is index arithmetic, so a backward walk is
//! naturally bounds-checked: [`MethodBody::prev`] of the first instruction is `None`.
//!
//! The body also records which indices are reached by a branch (join points) and
//! whether any call instruction is present at all, both computed once on
//! construction.

use std::collections::BTreeSet;

use super::{
    instruction::{InstrIdx, Instruction, OpCategory},
    opcodes::CALLI,
};

/// A declared local variable slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalSlot {
    /// Slot index as used by `ldloc`/`stloc`
    pub index: u16,
    /// Full name of the declared type
    pub type_name: String,
}

impl LocalSlot {
    /// Create a new local slot description.
    #[must_use]
    pub fn new(index: u16, type_name: impl Into<String>) -> Self {
        LocalSlot {
            index,
            type_name: type_name.into(),
        }
    }
}

/// An immutable, ordered sequence of instructions plus the local slot table.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodBody {
    instructions: Vec<Instruction>,
    locals: Vec<LocalSlot>,
    branch_targets: BTreeSet<InstrIdx>,
    has_calls: bool,
}

impl MethodBody {
    /// Build a body from decoded instructions.
    ///
    /// Branch operands must already be instruction indices.
    #[must_use]
    pub fn new(instructions: Vec<Instruction>, locals: Vec<LocalSlot>) -> Self {
        let branch_targets = instructions
            .iter()
            .flat_map(Instruction::targets)
            .collect();
        let has_calls = instructions.iter().any(|instr| {
            instr.category == OpCategory::Call || (instr.prefix == 0 && instr.opcode == CALLI)
        });

        MethodBody {
            instructions,
            locals,
            branch_targets,
            has_calls,
        }
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    /// Returns true if the body holds no instructions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// The instruction at `index`.
    #[must_use]
    pub fn get(&self, index: InstrIdx) -> Option<&Instruction> {
        self.instructions.get(index)
    }

    /// All instructions in order.
    #[must_use]
    pub fn instructions(&self) -> &[Instruction] {
        &self.instructions
    }

    /// Iterate over `(index, instruction)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (InstrIdx, &Instruction)> {
        self.instructions.iter().enumerate()
    }

    /// The preceding instruction index.
    #[must_use]
    pub fn prev(&self, index: InstrIdx) -> Option<InstrIdx> {
        if index == 0 || index > self.instructions.len() {
            None
        } else {
            Some(index - 1)
        }
    }

    /// The following instruction index.
    #[must_use]
    pub fn next(&self, index: InstrIdx) -> Option<InstrIdx> {
        let next = index.checked_add(1)?;
        (next < self.instructions.len()).then_some(next)
    }

    /// The declared local slots.
    #[must_use]
    pub fn locals(&self) -> &[LocalSlot] {
        &self.locals
    }

    /// The declared local with slot index `index`.
    #[must_use]
    pub fn local(&self, index: u16) -> Option<&LocalSlot> {
        self.locals.iter().find(|slot| slot.index == index)
    }

    /// Indices that some branch instruction can jump to.
    #[must_use]
    pub fn branch_targets(&self) -> &BTreeSet<InstrIdx> {
        &self.branch_targets
    }

    /// Returns true if control can reach `index` from somewhere other than `index - 1`.
    #[must_use]
    pub fn is_join_point(&self, index: InstrIdx) -> bool {
        self.branch_targets.contains(&index)
    }

    /// Returns true if the body contains at least one call instruction.
    ///
    /// `calli` counts even though its target is not known statically.
    #[must_use]
    pub fn has_calls(&self) -> bool {
        self.has_calls
    }

    /// The formal argument types of the call at `index`, in declaration order.
    ///
    /// The implicit receiver of an instance call is not part of the list. Returns
    /// `None` if `index` is not a call with a resolved target.
    #[must_use]
    pub fn call_arguments(&self, index: InstrIdx) -> Option<&[String]> {
        self.get(index)?
            .call_target()
            .map(|target| target.params.as_slice())
    }

    /// The text of the first `ldstr` in the body.
    #[must_use]
    pub fn first_string_literal(&self) -> Option<&str> {
        self.instructions
            .iter()
            .find_map(Instruction::string_literal)
    }
}
