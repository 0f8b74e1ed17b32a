//! Fluent assembler producing [`MethodBody`] values without raw bytes.
//!
//! [`BodyBuilder`] picks the shortest encoding for local, argument and integer
//! operands, the way a compiler would, and tracks byte offsets so the produced
//! instructions look exactly like decoded ones. Branches name their targets with
//! string labels that are resolved when the body is built.
//!
//! ```rust
//! use dotlint::disassembler::BodyBuilder;
//! use dotlint::metadata::{names, CallTarget};
//!
//! let write = CallTarget::new_static(
//!     "System.Diagnostics.Debug",
//!     "WriteLineIf",
//!     &[names::BOOLEAN, names::STRING],
//!     names::VOID,
//! );
//!
//! let body = BodyBuilder::new()
//!     .ldc_i4(1)
//!     .ldstr("missing dispose")
//!     .call(write)
//!     .ret()
//!     .build()?;
//!
//! assert_eq!(body.len(), 4);
//! assert_eq!(body.get(1).unwrap().offset, 1);
//! # Ok::<(), dotlint::Error>(())
//! ```

use std::{collections::HashMap, sync::Arc};

use super::{
    body::{LocalSlot, MethodBody},
    instruction::{Immediate, InstrIdx, Instruction, Operand, OperandType},
    instructions::lookup,
    opcodes,
};
use crate::{
    metadata::{signatures::CallTarget, token::Token},
    Error, Result,
};

enum Fixup {
    Single(InstrIdx, String),
    Switch(InstrIdx, Vec<String>),
}

/// Builds a [`MethodBody`] instruction by instruction.
#[derive(Default)]
pub struct BodyBuilder {
    instructions: Vec<Instruction>,
    locals: Vec<LocalSlot>,
    labels: HashMap<String, InstrIdx>,
    fixups: Vec<Fixup>,
    offset: u32,
    error: Option<Error>,
}

impl BodyBuilder {
    /// Start an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare the next local slot with the given type.
    #[must_use]
    pub fn local(mut self, type_name: &str) -> Self {
        let index = u16::try_from(self.locals.len()).unwrap_or(u16::MAX);
        self.locals.push(LocalSlot::new(index, type_name));
        self
    }

    /// Mark the position of the next emitted instruction with `name`.
    #[must_use]
    pub fn label(mut self, name: &str) -> Self {
        if self
            .labels
            .insert(name.to_string(), self.instructions.len())
            .is_some()
        {
            self.fail(malformed_error!("Label defined twice - {}", name));
        }
        self
    }

    /// Emit an arbitrary opcode with a pre-built operand.
    #[must_use]
    pub fn raw(mut self, prefix: u8, opcode: u8, operand: Operand) -> Self {
        self.emit(prefix, opcode, operand, 0);
        self
    }

    /// `nop`
    #[must_use]
    pub fn nop(self) -> Self {
        self.raw(0, opcodes::NOP, Operand::None)
    }

    /// `ldarg` in its shortest form.
    #[must_use]
    pub fn ldarg(self, index: u16) -> Self {
        match index {
            0..=3 => {
                // Fits: index is at most 3
                #[allow(clippy::cast_possible_truncation)]
                let opcode = opcodes::LDARG_0 + index as u8;
                self.raw(0, opcode, Operand::Argument(index))
            }
            4..=255 => self.raw(0, opcodes::LDARG_S, Operand::Argument(index)),
            _ => self.raw(opcodes::FE_PREFIX, opcodes::FE_LDARG, Operand::Argument(index)),
        }
    }

    /// `ldloc` in its shortest form.
    #[must_use]
    pub fn ldloc(self, index: u16) -> Self {
        match index {
            0..=3 => {
                #[allow(clippy::cast_possible_truncation)]
                let opcode = opcodes::LDLOC_0 + index as u8;
                self.raw(0, opcode, Operand::Local(index))
            }
            4..=255 => self.raw(0, opcodes::LDLOC_S, Operand::Local(index)),
            _ => self.raw(opcodes::FE_PREFIX, opcodes::FE_LDLOC, Operand::Local(index)),
        }
    }

    /// `stloc` in its shortest form.
    #[must_use]
    pub fn stloc(self, index: u16) -> Self {
        match index {
            0..=3 => {
                #[allow(clippy::cast_possible_truncation)]
                let opcode = opcodes::STLOC_0 + index as u8;
                self.raw(0, opcode, Operand::Local(index))
            }
            4..=255 => self.raw(0, opcodes::STLOC_S, Operand::Local(index)),
            _ => self.raw(opcodes::FE_PREFIX, opcodes::FE_STLOC, Operand::Local(index)),
        }
    }

    /// `ldloca` in its shortest form.
    #[must_use]
    pub fn ldloca(self, index: u16) -> Self {
        if index <= 255 {
            self.raw(0, opcodes::LDLOCA_S, Operand::Local(index))
        } else {
            self.raw(opcodes::FE_PREFIX, opcodes::FE_LDLOCA, Operand::Local(index))
        }
    }

    /// `ldstr`
    #[must_use]
    pub fn ldstr(self, text: &str) -> Self {
        self.raw(0, opcodes::LDSTR, Operand::String(Arc::from(text)))
    }

    /// `ldnull`
    #[must_use]
    pub fn ldnull(self) -> Self {
        self.raw(0, opcodes::LDNULL, Operand::None)
    }

    /// `ldc.i4` in its shortest form.
    #[must_use]
    pub fn ldc_i4(self, value: i32) -> Self {
        match value {
            -1..=8 => {
                // Fits: value + 1 is in 0..=9
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let opcode = opcodes::LDC_I4_M1 + (value + 1) as u8;
                self.raw(0, opcode, Operand::Immediate(Immediate::Int32(value)))
            }
            _ => match i8::try_from(value) {
                Ok(short) => self.raw(
                    0,
                    opcodes::LDC_I4_S,
                    Operand::Immediate(Immediate::Int8(short)),
                ),
                Err(_) => self.raw(
                    0,
                    opcodes::LDC_I4,
                    Operand::Immediate(Immediate::Int32(value)),
                ),
            },
        }
    }

    /// `ldfld`
    #[must_use]
    pub fn ldfld(self, field: Token) -> Self {
        self.raw(0, opcodes::LDFLD, Operand::Field(field))
    }

    /// `ldsfld`
    #[must_use]
    pub fn ldsfld(self, field: Token) -> Self {
        self.raw(0, opcodes::LDSFLD, Operand::Field(field))
    }

    /// `stfld`
    #[must_use]
    pub fn stfld(self, field: Token) -> Self {
        self.raw(0, opcodes::STFLD, Operand::Field(field))
    }

    /// `call`
    #[must_use]
    pub fn call(self, target: CallTarget) -> Self {
        self.raw(0, opcodes::CALL, Operand::Call(Arc::new(target)))
    }

    /// `callvirt`
    #[must_use]
    pub fn callvirt(self, target: CallTarget) -> Self {
        self.raw(0, opcodes::CALLVIRT, Operand::Call(Arc::new(target)))
    }

    /// `newobj`; `target` is the constructor.
    #[must_use]
    pub fn newobj(self, target: CallTarget) -> Self {
        self.raw(0, opcodes::NEWOBJ, Operand::Call(Arc::new(target)))
    }

    /// `box`
    #[must_use]
    pub fn box_(self, type_token: Token) -> Self {
        self.raw(0, opcodes::BOX, Operand::Token(type_token))
    }

    /// `dup`
    #[must_use]
    pub fn dup(self) -> Self {
        self.raw(0, opcodes::DUP, Operand::None)
    }

    /// `pop`
    #[must_use]
    pub fn pop(self) -> Self {
        self.raw(0, opcodes::POP, Operand::None)
    }

    /// `add`
    #[must_use]
    pub fn add(self) -> Self {
        self.raw(0, opcodes::ADD, Operand::None)
    }

    /// `ceq`
    #[must_use]
    pub fn ceq(self) -> Self {
        self.raw(opcodes::FE_PREFIX, opcodes::FE_CEQ, Operand::None)
    }

    /// `br` to `label`
    #[must_use]
    pub fn br(self, label: &str) -> Self {
        self.branch(opcodes::BR, label)
    }

    /// `brtrue` to `label`
    #[must_use]
    pub fn brtrue(self, label: &str) -> Self {
        self.branch(opcodes::BRTRUE, label)
    }

    /// `brfalse` to `label`
    #[must_use]
    pub fn brfalse(self, label: &str) -> Self {
        self.branch(opcodes::BRFALSE, label)
    }

    /// `switch` over `labels`
    #[must_use]
    pub fn switch(mut self, labels: &[&str]) -> Self {
        let index = self.instructions.len();
        self.fixups.push(Fixup::Switch(
            index,
            labels.iter().map(|l| (*l).to_string()).collect(),
        ));
        let placeholder = Operand::Switch(vec![0; labels.len()]);
        self.emit(0, opcodes::SWITCH, placeholder, labels.len());
        self
    }

    /// `ret`
    #[must_use]
    pub fn ret(self) -> Self {
        self.raw(0, opcodes::RET, Operand::None)
    }

    /// `throw`
    #[must_use]
    pub fn throw(self) -> Self {
        self.raw(0, opcodes::THROW, Operand::None)
    }

    /// Resolve labels and produce the body.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if a branch names an undefined label, a
    /// label is defined twice, or an opcode has no table entry.
    pub fn build(mut self) -> Result<MethodBody> {
        if let Some(error) = self.error.take() {
            return Err(error);
        }

        for fixup in std::mem::take(&mut self.fixups) {
            match fixup {
                Fixup::Single(index, label) => {
                    let target = self.resolve(&label)?;
                    self.instructions[index].operand = Operand::Target(target);
                }
                Fixup::Switch(index, labels) => {
                    let targets = labels
                        .iter()
                        .map(|label| self.resolve(label))
                        .collect::<Result<Vec<_>>>()?;
                    self.instructions[index].operand = Operand::Switch(targets);
                }
            }
        }

        Ok(MethodBody::new(self.instructions, self.locals))
    }

    fn resolve(&self, label: &str) -> Result<InstrIdx> {
        match self.labels.get(label) {
            Some(index) => Ok(*index),
            None => Err(malformed_error!("Undefined label - {}", label)),
        }
    }

    fn branch(mut self, opcode: u8, label: &str) -> Self {
        let index = self.instructions.len();
        self.fixups.push(Fixup::Single(index, label.to_string()));
        self.emit(0, opcode, Operand::Target(0), 0);
        self
    }

    fn fail(&mut self, error: Error) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn emit(&mut self, prefix: u8, opcode: u8, operand: Operand, switch_cases: usize) {
        let Some(info) = lookup(prefix, opcode) else {
            self.fail(malformed_error!(
                "Invalid opcode: {:02X} {:02X}",
                prefix,
                opcode
            ));
            return;
        };

        let operand_size = match info.operand {
            OperandType::Switch => 4 + 4 * switch_cases,
            other => other.size().unwrap_or(0),
        };
        let opcode_size = if prefix == 0 { 1 } else { 2 };
        let size = u32::try_from(operand_size)
            .unwrap_or(u32::MAX)
            .saturating_add(opcode_size);

        self.instructions.push(Instruction {
            offset: self.offset,
            size,
            opcode,
            prefix,
            mnemonic: info.mnemonic,
            category: info.category,
            flow: info.flow,
            operand,
            stack: info.stack,
        });
        self.offset = self.offset.saturating_add(size);
    }
}
