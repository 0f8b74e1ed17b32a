//! Decoded CIL instructions and their metadata.
//!
//! An [`Instruction`] is immutable once built. Besides the raw opcode and operand it
//! carries three pieces of derived information the analysis relies on:
//!
//! - [`OpCategory`] - the coarse class the string tracer dispatches on
//! - [`FlowType`] - how control leaves the instruction
//! - [`StackBehavior`] - how many evaluation stack slots it consumes and produces
//!
//! Branch operands are stored as *instruction indices* within the owning
//! [`crate::disassembler::MethodBody`], not as byte offsets, so navigation never has
//! to consult the raw code again.

use std::{
    fmt::{self, UpperHex},
    sync::Arc,
};

use strum::{AsRefStr, Display, EnumIter};

use crate::metadata::{signatures::CallTarget, token::Token};

/// Index of an instruction within its [`crate::disassembler::MethodBody`].
pub type InstrIdx = usize;

/// The kind of inline operand an opcode carries in the raw byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandType {
    /// No operand bytes
    None,
    /// `int8` immediate
    Int8,
    /// `uint8` immediate or short local/argument index
    UInt8,
    /// `uint16` local/argument index
    UInt16,
    /// `int32` immediate
    Int32,
    /// `int64` immediate
    Int64,
    /// `float32` immediate
    Float32,
    /// `float64` immediate
    Float64,
    /// Metadata token
    Token,
    /// Relative branch displacement, `int8`
    ShortTarget,
    /// Relative branch displacement, `int32`
    Target,
    /// `uint32` count followed by that many `int32` displacements
    Switch,
}

impl OperandType {
    /// Encoded size in bytes, or `None` for the variable length `switch` table.
    #[must_use]
    pub const fn size(&self) -> Option<usize> {
        match self {
            OperandType::None => Some(0),
            OperandType::Int8 | OperandType::UInt8 | OperandType::ShortTarget => Some(1),
            OperandType::UInt16 => Some(2),
            OperandType::Int32
            | OperandType::Float32
            | OperandType::Token
            | OperandType::Target => Some(4),
            OperandType::Int64 | OperandType::Float64 => Some(8),
            OperandType::Switch => None,
        }
    }
}

/// An immediate numeric operand.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Immediate {
    /// `int8`
    Int8(i8),
    /// `uint8`
    UInt8(u8),
    /// `int32`
    Int32(i32),
    /// `int64`
    Int64(i64),
    /// `float32`
    Float32(f32),
    /// `float64`
    Float64(f64),
}

impl UpperHex for Immediate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Immediate::Int8(value) => write!(f, "{value:02X}"),
            Immediate::UInt8(value) => write!(f, "{value:02X}"),
            Immediate::Int32(value) => write!(f, "{value:08X}"),
            Immediate::Int64(value) => write!(f, "{value:016X}"),
            Immediate::Float32(value) => write!(f, "{:08X}", value.to_bits()),
            Immediate::Float64(value) => write!(f, "{:016X}", value.to_bits()),
        }
    }
}

/// A decoded operand.
///
/// Tokens the decoder could resolve are replaced by what they name: `ldstr`
/// tokens become [`Operand::String`] and method tokens become [`Operand::Call`].
/// A token that could not be resolved stays a plain [`Operand::Token`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// No operand
    None,
    /// Numeric immediate
    Immediate(Immediate),
    /// Local variable slot
    Local(u16),
    /// Argument slot (slot 0 is `this` for instance methods)
    Argument(u16),
    /// Literal string pushed by `ldstr`
    String(Arc<str>),
    /// Resolved call target
    Call(Arc<CallTarget>),
    /// Field token of a field access
    Field(Token),
    /// Any other, or unresolved, metadata token
    Token(Token),
    /// Branch target instruction index
    Target(InstrIdx),
    /// `switch` target instruction indices
    Switch(Vec<InstrIdx>),
}

/// The seven instruction classes the string tracer tells apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, AsRefStr)]
pub enum OpCategory {
    /// Pushes a constant (`ldstr`, `ldc.*`, `ldnull`)
    PushLiteral,
    /// Pushes the value of a local slot
    LoadLocal,
    /// Pops into a local slot
    StoreLocal,
    /// Pushes the value of an instance or static field
    LoadField,
    /// Invokes a method (`call`, `callvirt`, `newobj`)
    Call,
    /// Transfers control to another instruction
    Branch,
    /// Everything else
    Other,
}

/// How control leaves an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowType {
    /// Falls through to the next instruction
    Sequential,
    /// May fall through or jump
    ConditionalBranch,
    /// Always jumps
    UnconditionalBranch,
    /// Calls and then falls through
    Call,
    /// Leaves the method
    Return,
    /// Jumps through a table or falls through
    Switch,
    /// Raises an exception
    Throw,
    /// Ends a `finally` or `filter` handler
    EndFinally,
    /// Leaves a protected region
    Leave,
}

/// Evaluation stack behavior of an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackBehavior {
    /// Pops and pushes a fixed number of slots
    Fixed {
        /// Slots consumed
        pops: u8,
        /// Slots produced
        pushes: u8,
    },
    /// Depends on the call target's signature
    Varies,
    /// Not modelled (stack resets, indirect calls, returns)
    Unknown,
}

/// A single decoded CIL instruction.
#[derive(Clone, PartialEq)]
pub struct Instruction {
    /// Byte offset of the instruction within the method body
    pub offset: u32,
    /// Encoded size in bytes, prefix and operand included
    pub size: u32,
    /// Opcode byte (second byte for `0xFE` prefixed opcodes)
    pub opcode: u8,
    /// `0xFE` for two byte opcodes, `0` otherwise
    pub prefix: u8,
    /// ILAsm mnemonic
    pub mnemonic: &'static str,
    /// Tracer class
    pub category: OpCategory,
    /// Control flow behavior
    pub flow: FlowType,
    /// Decoded operand
    pub operand: Operand,
    /// Stack behavior of the opcode
    pub stack: StackBehavior,
}

impl Instruction {
    /// Returns true if this instruction invokes a method.
    #[must_use]
    pub fn is_call(&self) -> bool {
        self.category == OpCategory::Call
    }

    /// Returns true for `newobj`.
    #[must_use]
    pub fn is_constructor_call(&self) -> bool {
        self.prefix == 0 && self.opcode == super::opcodes::NEWOBJ
    }

    /// Returns true if this instruction can transfer control to a target.
    #[must_use]
    pub fn is_branch(&self) -> bool {
        matches!(
            self.flow,
            FlowType::ConditionalBranch
                | FlowType::UnconditionalBranch
                | FlowType::Switch
                | FlowType::Leave
        )
    }

    /// The branch targets of this instruction, as instruction indices.
    #[must_use]
    pub fn targets(&self) -> Vec<InstrIdx> {
        match &self.operand {
            Operand::Target(target) => vec![*target],
            Operand::Switch(targets) => targets.clone(),
            _ => Vec::new(),
        }
    }

    /// The local slot for local loads and stores.
    #[must_use]
    pub fn local_index(&self) -> Option<u16> {
        match (&self.category, &self.operand) {
            (OpCategory::LoadLocal | OpCategory::StoreLocal, Operand::Local(index)) => {
                Some(*index)
            }
            _ => None,
        }
    }

    /// The local slot whose address `ldloca` or `ldloca.s` pushes.
    #[must_use]
    pub fn address_of_local(&self) -> Option<u16> {
        use super::opcodes::{FE_LDLOCA, FE_PREFIX, LDLOCA_S};

        let is_ldloca = (self.prefix == 0 && self.opcode == LDLOCA_S)
            || (self.prefix == FE_PREFIX && self.opcode == FE_LDLOCA);
        match &self.operand {
            Operand::Local(index) if is_ldloca => Some(*index),
            _ => None,
        }
    }

    /// The literal text pushed by `ldstr`.
    #[must_use]
    pub fn string_literal(&self) -> Option<&str> {
        match &self.operand {
            Operand::String(text) if self.category == OpCategory::PushLiteral => Some(text),
            _ => None,
        }
    }

    /// The resolved target of a call instruction.
    #[must_use]
    pub fn call_target(&self) -> Option<&CallTarget> {
        match &self.operand {
            Operand::Call(target) if self.is_call() => Some(target),
            _ => None,
        }
    }

    /// The raw token operand, if the instruction has one.
    #[must_use]
    pub fn token(&self) -> Option<Token> {
        match &self.operand {
            Operand::Token(token) | Operand::Field(token) => Some(*token),
            _ => None,
        }
    }
}

impl fmt::Debug for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IL_{:04X}: ", self.offset)?;

        if self.prefix != 0 {
            write!(f, "{:02X}:", self.prefix)?;
        }

        write!(f, "{:02X} - {:<12}", self.opcode, self.mnemonic)?;

        match &self.operand {
            Operand::None => {}
            Operand::Immediate(imm) => write!(f, " 0x{imm:X}")?,
            Operand::Local(local) => write!(f, " local:{local}")?,
            Operand::Argument(arg) => write!(f, " arg:{arg}")?,
            Operand::String(text) => write!(f, " {text:?}")?,
            Operand::Call(target) => write!(f, " {target}")?,
            Operand::Field(token) | Operand::Token(token) => {
                write!(f, " token:0x{:08X}", token.value())?;
            }
            Operand::Target(target) => write!(f, " -> #{target}")?,
            Operand::Switch(items) => {
                write!(f, " switch[{}]:(", items.len())?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "#{item}")?;
                    if i >= 5 && items.len() > 6 {
                        write!(f, ", ...{} more", items.len() - 6)?;
                        break;
                    }
                }
                write!(f, ")")?;
            }
        }

        write!(f, " | {}", self.category)?;

        if self.flow != FlowType::Sequential {
            write!(f, " | {:?}", self.flow)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::signatures::names;

    fn instr(category: OpCategory, operand: Operand) -> Instruction {
        Instruction {
            offset: 0,
            size: 1,
            opcode: 0,
            prefix: 0,
            mnemonic: "test",
            category,
            flow: FlowType::Sequential,
            operand,
            stack: StackBehavior::Fixed { pops: 0, pushes: 0 },
        }
    }

    #[test]
    fn accessors_respect_category() {
        let load = instr(OpCategory::LoadLocal, Operand::Local(3));
        assert_eq!(load.local_index(), Some(3));

        // ldloca carries a local operand but is not a value load
        let mut address = instr(OpCategory::Other, Operand::Local(3));
        assert_eq!(address.local_index(), None);
        assert_eq!(address.address_of_local(), None);
        address.opcode = super::super::opcodes::LDLOCA_S;
        assert_eq!(address.address_of_local(), Some(3));
        assert_eq!(load.address_of_local(), None);

        let literal = instr(OpCategory::PushLiteral, Operand::String("text".into()));
        assert_eq!(literal.string_literal(), Some("text"));
        assert_eq!(literal.call_target(), None);
    }

    #[test]
    fn call_target_accessor() {
        let target = CallTarget::new_instance(names::OBJECT, "ToString", &[], names::STRING);
        let call = instr(OpCategory::Call, Operand::Call(Arc::new(target.clone())));
        assert_eq!(call.call_target(), Some(&target));
        assert!(call.is_call());
        assert!(!call.is_branch());
    }

    #[test]
    fn debug_format() {
        let literal = instr(OpCategory::PushLiteral, Operand::String("abc".into()));
        let text = format!("{literal:?}");
        assert!(text.starts_with("IL_0000: "));
        assert!(text.contains("\"abc\""));
        assert!(text.ends_with("| PushLiteral"));
    }

    #[test]
    fn operand_sizes() {
        assert_eq!(OperandType::None.size(), Some(0));
        assert_eq!(OperandType::ShortTarget.size(), Some(1));
        assert_eq!(OperandType::Token.size(), Some(4));
        assert_eq!(OperandType::Float64.size(), Some(8));
        assert_eq!(OperandType::Switch.size(), None);
    }
}
