//! CIL instruction decoding and the method body model.
//!
//! This module turns raw IL bytes into an indexable [`MethodBody`] and offers a
//! [`BodyBuilder`] for producing the same representation directly.
//!
//! # Key Types
//! - [`Instruction`] - A decoded CIL instruction with category, flow and stack metadata
//! - [`MethodBody`] - Instruction arena with local slots and join point information
//! - [`Operand`] - Instruction operands (immediates, slots, literals, call targets, branch targets)
//! - [`OpCategory`] - The instruction classes the string tracer dispatches on
//!
//! # Main Functions
//! - [`decode_body`] - Decode raw IL bytes into a [`MethodBody`]
//! - [`lookup`] - Static opcode table lookup
//!
//! # Example
//! ```rust
//! use dotlint::disassembler::{decode_body, OpCategory, TokenMap};
//!
//! let body = decode_body(&[0x06, 0x0A, 0x2A], Vec::new(), &TokenMap::new())?; // ldloc.0, stloc.0, ret
//! assert_eq!(body.get(1).map(|i| i.category), Some(OpCategory::StoreLocal));
//! # Ok::<(), dotlint::Error>(())
//! ```

mod body;
mod builder;
mod decoder;
mod instruction;
mod instructions;
pub mod opcodes;

pub use body::{LocalSlot, MethodBody};
pub use builder::BodyBuilder;
pub use decoder::{decode_body, TokenMap, TokenResolver};
pub use instruction::{
    FlowType, Immediate, InstrIdx, Instruction, OpCategory, Operand, OperandType, StackBehavior,
};
pub use instructions::{lookup, CilInstruction};
