//! CIL method body decoding.
//!
//! [`decode_body`] turns the raw IL bytes of a method into a [`MethodBody`]. Decoding
//! happens in two passes: the first reads every instruction and remembers the byte
//! offsets branches point at, the second translates those offsets into instruction
//! indices. A branch into the middle of an instruction, or outside the body, makes
//! the whole body malformed.
//!
//! Metadata tokens are handed to a [`TokenResolver`]. `ldstr` tokens the resolver
//! knows become literal text and method tokens become [`CallTarget`]s; anything it
//! does not know stays an opaque [`Operand::Token`], which the analysis treats as an
//! unknown value.
//!
//! # Example
//!
//! ```rust
//! use dotlint::disassembler::{decode_body, TokenMap};
//!
//! let tokens = TokenMap::new().with_string(0x7000_0001, "hello");
//! // ldstr "hello"; pop; ret
//! let code = [0x72, 0x01, 0x00, 0x00, 0x70, 0x26, 0x2A];
//! let body = decode_body(&code, Vec::new(), &tokens)?;
//!
//! assert_eq!(body.len(), 3);
//! assert_eq!(body.first_string_literal(), Some("hello"));
//! # Ok::<(), dotlint::Error>(())
//! ```

use std::{collections::HashMap, sync::Arc};

use crate::{
    disassembler::{
        body::{LocalSlot, MethodBody},
        instruction::{Immediate, InstrIdx, Instruction, OpCategory, Operand, OperandType},
        instructions::lookup,
        opcodes,
    },
    file::parser::Parser,
    metadata::{signatures::CallTarget, token::Token},
    Error, Result,
};

/// Resolves metadata tokens found in CIL operands.
///
/// Implemented by whatever loads the assembly; the decoder only needs literal
/// strings and call targets.
pub trait TokenResolver {
    /// The `#US` heap string for an `ldstr` token.
    fn user_string(&self, token: Token) -> Option<Arc<str>>;

    /// The call target a method token refers to.
    fn call_target(&self, token: Token) -> Option<Arc<CallTarget>>;
}

/// A [`TokenResolver`] backed by two in-memory maps.
#[derive(Debug, Default, Clone)]
pub struct TokenMap {
    strings: HashMap<Token, Arc<str>>,
    methods: HashMap<Token, Arc<CallTarget>>,
}

impl TokenMap {
    /// An empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a user string.
    #[must_use]
    pub fn with_string(mut self, token: u32, text: &str) -> Self {
        self.strings.insert(Token::new(token), Arc::from(text));
        self
    }

    /// Register a call target.
    #[must_use]
    pub fn with_method(mut self, token: u32, target: CallTarget) -> Self {
        self.methods.insert(Token::new(token), Arc::new(target));
        self
    }
}

impl TokenResolver for TokenMap {
    fn user_string(&self, token: Token) -> Option<Arc<str>> {
        self.strings.get(&token).cloned()
    }

    fn call_target(&self, token: Token) -> Option<Arc<CallTarget>> {
        self.methods.get(&token).cloned()
    }
}

/// Decode a complete method body.
///
/// # Arguments
/// * `code` - The raw IL bytes, header excluded
/// * `locals` - The declared local slots
/// * `resolver` - Resolves `ldstr` and call tokens
///
/// # Errors
/// Returns [`crate::Error::Empty`] for an empty body, [`crate::Error::OutOfBounds`] for
/// truncated operands and [`crate::Error::Malformed`] for reserved opcodes or branch
/// targets that do not land on an instruction boundary.
pub fn decode_body<R>(code: &[u8], locals: Vec<LocalSlot>, resolver: &R) -> Result<MethodBody>
where
    R: TokenResolver + ?Sized,
{
    if code.is_empty() {
        return Err(Error::Empty);
    }

    let mut parser = Parser::new(code);
    let mut instructions = Vec::new();
    let mut pending: Vec<(InstrIdx, Vec<i64>)> = Vec::new();

    while parser.has_more_data() {
        let (instruction, targets) = decode_instruction(&mut parser, resolver)?;
        if !targets.is_empty() {
            pending.push((instructions.len(), targets));
        }
        instructions.push(instruction);
    }

    let by_offset: HashMap<i64, InstrIdx> = instructions
        .iter()
        .enumerate()
        .map(|(index, instr)| (i64::from(instr.offset), index))
        .collect();

    for (index, targets) in pending {
        let resolved = targets
            .iter()
            .map(|target| {
                by_offset.get(target).copied().ok_or_else(|| {
                    malformed_error!(
                        "Branch at instruction {} targets invalid offset {}",
                        index,
                        target
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let instr = &mut instructions[index];
        instr.operand = match instr.operand {
            Operand::Switch(_) => Operand::Switch(resolved),
            _ => match resolved.first() {
                Some(target) => Operand::Target(*target),
                None => Operand::None,
            },
        };
    }

    log::trace!(
        "decoded {} instructions from {} bytes",
        instructions.len(),
        code.len()
    );

    Ok(MethodBody::new(instructions, locals))
}

/// Decode one instruction. Returns the instruction and the absolute byte offsets
/// its branch operand points at.
fn decode_instruction<R>(parser: &mut Parser, resolver: &R) -> Result<(Instruction, Vec<i64>)>
where
    R: TokenResolver + ?Sized,
{
    let start = parser.pos();
    let first_byte = parser.read_le::<u8>()?;

    let (prefix, opcode) = if first_byte == opcodes::FE_PREFIX {
        (opcodes::FE_PREFIX, parser.read_le::<u8>()?)
    } else {
        (0, first_byte)
    };

    let Some(info) = lookup(prefix, opcode) else {
        return Err(malformed_error!(
            "Invalid opcode: {:02X} {:02X} at offset {}",
            prefix,
            opcode,
            start
        ));
    };

    let mut targets = Vec::new();
    let operand = match info.operand {
        OperandType::None => implicit_operand(prefix, opcode),
        OperandType::Int8 => Operand::Immediate(Immediate::Int8(parser.read_le::<i8>()?)),
        OperandType::UInt8 => slot_operand(prefix, opcode, u16::from(parser.read_le::<u8>()?)),
        OperandType::UInt16 => slot_operand(prefix, opcode, parser.read_le::<u16>()?),
        OperandType::Int32 => Operand::Immediate(Immediate::Int32(parser.read_le::<i32>()?)),
        OperandType::Int64 => Operand::Immediate(Immediate::Int64(parser.read_le::<i64>()?)),
        OperandType::Float32 => Operand::Immediate(Immediate::Float32(parser.read_le::<f32>()?)),
        OperandType::Float64 => Operand::Immediate(Immediate::Float64(parser.read_le::<f64>()?)),
        OperandType::Token => {
            let token = Token::new(parser.read_le::<u32>()?);
            token_operand(info.category, opcode, token, resolver)
        }
        OperandType::ShortTarget => {
            let displacement = i64::from(parser.read_le::<i8>()?);
            targets.push(position(parser) + displacement);
            Operand::Target(0)
        }
        OperandType::Target => {
            let displacement = i64::from(parser.read_le::<i32>()?);
            targets.push(position(parser) + displacement);
            Operand::Target(0)
        }
        OperandType::Switch => {
            let count = parser.read_le::<u32>()? as usize;
            if count > parser.remaining() / 4 {
                return Err(out_of_bounds_error!());
            }

            let mut displacements = Vec::with_capacity(count);
            for _ in 0..count {
                displacements.push(i64::from(parser.read_le::<i32>()?));
            }

            let base = position(parser);
            targets.extend(displacements.into_iter().map(|d| base + d));
            Operand::Switch(Vec::new())
        }
    };

    let offset = u32::try_from(start).map_err(|_| out_of_bounds_error!())?;
    let size = u32::try_from(parser.pos() - start).map_err(|_| out_of_bounds_error!())?;

    Ok((
        Instruction {
            offset,
            size,
            opcode,
            prefix,
            mnemonic: info.mnemonic,
            category: info.category,
            flow: info.flow,
            operand,
            stack: info.stack,
        },
        targets,
    ))
}

fn position(parser: &Parser) -> i64 {
    i64::try_from(parser.pos()).unwrap_or(i64::MAX)
}

/// Operands encoded in the opcode itself (`ldloc.1`, `ldc.i4.5`, ...).
fn implicit_operand(prefix: u8, opcode: u8) -> Operand {
    if prefix != 0 {
        return Operand::None;
    }

    match opcode {
        opcodes::LDARG_0..=opcodes::LDARG_3 => {
            Operand::Argument(u16::from(opcode - opcodes::LDARG_0))
        }
        opcodes::LDLOC_0..=opcodes::LDLOC_3 => Operand::Local(u16::from(opcode - opcodes::LDLOC_0)),
        opcodes::STLOC_0..=opcodes::STLOC_3 => Operand::Local(u16::from(opcode - opcodes::STLOC_0)),
        opcodes::LDC_I4_M1..=opcodes::LDC_I4_8 => Operand::Immediate(Immediate::Int32(
            i32::from(opcode) - i32::from(opcodes::LDC_I4_0),
        )),
        _ => Operand::None,
    }
}

/// Inline `uint8`/`uint16` operands name a local or argument slot, except for the
/// `unaligned.` and `no.` prefixes.
fn slot_operand(prefix: u8, opcode: u8, index: u16) -> Operand {
    let is_local = matches!(
        (prefix, opcode),
        (0, opcodes::LDLOC_S | opcodes::STLOC_S | opcodes::LDLOCA_S)
            | (
                opcodes::FE_PREFIX,
                opcodes::FE_LDLOC | opcodes::FE_STLOC | opcodes::FE_LDLOCA
            )
    );
    let is_argument = matches!(
        (prefix, opcode),
        (0, opcodes::LDARG_S | opcodes::STARG_S | opcodes::LDARGA_S)
            | (
                opcodes::FE_PREFIX,
                opcodes::FE_LDARG | opcodes::FE_STARG | opcodes::FE_LDARGA
            )
    );

    if is_local {
        Operand::Local(index)
    } else if is_argument {
        Operand::Argument(index)
    } else {
        // Only the single byte prefixes reach this point
        #[allow(clippy::cast_possible_truncation)]
        Operand::Immediate(Immediate::UInt8(index as u8))
    }
}

fn token_operand<R>(category: OpCategory, opcode: u8, token: Token, resolver: &R) -> Operand
where
    R: TokenResolver + ?Sized,
{
    match category {
        OpCategory::PushLiteral if opcode == opcodes::LDSTR => {
            match resolver.user_string(token) {
                Some(text) => Operand::String(text),
                None => {
                    log::debug!("unresolved user string {token}");
                    Operand::Token(token)
                }
            }
        }
        OpCategory::Call => match resolver.call_target(token) {
            Some(target) => Operand::Call(target),
            None => {
                log::debug!("unresolved call target {token}");
                Operand::Token(token)
            }
        },
        OpCategory::LoadField => Operand::Field(token),
        _ => Operand::Token(token),
    }
}
