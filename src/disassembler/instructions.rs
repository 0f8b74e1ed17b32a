//! The CIL opcode table.
//!
//! [`lookup`] maps a `(prefix, opcode)` pair to its static description: mnemonic,
//! inline operand kind, tracer category, control flow and stack behavior. Reserved
//! encodings yield `None`.

use super::instruction::{FlowType, OpCategory, OperandType, StackBehavior};

/// Static description of one opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CilInstruction {
    /// ILAsm mnemonic
    pub mnemonic: &'static str,
    /// Inline operand encoding
    pub operand: OperandType,
    /// Tracer class
    pub category: OpCategory,
    /// Control flow behavior
    pub flow: FlowType,
    /// Stack behavior
    pub stack: StackBehavior,
}

const fn op(
    mnemonic: &'static str,
    operand: OperandType,
    category: OpCategory,
    flow: FlowType,
    stack: StackBehavior,
) -> CilInstruction {
    CilInstruction {
        mnemonic,
        operand,
        category,
        flow,
        stack,
    }
}

const fn fixed(pops: u8, pushes: u8) -> StackBehavior {
    StackBehavior::Fixed { pops, pushes }
}

const fn other(mnemonic: &'static str, operand: OperandType, pops: u8, pushes: u8) -> CilInstruction {
    op(
        mnemonic,
        operand,
        OpCategory::Other,
        FlowType::Sequential,
        fixed(pops, pushes),
    )
}

const fn literal(mnemonic: &'static str, operand: OperandType) -> CilInstruction {
    op(
        mnemonic,
        operand,
        OpCategory::PushLiteral,
        FlowType::Sequential,
        fixed(0, 1),
    )
}

const fn load_local(mnemonic: &'static str, operand: OperandType) -> CilInstruction {
    op(
        mnemonic,
        operand,
        OpCategory::LoadLocal,
        FlowType::Sequential,
        fixed(0, 1),
    )
}

const fn store_local(mnemonic: &'static str, operand: OperandType) -> CilInstruction {
    op(
        mnemonic,
        operand,
        OpCategory::StoreLocal,
        FlowType::Sequential,
        fixed(1, 0),
    )
}

const fn branch(mnemonic: &'static str, operand: OperandType, pops: u8) -> CilInstruction {
    let flow = if pops == 0 {
        FlowType::UnconditionalBranch
    } else {
        FlowType::ConditionalBranch
    };
    op(mnemonic, operand, OpCategory::Branch, flow, fixed(pops, 0))
}

const fn call(mnemonic: &'static str) -> CilInstruction {
    op(
        mnemonic,
        OperandType::Token,
        OpCategory::Call,
        FlowType::Call,
        StackBehavior::Varies,
    )
}

const fn unmodelled(
    mnemonic: &'static str,
    operand: OperandType,
    category: OpCategory,
    flow: FlowType,
) -> CilInstruction {
    op(mnemonic, operand, category, flow, StackBehavior::Unknown)
}

/// Looks up the static description of an opcode.
///
/// `prefix` is `0xFE` for two byte opcodes and `0` otherwise.
#[must_use]
pub fn lookup(prefix: u8, opcode: u8) -> Option<CilInstruction> {
    match prefix {
        0 => single_byte(opcode),
        0xFE => double_byte(opcode),
        _ => None,
    }
}

#[allow(clippy::too_many_lines)]
fn single_byte(opcode: u8) -> Option<CilInstruction> {
    use OperandType as O;

    let instr = match opcode {
        0x00 => other("nop", O::None, 0, 0),
        0x01 => other("break", O::None, 0, 0),
        0x02 => other("ldarg.0", O::None, 0, 1),
        0x03 => other("ldarg.1", O::None, 0, 1),
        0x04 => other("ldarg.2", O::None, 0, 1),
        0x05 => other("ldarg.3", O::None, 0, 1),
        0x06 => load_local("ldloc.0", O::None),
        0x07 => load_local("ldloc.1", O::None),
        0x08 => load_local("ldloc.2", O::None),
        0x09 => load_local("ldloc.3", O::None),
        0x0A => store_local("stloc.0", O::None),
        0x0B => store_local("stloc.1", O::None),
        0x0C => store_local("stloc.2", O::None),
        0x0D => store_local("stloc.3", O::None),
        0x0E => other("ldarg.s", O::UInt8, 0, 1),
        0x0F => other("ldarga.s", O::UInt8, 0, 1),
        0x10 => other("starg.s", O::UInt8, 1, 0),
        0x11 => load_local("ldloc.s", O::UInt8),
        0x12 => other("ldloca.s", O::UInt8, 0, 1),
        0x13 => store_local("stloc.s", O::UInt8),
        0x14 => literal("ldnull", O::None),
        0x15 => literal("ldc.i4.m1", O::None),
        0x16 => literal("ldc.i4.0", O::None),
        0x17 => literal("ldc.i4.1", O::None),
        0x18 => literal("ldc.i4.2", O::None),
        0x19 => literal("ldc.i4.3", O::None),
        0x1A => literal("ldc.i4.4", O::None),
        0x1B => literal("ldc.i4.5", O::None),
        0x1C => literal("ldc.i4.6", O::None),
        0x1D => literal("ldc.i4.7", O::None),
        0x1E => literal("ldc.i4.8", O::None),
        0x1F => literal("ldc.i4.s", O::Int8),
        0x20 => literal("ldc.i4", O::Int32),
        0x21 => literal("ldc.i8", O::Int64),
        0x22 => literal("ldc.r4", O::Float32),
        0x23 => literal("ldc.r8", O::Float64),
        0x25 => other("dup", O::None, 1, 2),
        0x26 => other("pop", O::None, 1, 0),
        0x27 => unmodelled("jmp", O::Token, OpCategory::Other, FlowType::Return),
        0x28 => call("call"),
        0x29 => unmodelled("calli", O::Token, OpCategory::Other, FlowType::Call),
        0x2A => unmodelled("ret", O::None, OpCategory::Other, FlowType::Return),
        0x2B => branch("br.s", O::ShortTarget, 0),
        0x2C => branch("brfalse.s", O::ShortTarget, 1),
        0x2D => branch("brtrue.s", O::ShortTarget, 1),
        0x2E => branch("beq.s", O::ShortTarget, 2),
        0x2F => branch("bge.s", O::ShortTarget, 2),
        0x30 => branch("bgt.s", O::ShortTarget, 2),
        0x31 => branch("ble.s", O::ShortTarget, 2),
        0x32 => branch("blt.s", O::ShortTarget, 2),
        0x33 => branch("bne.un.s", O::ShortTarget, 2),
        0x34 => branch("bge.un.s", O::ShortTarget, 2),
        0x35 => branch("bgt.un.s", O::ShortTarget, 2),
        0x36 => branch("ble.un.s", O::ShortTarget, 2),
        0x37 => branch("blt.un.s", O::ShortTarget, 2),
        0x38 => branch("br", O::Target, 0),
        0x39 => branch("brfalse", O::Target, 1),
        0x3A => branch("brtrue", O::Target, 1),
        0x3B => branch("beq", O::Target, 2),
        0x3C => branch("bge", O::Target, 2),
        0x3D => branch("bgt", O::Target, 2),
        0x3E => branch("ble", O::Target, 2),
        0x3F => branch("blt", O::Target, 2),
        0x40 => branch("bne.un", O::Target, 2),
        0x41 => branch("bge.un", O::Target, 2),
        0x42 => branch("bgt.un", O::Target, 2),
        0x43 => branch("ble.un", O::Target, 2),
        0x44 => branch("blt.un", O::Target, 2),
        0x45 => op(
            "switch",
            O::Switch,
            OpCategory::Branch,
            FlowType::Switch,
            fixed(1, 0),
        ),
        0x46 => other("ldind.i1", O::None, 1, 1),
        0x47 => other("ldind.u1", O::None, 1, 1),
        0x48 => other("ldind.i2", O::None, 1, 1),
        0x49 => other("ldind.u2", O::None, 1, 1),
        0x4A => other("ldind.i4", O::None, 1, 1),
        0x4B => other("ldind.u4", O::None, 1, 1),
        0x4C => other("ldind.i8", O::None, 1, 1),
        0x4D => other("ldind.i", O::None, 1, 1),
        0x4E => other("ldind.r4", O::None, 1, 1),
        0x4F => other("ldind.r8", O::None, 1, 1),
        0x50 => other("ldind.ref", O::None, 1, 1),
        0x51 => other("stind.ref", O::None, 2, 0),
        0x52 => other("stind.i1", O::None, 2, 0),
        0x53 => other("stind.i2", O::None, 2, 0),
        0x54 => other("stind.i4", O::None, 2, 0),
        0x55 => other("stind.i8", O::None, 2, 0),
        0x56 => other("stind.r4", O::None, 2, 0),
        0x57 => other("stind.r8", O::None, 2, 0),
        0x58 => other("add", O::None, 2, 1),
        0x59 => other("sub", O::None, 2, 1),
        0x5A => other("mul", O::None, 2, 1),
        0x5B => other("div", O::None, 2, 1),
        0x5C => other("div.un", O::None, 2, 1),
        0x5D => other("rem", O::None, 2, 1),
        0x5E => other("rem.un", O::None, 2, 1),
        0x5F => other("and", O::None, 2, 1),
        0x60 => other("or", O::None, 2, 1),
        0x61 => other("xor", O::None, 2, 1),
        0x62 => other("shl", O::None, 2, 1),
        0x63 => other("shr", O::None, 2, 1),
        0x64 => other("shr.un", O::None, 2, 1),
        0x65 => other("neg", O::None, 1, 1),
        0x66 => other("not", O::None, 1, 1),
        0x67 => other("conv.i1", O::None, 1, 1),
        0x68 => other("conv.i2", O::None, 1, 1),
        0x69 => other("conv.i4", O::None, 1, 1),
        0x6A => other("conv.i8", O::None, 1, 1),
        0x6B => other("conv.r4", O::None, 1, 1),
        0x6C => other("conv.r8", O::None, 1, 1),
        0x6D => other("conv.u4", O::None, 1, 1),
        0x6E => other("conv.u8", O::None, 1, 1),
        0x6F => call("callvirt"),
        0x70 => other("cpobj", O::Token, 2, 0),
        0x71 => other("ldobj", O::Token, 1, 1),
        0x72 => literal("ldstr", O::Token),
        0x73 => call("newobj"),
        0x74 => other("castclass", O::Token, 1, 1),
        0x75 => other("isinst", O::Token, 1, 1),
        0x76 => other("conv.r.un", O::None, 1, 1),
        0x79 => other("unbox", O::Token, 1, 1),
        0x7A => unmodelled("throw", O::None, OpCategory::Other, FlowType::Throw),
        0x7B => op(
            "ldfld",
            O::Token,
            OpCategory::LoadField,
            FlowType::Sequential,
            fixed(1, 1),
        ),
        0x7C => other("ldflda", O::Token, 1, 1),
        0x7D => other("stfld", O::Token, 2, 0),
        0x7E => op(
            "ldsfld",
            O::Token,
            OpCategory::LoadField,
            FlowType::Sequential,
            fixed(0, 1),
        ),
        0x7F => other("ldsflda", O::Token, 0, 1),
        0x80 => other("stsfld", O::Token, 1, 0),
        0x81 => other("stobj", O::Token, 2, 0),
        0x82 => other("conv.ovf.i1.un", O::None, 1, 1),
        0x83 => other("conv.ovf.i2.un", O::None, 1, 1),
        0x84 => other("conv.ovf.i4.un", O::None, 1, 1),
        0x85 => other("conv.ovf.i8.un", O::None, 1, 1),
        0x86 => other("conv.ovf.u1.un", O::None, 1, 1),
        0x87 => other("conv.ovf.u2.un", O::None, 1, 1),
        0x88 => other("conv.ovf.u4.un", O::None, 1, 1),
        0x89 => other("conv.ovf.u8.un", O::None, 1, 1),
        0x8A => other("conv.ovf.i.un", O::None, 1, 1),
        0x8B => other("conv.ovf.u.un", O::None, 1, 1),
        0x8C => other("box", O::Token, 1, 1),
        0x8D => other("newarr", O::Token, 1, 1),
        0x8E => other("ldlen", O::None, 1, 1),
        0x8F => other("ldelema", O::Token, 2, 1),
        0x90 => other("ldelem.i1", O::None, 2, 1),
        0x91 => other("ldelem.u1", O::None, 2, 1),
        0x92 => other("ldelem.i2", O::None, 2, 1),
        0x93 => other("ldelem.u2", O::None, 2, 1),
        0x94 => other("ldelem.i4", O::None, 2, 1),
        0x95 => other("ldelem.u4", O::None, 2, 1),
        0x96 => other("ldelem.i8", O::None, 2, 1),
        0x97 => other("ldelem.i", O::None, 2, 1),
        0x98 => other("ldelem.r4", O::None, 2, 1),
        0x99 => other("ldelem.r8", O::None, 2, 1),
        0x9A => other("ldelem.ref", O::None, 2, 1),
        0x9B => other("stelem.i", O::None, 3, 0),
        0x9C => other("stelem.i1", O::None, 3, 0),
        0x9D => other("stelem.i2", O::None, 3, 0),
        0x9E => other("stelem.i4", O::None, 3, 0),
        0x9F => other("stelem.i8", O::None, 3, 0),
        0xA0 => other("stelem.r4", O::None, 3, 0),
        0xA1 => other("stelem.r8", O::None, 3, 0),
        0xA2 => other("stelem.ref", O::None, 3, 0),
        0xA3 => other("ldelem", O::Token, 2, 1),
        0xA4 => other("stelem", O::Token, 3, 0),
        0xA5 => other("unbox.any", O::Token, 1, 1),
        0xB3 => other("conv.ovf.i1", O::None, 1, 1),
        0xB4 => other("conv.ovf.u1", O::None, 1, 1),
        0xB5 => other("conv.ovf.i2", O::None, 1, 1),
        0xB6 => other("conv.ovf.u2", O::None, 1, 1),
        0xB7 => other("conv.ovf.i4", O::None, 1, 1),
        0xB8 => other("conv.ovf.u4", O::None, 1, 1),
        0xB9 => other("conv.ovf.i8", O::None, 1, 1),
        0xBA => other("conv.ovf.u8", O::None, 1, 1),
        0xC2 => other("refanyval", O::Token, 1, 1),
        0xC3 => other("ckfinite", O::None, 1, 1),
        0xC6 => other("mkrefany", O::Token, 1, 1),
        0xD0 => other("ldtoken", O::Token, 0, 1),
        0xD1 => other("conv.u2", O::None, 1, 1),
        0xD2 => other("conv.u1", O::None, 1, 1),
        0xD3 => other("conv.i", O::None, 1, 1),
        0xD4 => other("conv.ovf.i", O::None, 1, 1),
        0xD5 => other("conv.ovf.u", O::None, 1, 1),
        0xD6 => other("add.ovf", O::None, 2, 1),
        0xD7 => other("add.ovf.un", O::None, 2, 1),
        0xD8 => other("mul.ovf", O::None, 2, 1),
        0xD9 => other("mul.ovf.un", O::None, 2, 1),
        0xDA => other("sub.ovf", O::None, 2, 1),
        0xDB => other("sub.ovf.un", O::None, 2, 1),
        0xDC => unmodelled("endfinally", O::None, OpCategory::Other, FlowType::EndFinally),
        0xDD => unmodelled("leave", O::Target, OpCategory::Branch, FlowType::Leave),
        0xDE => unmodelled("leave.s", O::ShortTarget, OpCategory::Branch, FlowType::Leave),
        0xDF => other("stind.i", O::None, 2, 0),
        0xE0 => other("conv.u", O::None, 1, 1),
        _ => return None,
    };

    Some(instr)
}

fn double_byte(opcode: u8) -> Option<CilInstruction> {
    use OperandType as O;

    let instr = match opcode {
        0x00 => other("arglist", O::None, 0, 1),
        0x01 => other("ceq", O::None, 2, 1),
        0x02 => other("cgt", O::None, 2, 1),
        0x03 => other("cgt.un", O::None, 2, 1),
        0x04 => other("clt", O::None, 2, 1),
        0x05 => other("clt.un", O::None, 2, 1),
        0x06 => other("ldftn", O::Token, 0, 1),
        0x07 => other("ldvirtftn", O::Token, 1, 1),
        0x09 => other("ldarg", O::UInt16, 0, 1),
        0x0A => other("ldarga", O::UInt16, 0, 1),
        0x0B => other("starg", O::UInt16, 1, 0),
        0x0C => load_local("ldloc", O::UInt16),
        0x0D => other("ldloca", O::UInt16, 0, 1),
        0x0E => store_local("stloc", O::UInt16),
        0x0F => unmodelled("localloc", O::None, OpCategory::Other, FlowType::Sequential),
        0x11 => unmodelled("endfilter", O::None, OpCategory::Other, FlowType::EndFinally),
        0x12 => other("unaligned.", O::UInt8, 0, 0),
        0x13 => other("volatile.", O::None, 0, 0),
        0x14 => other("tail.", O::None, 0, 0),
        0x15 => other("initobj", O::Token, 1, 0),
        0x16 => other("constrained.", O::Token, 0, 0),
        0x17 => other("cpblk", O::None, 3, 0),
        0x18 => other("initblk", O::None, 3, 0),
        0x19 => other("no.", O::UInt8, 0, 0),
        0x1A => unmodelled("rethrow", O::None, OpCategory::Other, FlowType::Throw),
        0x1C => other("sizeof", O::Token, 0, 1),
        0x1D => other("refanytype", O::None, 1, 1),
        0x1E => other("readonly.", O::None, 0, 0),
        _ => return None,
    };

    Some(instr)
}
