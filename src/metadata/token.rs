//! Metadata tokens as they appear in CIL operands.
//!
//! A token is a 32-bit value whose high byte names a metadata table (or the `#US`
//! heap for `ldstr`) and whose low 24 bits are a row index or heap offset. The
//! decoder hands tokens to a [`crate::disassembler::TokenResolver`]; nothing in the
//! analysis core interprets them further.

use std::fmt;

/// A metadata token referencing a table row or heap entry.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Token(pub u32);

impl Token {
    /// `TypeRef` table
    pub const TABLE_TYPE_REF: u8 = 0x01;
    /// `TypeDef` table
    pub const TABLE_TYPE_DEF: u8 = 0x02;
    /// `Field` table
    pub const TABLE_FIELD: u8 = 0x04;
    /// `MethodDef` table
    pub const TABLE_METHOD_DEF: u8 = 0x06;
    /// `MemberRef` table
    pub const TABLE_MEMBER_REF: u8 = 0x0A;
    /// `MethodSpec` table
    pub const TABLE_METHOD_SPEC: u8 = 0x2B;
    /// `#US` user string heap, the operand space of `ldstr`
    pub const USER_STRING: u8 = 0x70;

    /// Create a token from its raw value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Create a token from table id and row.
    #[must_use]
    pub fn from_parts(table: u8, row: u32) -> Self {
        Token((u32::from(table) << 24) | (row & 0x00FF_FFFF))
    }

    /// The raw 32-bit value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table (or heap) id held in the high byte.
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The row index, or heap offset for user strings.
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & 0x00FF_FFFF
    }

    /// Returns true if this token refers into the `#US` heap.
    #[must_use]
    pub fn is_user_string(&self) -> bool {
        self.table() == Self::USER_STRING
    }

    /// Returns true if this token can name a call target.
    #[must_use]
    pub fn is_method(&self) -> bool {
        matches!(
            self.table(),
            Self::TABLE_METHOD_DEF | Self::TABLE_MEMBER_REF | Self::TABLE_METHOD_SPEC
        )
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}
