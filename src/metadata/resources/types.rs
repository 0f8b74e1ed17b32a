//! Value types stored in `.resources` blobs.
//!
//! Version 2 blobs tag each value with a `ResourceTypeCode`. Primitive codes are
//! fixed; codes from `0x40` upward index a per-blob table of user type names and
//! cannot be decoded without the serializer that produced them.

use crate::{
    file::{
        io::{write_7bit_encoded_int, write_le},
        parser::Parser,
    },
    metadata::resources::parser::read_binary_string,
    Error::TypeError,
    Result,
};

/// Magic number opening the `ResourceManager` header.
pub const RESOURCE_MAGIC: u32 = 0xBEEF_CACE;

/// First type code of user defined types.
pub const USER_TYPES_START: u32 = 0x40;

/// A decoded resource value.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceType {
    /// `null`
    Null,
    /// UTF-8 encoded string
    String(String),
    /// `bool`
    Boolean(bool),
    /// UTF-16 code unit
    Char(char),
    /// `byte`
    Byte(u8),
    /// `sbyte`
    SByte(i8),
    /// `short`
    Int16(i16),
    /// `ushort`
    UInt16(u16),
    /// `int`
    Int32(i32),
    /// `uint`
    UInt32(u32),
    /// `long`
    Int64(i64),
    /// `ulong`
    UInt64(u64),
    /// `float`
    Single(f32),
    /// `double`
    Double(f64),
    /// `decimal` as its four raw 32-bit parts
    Decimal {
        /// Low 32 bits of the mantissa
        lo: i32,
        /// Middle 32 bits of the mantissa
        mid: i32,
        /// High 32 bits of the mantissa
        hi: i32,
        /// Sign and scale
        flags: i32,
    },
    /// `DateTime` in its binary form
    DateTime(i64),
    /// `TimeSpan` ticks
    TimeSpan(i64),
    /// `byte[]`
    ByteArray(Vec<u8>),
    /// `System.IO.Stream` content
    Stream(Vec<u8>),
}

impl ResourceType {
    /// The .NET type name of the value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Null => "System.Null",
            ResourceType::String(_) => "System.String",
            ResourceType::Boolean(_) => "System.Boolean",
            ResourceType::Char(_) => "System.Char",
            ResourceType::Byte(_) => "System.Byte",
            ResourceType::SByte(_) => "System.SByte",
            ResourceType::Int16(_) => "System.Int16",
            ResourceType::UInt16(_) => "System.UInt16",
            ResourceType::Int32(_) => "System.Int32",
            ResourceType::UInt32(_) => "System.UInt32",
            ResourceType::Int64(_) => "System.Int64",
            ResourceType::UInt64(_) => "System.UInt64",
            ResourceType::Single(_) => "System.Single",
            ResourceType::Double(_) => "System.Double",
            ResourceType::Decimal { .. } => "System.Decimal",
            ResourceType::DateTime(_) => "System.DateTime",
            ResourceType::TimeSpan(_) => "System.TimeSpan",
            ResourceType::ByteArray(_) => "System.Byte[]",
            ResourceType::Stream(_) => "System.IO.Stream",
        }
    }

    /// The `ResourceTypeCode` of a version 2 blob.
    #[must_use]
    pub fn type_code(&self) -> u32 {
        match self {
            ResourceType::Null => 0x00,
            ResourceType::String(_) => 0x01,
            ResourceType::Boolean(_) => 0x02,
            ResourceType::Char(_) => 0x03,
            ResourceType::Byte(_) => 0x04,
            ResourceType::SByte(_) => 0x05,
            ResourceType::Int16(_) => 0x06,
            ResourceType::UInt16(_) => 0x07,
            ResourceType::Int32(_) => 0x08,
            ResourceType::UInt32(_) => 0x09,
            ResourceType::Int64(_) => 0x0A,
            ResourceType::UInt64(_) => 0x0B,
            ResourceType::Single(_) => 0x0C,
            ResourceType::Double(_) => 0x0D,
            ResourceType::Decimal { .. } => 0x0E,
            ResourceType::DateTime(_) => 0x0F,
            ResourceType::TimeSpan(_) => 0x10,
            ResourceType::ByteArray(_) => 0x20,
            ResourceType::Stream(_) => 0x21,
        }
    }

    /// The string payload, if this is a string value.
    #[must_use]
    pub fn as_string(&self) -> Option<&str> {
        match self {
            ResourceType::String(text) => Some(text),
            _ => None,
        }
    }

    /// Decode a value tagged with a version 2 type code.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] for user types and unassigned codes, and
    /// parser errors for truncated data.
    pub fn from_type_code(code: u32, parser: &mut Parser) -> Result<Self> {
        let value = match code {
            0x00 => ResourceType::Null,
            // Resource names are UTF-16, string values are UTF-8
            0x01 => ResourceType::String(read_binary_string(parser)?),
            0x02 => ResourceType::Boolean(parser.read_le::<u8>()? > 0),
            0x03 => {
                let code_unit = parser.read_le::<u16>()?;
                ResourceType::Char(char::from_u32(u32::from(code_unit)).ok_or_else(|| {
                    TypeError(format!("Invalid UTF-16 code unit for Char - {code_unit:X}"))
                })?)
            }
            0x04 => ResourceType::Byte(parser.read_le::<u8>()?),
            0x05 => ResourceType::SByte(parser.read_le::<i8>()?),
            0x06 => ResourceType::Int16(parser.read_le::<i16>()?),
            0x07 => ResourceType::UInt16(parser.read_le::<u16>()?),
            0x08 => ResourceType::Int32(parser.read_le::<i32>()?),
            0x09 => ResourceType::UInt32(parser.read_le::<u32>()?),
            0x0A => ResourceType::Int64(parser.read_le::<i64>()?),
            0x0B => ResourceType::UInt64(parser.read_le::<u64>()?),
            0x0C => ResourceType::Single(parser.read_le::<f32>()?),
            0x0D => ResourceType::Double(parser.read_le::<f64>()?),
            0x0E => ResourceType::Decimal {
                lo: parser.read_le::<i32>()?,
                mid: parser.read_le::<i32>()?,
                hi: parser.read_le::<i32>()?,
                flags: parser.read_le::<i32>()?,
            },
            0x0F => ResourceType::DateTime(parser.read_le::<i64>()?),
            0x10 => ResourceType::TimeSpan(parser.read_le::<i64>()?),
            0x20 => {
                let length = parser.read_le::<u32>()? as usize;
                ResourceType::ByteArray(parser.read_bytes(length)?.to_vec())
            }
            0x21 => {
                let length = parser.read_le::<u32>()? as usize;
                ResourceType::Stream(parser.read_bytes(length)?.to_vec())
            }
            code if code >= USER_TYPES_START => {
                return Err(TypeError(format!(
                    "TypeCode - {code:X} is a serialized user type"
                )))
            }
            _ => {
                return Err(TypeError(format!(
                    "TypeCode - {code:X} is not a known resource type"
                )))
            }
        };

        Ok(value)
    }

    /// Decode a value of a version 1 blob, where values are tagged by type name.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] for type names without a primitive encoding.
    pub fn from_type_name(type_name: &str, parser: &mut Parser) -> Result<Self> {
        // Type names in the table may be assembly qualified
        let bare = type_name.split(',').next().unwrap_or(type_name).trim();

        let code = match bare {
            "System.Null" => 0x00,
            "System.String" => 0x01,
            "System.Boolean" => 0x02,
            "System.Char" => 0x03,
            "System.Byte" => 0x04,
            "System.SByte" => 0x05,
            "System.Int16" => 0x06,
            "System.UInt16" => 0x07,
            "System.Int32" => 0x08,
            "System.UInt32" => 0x09,
            "System.Int64" => 0x0A,
            "System.UInt64" => 0x0B,
            "System.Single" => 0x0C,
            "System.Double" => 0x0D,
            "System.Decimal" => 0x0E,
            "System.DateTime" => 0x0F,
            "System.TimeSpan" => 0x10,
            "System.Byte[]" => 0x20,
            "System.IO.Stream" => 0x21,
            _ => {
                return Err(TypeError(format!(
                    "TypeName - {type_name} has no primitive encoding"
                )))
            }
        };

        ResourceType::from_type_code(code, parser)
    }

    /// Append the type code and the encoded value to `buffer`.
    pub fn write(&self, buffer: &mut Vec<u8>) {
        write_7bit_encoded_int(buffer, self.type_code());

        match self {
            ResourceType::Null => {}
            ResourceType::String(text) => {
                write_7bit_encoded_int(buffer, u32::try_from(text.len()).unwrap_or(u32::MAX));
                buffer.extend_from_slice(text.as_bytes());
            }
            ResourceType::Boolean(value) => write_le(buffer, u8::from(*value)),
            ResourceType::Char(value) => {
                // Only BMP characters are representable
                let code_unit = u16::try_from(u32::from(*value)).unwrap_or(0xFFFD);
                write_le(buffer, code_unit);
            }
            ResourceType::Byte(value) => write_le(buffer, *value),
            ResourceType::SByte(value) => write_le(buffer, *value),
            ResourceType::Int16(value) => write_le(buffer, *value),
            ResourceType::UInt16(value) => write_le(buffer, *value),
            ResourceType::Int32(value) => write_le(buffer, *value),
            ResourceType::UInt32(value) => write_le(buffer, *value),
            ResourceType::Int64(value)
            | ResourceType::DateTime(value)
            | ResourceType::TimeSpan(value) => write_le(buffer, *value),
            ResourceType::UInt64(value) => write_le(buffer, *value),
            ResourceType::Single(value) => write_le(buffer, *value),
            ResourceType::Double(value) => write_le(buffer, *value),
            ResourceType::Decimal { lo, mid, hi, flags } => {
                write_le(buffer, *lo);
                write_le(buffer, *mid);
                write_le(buffer, *hi);
                write_le(buffer, *flags);
            }
            ResourceType::ByteArray(data) | ResourceType::Stream(data) => {
                write_le(buffer, u32::try_from(data.len()).unwrap_or(u32::MAX));
                buffer.extend_from_slice(data);
            }
        }
    }
}

/// A named entry of a `.resources` blob.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceEntry {
    /// Resource name (the lookup key)
    pub name: String,
    /// Hash of the name as stored in the blob
    pub name_hash: u32,
    /// Decoded value
    pub data: ResourceType,
}
