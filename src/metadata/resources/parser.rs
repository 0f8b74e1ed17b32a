//! Parser for the binary `.resources` format.
//!
//! Embedded resources produced by `resgen`/`ResourceWriter` consist of a
//! `ResourceManager` header followed by a `RuntimeResourceReader` header, a name
//! section and a data section. As stored in the manifest, the blob is preceded by
//! its own length as a `u32`; all section offsets are relative to the first byte
//! after that prefix.
//!
//! ```text
//! u32 size | u32 magic | u32 header version | u32 header size | reader type | set type
//! u32 version | u32 count | u32 type count | type names | PAD... | hashes | positions
//! u32 data section offset | name section | data section
//! ```

use std::collections::BTreeMap;

use crate::{
    file::parser::Parser,
    metadata::resources::{ResourceEntry, ResourceType, RESOURCE_MAGIC},
    Result,
};

/// Parse an embedded `.resources` blob into its entries, keyed by name.
///
/// # Errors
/// Returns [`crate::Error::Malformed`], [`crate::Error::OutOfBounds`] or
/// [`crate::Error::TypeError`] if the blob is damaged or holds values that cannot be
/// decoded.
pub fn parse_dotnet_resource(data: &[u8]) -> Result<BTreeMap<String, ResourceEntry>> {
    let resource = Resource::parse(data)?;
    resource.read_resources(data)
}

/// The `ResourceManager` hash of a resource name, computed over UTF-16 code units.
#[must_use]
pub fn resource_name_hash(name: &str) -> u32 {
    name.encode_utf16().fold(5381u32, |hash, unit| {
        (hash.wrapping_shl(5).wrapping_add(hash)) ^ u32::from(unit)
    })
}

/// A `BinaryWriter.Write(string)` value: 7-bit encoded byte length, then UTF-8.
pub(crate) fn read_binary_string(parser: &mut Parser) -> Result<String> {
    let length = parser.read_7bit_encoded_int()? as usize;
    let offset = parser.pos();
    let bytes = parser.read_bytes(length)?;

    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| malformed_error!("Invalid UTF-8 string at offset {}: {}", offset, e))
}

/// A name section entry: 7-bit encoded byte length, then UTF-16LE code units.
pub(crate) fn read_resource_name(parser: &mut Parser) -> Result<String> {
    let length = parser.read_7bit_encoded_int()? as usize;
    let offset = parser.pos();
    if length == 0 || length % 2 != 0 {
        return Err(malformed_error!(
            "Invalid resource name length {} at offset {}",
            length,
            offset
        ));
    }

    let units: Vec<u16> = parser
        .read_bytes(length)?
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    String::from_utf16(&units)
        .map_err(|_| malformed_error!("Invalid UTF-16 resource name at offset {}", offset))
}

/// The parsed headers of a `.resources` blob.
#[derive(Debug, Default)]
pub struct Resource {
    /// Version of the `ResourceManager` header
    pub res_mgr_header_version: u32,
    /// Bytes of reader information following the header size field
    pub header_size: u32,
    /// Assembly qualified name of the reader type
    pub reader_type: String,
    /// Assembly qualified name of the resource set type
    pub resource_set_type: String,
    /// Offset of the `RuntimeResourceReader` header
    pub rr_header_offset: usize,
    /// Version of the `RuntimeResourceReader` format (1 or 2)
    pub rr_version: u32,
    /// Number of entries
    pub resource_count: u32,
    /// Type names used by the value tags
    pub type_names: Vec<String>,
    /// Number of alignment bytes after the type table
    pub padding: usize,
    /// Name hashes, sorted ascending
    pub name_hashes: Vec<u32>,
    /// Offsets of the names, relative to the name section
    pub name_positions: Vec<u32>,
    /// Absolute offset of the data section
    pub data_section_offset: usize,
    /// Absolute offset of the name section
    pub name_section_offset: usize,
    /// Written by a debug build of the resource writer
    pub is_debug: bool,
}

impl Resource {
    /// Parse the headers of a size-prefixed `.resources` blob.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a bad size, magic or version, and
    /// [`crate::Error::OutOfBounds`] for truncated data.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < 12 {
            // Need at least size + magic + version
            return Err(malformed_error!("Resource data too small"));
        }

        let mut parser = Parser::new(data);

        let size = parser.read_le::<u32>()? as usize;
        if size > (data.len() - 4) || size < 8 {
            return Err(malformed_error!(
                "The resource format is invalid! size - {}",
                size
            ));
        }

        let magic = parser.read_le::<u32>()?;
        if magic != RESOURCE_MAGIC {
            return Err(malformed_error!("Invalid resource magic: 0x{:X}", magic));
        }

        let mut res = Resource {
            res_mgr_header_version: parser.read_le::<u32>()?,
            header_size: parser.read_le::<u32>()?,
            ..Default::default()
        };

        if res.res_mgr_header_version > 1 {
            // Newer headers are skipped as a whole
            parser.advance_by(res.header_size as usize)?;
        } else {
            res.reader_type = read_binary_string(&mut parser)?;
            res.resource_set_type = read_binary_string(&mut parser)?;
        }

        res.rr_header_offset = parser.pos();

        res.rr_version = parser.read_le::<u32>()?;
        if res.rr_version != 1 && res.rr_version != 2 {
            return Err(malformed_error!(
                "Unsupported resource reader version - {}",
                res.rr_version
            ));
        }

        if res.rr_version == 2 && parser.peek_byte()? == b'*' {
            // '***DEBUG***' marker of debug writers
            let _ = parser.read_string_utf8()?;
            res.is_debug = true;
        }

        res.resource_count = parser.read_le::<u32>()?;
        if res.resource_count as usize > parser.remaining() / 8 {
            return Err(malformed_error!(
                "Resource count {} exceeds the blob size",
                res.resource_count
            ));
        }

        let type_count = parser.read_le::<u32>()?;
        if type_count as usize > parser.remaining() {
            return Err(malformed_error!(
                "Type count {} exceeds the blob size",
                type_count
            ));
        }
        for _ in 0..type_count {
            res.type_names.push(read_binary_string(&mut parser)?);
        }

        // Alignment to 8 bytes, relative to the start of the stream
        let misalignment = (parser.pos() - 4) & 7;
        if misalignment != 0 {
            res.padding = 8 - misalignment;
            parser.advance_by(res.padding)?;
        }

        for _ in 0..res.resource_count {
            res.name_hashes.push(parser.read_le::<u32>()?);
        }

        for _ in 0..res.resource_count {
            res.name_positions.push(parser.read_le::<u32>()?);
        }

        // +4 for the size prefix of the embedding
        res.data_section_offset = parser.read_le::<u32>()? as usize + 4;
        res.name_section_offset = parser.pos();

        if res.data_section_offset < res.name_section_offset || res.data_section_offset > data.len()
        {
            return Err(malformed_error!(
                "Invalid data section offset - {}",
                res.data_section_offset
            ));
        }

        Ok(res)
    }

    /// Decode every entry.
    ///
    /// # Errors
    /// Returns an error if a name or value cannot be decoded.
    pub fn read_resources(&self, data: &[u8]) -> Result<BTreeMap<String, ResourceEntry>> {
        let mut resources = BTreeMap::new();
        let mut parser = Parser::new(data);

        for (name_hash, position) in self.name_hashes.iter().zip(&self.name_positions) {
            parser.seek(self.name_section_offset + *position as usize)?;

            let name = read_resource_name(&mut parser)?;
            let data_offset = parser.read_le::<u32>()?;

            parser.seek(self.data_section_offset + data_offset as usize)?;

            let value = if self.rr_version == 1 {
                self.read_value_v1(&mut parser)?
            } else {
                let type_code = parser.read_7bit_encoded_int()?;
                ResourceType::from_type_code(type_code, &mut parser)?
            };

            resources.insert(
                name.clone(),
                ResourceEntry {
                    name,
                    name_hash: *name_hash,
                    data: value,
                },
            );
        }

        Ok(resources)
    }

    fn read_value_v1(&self, parser: &mut Parser) -> Result<ResourceType> {
        let type_index = parser.read_7bit_encoded_int()?;
        if type_index == u32::MAX {
            return Ok(ResourceType::Null);
        }

        match self.type_names.get(type_index as usize) {
            Some(type_name) => ResourceType::from_type_name(type_name, parser),
            None => Err(malformed_error!("Invalid type index - {}", type_index)),
        }
    }
}
