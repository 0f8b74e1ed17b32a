//! Encoder for the binary `.resources` format.
//!
//! [`ResourceWriter`] produces version 2 blobs with only primitive values, so the
//! type table is always empty. Entries are ordered by the hash of their name, the
//! order the runtime's binary search relies on. The output carries the `u32` size
//! prefix used for manifest resources, so it can be handed directly to
//! [`crate::metadata::CilAssembly::add_resource`].

use std::collections::HashSet;

use crate::{
    file::io::{write_7bit_encoded_int, write_le},
    metadata::resources::{resource_name_hash, ResourceType, RESOURCE_MAGIC},
    Result,
};

const READER_TYPE: &str = "System.Resources.ResourceReader, mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089";
const RESOURCE_SET_TYPE: &str = "System.Resources.RuntimeResourceSet";
const PADDING: &[u8; 3] = b"PAD";

/// Builds an embedded `.resources` blob.
///
/// ```rust
/// use dotlint::metadata::resources::{parse_dotnet_resource, ResourceWriter};
///
/// let blob = ResourceWriter::new()
///     .add_string("IDS_MISSING", "missing dispose")
///     .build()?;
/// let entries = parse_dotnet_resource(&blob)?;
/// assert_eq!(entries["IDS_MISSING"].data.as_string(), Some("missing dispose"));
/// # Ok::<(), dotlint::Error>(())
/// ```
#[derive(Debug, Default, Clone)]
pub struct ResourceWriter {
    entries: Vec<(String, ResourceType)>,
}

impl ResourceWriter {
    /// An empty writer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a string entry.
    #[must_use]
    pub fn add_string(self, name: &str, value: &str) -> Self {
        self.add(name, ResourceType::String(value.to_string()))
    }

    /// Add an entry of any primitive type.
    #[must_use]
    pub fn add(mut self, name: &str, value: ResourceType) -> Self {
        self.entries.push((name.to_string(), value));
        self
    }

    /// Number of entries added so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no entry was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Encode the blob, size prefix included.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for empty or duplicate names and for
    /// content exceeding the 32-bit offsets of the format.
    pub fn build(mut self) -> Result<Vec<u8>> {
        let mut seen = HashSet::new();
        for (name, _) in &self.entries {
            if name.is_empty() {
                return Err(malformed_error!("Resource names must not be empty"));
            }
            if !seen.insert(name.as_str()) {
                return Err(malformed_error!("Duplicate resource name - {}", name));
            }
        }

        self.entries
            .sort_by_key(|(name, _)| resource_name_hash(name));

        let mut stream = Vec::new();

        // ResourceManager header
        write_le(&mut stream, RESOURCE_MAGIC);
        write_le(&mut stream, 1u32);
        let mut reader_info = Vec::new();
        write_prefixed_utf8(&mut reader_info, READER_TYPE)?;
        write_prefixed_utf8(&mut reader_info, RESOURCE_SET_TYPE)?;
        write_le(&mut stream, to_u32(reader_info.len())?);
        stream.extend_from_slice(&reader_info);

        // RuntimeResourceReader header
        write_le(&mut stream, 2u32);
        write_le(&mut stream, to_u32(self.entries.len())?);
        write_le(&mut stream, 0u32);

        let mut pad = 0;
        while stream.len() & 7 != 0 {
            stream.push(PADDING[pad % PADDING.len()]);
            pad += 1;
        }

        let mut names = Vec::new();
        let mut data = Vec::new();
        let mut positions = Vec::with_capacity(self.entries.len());

        for (name, value) in &self.entries {
            positions.push(to_u32(names.len())?);

            let utf16: Vec<u16> = name.encode_utf16().collect();
            write_7bit_encoded_int(&mut names, to_u32(utf16.len() * 2)?);
            for unit in utf16 {
                write_le(&mut names, unit);
            }
            write_le(&mut names, to_u32(data.len())?);

            value.write(&mut data);
        }

        for (name, _) in &self.entries {
            write_le(&mut stream, resource_name_hash(name));
        }
        for position in positions {
            write_le(&mut stream, position);
        }

        let data_section_offset = stream.len() + 4 + names.len();
        write_le(&mut stream, to_u32(data_section_offset)?);
        stream.extend_from_slice(&names);
        stream.extend_from_slice(&data);

        let mut blob = Vec::with_capacity(stream.len() + 4);
        write_le(&mut blob, to_u32(stream.len())?);
        blob.extend_from_slice(&stream);

        log::trace!(
            "encoded {} resources into {} bytes",
            self.entries.len(),
            blob.len()
        );

        Ok(blob)
    }
}

fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value).map_err(|_| malformed_error!("Resource content too large - {}", value))
}

fn write_prefixed_utf8(buffer: &mut Vec<u8>, text: &str) -> Result<()> {
    write_7bit_encoded_int(buffer, to_u32(text.len())?);
    buffer.extend_from_slice(text.as_bytes());
    Ok(())
}
