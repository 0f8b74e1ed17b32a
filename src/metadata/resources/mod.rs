//! Embedded `.resources` blobs.
//!
//! Strongly typed resource classes generated by `resgen` read their values from a
//! manifest resource named after the class (`Namespace.Strings.resources`). This
//! module parses and writes that binary format and exposes the string entries of
//! a blob as a [`StringTable`].
//!
//! # Key Types
//! - [`Resource`] - Parsed headers of a blob
//! - [`ResourceType`] - A decoded value
//! - [`ResourceWriter`] - Encoder for the same format
//! - [`StringTable`] - The string entries of one blob
mod parser;
mod types;
mod writer;

pub use parser::{parse_dotnet_resource, resource_name_hash, Resource};
pub use types::*;
pub use writer::ResourceWriter;

use std::collections::HashMap;

use crate::Result;

/// The string entries of a `.resources` blob, keyed by resource name.
///
/// Entries of other types are skipped. Lookups are exact and case-sensitive, the
/// way the generated accessors call `ResourceManager.GetString`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StringTable {
    entries: HashMap<String, String>,
}

impl StringTable {
    /// Parse a size-prefixed blob and keep its string entries.
    ///
    /// # Errors
    /// Returns the parser error if the blob is malformed.
    pub fn from_blob(data: &[u8]) -> Result<Self> {
        let entries = parse_dotnet_resource(data)?
            .into_values()
            .filter_map(|entry| match entry.data {
                ResourceType::String(value) => Some((entry.name, value)),
                _ => None,
            })
            .collect();

        Ok(StringTable { entries })
    }

    /// The value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of string entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the blob held no string entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the entry names.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_entries_only() {
        let blob = ResourceWriter::new()
            .add_string("IDS_MISSING", "missing dispose")
            .add("Limit", ResourceType::Int32(10))
            .add("Icon", ResourceType::ByteArray(vec![1, 2, 3]))
            .build()
            .unwrap();

        let table = StringTable::from_blob(&blob).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("IDS_MISSING"), Some("missing dispose"));
        assert_eq!(table.get("ids_missing"), None);
        assert_eq!(table.get("Limit"), None);
        assert_eq!(table.keys().collect::<Vec<_>>(), vec!["IDS_MISSING"]);
    }

    #[test]
    fn malformed_blob() {
        assert!(StringTable::from_blob(&[0u8; 16]).is_err());
        assert!(StringTable::from_blob(&[]).is_err());
    }
}
