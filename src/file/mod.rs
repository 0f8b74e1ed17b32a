//! Byte-level input handling.
//!
//! The analysis core works on already-decoded method bodies, but two inputs still
//! arrive as raw bytes: CIL code streams (see [`crate::disassembler::decode_body`])
//! and embedded `.resources` blobs (see [`crate::metadata::resources`]). This module
//! provides the bounds-checked primitives both of them are parsed with.
//!
//! # Key Components
//!
//! - [`crate::file::parser::Parser`] - Cursor-based reader over a byte slice
//! - [`crate::file::io`] - Little-endian primitive reads and writes

pub mod io;
pub mod parser;
