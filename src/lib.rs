// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]

//! # dotlint
//!
//! Static checks for .NET CIL method bodies that answer one question precisely:
//! which literal string does a call receive? On top of that answer, `dotlint`
//! implements the debug-dispose rules, which verify that disposable types can
//! report objects that were finalized without ever being disposed.
//!
//! ## Features
//!
//! - **String provenance** - Backward tracing of call arguments through locals,
//!   `String.Concat` prefixes and strongly typed resource properties
//! - **Fail-closed analysis** - Anything the tracer cannot follow is reported as
//!   unresolved, never guessed and never an error
//! - **Resource tables** - Reading and writing of embedded `.resources` blobs
//! - **CIL decoding** - Raw method bodies into an indexable instruction stream
//! - **Parallel rule runs** - Types and methods checked on the rayon pool with a
//!   shared, concurrent resource cache
//!
//! ## Quick Start
//!
//! ```rust
//! use dotlint::prelude::*;
//!
//! let write_line_if = CallTarget::new_static(
//!     "System.Diagnostics.Debug",
//!     "WriteLineIf",
//!     &[names::BOOLEAN, names::STRING],
//!     names::VOID,
//! );
//!
//! let body = BodyBuilder::new()
//!     .ldarg(1)
//!     .ldc_i4(0)
//!     .ceq()
//!     .ldstr("****** Missing Dispose() call for Widget. ******")
//!     .call(write_line_if)
//!     .ret()
//!     .build()?;
//!
//! let dispose = MethodDefBuilder::new("Sample.Widget", "Dispose")
//!     .param(names::BOOLEAN)
//!     .modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG)
//!     .body(body)
//!     .build();
//! let widget = TypeDefBuilder::new("Sample", "Widget")
//!     .implements(names::IDISPOSABLE)
//!     .method(dispose)
//!     .build();
//!
//! let assembly = CilAssembly::new("Sample").with_type(widget);
//! let report = Runner::with_default_rules().run(&assembly);
//! assert_eq!(
//!     report.result_for(
//!         "EnsureMissDispStatement",
//!         "Sample.Widget::Dispose(System.Boolean)"
//!     ),
//!     Some(RuleResult::Success)
//! );
//! assert_eq!(
//!     report.result_for("EnsureFinalizer", "Sample.Widget"),
//!     Some(RuleResult::Failure)
//! );
//! # Ok::<(), dotlint::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`disassembler`] - CIL decoding and the instruction stream model
//! - [`metadata`] - Types, methods, signatures, custom attributes and resources
//! - [`analysis`] - Stack effects, local round trips and the string resolver
//! - [`rules`] - The dispose rules and the parallel runner
//!
//! ## Logging
//!
//! `dotlint` logs through the [`log`] facade and never installs a logger.
//! Resolution steps are logged at `trace`, outcomes and verdicts at `debug`, and
//! malformed resource blobs or exhausted step budgets at `warn`.
#[macro_use]
pub(crate) mod error;
pub(crate) mod file;

/// Shared functionality which is used in unit-tests
#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use dotlint::prelude::*;
///
/// let assembly = CilAssembly::new("Sample");
/// let report = Runner::with_default_rules().run(&assembly);
/// assert!(report.is_clean());
/// ```
pub mod prelude;

/// CIL instruction decoding and the instruction stream model.
///
/// A method body is an immutable, indexable sequence of [`disassembler::Instruction`]s.
/// Navigation is index arithmetic; branch targets are recorded as indices so any
/// backward walk can tell where control flow joins.
///
/// # Key Types
///
/// - [`disassembler::MethodBody`] - Instructions, locals and join points of one body
/// - [`disassembler::Instruction`] - One decoded instruction
/// - [`disassembler::OpCategory`] - What an instruction does, as far as tracing cares
/// - [`disassembler::BodyBuilder`] - Fluent construction of bodies
///
/// # Main Functions
///
/// - [`disassembler::decode_body`] - Decode raw CIL into a [`disassembler::MethodBody`]
///
/// # Examples
///
/// ```rust
/// use dotlint::disassembler::{decode_body, OpCategory, TokenMap};
///
/// // ldstr 0x70000001; pop; ret
/// let code = [0x72, 0x01, 0x00, 0x00, 0x70, 0x26, 0x2A];
/// let tokens = TokenMap::new().with_string(0x7000_0001, "hello");
/// let body = decode_body(&code, Vec::new(), &tokens)?;
///
/// assert_eq!(body.len(), 3);
/// assert_eq!(body.get(0).unwrap().category, OpCategory::PushLiteral);
/// assert_eq!(body.get(0).unwrap().string_literal(), Some("hello"));
/// # Ok::<(), dotlint::Error>(())
/// ```
pub mod disassembler;

/// The assembly model the analysis runs on.
///
/// # Key Components
///
/// - [`metadata::CilAssembly`] - Types and embedded resources of one assembly
/// - [`metadata::TypeDef`] and [`metadata::MethodDef`] - Declared types and methods
/// - [`metadata::CallTarget`] - The resolved target of a call instruction
/// - [`metadata::resources`] - `.resources` blob reading and writing
pub mod metadata;

/// Literal string provenance analysis.
///
/// See [`analysis::resolve_argument`] for the central operation.
pub mod analysis;

/// Dispose debugging rules and the rule runner.
pub mod rules;

/// `dotlint` Result type
///
/// A type alias for [`std::result::Result<T, Error>`] where the error type is always [`Error`].
/// Only loading operations are fallible; the analysis itself never returns an error.
///
/// # Examples
///
/// ```rust
/// use dotlint::{disassembler::{BodyBuilder, MethodBody}, Result};
///
/// fn literal_body(text: &str) -> Result<MethodBody> {
///     BodyBuilder::new().ldstr(text).pop().ret().build()
/// }
/// # assert!(literal_body("x").is_ok());
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// `dotlint` Error type
///
/// Raised while decoding CIL, parsing `.resources` blobs or reading input files.
///
/// # Examples
///
/// ```rust
/// use dotlint::{metadata::resources::parse_dotnet_resource, Error};
///
/// match parse_dotnet_resource(&[0x01, 0x02]) {
///     Ok(_) => println!("parsed"),
///     Err(Error::Malformed { message, .. }) => println!("Malformed: {}", message),
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
pub use error::Error;

/// Provides access to the bounds-checked byte cursor.
///
/// # Example
///
/// ```rust
/// use dotlint::Parser;
///
/// let data = [0x2A, 0x00, 0x00, 0x00];
/// let mut parser = Parser::new(&data);
/// assert_eq!(parser.read_le::<u32>()?, 0x2A);
/// # Ok::<(), dotlint::Error>(())
/// ```
pub use file::parser::Parser;
