//! Metadata model of the analysed assembly.
//!
//! This module holds the loading-side data the analysis runs on: declared types and
//! methods, call target descriptions, custom attributes, tokens and embedded
//! `.resources` blobs. It describes what a loader produces; it does not read PE
//! files itself.
//!
//! # Key Components
//!
//! - [`CilAssembly`] - Types and embedded resources of one assembly
//! - [`TypeDef`] / [`MethodDef`] - Declared types and methods
//! - [`CallTarget`] - What a call instruction invokes
//! - [`MethodSignature`] - Fixed shapes rules match methods against
//! - [`resources`] - The binary `.resources` format
//!
//! # Examples
//!
//! ```rust
//! use dotlint::metadata::{names, CilAssembly, MethodDefBuilder, MethodSignature, TypeDefBuilder};
//!
//! let widget = TypeDefBuilder::new("Sample", "Widget")
//!     .implements(names::IDISPOSABLE)
//!     .method(
//!         MethodDefBuilder::new("Sample.Widget", "Dispose")
//!             .param(names::BOOLEAN)
//!             .build(),
//!     )
//!     .build();
//!
//! let assembly = CilAssembly::new("Sample").with_type(widget);
//! let ty = assembly.type_by_name("Sample.Widget").unwrap();
//! assert!(ty.has_method(&MethodSignature::DISPOSE_BOOL));
//! ```

/// Implementation of the analysed assembly
pub mod assembly;
/// Implementation of custom attribute representation
pub mod customattributes;
/// Implementation of declared methods
pub mod method;
/// Implementation of the .NET resources
pub mod resources;
/// Implementation of call targets and method signatures
pub mod signatures;
/// Commonly used metadata token type
pub mod token;
/// Implementation of the declared type system
pub mod typesystem;

pub use assembly::CilAssembly;
pub use customattributes::{CustomAttribute, CustomAttributeArgument};
pub use method::{MethodAccessFlags, MethodDef, MethodDefBuilder, MethodModifiers};
pub use signatures::{names, CallTarget, MethodSignature};
pub use token::Token;
pub use typesystem::{TypeAttributes, TypeDef, TypeDefBuilder, TypeFlavor};
