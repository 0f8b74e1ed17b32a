//! Method attribute flags for .NET CIL methods.
//!
//! The values follow the `MethodAttributes` bit layout of ECMA-335 II.23.1.10.
//! Access is an enumeration packed into the low three bits, so it is extracted
//! with [`METHOD_ACCESS_MASK`] before being interpreted.
//!
//! # Key Types
//! - [`MethodAccessFlags`]: Member accessibility
//! - [`MethodModifiers`]: Static, virtual, abstract, special-name and friends

use bitflags::bitflags;

/// The bits holding the accessibility enumeration
pub const METHOD_ACCESS_MASK: u32 = 0x0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Who may call a method
    pub struct MethodAccessFlags: u32 {
        /// Only the compiler may reference it
        const COMPILER_CONTROLLED = 0x0000;
        /// `private`
        const PRIVATE = 0x0001;
        /// `private protected`
        const FAM_AND_ASSEM = 0x0002;
        /// `internal`
        const ASSEM = 0x0003;
        /// `protected`
        const FAMILY = 0x0004;
        /// `protected internal`
        const FAM_OR_ASSEM = 0x0005;
        /// `public`
        const PUBLIC = 0x0006;
    }
}

impl MethodAccessFlags {
    /// The accessibility part of a raw `MethodAttributes` value
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & METHOD_ACCESS_MASK)
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// Everything in `MethodAttributes` besides accessibility
    pub struct MethodModifiers: u32 {
        /// No `this` parameter
        const STATIC = 0x0010;
        /// `sealed`
        const FINAL = 0x0020;
        /// Dispatched through the vtable
        const VIRTUAL = 0x0040;
        /// Hides base members by name and signature
        const HIDE_BY_SIG = 0x0080;
        /// Introduces a vtable slot instead of reusing the base one
        const NEW_SLOT = 0x0100;
        /// Overridable only where accessible
        const STRICT = 0x0200;
        /// No body
        const ABSTRACT = 0x0400;
        /// Accessor, operator or other name with meaning to tools
        const SPECIAL_NAME = 0x0800;
        /// Name with meaning to the runtime, such as `.ctor`
        const RTSPECIAL_NAME = 0x1000;
        /// Implemented in native code through P/Invoke
        const PINVOKE_IMPL = 0x2000;
    }
}

impl MethodModifiers {
    /// The modifier part of a raw `MethodAttributes` value
    #[must_use]
    pub fn from_method_flags(flags: u32) -> Self {
        Self::from_bits_truncate(flags & !METHOD_ACCESS_MASK)
    }
}
