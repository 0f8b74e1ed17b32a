use bitflags::bitflags;

/// Bitmask for visibility extraction
pub const TYPE_VISIBILITY_MASK: u32 = 0x0000_0007;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    /// `TypeAttributes` of ECMA-335 II.23.1.15
    pub struct TypeAttributes: u32 {
        /// Visible outside the assembly
        const PUBLIC = 0x0000_0001;
        /// Nested with public visibility
        const NESTED_PUBLIC = 0x0000_0002;
        /// Nested with private visibility
        const NESTED_PRIVATE = 0x0000_0003;
        /// Type is an interface
        const INTERFACE = 0x0000_0020;
        /// Type cannot be instantiated
        const ABSTRACT = 0x0000_0080;
        /// Type cannot be derived from
        const SEALED = 0x0000_0100;
        /// Name is special
        const SPECIAL_NAME = 0x0000_0400;
        /// Runtime treats the name specially
        const RT_SPECIAL_NAME = 0x0000_0800;
        /// Imported from a type library
        const IMPORT = 0x0000_1000;
        /// Serializable
        const SERIALIZABLE = 0x0000_2000;
        /// Static fields may be initialized lazily
        const BEFORE_FIELD_INIT = 0x0010_0000;
    }
}

impl TypeAttributes {
    /// Returns true if the interface semantics bit is set.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.contains(TypeAttributes::INTERFACE)
    }

    /// The visibility part of the flags.
    #[must_use]
    pub fn visibility(&self) -> u32 {
        self.bits() & TYPE_VISIBILITY_MASK
    }
}
