//! Type definitions of the analysed assembly.
//!
//! A [`TypeDef`] records what the rules need to know about a declared type: its
//! name, attribute flags, [`TypeFlavor`], base type, directly implemented interfaces,
//! methods and custom attributes. Base types and interfaces are referenced by full
//! name; whether they can be followed further depends on whether the
//! [`crate::metadata::CilAssembly`] defines them.
//!
//! # Key Types
//! - [`TypeDef`] - A declared type
//! - [`TypeFlavor`] - Class, interface, value type, enum or delegate
//! - [`TypeAttributes`] - Raw `TypeAttributes` flags
//! - [`TypeDefBuilder`] - Fluent construction

mod attributes;

pub use attributes::{TypeAttributes, TYPE_VISIBILITY_MASK};

use strum::{AsRefStr, Display};

use crate::metadata::{
    customattributes::{has_generated_code_marker, CustomAttribute},
    method::MethodDef,
    signatures::{names, MethodSignature},
};

/// The kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
pub enum TypeFlavor {
    /// A reference type that is not a delegate
    Class,
    /// An interface
    Interface,
    /// A value type that is not an enum
    ValueType,
    /// An enum
    Enum,
    /// A delegate type
    Delegate,
}

impl TypeFlavor {
    /// Derive the flavor from the type's flags and the full name of its base type.
    #[must_use]
    pub fn infer(flags: TypeAttributes, base: Option<&str>) -> Self {
        if flags.is_interface() {
            return TypeFlavor::Interface;
        }

        match base {
            Some(names::ENUM) => TypeFlavor::Enum,
            Some(names::VALUE_TYPE) => TypeFlavor::ValueType,
            Some(names::MULTICAST_DELEGATE | names::DELEGATE) => TypeFlavor::Delegate,
            _ => TypeFlavor::Class,
        }
    }
}

/// A type declared in the analysed assembly.
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// Namespace, empty for the global namespace
    pub namespace: String,
    /// Simple name
    pub name: String,
    /// Attribute flags
    pub flags: TypeAttributes,
    /// Kind of the type
    pub flavor: TypeFlavor,
    /// Full name of the base type, `None` for interfaces and `System.Object`
    pub base: Option<String>,
    /// Full names of the directly implemented interfaces
    pub interfaces: Vec<String>,
    /// Declared methods
    pub methods: Vec<MethodDef>,
    /// Attributes applied to the type
    pub custom_attributes: Vec<CustomAttribute>,
}

impl TypeDef {
    /// Returns the full name (`Namespace.Name`) of the type.
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns true if the type is an interface.
    #[must_use]
    pub fn is_interface(&self) -> bool {
        self.flavor == TypeFlavor::Interface
    }

    /// Returns true if the type carries a tool- or compiler-generated marker.
    #[must_use]
    pub fn is_generated_code(&self) -> bool {
        has_generated_code_marker(&self.custom_attributes)
    }

    /// Returns true if `interface` is listed among the directly implemented interfaces.
    #[must_use]
    pub fn implements_directly(&self, interface: &str) -> bool {
        self.interfaces.iter().any(|i| i == interface)
    }

    /// The first declared method matching `signature`.
    #[must_use]
    pub fn find_method(&self, signature: &MethodSignature) -> Option<&MethodDef> {
        self.methods.iter().find(|m| m.matches(signature))
    }

    /// Returns true if a method matching `signature` is declared.
    #[must_use]
    pub fn has_method(&self, signature: &MethodSignature) -> bool {
        self.find_method(signature).is_some()
    }

    /// Returns true if the type declares a finalizer.
    #[must_use]
    pub fn has_finalizer(&self) -> bool {
        self.methods.iter().any(MethodDef::is_finalizer)
    }
}

/// Builder for [`TypeDef`].
///
/// The flavor is inferred from the flags and base type unless set explicitly.
///
/// ```rust
/// use dotlint::metadata::{TypeDefBuilder, TypeFlavor};
///
/// let ty = TypeDefBuilder::new("Sample", "Color").base("System.Enum").build();
/// assert_eq!(ty.flavor, TypeFlavor::Enum);
/// assert_eq!(ty.fullname(), "Sample.Color");
/// ```
pub struct TypeDefBuilder {
    ty: TypeDef,
    flavor: Option<TypeFlavor>,
}

impl TypeDefBuilder {
    /// Start a public class deriving from `System.Object`.
    #[must_use]
    pub fn new(namespace: &str, name: &str) -> Self {
        TypeDefBuilder {
            ty: TypeDef {
                namespace: namespace.to_string(),
                name: name.to_string(),
                flags: TypeAttributes::PUBLIC | TypeAttributes::BEFORE_FIELD_INIT,
                flavor: TypeFlavor::Class,
                base: Some(names::OBJECT.to_string()),
                interfaces: Vec::new(),
                methods: Vec::new(),
                custom_attributes: Vec::new(),
            },
            flavor: None,
        }
    }

    /// Start a public interface.
    #[must_use]
    pub fn interface(namespace: &str, name: &str) -> Self {
        let mut builder = TypeDefBuilder::new(namespace, name);
        builder.ty.flags =
            TypeAttributes::PUBLIC | TypeAttributes::INTERFACE | TypeAttributes::ABSTRACT;
        builder.ty.base = None;
        builder
    }

    /// Set the base type.
    #[must_use]
    pub fn base(mut self, full_name: &str) -> Self {
        self.ty.base = Some(full_name.to_string());
        self
    }

    /// Add a directly implemented interface.
    #[must_use]
    pub fn implements(mut self, interface: &str) -> Self {
        self.ty.interfaces.push(interface.to_string());
        self
    }

    /// Replace the attribute flags.
    #[must_use]
    pub fn flags(mut self, flags: TypeAttributes) -> Self {
        self.ty.flags = flags;
        self
    }

    /// Force the flavor instead of inferring it.
    #[must_use]
    pub fn flavor(mut self, flavor: TypeFlavor) -> Self {
        self.flavor = Some(flavor);
        self
    }

    /// Add a method.
    #[must_use]
    pub fn method(mut self, method: MethodDef) -> Self {
        self.ty.methods.push(method);
        self
    }

    /// Attach a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.ty.custom_attributes.push(attribute);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(mut self) -> TypeDef {
        self.ty.flavor = self
            .flavor
            .unwrap_or_else(|| TypeFlavor::infer(self.ty.flags, self.ty.base.as_deref()));
        self.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::method::MethodDefBuilder;

    #[test]
    fn flavor_inference() {
        let flags = TypeAttributes::PUBLIC;
        assert_eq!(TypeFlavor::infer(flags, Some(names::OBJECT)), TypeFlavor::Class);
        assert_eq!(
            TypeFlavor::infer(flags, Some(names::VALUE_TYPE)),
            TypeFlavor::ValueType
        );
        assert_eq!(
            TypeFlavor::infer(flags, Some(names::MULTICAST_DELEGATE)),
            TypeFlavor::Delegate
        );
        assert_eq!(
            TypeFlavor::infer(flags | TypeAttributes::INTERFACE, None),
            TypeFlavor::Interface
        );
    }

    #[test]
    fn interface_builder() {
        let iface = TypeDefBuilder::interface("Sample", "IResource")
            .implements(names::IDISPOSABLE)
            .build();
        assert!(iface.is_interface());
        assert!(iface.base.is_none());
        assert!(iface.implements_directly(names::IDISPOSABLE));
    }

    #[test]
    fn finalizer_lookup() {
        let ty = TypeDefBuilder::new("", "Holder")
            .method(MethodDefBuilder::new("Holder", "Finalize").build())
            .build();
        assert_eq!(ty.fullname(), "Holder");
        assert!(ty.has_finalizer());
        assert!(ty.has_method(&MethodSignature::FINALIZE));
        assert!(!ty.has_method(&MethodSignature::DISPOSE_BOOL));
    }
}
