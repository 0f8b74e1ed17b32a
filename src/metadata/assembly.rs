//! The analysed assembly.
//!
//! [`CilAssembly`] is the unit one analysis pass runs over: the declared types
//! with their methods, and the embedded manifest resources as raw blobs. Types
//! outside the assembly are only known by name; base-type and interface walks
//! stop at the first name that does not resolve to a declared type.

use std::{
    collections::{HashMap, HashSet},
    path::Path,
};

use crate::{
    metadata::{method::MethodDef, signatures::CallTarget, typesystem::TypeDef},
    Result,
};

/// A loaded assembly: its types and embedded resources.
///
/// ```rust
/// use dotlint::metadata::{names, CilAssembly, TypeDefBuilder};
///
/// let assembly = CilAssembly::new("Sample")
///     .with_type(TypeDefBuilder::new("Sample", "Base").implements(names::IDISPOSABLE).build())
///     .with_type(TypeDefBuilder::new("Sample", "Derived").base("Sample.Base").build());
///
/// let derived = assembly.type_by_name("Sample.Derived").unwrap();
/// assert!(assembly.implements(derived, names::IDISPOSABLE));
/// ```
#[derive(Debug, Default)]
pub struct CilAssembly {
    name: String,
    types: Vec<TypeDef>,
    type_index: HashMap<String, usize>,
    resources: HashMap<String, Vec<u8>>,
}

impl CilAssembly {
    /// An empty assembly named `name`.
    #[must_use]
    pub fn new(name: &str) -> Self {
        CilAssembly {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Add a type, builder style.
    #[must_use]
    pub fn with_type(mut self, ty: TypeDef) -> Self {
        self.add_type(ty);
        self
    }

    /// Add an embedded resource, builder style.
    #[must_use]
    pub fn with_resource(mut self, name: &str, data: Vec<u8>) -> Self {
        self.add_resource(name, data);
        self
    }

    /// Add a type. A later type with the same full name replaces the earlier one
    /// in name lookups.
    pub fn add_type(&mut self, ty: TypeDef) {
        let fullname = ty.fullname();
        if self.type_index.contains_key(&fullname) {
            log::warn!("{}: duplicate type definition {}", self.name, fullname);
        }

        self.type_index.insert(fullname, self.types.len());
        self.types.push(ty);
    }

    /// Add an embedded resource blob, size prefix included.
    pub fn add_resource(&mut self, name: &str, data: Vec<u8>) {
        self.resources.insert(name.to_string(), data);
    }

    /// Read an embedded resource blob from disk.
    ///
    /// # Errors
    /// Returns [`crate::Error::FileError`] if the file cannot be read.
    pub fn add_resource_file(&mut self, name: &str, path: &Path) -> Result<()> {
        let data = std::fs::read(path)?;
        self.add_resource(name, data);
        Ok(())
    }

    /// The simple name of the assembly.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All declared types in insertion order.
    #[must_use]
    pub fn types(&self) -> &[TypeDef] {
        &self.types
    }

    /// The declared type with full name `fullname`.
    #[must_use]
    pub fn type_by_name(&self, fullname: &str) -> Option<&TypeDef> {
        self.type_index
            .get(fullname)
            .and_then(|index| self.types.get(*index))
    }

    /// All declared methods of all types.
    pub fn methods(&self) -> impl Iterator<Item = &MethodDef> {
        self.types.iter().flat_map(|ty| ty.methods.iter())
    }

    /// The declared method a call to `target` invokes, if it is defined here.
    #[must_use]
    pub fn resolve_method(&self, target: &CallTarget) -> Option<&MethodDef> {
        self.type_by_name(&target.declaring_type)?
            .methods
            .iter()
            .find(|method| method.is_target_of(target))
    }

    /// The embedded resource blob named `name`.
    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&[u8]> {
        self.resources.get(name).map(Vec::as_slice)
    }

    /// Names of all embedded resources.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// The resolvable base types of `ty`, nearest first.
    ///
    /// The walk ends at the first base that is not declared in this assembly, and
    /// at a cycle.
    #[must_use]
    pub fn base_types<'a>(&'a self, ty: &'a TypeDef) -> Vec<&'a TypeDef> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([ty.fullname()]);
        let mut current = ty;

        while let Some(base) = current.base.as_deref().and_then(|b| self.type_by_name(b)) {
            if !visited.insert(base.fullname()) {
                log::warn!("{}: cyclic base type chain at {}", self.name, base.fullname());
                break;
            }
            chain.push(base);
            current = base;
        }

        chain
    }

    /// Returns true if `ty`, one of its resolvable base types, or one of the
    /// resolvable interfaces they implement lists `interface`.
    #[must_use]
    pub fn implements(&self, ty: &TypeDef, interface: &str) -> bool {
        let mut pending: Vec<&TypeDef> = vec![ty];
        pending.extend(self.base_types(ty));
        let mut visited = HashSet::new();

        while let Some(current) = pending.pop() {
            if !visited.insert(current.fullname()) {
                continue;
            }
            if current.implements_directly(interface) {
                return true;
            }
            pending.extend(
                current
                    .interfaces
                    .iter()
                    .filter_map(|name| self.type_by_name(name)),
            );
        }

        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        method::MethodDefBuilder,
        signatures::names,
        typesystem::TypeDefBuilder,
    };

    fn sample() -> CilAssembly {
        CilAssembly::new("Sample")
            .with_type(
                TypeDefBuilder::interface("Sample", "IResource")
                    .implements(names::IDISPOSABLE)
                    .build(),
            )
            .with_type(
                TypeDefBuilder::new("Sample", "Handle")
                    .implements("Sample.IResource")
                    .method(
                        MethodDefBuilder::new("Sample.Handle", "Dispose")
                            .param(names::BOOLEAN)
                            .build(),
                    )
                    .build(),
            )
            .with_type(TypeDefBuilder::new("Sample", "FileHandle").base("Sample.Handle").build())
            .with_type(TypeDefBuilder::new("Sample", "Plain").build())
    }

    #[test]
    fn interface_through_bases_and_interfaces() {
        let assembly = sample();
        let file_handle = assembly.type_by_name("Sample.FileHandle").unwrap();
        let plain = assembly.type_by_name("Sample.Plain").unwrap();

        assert!(assembly.implements(file_handle, names::IDISPOSABLE));
        assert!(!assembly.implements(plain, names::IDISPOSABLE));
        assert_eq!(
            assembly
                .base_types(file_handle)
                .iter()
                .map(|t| t.fullname())
                .collect::<Vec<_>>(),
            vec!["Sample.Handle".to_string()]
        );
    }

    #[test]
    fn cyclic_bases_terminate() {
        let assembly = CilAssembly::new("Broken")
            .with_type(TypeDefBuilder::new("", "A").base("B").build())
            .with_type(TypeDefBuilder::new("", "B").base("A").build());
        let a = assembly.type_by_name("A").unwrap();

        assert_eq!(assembly.base_types(a).len(), 1);
        assert!(!assembly.implements(a, names::IDISPOSABLE));
    }

    #[test]
    fn resolve_declared_method() {
        let assembly = sample();
        let target = CallTarget::new_instance(
            "Sample.Handle",
            "Dispose",
            &[names::BOOLEAN],
            names::VOID,
        );
        assert!(assembly.resolve_method(&target).is_some());

        let static_target =
            CallTarget::new_static("Sample.Handle", "Dispose", &[names::BOOLEAN], names::VOID);
        assert!(assembly.resolve_method(&static_target).is_none());
        assert_eq!(assembly.methods().count(), 1);
    }

    #[test]
    fn resources() {
        let mut assembly = CilAssembly::new("Sample").with_resource("A.resources", vec![1, 2]);
        assert_eq!(assembly.resource("A.resources"), Some(&[1u8, 2][..]));
        assert_eq!(assembly.resource("a.resources"), None);

        let missing = assembly.add_resource_file("B.resources", Path::new("/nonexistent/B"));
        assert!(matches!(missing, Err(crate::Error::FileError(_))));
        assert_eq!(assembly.resource_names().count(), 1);
    }
}
