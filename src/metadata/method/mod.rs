//! Method definitions.
//!
//! A [`MethodDef`] is a method declared in the analysed assembly: its signature,
//! attribute flags, custom attributes and, unless it is abstract or extern, its
//! decoded [`MethodBody`].

mod types;

pub use types::*;

use crate::{
    disassembler::MethodBody,
    metadata::{
        customattributes::{has_generated_code_marker, CustomAttribute},
        signatures::{CallTarget, MethodSignature},
    },
};

/// A method declared in the analysed assembly.
#[derive(Debug, Clone)]
pub struct MethodDef {
    /// Member name
    pub name: String,
    /// Full name of the declaring type
    pub declaring_type: String,
    /// Full name of the return type
    pub return_type: String,
    /// Full names of the formal parameter types
    pub params: Vec<String>,
    /// Accessibility
    pub flags_access: MethodAccessFlags,
    /// Static, virtual, special-name and similar modifiers
    pub flags_modifiers: MethodModifiers,
    /// The decoded body; `None` for abstract, extern and runtime-implemented methods
    pub body: Option<MethodBody>,
    /// Attributes applied to the method
    pub custom_attributes: Vec<CustomAttribute>,
}

impl MethodDef {
    /// Returns true if the method is static.
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::STATIC)
    }

    /// Returns true if the method receives an implicit `this`.
    #[must_use]
    pub fn has_this(&self) -> bool {
        !self.is_static()
    }

    /// Returns true if the method is abstract.
    #[must_use]
    pub fn is_abstract(&self) -> bool {
        self.flags_modifiers.contains(MethodModifiers::ABSTRACT)
    }

    /// Returns true if the method has executable IL with at least one instruction.
    #[must_use]
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|body| !body.is_empty())
    }

    /// Returns true for a static, parameterless property getter (`get_*`, special name).
    #[must_use]
    pub fn is_getter(&self) -> bool {
        self.is_static()
            && self.params.is_empty()
            && self.name.starts_with("get_")
            && self.flags_modifiers.contains(MethodModifiers::SPECIAL_NAME)
    }

    /// Returns true if this is the `void Finalize()` override.
    #[must_use]
    pub fn is_finalizer(&self) -> bool {
        self.has_this() && self.matches(&MethodSignature::FINALIZE)
    }

    /// Returns true if the method's name, return type and parameters match `signature`.
    #[must_use]
    pub fn matches(&self, signature: &MethodSignature) -> bool {
        signature.matches(&self.name, &self.return_type, &self.params)
    }

    /// Returns true if the method itself carries a generated-code attribute.
    #[must_use]
    pub fn is_generated_code(&self) -> bool {
        has_generated_code_marker(&self.custom_attributes)
    }

    /// Returns true if `target` refers to this method.
    #[must_use]
    pub fn is_target_of(&self, target: &CallTarget) -> bool {
        self.declaring_type == target.declaring_type
            && self.name == target.name
            && self.return_type == target.return_type
            && self.params == target.params
            && self.has_this() == target.has_this
    }

    /// The call target describing a call to this method.
    #[must_use]
    pub fn as_target(&self) -> CallTarget {
        CallTarget {
            declaring_type: self.declaring_type.clone(),
            name: self.name.clone(),
            params: self.params.clone(),
            return_type: self.return_type.clone(),
            has_this: self.has_this(),
        }
    }

    /// Custom attributes of type `type_name`.
    pub fn attributes_of<'a>(
        &'a self,
        type_name: &'a str,
    ) -> impl Iterator<Item = &'a CustomAttribute> + 'a {
        self.custom_attributes
            .iter()
            .filter(move |ca| ca.is(type_name))
    }
}

/// Builder for [`MethodDef`].
///
/// ```rust
/// use dotlint::metadata::{MethodDefBuilder, MethodModifiers, MethodSignature};
///
/// let dispose = MethodDefBuilder::new("Sample.Widget", "Dispose")
///     .param("System.Boolean")
///     .modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG)
///     .build();
///
/// assert!(dispose.matches(&MethodSignature::DISPOSE_BOOL));
/// assert!(!dispose.has_body());
/// ```
pub struct MethodDefBuilder {
    method: MethodDef,
}

impl MethodDefBuilder {
    /// Start a public instance method returning `void`.
    #[must_use]
    pub fn new(declaring_type: &str, name: &str) -> Self {
        MethodDefBuilder {
            method: MethodDef {
                name: name.to_string(),
                declaring_type: declaring_type.to_string(),
                return_type: crate::metadata::signatures::names::VOID.to_string(),
                params: Vec::new(),
                flags_access: MethodAccessFlags::PUBLIC,
                flags_modifiers: MethodModifiers::HIDE_BY_SIG,
                body: None,
                custom_attributes: Vec::new(),
            },
        }
    }

    /// Set the return type.
    #[must_use]
    pub fn returns(mut self, type_name: &str) -> Self {
        self.method.return_type = type_name.to_string();
        self
    }

    /// Append a formal parameter.
    #[must_use]
    pub fn param(mut self, type_name: &str) -> Self {
        self.method.params.push(type_name.to_string());
        self
    }

    /// Set the accessibility.
    #[must_use]
    pub fn access(mut self, access: MethodAccessFlags) -> Self {
        self.method.flags_access = access;
        self
    }

    /// Replace the modifier set.
    #[must_use]
    pub fn modifiers(mut self, modifiers: MethodModifiers) -> Self {
        self.method.flags_modifiers = modifiers;
        self
    }

    /// Make the method static.
    #[must_use]
    pub fn static_(mut self) -> Self {
        self.method.flags_modifiers |= MethodModifiers::STATIC;
        self
    }

    /// Make the method a static `get_*` special-name property getter.
    #[must_use]
    pub fn getter(mut self) -> Self {
        self.method.flags_modifiers |= MethodModifiers::STATIC | MethodModifiers::SPECIAL_NAME;
        self
    }

    /// Attach a body.
    #[must_use]
    pub fn body(mut self, body: MethodBody) -> Self {
        self.method.body = Some(body);
        self
    }

    /// Attach a custom attribute.
    #[must_use]
    pub fn attribute(mut self, attribute: CustomAttribute) -> Self {
        self.method.custom_attributes.push(attribute);
        self
    }

    /// Finish building.
    #[must_use]
    pub fn build(self) -> MethodDef {
        self.method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{disassembler::BodyBuilder, metadata::signatures::names};

    #[test]
    fn getter_shape() {
        let getter = MethodDefBuilder::new("Sample.Strings", "get_IDS_MISSING")
            .returns(names::STRING)
            .getter()
            .build();
        assert!(getter.is_getter());
        assert!(getter.is_static());

        let instance = MethodDefBuilder::new("Sample.Strings", "get_Name")
            .returns(names::STRING)
            .modifiers(MethodModifiers::SPECIAL_NAME)
            .build();
        assert!(!instance.is_getter());
    }

    #[test]
    fn finalizer_detection() {
        let finalize = MethodDefBuilder::new("Sample.A", "Finalize")
            .access(MethodAccessFlags::FAMILY)
            .modifiers(MethodModifiers::VIRTUAL | MethodModifiers::HIDE_BY_SIG)
            .body(BodyBuilder::new().ret().build().unwrap())
            .build();
        assert!(finalize.is_finalizer());
        assert!(finalize.has_body());

        let static_finalize = MethodDefBuilder::new("Sample.A", "Finalize").static_().build();
        assert!(!static_finalize.is_finalizer());
    }

    #[test]
    fn empty_body_is_no_body() {
        let method = MethodDefBuilder::new("Sample.A", "M")
            .body(BodyBuilder::new().build().unwrap())
            .build();
        assert!(!method.has_body());
    }

    #[test]
    fn target_round_trip() {
        let method = MethodDefBuilder::new("Sample.A", "Dispose")
            .param(names::BOOLEAN)
            .build();
        let target = method.as_target();
        assert!(method.is_target_of(&target));
        assert_eq!(target.arg_count(), 2);

        let static_target = CallTarget {
            has_this: false,
            ..target
        };
        assert!(!method.is_target_of(&static_target));
    }
}
