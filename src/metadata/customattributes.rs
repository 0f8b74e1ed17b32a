//! Custom attributes attached to types and methods.
//!
//! Only the parts the rules look at are modelled: the attribute's type full name
//! and its fixed constructor arguments. String arguments are kept as text, other
//! primitive constants are kept as their display form.

use crate::metadata::signatures::names;

/// A fixed constructor argument of a custom attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CustomAttributeArgument {
    /// A `string` argument; `None` for a null string
    String(Option<String>),
    /// A `bool` argument
    Bool(bool),
    /// An integral argument
    Integer(i64),
    /// A `System.Type` argument, held as the type's full name
    Type(String),
}

impl CustomAttributeArgument {
    /// The string payload, if this is a non-null string argument.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CustomAttributeArgument::String(Some(s)) => Some(s),
            _ => None,
        }
    }
}

/// One custom attribute instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomAttribute {
    /// Full name of the attribute type (the constructor's declaring type)
    pub type_name: String,
    /// Fixed constructor arguments in order
    pub args: Vec<CustomAttributeArgument>,
}

impl CustomAttribute {
    /// An attribute with no constructor arguments.
    #[must_use]
    pub fn new(type_name: impl Into<String>) -> Self {
        CustomAttribute {
            type_name: type_name.into(),
            args: Vec::new(),
        }
    }

    /// `[Conditional(symbol)]`
    #[must_use]
    pub fn conditional(symbol: &str) -> Self {
        CustomAttribute {
            type_name: names::CONDITIONAL_ATTRIBUTE.to_string(),
            args: vec![CustomAttributeArgument::String(Some(symbol.to_string()))],
        }
    }

    /// `[GeneratedCode(tool, version)]`
    #[must_use]
    pub fn generated_code(tool: &str, version: &str) -> Self {
        CustomAttribute {
            type_name: names::GENERATED_CODE_ATTRIBUTE.to_string(),
            args: vec![
                CustomAttributeArgument::String(Some(tool.to_string())),
                CustomAttributeArgument::String(Some(version.to_string())),
            ],
        }
    }

    /// `[CompilerGenerated]`
    #[must_use]
    pub fn compiler_generated() -> Self {
        CustomAttribute::new(names::COMPILER_GENERATED_ATTRIBUTE)
    }

    /// Add a constructor argument.
    #[must_use]
    pub fn arg(mut self, arg: CustomAttributeArgument) -> Self {
        self.args.push(arg);
        self
    }

    /// Returns true if this attribute's type is `type_name`.
    #[must_use]
    pub fn is(&self, type_name: &str) -> bool {
        self.type_name == type_name
    }

    /// The first constructor argument, if it is a non-null string.
    #[must_use]
    pub fn first_string(&self) -> Option<&str> {
        self.args.first().and_then(CustomAttributeArgument::as_str)
    }
}

/// Returns true if any attribute in `attributes` marks tool- or compiler-generated code.
#[must_use]
pub fn has_generated_code_marker(attributes: &[CustomAttribute]) -> bool {
    attributes.iter().any(|ca| {
        ca.is(names::GENERATED_CODE_ATTRIBUTE) || ca.is(names::COMPILER_GENERATED_ATTRIBUTE)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditional_symbol() {
        let ca = CustomAttribute::conditional("DEBUG");
        assert!(ca.is(names::CONDITIONAL_ATTRIBUTE));
        assert_eq!(ca.first_string(), Some("DEBUG"));
    }

    #[test]
    fn missing_or_null_argument() {
        let ca = CustomAttribute::new(names::CONDITIONAL_ATTRIBUTE);
        assert_eq!(ca.first_string(), None);

        let ca = ca.arg(CustomAttributeArgument::String(None));
        assert_eq!(ca.first_string(), None);
    }

    #[test]
    fn generated_markers() {
        assert!(has_generated_code_marker(&[CustomAttribute::generated_code(
            "System.Resources.Tools.StronglyTypedResourceBuilder",
            "4.0.0.0"
        )]));
        assert!(has_generated_code_marker(&[
            CustomAttribute::new("System.ObsoleteAttribute"),
            CustomAttribute::compiler_generated()
        ]));
        assert!(!has_generated_code_marker(&[CustomAttribute::conditional(
            "DEBUG"
        )]));
    }
}
