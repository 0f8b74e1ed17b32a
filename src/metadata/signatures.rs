//! Callable target descriptions and signature matching.
//!
//! Types are identified by their full names (`System.String`, `System.Void`, ...),
//! which is all the analysis needs to recognize calls by signature. A
//! [`CallTarget`] describes what a call instruction invokes, as seen from the
//! call site; a [`MethodSignature`] is a fixed name/return/parameter pattern that
//! rules match declared methods against.

use std::fmt;

/// Full type names the analysis and the rules refer to.
pub mod names {
    /// `void`
    pub const VOID: &str = "System.Void";
    /// `bool`
    pub const BOOLEAN: &str = "System.Boolean";
    /// `string`
    pub const STRING: &str = "System.String";
    /// `object`
    pub const OBJECT: &str = "System.Object";
    /// Base type of all enums
    pub const ENUM: &str = "System.Enum";
    /// Base type of all value types
    pub const VALUE_TYPE: &str = "System.ValueType";
    /// Base type of all delegates
    pub const MULTICAST_DELEGATE: &str = "System.MulticastDelegate";
    /// Base type of `System.MulticastDelegate`
    pub const DELEGATE: &str = "System.Delegate";
    /// The disposal capability
    pub const IDISPOSABLE: &str = "System.IDisposable";
    /// Conditional compilation marker
    pub const CONDITIONAL_ATTRIBUTE: &str = "System.Diagnostics.ConditionalAttribute";
    /// Tool-generated code marker
    pub const GENERATED_CODE_ATTRIBUTE: &str = "System.CodeDom.Compiler.GeneratedCodeAttribute";
    /// Compiler-generated code marker
    pub const COMPILER_GENERATED_ATTRIBUTE: &str =
        "System.Runtime.CompilerServices.CompilerGeneratedAttribute";
}

/// Identifies the target of a call instruction.
///
/// This mirrors a `MemberRef`/`MethodDef` signature as it is visible at the call
/// site: owner, name, formal parameter types, return type and whether an implicit
/// `this` is passed. Whether the target is a tool-generated accessor is not part of
/// the reference; it is answered by resolving the target in a
/// [`crate::metadata::CilAssembly`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CallTarget {
    /// Full name of the declaring type
    pub declaring_type: String,
    /// Member name
    pub name: String,
    /// Full names of the formal parameter types, in declaration order
    pub params: Vec<String>,
    /// Full name of the return type
    pub return_type: String,
    /// The call passes an implicit receiver
    pub has_this: bool,
}

impl CallTarget {
    /// Describes a static method.
    #[must_use]
    pub fn new_static(declaring_type: &str, name: &str, params: &[&str], return_type: &str) -> Self {
        CallTarget {
            declaring_type: declaring_type.to_string(),
            name: name.to_string(),
            params: params.iter().map(|p| (*p).to_string()).collect(),
            return_type: return_type.to_string(),
            has_this: false,
        }
    }

    /// Describes an instance method.
    #[must_use]
    pub fn new_instance(
        declaring_type: &str,
        name: &str,
        params: &[&str],
        return_type: &str,
    ) -> Self {
        CallTarget {
            has_this: true,
            ..CallTarget::new_static(declaring_type, name, params, return_type)
        }
    }

    /// Number of stack values a `call`/`callvirt` to this target consumes,
    /// including the implicit receiver.
    #[must_use]
    pub fn arg_count(&self) -> usize {
        self.params.len() + usize::from(self.has_this)
    }

    /// Returns true if calling this target leaves a value on the stack.
    #[must_use]
    pub fn returns_value(&self) -> bool {
        self.return_type != names::VOID
    }

    /// Returns true if the target is a static method.
    #[must_use]
    pub fn is_static(&self) -> bool {
        !self.has_this
    }

    /// Returns true if `declaring_type::name` equals the given pair.
    #[must_use]
    pub fn is(&self, declaring_type: &str, name: &str) -> bool {
        self.declaring_type == declaring_type && self.name == name
    }
}

impl fmt::Display for CallTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}::{}({})",
            self.return_type,
            self.declaring_type,
            self.name,
            self.params.join(",")
        )
    }
}

/// A fixed method shape: name, return type and parameter types.
///
/// ```rust
/// use dotlint::metadata::{CallTarget, MethodSignature};
///
/// let dispose = MethodSignature::new("Dispose", "System.Void", &["System.Boolean"]);
/// let target = CallTarget::new_instance("Foo", "Dispose", &["System.Boolean"], "System.Void");
/// assert!(dispose.matches_target(&target));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Required member name
    pub name: &'static str,
    /// Required return type
    pub return_type: &'static str,
    /// Required parameter types
    pub params: &'static [&'static str],
}

impl MethodSignature {
    /// `void Dispose(bool)`
    pub const DISPOSE_BOOL: MethodSignature =
        MethodSignature::new("Dispose", names::VOID, &[names::BOOLEAN]);

    /// `void Finalize()`
    pub const FINALIZE: MethodSignature = MethodSignature::new("Finalize", names::VOID, &[]);

    /// Create a new signature pattern.
    #[must_use]
    pub const fn new(
        name: &'static str,
        return_type: &'static str,
        params: &'static [&'static str],
    ) -> Self {
        MethodSignature {
            name,
            return_type,
            params,
        }
    }

    /// Match against a name, return type and parameter list.
    #[must_use]
    pub fn matches(&self, name: &str, return_type: &str, params: &[String]) -> bool {
        self.name == name
            && self.return_type == return_type
            && self.params.len() == params.len()
            && self.params.iter().zip(params).all(|(want, have)| *want == have)
    }

    /// Match against a call target.
    #[must_use]
    pub fn matches_target(&self, target: &CallTarget) -> bool {
        self.matches(&target.name, &target.return_type, &target.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arg_count_includes_receiver() {
        let to_string = CallTarget::new_instance(names::OBJECT, "ToString", &[], names::STRING);
        assert_eq!(to_string.arg_count(), 1);
        assert!(to_string.returns_value());

        let write = CallTarget::new_static(
            "System.Diagnostics.Debug",
            "WriteLineIf",
            &[names::BOOLEAN, names::STRING],
            names::VOID,
        );
        assert_eq!(write.arg_count(), 2);
        assert!(!write.returns_value());
        assert!(write.is_static());
    }

    #[test]
    fn dispose_signature() {
        let good = CallTarget::new_instance("A", "Dispose", &[names::BOOLEAN], names::VOID);
        let no_args = CallTarget::new_instance("A", "Dispose", &[], names::VOID);
        let wrong_ret = CallTarget::new_instance("A", "Dispose", &[names::BOOLEAN], names::OBJECT);

        assert!(MethodSignature::DISPOSE_BOOL.matches_target(&good));
        assert!(!MethodSignature::DISPOSE_BOOL.matches_target(&no_args));
        assert!(!MethodSignature::DISPOSE_BOOL.matches_target(&wrong_ret));
    }

    #[test]
    fn display_form() {
        let concat = CallTarget::new_static(
            names::STRING,
            "Concat",
            &[names::STRING, names::STRING],
            names::STRING,
        );
        assert_eq!(
            concat.to_string(),
            "System.String System.String::Concat(System.String,System.String)"
        );
    }
}
