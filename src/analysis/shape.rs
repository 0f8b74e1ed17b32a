//! Recognized call shapes.
//!
//! The tracer and the rules only care about a handful of call targets. Each call
//! instruction is classified once into a [`CallShape`], by signature, so nothing
//! downstream compares member names ad hoc.

use strum::{AsRefStr, Display};

use crate::metadata::{names, CallTarget, CilAssembly, MethodDef};

/// The member `System.Diagnostics.Debug::WriteLineIf` style checks look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticMethod<'a> {
    /// Full name of the declaring type
    pub declaring_type: &'a str,
    /// Member name
    pub name: &'a str,
}

impl DiagnosticMethod<'static> {
    /// `System.Diagnostics.Debug::WriteLineIf`
    pub const DEBUG_WRITE_LINE_IF: DiagnosticMethod<'static> = DiagnosticMethod {
        declaring_type: "System.Diagnostics.Debug",
        name: "WriteLineIf",
    };
}

impl DiagnosticMethod<'_> {
    /// Returns true if `target` is this member, in any overload.
    #[must_use]
    pub fn matches(&self, target: &CallTarget) -> bool {
        target.is_static() && target.is(self.declaring_type, self.name)
    }
}

/// What a call instruction invokes, as far as string tracing is concerned.
#[derive(Debug, Clone, PartialEq, Eq, Display, AsRefStr)]
pub enum CallShape {
    /// `System.String::Concat` over strings or objects
    Concatenation,
    /// A generated static property getter of a strongly typed resource class
    ResourceAccessor {
        /// Full name of the resource class
        declaring_type: String,
        /// First literal string in the getter body, the resource key
        key: String,
    },
    /// The diagnostic write the dispose checks look for
    DiagnosticWrite,
    /// Anything else
    Unrecognized,
}

/// Classify a call to `target`.
///
/// Resource accessors are only recognized when `target` resolves to a declared
/// method in `assembly`; the key is the first `ldstr` in its body, which holds for
/// the getters `resgen` and the Visual Studio designer emit and for nothing else
/// in particular.
#[must_use]
pub fn classify_call(
    target: &CallTarget,
    assembly: &CilAssembly,
    diagnostic: &DiagnosticMethod<'_>,
) -> CallShape {
    if is_concatenation(target) {
        return CallShape::Concatenation;
    }

    if diagnostic.matches(target) {
        return CallShape::DiagnosticWrite;
    }

    if target.is_static() && target.params.is_empty() {
        if let Some(method) = assembly.resolve_method(target) {
            if let Some(key) = accessor_key(method, assembly) {
                return CallShape::ResourceAccessor {
                    declaring_type: method.declaring_type.clone(),
                    key,
                };
            }
        }
    }

    CallShape::Unrecognized
}

fn is_concatenation(target: &CallTarget) -> bool {
    target.is(names::STRING, "Concat")
        && target.is_static()
        && target.return_type == names::STRING
        && target.params.len() >= 2
        && target
            .params
            .iter()
            .all(|p| p == names::STRING || p == names::OBJECT)
}

fn accessor_key(method: &MethodDef, assembly: &CilAssembly) -> Option<String> {
    if !method.is_getter() {
        return None;
    }

    let generated = method.is_generated_code()
        || assembly
            .type_by_name(&method.declaring_type)
            .is_some_and(|ty| ty.is_generated_code());
    if !generated {
        return None;
    }

    method
        .body
        .as_ref()?
        .first_string_literal()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        disassembler::BodyBuilder,
        metadata::{CustomAttribute, MethodDefBuilder, TypeDefBuilder},
    };

    fn getter(name: &str, key: &str) -> MethodDef {
        MethodDefBuilder::new("Sample.Strings", name)
            .returns(names::STRING)
            .getter()
            .body(
                BodyBuilder::new()
                    .ldstr(key)
                    .ldsfld(crate::metadata::Token::new(0x0400_0001))
                    .ret()
                    .build()
                    .unwrap(),
            )
            .build()
    }

    fn strings_class(generated: bool) -> CilAssembly {
        let mut ty = TypeDefBuilder::new("Sample", "Strings")
            .method(getter("get_IDS_MISSING", "IDS_MISSING"))
            .method(
                MethodDefBuilder::new("Sample.Strings", "get_Plain")
                    .returns(names::STRING)
                    .static_()
                    .build(),
            );
        if generated {
            ty = ty.attribute(CustomAttribute::generated_code(
                "System.Resources.Tools.StronglyTypedResourceBuilder",
                "4.0.0.0",
            ));
        }
        CilAssembly::new("Sample").with_type(ty.build())
    }

    #[test]
    fn concatenation_overloads() {
        let assembly = CilAssembly::new("Empty");
        let diag = DiagnosticMethod::DEBUG_WRITE_LINE_IF;

        let two = CallTarget::new_static(
            names::STRING,
            "Concat",
            &[names::STRING, names::STRING],
            names::STRING,
        );
        let objects = CallTarget::new_static(
            names::STRING,
            "Concat",
            &[names::OBJECT, names::OBJECT, names::OBJECT],
            names::STRING,
        );
        let array = CallTarget::new_static(
            names::STRING,
            "Concat",
            &["System.String[]"],
            names::STRING,
        );
        let single = CallTarget::new_static(names::STRING, "Concat", &[names::OBJECT], names::STRING);

        assert_eq!(classify_call(&two, &assembly, &diag), CallShape::Concatenation);
        assert_eq!(classify_call(&objects, &assembly, &diag), CallShape::Concatenation);
        assert_eq!(classify_call(&array, &assembly, &diag), CallShape::Unrecognized);
        assert_eq!(classify_call(&single, &assembly, &diag), CallShape::Unrecognized);
    }

    #[test]
    fn diagnostic_write() {
        let assembly = CilAssembly::new("Empty");
        let write = CallTarget::new_static(
            "System.Diagnostics.Debug",
            "WriteLineIf",
            &[names::BOOLEAN, names::STRING, names::STRING],
            names::VOID,
        );
        let trace = CallTarget::new_static(
            "System.Diagnostics.Trace",
            "WriteLineIf",
            &[names::BOOLEAN, names::STRING],
            names::VOID,
        );

        let diag = DiagnosticMethod::DEBUG_WRITE_LINE_IF;
        assert_eq!(classify_call(&write, &assembly, &diag), CallShape::DiagnosticWrite);
        assert_eq!(classify_call(&trace, &assembly, &diag), CallShape::Unrecognized);

        let custom = DiagnosticMethod {
            declaring_type: "System.Diagnostics.Trace",
            name: "WriteLineIf",
        };
        assert_eq!(classify_call(&trace, &assembly, &custom), CallShape::DiagnosticWrite);
        assert_eq!(CallShape::DiagnosticWrite.to_string(), "DiagnosticWrite");
    }

    #[test]
    fn resource_accessor() {
        let assembly = strings_class(true);
        let diag = DiagnosticMethod::DEBUG_WRITE_LINE_IF;
        let target = CallTarget::new_static("Sample.Strings", "get_IDS_MISSING", &[], names::STRING);

        assert_eq!(
            classify_call(&target, &assembly, &diag),
            CallShape::ResourceAccessor {
                declaring_type: "Sample.Strings".to_string(),
                key: "IDS_MISSING".to_string(),
            }
        );

        // Static but not a special-name getter
        let plain = CallTarget::new_static("Sample.Strings", "get_Plain", &[], names::STRING);
        assert_eq!(classify_call(&plain, &assembly, &diag), CallShape::Unrecognized);
    }

    #[test]
    fn accessor_requires_generated_code() {
        let assembly = strings_class(false);
        let diag = DiagnosticMethod::DEBUG_WRITE_LINE_IF;
        let target = CallTarget::new_static("Sample.Strings", "get_IDS_MISSING", &[], names::STRING);
        assert_eq!(classify_call(&target, &assembly, &diag), CallShape::Unrecognized);

        // Marker on the getter itself is enough
        let marked = CilAssembly::new("Sample").with_type(
            TypeDefBuilder::new("Sample", "Strings")
                .method(
                    MethodDefBuilder::new("Sample.Strings", "get_IDS_MISSING")
                        .returns(names::STRING)
                        .getter()
                        .attribute(CustomAttribute::compiler_generated())
                        .body(BodyBuilder::new().ldstr("IDS_MISSING").ret().build().unwrap())
                        .build(),
                )
                .build(),
        );
        assert!(matches!(
            classify_call(&target, &marked, &diag),
            CallShape::ResourceAccessor { .. }
        ));
    }

    #[test]
    fn unresolved_target() {
        let assembly = strings_class(true);
        let diag = DiagnosticMethod::DEBUG_WRITE_LINE_IF;
        let target = CallTarget::new_static("Other.Strings", "get_IDS_MISSING", &[], names::STRING);
        assert_eq!(classify_call(&target, &assembly, &diag), CallShape::Unrecognized);
    }
}
