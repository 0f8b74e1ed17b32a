//! # dotlint Prelude
//!
//! This module provides a convenient prelude for the most commonly used types and traits
//! from the dotlint library. Import this module to get quick access to the essential
//! types for building bodies, tracing strings and running the dispose rules.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all dotlint operations
pub use crate::Error;

/// The result type used throughout dotlint
pub use crate::Result;

/// Low-level byte cursor
pub use crate::Parser;

// ================================================================================================
// Instruction Stream
// ================================================================================================

/// Method bodies and their instructions
pub use crate::disassembler::{
    decode_body, BodyBuilder, InstrIdx, Instruction, LocalSlot, MethodBody, OpCategory, Operand,
    TokenMap, TokenResolver,
};

// ================================================================================================
// Metadata
// ================================================================================================

/// Assembly, types, methods and signatures
pub use crate::metadata::{
    names, CallTarget, CilAssembly, CustomAttribute, MethodAccessFlags, MethodDef,
    MethodDefBuilder, MethodModifiers, MethodSignature, Token, TypeDef, TypeDefBuilder,
    TypeFlavor,
};

/// Embedded resource tables
pub use crate::metadata::resources::{ResourceWriter, StringTable};

// ================================================================================================
// Analysis
// ================================================================================================

/// String provenance analysis
pub use crate::analysis::{
    find_store, lookup_resource_string, resolve_argument, stack_effect, AnalysisConfig,
    AnalysisContext, CallShape, Reason, Resolution, ResourceCache, StackEffect,
};

// ================================================================================================
// Rules
// ================================================================================================

/// Rule framework
pub use crate::rules::{
    Confidence, Defect, DisposeRuleConfig, MethodRule, RuleContext, RuleMetadata, RuleResult,
    Severity, TypeRule,
};

/// The dispose rules
pub use crate::rules::{
    dispose::EnsureMissDispStatement,
    finalizer::EnsureFinalizer,
    hierarchy::{EnsureDebugDisposeFinalizer, EnsureDebugDisposeMissDispStatement},
};

/// Running rules over an assembly
pub use crate::rules::runner::{Report, Runner, Verdict};
