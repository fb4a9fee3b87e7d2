//! Shared data model for skill lines: the AST, schema catalogs, and the
//! schema-driven validator.

pub mod builtin;
pub mod defs;
pub mod schema;
pub mod validate;

pub use defs::*;
pub use schema::{
    ConditionSchema, HasParameters, MechanicSchema, ParamType, ParameterSchema, Schema, SchemaError, SchemaKind,
    SchemaRef, SchemaRegistry, SchemaSet, SearchHit, TargeterSchema, TriggerSchema,
};
pub use validate::{ProjectReport, SKILL_NAME_KEYS, Severity, ValidationIssue, ValidationResult, Validator};
