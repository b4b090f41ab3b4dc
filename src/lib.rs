pub mod cli;
pub mod diag;
pub mod emit;
pub mod error;
pub mod eval;
pub mod generate;
pub mod infer;
pub mod model;
pub mod sanitize;
pub mod schema;
pub mod template;

pub use diag::{Diagnostics, NullDiagnostics, StderrDiagnostics};
pub use error::GenerateError;
pub use eval::{secure_evaluate_schema, EvalOptions, EvalOutcome};
pub use generate::{generate, GenerateOptions, Target};
pub use infer::{infer, merge_object_schemas, DurationType, InferOptions};
pub use model::{Config, ConfigFile, ConfigRow, ConfigType, ConfigValue, ValueType};
pub use schema::SchemaType;
