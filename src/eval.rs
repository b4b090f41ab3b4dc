//! Sandboxed schema expression evaluation.
//!
//! User-authored schema text (stored in SCHEMA configs) is written against a
//! small builder DSL rooted at the identifier `z`. Evaluation runs in three
//! synchronous phases: parse to an expression AST, statically validate it
//! (deny lists, node-count ceiling), then interpret the accepted grammar into
//! a [`SchemaType`]. There is no dynamic code execution anywhere; the
//! interpreter is the only thing that gives the text meaning.
//!
//! Failure at any phase is reported in the returned [`EvalOutcome`]; this
//! entry point never panics on malformed input.

pub mod interp;
pub mod lexer;
pub mod parser;
pub mod validate;

use crate::schema::SchemaType;

/// The single free identifier a schema expression may reference.
pub const ROOT_IDENT: &str = "z";

#[derive(Debug, Clone)]
pub struct EvalOptions {
    /// Run the static validation phase. On by default; turning it off is for
    /// trusted round-trip paths only.
    pub validate: bool,
    /// Ceiling on total AST nodes. Bounds worst-case work on adversarial or
    /// malformed schema text.
    pub max_ast_nodes: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        Self {
            validate: true,
            max_ast_nodes: 500,
        }
    }
}

#[derive(Debug)]
pub struct EvalOutcome {
    pub success: bool,
    pub schema: Option<SchemaType>,
    pub error: Option<String>,
}

impl EvalOutcome {
    fn ok(schema: SchemaType) -> Self {
        Self {
            success: true,
            schema: Some(schema),
            error: None,
        }
    }

    fn fail(error: String) -> Self {
        Self {
            success: false,
            schema: None,
            error: Some(error),
        }
    }
}

pub fn secure_evaluate_schema(source: &str, options: &EvalOptions) -> EvalOutcome {
    let tokens = match lexer::tokenize(source) {
        Ok(tokens) => tokens,
        Err(error) => return EvalOutcome::fail(error),
    };
    let ast = match parser::parse_expression(&tokens) {
        Ok(ast) => ast,
        Err(error) => return EvalOutcome::fail(error),
    };

    if options.validate {
        if let Err(error) = validate::validate(&ast, options) {
            return EvalOutcome::fail(error);
        }
    }

    match interp::evaluate(&ast) {
        Ok(interp::Value::Schema(schema)) => EvalOutcome::ok(schema),
        Ok(_) => EvalOutcome::fail(
            "schema expression evaluated to a value that is not a schema".to_string(),
        ),
        Err(error) => EvalOutcome::fail(error),
    }
}
