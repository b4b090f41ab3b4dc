//! Static validation of a parsed schema expression.
//!
//! Walks the whole AST and collects every violation rather than stopping at
//! the first, so a rejected schema names all of its problems at once. The
//! node-count ceiling bounds worst-case work on adversarial input and fails
//! the expression regardless of other checks.

use super::parser::Expr;
use super::{EvalOptions, ROOT_IDENT};

/// Globals a schema expression may never reference by bare identifier.
/// Appearing as a property name (`foo.require`) is fine; only a free-standing
/// reference is rejected.
const DENIED_GLOBALS: &[&str] = &[
    "window",
    "global",
    "process",
    "console",
    "document",
    "navigator",
    "localStorage",
    "fetch",
    "XMLHttpRequest",
    "WebSocket",
    "eval",
    "require",
];

/// Property names that reach into an object's machinery.
const DENIED_MEMBERS: &[&str] = &[
    "constructor",
    "prototype",
    "__proto__",
    "__defineGetter__",
    "__defineSetter__",
    "__lookupGetter__",
    "__lookupSetter__",
];

/// Builder methods allowed to take a function-valued argument.
const FUNCTION_ARG_METHODS: &[&str] = &["refine", "transform", "superRefine", "pipe", "preprocess"];

pub fn validate(expr: &Expr, options: &EvalOptions) -> Result<(), String> {
    let node_count = expr.node_count();
    if node_count > options.max_ast_nodes {
        return Err(format!(
            "schema expression has {node_count} AST nodes, exceeding the maximum of {}",
            options.max_ast_nodes
        ));
    }

    let mut violations = Vec::new();
    walk(expr, false, &mut violations);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations.join("; "))
    }
}

fn walk(expr: &Expr, arrow_allowed: bool, violations: &mut Vec<String>) {
    match expr {
        Expr::Ident(name) => {
            if DENIED_GLOBALS.contains(&name.as_str()) {
                violations.push(format!("reference to forbidden global `{name}`"));
            }
        }
        Expr::StringLit(_)
        | Expr::NumberLit(_)
        | Expr::BoolLit(_)
        | Expr::NullLit
        | Expr::UndefinedLit => {}
        Expr::ArrayLit(items) => {
            for item in items {
                walk(item, false, violations);
            }
        }
        Expr::ObjectLit(entries) => {
            for (_, value) in entries {
                walk(value, false, violations);
            }
        }
        Expr::Member { object, property } => {
            if DENIED_MEMBERS.contains(&property.as_str()) {
                violations.push(format!("access to forbidden member `{property}`"));
            }
            walk(object, false, violations);
        }
        Expr::Index { object, index } => {
            walk(object, false, violations);
            walk(index, false, violations);
        }
        Expr::Call { callee, args } => {
            let allows_function_args = match callee.as_ref() {
                Expr::Ident(name) => {
                    if name != ROOT_IDENT {
                        violations.push(format!("call to forbidden bare identifier `{name}`"));
                    }
                    false
                }
                Expr::Member { property, .. } => {
                    if !chain_rooted_in_builder(callee) {
                        violations.push(format!(
                            "method call `{property}` is not rooted in the `{ROOT_IDENT}` builder"
                        ));
                    }
                    FUNCTION_ARG_METHODS.contains(&property.as_str())
                }
                _ => {
                    violations.push("unsupported call target in schema expression".to_string());
                    false
                }
            };
            walk(callee, false, violations);
            for arg in args {
                walk(arg, allows_function_args, violations);
            }
        }
        Expr::Arrow { body, .. } => {
            if !arrow_allowed {
                violations.push(
                    "function expressions are only allowed as direct arguments to \
                     refine/transform/superRefine/pipe/preprocess"
                        .to_string(),
                );
            }
            if let Some(body) = body {
                walk(body, false, violations);
            }
        }
        Expr::Block(idents) => {
            for (name, is_property) in idents {
                if *is_property {
                    if DENIED_MEMBERS.contains(&name.as_str()) {
                        violations.push(format!("access to forbidden member `{name}`"));
                    }
                } else if DENIED_GLOBALS.contains(&name.as_str()) {
                    violations.push(format!("reference to forbidden global `{name}`"));
                }
            }
        }
        Expr::Await(inner) => {
            violations.push("`await` is not allowed in a schema expression".to_string());
            walk(inner, false, violations);
        }
        Expr::ClassExpr => {
            violations.push("class declarations are not allowed in a schema expression".to_string())
        }
        Expr::FunctionExpr => violations.push(
            "function declarations are only allowed as direct arguments to \
             refine/transform/superRefine/pipe/preprocess"
                .to_string(),
        ),
        Expr::ImportStmt | Expr::ExportStmt => violations
            .push("import/export statements are not allowed in a schema expression".to_string()),
    }
}

/// True when a member/index chain ultimately starts at the builder root,
/// possibly through intermediate calls (`z.object({...}).refine(...)`).
fn chain_rooted_in_builder(expr: &Expr) -> bool {
    match expr {
        Expr::Ident(name) => name == ROOT_IDENT,
        Expr::Member { object, .. } => chain_rooted_in_builder(object),
        Expr::Index { object, .. } => chain_rooted_in_builder(object),
        Expr::Call { callee, .. } => chain_rooted_in_builder(callee),
        _ => false,
    }
}
