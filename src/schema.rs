//! Structural type IR shared by inference, evaluation, and every emitter.
//!
//! A closed variant set, matched exhaustively downstream so a new variant
//! cannot silently fall through an emitter. Values are immutable once built;
//! the smart constructors enforce the shape invariants (flat unions, single
//! optional layer).

use indexmap::IndexMap;

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaType {
    String,
    Number { is_integer: bool },
    Boolean,
    Null,
    Undefined,
    Unknown,
    Any,
    Array(Box<SchemaType>),
    /// Insertion-ordered field map; order is load-bearing for deterministic
    /// emission.
    Object(IndexMap<String, SchemaType>),
    Tuple(Vec<SchemaType>),
    Enum(Vec<String>),
    /// Never nested: construct through [`SchemaType::union`].
    Union(Vec<SchemaType>),
    /// Never double-wrapped: construct through [`SchemaType::optional`].
    Optional(Box<SchemaType>),
    /// Only ever produced for template-bearing string fields. `params` is an
    /// Object describing the template's context variables; `returns` is
    /// always `String` today.
    Function {
        params: Box<SchemaType>,
        returns: Box<SchemaType>,
    },
}

impl SchemaType {
    pub fn integer() -> Self {
        SchemaType::Number { is_integer: true }
    }

    pub fn float() -> Self {
        SchemaType::Number { is_integer: false }
    }

    pub fn array(item: SchemaType) -> Self {
        SchemaType::Array(Box::new(item))
    }

    pub fn object<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, SchemaType)>,
    {
        SchemaType::Object(fields.into_iter().collect())
    }

    pub fn empty_object() -> Self {
        SchemaType::Object(IndexMap::new())
    }

    /// Wrap in `Optional`, collapsing `Optional(Optional(x))` to one layer.
    pub fn optional(inner: SchemaType) -> Self {
        match inner {
            SchemaType::Optional(_) => inner,
            other => SchemaType::Optional(Box::new(other)),
        }
    }

    /// Build a union: nested unions are flattened, duplicates (by structural
    /// equality) dropped, and a single survivor collapses to itself.
    pub fn union(options: Vec<SchemaType>) -> Self {
        fn push(flat: &mut Vec<SchemaType>, t: SchemaType) {
            match t {
                SchemaType::Union(inner) => {
                    for o in inner {
                        push(flat, o);
                    }
                }
                other => {
                    if !flat.contains(&other) {
                        flat.push(other);
                    }
                }
            }
        }
        let mut flat = Vec::new();
        for t in options {
            push(&mut flat, t);
        }
        match flat.len() {
            0 => SchemaType::Unknown,
            1 => flat.remove(0),
            _ => SchemaType::Union(flat),
        }
    }

    /// A template function: params object in, rendered string out.
    pub fn template_fn(params: SchemaType) -> Self {
        SchemaType::Function {
            params: Box::new(params),
            returns: Box::new(SchemaType::String),
        }
    }

    pub fn log_levels() -> Self {
        SchemaType::Enum(
            ["TRACE", "DEBUG", "INFO", "WARN", "ERROR"]
                .into_iter()
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn as_object(&self) -> Option<&IndexMap<String, SchemaType>> {
        match self {
            SchemaType::Object(fields) => Some(fields),
            _ => None,
        }
    }

    pub fn into_object(self) -> Option<IndexMap<String, SchemaType>> {
        match self {
            SchemaType::Object(fields) => Some(fields),
            _ => None,
        }
    }

    /// Peel the optional wrapper, if any.
    pub fn unwrap_optional(&self) -> &SchemaType {
        match self {
            SchemaType::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_empty_object(&self) -> bool {
        matches!(self, SchemaType::Object(fields) if fields.is_empty())
    }
}
