//! Runtime type handles used by `is` / `not is` and by typed conversions
//! such as `bodyAs(Integer)`.

use std::collections::HashMap;

use crate::value::Value;

/// A resolved class name.
///
/// Each handle knows which runtime values are instances of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeHandle {
    String,
    Integer,
    Float,
    /// Any numeric value
    Number,
    Boolean,
    List,
    Map,
    /// Any non-null value
    Object,
}

impl TypeHandle {
    /// Runtime instance check.
    pub fn matches(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => false,
            (TypeHandle::Object, _) => true,
            (TypeHandle::String, Value::String(_)) => true,
            (TypeHandle::Integer, Value::Integer(_)) => true,
            (TypeHandle::Float, Value::Float(_)) => true,
            (TypeHandle::Number, Value::Integer(_) | Value::Float(_)) => true,
            (TypeHandle::Boolean, Value::Boolean(_)) => true,
            (TypeHandle::List, Value::Array(_)) => true,
            (TypeHandle::Map, Value::Object(_)) => true,
            _ => false,
        }
    }

    /// Converts a value into this type, `None` when no conversion exists.
    ///
    /// `Null` converts to `Null` for every type.
    pub fn convert(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            return Some(Value::Null);
        }
        if self.matches(value) {
            return Some(value.clone());
        }
        match self {
            TypeHandle::String => Some(Value::String(value.as_string())),
            TypeHandle::Integer => value.as_int().map(Value::Integer),
            TypeHandle::Float => value.as_float().map(Value::Float),
            TypeHandle::Number => value
                .as_int()
                .map(Value::Integer)
                .or_else(|| value.as_float().map(Value::Float)),
            TypeHandle::Boolean => match value {
                Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Value::Boolean(true)),
                Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Value::Boolean(false)),
                _ => None,
            },
            TypeHandle::List => Some(Value::Array(vec![value.clone()])),
            TypeHandle::Map | TypeHandle::Object => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TypeHandle::String => "String",
            TypeHandle::Integer => "Integer",
            TypeHandle::Float => "Double",
            TypeHandle::Number => "Number",
            TypeHandle::Boolean => "Boolean",
            TypeHandle::List => "List",
            TypeHandle::Map => "Map",
            TypeHandle::Object => "Object",
        }
    }
}

const BUILTIN: &[(&str, TypeHandle)] = &[
    ("String", TypeHandle::String),
    ("java.lang.String", TypeHandle::String),
    ("CharSequence", TypeHandle::String),
    ("Integer", TypeHandle::Integer),
    ("java.lang.Integer", TypeHandle::Integer),
    ("int", TypeHandle::Integer),
    ("Long", TypeHandle::Integer),
    ("java.lang.Long", TypeHandle::Integer),
    ("long", TypeHandle::Integer),
    ("Double", TypeHandle::Float),
    ("java.lang.Double", TypeHandle::Float),
    ("double", TypeHandle::Float),
    ("Float", TypeHandle::Float),
    ("java.lang.Float", TypeHandle::Float),
    ("Number", TypeHandle::Number),
    ("java.lang.Number", TypeHandle::Number),
    ("Boolean", TypeHandle::Boolean),
    ("java.lang.Boolean", TypeHandle::Boolean),
    ("boolean", TypeHandle::Boolean),
    ("List", TypeHandle::List),
    ("java.util.List", TypeHandle::List),
    ("Collection", TypeHandle::List),
    ("java.util.Collection", TypeHandle::List),
    ("Map", TypeHandle::Map),
    ("java.util.Map", TypeHandle::Map),
    ("Object", TypeHandle::Object),
    ("java.lang.Object", TypeHandle::Object),
];

/// Class-name registry consulted while parsing `is` operands.
///
/// # Examples
///
/// ```
/// use simple_lang::{TypeHandle, TypeRegistry};
///
/// let mut registry = TypeRegistry::builtin();
/// assert_eq!(registry.resolve("java.lang.String"), Some(TypeHandle::String));
/// assert_eq!(registry.resolve("com.acme.Order"), None);
///
/// registry.register("com.acme.Order", TypeHandle::Map);
/// assert_eq!(registry.resolve("com.acme.Order"), Some(TypeHandle::Map));
/// ```
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    types: HashMap<String, TypeHandle>,
}

impl TypeRegistry {
    /// An empty registry. Nothing resolves until registered.
    pub fn empty() -> Self {
        TypeRegistry {
            types: HashMap::new(),
        }
    }

    /// Registry holding the built-in simple and qualified names.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        for (name, handle) in BUILTIN {
            registry.register(*name, handle.clone());
        }
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, handle: TypeHandle) {
        self.types.insert(name.into(), handle);
    }

    pub fn resolve(&self, name: &str) -> Option<TypeHandle> {
        self.types.get(name.trim()).cloned()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Resolves a class name against the built-in table only.
pub fn resolve_builtin(name: &str) -> Option<TypeHandle> {
    let name = name.trim();
    BUILTIN
        .iter()
        .find(|(candidate, _)| *candidate == name)
        .map(|(_, handle)| handle.clone())
}
