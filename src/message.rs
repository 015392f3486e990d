//! An in-memory message and an [`EvaluationContext`] over it.
//!
//! This is the context the command line tool evaluates against, and a
//! reference for hosts writing their own.

use std::{collections::HashMap, env, error::Error, fmt, sync::Arc};

use crate::{
    evaluator::{EvaluationContext, EvaluationError},
    types::{TypeHandle, TypeRegistry},
    value::Value,
};

/// Failure reported by a bean method.
pub type BeanError = Box<dyn Error + Send + Sync>;

/// A method registered on a named bean.
pub type BeanMethod = Arc<dyn Fn(&[Value]) -> Result<Value, BeanError> + Send + Sync>;

/// Body, headers and the surrounding exchange state a message carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Message {
    pub body: Value,
    pub headers: HashMap<String, Value>,
    /// Exchange properties
    pub properties: HashMap<String, Value>,
    pub variables: HashMap<String, Value>,
    /// Ids of the steps the message went through, oldest first
    pub history: Vec<String>,
}

impl Message {
    pub fn new(body: impl Into<Value>) -> Self {
        Message {
            body: body.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_property(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(name.into(), value.into());
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_history(mut self, step: impl Into<String>) -> Self {
        self.history.push(step.into());
        self
    }

    /// Builds a message from a JSON document.
    ///
    /// An object whose keys are all among `body`, `headers`, `properties`,
    /// `variables` and `history` is read as a whole message; any other
    /// document becomes the body.
    ///
    /// # Examples
    ///
    /// ```
    /// use serde_json::json;
    /// use simple_lang::{Message, Value};
    ///
    /// let message = Message::from_json(json!({"body": "hi", "headers": {"foo": 1}}));
    /// assert_eq!(message.body, Value::from("hi"));
    /// assert_eq!(message.headers["foo"], Value::Integer(1));
    ///
    /// let message = Message::from_json(json!([1, 2]));
    /// assert_eq!(message.body, Value::from(vec![1i64, 2]));
    /// ```
    pub fn from_json(doc: serde_json::Value) -> Self {
        const SECTIONS: [&str; 5] = ["body", "headers", "properties", "variables", "history"];

        let mut sections = match doc {
            serde_json::Value::Object(map)
                if !map.is_empty() && map.keys().all(|k| SECTIONS.contains(&k.as_str())) =>
            {
                map
            }
            other => return Message::new(Value::from(other)),
        };

        let mut take_map = |key: &str| match sections.remove(key).map(Value::from) {
            Some(Value::Object(map)) => map,
            _ => HashMap::new(),
        };
        let headers = take_map("headers");
        let properties = take_map("properties");
        let variables = take_map("variables");

        let history = match sections.remove("history").map(Value::from) {
            Some(Value::Array(steps)) => steps.iter().map(Value::as_string).collect(),
            _ => Vec::new(),
        };

        Message {
            body: sections.remove("body").map_or(Value::Null, Value::from),
            headers,
            properties,
            variables,
            history,
        }
    }
}

/// Resolves placeholders against a [`Message`] and a registry of beans.
///
/// # Examples
///
/// ```
/// use simple_lang::{Message, MessageContext, Value, parse_expression};
///
/// let context = MessageContext::new(Message::new("World").with_header("greeting", "Hello"))
///     .with_bean("generator", "generateId", |_| Ok(Value::Integer(123)));
///
/// let expression = parse_expression("${header.greeting} ${body} #${bean:generator.generateId}").unwrap();
/// assert_eq!(expression.evaluate(&context).unwrap(), Value::from("Hello World #123"));
/// ```
#[derive(Clone, Default)]
pub struct MessageContext {
    message: Message,
    beans: HashMap<String, BeanMethod>,
    types: TypeRegistry,
}

impl MessageContext {
    pub fn new(message: Message) -> Self {
        MessageContext {
            message,
            ..Default::default()
        }
    }

    /// Registers `method` on the bean named `bean`, reachable as
    /// `${bean:<bean>.<method>}`.
    pub fn with_bean<F>(mut self, bean: &str, method: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, BeanError> + Send + Sync + 'static,
    {
        self.beans.insert(format!("{}.{}", bean, method), Arc::new(f));
        self
    }

    /// Replaces the registry `bodyAs`/`headerAs` resolve their target type
    /// against. Pass `SimpleLanguage::types()` to share the names `is`
    /// resolves at parse time.
    pub fn with_types(mut self, types: TypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Registers a type name for `bodyAs`/`headerAs` on this context only.
    pub fn register_type(&mut self, name: impl Into<String>, handle: TypeHandle) {
        self.types.register(name, handle);
    }

    pub fn message(&self) -> &Message {
        &self.message
    }

    pub fn message_mut(&mut self) -> &mut Message {
        &mut self.message
    }

    fn invoke_bean(&self, reference: &str, args: &[Value]) -> Result<Value, EvaluationError> {
        let method = self
            .beans
            .get(reference)
            .ok_or_else(|| EvaluationError::UnknownFunction(format!("bean:{}", reference)))?;
        method(args).map_err(|source| EvaluationError::Invocation {
            name: format!("bean:{}", reference),
            source,
        })
    }

    /// Built-in functions; `None` when `name` is not one.
    fn call(&self, name: &str, args: &[Value]) -> Option<Result<Value, EvaluationError>> {
        if let Some(reference) = name.strip_prefix("bean:") {
            return Some(self.invoke_bean(reference, args));
        }

        let result = match name {
            "messageHistory" => Ok(Value::Array(
                self.message.history.iter().map(|s| Value::from(s.as_str())).collect(),
            )),
            "bodyAs" => match args {
                [target] => self.convert(name, &self.message.body, target),
                _ => Err(arity(name, "a type name")),
            },
            "headerAs" => match args {
                [header, target] => {
                    let value = header_value(&self.message.headers, &header.as_string());
                    self.convert(name, &value, target)
                }
                _ => Err(arity(name, "a header name and a type name")),
            },
            "uppercase" => self.subject(name, args).map(|v| map_text(v, |s| s.to_uppercase())),
            "lowercase" => self.subject(name, args).map(|v| map_text(v, |s| s.to_lowercase())),
            "trim" => self.subject(name, args).map(|v| map_text(v, |s| s.trim().to_string())),
            "length" => self.subject(name, args).map(|v| Value::Integer(length(&v))),
            "isEmpty" => self.subject(name, args).map(|v| Value::Boolean(length(&v) == 0)),
            "not" => self.subject(name, args).map(|v| Value::Boolean(!v.is_truthy())),
            "concat" => Ok(Value::String(args.iter().map(Value::as_string).collect())),
            "substringBefore" | "substringAfter" => {
                let (subject, separator) = match args {
                    [separator] => (self.message.body.clone(), separator),
                    [subject, separator] => (subject.clone(), separator),
                    _ => return Some(Err(arity(name, "an optional value and a separator"))),
                };
                Ok(substring(&subject, &separator.as_string(), name == "substringBefore"))
            }
            "replace" => {
                let (from, to, subject) = match args {
                    [from, to] => (from, to, &self.message.body),
                    [from, to, subject] => (from, to, subject),
                    _ => return Some(Err(arity(name, "from, to and an optional value"))),
                };
                let (from, to) = (from.as_string(), to.as_string());
                Ok(map_text(subject.clone(), |s| s.replace(&from, &to)))
            }
            _ => return None,
        };
        Some(result)
    }

    /// The single argument of a string helper, or the body when called
    /// without one.
    fn subject(&self, name: &str, args: &[Value]) -> Result<Value, EvaluationError> {
        match args {
            [] => Ok(self.message.body.clone()),
            [value] => Ok(value.clone()),
            _ => Err(arity(name, "at most one argument")),
        }
    }

    fn convert(&self, function: &str, value: &Value, target: &Value) -> Result<Value, EvaluationError> {
        let name = target.as_string();
        let handle = self.resolve_type(&name).ok_or_else(|| EvaluationError::InvalidArguments {
            function: function.to_string(),
            message: format!("unknown type {}", name),
        })?;
        handle.convert(value).ok_or_else(|| {
            EvaluationError::TypeMismatch(format!(
                "cannot convert {} value '{}' to {}",
                value.type_name(),
                value.as_string(),
                handle.name()
            ))
        })
    }
}

impl fmt::Debug for MessageContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut beans: Vec<&String> = self.beans.keys().collect();
        beans.sort();
        f.debug_struct("MessageContext")
            .field("message", &self.message)
            .field("beans", &beans)
            .finish()
    }
}

impl EvaluationContext for MessageContext {
    fn resolve_property(&self, path: &str) -> Result<Value, EvaluationError> {
        let path = path.strip_prefix("in.").unwrap_or(path);

        if path == "body" {
            return Ok(self.message.body.clone());
        }
        if let Some(rest) = path.strip_prefix("body.") {
            return navigate(&self.message.body, rest)
                .ok_or_else(|| EvaluationError::PropertyNotFound(path.to_string()));
        }

        match path {
            "headers" => return Ok(Value::Object(self.message.headers.clone())),
            "exchangeProperties" => return Ok(Value::Object(self.message.properties.clone())),
            "variables" => return Ok(Value::Object(self.message.variables.clone())),
            _ => {}
        }

        if let Some(name) = key_after(path, &["headers", "header"]) {
            return Ok(header_value(&self.message.headers, name));
        }
        if let Some(name) = key_after(path, &["exchangeProperty"]) {
            return Ok(self.message.properties.get(name).cloned().unwrap_or_default());
        }
        if let Some(name) = key_after(path, &["variable"]) {
            return Ok(self.message.variables.get(name).cloned().unwrap_or_default());
        }
        if let Some(name) = key_after(path, &["sys", "sysenv", "env"]) {
            return Ok(env::var(name).map(Value::String).unwrap_or_default());
        }

        match self.call(path, &[]) {
            Some(result) => result,
            None => Err(EvaluationError::PropertyNotFound(path.to_string())),
        }
    }

    fn invoke_function(&self, name: &str, args: &[Value]) -> Result<Value, EvaluationError> {
        match self.call(name, args) {
            Some(result) => result,
            None => Err(EvaluationError::UnknownFunction(name.to_string())),
        }
    }

    fn resolve_type(&self, name: &str) -> Option<TypeHandle> {
        self.types.resolve(name)
    }
}

/// The key in `header.foo`, `header:foo` or `header[foo]` for any of the
/// given prefixes.
fn key_after<'p>(path: &'p str, prefixes: &[&str]) -> Option<&'p str> {
    prefixes.iter().find_map(|prefix| {
        let rest = path.strip_prefix(prefix)?;
        if let Some(key) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(':')) {
            return Some(key);
        }
        rest.strip_prefix('[')?.strip_suffix(']')
    })
}

/// Header names match exactly first, then ignoring ASCII case.
fn header_value(headers: &HashMap<String, Value>, name: &str) -> Value {
    headers
        .get(name)
        .or_else(|| {
            headers
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .cloned()
        .unwrap_or_default()
}

/// Dotted navigation into map and list bodies. Missing keys are null;
/// stepping into a scalar fails.
fn navigate(value: &Value, path: &str) -> Option<Value> {
    let mut current = value.clone();
    for segment in path.split('.') {
        current = match current {
            Value::Null => return Some(Value::Null),
            Value::Object(mut map) => map.remove(segment).unwrap_or_default(),
            Value::Array(mut items) => {
                let index = segment.parse::<usize>().ok()?;
                if index < items.len() {
                    items.swap_remove(index)
                } else {
                    Value::Null
                }
            }
            _ => return None,
        };
    }
    Some(current)
}

fn map_text(value: Value, f: impl FnOnce(&str) -> String) -> Value {
    match value {
        Value::Null => Value::Null,
        other => Value::String(f(&other.as_string())),
    }
}

fn length(value: &Value) -> i64 {
    let len = match value {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(map) => map.len(),
        other => other.as_string().chars().count(),
    };
    len as i64
}

fn substring(value: &Value, separator: &str, before: bool) -> Value {
    if value.is_null() {
        return Value::Null;
    }
    let text = value.as_string();
    match text.find(separator) {
        Some(index) if before => Value::String(text[..index].to_string()),
        Some(index) => Value::String(text[index + separator.len()..].to_string()),
        None => Value::Null,
    }
}

fn arity(function: &str, expected: &str) -> EvaluationError {
    EvaluationError::InvalidArguments {
        function: function.to_string(),
        message: format!("expected {}", expected),
    }
}
