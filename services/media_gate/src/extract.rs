//! Request arguments: path parameters and query string first, then the JSON
//! body. A field that is absent, `null`, or blank counts as missing.

use crate::error::GateError;
use serde_json::{Map, Value};

type Result<T> = std::result::Result<T, GateError>;

#[derive(Debug, Clone, Default)]
pub struct RequestArgs {
    args: Map<String, Value>,
    body: Map<String, Value>,
}

impl RequestArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Query-string pairs plus the raw request body. A key repeated in the
    /// query, or written `key[]`, collects into an array in arrival order.
    /// An empty body is fine; a non-empty one must be a JSON object.
    pub fn from_parts(query: Vec<(String, String)>, body: &[u8]) -> Result<Self> {
        let mut args = Map::new();
        for (key, value) in query {
            let (key, listed) = match key.strip_suffix("[]") {
                Some(stripped) => (stripped.to_string(), true),
                None => (key, false),
            };
            match args.get_mut(&key) {
                Some(Value::Array(items)) => items.push(Value::String(value)),
                Some(previous) => {
                    let first = previous.take();
                    *previous = Value::Array(vec![first, Value::String(value)]);
                }
                None if listed => {
                    args.insert(key, Value::Array(vec![Value::String(value)]));
                }
                None => {
                    args.insert(key, Value::String(value));
                }
            }
        }
        let body = if body.iter().all(u8::is_ascii_whitespace) {
            Map::new()
        } else {
            match serde_json::from_slice::<Value>(body) {
                Ok(Value::Object(map)) => map,
                Ok(_) => {
                    return Err(GateError::BadRequest(
                        "request body must be a JSON object".into(),
                    ))
                }
                Err(e) => return Err(GateError::BadRequest(format!("invalid JSON body: {e}"))),
            }
        };
        Ok(Self { args, body })
    }

    /// Set an argument, shadowing any query or body value of the same name.
    pub fn with_arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.args.insert(name.to_string(), value.into());
        self
    }

    pub fn with_body(mut self, body: Map<String, Value>) -> Self {
        self.body = body;
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args
            .get(name)
            .filter(|v| !is_blank(v))
            .or_else(|| self.body.get(name).filter(|v| !is_blank(v)))
    }

    pub fn required_value(&self, name: &str) -> Result<&Value> {
        self.get(name).ok_or_else(|| GateError::missing_argument(name))
    }

    pub fn required_str(&self, name: &str) -> Result<String> {
        self.optional_str(name)?
            .ok_or_else(|| GateError::missing_argument(name))
    }

    pub fn optional_str(&self, name: &str) -> Result<Option<String>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(_) => Err(GateError::BadRequest(format!(
                "argument \"{name}\" must be a string"
            ))),
        }
    }

    /// One-or-many identifiers: a lone string becomes a one-element list.
    pub fn required_list(&self, name: &str) -> Result<Vec<String>> {
        self.optional_list(name)?
            .ok_or_else(|| GateError::missing_argument(name))
    }

    pub fn optional_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        let not_strings = || {
            GateError::BadRequest(format!(
                "argument \"{name}\" must be a string or an array of non-empty strings"
            ))
        };
        match value {
            Value::String(s) => Ok(Some(vec![s.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
                    _ => Err(not_strings()),
                })
                .collect::<Result<Vec<_>>>()
                .map(Some),
            _ => Err(not_strings()),
        }
    }

    pub fn optional_u32(&self, name: &str) -> Result<Option<u32>> {
        let invalid = || {
            GateError::BadRequest(format!(
                "argument \"{name}\" must be a non-negative integer"
            ))
        };
        match self.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => n
                .as_u64()
                .and_then(|n| u32::try_from(n).ok())
                .map(Some)
                .ok_or_else(invalid),
            Some(Value::String(s)) => s.trim().parse().map(Some).map_err(|_| invalid()),
            Some(_) => Err(invalid()),
        }
    }

    pub fn optional_bool(&self, name: &str) -> Result<Option<bool>> {
        match self.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(Value::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
                "true" | "1" | "yes" => Ok(Some(true)),
                "false" | "0" | "no" => Ok(Some(false)),
                _ => Err(GateError::BadRequest(format!(
                    "argument \"{name}\" must be a boolean"
                ))),
            },
            Some(_) => Err(GateError::BadRequest(format!(
                "argument \"{name}\" must be a boolean"
            ))),
        }
    }
}

fn is_blank(v: &Value) -> bool {
    match v {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}
