//! Operation descriptors.
//!
//! Each tool is described once: name, description, whether it mutates the
//! stream, its parameters and its handler. The same table produces the JSON
//! schema advertised by `tools/list` and validates incoming arguments.

use std::future::Future;
use std::pin::Pin;

use convert_case::{Case, Casing};
use serde_json::{json, Map, Value};

use crate::error::GatewayError;
use crate::gateway::Invocation;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub type Handler = fn(Invocation) -> BoxFuture<'static, eyre::Result<Value>>;

/// Argument accepted by every tool in addition to its own parameters.
pub static REGION_PARAM: ParamSpec = ParamSpec::optional(
    "region_name",
    ParamKind::Str,
    "The AWS region to run the tool",
);

#[derive(Debug, Clone, Copy)]
pub enum ParamKind {
    Str,
    Int { min: Option<i64>, max: Option<i64> },
    Number,
    Bool,
    Enum(&'static [&'static str]),
    StrList,
    EnumList(&'static [&'static str]),
    StrMap,
    /// A string, or an array of byte values.
    Blob,
    Object(&'static [ParamSpec]),
    ObjectList(&'static [ParamSpec]),
}

impl ParamKind {
    pub const fn int_range(min: i64, max: i64) -> Self {
        Self::Int {
            min: Some(min),
            max: Some(max),
        }
    }

    pub const fn int_min(min: i64) -> Self {
        Self::Int {
            min: Some(min),
            max: None,
        }
    }

    fn schema(&self) -> Value {
        match self {
            ParamKind::Str => json!({"type": "string"}),
            ParamKind::Int { min, max } => {
                let mut schema = json!({"type": "integer"});
                if let Some(min) = min {
                    schema["minimum"] = json!(min);
                }
                if let Some(max) = max {
                    schema["maximum"] = json!(max);
                }
                schema
            }
            ParamKind::Number => json!({"type": "number"}),
            ParamKind::Bool => json!({"type": "boolean"}),
            ParamKind::Enum(values) => json!({"type": "string", "enum": values}),
            ParamKind::StrList => json!({"type": "array", "items": {"type": "string"}}),
            ParamKind::EnumList(values) => {
                json!({"type": "array", "items": {"type": "string", "enum": values}})
            }
            ParamKind::StrMap => {
                json!({"type": "object", "additionalProperties": {"type": "string"}})
            }
            ParamKind::Blob => json!({
                "anyOf": [
                    {"type": "string"},
                    {"type": "array", "items": {"type": "integer", "minimum": 0, "maximum": 255}}
                ]
            }),
            ParamKind::Object(fields) => object_schema(fields.iter()),
            ParamKind::ObjectList(fields) => {
                json!({"type": "array", "items": object_schema(fields.iter())})
            }
        }
    }

    fn check(&self, path: &str, value: &Value) -> Result<(), GatewayError> {
        match self {
            ParamKind::Str => expect_str(path, value).map(|_| ()),
            ParamKind::Int { min, max } => {
                let number = value
                    .as_i64()
                    .ok_or_else(|| GatewayError::invalid(path, "expected an integer"))?;
                if let Some(min) = min.filter(|min| number < *min) {
                    return Err(GatewayError::invalid(path, format!("must be at least {min}")));
                }
                if let Some(max) = max.filter(|max| number > *max) {
                    return Err(GatewayError::invalid(path, format!("must be at most {max}")));
                }
                if i32::try_from(number).is_err() {
                    return Err(GatewayError::invalid(path, "out of range"));
                }
                Ok(())
            }
            ParamKind::Number if value.is_number() => Ok(()),
            ParamKind::Number => Err(GatewayError::invalid(path, "expected a number")),
            ParamKind::Bool if value.is_boolean() => Ok(()),
            ParamKind::Bool => Err(GatewayError::invalid(path, "expected a boolean")),
            ParamKind::Enum(values) => expect_variant(path, value, values),
            ParamKind::StrList => expect_array(path, value)?
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| expect_str(&format!("{path}[{i}]"), item).map(|_| ())),
            ParamKind::EnumList(values) => expect_array(path, value)?
                .iter()
                .enumerate()
                .try_for_each(|(i, item)| expect_variant(&format!("{path}[{i}]"), item, values)),
            ParamKind::StrMap => {
                let map = value
                    .as_object()
                    .ok_or_else(|| GatewayError::invalid(path, "expected an object"))?;
                map.iter()
                    .try_for_each(|(key, item)| expect_str(&format!("{path}.{key}"), item).map(|_| ()))
            }
            ParamKind::Blob => match value {
                Value::String(_) => Ok(()),
                Value::Array(items) if items.iter().all(|b| b.as_u64().is_some_and(|b| b <= 255)) => Ok(()),
                _ => Err(GatewayError::invalid(path, "expected a string or an array of bytes")),
            },
            ParamKind::Object(fields) => {
                let map = value
                    .as_object()
                    .ok_or_else(|| GatewayError::invalid(path, "expected an object"))?;
                check_fields(Some(path), fields.iter(), map)
            }
            ParamKind::ObjectList(fields) => {
                expect_array(path, value)?.iter().enumerate().try_for_each(|(i, item)| {
                    let item_path = format!("{path}[{i}]");
                    let map = item
                        .as_object()
                        .ok_or_else(|| GatewayError::invalid(&item_path, "expected an object"))?;
                    check_fields(Some(&item_path), fields.iter(), map)
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
    pub description: &'static str,
    /// Default applied when the argument is absent, advertised in the schema.
    pub default: Option<&'static str>,
}

impl ParamSpec {
    pub const fn required(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
            default: None,
        }
    }

    pub const fn optional(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
            default: None,
        }
    }

    pub const fn with_default(mut self, default: &'static str) -> Self {
        self.default = Some(default);
        self
    }

    fn schema(&self) -> Value {
        let mut schema = self.kind.schema();
        schema["description"] = json!(self.description);
        if let Some(default) = self.default {
            schema["default"] = json!(default);
        }
        schema
    }
}

pub struct OperationDescriptor {
    pub name: &'static str,
    pub description: &'static str,
    pub mutating: bool,
    pub params: &'static [ParamSpec],
    pub handler: Handler,
}

impl OperationDescriptor {
    /// Kinesis API action name, e.g. `CreateStream` for `create_stream`.
    pub fn api_action(&self) -> String {
        self.name.to_case(Case::Pascal)
    }

    /// MCP tool definition advertised by `tools/list`.
    pub fn tool_definition(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema(),
        })
    }

    pub fn input_schema(&self) -> Value {
        object_schema(self.all_params())
    }

    /// Checks arguments against the declared parameters. `null` stands for an
    /// absent optional argument.
    pub fn validate(&self, arguments: &Map<String, Value>) -> Result<(), GatewayError> {
        check_fields(None, self.all_params(), arguments)
    }

    fn all_params(&self) -> impl Iterator<Item = &ParamSpec> + Clone {
        self.params.iter().chain(std::iter::once(&REGION_PARAM))
    }
}

impl std::fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("mutating", &self.mutating)
            .finish_non_exhaustive()
    }
}

fn object_schema<'a>(fields: impl Iterator<Item = &'a ParamSpec>) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();
    for field in fields {
        properties.insert(field.name.to_string(), field.schema());
        if field.required {
            required.push(field.name);
        }
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
        "additionalProperties": false,
    })
}

fn check_fields<'a>(
    parent: Option<&str>,
    fields: impl Iterator<Item = &'a ParamSpec> + Clone,
    map: &Map<String, Value>,
) -> Result<(), GatewayError> {
    let path = |name: &str| match parent {
        Some(parent) => format!("{parent}.{name}"),
        None => name.to_string(),
    };
    if let Some(unknown) = map
        .keys()
        .find(|key| !fields.clone().any(|field| field.name == key.as_str()))
    {
        return Err(GatewayError::invalid(path(unknown), "unknown argument"));
    }
    for field in fields {
        match map.get(field.name) {
            None | Some(Value::Null) if field.required => {
                return Err(GatewayError::invalid(path(field.name), "is required"));
            }
            None | Some(Value::Null) => {}
            Some(value) => field.kind.check(&path(field.name), value)?,
        }
    }
    Ok(())
}

fn expect_str<'v>(path: &str, value: &'v Value) -> Result<&'v str, GatewayError> {
    value
        .as_str()
        .ok_or_else(|| GatewayError::invalid(path, "expected a string"))
}

fn expect_array<'v>(path: &str, value: &'v Value) -> Result<&'v Vec<Value>, GatewayError> {
    value
        .as_array()
        .ok_or_else(|| GatewayError::invalid(path, "expected an array"))
}

fn expect_variant(path: &str, value: &Value, values: &[&str]) -> Result<(), GatewayError> {
    let variant = expect_str(path, value)?;
    if values.contains(&variant) {
        Ok(())
    } else {
        Err(GatewayError::invalid(
            path,
            format!("must be one of {}", values.join(", ")),
        ))
    }
}
