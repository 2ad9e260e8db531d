use serde_json::{json, Map, Value};

use vmplan_devices::{ConfigSpec, VirtualDevice};

use crate::{CodecError, Result, TypeRegistry};

const TYPE_KEY: &str = "_typeName";
const VALUE_KEY: &str = "_value";

/// A primitive escaped inside a `{_typeName, _value}` wrapper for use in a
/// polymorphic slot.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveValue {
    Boolean(bool),
    Byte(u8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Binary(Vec<u8>),
    /// RFC 3339 text, carried verbatim.
    DateTime(String),
}

impl PrimitiveValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            PrimitiveValue::Boolean(_) => "boolean",
            PrimitiveValue::Byte(_) => "byte",
            PrimitiveValue::Short(_) => "short",
            PrimitiveValue::Int(_) => "int",
            PrimitiveValue::Long(_) => "long",
            PrimitiveValue::Float(_) => "float",
            PrimitiveValue::Double(_) => "double",
            PrimitiveValue::String(_) => "string",
            PrimitiveValue::Binary(_) => "binary",
            PrimitiveValue::DateTime(_) => "dateTime",
        }
    }

    fn raw_value(&self) -> Value {
        match self {
            PrimitiveValue::Boolean(v) => json!(v),
            PrimitiveValue::Byte(v) => json!(v),
            PrimitiveValue::Short(v) => json!(v),
            PrimitiveValue::Int(v) => json!(v),
            PrimitiveValue::Long(v) => json!(v),
            PrimitiveValue::Float(v) => json!(v),
            PrimitiveValue::Double(v) => json!(v),
            PrimitiveValue::String(v) => json!(v),
            PrimitiveValue::Binary(v) => json!(v),
            PrimitiveValue::DateTime(v) => json!(v),
        }
    }
}

/// Result of decoding one polymorphic slot.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Primitive(PrimitiveValue),
    Device(VirtualDevice),
}

/// JSON codec that tags every object with `_typeName` and resolves incoming
/// tags against a write-once [`TypeRegistry`].
pub struct TypedJsonCodec<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> TypedJsonCodec<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        TypedJsonCodec { registry }
    }

    pub fn encode_primitive(&self, primitive: &PrimitiveValue) -> Value {
        json!({
            TYPE_KEY: primitive.type_name(),
            VALUE_KEY: primitive.raw_value(),
        })
    }

    pub fn decode_primitive(&self, value: &Value) -> Result<PrimitiveValue> {
        let (name, object) = split_typed_object(value)?;
        decode_primitive_body(name, object)?
            .ok_or_else(|| CodecError::UnknownType(name.to_owned()))
    }

    /// Serialize a device; the enum tag becomes the `_typeName` member.
    pub fn encode_device(&self, device: &VirtualDevice) -> Result<Value> {
        serde_json::to_value(device).map_err(|err| CodecError::Decode(err.to_string()))
    }

    /// Decode a tagged device object, stripping an optional `vim25:` prefix
    /// from the discriminator before registry lookup.
    pub fn decode_device(&self, value: Value) -> Result<VirtualDevice> {
        let (name, _) = split_typed_object(&value)?;
        let name = name.to_owned();
        let decode = self
            .registry
            .resolve(&name)
            .ok_or_else(|| CodecError::UnknownType(strip_prefix(&name).to_owned()))?;
        decode(normalize_tag(value))
    }

    /// Decode a polymorphic slot: a primitive wrapper or a registered object.
    pub fn decode_value(&self, value: Value) -> Result<TypedValue> {
        let (name, object) = split_typed_object(&value)?;
        if let Some(primitive) = decode_primitive_body(name, object)? {
            return Ok(TypedValue::Primitive(primitive));
        }
        self.decode_device(value).map(TypedValue::Device)
    }

    pub fn encode_spec(&self, spec: &ConfigSpec) -> Result<Value> {
        serde_json::to_value(spec).map_err(|err| CodecError::Decode(err.to_string()))
    }

    /// Decode a whole change set, validating every embedded device's
    /// discriminator against the registry.
    pub fn decode_spec(&self, mut value: Value) -> Result<ConfigSpec> {
        if let Some(changes) = value
            .get_mut("device_changes")
            .and_then(Value::as_array_mut)
        {
            for change in changes {
                let Some(device) = change.get_mut("device") else {
                    continue;
                };
                if device.is_null() {
                    continue;
                }
                let (name, _) = split_typed_object(device)?;
                if !self.registry.contains(name) {
                    return Err(CodecError::UnknownType(strip_prefix(name).to_owned()));
                }
                *device = normalize_tag(std::mem::take(device));
            }
        }
        serde_json::from_value(value).map_err(|err| CodecError::Decode(err.to_string()))
    }
}

fn strip_prefix(name: &str) -> &str {
    name.strip_prefix("vim25:").unwrap_or(name)
}

/// Rewrite `_typeName` to its prefix-free form so serde's tag matching sees
/// the canonical name.
fn normalize_tag(mut value: Value) -> Value {
    if let Some(object) = value.as_object_mut() {
        if let Some(Value::String(name)) = object.get(TYPE_KEY) {
            let canonical = strip_prefix(name);
            if canonical.len() != name.len() {
                let canonical = canonical.to_owned();
                object.insert(TYPE_KEY.to_owned(), Value::String(canonical));
            }
        }
    }
    value
}

fn split_typed_object(value: &Value) -> Result<(&str, &Map<String, Value>)> {
    let object = value
        .as_object()
        .ok_or_else(|| CodecError::MalformedJson("not an object".to_owned()))?;
    let name = object
        .get(TYPE_KEY)
        .and_then(Value::as_str)
        .ok_or_else(|| CodecError::MalformedJson("missing _typeName".to_owned()))?;
    Ok((name, object))
}

/// Decode the `_value` of a primitive wrapper. `Ok(None)` means the name is
/// not a primitive at all.
fn decode_primitive_body(name: &str, object: &Map<String, Value>) -> Result<Option<PrimitiveValue>> {
    let is_primitive = matches!(
        name,
        "boolean"
            | "byte"
            | "short"
            | "int"
            | "long"
            | "float"
            | "double"
            | "string"
            | "binary"
            | "dateTime"
    );
    if !is_primitive {
        return Ok(None);
    }
    let raw = object.get(VALUE_KEY).ok_or_else(|| {
        CodecError::MalformedJson(format!("primitive {name} missing _value"))
    })?;

    let bad = |type_name: &'static str, reason: &'static str| CodecError::BadPrimitive {
        type_name,
        reason,
    };

    let primitive = match name {
        "boolean" => PrimitiveValue::Boolean(
            raw.as_bool().ok_or_else(|| bad("boolean", "not a bool"))?,
        ),
        "byte" => {
            let n = raw.as_u64().ok_or_else(|| bad("byte", "not an integer"))?;
            let n = u8::try_from(n).map_err(|_| bad("byte", "out of range"))?;
            PrimitiveValue::Byte(n)
        }
        "short" => {
            let n = raw.as_i64().ok_or_else(|| bad("short", "not an integer"))?;
            let n = i16::try_from(n).map_err(|_| bad("short", "out of range"))?;
            PrimitiveValue::Short(n)
        }
        "int" => {
            let n = raw.as_i64().ok_or_else(|| bad("int", "not an integer"))?;
            let n = i32::try_from(n).map_err(|_| bad("int", "out of range"))?;
            PrimitiveValue::Int(n)
        }
        "long" => PrimitiveValue::Long(
            raw.as_i64().ok_or_else(|| bad("long", "not an integer"))?,
        ),
        "float" => {
            let n = raw.as_f64().ok_or_else(|| bad("float", "not a number"))?;
            PrimitiveValue::Float(n as f32)
        }
        "double" => PrimitiveValue::Double(
            raw.as_f64().ok_or_else(|| bad("double", "not a number"))?,
        ),
        "string" => PrimitiveValue::String(
            raw.as_str()
                .ok_or_else(|| bad("string", "not a string"))?
                .to_owned(),
        ),
        "binary" => {
            let items = raw.as_array().ok_or_else(|| bad("binary", "not an array"))?;
            let mut bytes = Vec::with_capacity(items.len());
            for item in items {
                let n = item.as_u64().ok_or_else(|| bad("binary", "not an integer"))?;
                let n = u8::try_from(n).map_err(|_| bad("binary", "byte out of range"))?;
                bytes.push(n);
            }
            PrimitiveValue::Binary(bytes)
        }
        "dateTime" => PrimitiveValue::DateTime(
            raw.as_str()
                .ok_or_else(|| bad("dateTime", "not a string"))?
                .to_owned(),
        ),
        _ => unreachable!("name checked against the primitive table"),
    };
    Ok(Some(primitive))
}
