use thiserror::Error;

pub type Result<T> = std::result::Result<T, CodecError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// A decimal byte element held a value above 255.
    #[error("byte element <{element}> overflows: {value}")]
    ByteOverflow { element: String, value: u64 },

    /// Structurally broken XML or non-digit element content.
    #[error("malformed xml: {0}")]
    MalformedXml(String),

    /// The `_typeName` discriminator names no registered type (checked
    /// after stripping an optional `vim25:` prefix).
    #[error("unknown type name: {0:?}")]
    UnknownType(String),

    /// A `{_typeName, _value}` wrapper whose value is outside the primitive's
    /// range or of the wrong JSON shape.
    #[error("bad {type_name} primitive: {reason}")]
    BadPrimitive {
        type_name: &'static str,
        reason: &'static str,
    },

    /// JSON that is structurally valid but not a typed object.
    #[error("malformed typed json: {0}")]
    MalformedJson(String),

    /// Payload decoding failed after the type name resolved.
    #[error("decode failed: {0}")]
    Decode(String),
}
