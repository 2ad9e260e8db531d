//! Wire codecs for the device model.
//!
//! Two independent encodings plus their shared plumbing:
//!
//! - [`encode_byte_array`] / [`decode_byte_array`]: the XML convention of one
//!   element per byte, decimal text, element name inherited from the
//!   enclosing element.
//! - [`TypedJsonCodec`]: JSON with a `_typeName` discriminator on every
//!   object and `{_typeName, _value}` wrappers for primitives in polymorphic
//!   slots. Type names resolve against a [`TypeRegistry`]; an incoming
//!   `vim25:` prefix is stripped before lookup.
//! - [`stringify`]: best-effort debug rendering that never fails.
//!
//! Registries are write-once: build the registry up front, then share it.
//! Decoding has no side effects on the registry.

mod error;
mod json;
mod registry;
mod stringify;
mod xml;

pub use error::{CodecError, Result};
pub use json::{PrimitiveValue, TypedJsonCodec, TypedValue};
pub use registry::{device_registry, DecodeFn, TypeRegistry, TypeRegistryBuilder};
pub use stringify::stringify;
pub use xml::{decode_byte_array, encode_byte_array};

#[cfg(test)]
mod proptests;
