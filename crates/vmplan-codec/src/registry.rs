use std::collections::HashMap;

use vmplan_devices::VirtualDevice;

use crate::{CodecError, Result};

/// Legacy namespace prefix stripped from incoming type names before lookup.
const LEGACY_PREFIX: &str = "vim25:";

/// Decoder for one registered type name. Takes the whole typed object,
/// `_typeName` included.
pub type DecodeFn = fn(serde_json::Value) -> Result<VirtualDevice>;

/// Builder for a [`TypeRegistry`].
///
/// Registration happens once, up front; the built registry is immutable and
/// safe to share. Registering the same name twice keeps the last decoder.
#[derive(Default)]
pub struct TypeRegistryBuilder {
    by_name: HashMap<&'static str, DecodeFn>,
}

impl TypeRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, name: &'static str, decode: DecodeFn) -> Self {
        self.by_name.insert(name, decode);
        self
    }

    pub fn build(self) -> TypeRegistry {
        TypeRegistry {
            by_name: self.by_name,
        }
    }
}

/// Immutable name → decoder map.
pub struct TypeRegistry {
    by_name: HashMap<&'static str, DecodeFn>,
}

impl TypeRegistry {
    /// Look up `name`, stripping an optional `vim25:` prefix first.
    pub fn resolve(&self, name: &str) -> Option<DecodeFn> {
        let name = name.strip_prefix(LEGACY_PREFIX).unwrap_or(name);
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }
}

fn decode_device(value: serde_json::Value) -> Result<VirtualDevice> {
    serde_json::from_value(value).map_err(|err| CodecError::Decode(err.to_string()))
}

/// Registry covering the whole device vocabulary.
pub fn device_registry() -> TypeRegistry {
    TypeRegistryBuilder::new()
        .register("PciRoot", decode_device)
        .register("StorageController", decode_device)
        .register("VirtualDisk", decode_device)
        .register("EthernetAdapter", decode_device)
        .build()
}
