use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::VersionError;

/// Virtual-hardware generation of a machine, the `vmx-<n>` ordinal.
///
/// The type is deliberately open: any `vmx-<n>` string parses, so a newer
/// hypervisor's hardware version survives a round trip through this type.
/// [`HardwareVersion::is_supported`] is the membership query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HardwareVersion(u32);

/// Oldest supported hardware version.
const MIN_SUPPORTED: u32 = 3;
/// Newest supported hardware version.
const MAX_SUPPORTED: u32 = 21;
/// Reserved hole: vmx-5 was never shipped and is not supported even though
/// it parses.
const RESERVED: u32 = 5;

impl HardwareVersion {
    pub const VMX_3: HardwareVersion = HardwareVersion(3);
    pub const VMX_4: HardwareVersion = HardwareVersion(4);
    pub const VMX_6: HardwareVersion = HardwareVersion(6);
    pub const VMX_7: HardwareVersion = HardwareVersion(7);
    pub const VMX_8: HardwareVersion = HardwareVersion(8);
    pub const VMX_9: HardwareVersion = HardwareVersion(9);
    pub const VMX_10: HardwareVersion = HardwareVersion(10);
    pub const VMX_11: HardwareVersion = HardwareVersion(11);
    pub const VMX_12: HardwareVersion = HardwareVersion(12);
    pub const VMX_13: HardwareVersion = HardwareVersion(13);
    pub const VMX_14: HardwareVersion = HardwareVersion(14);
    pub const VMX_15: HardwareVersion = HardwareVersion(15);
    pub const VMX_16: HardwareVersion = HardwareVersion(16);
    pub const VMX_17: HardwareVersion = HardwareVersion(17);
    pub const VMX_18: HardwareVersion = HardwareVersion(18);
    pub const VMX_19: HardwareVersion = HardwareVersion(19);
    pub const VMX_20: HardwareVersion = HardwareVersion(20);
    pub const VMX_21: HardwareVersion = HardwareVersion(21);

    pub fn new(ordinal: u32) -> Self {
        HardwareVersion(ordinal)
    }

    pub fn ordinal(self) -> u32 {
        self.0
    }

    /// Whether the ordinal could name real hardware at all (>= 1).
    pub fn is_valid(self) -> bool {
        self.0 >= 1
    }

    /// Whether the ordinal is inside the supported enumeration.
    pub fn is_supported(self) -> bool {
        (MIN_SUPPORTED..=MAX_SUPPORTED).contains(&self.0) && self.0 != RESERVED
    }

    /// All supported hardware versions, oldest first.
    pub fn supported() -> impl Iterator<Item = HardwareVersion> {
        (MIN_SUPPORTED..=MAX_SUPPORTED)
            .filter(|&n| n != RESERVED)
            .map(HardwareVersion)
    }
}

impl fmt::Display for HardwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "vmx-{}", self.0)
    }
}

impl FromStr for HardwareVersion {
    type Err = VersionError;

    /// Accepts `vmx-<n>` (prefix ASCII case-insensitive) or a bare `<n>`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = match s.get(..4) {
            Some(prefix) if prefix.eq_ignore_ascii_case("vmx-") => &s[4..],
            _ => s,
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(VersionError::Malformed(s.to_owned()));
        }
        let ordinal: u32 = digits
            .parse()
            .map_err(|_| VersionError::Malformed(s.to_owned()))?;
        Ok(HardwareVersion(ordinal))
    }
}

impl Serialize for HardwareVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HardwareVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
