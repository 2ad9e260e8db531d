use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::VersionError;

/// A named hypervisor release.
///
/// The enumeration is closed: a string that parses grammatically but names a
/// release outside this table is rejected as malformed. Variant order is
/// release order, so the derived `Ord` compares releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HypervisorVersion {
    V5_0,
    V5_1,
    V5_5,
    V6_0,
    V6_5,
    V6_7,
    V7_0,
    V7_0U1,
    V7_0U2,
    V7_0U3,
    V8_0,
    V8_0U1,
    V8_0U2,
    V8_0U3,
}

impl HypervisorVersion {
    pub const ALL: [HypervisorVersion; 14] = [
        HypervisorVersion::V5_0,
        HypervisorVersion::V5_1,
        HypervisorVersion::V5_5,
        HypervisorVersion::V6_0,
        HypervisorVersion::V6_5,
        HypervisorVersion::V6_7,
        HypervisorVersion::V7_0,
        HypervisorVersion::V7_0U1,
        HypervisorVersion::V7_0U2,
        HypervisorVersion::V7_0U3,
        HypervisorVersion::V8_0,
        HypervisorVersion::V8_0U1,
        HypervisorVersion::V8_0U2,
        HypervisorVersion::V8_0U3,
    ];

    /// `(major, minor, update)` of the release. Patch releases collapse into
    /// updates during parsing, so no patch component survives here.
    pub fn release(self) -> (u32, u32, u32) {
        match self {
            HypervisorVersion::V5_0 => (5, 0, 0),
            HypervisorVersion::V5_1 => (5, 1, 0),
            HypervisorVersion::V5_5 => (5, 5, 0),
            HypervisorVersion::V6_0 => (6, 0, 0),
            HypervisorVersion::V6_5 => (6, 5, 0),
            HypervisorVersion::V6_7 => (6, 7, 0),
            HypervisorVersion::V7_0 => (7, 0, 0),
            HypervisorVersion::V7_0U1 => (7, 0, 1),
            HypervisorVersion::V7_0U2 => (7, 0, 2),
            HypervisorVersion::V7_0U3 => (7, 0, 3),
            HypervisorVersion::V8_0 => (8, 0, 0),
            HypervisorVersion::V8_0U1 => (8, 0, 1),
            HypervisorVersion::V8_0U2 => (8, 0, 2),
            HypervisorVersion::V8_0U3 => (8, 0, 3),
        }
    }

    /// Every named release is well-formed by construction.
    pub fn is_valid(self) -> bool {
        true
    }

    /// Support floor is 6.5; older releases still parse and compare.
    pub fn is_supported(self) -> bool {
        self >= HypervisorVersion::V6_5
    }
}

/// Split `v?<major>(.<minor>(.<patch>)?)?(u<update>)?` into its numeric
/// components. Returns `None` when the grammar does not match.
fn parse_tuple(s: &str) -> Option<(u32, u32, u32, u32)> {
    let s = s
        .strip_prefix('v')
        .or_else(|| s.strip_prefix('V'))
        .unwrap_or(s);
    if s.is_empty() {
        return None;
    }

    let (release, update) = match s.find(&['u', 'U'][..]) {
        Some(pos) => {
            let update: u32 = parse_component(&s[pos + 1..])?;
            (&s[..pos], update)
        }
        None => (s, 0),
    };

    let mut parts = release.split('.');
    let major = parse_component(parts.next()?)?;
    let minor = match parts.next() {
        Some(p) => parse_component(p)?,
        None => 0,
    };
    let patch = match parts.next() {
        Some(p) => parse_component(p)?,
        None => 0,
    };
    if parts.next().is_some() {
        return None;
    }
    Some((major, minor, patch, update))
}

fn parse_component(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

impl FromStr for HypervisorVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor, mut patch, mut update) =
            parse_tuple(s).ok_or_else(|| VersionError::Malformed(s.to_owned()))?;

        // `x.y.z` names the same release as `x.y.0uz`; fold the patch into
        // the update before the table lookup.
        if update == 0 && patch > 0 {
            update = patch;
            patch = 0;
        }

        let version = match (major, minor, patch, update) {
            (5, 0, 0, 0) => HypervisorVersion::V5_0,
            (5, 1, 0, 0) => HypervisorVersion::V5_1,
            (5, 5, 0, 0) => HypervisorVersion::V5_5,
            (6, 0, 0, 0) => HypervisorVersion::V6_0,
            (6, 5, 0, 0) => HypervisorVersion::V6_5,
            (6, 7, 0, 0) => HypervisorVersion::V6_7,
            (7, 0, 0, 0) => HypervisorVersion::V7_0,
            (7, 0, 0, 1) => HypervisorVersion::V7_0U1,
            (7, 0, 0, 2) => HypervisorVersion::V7_0U2,
            (7, 0, 0, 3) => HypervisorVersion::V7_0U3,
            (8, 0, 0, 0) => HypervisorVersion::V8_0,
            (8, 0, 0, 1) => HypervisorVersion::V8_0U1,
            (8, 0, 0, 2) => HypervisorVersion::V8_0U2,
            (8, 0, 0, 3) => HypervisorVersion::V8_0U3,
            _ => return Err(VersionError::Malformed(s.to_owned())),
        };
        Ok(version)
    }
}

impl fmt::Display for HypervisorVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (major, minor, update) = self.release();
        write!(f, "{major}.{minor}")?;
        if update > 0 {
            write!(f, "u{update}")?;
        }
        Ok(())
    }
}

impl Serialize for HypervisorVersion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HypervisorVersion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(D::Error::custom)
    }
}
