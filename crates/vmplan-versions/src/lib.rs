//! Hardware-version and hypervisor-version ordinals.
//!
//! Both types parse the text grammar used on the wire and expose two distinct
//! queries:
//!
//! - [`HardwareVersion::is_valid`] / [`HypervisorVersion`] parsing: "is this
//!   a well-formed version at all?"
//! - `is_supported`: "is this version inside the enumeration the planner
//!   knows about?"
//!
//! An unsupported version is *not* an error; callers that care query it.

mod error;
mod hardware;
mod hypervisor;

pub use error::{Result, VersionError};
pub use hardware::HardwareVersion;
pub use hypervisor::HypervisorVersion;
