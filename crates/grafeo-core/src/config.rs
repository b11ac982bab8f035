//! Protocol configuration.

use crate::types::Version;

/// Settings that decide which records count as valid.
///
/// Passed explicitly to constructors and validity checks instead of living
/// in process-wide state, so tests can exercise several protocol versions
/// side by side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtocolConfig {
    /// The only version accepted by `check()`.
    pub current_version: Version,
}

impl ProtocolConfig {
    /// Config accepting exactly `version`.
    pub const fn with_version(version: Version) -> Self {
        Self {
            current_version: version,
        }
    }
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            current_version: Version::CURRENT,
        }
    }
}
