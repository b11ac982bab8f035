//! Canonical payload encoding.
//!
//! The payload of a record is the exact message its signatures cover. It is
//! built by joining the record's fields with reserved separator tokens:
//!
//! ```text
//! producer: public_key ;; major,,minor,,patch ;; name
//! product:  public_key ;; major,,minor,,patch ;; name ;; producer_public_key ;; in_1,,in_2,,...
//! ```
//!
//! Signing and verification both go through these functions, so the two
//! sides always see identical bytes. Signatures are never part of a payload.
//!
//! Keys are hex and names are rejected if they contain a separator (see
//! [`check_name`](crate::validation::check_name)), so splitting a payload on
//! the separators recovers the fields unambiguously.

use crate::types::Version;

/// The pair of reserved separator tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Separators {
    /// Joins top-level fields.
    pub field: &'static str,
    /// Joins the elements of a list-valued field.
    pub list: &'static str,
}

impl Separators {
    /// True if `c` occurs in either separator token.
    pub fn is_delimiter(&self, c: char) -> bool {
        self.field.contains(c) || self.list.contains(c)
    }
}

/// The separators of the current protocol.
pub const SEPARATORS: Separators = Separators {
    field: ";;",
    list: ",,",
};

/// Render a version as `major,,minor,,patch`.
pub fn version_payload(version: &Version) -> String {
    [
        version.major.to_string(),
        version.minor.to_string(),
        version.patch.to_string(),
    ]
    .join(SEPARATORS.list)
}

/// Payload of a producer record.
pub fn producer_payload(public_key: &str, version: &Version, name: &str) -> String {
    let version = version_payload(version);
    [public_key, version.as_str(), name].join(SEPARATORS.field)
}

/// Payload of a product record.
///
/// An empty input list renders as an empty final field.
pub fn product_payload<S: AsRef<str>>(
    public_key: &str,
    version: &Version,
    name: &str,
    producer_public_key: &str,
    input_public_keys: &[S],
) -> String {
    let inputs = input_public_keys
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<&str>>()
        .join(SEPARATORS.list);
    let version = version_payload(version);

    [
        public_key,
        version.as_str(),
        name,
        producer_public_key,
        inputs.as_str(),
    ]
    .join(SEPARATORS.field)
}
