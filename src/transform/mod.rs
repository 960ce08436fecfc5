//! Record normalization.
//!
//! Turns raw feed records into the fixed output shape: null coalescing for
//! the time fields, markup stripping for the policy text, and country-name
//! to ISO-code resolution. The transform is a pure function of one record,
//! so chunks of records can be processed on any number of workers in any
//! order.

pub mod country;
pub mod sanitize;

use serde_json::Value;
use snafu::ResultExt;

use crate::error::{DecodeSnafu, TransformError};
use crate::model::{NormalizedPolicyRecord, PolicyText, RawPolicyRecord};

pub use country::{UNKNOWN_COUNTRY, resolve};
pub use sanitize::sanitize;

/// Normalize one raw record.
///
/// Total: every possible `RawPolicyRecord` produces a record with no empty
/// optionals left — absent fields become empty strings and an unmapped
/// country becomes the `Unknown` sentinel.
pub fn transform(raw: &RawPolicyRecord) -> NormalizedPolicyRecord {
    NormalizedPolicyRecord {
        check_in: raw.check_in_start_time.clone().unwrap_or_default(),
        check_out: raw.check_out_time.clone().unwrap_or_default(),
        policy: PolicyText {
            pet_policy: sanitize(raw.pet_policy.as_deref().unwrap_or_default()),
            child_policy: sanitize(
                raw.children_and_extra_bed_policy.as_deref().unwrap_or_default(),
            ),
        },
        country_code: resolve(raw.country.as_deref().unwrap_or("")).to_string(),
    }
}

/// Normalize a chunk of already-parsed JSON records.
///
/// `offset` is the zero-based position of the chunk's first record in the
/// input, used to report which row failed. A field carrying the wrong JSON
/// type fails the whole batch; there is no partial-row recovery.
pub fn transform_chunk(
    values: Vec<Value>,
    offset: usize,
) -> Result<Vec<NormalizedPolicyRecord>, TransformError> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, value)| {
            let raw: RawPolicyRecord =
                serde_json::from_value(value).context(DecodeSnafu { record: offset + i + 1 })?;
            Ok(transform(&raw))
        })
        .collect()
}
