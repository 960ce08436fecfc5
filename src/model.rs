//! Record shapes for the lodging-policy feed.

use serde::Deserialize;

/// One lodging-policy record as it appears in the input feed.
///
/// Every field is optional: the feed is schema-on-read, so an absent or
/// `null` field is normal data, not a parse failure. Unknown fields are
/// ignored. A field that is present with the wrong type is a decode error
/// and aborts the batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawPolicyRecord {
    pub check_in_start_time: Option<String>,
    pub check_out_time: Option<String>,
    pub pet_policy: Option<Vec<String>>,
    pub children_and_extra_bed_policy: Option<Vec<String>>,
    pub country: Option<String>,
}

/// Sanitized policy text, nested under the `policy` column.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolicyText {
    pub pet_policy: String,
    pub child_policy: String,
}

/// A fully normalized record, ready for the table.
///
/// No field is ever null: absent inputs normalize to empty strings and an
/// unmapped country to the `Unknown` sentinel. `Eq + Hash` cover the whole
/// row so batch-level dedup collapses exact duplicates only.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NormalizedPolicyRecord {
    pub check_in: String,
    pub check_out: String,
    pub policy: PolicyText,
    pub country_code: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_camel_case_fields() {
        let raw: RawPolicyRecord = serde_json::from_str(
            r#"{
                "checkInStartTime": "3:00 PM",
                "checkOutTime": "11:00 AM",
                "petPolicy": ["<b>Pets</b> allowed"],
                "childrenAndExtraBedPolicy": ["No cribs"],
                "country": "France"
            }"#,
        )
        .unwrap();

        assert_eq!(raw.check_in_start_time.as_deref(), Some("3:00 PM"));
        assert_eq!(raw.check_out_time.as_deref(), Some("11:00 AM"));
        assert_eq!(raw.pet_policy.as_deref().unwrap().len(), 1);
        assert_eq!(raw.country.as_deref(), Some("France"));
    }

    #[test]
    fn absent_and_null_fields_are_none() {
        let raw: RawPolicyRecord =
            serde_json::from_str(r#"{"country": null, "extraField": 1}"#).unwrap();
        assert_eq!(raw, RawPolicyRecord::default());
    }

    #[test]
    fn wrong_field_type_is_an_error() {
        let result = serde_json::from_str::<RawPolicyRecord>(r#"{"petPolicy": 42}"#);
        assert!(result.is_err());
    }
}
