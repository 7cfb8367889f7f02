use crate::data::record::{Field, WineRecord};

/// Label for records whose classifying field is absent.
pub const UNKNOWN_GROUP: &str = "Unknown";

/// Group label for a record: the textual form of `field`, or
/// [`UNKNOWN_GROUP`] when the field is null or stringifies to nothing.
pub fn group_key(record: &WineRecord, field: Field) -> String {
    record
        .get(field)
        .display_text()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| UNKNOWN_GROUP.to_string())
}
