//! The canonical personal-data record threaded through the pipeline.
//!
//! [`FieldKey`] is a closed enumeration: the pipeline deals in a fixed,
//! known set of identity fields, never arbitrary strings. Keeping the key
//! space closed means a typo'd key is a compile error, every stage can
//! enumerate the full catalog, and the wire layer maps names in exactly one
//! place.
//!
//! [`FieldRecord`] stores whatever string was last written per key. A value
//! that is absent or blank after trimming is "not provided"; the record keeps
//! the raw string so an explicit blank edit still overwrites the previous
//! value under the pipeline's replace semantics (a stage hands back the full
//! next version of the record, never a delta).

use serde::de::{Deserialize, Deserializer};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// One of the eleven identity fields the pipeline knows about.
///
/// Variant order is the canonical display order used by every stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FieldKey {
    Name,
    FatherName,
    DateOfBirth,
    Gender,
    Address,
    City,
    State,
    Pincode,
    Phone,
    Email,
    IdNumber,
}

/// How a field should be presented for editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Single-line free text.
    Text,
    /// Calendar date.
    Date,
    /// Single choice from a fixed option list.
    Select(&'static [&'static str]),
    /// Multi-line free text.
    MultiLine,
}

impl FieldKey {
    /// All keys in canonical display order.
    pub const ALL: [FieldKey; 11] = [
        FieldKey::Name,
        FieldKey::FatherName,
        FieldKey::DateOfBirth,
        FieldKey::Gender,
        FieldKey::Address,
        FieldKey::City,
        FieldKey::State,
        FieldKey::Pincode,
        FieldKey::Phone,
        FieldKey::Email,
        FieldKey::IdNumber,
    ];

    /// The camelCase name used by the remote API.
    pub fn wire_name(self) -> &'static str {
        match self {
            FieldKey::Name => "name",
            FieldKey::FatherName => "fatherName",
            FieldKey::DateOfBirth => "dateOfBirth",
            FieldKey::Gender => "gender",
            FieldKey::Address => "address",
            FieldKey::City => "city",
            FieldKey::State => "state",
            FieldKey::Pincode => "pincode",
            FieldKey::Phone => "phone",
            FieldKey::Email => "email",
            FieldKey::IdNumber => "idNumber",
        }
    }

    /// Parse a wire name back into a key. Unknown names yield `None`.
    pub fn from_wire(name: &str) -> Option<FieldKey> {
        FieldKey::ALL.iter().copied().find(|k| k.wire_name() == name)
    }

    /// Human-readable label for editing and review views.
    pub fn label(self) -> &'static str {
        match self {
            FieldKey::Name => "Full Name",
            FieldKey::FatherName => "Father's Name",
            FieldKey::DateOfBirth => "Date of Birth",
            FieldKey::Gender => "Gender",
            FieldKey::Address => "Address",
            FieldKey::City => "City",
            FieldKey::State => "State",
            FieldKey::Pincode => "Pincode",
            FieldKey::Phone => "Phone Number",
            FieldKey::Email => "Email Address",
            FieldKey::IdNumber => "ID Number",
        }
    }

    /// The input control appropriate for this field.
    pub fn input_kind(self) -> InputKind {
        match self {
            FieldKey::DateOfBirth => InputKind::Date,
            FieldKey::Gender => InputKind::Select(&["Male", "Female", "Other"]),
            FieldKey::Address => InputKind::MultiLine,
            _ => InputKind::Text,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The key/value set of personal data carried from stage to stage.
///
/// Values are stored raw. "Provided" means non-blank after trimming; see
/// [`FieldRecord::is_provided`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldRecord {
    values: BTreeMap<FieldKey, String>,
}

impl FieldRecord {
    /// An empty record: every key "not provided".
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` for `key`, replacing anything previously there.
    ///
    /// Blank values are stored as given: an intentional blank edit must
    /// supersede an earlier non-blank value.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        self.values.insert(key, value.into());
    }

    /// Remove any stored value for `key`.
    pub fn clear(&mut self, key: FieldKey) {
        self.values.remove(&key);
    }

    /// The raw stored value, if any (may be blank).
    pub fn get(&self, key: FieldKey) -> Option<&str> {
        self.values.get(&key).map(String::as_str)
    }

    /// The trimmed value when the field is provided, else `None`.
    pub fn provided(&self, key: FieldKey) -> Option<&str> {
        self.values
            .get(&key)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Whether `key` holds a non-blank-after-trim value.
    pub fn is_provided(&self, key: FieldKey) -> bool {
        self.provided(key).is_some()
    }

    /// Number of provided fields.
    pub fn provided_count(&self) -> usize {
        FieldKey::ALL
            .iter()
            .filter(|&&k| self.is_provided(k))
            .count()
    }

    /// Keys with provided values, in canonical order.
    pub fn provided_keys(&self) -> Vec<FieldKey> {
        FieldKey::ALL
            .iter()
            .copied()
            .filter(|&k| self.is_provided(k))
            .collect()
    }

    /// True when no field is provided.
    pub fn is_empty(&self) -> bool {
        self.provided_count() == 0
    }

    /// Iterate stored `(key, raw value)` pairs in canonical key order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldKey, &str)> {
        self.values.iter().map(|(k, v)| (*k, v.as_str()))
    }
}

impl FromIterator<(FieldKey, String)> for FieldRecord {
    fn from_iter<I: IntoIterator<Item = (FieldKey, String)>>(iter: I) -> Self {
        FieldRecord {
            values: iter.into_iter().collect(),
        }
    }
}

// The wire shape is a flat JSON object of wire-name → string. The remote
// extraction service sends all eleven keys with "" defaults; other callers
// may send a subset. Unknown keys are ignored rather than rejected so the
// record model does not have to track the remote schema version.
impl Serialize for FieldRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in &self.values {
            map.serialize_entry(key.wire_name(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for FieldRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, String>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .filter_map(|(name, value)| FieldKey::from_wire(&name).map(|k| (k, value)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_round_trip() {
        for key in FieldKey::ALL {
            assert_eq!(FieldKey::from_wire(key.wire_name()), Some(key));
        }
        assert_eq!(FieldKey::from_wire("shoeSize"), None);
    }

    #[test]
    fn blank_after_trim_is_not_provided() {
        let mut record = FieldRecord::new();
        record.set(FieldKey::Name, "  \t ");
        record.set(FieldKey::City, "");
        record.set(FieldKey::State, " Kerala ");

        assert!(!record.is_provided(FieldKey::Name));
        assert!(!record.is_provided(FieldKey::City));
        assert_eq!(record.provided(FieldKey::State), Some("Kerala"));
        assert_eq!(record.provided_count(), 1);
    }

    #[test]
    fn explicit_blank_edit_overwrites_raw_value() {
        let mut record = FieldRecord::new();
        record.set(FieldKey::Phone, "9876543210");
        record.set(FieldKey::Phone, "");

        // The raw store reflects the edit; provided-ness reflects the blank.
        assert_eq!(record.get(FieldKey::Phone), Some(""));
        assert!(!record.is_provided(FieldKey::Phone));
    }

    #[test]
    fn serializes_as_flat_wire_object() {
        let mut record = FieldRecord::new();
        record.set(FieldKey::Name, "A Sharma");
        record.set(FieldKey::IdNumber, "1234 5678 9012");

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["name"], "A Sharma");
        assert_eq!(json["idNumber"], "1234 5678 9012");
    }

    #[test]
    fn deserializes_partial_objects_and_ignores_unknown_keys() {
        let record: FieldRecord = serde_json::from_str(
            r#"{"name": "A Sharma", "pincode": "682001", "frobnicator": "x"}"#,
        )
        .unwrap();

        assert_eq!(record.provided(FieldKey::Name), Some("A Sharma"));
        assert_eq!(record.provided(FieldKey::Pincode), Some("682001"));
        assert_eq!(record.provided_count(), 2);
    }

    #[test]
    fn deserializes_extraction_shape_with_empty_defaults() {
        // The extraction service sends every key, blank when not found.
        let record: FieldRecord = serde_json::from_str(
            r#"{"name": "A Sharma", "fatherName": "", "dateOfBirth": "",
                "gender": "", "address": "", "city": "", "state": "",
                "pincode": "", "phone": "", "email": "", "idNumber": ""}"#,
        )
        .unwrap();

        assert_eq!(record.provided_count(), 1);
        assert_eq!(record.provided_keys(), vec![FieldKey::Name]);
    }

    #[test]
    fn input_kinds_cover_the_catalog() {
        assert_eq!(FieldKey::DateOfBirth.input_kind(), InputKind::Date);
        assert_eq!(FieldKey::Address.input_kind(), InputKind::MultiLine);
        assert!(matches!(
            FieldKey::Gender.input_kind(),
            InputKind::Select(options) if options.contains(&"Other")
        ));
        assert_eq!(FieldKey::Email.input_kind(), InputKind::Text);
    }
}
