//! The tag wire format.
//!
//! Tags are an ordered sequence of `{name, value}` string pairs stored next to
//! the artifact. Readers of the storage network filter certificates by these
//! names, so they are a public contract: renaming any of them requires a new
//! `App-Version`.

use serde::{Deserialize, Serialize};

/// Value of the `Type` tag for every certificate.
pub const RECORD_TYPE: &str = "certificate";

/// Well-known tag names.
pub mod names {
    pub const CONTENT_TYPE: &str = "Content-Type";
    pub const APP_NAME: &str = "App-Name";
    pub const APP_VERSION: &str = "App-Version";
    pub const WALLET: &str = "Wallet";
    pub const NETWORK: &str = "Network";
    pub const TYPE: &str = "Type";
    pub const TIMESTAMP: &str = "Timestamp";
}

/// A single `{name, value}` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// An ordered tag sequence. Duplicate names are allowed and kept in order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(Vec<Tag>);

impl TagSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a tag.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push(Tag::new(name, value));
    }

    /// Builder-style append.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.push(name, value);
        self
    }

    /// Append one tag per present entry of `extra`, in entry order.
    pub fn extend_present(&mut self, extra: &ExtraMetadata) {
        self.0.extend(extra.present_tags());
    }

    /// `base` followed by the present entries of `extra`.
    pub fn assemble(base: &TagSet, extra: &ExtraMetadata) -> Self {
        let mut tags = base.clone();
        tags.extend_present(extra);
        tags
    }

    /// First value recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }

    /// Every value recorded under `name`, in order.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |t| t.name == name)
            .map(|t| t.value.as_str())
    }

    /// Whether any tag carries `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Tag> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Tag] {
        &self.0
    }
}

impl From<Vec<Tag>> for TagSet {
    fn from(tags: Vec<Tag>) -> Self {
        Self(tags)
    }
}

impl<'a> IntoIterator for &'a TagSet {
    type Item = &'a Tag;
    type IntoIter = std::slice::Iter<'a, Tag>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Metadata fields every certificate upload carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataField {
    Issuee,
    Course,
    Date,
    Digest,
    Issuer,
    Version,
}

impl MetadataField {
    /// Tag name on the wire.
    pub fn tag_name(self) -> &'static str {
        match self {
            Self::Issuee => "tallerista",
            Self::Course => "curso",
            Self::Date => "fecha",
            Self::Digest => "hash",
            Self::Issuer => "emisor",
            Self::Version => "version",
        }
    }
}

/// Whether a metadata value is worth storing as a tag.
///
/// Absent and empty values are both dropped; they add nothing a verifier
/// could check.
pub fn is_present(value: Option<&str>) -> bool {
    matches!(value, Some(v) if !v.is_empty())
}

/// Ordered mapping of metadata names to optional values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtraMetadata {
    entries: Vec<(String, Option<String>)>,
}

impl ExtraMetadata {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a known field. Replaces an earlier value for the same field.
    pub fn insert(&mut self, field: MetadataField, value: Option<String>) {
        self.insert_custom(field.tag_name(), value);
    }

    /// Set an arbitrary name. Replaces an earlier value for the same name.
    pub fn insert_custom(&mut self, name: impl Into<String>, value: Option<String>) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Builder-style [`insert`](Self::insert) of a present value.
    pub fn with(mut self, field: MetadataField, value: impl ToString) -> Self {
        self.insert(field, Some(value.to_string()));
        self
    }

    /// Value for a name, if set and not absent.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.as_deref())
    }

    /// All entries, including absent and empty ones.
    pub fn entries(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_deref()))
    }

    /// One tag per entry that passes [`is_present`], in insertion order.
    pub fn present_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.entries
            .iter()
            .filter(|(_, v)| is_present(v.as_deref()))
            .map(|(n, v)| Tag::new(n.clone(), v.clone().unwrap_or_default()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_absent_entries_are_skipped() {
        let mut extra = ExtraMetadata::new();
        extra.insert_custom("a", Some("x".into()));
        extra.insert_custom("b", Some(String::new()));
        extra.insert_custom("c", None);

        let tags = TagSet::assemble(&TagSet::new(), &extra);

        assert_eq!(tags.len(), 1);
        assert_eq!(tags.get("a"), Some("x"));
        assert!(!tags.contains("b"));
        assert!(!tags.contains("c"));
    }

    #[test]
    fn test_base_tags_come_first() {
        let base = TagSet::new()
            .with(names::CONTENT_TYPE, "text/plain")
            .with(names::TYPE, RECORD_TYPE);
        let extra = ExtraMetadata::new()
            .with(MetadataField::Issuee, "Ana")
            .with(MetadataField::Course, "Rust 101");

        let tags = TagSet::assemble(&base, &extra);
        let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();

        assert_eq!(names, vec!["Content-Type", "Type", "tallerista", "curso"]);
    }

    #[test]
    fn test_duplicate_names_are_kept() {
        let mut base = TagSet::new().with("Topic", "rust");
        base.push("Topic", "crypto");

        let all: Vec<_> = base.get_all("Topic").collect();
        assert_eq!(all, vec!["rust", "crypto"]);
        assert_eq!(base.get("Topic"), Some("rust"));
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut extra = ExtraMetadata::new();
        extra.insert(MetadataField::Version, Some("1.0.0".into()));
        extra.insert(MetadataField::Version, None);

        assert_eq!(extra.len(), 1);
        assert_eq!(extra.get("version"), None);
        assert_eq!(extra.present_tags().count(), 0);
    }

    #[test]
    fn test_values_are_stringified() {
        let extra = ExtraMetadata::new().with(MetadataField::Version, 2);
        assert_eq!(extra.get("version"), Some("2"));
    }

    #[test]
    fn test_is_present() {
        assert!(is_present(Some("x")));
        assert!(!is_present(Some("")));
        assert!(!is_present(None));
    }
}
