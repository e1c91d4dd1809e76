//! Proptest generators for property-based testing.

use proptest::prelude::*;

use permacert_core::{ExtraMetadata, SubjectFields};

/// A non-empty, printable field value.
pub fn field_value() -> impl Strategy<Value = String> {
    "[A-Za-zÀ-ÿ0-9][A-Za-zÀ-ÿ0-9 .,'-]{0,39}"
}

/// Valid subject fields (all three non-empty).
pub fn subject_fields() -> impl Strategy<Value = SubjectFields> {
    (field_value(), field_value(), "20[0-9]{2}-[01][0-9]-[0-3][0-9]")
        .prop_map(|(issuee, course, date)| SubjectFields::new(issuee, course, date))
}

/// Document sizes from empty up to 64 MiB.
pub fn byte_sizes() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), 1u64..=1024, 1024u64..=64 * 1024 * 1024]
}

/// A generation timestamp between 2000 and 2100.
pub fn timestamp() -> impl Strategy<Value = i64> {
    946_684_800_000i64..=4_102_444_800_000
}

/// Metadata entries mixing present, empty and absent values.
pub fn extra_metadata() -> impl Strategy<Value = ExtraMetadata> {
    prop::collection::vec(
        (
            "[a-z]{1,8}",
            prop_oneof![
                Just(None),
                Just(Some(String::new())),
                field_value().prop_map(Some),
            ],
        ),
        0..8,
    )
    .prop_map(|entries| {
        let mut extra = ExtraMetadata::new();
        for (name, value) in entries {
            extra.insert_custom(name, value);
        }
        extra
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use permacert_core::{digest, is_present, DocumentGenerator, NetworkMode, TagSet};

    proptest! {
        #[test]
        fn prop_generated_fields_are_complete(fields in subject_fields()) {
            prop_assert!(fields.is_complete());
        }

        #[test]
        fn prop_digest_is_deterministic(fields in subject_fields(), at in timestamp()) {
            let generator = DocumentGenerator::new(NetworkMode::Testnet);
            let a = generator.generate_at(&fields, at);
            let b = generator.generate_at(&fields, at);
            prop_assert_eq!(digest(&a), digest(&b));
        }

        #[test]
        fn prop_assembled_tags_skip_empty(extra in extra_metadata()) {
            let base = TagSet::new().with("Type", "certificate");
            let tags = TagSet::assemble(&base, &extra);

            let present = extra.entries().filter(|(_, v)| is_present(*v)).count();
            prop_assert_eq!(tags.len(), base.len() + present);
            prop_assert!(tags.iter().all(|t| !t.value.is_empty()));
            prop_assert_eq!(&tags.as_slice()[..base.len()], base.as_slice());
        }
    }
}
