//! The message a wallet signs for an upload.
//!
//! The message commits to the data and to every tag, in order, so neither
//! can be swapped after signing. All variable-length fields are
//! length-prefixed (big-endian) to keep the encoding unambiguous.

use permacert_core::{ContentDigest, TagSet};

/// Domain separator for upload signatures.
pub const SIGN_DOMAIN: &[u8] = b"permacert/data-item/v1";

/// SHA-256 over the domain, the data and the tags.
pub fn signing_message(data: &[u8], tags: &TagSet) -> [u8; 32] {
    let mut buf = Vec::with_capacity(SIGN_DOMAIN.len() + 16 + data.len() + tags.len() * 32);
    buf.extend_from_slice(SIGN_DOMAIN);
    buf.extend_from_slice(&(data.len() as u64).to_be_bytes());
    buf.extend_from_slice(data);
    buf.extend_from_slice(&(tags.len() as u32).to_be_bytes());
    for tag in tags {
        push_field(&mut buf, tag.name.as_bytes());
        push_field(&mut buf, tag.value.as_bytes());
    }
    *ContentDigest::hash(&buf).as_bytes()
}

fn push_field(buf: &mut Vec<u8>, field: &[u8]) {
    buf.extend_from_slice(&(field.len() as u32).to_be_bytes());
    buf.extend_from_slice(field);
}
