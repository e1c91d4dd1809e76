//! Golden vectors for document rendering and digesting.
//!
//! Any implementation rendering the same fields at the same timestamp on the
//! same network must produce byte-identical documents, and so the same
//! digest.

use permacert_core::{digest, Artifact, DocumentGenerator, NetworkMode, SubjectFields};

/// A golden vector.
#[derive(Debug, Clone)]
pub struct GoldenVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub issuee: &'static str,
    pub course: &'static str,
    pub date: &'static str,
    /// Generation timestamp, Unix ms.
    pub generated_at: i64,
    pub network: NetworkMode,
    /// Expected document length in bytes.
    pub expected_len: u64,
    /// Expected SHA-256 of the document (lowercase hex).
    pub expected_digest: &'static str,
}

impl GoldenVector {
    pub fn fields(&self) -> SubjectFields {
        SubjectFields::new(self.issuee, self.course, self.date)
    }

    /// Render the vector's document.
    pub fn render(&self) -> Artifact {
        DocumentGenerator::new(self.network).generate_at(&self.fields(), self.generated_at)
    }
}

/// The reference subject: Ana, Rust 101, 2024-05-01.
pub fn ana() -> SubjectFields {
    SubjectFields::new("Ana", "Rust 101", "2024-05-01")
}

/// Get all golden vectors.
pub fn all_vectors() -> Vec<GoldenVector> {
    vec![
        GoldenVector {
            name: "reference subject on testnet",
            issuee: "Ana",
            course: "Rust 101",
            date: "2024-05-01",
            generated_at: 1_714_564_800_000, // 2024-05-01T12:00:00Z
            network: NetworkMode::Testnet,
            expected_len: 306,
            expected_digest: "3c141bdf7db7fb03752a3505ae0c1dcd9bf9ac6393fbf817d1ac384d54ef85d8",
        },
        GoldenVector {
            name: "non-ascii subject on mainnet",
            issuee: "José Núñez",
            course: "Criptografía Aplicada",
            date: "2024-12-31",
            generated_at: 1_735_689_599_999,
            network: NetworkMode::Mainnet,
            expected_len: 330,
            expected_digest: "65d723839e05efbec5bea6fc68e522b4308010c6f1b86b92f43064cf06caf57c",
        },
        GoldenVector {
            name: "single-letter fields at the epoch",
            issuee: "A",
            course: "B",
            date: "C",
            generated_at: 0,
            network: NetworkMode::Testnet,
            expected_len: 288,
            expected_digest: "0e564fba040253375018f011925d1c3dde9ae78bf4571054afd86604f40386a0",
        },
    ]
}

/// Check every vector. Returns the names of the vectors that differ.
pub fn verify_all_vectors() -> Result<(), Vec<&'static str>> {
    let failures: Vec<_> = all_vectors()
        .into_iter()
        .filter(|v| {
            let artifact = v.render();
            artifact.len() != v.expected_len || digest(&artifact).to_hex() != v.expected_digest
        })
        .map(|v| v.name)
        .collect();

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use permacert_core::ContentDigest;

    #[test]
    fn test_vectors_match() {
        assert_eq!(verify_all_vectors(), Ok(()));
    }

    #[test]
    fn test_expected_digests_are_well_formed() {
        for vector in all_vectors() {
            let bytes = hex::decode(vector.expected_digest).unwrap();
            assert_eq!(bytes.len(), 32, "{}", vector.name);
            assert!(ContentDigest::from_hex(vector.expected_digest).is_ok());
        }
    }

    #[test]
    fn test_rendering_is_stable() {
        for vector in all_vectors() {
            assert_eq!(vector.render(), vector.render(), "{}", vector.name);
        }
    }
}
