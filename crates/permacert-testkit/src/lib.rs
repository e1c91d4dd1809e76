//! # Permacert Testkit
//!
//! Testing utilities for Permacert.
//!
//! ## Overview
//!
//! - **Golden vectors**: fixed subject fields and timestamps with the
//!   expected document digest, for cross-implementation checks
//! - **Generators**: proptest strategies for subject fields and sizes
//! - **Fixtures**: a pipeline wired to in-memory collaborators
//!
//! ## Golden Vectors
//!
//! ```rust
//! use permacert_testkit::vectors::{all_vectors, verify_all_vectors};
//!
//! for vector in all_vectors() {
//!     println!("{}: {}", vector.name, vector.expected_digest);
//! }
//! assert!(verify_all_vectors().is_ok());
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust,no_run
//! use permacert_testkit::fixtures::TestFixture;
//! use permacert_testkit::vectors::ana;
//!
//! async fn example() {
//!     let fixture = TestFixture::connected(1_000_000_000_000).await;
//!     let record = fixture.pipeline.issue(&ana()).await.unwrap();
//!     assert!(fixture.network.item(record.transaction_id.as_str()).is_some());
//! }
//! ```

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::TestFixture;
pub use generators::{byte_sizes, subject_fields};
pub use vectors::{all_vectors, verify_all_vectors, GoldenVector};
