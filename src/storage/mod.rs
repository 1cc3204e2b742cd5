pub mod proof_image;
pub mod proof_store;

pub use proof_image::{ProofFormat, compress_proof, fit_within, sniff_format};
pub use proof_store::{ProofStore, StoredProof};
