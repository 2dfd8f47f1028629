//! Deterministic synthetic data shared by unit tests, integration tests and benches.

pub mod data;
