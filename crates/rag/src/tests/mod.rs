//! End-to-end pipeline scenarios with in-crate mock search, fetch and model.
