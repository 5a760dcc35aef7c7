//! Triplet mining and batching for shape ↔ text metric learning.
//!
//! A corpus of voxel shapes and descriptions linked by identifier is
//! split into train and test partitions without leaking identifiers,
//! then sampled into anchor / positive / negative triplets in either
//! retrieval direction, uniformly or as lexically clustered "smart"
//! batches.

pub mod application;
pub mod data;
pub mod domain;
pub mod error;
pub mod infra;
