//! Filesystem-facing helpers: hashing, sidecars, the gate and the mapping
//! engine.

pub mod config;
pub mod dictionary;
pub mod fingerprint;
pub mod gate;
pub mod hash;
pub mod sidecar;
pub mod transform;
