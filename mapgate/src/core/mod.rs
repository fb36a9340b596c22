//! Deterministic, pure logic shared by the gate and the mapping engine.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data structures and return deterministic outputs suitable for tests.

pub mod descriptor;
pub mod fingerprint;
pub mod srg;
