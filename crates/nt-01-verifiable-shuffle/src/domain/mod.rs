//! # Domain Layer
//!
//! Proof algebra only: no I/O, no logging of secret material.

pub mod errors;
pub mod pair;
pub mod permutation;
pub mod simple;
pub mod transcript;
