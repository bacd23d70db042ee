//! # Verifiable Shuffle Subsystem (NT-01)
//!
//! Permutes and re-randomizes lists of ElGamal-style pairs and proves, in
//! zero knowledge, that the output is a permutation of the input under one
//! secret permutation shared by both columns.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): transcript, simple k-shuffle, pair shuffle
//! - **Service Layer** (`service.rs`): random permutation mode with deferred proving
//!
//! ## Protocol Layers
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ service::shuffle  → ShuffleOutput + prover   │
//! ├──────────────────────────────────────────────┤
//! │ pair::prove / pair::verify  (Neff, 5 moves)  │
//! ├──────────────────────────────────────────────┤
//! │ simple::prove / simple::verify (k-shuffle)   │
//! ├──────────────────────────────────────────────┤
//! │ Transcript (SHA-256 Fiat–Shamir)             │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! ## Security Notes
//!
//! - Challenges bind the full statement `(g, h, X, Y, X̄, Ȳ)`; a proof cannot
//!   be replayed for different outputs.
//! - The permutation and blinding scalars never leave [`DeferredProver`].

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod domain;
pub mod service;

pub use domain::errors::ShuffleError;
pub use domain::pair::{PairShuffleProof, PairShuffleStatement, PairShuffleWitness};
pub use domain::simple::SimpleShuffleProof;
pub use domain::transcript::{Transcript, PAIR_SHUFFLE_DOMAIN};
pub use service::{
    hash_verify, shuffle, shuffle_with_rng, shuffle_with_witness, DeferredProver, ShuffleOutput,
};

/// Subsystem identifier used in log prefixes.
pub const SUBSYSTEM_ID: u8 = 1;

/// Result alias for shuffle operations.
pub type Result<T> = std::result::Result<T, ShuffleError>;
