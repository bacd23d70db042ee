//! # Trust Evaluation Subsystem (NT-03)
//!
//! Turns raw behavioural records into updated per-pseudonym trust scores and
//! coarsens the published list so that no score singles out a subject.
//!
//! ## Pipeline
//!
//! | Step | When | Module |
//! |------|------|--------|
//! | classify + update | every consensus round | `domain::classifier`, `domain::update` |
//! | time delay | once per maintenance cycle | `domain::update` |
//! | obfuscation | end of cycle | `domain::obfuscation` |

#![warn(clippy::all)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::TrustConfig;
pub use domain::classifier::{classify, distance, tally, Behaviour, Tally};
pub use domain::models::ReferenceModels;
pub use domain::obfuscation::{choose_d, generalize, worst_case_probability, ObfuscationChoice};
pub use domain::update::{time_factor, updated_score, RoundMarkers};
pub use error::{Result, TrustError};
pub use service::TrustEngine;

/// Subsystem identifier used in log prefixes.
pub const SUBSYSTEM_ID: u8 = 3;
