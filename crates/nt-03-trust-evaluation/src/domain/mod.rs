//! # Domain Layer
//!
//! Scoring math only. Model files are read once by [`models::ReferenceModels::load`].

pub mod classifier;
pub mod models;
pub mod obfuscation;
pub mod update;
