//! Shared type definitions for the Cursus simulation.
//!
//! This crate holds the plain value types that flow between the core engine
//! and the reporting binary. Nothing here carries behavior beyond simple
//! classification and arithmetic on its own fields.
//!
//! # Modules
//!
//! - [`tier`] -- The four office tiers of the cursus honorum
//! - [`individual`] -- A single officeholder, reduced to an age
//! - [`band`] -- Half-open age bands used for counting and classification
//! - [`distribution`] -- Post-run summaries (age distribution, fill rates)

pub mod band;
pub mod distribution;
pub mod individual;
pub mod tier;

// Re-export all public types at crate root for convenience.
pub use band::AgeBand;
pub use distribution::{AgeDistribution, FillRate, TierSummary};
pub use individual::Individual;
pub use tier::Tier;
