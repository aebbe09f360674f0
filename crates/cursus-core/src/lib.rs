//! Population evolution and stability scoring for the Cursus simulation.
//!
//! This crate owns the yearly tick cycle that drives a run: recruit, shuffle,
//! age, cull, then score the surviving officeholders against each tier's
//! quota.
//!
//! # Modules
//!
//! - [`clock`] -- Year counter with a fixed horizon.
//! - [`config`] -- Configuration loading from `cursus-config.yaml` into
//!   strongly-typed structs.
//! - [`random`] -- [`RandomSource`] trait, [`SeededRandomSource`] and a
//!   scripted source for tests.
//! - [`population`] -- The officeholder collection and its transitions.
//! - [`scoring`] -- Vacancy and consecutive reelection rules.
//! - [`tick`] -- The per-year tick cycle.
//! - [`runner`] -- Run orchestration and the tick callback seam.
//! - [`report`] -- Age distribution and fill rate aggregates.
//!
//! [`RandomSource`]: random::RandomSource
//! [`SeededRandomSource`]: random::SeededRandomSource

pub mod clock;
pub mod config;
pub mod population;
pub mod random;
pub mod report;
pub mod runner;
pub mod scoring;
pub mod tick;
