//! Shared test utilities for the Foundry World Tools workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each build their own data root. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`data_root`]: [`TestDataRoot`] builder: application layout, projects,
//!   assets and record stores in a temporary directory

pub mod data_root;

pub use data_root::TestDataRoot;
