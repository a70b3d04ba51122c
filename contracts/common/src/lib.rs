//! FundMe Common Library
//!
//! Shared types, constants, and utilities for the FundMe ledger and its
//! price feed.
//!
//! ## Units
//!
//! - **Native amounts** are wei-like base units with 18 decimals (`u128`).
//! - **Reference values** are USD with 18 decimals (`u128`).
//! - **Oracle prices** carry whatever precision the feed declares
//!   (8 decimals for the mock aggregator).
//!
//! All conversions are checked integer arithmetic; floating point is never
//! used for value.
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export collections for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::{collections::BTreeMap, vec::Vec};
#[cfg(feature = "std")]
pub use std::{collections::BTreeMap, vec::Vec};

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod events;
pub mod oracle;
pub mod access_control;
pub mod network;

// Re-exports for convenience
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use oracle::*;
pub use access_control::*;
pub use network::*;
