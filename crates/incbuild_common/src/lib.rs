//! Shared foundational types used across the incbuild workspace.
//!
//! This crate provides the content hash and detection policy used for change
//! detection, and the object modification marker recorded for every compiled
//! source.

#![warn(missing_docs)]

pub mod hash;
pub mod marker;
pub mod policy;

pub use hash::{ContentHash, ParseHashError};
pub use marker::ObjectMarker;
pub use policy::DetectionPolicy;
