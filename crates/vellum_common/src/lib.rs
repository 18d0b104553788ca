//! Shared foundational types used across the vellum view-caching crates.
//!
//! This crate provides the ordinal [`ResourceKey`] that names every cacheable
//! source resource and the [`ContentHash`] used to fingerprint source text.

#![warn(missing_docs)]

pub mod hash;
pub mod key;

pub use hash::ContentHash;
pub use key::ResourceKey;
