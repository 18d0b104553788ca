//! Resource lookup and change notification for cached view sources.
//!
//! A [`FileProvider`] answers two questions for a [`ResourceKey`]: does the
//! resource exist right now ([`FileInfo`]), and has it changed since a given
//! moment ([`ChangeTrigger`]). [`InMemoryFileProvider`] serves embedded or
//! test sources; [`PhysicalFileProvider`] serves a directory tree and expires
//! triggers from filesystem notifications.
//!
//! [`ResourceKey`]: vellum_common::ResourceKey

#![warn(missing_docs)]

pub mod error;
pub mod file_info;
pub mod hierarchy;
pub mod memory;
pub mod physical;
pub mod provider;
pub mod trigger;

pub use error::SourceError;
pub use file_info::FileInfo;
pub use hierarchy::inherited_locations;
pub use memory::InMemoryFileProvider;
pub use physical::PhysicalFileProvider;
pub use provider::FileProvider;
pub use trigger::{ChangeTrigger, ManualTrigger, NeverExpires, TriggerRegistry};
