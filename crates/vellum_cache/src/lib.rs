//! Compiled-view caching and instance activation.
//!
//! Two caches sit between a request for a page and the instance that serves
//! it. The [`ArtifactCache`] memoizes compiled output per source resource and
//! drops an entry only when the resource's change trigger fires; absence is
//! memoized too, so probing for optional files stays cheap. The
//! [`ActivationFactoryCache`] memoizes, per component type, the factory that
//! knows which constructor to call. [`PageFactory`] and [`ComponentFactory`]
//! chain the two and hand back ready-to-use instances.
//!
//! All state lives in a [`CacheServices`] value that callers share behind an
//! `Arc`; nothing is global.

#![warn(missing_docs)]

pub mod activation;
pub mod artifact;
pub mod capability;
pub mod compile;
pub mod component;
pub mod error;
pub mod factory;
pub mod page;
pub mod services;

pub use activation::{
    downcast, release, ActivationFactory, Arguments, Component, ComponentType, ConstructFn,
    Constructor, DefaultFactoryBuilder, Disposable, FactoryBuilder, Instance,
};
pub use artifact::ArtifactCache;
pub use capability::{Capability, CapabilityContext, CapabilityMap, ErasedCapability};
pub use compile::{CompiledArtifact, Compiler};
pub use component::{
    ActionContext, ActionDescriptor, ActivationContext, ActivationHook, ComponentFactory, NoopHook,
    PropertyInjector,
};
pub use error::{ActivationError, CompilationError};
pub use factory::ActivationFactoryCache;
pub use page::PageFactory;
pub use services::CacheServices;
