//! Per-type memoization of activation factories.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::activation::{ActivationFactory, ComponentType, FactoryBuilder};
use crate::error::ActivationError;

/// Maps each component type to the one factory retained for it.
///
/// Entries are never invalidated: a type's constructors cannot change while
/// the process runs. Two callers missing on the same type may both run the
/// builder, but only the first insert is kept and every caller gets that one.
/// A failed build is returned and not recorded.
#[derive(Default)]
pub struct ActivationFactoryCache {
    factories: DashMap<TypeId, Arc<ActivationFactory>>,
}

impl ActivationFactoryCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the factory for `component`, building it with `builder` on the
    /// first request.
    pub fn get_or_add<B>(
        &self,
        component: &ComponentType,
        builder: &B,
    ) -> Result<Arc<ActivationFactory>, ActivationError>
    where
        B: FactoryBuilder + ?Sized,
    {
        if let Some(factory) = self.factories.get(&component.id()) {
            trace!(component = component.name(), "factory cache hit");
            return Ok(Arc::clone(factory.value()));
        }

        let built = Arc::new(builder.build(component)?);
        let retained = Arc::clone(
            self.factories
                .entry(component.id())
                .or_insert_with(|| Arc::clone(&built))
                .value(),
        );
        if Arc::ptr_eq(&built, &retained) {
            debug!(component = component.name(), "built activation factory");
        } else {
            debug!(component = component.name(), "discarded factory built concurrently");
        }
        Ok(retained)
    }

    /// Number of types with a retained factory.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if no factory has been built.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Drops every retained factory.
    pub fn clear(&self) {
        self.factories.clear();
    }
}
