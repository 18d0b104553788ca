//! Capability resolution for constructor parameters.

use std::any::{type_name, Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Identity of a capability a constructor can ask for.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Capability {
    id: TypeId,
    name: &'static str,
}

impl Capability {
    /// The capability for values of type `T`, which may be a trait object.
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// The type identity of the capability.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human-readable type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Capability({})", self.name)
    }
}

/// A type-erased capability: an `Arc<T>` boxed as `Any`.
pub type ErasedCapability = Arc<dyn Any + Send + Sync>;

/// Resolves constructor parameters by type.
///
/// Implementations return the value registered for `T` as an erased `Arc<T>`;
/// callers normally use the typed `resolve` on `dyn CapabilityContext`.
pub trait CapabilityContext: Send + Sync {
    /// Returns the erased `Arc<T>` registered for the type with id `id`.
    fn resolve_raw(&self, id: TypeId) -> Option<ErasedCapability>;
}

impl dyn CapabilityContext + '_ {
    /// Resolves the capability registered for `T`.
    pub fn resolve<T: ?Sized + Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.resolve_raw(TypeId::of::<T>())?
            .downcast_ref::<Arc<T>>()
            .cloned()
    }
}

/// A fixed set of capabilities keyed by type.
///
/// ```
/// use std::sync::Arc;
/// use vellum_cache::{CapabilityContext, CapabilityMap};
///
/// trait Clock: Send + Sync { fn now(&self) -> u64; }
/// struct Fixed;
/// impl Clock for Fixed { fn now(&self) -> u64 { 7 } }
///
/// let mut map = CapabilityMap::new();
/// map.insert::<dyn Clock>(Arc::new(Fixed));
/// let ctx: &dyn CapabilityContext = &map;
/// assert_eq!(ctx.resolve::<dyn Clock>().unwrap().now(), 7);
/// ```
#[derive(Default)]
pub struct CapabilityMap {
    values: HashMap<TypeId, ErasedCapability>,
}

impl CapabilityMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `value` as the capability for `T`, replacing any previous one.
    pub fn insert<T: ?Sized + Send + Sync + 'static>(&mut self, value: Arc<T>) -> &mut Self {
        self.values.insert(TypeId::of::<T>(), Arc::new(value));
        self
    }

    /// Returns `true` if a capability is registered for `T`.
    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }
}

impl CapabilityContext for CapabilityMap {
    fn resolve_raw(&self, id: TypeId) -> Option<ErasedCapability> {
        self.values.get(&id).cloned()
    }
}
