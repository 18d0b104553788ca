//! Component types, constructor declarations, and activation factories.
//!
//! Component types declare their constructors up front through
//! [`Component::constructors`]: each [`Constructor`] lists the capabilities
//! it needs and a plain function that builds the instance from them. A
//! [`FactoryBuilder`] inspects those declarations once per type and produces an
//! [`ActivationFactory`], which resolves the capabilities and calls the
//! constructor on every [`create`](ActivationFactory::create).

use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use vellum_common::ResourceKey;

use crate::capability::{Capability, CapabilityContext, ErasedCapability};
use crate::error::ActivationError;

/// Something the caller can release when done with an instance.
pub trait Disposable {
    /// Releases resources held by the instance.
    fn dispose(&mut self);
}

/// An activated object handed to the caller.
///
/// The default methods make every hook optional: a page overrides
/// [`set_path`](Self::set_path), a component with injectable properties
/// overrides [`set_property`](Self::set_property), and anything holding
/// resources returns itself from [`as_disposable`](Self::as_disposable).
pub trait Instance: Any + Send {
    /// Records the key of the resource this instance was compiled from.
    fn set_path(&mut self, _path: &ResourceKey) {}

    /// Receives a request-scoped value. Returns `true` if the name was accepted.
    fn set_property(&mut self, _name: &str, _value: &str) -> bool {
        false
    }

    /// Exposes the disposal capability, if the instance has one.
    fn as_disposable(&mut self) -> Option<&mut dyn Disposable> {
        None
    }
}

impl dyn Instance {
    /// Returns `true` if the instance is a `T`.
    pub fn is<T: Instance>(&self) -> bool {
        (self as &dyn Any).is::<T>()
    }

    /// Borrows the instance as a `T`.
    pub fn downcast_ref<T: Instance>(&self) -> Option<&T> {
        (self as &dyn Any).downcast_ref::<T>()
    }

    /// Mutably borrows the instance as a `T`.
    pub fn downcast_mut<T: Instance>(&mut self) -> Option<&mut T> {
        (self as &mut dyn Any).downcast_mut::<T>()
    }
}

/// Downcasts an owned instance, handing it back unchanged on a type mismatch.
pub fn downcast<T: Instance>(instance: Box<dyn Instance>) -> Result<Box<T>, Box<dyn Instance>> {
    if !instance.is::<T>() {
        return Err(instance);
    }
    let any: Box<dyn Any> = instance;
    // The type was checked above.
    Ok(any.downcast::<T>().unwrap_or_else(|_| unreachable!()))
}

/// Ends an instance's lifetime, disposing it if it supports disposal.
///
/// Taking the instance by value means it cannot be released twice.
pub fn release(mut instance: Box<dyn Instance>) {
    if let Some(disposable) = instance.as_disposable() {
        disposable.dispose();
    }
}

/// The resolved parameters handed to a constructor function.
pub struct Arguments {
    type_name: &'static str,
    values: Vec<(Capability, ErasedCapability)>,
}

impl Arguments {
    /// Returns parameter `index` as the capability `T` it was declared as.
    pub fn get<T: ?Sized + Send + Sync + 'static>(
        &self,
        index: usize,
    ) -> Result<Arc<T>, ActivationError> {
        let (capability, value) = self.values.get(index).ok_or_else(|| {
            ActivationError::Configuration {
                type_name: self.type_name,
                reason: format!(
                    "constructor reads parameter {index} but declares {}",
                    self.values.len()
                ),
            }
        })?;
        value
            .downcast_ref::<Arc<T>>()
            .cloned()
            .ok_or_else(|| ActivationError::Configuration {
                type_name: self.type_name,
                reason: format!(
                    "parameter {index} is declared as '{}' but read as '{}'",
                    capability.name(),
                    type_name::<T>()
                ),
            })
    }

    /// Number of resolved parameters.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` for a parameterless constructor.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Builds an instance from resolved arguments.
pub type ConstructFn = fn(&Arguments) -> Result<Box<dyn Instance>, ActivationError>;

/// A declared constructor: its parameters, in order, and its body.
#[derive(Clone)]
pub struct Constructor {
    parameters: Vec<Capability>,
    construct: ConstructFn,
}

impl Constructor {
    /// Declares a constructor taking `parameters`.
    pub fn new(parameters: Vec<Capability>, construct: ConstructFn) -> Self {
        Self {
            parameters,
            construct,
        }
    }

    /// Declares a parameterless constructor.
    pub fn nullary(construct: ConstructFn) -> Self {
        Self::new(Vec::new(), construct)
    }

    /// The declared parameters.
    pub fn parameters(&self) -> &[Capability] {
        &self.parameters
    }
}

impl fmt::Debug for Constructor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Constructor")
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// A type that can be activated by an [`ActivationFactory`].
pub trait Component: Instance + Sized {
    /// The constructors this type offers.
    fn constructors() -> Vec<Constructor>;
}

/// Runtime descriptor of an activatable type, used as the factory cache key.
#[derive(Clone, Copy)]
pub struct ComponentType {
    id: TypeId,
    name: &'static str,
    constructors: fn() -> Vec<Constructor>,
}

impl ComponentType {
    /// The descriptor for `T`.
    pub fn of<T: Component>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            constructors: T::constructors,
        }
    }

    /// Type identity.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Type name, for diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The constructors the type declares.
    pub fn constructors(&self) -> Vec<Constructor> {
        (self.constructors)()
    }
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentType({})", self.name)
    }
}

/// Creates instances of one component type.
///
/// Holds only the selected constructor; every call resolves arguments afresh,
/// so one factory can serve any number of concurrent callers.
#[derive(Debug, Clone)]
pub struct ActivationFactory {
    component: ComponentType,
    constructor: Constructor,
}

impl ActivationFactory {
    /// A factory that always uses `constructor`.
    pub fn new(component: ComponentType, constructor: Constructor) -> Self {
        Self {
            component,
            constructor,
        }
    }

    /// The type this factory produces.
    pub fn component_type(&self) -> ComponentType {
        self.component
    }

    /// Resolves the constructor's parameters from `capabilities` and builds a
    /// new instance.
    pub fn create(
        &self,
        capabilities: &dyn CapabilityContext,
    ) -> Result<Box<dyn Instance>, ActivationError> {
        let values = self
            .constructor
            .parameters
            .iter()
            .map(|capability| {
                capabilities
                    .resolve_raw(capability.id())
                    .map(|value| (*capability, value))
                    .ok_or(ActivationError::MissingCapability {
                        type_name: self.component.name,
                        capability: capability.name(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let arguments = Arguments {
            type_name: self.component.name,
            values,
        };
        (self.constructor.construct)(&arguments)
    }
}

/// Produces the activation factory for a component type.
///
/// Builders may run more than once for the same type when callers race, so
/// they must be free of side effects.
pub trait FactoryBuilder: Send + Sync {
    /// Selects a constructor for `component` and wraps it in a factory.
    fn build(&self, component: &ComponentType) -> Result<ActivationFactory, ActivationError>;
}

impl<F> FactoryBuilder for F
where
    F: Fn(&ComponentType) -> Result<ActivationFactory, ActivationError> + Send + Sync,
{
    fn build(&self, component: &ComponentType) -> Result<ActivationFactory, ActivationError> {
        self(component)
    }
}

/// Selects the constructor with the most parameters.
///
/// A type with no constructors, or with two or more constructors sharing the
/// greatest parameter count, cannot be activated.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFactoryBuilder;

impl FactoryBuilder for DefaultFactoryBuilder {
    fn build(&self, component: &ComponentType) -> Result<ActivationFactory, ActivationError> {
        let constructors = component.constructors();
        let Some(widest) = constructors.iter().map(|c| c.parameters.len()).max() else {
            return Err(ActivationError::Configuration {
                type_name: component.name,
                reason: "no constructors declared".to_string(),
            });
        };

        let mut candidates = constructors
            .into_iter()
            .filter(|c| c.parameters.len() == widest);
        let selected = candidates.next().ok_or_else(|| ActivationError::Configuration {
            type_name: component.name,
            reason: "no constructor selected".to_string(),
        })?;
        if candidates.next().is_some() {
            return Err(ActivationError::Configuration {
                type_name: component.name,
                reason: format!("multiple constructors take {widest} parameters"),
            });
        }

        debug!(
            component = component.name,
            parameters = widest,
            "selected constructor"
        );
        Ok(ActivationFactory::new(*component, selected))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Clock(u64);

    struct Greeting {
        clock: Arc<Clock>,
        path: Option<ResourceKey>,
    }

    impl Instance for Greeting {
        fn set_path(&mut self, path: &ResourceKey) {
            self.path = Some(path.clone());
        }
    }

    impl Component for Greeting {
        fn constructors() -> Vec<Constructor> {
            vec![Constructor::new(vec![Capability::of::<Clock>()], |args| {
                Ok(Box::new(Greeting {
                    clock: args.get::<Clock>(0)?,
                    path: None,
                }))
            })]
        }
    }

    struct Ambiguous;

    impl Instance for Ambiguous {}

    impl Component for Ambiguous {
        fn constructors() -> Vec<Constructor> {
            vec![
                Constructor::new(vec![Capability::of::<Clock>()], |_| Ok(Box::new(Ambiguous))),
                Constructor::new(vec![Capability::of::<String>()], |_| Ok(Box::new(Ambiguous))),
            ]
        }
    }

    struct Abstract;

    impl Instance for Abstract {}

    impl Component for Abstract {
        fn constructors() -> Vec<Constructor> {
            Vec::new()
        }
    }

    struct Widest;

    impl Instance for Widest {}

    impl Component for Widest {
        fn constructors() -> Vec<Constructor> {
            vec![
                Constructor::nullary(|_| Ok(Box::new(Widest))),
                Constructor::new(
                    vec![Capability::of::<Clock>(), Capability::of::<String>()],
                    |args| {
                        assert_eq!(args.len(), 2);
                        Ok(Box::new(Widest))
                    },
                ),
            ]
        }
    }

    static DISPOSED: AtomicUsize = AtomicUsize::new(0);

    struct Connection;

    impl Disposable for Connection {
        fn dispose(&mut self) {
            DISPOSED.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Instance for Connection {
        fn as_disposable(&mut self) -> Option<&mut dyn Disposable> {
            Some(self)
        }
    }

    fn clock_context() -> CapabilityMap {
        let mut map = CapabilityMap::new();
        map.insert(Arc::new(Clock(1234)));
        map
    }

    #[test]
    fn factory_creates_distinct_instances() {
        let factory = DefaultFactoryBuilder
            .build(&ComponentType::of::<Greeting>())
            .unwrap();
        let ctx = clock_context();

        let mut first = factory.create(&ctx).unwrap();
        let second = factory.create(&ctx).unwrap();
        assert!(first.is::<Greeting>());
        assert!(second.is::<Greeting>());

        first.set_path(&ResourceKey::new("/Views/Index.cshtml"));
        let first = first.downcast_ref::<Greeting>().unwrap();
        let second = second.downcast_ref::<Greeting>().unwrap();
        assert!(!std::ptr::eq(first, second));
        assert_eq!(first.clock.0, 1234);
        assert!(Arc::ptr_eq(&first.clock, &second.clock));
        assert_eq!(first.path.as_ref().unwrap().as_str(), "/Views/Index.cshtml");
        assert!(second.path.is_none());
    }

    #[test]
    fn missing_capability_is_reported_by_create() {
        let factory = DefaultFactoryBuilder
            .build(&ComponentType::of::<Greeting>())
            .unwrap();
        let err = factory.create(&CapabilityMap::new()).err().unwrap();
        assert!(matches!(
            err,
            ActivationError::MissingCapability { capability, .. } if capability.contains("Clock")
        ));
    }

    #[test]
    fn no_constructors_is_configuration_error() {
        let err = DefaultFactoryBuilder
            .build(&ComponentType::of::<Abstract>())
            .unwrap_err();
        assert!(matches!(err, ActivationError::Configuration { .. }));
    }

    #[test]
    fn tied_constructors_are_configuration_error() {
        let err = DefaultFactoryBuilder
            .build(&ComponentType::of::<Ambiguous>())
            .unwrap_err();
        assert!(err.to_string().contains("multiple constructors"));
    }

    #[test]
    fn widest_constructor_wins() {
        let factory = DefaultFactoryBuilder
            .build(&ComponentType::of::<Widest>())
            .unwrap();
        let mut ctx = clock_context();
        ctx.insert(Arc::new("tenant".to_string()));
        assert!(factory.create(&ctx).unwrap().is::<Widest>());
    }

    #[test]
    fn argument_type_mismatch_is_configuration_error() {
        let arguments = Arguments {
            type_name: "test",
            values: vec![(Capability::of::<Clock>(), Arc::new(Arc::new(Clock(1))) as ErasedCapability)],
        };
        assert!(arguments.get::<Clock>(0).is_ok());
        assert!(matches!(
            arguments.get::<String>(0),
            Err(ActivationError::Configuration { .. })
        ));
        assert!(arguments.get::<Clock>(1).is_err());
    }

    #[test]
    fn downcast_owned() {
        let boxed: Box<dyn Instance> = Box::new(Abstract);
        let boxed = downcast::<Widest>(boxed).err().unwrap();
        assert!(downcast::<Abstract>(boxed).is_ok());
    }

    #[test]
    fn release_disposes_once() {
        let before = DISPOSED.load(Ordering::SeqCst);
        release(Box::new(Connection));
        release(Box::new(Abstract));
        assert_eq!(DISPOSED.load(Ordering::SeqCst), before + 1);
    }

    #[test]
    fn component_type_identity() {
        assert_eq!(ComponentType::of::<Greeting>(), ComponentType::of::<Greeting>());
        assert_ne!(ComponentType::of::<Greeting>(), ComponentType::of::<Widest>());
        assert!(format!("{:?}", ComponentType::of::<Greeting>()).contains("Greeting"));
    }
}
