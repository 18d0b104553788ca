//! Activation hooks and the component orchestrator.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};
use vellum_common::ResourceKey;

use crate::activation::{self, ComponentType, DefaultFactoryBuilder, FactoryBuilder, Instance};
use crate::capability::CapabilityContext;
use crate::error::ActivationError;
use crate::services::CacheServices;

/// Describes the action an invocation targets.
#[derive(Debug, Clone)]
pub enum ActionDescriptor {
    /// An action implemented by a component type, activated per request.
    Component {
        /// Action name, for diagnostics.
        name: String,
        /// The type to activate.
        component_type: ComponentType,
    },
    /// An action implemented by a plain function; nothing to activate.
    Delegate {
        /// Action name, for diagnostics.
        name: String,
    },
}

impl ActionDescriptor {
    /// The action name.
    pub fn name(&self) -> &str {
        match self {
            Self::Component { name, .. } | Self::Delegate { name } => name,
        }
    }
}

/// A single action invocation: its descriptor and request-scoped values.
#[derive(Debug, Clone)]
pub struct ActionContext {
    /// What is being invoked.
    pub descriptor: ActionDescriptor,
    /// Values offered to the activated instance as properties.
    pub values: BTreeMap<String, String>,
}

impl ActionContext {
    /// A context with no values.
    pub fn new(descriptor: ActionDescriptor) -> Self {
        Self {
            descriptor,
            values: BTreeMap::new(),
        }
    }

    /// Adds a value, replacing one with the same name.
    pub fn with_value(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

/// What an instance is being activated for.
#[derive(Debug, Clone, Copy)]
pub enum ActivationContext<'a> {
    /// A page compiled from the resource at `path`.
    Page {
        /// The normalized key of the page.
        path: &'a ResourceKey,
    },
    /// A component serving an action.
    Action(&'a ActionContext),
}

/// Runs after construction and before the instance is returned.
pub trait ActivationHook: Send + Sync {
    /// Prepares `instance` for use in `context`.
    fn activate(&self, instance: &mut dyn Instance, context: &ActivationContext<'_>);
}

impl<F> ActivationHook for F
where
    F: Fn(&mut dyn Instance, &ActivationContext<'_>) + Send + Sync,
{
    fn activate(&self, instance: &mut dyn Instance, context: &ActivationContext<'_>) {
        self(instance, context)
    }
}

/// A hook that does nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl ActivationHook for NoopHook {
    fn activate(&self, _instance: &mut dyn Instance, _context: &ActivationContext<'_>) {}
}

/// Offers every action value to the instance through
/// [`Instance::set_property`]. Pages are left untouched.
#[derive(Debug, Default, Clone, Copy)]
pub struct PropertyInjector;

impl ActivationHook for PropertyInjector {
    fn activate(&self, instance: &mut dyn Instance, context: &ActivationContext<'_>) {
        let ActivationContext::Action(action) = context else {
            return;
        };
        for (name, value) in &action.values {
            if !instance.set_property(name, value) {
                debug!(action = action.descriptor.name(), property = %name, "property not accepted");
            }
        }
    }
}

/// Creates and releases component instances for actions.
pub struct ComponentFactory {
    services: Arc<CacheServices>,
    capabilities: Arc<dyn CapabilityContext>,
    builder: Arc<dyn FactoryBuilder>,
    hook: Arc<dyn ActivationHook>,
}

impl ComponentFactory {
    /// Creates a factory using [`DefaultFactoryBuilder`] and
    /// [`PropertyInjector`].
    pub fn new(services: Arc<CacheServices>, capabilities: Arc<dyn CapabilityContext>) -> Self {
        Self {
            services,
            capabilities,
            builder: Arc::new(DefaultFactoryBuilder),
            hook: Arc::new(PropertyInjector),
        }
    }

    /// Replaces the constructor selection strategy.
    pub fn with_builder(mut self, builder: Arc<dyn FactoryBuilder>) -> Self {
        self.builder = builder;
        self
    }

    /// Replaces the activation hook.
    pub fn with_hook(mut self, hook: Arc<dyn ActivationHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Activates the component behind `action`.
    pub fn create(&self, action: &ActionContext) -> Result<Box<dyn Instance>, ActivationError> {
        let ActionDescriptor::Component { component_type, .. } = &action.descriptor else {
            warn!(action = action.descriptor.name(), "action is not backed by a component");
            return Err(ActivationError::Argument {
                argument: "action",
                reason: format!(
                    "action '{}' is not backed by a component type",
                    action.descriptor.name()
                ),
            });
        };

        let factory = self
            .services
            .factories()
            .get_or_add(component_type, self.builder.as_ref())?;
        let mut instance = factory.create(self.capabilities.as_ref())?;
        self.hook
            .activate(instance.as_mut(), &ActivationContext::Action(action));
        Ok(instance)
    }

    /// Releases an instance returned by [`create`](Self::create).
    pub fn release(&self, instance: Box<dyn Instance>) {
        activation::release(instance);
    }
}
