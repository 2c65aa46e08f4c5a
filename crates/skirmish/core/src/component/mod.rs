//! Component container and priority-ordered event dispatch.
//!
//! Every behavior in the core is an [`EntityComponent`] attached to a
//! [`ComponentContainer`]. Actors and actions both own a container; effect
//! handlers, stat pools, queue policies and chain links are all components.
//!
//! # Declarations
//!
//! Components declare their metadata through trait methods instead of runtime
//! reflection:
//!
//! - [`priority`](EntityComponent::priority): lower values are invoked first
//! - [`capabilities`](EntityComponent::capabilities): which dispatches reach the component
//! - [`requires`](EntityComponent::requires): components auto-attached when missing
//!
//! # Dispatch
//!
//! Dispatch works on a snapshot ([`Dispatch`]) taken from the container, so a
//! handler may attach or remove components without invalidating the iteration
//! it is part of. A handler that is already running (reentrant dispatch) is
//! skipped instead of being borrowed twice.

mod container;
mod context;
mod dispatch;
mod error;
mod event;

pub use container::{ComponentCell, ComponentContainer, InitScope};
pub use context::EffectContext;
pub use dispatch::{Dispatch, DispatchEntry};
pub use error::{ComponentError, HandlerError};
pub use event::{ComponentEvent, EventKind};

use core::any::{Any, TypeId};

use bitflags::bitflags;

bitflags! {
    /// Roles a component plays in dispatch.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// Receives events sent to its container (queue notifications, damage, ...).
        const LISTENER = 1 << 0;
        /// Effect handler gathered by the pairwise resolver's component phase.
        const EFFECT = 1 << 1;
    }
}

/// Object-safe access to `Any` for component trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A unit of behavior attached to exactly one container.
///
/// A container holds at most one instance per concrete component type.
pub trait EntityComponent: AsAny {
    /// Human-readable name used in logs and reports.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Dispatch priority. Lower values are invoked first.
    fn priority(&self) -> i32 {
        0
    }

    /// Which dispatches reach this component.
    fn capabilities(&self) -> Capabilities {
        Capabilities::LISTENER
    }

    /// Components that must be present; missing ones are built and attached first.
    fn requires(&self) -> Vec<Requirement> {
        Vec::new()
    }

    /// Called right after the component is attached (unless the container is tearing down).
    fn initialize(&mut self, _scope: &InitScope<'_>) {}

    /// Called when the component is detached or its container is disposed.
    fn dispose(&mut self) {}

    /// Handles a dispatched event.
    fn on_event(
        &mut self,
        _event: &mut ComponentEvent,
        _ctx: &mut EffectContext<'_>,
    ) -> Result<(), HandlerError> {
        Ok(())
    }
}

impl dyn EntityComponent {
    /// Returns true if the concrete type is `T`.
    pub fn is<T: EntityComponent>(&self) -> bool {
        self.as_any().is::<T>()
    }

    pub fn downcast_ref<T: EntityComponent>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }

    pub fn downcast_mut<T: EntityComponent>(&mut self) -> Option<&mut T> {
        self.as_any_mut().downcast_mut::<T>()
    }
}

type BuildFn = Box<dyn Fn() -> Result<ComponentCell, String>>;

/// A required component type together with the recipe to build a default instance.
pub struct Requirement {
    type_id: TypeId,
    name: &'static str,
    build: BuildFn,
}

impl Requirement {
    /// Requires `T`, building it with `T::default()` when missing.
    pub fn of<T: EntityComponent + Default>() -> Self {
        Self::with(|| Ok(T::default()))
    }

    /// Requires `T`, building it with a fallible constructor when missing.
    pub fn with<T: EntityComponent>(build: fn() -> Result<T, String>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name: core::any::type_name::<T>(),
            build: Box::new(move || {
                build().map(|component| container::new_cell(component))
            }),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn build(&self) -> Result<ComponentCell, String> {
        (self.build)()
    }
}

impl core::fmt::Debug for Requirement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Requirement").field("name", &self.name).finish()
    }
}
