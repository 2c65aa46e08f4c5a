use core::any::TypeId;
use std::cell::{Cell, Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::{debug, trace, warn};

use crate::ids::Owner;

use super::{Capabilities, ComponentError, Dispatch, DispatchEntry, EntityComponent};

/// Shared handle to an attached component.
///
/// The container keeps one handle; dispatch snapshots clone it so that the
/// component stays alive for the duration of a dispatch even if it is removed
/// mid-way.
pub type ComponentCell = Rc<RefCell<dyn EntityComponent>>;

pub(crate) fn new_cell<T: EntityComponent>(component: T) -> ComponentCell {
    Rc::new(RefCell::new(component))
}

struct Slot {
    type_id: TypeId,
    name: &'static str,
    seq: u64,
    priority: i32,
    capabilities: Capabilities,
    requires: Vec<TypeId>,
    enabled: Cell<bool>,
    cell: ComponentCell,
}

/// What a component sees while it is being initialized.
pub struct InitScope<'c> {
    owner: Owner,
    container: &'c ComponentContainer,
}

impl<'c> InitScope<'c> {
    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Sibling lookup. Returns `None` for the component being initialized.
    pub fn get<T: EntityComponent>(&self) -> Option<Ref<'c, T>> {
        self.container.get::<T>()
    }

    pub fn get_mut<T: EntityComponent>(&self) -> Option<RefMut<'c, T>> {
        self.container.get_mut::<T>()
    }
}

/// Bag of components keyed by concrete type.
pub struct ComponentContainer {
    owner: Owner,
    slots: Vec<Slot>,
    next_seq: u64,
    disposing: bool,
}

impl core::fmt::Debug for ComponentContainer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComponentContainer")
            .field("owner", &self.owner)
            .field("components", &self.names())
            .finish()
    }
}

impl ComponentContainer {
    pub fn new(owner: Owner) -> Self {
        Self {
            owner,
            slots: Vec::new(),
            next_seq: 0,
            disposing: false,
        }
    }

    pub fn owner(&self) -> Owner {
        self.owner
    }

    /// Attaches `component`, replacing any instance of the same type.
    ///
    /// Missing requirements are built and attached first, recursively. If any
    /// requirement fails, every requirement this call already attached is
    /// detached and disposed again, leaving the container as it was.
    pub fn attach<T: EntityComponent>(&mut self, component: T) -> Result<(), ComponentError> {
        self.attach_cell(TypeId::of::<T>(), new_cell(component))
    }

    fn attach_cell(&mut self, type_id: TypeId, cell: ComponentCell) -> Result<(), ComponentError> {
        let mut resolving = vec![type_id];
        let before = self.slots.len();
        let result = self.insert(type_id, cell, &mut resolving);
        if result.is_err() && self.slots.len() > before {
            let attached = self.slots.split_off(before);
            debug!(
                owner = %self.owner,
                rolled_back = attached.len(),
                "attach failed, requirements rolled back"
            );
            attached.iter().rev().for_each(dispose_cell);
        }
        result
    }

    fn insert(
        &mut self,
        type_id: TypeId,
        cell: ComponentCell,
        resolving: &mut Vec<TypeId>,
    ) -> Result<(), ComponentError> {
        let (name, priority, capabilities, requirements) = {
            let component = cell.borrow();
            (
                component.name(),
                component.priority(),
                component.capabilities(),
                component.requires(),
            )
        };

        for requirement in &requirements {
            if self.position(requirement.type_id()).is_some() {
                continue;
            }
            if resolving.contains(&requirement.type_id()) {
                return Err(ComponentError::RequirementCycle {
                    component: name,
                    required: requirement.name(),
                });
            }
            let dependency = requirement
                .build()
                .map_err(|reason| ComponentError::RequirementFailed {
                    component: name,
                    required: requirement.name(),
                    reason,
                })?;
            trace!(
                owner = %self.owner,
                component = name,
                required = requirement.name(),
                "auto-attaching requirement"
            );
            resolving.push(requirement.type_id());
            self.insert(requirement.type_id(), dependency, resolving)?;
            resolving.pop();
        }

        if let Some(index) = self.position(type_id) {
            let old = self.slots.remove(index);
            debug!(owner = %self.owner, component = old.name, "replacing component");
            dispose_cell(&old);
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.slots.push(Slot {
            type_id,
            name,
            seq,
            priority,
            capabilities,
            requires: requirements.iter().map(|r| r.type_id()).collect(),
            enabled: Cell::new(true),
            cell: cell.clone(),
        });

        if !self.disposing {
            let scope = InitScope {
                owner: self.owner,
                container: self,
            };
            cell.borrow_mut().initialize(&scope);
        }
        Ok(())
    }

    /// Detaches and disposes the component of type `T`.
    ///
    /// Refused while another component declares `T` as a requirement.
    /// Returns `Ok(false)` if no such component is attached.
    pub fn remove<T: EntityComponent>(&mut self) -> Result<bool, ComponentError> {
        let type_id = TypeId::of::<T>();
        let Some(index) = self.position(type_id) else {
            return Ok(false);
        };
        if let Some(dependent) = self
            .slots
            .iter()
            .find(|slot| slot.type_id != type_id && slot.requires.contains(&type_id))
        {
            return Err(ComponentError::RequiredBy {
                component: self.slots[index].name,
                dependent: dependent.name,
            });
        }
        let slot = self.slots.remove(index);
        dispose_cell(&slot);
        Ok(true)
    }

    /// Disposes every component, newest first, and empties the container.
    pub fn dispose(&mut self) {
        self.disposing = true;
        while let Some(slot) = self.slots.pop() {
            dispose_cell(&slot);
        }
        self.disposing = false;
    }

    /// Borrows the component of type `T`.
    ///
    /// `None` when absent or currently borrowed mutably (i.e. it is the one
    /// running).
    pub fn get<T: EntityComponent>(&self) -> Option<Ref<'_, T>> {
        let slot = self.slot(TypeId::of::<T>())?;
        let component = slot.cell.try_borrow().ok()?;
        Ref::filter_map(component, |c| c.downcast_ref::<T>()).ok()
    }

    pub fn get_mut<T: EntityComponent>(&self) -> Option<RefMut<'_, T>> {
        let slot = self.slot(TypeId::of::<T>())?;
        let component = slot.cell.try_borrow_mut().ok()?;
        RefMut::filter_map(component, |c| c.downcast_mut::<T>())
            .ok()
    }

    /// Shared handle to the component of type `T`.
    pub fn cell<T: EntityComponent>(&self) -> Option<ComponentCell> {
        self.slot(TypeId::of::<T>()).map(|slot| slot.cell.clone())
    }

    pub fn has<T: EntityComponent>(&self) -> bool {
        self.position(TypeId::of::<T>()).is_some()
    }

    /// First component (in attach order) that has every capability in `capabilities`.
    pub fn find_capable(&self, capabilities: Capabilities) -> Option<ComponentCell> {
        self.slots
            .iter()
            .find(|slot| slot.capabilities.contains(capabilities))
            .map(|slot| slot.cell.clone())
    }

    pub fn has_capability(&self, capabilities: Capabilities) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.capabilities.contains(capabilities))
    }

    /// Enables or disables the component of type `T`. Returns false if absent.
    pub fn set_enabled<T: EntityComponent>(&self, enabled: bool) -> bool {
        match self.slot(TypeId::of::<T>()) {
            Some(slot) => {
                slot.enabled.set(enabled);
                true
            }
            None => false,
        }
    }

    pub fn is_enabled<T: EntityComponent>(&self) -> bool {
        self.slot(TypeId::of::<T>())
            .is_some_and(|slot| slot.enabled.get())
    }

    /// Snapshot of enabled components with `capabilities`, ordered by `(priority, seq)`.
    pub fn dispatch_list(&self, capabilities: Capabilities) -> Dispatch {
        self.snapshot(|slot| slot.capabilities.contains(capabilities))
    }

    /// Like [`dispatch_list`](Self::dispatch_list) restricted to the listener of type `T`.
    pub fn dispatch_list_of<T: EntityComponent>(&self) -> Dispatch {
        let type_id = TypeId::of::<T>();
        self.snapshot(|slot| {
            slot.type_id == type_id && slot.capabilities.contains(Capabilities::LISTENER)
        })
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.slots.iter().map(|slot| slot.name).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn snapshot(&self, filter: impl Fn(&Slot) -> bool) -> Dispatch {
        let mut entries: Vec<DispatchEntry> = self
            .slots
            .iter()
            .filter(|slot| slot.enabled.get() && filter(slot))
            .map(|slot| DispatchEntry::new(slot.priority, slot.seq, slot.name, slot.cell.clone()))
            .collect();
        entries.sort_by_key(|entry| (entry.priority(), entry.seq()));
        Dispatch::new(entries)
    }

    fn slot(&self, type_id: TypeId) -> Option<&Slot> {
        self.slots.iter().find(|slot| slot.type_id == type_id)
    }

    fn position(&self, type_id: TypeId) -> Option<usize> {
        self.slots.iter().position(|slot| slot.type_id == type_id)
    }
}

fn dispose_cell(slot: &Slot) {
    match slot.cell.try_borrow_mut() {
        Ok(mut component) => component.dispose(),
        Err(_) => warn!(component = slot.name, "component busy during dispose, skipped"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Requirement;

    #[derive(Default)]
    struct Pool {
        amount: i32,
        disposed: bool,
    }

    impl EntityComponent for Pool {
        fn dispose(&mut self) {
            self.disposed = true;
        }
    }

    #[derive(Default)]
    struct Gauge {
        saw_pool: bool,
        owner: Option<Owner>,
    }

    impl EntityComponent for Gauge {
        fn requires(&self) -> Vec<Requirement> {
            vec![Requirement::of::<Pool>()]
        }

        fn initialize(&mut self, scope: &InitScope<'_>) {
            self.saw_pool = scope.get::<Pool>().is_some();
            self.owner = Some(scope.owner());
        }
    }

    struct Broken;

    impl EntityComponent for Broken {
        fn requires(&self) -> Vec<Requirement> {
            vec![Requirement::with::<Pool>(|| Err("no pool template".into()))]
        }
    }

    struct Partial;

    impl EntityComponent for Partial {
        fn requires(&self) -> Vec<Requirement> {
            vec![
                Requirement::of::<Pool>(),
                Requirement::with::<Tie>(|| Err("no tie template".into())),
            ]
        }
    }

    #[derive(Default)]
    struct Ping;

    impl EntityComponent for Ping {
        fn requires(&self) -> Vec<Requirement> {
            vec![Requirement::of::<Pong>()]
        }
    }

    #[derive(Default)]
    struct Pong;

    impl EntityComponent for Pong {
        fn requires(&self) -> Vec<Requirement> {
            vec![Requirement::of::<Ping>()]
        }
    }

    struct Ranked(i32);

    impl EntityComponent for Ranked {
        fn name(&self) -> &'static str {
            "ranked"
        }

        fn priority(&self) -> i32 {
            self.0
        }
    }

    struct Early;

    impl EntityComponent for Early {
        fn name(&self) -> &'static str {
            "early"
        }

        fn priority(&self) -> i32 {
            -5
        }
    }

    struct Tie;

    impl EntityComponent for Tie {
        fn name(&self) -> &'static str {
            "tie"
        }

        fn priority(&self) -> i32 {
            3
        }
    }

    struct Tracked(Rc<RefCell<Vec<&'static str>>>);

    impl EntityComponent for Tracked {
        fn dispose(&mut self) {
            self.0.borrow_mut().push("tracked");
        }
    }

    #[test]
    fn attach_auto_adds_requirements_before_initialize() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Gauge::default()).unwrap();

        assert!(container.has::<Pool>());
        let gauge = container.get::<Gauge>().unwrap();
        assert!(gauge.saw_pool);
        assert_eq!(gauge.owner, Some(Owner::Detached));
    }

    #[test]
    fn existing_requirement_is_not_replaced() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container
            .attach(Pool {
                amount: 7,
                disposed: false,
            })
            .unwrap();
        container.attach(Gauge::default()).unwrap();

        assert_eq!(container.get::<Pool>().unwrap().amount, 7);
        assert_eq!(container.len(), 2);
    }

    #[test]
    fn failing_requirement_is_fatal() {
        let mut container = ComponentContainer::new(Owner::Detached);
        let err = container.attach(Broken).unwrap_err();

        assert!(matches!(err, ComponentError::RequirementFailed { .. }));
        assert!(container.is_empty());
    }

    #[test]
    fn failed_attach_rolls_back_earlier_requirements() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Early).unwrap();

        let err = container.attach(Partial).unwrap_err();
        let ComponentError::RequirementFailed { required, .. } = err else {
            panic!("unexpected error: {err:?}");
        };
        assert!(required.ends_with("Tie"));
        assert!(!container.has::<Pool>());
        assert_eq!(container.names(), vec!["early"]);
    }

    #[test]
    fn requirement_cycle_is_detected() {
        let mut container = ComponentContainer::new(Owner::Detached);
        let err = container.attach(Ping).unwrap_err();
        assert!(matches!(err, ComponentError::RequirementCycle { .. }));
    }

    #[test]
    fn same_type_is_replaced() {
        let mut container = ComponentContainer::new(Owner::Detached);
        let log = Rc::new(RefCell::new(Vec::new()));
        container.attach(Tracked(log.clone())).unwrap();
        container.attach(Tracked(log.clone())).unwrap();

        assert_eq!(container.len(), 1);
        assert_eq!(*log.borrow(), vec!["tracked"]);
    }

    #[test]
    fn remove_refused_while_required() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Gauge::default()).unwrap();

        let err = container.remove::<Pool>().unwrap_err();
        assert!(matches!(err, ComponentError::RequiredBy { .. }));
        assert!(container.has::<Pool>());

        assert!(container.remove::<Gauge>().unwrap());
        assert!(container.remove::<Pool>().unwrap());
        assert!(!container.remove::<Pool>().unwrap());
    }

    #[test]
    fn remove_disposes_component() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Pool::default()).unwrap();
        let cell = container.cell::<Pool>().unwrap();

        container.remove::<Pool>().unwrap();
        assert!(cell.borrow().downcast_ref::<Pool>().unwrap().disposed);
    }

    #[test]
    fn get_fails_while_component_is_borrowed_mutably() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Pool::default()).unwrap();

        let held = container.get_mut::<Pool>().unwrap();
        assert!(container.get::<Pool>().is_none());
        drop(held);
        assert!(container.get::<Pool>().is_some());
    }

    #[test]
    fn dispatch_list_orders_by_priority_then_attach_order() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Ranked(3)).unwrap();
        container.attach(Early).unwrap();
        container.attach(Tie).unwrap();

        let names: Vec<_> = container
            .dispatch_list(Capabilities::LISTENER)
            .entries()
            .iter()
            .map(|e| e.name())
            .collect();
        assert_eq!(names, vec!["early", "ranked", "tie"]);
    }

    #[test]
    fn disabled_components_are_left_out_of_dispatch() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Early).unwrap();
        container.attach(Tie).unwrap();
        assert!(container.set_enabled::<Early>(false));

        let list = container.dispatch_list(Capabilities::LISTENER);
        assert_eq!(list.len(), 1);
        assert!(!container.is_enabled::<Early>());
        assert!(!container.set_enabled::<Pool>(true));
    }

    #[test]
    fn dispatch_list_of_filters_by_type() {
        let mut container = ComponentContainer::new(Owner::Detached);
        container.attach(Early).unwrap();
        container.attach(Tie).unwrap();

        let list = container.dispatch_list_of::<Tie>();
        assert_eq!(list.len(), 1);
        assert_eq!(list.entries()[0].name(), "tie");
    }

    #[test]
    fn dispose_empties_container() {
        let mut container = ComponentContainer::new(Owner::Detached);
        let log = Rc::new(RefCell::new(Vec::new()));
        container.attach(Tracked(log.clone())).unwrap();
        container.attach(Pool::default()).unwrap();

        container.dispose();
        assert!(container.is_empty());
        assert_eq!(log.borrow().len(), 1);
    }
}
