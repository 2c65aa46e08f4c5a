//! Ordered, stackable registration chains for processors and modifiers.
//!
//! A chain keeps its entries sorted by `(priority, registration sequence)`.
//! Entries are keyed by `(concrete type, stack tag, provider)`: registering the
//! same handler for the same provider again only bumps that entry's stack count,
//! so the total contribution of an entry is always a function of its stack count.
//! Modifiers whose instances differ in meaning (one type, many bonuses) report a
//! distinct [`ValueModifier::stack_tag`] per meaning.

use core::any::TypeId;

use crate::ids::Provider;

use super::{ValueChange, ValueModifier, ValueProcessor};

/// Stacking key of a chain entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StackKey {
    type_id: TypeId,
    tag: u64,
    provider: Provider,
}

impl StackKey {
    /// Key for handler type `T` contributed by `provider`.
    pub fn of<T: 'static>(provider: Provider) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            tag: 0,
            provider,
        }
    }

    /// Same key, told apart from other instances of its type by `tag`.
    pub fn with_tag(self, tag: u64) -> Self {
        Self { tag, ..self }
    }

    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }
}

/// One registered handler and its accumulated stacks.
pub struct StackEntry<H: ?Sized> {
    key: StackKey,
    priority: i32,
    seq: u64,
    stacks: u32,
    handler: Box<H>,
}

impl<H: ?Sized> StackEntry<H> {
    pub fn key(&self) -> StackKey {
        self.key
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }

    pub fn stacks(&self) -> u32 {
        self.stacks
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }
}

/// Priority-ordered list of stackable handlers.
pub struct StackChain<H: ?Sized> {
    entries: Vec<StackEntry<H>>,
    next_seq: u64,
}

impl<H: ?Sized> Default for StackChain<H> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_seq: 0,
        }
    }
}

impl<H: ?Sized> core::fmt::Debug for StackChain<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_list()
            .entries(
                self.entries
                    .iter()
                    .map(|e| (e.key.provider, e.priority, e.stacks)),
            )
            .finish()
    }
}

impl<H: ?Sized> StackChain<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one stack for `key`, building the handler only when the key is new.
    ///
    /// Returns the stack count of the entry after the call.
    pub fn add_stack(
        &mut self,
        key: StackKey,
        priority: i32,
        build: impl FnOnce() -> Box<H>,
    ) -> u32 {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.key == key) {
            entry.stacks = entry.stacks.saturating_add(1);
            return entry.stacks;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let position = self
            .entries
            .partition_point(|e| (e.priority, e.seq) <= (priority, seq));
        self.entries.insert(
            position,
            StackEntry {
                key,
                priority,
                seq,
                stacks: 1,
                handler: build(),
            },
        );
        1
    }

    /// Removes a single stack of `key`. The entry disappears at zero stacks.
    ///
    /// Returns the remaining stack count, or `None` if the key was not registered.
    pub fn remove_stack(&mut self, key: StackKey) -> Option<u32> {
        let index = self.entries.iter().position(|e| e.key == key)?;
        let entry = &mut self.entries[index];
        entry.stacks -= 1;
        let remaining = entry.stacks;
        if remaining == 0 {
            self.entries.remove(index);
        }
        Some(remaining)
    }

    /// Removes every entry contributed by `provider`, leaving other providers intact.
    ///
    /// Returns the number of entries removed.
    pub fn remove_provider(&mut self, provider: Provider) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.key.provider != provider);
        before - self.entries.len()
    }

    /// Current stack count of `key` (zero when absent).
    pub fn stacks(&self, key: StackKey) -> u32 {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map_or(0, |e| e.stacks)
    }

    pub fn entries(&self) -> impl Iterator<Item = &StackEntry<H>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Write-side chain of a [`ProcessableValue`](super::ProcessableValue).
pub type ProcessorChain = StackChain<dyn ValueProcessor>;

/// Read-side chain of a [`ProcessableValue`](super::ProcessableValue).
pub type ModifierChain = StackChain<dyn ValueModifier>;

impl ProcessorChain {
    /// Registers one stack of processor `P` for `provider`.
    pub fn register<P: ValueProcessor>(&mut self, provider: Provider, processor: P) -> u32 {
        let priority = processor.priority();
        self.add_stack(StackKey::of::<P>(provider), priority, || {
            Box::new(processor) as Box<dyn ValueProcessor>
        })
    }

    /// Removes one stack of processor `P` contributed by `provider`.
    pub fn unregister<P: ValueProcessor>(&mut self, provider: Provider) -> Option<u32> {
        self.remove_stack(StackKey::of::<P>(provider))
    }

    /// Runs `change` through every processor in order.
    ///
    /// Stops early once nothing is left to transform.
    pub fn process(&mut self, mut change: ValueChange) -> ValueChange {
        for entry in &mut self.entries {
            if change.amount <= 0 {
                break;
            }
            change = entry.handler.process(change, entry.stacks);
        }
        change
    }
}

impl ModifierChain {
    /// Registers one stack of `modifier` for `provider`.
    ///
    /// Only a modifier with the same type and [`stack_tag`](ValueModifier::stack_tag)
    /// stacks onto an existing entry; anything else gets its own entry.
    pub fn register<M: ValueModifier>(&mut self, provider: Provider, modifier: M) -> u32 {
        let priority = modifier.priority();
        let key = Self::key_of(provider, &modifier);
        self.add_stack(key, priority, || Box::new(modifier) as Box<dyn ValueModifier>)
    }

    /// Removes one stack of the entry `modifier` was registered under.
    pub fn unregister<M: ValueModifier>(
        &mut self,
        provider: Provider,
        modifier: &M,
    ) -> Option<u32> {
        self.remove_stack(Self::key_of(provider, modifier))
    }

    /// Stacking key `modifier` registers under for `provider`.
    pub fn key_of<M: ValueModifier>(provider: Provider, modifier: &M) -> StackKey {
        StackKey::of::<M>(provider).with_tag(modifier.stack_tag())
    }

    /// Applies every modifier in order to `value`.
    pub fn apply(&self, value: i32) -> i32 {
        self.entries
            .iter()
            .fold(value, |acc, entry| entry.handler.modify(acc, entry.stacks))
    }
}
