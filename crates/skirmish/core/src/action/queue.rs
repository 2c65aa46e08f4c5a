use std::collections::VecDeque;

use crate::ids::ActionId;

/// Ordered, capacity-bounded list of action ids.
///
/// Plain storage: notifications are fired by the [`World`](crate::world::World)
/// operations that wrap it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActionQueue {
    actions: VecDeque<ActionId>,
    capacity: usize,
}

impl ActionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            actions: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.actions.len() >= self.capacity
    }

    pub fn contains(&self, action: ActionId) -> bool {
        self.actions.contains(&action)
    }

    pub fn front(&self) -> Option<ActionId> {
        self.actions.front().copied()
    }

    /// Appends `action`. Returns false, leaving the queue untouched, when full
    /// or when the action is already queued.
    pub fn push_back(&mut self, action: ActionId) -> bool {
        if self.is_full() || self.contains(action) {
            return false;
        }
        self.actions.push_back(action);
        true
    }

    pub fn pop_front(&mut self) -> Option<ActionId> {
        self.actions.pop_front()
    }

    /// Removes `action` wherever it sits.
    pub fn remove(&mut self, action: ActionId) -> bool {
        match self.position(action) {
            Some(index) => self.actions.remove(index).is_some(),
            None => false,
        }
    }

    pub fn position(&self, action: ActionId) -> Option<usize> {
        self.actions.iter().position(|&a| a == action)
    }

    /// The action queued right before `action`.
    pub fn predecessor(&self, action: ActionId) -> Option<ActionId> {
        let index = self.position(action)?;
        index
            .checked_sub(1)
            .and_then(|i| self.actions.get(i).copied())
    }

    /// The action queued right after `action`.
    pub fn successor(&self, action: ActionId) -> Option<ActionId> {
        let index = self.position(action)?;
        self.actions.get(index + 1).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.actions.iter().copied()
    }

    /// Empties the queue, returning its contents in order.
    pub fn drain_all(&mut self) -> Vec<ActionId> {
        self.actions.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue_of(capacity: usize, ids: &[u64]) -> ActionQueue {
        let mut queue = ActionQueue::new(capacity);
        for &id in ids {
            assert!(queue.push_back(ActionId(id)));
        }
        queue
    }

    #[test]
    fn push_beyond_capacity_is_refused() {
        let mut queue = queue_of(2, &[1, 2]);
        assert!(!queue.push_back(ActionId(3)));
        assert_eq!(
            queue.iter().collect::<Vec<_>>(),
            vec![ActionId(1), ActionId(2)]
        );
    }

    #[test]
    fn duplicate_push_is_refused() {
        let mut queue = queue_of(4, &[1]);
        assert!(!queue.push_back(ActionId(1)));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn neighbors() {
        let queue = queue_of(4, &[1, 2, 3]);
        assert_eq!(queue.predecessor(ActionId(2)), Some(ActionId(1)));
        assert_eq!(queue.predecessor(ActionId(1)), None);
        assert_eq!(queue.successor(ActionId(2)), Some(ActionId(3)));
        assert_eq!(queue.successor(ActionId(3)), None);
        assert_eq!(queue.successor(ActionId(9)), None);
    }

    #[test]
    fn remove_from_middle() {
        let mut queue = queue_of(4, &[1, 2, 3]);
        assert!(queue.remove(ActionId(2)));
        assert!(!queue.remove(ActionId(2)));
        assert_eq!(queue.predecessor(ActionId(3)), Some(ActionId(1)));
    }

    #[test]
    fn drain_all_keeps_order() {
        let mut queue = queue_of(4, &[5, 6]);
        assert_eq!(queue.drain_all(), vec![ActionId(5), ActionId(6)]);
        assert!(queue.is_empty());
    }
}
