/// Resolution core constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CoreConfig {
    /// Capacity given to the action queue of every newly spawned actor.
    pub queue_capacity: usize,
}

impl CoreConfig {
    // ===== compile-time constants used as type parameters =====
    /// Upper bound on the number of actions one chain can pull in.
    pub const MAX_CHAIN_LENGTH: usize = 16;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

    pub fn new() -> Self {
        Self {
            queue_capacity: Self::DEFAULT_QUEUE_CAPACITY,
        }
    }

    pub fn with_queue_capacity(queue_capacity: usize) -> Self {
        Self { queue_capacity }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self::new()
    }
}
