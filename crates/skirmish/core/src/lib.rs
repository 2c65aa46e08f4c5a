//! Turn-resolution core for tile-based skirmishes.
//!
//! `skirmish-core` decides, for two colliding actors, which queued actions
//! fire, in what order their effect handlers run, and how those handlers can
//! cancel each other. Everything runs on one logical thread; the only
//! "concurrency" is two actors triggering the same collision in one tick,
//! which [`resolve::CollisionResolver`]'s pair lock collapses into one pass.
//!
//! All state lives in a [`world::World`]. Behaviors are components attached
//! to actors and actions; numeric effects go through the
//! [`value::ProcessableValue`] pipeline.
pub mod action;
pub mod component;
pub mod config;
pub mod effects;
pub mod error;
pub mod ids;
pub mod resolve;
pub mod value;
pub mod world;

pub use action::{
    Action, ActionBehavior, ActionChain, ActionFactory, ActionKind, ActionQueue, ChainError,
    CyclePolicy, FollowsPredecessor,
};
pub use component::{
    Capabilities, ComponentContainer, ComponentError, ComponentEvent, EffectContext,
    EntityComponent, EventKind, HandlerError, InitScope, Requirement,
};
pub use config::CoreConfig;
pub use error::{CoreError, ErrorSeverity};
pub use ids::{ActionId, ActorId, Owner, Provider};
pub use resolve::{
    ChainScheduler, CollisionResolver, LockToken, PairKey, PairwiseResolver, Parties, PassReport,
    ResolveError, Side, StepReport, TurnClock,
};
pub use value::{Bonus, ProcessableValue, ValueChange, ValueChanged};
pub use world::{Actor, GridOracle, OccupancyChange, Position, SharedGrid, TileGrid, World};
