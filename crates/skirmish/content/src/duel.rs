//! Scripted duel description.

use skirmish_core::Position;

/// One combatant of a scripted duel.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuelistSpec {
    pub name: String,
    pub health: i32,
    pub start: Position,
    /// Action kinds queued at the start, front first.
    pub rotation: Vec<String>,
    /// Re-queue the rotation as it is consumed.
    #[cfg_attr(feature = "serde", serde(default))]
    pub cycle: bool,
}

/// Two duelists; the challenger walks onto the defender's tile every round.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DuelSpec {
    pub challenger: DuelistSpec,
    pub defender: DuelistSpec,
}
