//! Player slot admission and eviction
//!
//! This module handles the server-side bookkeeping of who is playing:
//! - Assigning the first free slot (1, then 2) to a registering name
//! - Freeing a slot on unregistration
//! - Keeping each slot's command sequence ledger in step with its lifetime
//!
//! Slots are bound to names, not to connections. A client that drops its
//! connection keeps its slot until it explicitly unregisters.

use crate::sequencer::CommandSequencer;
use log::info;
use shared::{GameError, GameState};

/// Tracks registered players and their command ledgers.
///
/// The player names themselves live in the [`GameState`] aggregate so that
/// snapshots carry them; the manager owns everything that clients never see.
#[derive(Debug, Default)]
pub struct ClientManager {
    sequencer: CommandSequencer,
}

impl ClientManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `name` in the first free slot and returns that slot.
    ///
    /// Fails with [`GameError::CapacityExceeded`] when both slots are taken;
    /// an occupied slot is never overwritten. An empty name would leave the
    /// slot looking free, so it is refused with [`GameError::InvalidName`].
    pub fn register(&mut self, state: &mut GameState, name: &str) -> Result<u32, GameError> {
        if name.is_empty() {
            return Err(GameError::InvalidName);
        }

        let player = state
            .players
            .iter_mut()
            .find(|player| !player.is_active())
            .ok_or(GameError::CapacityExceeded)?;

        player.name = name.to_string();
        let slot = player.slot;
        state.player_count += 1;
        self.sequencer.open(slot);

        info!("Player {} registered as {:?}", slot, name);
        Ok(slot)
    }

    /// Frees `slot` and returns a confirmation message.
    ///
    /// Fails with [`GameError::NotRegistered`] if the slot is already free
    /// or does not exist.
    pub fn unregister(&mut self, state: &mut GameState, slot: u32) -> Result<String, GameError> {
        let player = state
            .player_mut(slot)
            .filter(|player| player.is_active())
            .ok_or(GameError::NotRegistered { slot })?;

        let name = std::mem::take(&mut player.name);
        state.player_count = state.player_count.saturating_sub(1);
        self.sequencer.close(slot);

        info!("Player {} ({}) unregistered", slot, name);
        Ok(format!("{} disconnected.", name))
    }

    pub fn sequencer(&self) -> &CommandSequencer {
        &self.sequencer
    }

    pub fn sequencer_mut(&mut self) -> &mut CommandSequencer {
        &mut self.sequencer
    }
}
