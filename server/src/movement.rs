//! Player movement and interaction against the tile grid

use crate::visibility;
use log::debug;
use shared::{Direction, GameError, GameState, Tile};

/// Steps the player in `slot` one cell towards `direction`.
///
/// Stepping off the grid or into a tangible tile is not an error: the player
/// stays put and the call still succeeds. Returns whether the player moved.
pub fn move_player(
    state: &mut GameState,
    slot: u32,
    direction: Direction,
) -> Result<bool, GameError> {
    let current = state
        .active_player(slot)
        .ok_or(GameError::PlayerNotFound { slot })?
        .position;

    let (dx, dy) = direction.delta();
    let target = current.offset(dx, dy);

    if !state.map.is_passable(target) {
        debug!(
            "Player {} blocked moving {:?} from ({}, {})",
            slot, direction, current.x, current.y
        );
        return Ok(false);
    }

    if let Some(player) = state.player_mut(slot) {
        player.position = target;
    }
    visibility::reveal(state, slot, target)?;

    Ok(true)
}

/// Looks for the special item in the four cells around the player. If one is
/// found, every cell is revealed for both players. Returns whether it was.
pub fn interact(state: &mut GameState, slot: u32) -> Result<bool, GameError> {
    let position = state
        .active_player(slot)
        .ok_or(GameError::PlayerNotFound { slot })?
        .position;

    let found = position
        .neighbours()
        .iter()
        .any(|&cell| state.map.get(cell) == Some(Tile::SpecialItem));

    if found {
        visibility::reveal_everything(state);
    }

    Ok(found)
}
