//! Fog-of-war reveals
//!
//! A reveal discloses an axis-aligned square of half-width `radius` around a
//! cell, clamped to the grid, with inclusive bounds on all four sides.

use shared::{GameError, GameState, Position, VisibilityMask};

/// Reveals the clamped square around `center` in a single mask.
pub fn reveal_area(mask: &mut VisibilityMask, center: Position, radius: u32) {
    if mask.width() == 0 || mask.height() == 0 {
        return;
    }

    let radius = i64::from(radius);
    let max_x = mask.width() as i64 - 1;
    let max_y = mask.height() as i64 - 1;

    let min_col = (i64::from(center.x) - radius).max(0);
    let max_col = (i64::from(center.x) + radius).min(max_x);
    let min_row = (i64::from(center.y) - radius).max(0);
    let max_row = (i64::from(center.y) + radius).min(max_y);

    for row in min_row..=max_row {
        for col in min_col..=max_col {
            mask.reveal(Position::new(col as i32, row as i32));
        }
    }
}

/// Reveals the area around `center` for `slot` only, using the state's
/// current visibility radius.
pub fn reveal(state: &mut GameState, slot: u32, center: Position) -> Result<(), GameError> {
    let radius = state.visibility_radius;
    let mask = state
        .visibility_mut(slot)
        .ok_or(GameError::PlayerNotFound { slot })?;

    reveal_area(mask, center, radius);
    Ok(())
}

/// Lifts the fog for both players at once.
pub fn reveal_everything(state: &mut GameState) {
    for mask in state.revealed.iter_mut() {
        mask.reveal_all();
    }
}
