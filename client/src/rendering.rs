use shared::{GameState, Position, Tile, FOG_SYMBOL};

pub const HELP_LINE: &str = "Use WASD to move, E to interact, R to restart, Q to quit.";

/// Draws the map as seen by `slot`, followed by a blank line and a status line.
///
/// With fog on, cells outside the viewer's mask show as fog. The viewer is
/// always drawn at its position; the other player only where the viewer can
/// see.
pub fn render(state: &GameState, slot: u32) -> String {
    let mut out = String::new();

    for (y, row) in state.map.rows().enumerate() {
        for (x, tile) in row.iter().enumerate() {
            let position = Position::new(x as i32, y as i32);
            out.push(cell_symbol(state, slot, position, *tile));
        }
        out.push('\n');
    }

    out.push('\n');
    out.push_str(&status_line(state, slot));
    out.push('\n');
    out
}

fn cell_symbol(state: &GameState, viewer: u32, position: Position, tile: Tile) -> char {
    let visible = can_see(state, viewer, position);

    let occupied = state
        .players
        .iter()
        .filter(|player| player.is_active() && player.position == position)
        .any(|player| player.slot == viewer || visible);

    if occupied {
        Tile::Character.symbol()
    } else if visible {
        tile.symbol()
    } else {
        FOG_SYMBOL
    }
}

fn can_see(state: &GameState, viewer: u32, position: Position) -> bool {
    if !state.fog_enabled {
        return true;
    }

    state
        .visibility(viewer)
        .map(|mask| mask.is_revealed(position))
        .unwrap_or(false)
}

fn status_line(state: &GameState, slot: u32) -> String {
    let fog = if state.fog_enabled { "on" } else { "off" };

    match state.active_player(slot) {
        Some(player) => format!(
            "Player {} ({}) at ({}, {}) | players: {} | fog: {}",
            slot,
            player.name,
            player.position.x,
            player.position.y,
            state.player_count,
            fog
        ),
        None => format!(
            "Spectating | players: {} | fog: {}",
            state.player_count, fog
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::TileGrid;

    fn two_player_state() -> GameState {
        let map = TileGrid::parse("▤   \n  # \n ♣  ").unwrap();
        let mut state = GameState::new(map, 1);
        state.players[0].name = "ana".to_string();
        state.players[0].position = Position::new(1, 0);
        state.players[1].name = "bia".to_string();
        state.players[1].position = Position::new(3, 2);
        state.player_count = 2;
        state
    }

    fn map_rows(view: &str) -> Vec<&str> {
        view.lines().take_while(|line| !line.is_empty()).collect()
    }

    #[test]
    fn test_fog_hides_everything_but_self() {
        let state = two_player_state();
        let view = render(&state, 1);

        assert_eq!(map_rows(&view), vec![".☺..", "....", "...."]);
    }

    #[test]
    fn test_revealed_cells_show_tiles() {
        let mut state = two_player_state();
        let mask = state.visibility_mut(1).unwrap();
        mask.reveal(Position::new(0, 0));
        mask.reveal(Position::new(2, 1));
        mask.reveal(Position::new(1, 2));

        let view = render(&state, 1);
        assert_eq!(map_rows(&view), vec!["▤☺..", "..#.", ".♣.."]);
    }

    #[test]
    fn test_other_player_only_where_revealed() {
        let mut state = two_player_state();
        let hidden = render(&state, 1);
        assert_eq!(map_rows(&hidden)[2], "....");

        state.visibility_mut(1).unwrap().reveal(Position::new(3, 2));
        let shown = render(&state, 1);
        assert_eq!(map_rows(&shown)[2], "...☺");
    }

    #[test]
    fn test_no_fog_shows_whole_map() {
        let mut state = two_player_state();
        state.fog_enabled = false;

        let view = render(&state, 2);
        assert_eq!(map_rows(&view), vec!["▤☺  ", "  # ", " ♣ ☺"]);
    }

    #[test]
    fn test_status_line() {
        let state = two_player_state();

        let view = render(&state, 2);
        assert_eq!(
            view.lines().last(),
            Some("Player 2 (bia) at (3, 2) | players: 2 | fog: on")
        );

        let mut empty = two_player_state();
        empty.players[1].name.clear();
        empty.player_count = 1;
        let view = render(&empty, 2);
        assert_eq!(
            view.lines().last(),
            Some("Spectating | players: 1 | fog: on")
        );
    }
}
