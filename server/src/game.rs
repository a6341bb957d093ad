use crate::client_manager::ClientManager;
use crate::movement;
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use shared::{
    Action, Command, GameError, GameState, MapError, Tile, TileGrid, DEFAULT_VISIBILITY_RADIUS,
};

/// One cell for the special item, at least one more for the players.
const MIN_OPEN_CELLS: usize = 2;

#[derive(Debug, Clone)]
pub struct WorldConfig {
    pub visibility_radius: u32,
    /// Fixed seed for spawn placement; entropy when unset.
    pub seed: Option<u64>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            visibility_radius: DEFAULT_VISIBILITY_RADIUS,
            seed: None,
        }
    }
}

/// Owns the canonical game state and everything needed to mutate it.
///
/// All operations are synchronous and short; callers serialize access by
/// holding the world behind a single lock.
pub struct World {
    state: GameState,
    /// Terrain as loaded from disk, before the special item is placed.
    base_map: TileGrid,
    clients: ClientManager,
    rng: StdRng,
    visibility_radius: u32,
}

impl World {
    pub fn new(map: TileGrid, config: &WorldConfig) -> Result<Self, MapError> {
        let found = map.open_cells().len();
        if found < MIN_OPEN_CELLS {
            return Err(MapError::NotEnoughOpenCells {
                needed: MIN_OPEN_CELLS,
                found,
            });
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let mut world = Self {
            state: GameState::new(map.clone(), config.visibility_radius),
            base_map: map,
            clients: ClientManager::new(),
            rng,
            visibility_radius: config.visibility_radius,
        };
        world.populate();

        info!(
            "World ready: {}x{} map, visibility radius {}",
            world.state.map.width(),
            world.state.map.height(),
            world.visibility_radius
        );
        Ok(world)
    }

    pub fn register(&mut self, name: &str) -> Result<u32, GameError> {
        self.clients.register(&mut self.state, name)
    }

    pub fn unregister(&mut self, slot: u32) -> Result<String, GameError> {
        self.clients.unregister(&mut self.state, slot)
    }

    /// Validates and applies a single command.
    ///
    /// The sequence number is consumed as soon as it passes the duplicate
    /// gate, so a command that then fails on its action or its slot still
    /// burns that number. Failed commands never touch the game state.
    /// Restart is accepted from any slot; moves and interaction need an
    /// occupied one.
    pub fn apply_command(&mut self, command: &Command) -> Result<String, GameError> {
        let slot = command.slot;

        if !self.clients.sequencer_mut().accept(slot, command.sequence) {
            warn!("Rejected duplicate command {} from player {}", command.sequence, slot);
            return Err(GameError::DuplicateCommand {
                slot,
                sequence: command.sequence,
            });
        }

        let action: Action = command.action.parse()?;
        debug!("Player {} command {}: {}", slot, command.sequence, action);

        match action {
            Action::Move(direction) => {
                movement::move_player(&mut self.state, slot, direction)?;
            }
            Action::Interact => {
                if movement::interact(&mut self.state, slot)? {
                    info!("Player {} found the special item, fog lifted", slot);
                }
            }
            Action::Restart => self.restart(),
        }

        Ok(format!("{} applied", action))
    }

    /// Resets the world in place: fresh item and spawn positions, hidden
    /// masks, fog on, default radius. Registrations and the sequence ledger
    /// are left alone.
    pub fn restart(&mut self) {
        self.state.fog_enabled = true;
        self.state.visibility_radius = self.visibility_radius;
        self.populate();
        info!("World restarted");
    }

    /// A full copy of the current aggregate.
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn last_accepted(&self, slot: u32) -> Option<u64> {
        self.clients.sequencer().last_accepted(slot)
    }

    /// Places the special item, then spawns both players on passable cells.
    fn populate(&mut self) {
        let mut map = self.base_map.clone();

        if let Some(&item) = map.open_cells().choose(&mut self.rng) {
            map.set(item, Tile::SpecialItem);
        }

        let open = map.open_cells();
        for player in self.state.players.iter_mut() {
            if let Some(&spawn) = open.choose(&mut self.rng) {
                player.position = spawn;
            }
        }

        self.state.map = map;
        self.state.clear_visibility();
    }
}
