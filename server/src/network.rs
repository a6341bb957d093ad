//! Server network layer: TCP listener and per-connection request handling

use crate::game::{World, WorldConfig};
use log::{debug, error, info, warn};
use shared::{
    read_packet, write_packet, GameError, Packet, TileGrid, DEFAULT_PORT,
    DEFAULT_VISIBILITY_RADIUS,
};
use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::RwLock;

/// The world shared by every connection task.
pub type SharedWorld = Arc<RwLock<World>>;

/// Startup settings for the server binary.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub map_path: PathBuf,
    pub visibility_radius: u32,
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            map_path: PathBuf::from("map.txt"),
            visibility_radius: DEFAULT_VISIBILITY_RADIUS,
            seed: None,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn world_config(&self) -> WorldConfig {
        WorldConfig {
            visibility_radius: self.visibility_radius,
            seed: self.seed,
        }
    }
}

/// Accepts client connections and serves their calls against one world
pub struct Server {
    listener: TcpListener,
    world: SharedWorld,
}

impl Server {
    pub async fn new(addr: &str, world: World) -> Result<Self, Box<dyn std::error::Error>> {
        let listener = TcpListener::bind(addr).await?;
        info!("Server listening on {}", listener.local_addr()?);

        Ok(Server {
            listener,
            world: Arc::new(RwLock::new(world)),
        })
    }

    /// Loads the map named in `config`, builds the world and binds.
    pub async fn from_config(config: &ServerConfig) -> Result<Self, Box<dyn std::error::Error>> {
        let map = TileGrid::load(&config.map_path)?;
        info!(
            "Loaded map {} ({}x{})",
            config.map_path.display(),
            map.width(),
            map.height()
        );

        let world = World::new(map, &config.world_config())?;
        Self::new(&config.address(), world).await
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn world(&self) -> SharedWorld {
        Arc::clone(&self.world)
    }

    /// Accept loop. Each connection gets its own task; all of them share the
    /// same world lock.
    pub async fn run(self) -> io::Result<()> {
        info!("Server started successfully");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    info!("Client connected from {}", addr);
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", addr, e);
                    }

                    let world = Arc::clone(&self.world);
                    tokio::spawn(async move {
                        handle_connection(stream, addr, world).await;
                    });
                }
                Err(e) => {
                    error!("Error accepting connection: {}", e);
                    tokio::time::sleep(Duration::from_millis(10)).await;
                }
            }
        }
    }
}

async fn handle_connection(stream: TcpStream, addr: SocketAddr, world: SharedWorld) {
    serve_connection(stream, &addr.to_string(), &world).await;
    info!("Client {} disconnected", addr);
}

/// Serves request/reply pairs on one stream until the peer hangs up or
/// sends something that is not a frame.
pub async fn serve_connection<S>(mut stream: S, peer: &str, world: &RwLock<World>)
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    loop {
        let request = match read_packet(&mut stream).await {
            Ok(Some(packet)) => packet,
            Ok(None) => break,
            Err(e) => {
                warn!("Dropping connection from {}: {}", peer, e);
                break;
            }
        };

        let response = dispatch(world, request).await;

        if let Err(e) = write_packet(&mut stream, &response).await {
            error!("Failed to send response to {}: {}", peer, e);
            break;
        }
    }
}

/// Runs one remote call against the world and builds its response.
///
/// Mutating calls hold the write lock for their whole duration, so a
/// snapshot taken under the read lock never sees a half-applied command.
pub async fn dispatch(world: &RwLock<World>, request: Packet) -> Packet {
    match request {
        Packet::RegisterClient { name } => {
            let result = world.write().await.register(&name);
            match result {
                Ok(slot) => Packet::Registered { slot },
                Err(error) => reject(error),
            }
        }

        Packet::UnregisterClient { slot } => {
            let result = world.write().await.unregister(slot);
            match result {
                Ok(message) => Packet::Unregistered { message },
                Err(error) => reject(error),
            }
        }

        Packet::SendCommand { command } => {
            let result = world.write().await.apply_command(&command);
            match result {
                Ok(message) => Packet::CommandAccepted { message },
                Err(error) => reject(error),
            }
        }

        Packet::GetGameState { client_name } => {
            debug!("Snapshot requested by {:?}", client_name);
            let state = world.read().await.snapshot();
            Packet::GameState {
                state: Box::new(state),
            }
        }

        _ => reject(GameError::InvalidRequest),
    }
}

fn reject(error: GameError) -> Packet {
    debug!("Call rejected: {}", error);
    Packet::Error { error }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{encode_frame, Action, Command, Direction, Tile};
    use tokio_test::io::Builder;

    fn shared_world() -> RwLock<World> {
        let map = TileGrid::filled(10, 6, Tile::Empty);
        let config = WorldConfig {
            visibility_radius: 1,
            seed: Some(11),
        };
        RwLock::new(World::new(map, &config).unwrap())
    }

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.address(), "0.0.0.0:8973");
        assert_eq!(config.map_path, PathBuf::from("map.txt"));

        let world = config.world_config();
        assert_eq!(world.visibility_radius, 3);
        assert_eq!(world.seed, None);
    }

    #[tokio::test]
    async fn test_dispatch_register_and_capacity() {
        let world = shared_world();

        for (name, slot) in [("ana", 1), ("bia", 2)] {
            let response = dispatch(
                &world,
                Packet::RegisterClient {
                    name: name.to_string(),
                },
            )
            .await;
            assert_eq!(response, Packet::Registered { slot });
        }

        let response = dispatch(
            &world,
            Packet::RegisterClient {
                name: "caio".to_string(),
            },
        )
        .await;
        assert_eq!(
            response,
            Packet::Error {
                error: GameError::CapacityExceeded
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_unregister() {
        let world = shared_world();
        world.write().await.register("ana").unwrap();

        let response = dispatch(&world, Packet::UnregisterClient { slot: 1 }).await;
        assert_eq!(
            response,
            Packet::Unregistered {
                message: "ana disconnected.".to_string()
            }
        );

        let response = dispatch(&world, Packet::UnregisterClient { slot: 1 }).await;
        assert_eq!(
            response,
            Packet::Error {
                error: GameError::NotRegistered { slot: 1 }
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_command_and_duplicate() {
        let world = shared_world();
        world.write().await.register("ana").unwrap();
        let command = Command::new(1, Action::Move(Direction::Up), 1);

        let response = dispatch(
            &world,
            Packet::SendCommand {
                command: command.clone(),
            },
        )
        .await;
        assert_eq!(
            response,
            Packet::CommandAccepted {
                message: "move_up applied".to_string()
            }
        );

        let response = dispatch(&world, Packet::SendCommand { command }).await;
        assert_eq!(
            response,
            Packet::Error {
                error: GameError::DuplicateCommand {
                    slot: 1,
                    sequence: 1
                }
            }
        );
    }

    #[tokio::test]
    async fn test_dispatch_get_state_ignores_name() {
        let world = shared_world();
        world.write().await.register("ana").unwrap();
        let expected = world.read().await.snapshot();

        for client_name in ["ana", "someone else", ""] {
            let response = dispatch(
                &world,
                Packet::GetGameState {
                    client_name: client_name.to_string(),
                },
            )
            .await;

            match response {
                Packet::GameState { state } => assert_eq!(*state, expected),
                other => panic!("Expected GameState, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_dispatch_rejects_response_packets() {
        let world = shared_world();

        let response = dispatch(&world, Packet::Registered { slot: 1 }).await;
        assert_eq!(
            response,
            Packet::Error {
                error: GameError::InvalidRequest
            }
        );
    }

    #[tokio::test]
    async fn test_serve_connection_round_trip() {
        let world = shared_world();

        let register = encode_frame(&Packet::RegisterClient {
            name: "ana".to_string(),
        })
        .unwrap();
        let registered = encode_frame(&Packet::Registered { slot: 1 }).unwrap();
        let unregister = encode_frame(&Packet::UnregisterClient { slot: 1 }).unwrap();
        let unregistered = encode_frame(&Packet::Unregistered {
            message: "ana disconnected.".to_string(),
        })
        .unwrap();

        let stream = Builder::new()
            .read(&register)
            .write(&registered)
            .read(&unregister)
            .write(&unregistered)
            .build();

        serve_connection(stream, "mock", &world).await;

        assert_eq!(world.read().await.state().player_count, 0);
    }

    #[tokio::test]
    async fn test_serve_connection_drops_garbage() {
        let world = shared_world();
        let stream = Builder::new().read(&[0, 0, 0, 2, 0xFF, 0xFF]).build();

        serve_connection(stream, "mock", &world).await;

        assert_eq!(world.read().await.state().player_count, 0);
    }
}
