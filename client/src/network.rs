use log::{debug, error, info};
use shared::{read_packet, write_packet, Command, FrameError, GameError, GameState, Packet};
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("connection failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("transport error: {0}")]
    Frame(#[from] FrameError),
    #[error("server refused the call: {0}")]
    Rpc(#[from] GameError),
    #[error("unexpected response from server: {0:?}")]
    UnexpectedResponse(Box<Packet>),
    #[error("server closed the connection")]
    ConnectionClosed,
    #[error("client is not registered")]
    NotRegistered,
}

/// One connection to the game server. Every call writes a single request and
/// waits for its single response.
pub struct GameClient<S> {
    stream: S,
    slot: Option<u32>,
    name: Option<String>,
}

impl GameClient<TcpStream> {
    pub async fn connect(server_addr: &str) -> Result<Self, ClientError> {
        info!("Connecting to server {}...", server_addr);
        let stream = TcpStream::connect(server_addr).await?;
        stream.set_nodelay(true)?;
        Ok(Self::from_stream(stream))
    }
}

impl<S> GameClient<S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn from_stream(stream: S) -> Self {
        Self {
            stream,
            slot: None,
            name: None,
        }
    }

    /// Slot assigned by the last successful registration, if any
    pub fn slot(&self) -> Option<u32> {
        self.slot
    }

    /// Adopts a slot registered over another connection to the same server.
    pub fn with_identity(mut self, slot: u32, name: &str) -> Self {
        self.slot = Some(slot);
        self.name = Some(name.to_string());
        self
    }

    pub async fn register(&mut self, name: &str) -> Result<u32, ClientError> {
        let request = Packet::RegisterClient {
            name: name.to_string(),
        };

        match self.call(request).await? {
            Packet::Registered { slot } => {
                info!("Registered as player {}", slot);
                self.slot = Some(slot);
                self.name = Some(name.to_string());
                Ok(slot)
            }
            other => Err(ClientError::UnexpectedResponse(Box::new(other))),
        }
    }

    pub async fn unregister(&mut self) -> Result<String, ClientError> {
        let slot = self.slot.ok_or(ClientError::NotRegistered)?;

        match self.call(Packet::UnregisterClient { slot }).await? {
            Packet::Unregistered { message } => {
                self.slot = None;
                self.name = None;
                Ok(message)
            }
            other => Err(ClientError::UnexpectedResponse(Box::new(other))),
        }
    }

    /// Unregisters and hands `outcome` back unchanged. Slots are bound to
    /// names, so this runs after every session, failed ones included.
    pub async fn leave<T, E>(&mut self, outcome: Result<T, E>) -> Result<T, E> {
        match self.unregister().await {
            Ok(message) => info!("{}", message),
            Err(e) => error!("Failed to unregister: {}", e),
        }
        outcome
    }

    pub async fn send_command(&mut self, command: Command) -> Result<String, ClientError> {
        debug!("Sending command {} ({})", command.sequence, command.action);

        match self.call(Packet::SendCommand { command }).await? {
            Packet::CommandAccepted { message } => Ok(message),
            other => Err(ClientError::UnexpectedResponse(Box::new(other))),
        }
    }

    /// Fetches a full snapshot of the game. Works before registering too.
    pub async fn get_state(&mut self) -> Result<GameState, ClientError> {
        let request = Packet::GetGameState {
            client_name: self.name.clone().unwrap_or_default(),
        };

        match self.call(request).await? {
            Packet::GameState { state } => Ok(*state),
            other => Err(ClientError::UnexpectedResponse(Box::new(other))),
        }
    }

    async fn call(&mut self, request: Packet) -> Result<Packet, ClientError> {
        write_packet(&mut self.stream, &request).await?;

        match read_packet(&mut self.stream).await? {
            Some(Packet::Error { error }) => Err(ClientError::Rpc(error)),
            Some(response) => Ok(response),
            None => Err(ClientError::ConnectionClosed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::{encode_frame, Action, Direction, Tile, TileGrid};
    use tokio_test::io::Builder;

    fn frame(packet: Packet) -> Vec<u8> {
        encode_frame(&packet).unwrap()
    }

    #[tokio::test]
    async fn test_register_and_unregister() {
        let stream = Builder::new()
            .write(&frame(Packet::RegisterClient {
                name: "ana".to_string(),
            }))
            .read(&frame(Packet::Registered { slot: 2 }))
            .write(&frame(Packet::UnregisterClient { slot: 2 }))
            .read(&frame(Packet::Unregistered {
                message: "ana disconnected.".to_string(),
            }))
            .build();

        let mut client = GameClient::from_stream(stream);
        assert_eq!(client.register("ana").await.unwrap(), 2);
        assert_eq!(client.slot(), Some(2));

        let message = client.unregister().await.unwrap();
        assert_eq!(message, "ana disconnected.");
        assert_eq!(client.slot(), None);
    }

    #[tokio::test]
    async fn test_leave_unregisters_after_failed_session() {
        let stream = Builder::new()
            .write(&frame(Packet::UnregisterClient { slot: 1 }))
            .read(&frame(Packet::Unregistered {
                message: "ana disconnected.".to_string(),
            }))
            .build();

        let mut client = GameClient::from_stream(stream).with_identity(1, "ana");
        let outcome: Result<(), String> = Err("stdin closed".to_string());

        assert_eq!(
            client.leave(outcome).await,
            Err("stdin closed".to_string())
        );
        assert_eq!(client.slot(), None);
    }

    #[tokio::test]
    async fn test_leave_keeps_outcome_when_unregister_fails() {
        let stream = Builder::new()
            .write(&frame(Packet::UnregisterClient { slot: 2 }))
            .read(&frame(Packet::Error {
                error: GameError::NotRegistered { slot: 2 },
            }))
            .build();

        let mut client = GameClient::from_stream(stream).with_identity(2, "bia");
        let outcome: Result<u32, String> = Ok(7);

        assert_eq!(client.leave(outcome).await, Ok(7));
    }

    #[tokio::test]
    async fn test_unregister_without_slot() {
        let stream = Builder::new().build();
        let mut client = GameClient::from_stream(stream);

        assert!(matches!(
            client.unregister().await,
            Err(ClientError::NotRegistered)
        ));
    }

    #[tokio::test]
    async fn test_send_command_rejected() {
        let command = Command::new(1, Action::Move(Direction::Left), 3);
        let stream = Builder::new()
            .write(&frame(Packet::SendCommand {
                command: command.clone(),
            }))
            .read(&frame(Packet::Error {
                error: GameError::DuplicateCommand {
                    slot: 1,
                    sequence: 3,
                },
            }))
            .build();

        let mut client = GameClient::from_stream(stream);

        match client.send_command(command).await {
            Err(ClientError::Rpc(GameError::DuplicateCommand { slot, sequence })) => {
                assert_eq!(slot, 1);
                assert_eq!(sequence, 3);
            }
            other => panic!("Expected duplicate rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_state_sends_registered_name() {
        let state = GameState::new(TileGrid::filled(3, 2, Tile::Empty), 3);
        let stream = Builder::new()
            .write(&frame(Packet::GetGameState {
                client_name: "bia".to_string(),
            }))
            .read(&frame(Packet::GameState {
                state: Box::new(state.clone()),
            }))
            .build();

        let mut client = GameClient::from_stream(stream).with_identity(2, "bia");
        assert_eq!(client.get_state().await.unwrap(), state);
    }

    #[tokio::test]
    async fn test_unexpected_response() {
        let stream = Builder::new()
            .write(&frame(Packet::RegisterClient {
                name: "ana".to_string(),
            }))
            .read(&frame(Packet::CommandAccepted {
                message: "move_up applied".to_string(),
            }))
            .build();

        let mut client = GameClient::from_stream(stream);
        assert!(matches!(
            client.register("ana").await,
            Err(ClientError::UnexpectedResponse(_))
        ));
        assert_eq!(client.slot(), None);
    }

    #[tokio::test]
    async fn test_connection_closed_before_response() {
        let stream = Builder::new()
            .write(&frame(Packet::GetGameState {
                client_name: String::new(),
            }))
            .build();

        let mut client = GameClient::from_stream(stream);
        assert!(matches!(
            client.get_state().await,
            Err(ClientError::ConnectionClosed)
        ));
    }
}
