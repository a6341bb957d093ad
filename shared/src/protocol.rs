//! Request/reply wire protocol
//!
//! Every message is a 4-byte big-endian length followed by a bincode-encoded
//! [`Packet`]. A client writes one request and reads exactly one response.

use crate::{Command, GameState};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on a single encoded packet.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Packet {
    // Requests
    RegisterClient {
        name: String,
    },
    UnregisterClient {
        slot: u32,
    },
    SendCommand {
        command: Command,
    },
    GetGameState {
        client_name: String,
    },

    // Responses
    Registered {
        slot: u32,
    },
    Unregistered {
        message: String,
    },
    CommandAccepted {
        message: String,
    },
    GameState {
        state: Box<GameState>,
    },
    Error {
        error: GameError,
    },
}

/// Errors a remote call can fail with. None of them alter the game state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum GameError {
    #[error("player limit reached")]
    CapacityExceeded,
    #[error("player name must not be empty")]
    InvalidName,
    #[error("player {slot} is already disconnected")]
    NotRegistered { slot: u32 },
    #[error("duplicate command {sequence} for player {slot}")]
    DuplicateCommand { slot: u32, sequence: u64 },
    #[error("player {slot} not found")]
    PlayerNotFound { slot: u32 },
    #[error("invalid action: {0}")]
    InvalidAction(String),
    #[error("packet is not a request")]
    InvalidRequest,
}

#[derive(Debug, Error)]
pub enum FrameError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("codec error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("frame of {0} bytes exceeds the limit")]
    TooLarge(usize),
}

/// Encodes a packet together with its length prefix.
pub fn encode_frame(packet: &Packet) -> Result<Vec<u8>, FrameError> {
    let payload = bincode::serialize(packet)?;
    if payload.len() > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(payload.len()));
    }

    let mut frame = Vec::with_capacity(4 + payload.len());
    frame.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

pub async fn write_packet<W>(writer: &mut W, packet: &Packet) -> Result<(), FrameError>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_frame(packet)?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads the next packet. Returns `Ok(None)` when the peer closed the stream
/// cleanly between frames.
pub async fn read_packet<R>(reader: &mut R) -> Result<Option<Packet>, FrameError>
where
    R: AsyncRead + Unpin,
{
    let len = match reader.read_u32().await {
        Ok(len) => len as usize,
        Err(e) if e.kind() == ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    if len > MAX_FRAME_LEN {
        return Err(FrameError::TooLarge(len));
    }

    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(bincode::deserialize(&payload)?))
}
