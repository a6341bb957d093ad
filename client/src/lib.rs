//! # Fog Walk Client Library
//!
//! Client side of the two-player exploration game. The server is the only
//! authority: the client sends sequenced commands, polls full snapshots and
//! draws what its own player has uncovered.
//!
//! ## Module Organization
//!
//! ### Input Module (`input`)
//! Maps key presses to game commands:
//! - w/a/s/d movement, e interaction, r restart, q quit
//! - Per-client sequence numbering, starting at 1
//!
//! ### Network Module (`network`)
//! A thin request/reply client over any async byte stream:
//! - Registration and unregistration of a player slot
//! - Command submission and snapshot polling
//! - Server rejections surfaced as typed errors
//!
//! ### Rendering Module (`rendering`)
//! Turns a snapshot into text, honouring the viewer's visibility mask.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::input::{Input, InputManager};
//! use client::network::GameClient;
//! use client::rendering::render;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut client = GameClient::connect("127.0.0.1:8973").await?;
//!     let slot = client.register("ana").await?;
//!
//!     let mut input = InputManager::new(slot);
//!     if let Some(Input::Command(command)) = input.handle_key('d') {
//!         client.send_command(command).await?;
//!     }
//!
//!     let state = client.get_state().await?;
//!     println!("{}", render(&state, slot));
//!
//!     client.unregister().await?;
//!     Ok(())
//! }
//! ```

pub mod input;
pub mod network;
pub mod rendering;
