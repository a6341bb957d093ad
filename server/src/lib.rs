//! # Fog Walk Server Library
//!
//! Authoritative server for a two-player exploration game on a tile grid.
//! Players start in darkness, walk the map to uncover the cells around them,
//! and can reveal the whole map at once by interacting with a hidden item.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative State
//! The server owns the one and only [`shared::GameState`]. Clients never
//! mutate it directly; they send commands and poll snapshots.
//!
//! ### Player Slots
//! Exactly two slots exist. A name claims the first free slot and keeps it
//! until it unregisters, regardless of how many connections it opens.
//!
//! ### Command Ordering
//! Every slot has a sequence ledger. A command whose sequence number is not
//! strictly greater than the last accepted one is rejected before anything
//! else is checked, so retried or reordered commands are never applied twice.
//!
//! ## Architecture Design
//!
//! ### Request/Reply over TCP
//! Each client connection is served by its own task. A request frame is read,
//! dispatched against the world and answered with exactly one response frame.
//!
//! ### Shared World Lock
//! The [`game::World`] sits behind a `tokio::sync::RwLock`. Commands, restarts
//! and slot changes take the write lock; snapshots take the read lock and
//! clone. A snapshot therefore always reflects a whole number of commands.
//!
//! ## Module Organization
//!
//! - [`client_manager`]: slot admission, eviction and ledger lifetime
//! - [`game`]: the world aggregate, command validation and restart
//! - [`movement`]: stepping on the grid and item interaction
//! - [`network`]: TCP listener, framing loop and request dispatch
//! - [`sequencer`]: per-slot monotonic command gate
//! - [`visibility`]: per-player reveal masks
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::{Server, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig {
//!         port: 9000,
//!         seed: Some(42),
//!         ..ServerConfig::default()
//!     };
//!
//!     // Loads map.txt, places the item and both spawn points, then binds
//!     let server = Server::from_config(&config).await?;
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod client_manager;
pub mod game;
pub mod movement;
pub mod network;
pub mod sequencer;
pub mod visibility;
