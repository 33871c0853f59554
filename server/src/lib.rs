//! # Game Server Library
//!
//! This library provides the authoritative server implementation for the
//! networked multiplayer game. It owns the canonical world, applies client
//! intents, steps every entity's state machine at a fixed rate, and
//! broadcasts full state snapshots to all connected clients.
//!
//! ## Core Responsibilities
//!
//! ### Authoritative Simulation
//! The server runs the only real version of the game. Players, enemies and
//! NPCs exist here; clients merely mirror what the snapshots tell them.
//! All combat, movement and dialogue decisions are made on the server.
//!
//! ### Session Management
//! Handles the complete lifecycle of client connections including:
//! - Admission, player creation and the `InitialState` handshake
//! - Capacity enforcement with an explicit refusal message
//! - Intent tracking where only the latest input per player counts
//! - Disconnection cleanup and `PlayerDisconnect` notification
//!
//! ### State Broadcasting
//! Every tick ends with a `GameStateUpdate` snapshot queued on each
//! connection's outbound channel. Clients reconcile their entity maps
//! against these snapshots.
//!
//! ## Architecture Design
//!
//! ### One Lock, Many Tasks
//! The entire authoritative state lives in a single `Session` behind one
//! async mutex. Each connection gets a reader task (which turns frames into
//! intents) and a writer task (which drains an unbounded queue onto the
//! socket). Reader critical sections are tiny writes; the tick loop holds
//! the lock only while simulating, never while sending.
//!
//! ### TCP-Based Communication
//! Clients connect over TCP and exchange length-prefixed frames. Any
//! transport fault is treated as a dead peer: the connection is dropped and
//! the player removed, with no partial-failure states in between.
//!
//! ### Tick Pipeline
//! Each tick applies the freshest intents, steps players in id order,
//! resolves attack and interaction requests, advances enemy AI and NPC
//! behavior, and finally snapshots the world. Static geometry is queried
//! through a quadtree so collision work stays proportional to what is
//! nearby.
//!
//! ## Module Organization
//!
//! - **`session`**: the player registry, per-connection outbound queues and
//!   capacity rules
//! - **`game`**: the per-tick simulation step tying players, combat and
//!   NPCs together
//! - **`network`**: the TCP listener, per-connection tasks and the tick loop
//! - **`combat_manager`**: enemy spawning, AI stepping and damage
//!   resolution in both directions
//! - **`npc_manager`**: villager spawning, wandering and dialogue
//! - **`world`**: procedural kingdom generation and static collision
//!   geometry
//! - **`quadtree`**: the spatial index over that geometry
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use server::network::Server;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Bind to an address, simulate at 60Hz, allow 3 clients, stay
//!     // headless, and scatter 600 enemies across the overworld.
//!     let mut server = Server::new("127.0.0.1", 5555, 60, 3, false, 600).await?;
//!
//!     // Runs the accept loop and the tick loop until the process stops.
//!     server.run().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod combat_manager;
pub mod game;
pub mod network;
pub mod npc_manager;
pub mod quadtree;
pub mod session;
pub mod world;
