//! # Game Client Library
//!
//! This library provides the client-side implementation for the networked
//! multiplayer game. It connects to the authoritative server, feeds it a
//! stream of inputs, and maintains a local mirror of the world built
//! entirely from server snapshots.
//!
//! ## Architecture Overview
//!
//! The client never simulates gameplay. Movement, combat and dialogue are
//! all decided on the server; the client's job is to keep an accurate copy
//! of what the server last said and to report what the player wants to do.
//!
//! ### Snapshot Reconciliation
//! Every `GameStateUpdate` carries the complete set of live entities. The
//! client updates the mirrors it has, creates the ones it lacks, and drops
//! everything the snapshot no longer mentions. An entity missing from one
//! snapshot is gone, not stale.
//!
//! ### Fault Containment
//! A snapshot entry the client can't make sense of (an enemy kind this
//! build doesn't know, an animation table that isn't registered) is skipped
//! with a warning. One bad entry never takes down the rest of the update,
//! and a dead connection simply ends the session.
//!
//! ## Module Organization
//!
//! ### Game Module (`game`)
//! The mirror world: entity maps keyed by server id, snapshot application,
//! and the set-difference reconciliation described above.
//!
//! ### Controller Module (`controller`)
//! Input sources for a headless client: stand still, or walk a slowly
//! turning patrol. Each sample becomes one `PlayerInput` message.
//!
//! ### Network Module (`network`)
//! Connection establishment, the `InitialState` handshake, the framed
//! read loop, and the task that ships sampled inputs on a fixed cadence.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use client::controller::Controller;
//! use client::network::Client;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect, shake hands, then mirror the world until the server
//!     // goes away.
//!     let client = Client::connect("127.0.0.1:5555", Controller::wander()).await?;
//!     client.run().await?;
//!     Ok(())
//! }
//! ```

pub mod controller;
pub mod game;
pub mod network;
