use crate::combat_manager::CombatManager;
use crate::npc_manager::NpcManager;
use log::{debug, info};
use shared::anim::FrameTable;
use shared::math::Vec2;
use shared::player::Player;
use shared::protocol::{Message, PlayerSnapshot};
use shared::{KINGDOM_CENTER_X, KINGDOM_CENTER_Y, KINGDOM_RADIUS};
use std::collections::HashMap;
use tokio::sync::mpsc;

///The complete authoritative state for one running server: the player
///registry, the outbound queue per connection, and the enemy and NPC
///managers. The network layer wraps a `Session` in a single async mutex;
///everything in here assumes the caller already holds that lock.
pub struct Session {
    pub players: HashMap<u32, Player>,
    pub connections: HashMap<u32, mpsc::UnboundedSender<Message>>,
    pub combat: CombatManager,
    pub npcs: NpcManager,
    player_frames: FrameTable,
    next_player_id: u32,
    max_clients: usize,
}

impl Session {
    pub fn new(
        player_frames: FrameTable,
        combat: CombatManager,
        npcs: NpcManager,
        max_clients: usize,
    ) -> Session {
        Session {
            players: HashMap::new(),
            connections: HashMap::new(),
            combat,
            npcs,
            player_frames,
            next_player_id: 0,
            max_clients,
        }
    }

    ///Capacity counts connections, not players, so a local player never
    ///takes a slot away from a remote client.
    pub fn is_full(&self) -> bool {
        self.connections.len() >= self.max_clients
    }

    fn spawn_player(&mut self) -> u32 {
        let id = self.next_player_id;
        self.next_player_id += 1;

        // New players appear just east of the kingdom, fanned out so
        // simultaneous joiners don't stack on one point.
        let spawn = Vec2::new(
            KINGDOM_CENTER_X + KINGDOM_RADIUS + 200.0 + id as f32 * 50.0,
            KINGDOM_CENTER_Y,
        );
        self.players
            .insert(id, Player::new(id, spawn, self.player_frames.clone()));
        info!("Player {} joined at ({:.0}, {:.0})", id, spawn.x, spawn.y);
        id
    }

    ///Registers a remote client: creates their player, queues the handshake,
    ///and only then registers the sender. Queueing the handshake first means
    ///no broadcast can reach this client ahead of its `InitialState`.
    pub fn admit(&mut self, tx: mpsc::UnboundedSender<Message>) -> u32 {
        let id = self.spawn_player();
        let _ = tx.send(self.initial_state_for(id));
        self.connections.insert(id, tx);
        id
    }

    ///Creates a player with no connection attached, used when the server
    ///process itself participates in the simulation.
    pub fn spawn_local_player(&mut self) -> u32 {
        self.spawn_player()
    }

    ///Removes a player and their connection. Returns false when the id was
    ///already gone, so double disconnects stay silent.
    pub fn remove(&mut self, id: u32) -> bool {
        self.connections.remove(&id);
        self.players.remove(&id).is_some()
    }

    pub fn remove_and_notify(&mut self, id: u32) {
        if self.remove(id) {
            info!("Player {} disconnected", id);
            self.broadcast(Message::PlayerDisconnect { id });
        }
    }

    ///Stores the latest intent for a player. Only the most recent input
    ///counts; there is no queue.
    pub fn set_intent(&mut self, id: u32, move_vector: Vec2, attack: bool, interact: bool) {
        if let Some(player) = self.players.get_mut(&id) {
            player.set_move_intent(move_vector);
            player.attack_requested = attack;
            player.interact_requested = interact;
        }
    }

    ///Queues a message on every live connection, dropping the ones whose
    ///receiver has gone away.
    pub fn broadcast(&mut self, message: Message) {
        self.connections.retain(|id, tx| {
            if tx.send(message.clone()).is_err() {
                debug!("Dropping dead connection for player {}", id);
                false
            } else {
                true
            }
        });
    }

    ///Cloned sender handles, so the tick loop can queue the snapshot after
    ///releasing the session lock.
    pub fn sender_handles(&self) -> Vec<(u32, mpsc::UnboundedSender<Message>)> {
        self.connections
            .iter()
            .map(|(id, tx)| (*id, tx.clone()))
            .collect()
    }

    fn player_snapshots(&self) -> HashMap<u32, PlayerSnapshot> {
        self.players
            .iter()
            .map(|(id, player)| (*id, player.snapshot()))
            .collect()
    }

    pub fn snapshot_message(&self) -> Message {
        Message::GameStateUpdate {
            players: self.player_snapshots(),
            enemies: self.combat.enemy_snapshots(),
            npcs: self.npcs.npc_snapshots(),
        }
    }

    fn initial_state_for(&self, id: u32) -> Message {
        Message::InitialState {
            your_id: id,
            players: self.player_snapshots(),
            enemies: self.combat.enemy_snapshots(),
            npcs: self.npcs.npc_snapshots(),
        }
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}
