use log::{info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use shared::anim::AssetTable;
use shared::enemy::{Enemy, EnemyKind};
use shared::math::Vec2;
use shared::npc::Npc;
use shared::player::Player;
use shared::protocol::{EnemySnapshot, Message, NpcSnapshot, PlayerSnapshot};
use std::collections::HashMap;

///Client-side mirror of the authoritative world. Entities are created,
///updated and discarded purely from server snapshots: anything the latest
///snapshot doesn't mention no longer exists.
pub struct ClientGame {
    pub local_id: u32,
    pub players: HashMap<u32, Player>,
    pub enemies: HashMap<u32, Enemy>,
    pub npcs: HashMap<u32, Npc>,
    assets: AssetTable,
    rng: StdRng,
}

impl ClientGame {
    pub fn new() -> ClientGame {
        ClientGame {
            local_id: 0,
            players: HashMap::new(),
            enemies: HashMap::new(),
            npcs: HashMap::new(),
            assets: AssetTable::default(),
            rng: StdRng::from_entropy(),
        }
    }

    pub fn handle_message(&mut self, message: Message) {
        match message {
            Message::InitialState {
                your_id,
                players,
                enemies,
                npcs,
            } => {
                self.local_id = your_id;
                self.players.clear();
                self.enemies.clear();
                self.npcs.clear();
                self.apply_update(&players, &enemies, &npcs);
                info!(
                    "Joined as player {} ({} players, {} enemies, {} npcs)",
                    your_id,
                    self.players.len(),
                    self.enemies.len(),
                    self.npcs.len()
                );
            }
            Message::GameStateUpdate {
                players,
                enemies,
                npcs,
            } => {
                self.apply_update(&players, &enemies, &npcs);
            }
            Message::PlayerDisconnect { id } => {
                if self.players.remove(&id).is_some() {
                    info!("Player {} left", id);
                }
            }
            Message::Error { message } => {
                warn!("Server error: {}", message);
            }
            Message::PlayerInput { .. } => {
                warn!("Ignoring client-bound message of the wrong direction");
            }
        }
    }

    ///Reconciles the mirrors against one snapshot: update entities the
    ///server reported, create the ones it introduced, drop the ones it
    ///stopped mentioning. A snapshot entry that can't be constructed (an
    ///unknown kind, a missing frame table) is skipped with a warning
    ///rather than poisoning the rest of the update.
    pub fn apply_update(
        &mut self,
        players: &HashMap<u32, PlayerSnapshot>,
        enemies: &HashMap<u32, EnemySnapshot>,
        npcs: &HashMap<u32, NpcSnapshot>,
    ) {
        for (id, snap) in players {
            match self.players.get_mut(id) {
                Some(player) => player.apply_snapshot(snap),
                None => {
                    let frames = match self.assets.get("player") {
                        Some(frames) => frames.clone(),
                        None => {
                            warn!("No animation table for players; skipping {}", id);
                            continue;
                        }
                    };
                    let mut player = Player::new(*id, Vec2::new(snap.x, snap.y), frames);
                    player.apply_snapshot(snap);
                    self.players.insert(*id, player);
                }
            }
        }
        self.players.retain(|id, _| players.contains_key(id));

        for (id, snap) in enemies {
            match self.enemies.get_mut(id) {
                Some(enemy) => enemy.apply_snapshot(snap),
                None => {
                    let kind = match EnemyKind::parse(&snap.kind) {
                        Some(kind) => kind,
                        None => {
                            warn!("Unknown enemy kind '{}' for id {}", snap.kind, id);
                            continue;
                        }
                    };
                    let frames = match self.assets.get(kind.as_str()) {
                        Some(frames) => frames.clone(),
                        None => {
                            warn!("No animation table for '{}'; skipping {}", snap.kind, id);
                            continue;
                        }
                    };
                    let mut enemy = Enemy::new(
                        *id,
                        kind,
                        Vec2::new(snap.x, snap.y),
                        frames,
                        &mut self.rng,
                    );
                    enemy.apply_snapshot(snap);
                    self.enemies.insert(*id, enemy);
                }
            }
        }
        self.enemies.retain(|id, _| enemies.contains_key(id));

        for (id, snap) in npcs {
            match self.npcs.get_mut(id) {
                Some(npc) => npc.apply_snapshot(snap),
                None => {
                    let frames = match self.assets.get(&snap.kind) {
                        Some(frames) => frames.clone(),
                        None => {
                            warn!("No animation table for '{}'; skipping {}", snap.kind, id);
                            continue;
                        }
                    };
                    let mut npc = Npc::new(
                        *id,
                        Vec2::new(snap.x, snap.y),
                        Vec::new(),
                        frames,
                        &mut self.rng,
                    );
                    npc.apply_snapshot(snap);
                    self.npcs.insert(*id, npc);
                }
            }
        }
        self.npcs.retain(|id, _| npcs.contains_key(id));
    }

    pub fn local_player(&self) -> Option<&Player> {
        self.players.get(&self.local_id)
    }
}
