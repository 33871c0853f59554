use crate::anim::AnimKind;
use crate::math::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

///NPC behavior state, carried on the wire so mirrors can render talking
///NPCs standing still.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NpcState {
    Idle,
    Wander,
    Talking,
}

///Everything a client needs to create or update a player mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub max_health: f32,
    pub facing_right: bool,
    pub anim: AnimKind,
    pub anim_frame: u32,
    pub anim_finished: bool,
    pub is_dead: bool,
    pub is_invulnerable: bool,
    pub is_attacking: bool,
    pub defense: f32,
    pub agility: f32,
}

///Enemy mirror record. `kind` names the enemy class so a client that has
///never seen this id can construct the right mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemySnapshot {
    pub id: u32,
    pub kind: String,
    pub x: f32,
    pub y: f32,
    pub health: f32,
    pub max_health: f32,
    pub facing_right: bool,
    pub anim: AnimKind,
    pub anim_frame: u32,
    pub anim_finished: bool,
    pub is_dead: bool,
    pub is_invulnerable: bool,
    pub is_attacking: bool,
    pub dialogue_text: Option<String>,
    pub dialogue_timer: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NpcSnapshot {
    pub id: u32,
    pub kind: String,
    pub name: String,
    pub x: f32,
    pub y: f32,
    pub facing_right: bool,
    pub state: NpcState,
    pub anim: AnimKind,
    pub anim_frame: u32,
    pub dialogue_line: Option<String>,
    pub talking_to: Option<u32>,
}

///Every message that crosses the wire, in either direction. The variant
///is the message's type discriminator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    ///Handshake payload sent once after admission.
    InitialState {
        your_id: u32,
        players: HashMap<u32, PlayerSnapshot>,
        enemies: HashMap<u32, EnemySnapshot>,
        npcs: HashMap<u32, NpcSnapshot>,
    },
    ///Client → server intent. The server keeps only the latest.
    PlayerInput {
        move_vector: Vec2,
        attack: bool,
        interact: bool,
    },
    ///Full authoritative snapshot, broadcast every tick.
    GameStateUpdate {
        players: HashMap<u32, PlayerSnapshot>,
        enemies: HashMap<u32, EnemySnapshot>,
        npcs: HashMap<u32, NpcSnapshot>,
    },
    PlayerDisconnect {
        id: u32,
    },
    ///Sent before the server closes a connection it will not serve.
    Error {
        message: String,
    },
}
