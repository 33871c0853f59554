pub const DEFAULT_PORT: u16 = 5555;
pub const MAX_CLIENTS: usize = 3;
pub const TICK_RATE: u32 = 60;
pub const MAX_TICK_DELTA: f32 = 0.1;

pub const WORLD_WIDTH: f32 = 20000.0;
pub const WORLD_HEIGHT: f32 = 20000.0;
pub const KINGDOM_CENTER_X: f32 = WORLD_WIDTH / 5.0;
pub const KINGDOM_CENTER_Y: f32 = WORLD_HEIGHT / 2.0;
pub const KINGDOM_RADIUS: f32 = 3000.0;

pub const PLAYER_RADIUS: f32 = 8.0;
pub const PLAYER_SPEED: f32 = 6.0;
pub const PLAYER_MAX_HEALTH: f32 = 100.0;
pub const PLAYER_HEALTH_REGEN: f32 = 0.05;
pub const PLAYER_ATTACK_RANGE: f32 = 45.0;
pub const PLAYER_ATTACK_POWER: f32 = 15.0;
pub const PLAYER_BASE_DEFENSE: f32 = 0.05;
pub const PLAYER_BASE_AGILITY: f32 = 0.08;
pub const PLAYER_MAX_DEFENSE: f32 = 0.90;
pub const PLAYER_MAX_AGILITY: f32 = 0.60;
pub const PLAYER_INVULNERABILITY_SECS: f32 = 0.5;

pub const ENEMY_MAX_DEFENSE: f32 = 0.90;
pub const ENEMY_MAX_AGILITY: f32 = 0.90;
pub const ENEMY_INVULNERABILITY_SECS: f32 = 0.3;
pub const DIALOGUE_DEFAULT_SECS: f32 = 3.0;
pub const SWORD_ORC_COUNT: usize = 600;

pub mod anim;
pub mod combat;
pub mod enemy;
pub mod math;
pub mod npc;
pub mod player;
pub mod protocol;
pub mod transport;
