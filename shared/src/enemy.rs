use crate::anim::{AnimKind, Animator, FrameTable};
use crate::combat::effective_damage;
use crate::math::{Rect, Vec2};
use crate::player::Player;
use crate::protocol::EnemySnapshot;
use crate::{DIALOGUE_DEFAULT_SECS, ENEMY_INVULNERABILITY_SECS, ENEMY_MAX_AGILITY, ENEMY_MAX_DEFENSE};
use rand::Rng;
use std::collections::HashMap;
use std::f32::consts::TAU;

///Behavior state for the server-side AI. Not sent over the wire; clients
///only see the resulting animation and position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyState {
    Idle,
    Wander,
    Chasing,
    Returning,
    Attacking,
    Hurt,
    Dead,
}

///The closed set of enemy kinds. Snapshots carry the kind as a string so
///clients can reconstruct mirrors; unknown strings are rejected at the
///reconciliation boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnemyKind {
    SwordOrc,
}

///Per-kind stat template, resolved once at construction.
#[derive(Debug, Clone, Copy)]
pub struct EnemyStats {
    pub max_health: f32,
    pub speed: f32,
    pub attack_power: f32,
    pub attack_range: f32,
    pub attack_buffer: f32,
    pub attack_cooldown: f32,
    pub detection_radius: f32,
    pub wander_radius: f32,
    pub wander_pause_min: f32,
    pub wander_pause_max: f32,
    pub chase_timeout: f32,
    pub defense: f32,
    pub agility: f32,
    pub hit_frame: usize,
    pub greeting: Option<&'static str>,
}

impl EnemyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EnemyKind::SwordOrc => "sword_orc",
        }
    }

    pub fn parse(name: &str) -> Option<EnemyKind> {
        match name {
            "sword_orc" => Some(EnemyKind::SwordOrc),
            _ => None,
        }
    }

    pub fn stats(self) -> EnemyStats {
        match self {
            EnemyKind::SwordOrc => EnemyStats {
                max_health: 75.0,
                speed: 2.5,
                attack_power: 22.0,
                attack_range: 35.0,
                attack_buffer: 5.0,
                attack_cooldown: 1.5,
                detection_radius: 250.0,
                wander_radius: 100.0,
                wander_pause_min: 2.0,
                wander_pause_max: 5.0,
                chase_timeout: 8.0,
                defense: 0.10,
                agility: 0.05,
                hit_frame: 3,
                greeting: Some("Meat?"),
            },
        }
    }
}

fn arrival_epsilon_sq(speed: f32, dt: f32) -> f32 {
    let eps = speed * dt * 10.0;
    eps * eps
}

///A server-authoritative enemy. Clients hold the same struct as a mirror
///but never call `update` on it.
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Vec2,
    pub spawn: Vec2,
    pub radius: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    pub attack_power: f32,
    pub attack_range: f32,
    attack_trigger_range_sq: f32,
    stopping_range_sq: f32,
    pub attack_cooldown: f32,
    pub attack_cooldown_timer: f32,
    detection_radius_sq: f32,
    pub defense: f32,
    pub agility: f32,
    pub state: EnemyState,
    pub target_id: Option<u32>,
    target_position: Option<Vec2>,
    wander_radius: f32,
    wander_timer: f32,
    chase_timeout: f32,
    chase_timer: f32,
    pub facing_right: bool,
    pub last_direction: Vec2,
    pub animator: Animator,
    pub frames: FrameTable,
    hit_frame: usize,
    hit_triggered_this_cycle: bool,
    pub is_dead: bool,
    pub is_attacking: bool,
    pub is_invulnerable: bool,
    invulnerability_timer: f32,
    said_greeting: bool,
    pub dialogue_text: Option<String>,
    pub dialogue_timer: f32,
}

impl Enemy {
    pub fn new<R: Rng>(id: u32, kind: EnemyKind, pos: Vec2, frames: FrameTable, rng: &mut R) -> Enemy {
        let stats = kind.stats();
        let stopping_range = (stats.attack_range - stats.attack_buffer).max(5.0);
        Enemy {
            id,
            kind,
            pos,
            spawn: pos,
            radius: frames.sprite_w / 4.0,
            health: stats.max_health,
            max_health: stats.max_health,
            speed: stats.speed,
            attack_power: stats.attack_power,
            attack_range: stats.attack_range,
            attack_trigger_range_sq: stats.attack_range * stats.attack_range,
            stopping_range_sq: stopping_range * stopping_range,
            attack_cooldown: stats.attack_cooldown,
            attack_cooldown_timer: 0.0,
            detection_radius_sq: stats.detection_radius * stats.detection_radius,
            defense: stats.defense.clamp(0.0, ENEMY_MAX_DEFENSE),
            agility: stats.agility.clamp(0.0, ENEMY_MAX_AGILITY),
            state: EnemyState::Idle,
            target_id: None,
            target_position: None,
            wander_radius: stats.wander_radius,
            wander_timer: rng.gen_range(stats.wander_pause_min..stats.wander_pause_max),
            chase_timeout: stats.chase_timeout,
            chase_timer: 0.0,
            facing_right: true,
            last_direction: Vec2::new(1.0, 0.0),
            animator: Animator::new(AnimKind::Idle),
            hit_frame: stats.hit_frame.min(frames.attack.saturating_sub(1)),
            frames,
            hit_triggered_this_cycle: false,
            is_dead: false,
            is_attacking: false,
            is_invulnerable: false,
            invulnerability_timer: 0.0,
            said_greeting: false,
            dialogue_text: None,
            dialogue_timer: 0.0,
        }
    }

    pub fn collider(&self) -> Rect {
        Rect::from_center(self.pos, self.radius)
    }

    pub fn set_dialogue(&mut self, text: &str, duration: f32) {
        self.dialogue_text = Some(text.to_string());
        self.dialogue_timer = duration;
    }

    ///Applies incoming damage after defense. A non-fatal hit interrupts
    ///whatever the enemy was doing and grants a short invulnerability
    ///window; a fatal one drops it into the terminal Dead state.
    pub fn take_damage(&mut self, raw: f32) -> i32 {
        if self.is_dead || self.is_invulnerable {
            return 0;
        }

        let dealt = effective_damage(raw, self.defense, ENEMY_MAX_DEFENSE);
        self.health -= dealt as f32;

        if self.health <= 0.0 {
            self.health = 0.0;
            if !self.is_dead {
                self.is_dead = true;
                self.state = EnemyState::Dead;
                self.animator.set(AnimKind::Death);
                self.is_attacking = false;
                self.target_id = None;
                self.target_position = None;
            }
        } else {
            self.state = EnemyState::Hurt;
            self.animator.set(AnimKind::Hurt);
            self.is_attacking = false;
            self.is_invulnerable = true;
            self.invulnerability_timer = ENEMY_INVULNERABILITY_SECS;
        }
        dealt
    }

    ///One authoritative AI step. Returns true when the attack animation
    ///crossed its hit frame this tick; the caller resolves the damage so
    ///this update never touches other entities.
    pub fn update<R: Rng>(
        &mut self,
        players: &HashMap<u32, Player>,
        dt: f32,
        colliders: &[Rect],
        world_width: f32,
        world_height: f32,
        rng: &mut R,
    ) -> bool {
        let state_before = self.state;
        let stats = self.kind.stats();

        self.attack_cooldown_timer = (self.attack_cooldown_timer - dt).max(0.0);
        self.wander_timer = (self.wander_timer - dt).max(0.0);
        if self.is_invulnerable {
            self.invulnerability_timer -= dt;
            if self.invulnerability_timer <= 0.0 {
                self.is_invulnerable = false;
            }
        }
        if self.dialogue_timer > 0.0 {
            self.dialogue_timer -= dt;
            if self.dialogue_timer <= 0.0 {
                self.dialogue_text = None;
            }
        }

        if self.is_dead {
            self.state = EnemyState::Dead;
        }

        // Targeting and state transitions. Skipped while dead or while the
        // hurt animation is still playing.
        let hurt_playing = self.state == EnemyState::Hurt && !self.animator.finished;
        if self.state != EnemyState::Dead && !hurt_playing {
            let mut best: Option<(u32, Vec2)> = None;
            let mut best_dist_sq = self.detection_radius_sq;
            for (id, player) in players {
                if player.is_dead {
                    continue;
                }
                let dist_sq = self.pos.distance_squared(player.pos);
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    best = Some((*id, player.pos));
                }
            }
            self.target_id = best.map(|(id, _)| id);

            if let Some((_, target_pos)) = best {
                self.chase_timer = self.chase_timeout;

                if best_dist_sq < self.attack_trigger_range_sq && self.attack_cooldown_timer <= 0.0
                {
                    if self.state != EnemyState::Hurt {
                        self.state = EnemyState::Attacking;
                        self.target_position = None;
                    }
                } else if !matches!(self.state, EnemyState::Attacking | EnemyState::Hurt) {
                    self.state = EnemyState::Chasing;
                    self.target_position = if best_dist_sq > self.stopping_range_sq {
                        Some(target_pos)
                    } else {
                        None
                    };
                }
            } else {
                match self.state {
                    EnemyState::Chasing | EnemyState::Attacking => {
                        self.chase_timer -= dt;
                        if self.chase_timer <= 0.0 {
                            self.state = EnemyState::Returning;
                            self.target_position = Some(self.spawn);
                        }
                    }
                    EnemyState::Returning => {
                        if self.pos.distance_squared(self.spawn) < arrival_epsilon_sq(self.speed, dt)
                        {
                            self.state = EnemyState::Idle;
                            self.target_position = None;
                        } else {
                            self.target_position = Some(self.spawn);
                        }
                    }
                    EnemyState::Wander => {
                        if self.target_position.is_none() || self.wander_timer <= 0.0 {
                            self.state = EnemyState::Idle;
                            self.wander_timer =
                                rng.gen_range(stats.wander_pause_min..stats.wander_pause_max);
                        } else if let Some(target) = self.target_position {
                            if self.pos.distance_squared(target)
                                < arrival_epsilon_sq(self.speed, dt)
                            {
                                self.state = EnemyState::Idle;
                                self.target_position = None;
                                self.wander_timer =
                                    rng.gen_range(stats.wander_pause_min..stats.wander_pause_max);
                            }
                        }
                    }
                    EnemyState::Idle => {
                        if self.wander_timer <= 0.0 {
                            let angle = rng.gen_range(0.0..TAU);
                            let dist = rng.gen_range(0.0..self.wander_radius);
                            let cap = self.wander_radius * 1.5;
                            let target = Vec2::new(
                                (self.spawn.x + dist * angle.cos())
                                    .clamp(self.spawn.x - cap, self.spawn.x + cap),
                                (self.spawn.y + dist * angle.sin())
                                    .clamp(self.spawn.y - cap, self.spawn.y + cap),
                            );
                            self.target_position = Some(target);
                            self.state = EnemyState::Wander;
                        }
                    }
                    _ => {}
                }
            }
        }

        // Movement intent from the current state.
        let mut should_move = false;
        match self.state {
            EnemyState::Wander | EnemyState::Returning => {
                if let Some(target) = self.target_position {
                    if self.pos.distance_squared(target) > arrival_epsilon_sq(self.speed, dt) {
                        should_move = true;
                    }
                }
            }
            EnemyState::Chasing => {
                if let Some(target) = self.target_id.and_then(|id| players.get(&id)) {
                    let to_player = target.pos.sub(self.pos);
                    let dist_sq = to_player.length_squared();
                    if dist_sq > self.stopping_range_sq {
                        should_move = true;
                        self.target_position = Some(target.pos);
                    } else {
                        // In reach: hold position but keep facing the target.
                        self.target_position = None;
                        if dist_sq > 1.0 {
                            let dir = to_player.normalized();
                            self.last_direction = dir;
                            self.facing_right = dir.x >= 0.0;
                        }
                    }
                }
            }
            _ => {}
        }

        let mut move_vector = Vec2::ZERO;
        if should_move {
            if let Some(target) = self.target_position {
                let direction = target.sub(self.pos);
                if direction.length_squared() > 1.0 {
                    move_vector = direction.normalized();
                    self.last_direction = move_vector;
                    self.facing_right = move_vector.x >= 0.0;
                }
            }
        }

        let base = if move_vector.length_squared() > 0.0 {
            AnimKind::Walk
        } else {
            AnimKind::Idle
        };

        // Animation state machine.
        let kind_before = self.animator.kind;
        match self.state {
            EnemyState::Dead => {
                if self.animator.kind != AnimKind::Death {
                    self.animator.set(AnimKind::Death);
                    self.is_attacking = false;
                }
            }
            EnemyState::Hurt => {
                if !matches!(self.animator.kind, AnimKind::Hurt | AnimKind::Death) {
                    self.animator.set(AnimKind::Hurt);
                    self.is_attacking = false;
                } else if self.animator.kind == AnimKind::Hurt && self.animator.finished {
                    // Recovered: re-evaluate against the (already refreshed)
                    // target.
                    if let Some(target) = self.target_id.and_then(|id| players.get(&id)) {
                        let dist_sq = self.pos.distance_squared(target.pos);
                        if dist_sq < self.attack_trigger_range_sq
                            && self.attack_cooldown_timer <= 0.0
                        {
                            self.state = EnemyState::Attacking;
                            self.animator.set(AnimKind::Attack);
                            self.is_attacking = true;
                            self.hit_triggered_this_cycle = false;
                        } else {
                            self.state = EnemyState::Chasing;
                            self.animator.set(if dist_sq > self.stopping_range_sq {
                                AnimKind::Walk
                            } else {
                                AnimKind::Idle
                            });
                        }
                    } else {
                        self.state = EnemyState::Idle;
                        self.animator.set(AnimKind::Idle);
                    }
                }
            }
            EnemyState::Attacking => {
                if self.animator.kind.is_interruptible() {
                    self.animator.set(AnimKind::Attack);
                    self.is_attacking = true;
                    self.hit_triggered_this_cycle = false;
                } else if self.animator.kind == AnimKind::Attack && self.animator.finished {
                    // Swing over: cooldown restarts, then fall back to
                    // chasing or idling depending on the target.
                    self.is_attacking = false;
                    self.attack_cooldown_timer = self.attack_cooldown;
                    if let Some(target) = self.target_id.and_then(|id| players.get(&id)) {
                        let dist_sq = self.pos.distance_squared(target.pos);
                        self.state = EnemyState::Chasing;
                        self.animator.set(if dist_sq > self.stopping_range_sq {
                            AnimKind::Walk
                        } else {
                            AnimKind::Idle
                        });
                    } else {
                        self.state = EnemyState::Idle;
                        self.animator.set(AnimKind::Idle);
                    }
                }
            }
            _ => {
                if self.animator.finished || self.animator.kind.is_interruptible() {
                    self.animator.set(base);
                }
            }
        }

        if kind_before == AnimKind::Attack && self.animator.kind != AnimKind::Attack {
            self.is_attacking = false;
            self.hit_triggered_this_cycle = false;
        }
        if self.animator.kind != AnimKind::Attack && self.is_attacking {
            self.is_attacking = false;
        }
        if self.animator.kind == AnimKind::Attack && !self.is_attacking && !self.animator.finished {
            self.is_attacking = true;
        }

        // Frame advance with hit-frame crossing detection.
        let mut triggered_hit = false;
        let frame_before = self.animator.frame;
        if self.animator.advance(dt, &self.frames).is_some()
            && self.animator.kind == AnimKind::Attack
            && self.is_attacking
            && !self.hit_triggered_this_cycle
            && self.animator.frame >= self.hit_frame
            && frame_before < self.hit_frame
        {
            self.hit_triggered_this_cycle = true;
            triggered_hit = true;
        }
        if self.animator.kind == AnimKind::Attack && self.animator.finished {
            self.hit_triggered_this_cycle = false;
        }

        // Movement application with axis-separated collision.
        let can_move = (self.animator.kind.is_interruptible()
            || (self.animator.kind == AnimKind::Attack && self.animator.finished))
            && !self.is_dead
            && move_vector.length_squared() > 0.0;

        if can_move {
            let delta = move_vector.scale(self.speed * dt * 60.0);

            self.pos.x += delta.x;
            let rect = self.collider();
            for obstacle in colliders {
                if rect.intersects(obstacle) {
                    if delta.x > 0.0 {
                        self.pos.x = obstacle.left() - self.radius;
                    } else if delta.x < 0.0 {
                        self.pos.x = obstacle.right() + self.radius;
                    }
                    break;
                }
            }

            self.pos.y += delta.y;
            let rect = self.collider();
            for obstacle in colliders {
                if rect.intersects(obstacle) {
                    if delta.y > 0.0 {
                        self.pos.y = obstacle.top() - self.radius;
                    } else if delta.y < 0.0 {
                        self.pos.y = obstacle.bottom() + self.radius;
                    }
                    break;
                }
            }

            self.pos.x = self.pos.x.clamp(self.radius, world_width - self.radius);
            self.pos.y = self.pos.y.clamp(self.radius, world_height - self.radius);
        }

        // Greeting bark on first entering a hostile state.
        let hostile = matches!(self.state, EnemyState::Chasing | EnemyState::Attacking);
        let was_hostile = matches!(state_before, EnemyState::Chasing | EnemyState::Attacking);
        if self.target_id.is_some() && hostile && !was_hostile && !self.said_greeting {
            if let Some(line) = stats.greeting {
                self.set_dialogue(line, DIALOGUE_DEFAULT_SECS);
            }
            self.said_greeting = true;
        } else if self.target_id.is_none() && !hostile {
            self.said_greeting = false;
        }

        triggered_hit
    }

    pub fn snapshot(&self) -> EnemySnapshot {
        EnemySnapshot {
            id: self.id,
            kind: self.kind.as_str().to_string(),
            x: self.pos.x,
            y: self.pos.y,
            health: self.health,
            max_health: self.max_health,
            facing_right: self.facing_right,
            anim: self.animator.kind,
            anim_frame: self.animator.frame as u32,
            anim_finished: self.animator.finished,
            is_dead: self.is_dead,
            is_invulnerable: self.is_invulnerable,
            is_attacking: self.is_attacking,
            dialogue_text: self.dialogue_text.clone(),
            dialogue_timer: self.dialogue_timer,
        }
    }

    pub fn apply_snapshot(&mut self, snap: &EnemySnapshot) {
        self.pos = Vec2::new(snap.x, snap.y);
        self.health = snap.health;
        self.max_health = snap.max_health;
        self.facing_right = snap.facing_right;
        self.is_dead = snap.is_dead;
        self.is_invulnerable = snap.is_invulnerable;
        self.is_attacking = snap.is_attacking;
        self.dialogue_text = snap.dialogue_text.clone();
        self.dialogue_timer = snap.dialogue_timer;
        self.animator.set(snap.anim);
        self.animator.frame = snap.anim_frame as usize;
        self.animator.finished = snap.anim_finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anim::AssetTable;
    use crate::{WORLD_HEIGHT, WORLD_WIDTH};
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn orc_at(pos: Vec2, rng: &mut StdRng) -> Enemy {
        let assets = AssetTable::default();
        let frames = assets.get("sword_orc").unwrap().clone();
        Enemy::new(0, EnemyKind::SwordOrc, pos, frames, rng)
    }

    fn player_at(id: u32, pos: Vec2) -> Player {
        let assets = AssetTable::default();
        let frames = assets.get("player").unwrap().clone();
        Player::new(id, pos, frames)
    }

    fn players_at(positions: &[(u32, Vec2)]) -> HashMap<u32, Player> {
        positions
            .iter()
            .map(|(id, pos)| (*id, player_at(*id, *pos)))
            .collect()
    }

    fn step(enemy: &mut Enemy, players: &HashMap<u32, Player>, dt: f32, rng: &mut StdRng) -> bool {
        enemy.update(players, dt, &[], WORLD_WIDTH, WORLD_HEIGHT, rng)
    }

    #[test]
    fn test_spawn_defaults() {
        let mut rng = StdRng::seed_from_u64(1);
        let orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        assert_eq!(orc.state, EnemyState::Idle);
        assert_approx_eq!(orc.health, 75.0);
        assert_approx_eq!(orc.radius, 16.0);
        assert_eq!(orc.kind.as_str(), "sword_orc");
        assert!(!orc.is_dead);
    }

    #[test]
    fn test_kind_parse_round_trip() {
        assert_eq!(EnemyKind::parse("sword_orc"), Some(EnemyKind::SwordOrc));
        assert_eq!(EnemyKind::parse("lich_king"), None);
    }

    #[test]
    fn test_acquires_player_inside_detection_radius() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(7, Vec2::new(800.0, 1000.0))]);

        step(&mut orc, &players, 1.0 / 60.0, &mut rng);

        assert_eq!(orc.target_id, Some(7));
        assert_eq!(orc.state, EnemyState::Chasing);
        assert!(!orc.facing_right);
    }

    #[test]
    fn test_ignores_player_outside_detection_radius() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(7, Vec2::new(1300.0, 1000.0))]);

        step(&mut orc, &players, 1.0 / 60.0, &mut rng);

        assert_eq!(orc.target_id, None);
        assert_ne!(orc.state, EnemyState::Chasing);
    }

    #[test]
    fn test_ignores_dead_players() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let mut players = players_at(&[(7, Vec2::new(900.0, 1000.0))]);
        players.get_mut(&7).unwrap().is_dead = true;

        step(&mut orc, &players, 1.0 / 60.0, &mut rng);

        assert_eq!(orc.target_id, None);
    }

    #[test]
    fn test_attacks_only_inside_trigger_range() {
        let mut rng = StdRng::seed_from_u64(5);

        // 36 px away: outside the 35 px trigger, enemy keeps chasing.
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(1, Vec2::new(1036.0, 1000.0))]);
        step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        assert_eq!(orc.state, EnemyState::Chasing);
        assert!(!orc.is_attacking);

        // 30 px away: inside the trigger, swing starts.
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(1, Vec2::new(1030.0, 1000.0))]);
        step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        assert_eq!(orc.state, EnemyState::Attacking);
        assert!(orc.is_attacking);
        assert_eq!(orc.animator.kind, AnimKind::Attack);
    }

    #[test]
    fn test_holds_position_inside_stopping_range_on_cooldown() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        orc.attack_cooldown_timer = 10.0;
        let players = players_at(&[(1, Vec2::new(1028.0, 1000.0))]);

        step(&mut orc, &players, 1.0 / 60.0, &mut rng);

        // Inside stopping range (30) but the swing is gated by cooldown:
        // stand still and face the target.
        assert_eq!(orc.state, EnemyState::Chasing);
        assert_approx_eq!(orc.pos.x, 1000.0);
        assert!(orc.facing_right);
    }

    #[test]
    fn test_chases_toward_target() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(1, Vec2::new(1200.0, 1000.0))]);

        // Two ticks: the first acquires the target, the second walks.
        step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        step(&mut orc, &players, 1.0 / 60.0, &mut rng);

        assert!(orc.pos.x > 1000.0);
        assert!(orc.facing_right);
        assert_eq!(orc.animator.kind, AnimKind::Walk);
    }

    #[test]
    fn test_hit_frame_fires_exactly_once_per_swing() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(1, Vec2::new(1020.0, 1000.0))]);

        // 200 ms steps advance one animation frame per tick. The swing is 6
        // frames with the hit on frame 3.
        let mut hits = 0;
        for _ in 0..8 {
            if step(&mut orc, &players, 0.2, &mut rng) {
                hits += 1;
            }
        }
        assert_eq!(hits, 1);
        // Cooldown restarted when the swing ended.
        assert!(orc.attack_cooldown_timer > 0.0);
        assert!(!orc.is_attacking);
    }

    #[test]
    fn test_gives_up_chase_and_returns_to_spawn() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(1, Vec2::new(1150.0, 1000.0))]);

        // Chase until the orc closes to stopping range, well away from
        // spawn. A blocked cooldown keeps it from switching to Attacking.
        orc.attack_cooldown_timer = 1000.0;
        for _ in 0..60 {
            step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        }
        assert_eq!(orc.state, EnemyState::Chasing);
        assert!(orc.pos.x > 1100.0);

        // Target gone: the chase timer decays for 8 s (33 quarter-second
        // ticks), then the orc heads home.
        let empty = HashMap::new();
        for _ in 0..33 {
            step(&mut orc, &empty, 0.25, &mut rng);
        }
        assert_eq!(orc.state, EnemyState::Returning);

        for _ in 0..40 {
            step(&mut orc, &empty, 0.25, &mut rng);
        }
        let dist_sq = orc.pos.distance_squared(orc.spawn);
        assert!(
            dist_sq < (orc.wander_radius * 1.6) * (orc.wander_radius * 1.6),
            "orc ended up {} units from spawn",
            dist_sq.sqrt()
        );
    }

    #[test]
    fn test_wander_stays_near_spawn() {
        let mut rng = StdRng::seed_from_u64(10);
        let spawn = Vec2::new(5000.0, 5000.0);
        let mut orc = orc_at(spawn, &mut rng);
        let empty = HashMap::new();

        let limit = orc.wander_radius * 1.5 + orc.speed * 0.1 * 60.0;
        for _ in 0..2000 {
            step(&mut orc, &empty, 0.1, &mut rng);
            let dist = orc.pos.distance_squared(spawn).sqrt();
            assert!(dist <= limit, "wandered {} units from spawn", dist);
        }
    }

    #[test]
    fn test_greeting_fires_once_per_engagement() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(1, Vec2::new(1100.0, 1000.0))]);

        step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        assert_eq!(orc.dialogue_text.as_deref(), Some("Meat?"));
        assert_approx_eq!(orc.dialogue_timer, DIALOGUE_DEFAULT_SECS);

        // The bark expires; staying engaged must not repeat it.
        for _ in 0..200 {
            step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        }
        assert_eq!(orc.dialogue_text, None);
    }

    #[test]
    fn test_damage_applies_defense_and_hurt_state() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);

        // 15 raw into 10% defense -> 13.5 -> 14.
        let dealt = orc.take_damage(15.0);
        assert_eq!(dealt, 14);
        assert_approx_eq!(orc.health, 61.0);
        assert_eq!(orc.state, EnemyState::Hurt);
        assert_eq!(orc.animator.kind, AnimKind::Hurt);
        assert!(orc.is_invulnerable);

        // Invulnerability window swallows the follow-up.
        assert_eq!(orc.take_damage(15.0), 0);
        assert_approx_eq!(orc.health, 61.0);
    }

    #[test]
    fn test_death_is_terminal() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        orc.take_damage(1000.0);
        assert!(orc.is_dead);
        assert_approx_eq!(orc.health, 0.0);
        assert_eq!(orc.state, EnemyState::Dead);
        assert_eq!(orc.target_id, None);

        // Dead enemies never retarget, move, or attack.
        let players = players_at(&[(1, Vec2::new(1010.0, 1000.0))]);
        for _ in 0..20 {
            let hit = step(&mut orc, &players, 0.2, &mut rng);
            assert!(!hit);
        }
        assert_eq!(orc.state, EnemyState::Dead);
        assert_eq!(orc.target_id, None);
        assert_approx_eq!(orc.pos.x, 1000.0);
        // Death animation ran to its final frame and held.
        assert!(orc.animator.finished);
        assert_eq!(orc.animator.frame, orc.frames.death - 1);
    }

    #[test]
    fn test_hurt_blocks_retargeting_until_animation_ends() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut orc = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        let players = players_at(&[(1, Vec2::new(1100.0, 1000.0))]);
        step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        let target_before = orc.target_id;

        orc.take_damage(10.0);
        assert_eq!(orc.state, EnemyState::Hurt);

        // While the hurt animation plays the target reference is frozen.
        step(&mut orc, &players, 1.0 / 60.0, &mut rng);
        assert_eq!(orc.state, EnemyState::Hurt);
        assert_eq!(orc.target_id, target_before);

        // Once it finishes (4 frames at 150 ms) the orc re-engages.
        for _ in 0..8 {
            step(&mut orc, &players, 0.2, &mut rng);
        }
        assert_eq!(orc.state, EnemyState::Chasing);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut source = orc_at(Vec2::new(1000.0, 1000.0), &mut rng);
        source.take_damage(15.0);
        source.set_dialogue("Meat?", 3.0);

        let mut mirror = orc_at(Vec2::new(0.0, 0.0), &mut rng);
        mirror.apply_snapshot(&source.snapshot());

        assert_approx_eq!(mirror.pos.x, 1000.0);
        assert_approx_eq!(mirror.health, source.health);
        assert_eq!(mirror.animator.kind, AnimKind::Hurt);
        assert_eq!(mirror.dialogue_text.as_deref(), Some("Meat?"));
        assert!(mirror.is_invulnerable);
    }
}
