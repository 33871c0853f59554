use crate::anim::{AnimKind, Animator, FrameTable};
use crate::combat::effective_damage;
use crate::math::{Rect, Vec2};
use crate::protocol::PlayerSnapshot;
use crate::{
    PLAYER_BASE_AGILITY, PLAYER_BASE_DEFENSE, PLAYER_HEALTH_REGEN, PLAYER_INVULNERABILITY_SECS,
    PLAYER_MAX_DEFENSE, PLAYER_MAX_HEALTH, PLAYER_RADIUS, PLAYER_SPEED,
};

///A player entity. On the server this is the authoritative state driven by
///the owning connection's intent; on the client it is a mirror overwritten
///by snapshots.
#[derive(Debug, Clone)]
pub struct Player {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub health: f32,
    pub max_health: f32,
    pub defense: f32,
    pub agility: f32,
    pub facing_right: bool,
    pub last_direction: Vec2,
    pub animator: Animator,
    pub frames: FrameTable,
    pub is_dead: bool,
    pub is_attacking: bool,
    pub is_invulnerable: bool,
    pub invulnerability_timer: f32,
    pub in_fight: bool,
    pub move_intent: Vec2,
    pub attack_requested: bool,
    pub interact_requested: bool,
}

impl Player {
    pub fn new(id: u32, pos: Vec2, frames: FrameTable) -> Player {
        Player {
            id,
            pos,
            radius: PLAYER_RADIUS,
            speed: PLAYER_SPEED,
            health: PLAYER_MAX_HEALTH,
            max_health: PLAYER_MAX_HEALTH,
            defense: PLAYER_BASE_DEFENSE,
            agility: PLAYER_BASE_AGILITY,
            facing_right: true,
            last_direction: Vec2::new(1.0, 0.0),
            animator: Animator::new(AnimKind::Idle),
            frames,
            is_dead: false,
            is_attacking: false,
            is_invulnerable: false,
            invulnerability_timer: 0.0,
            in_fight: false,
            move_intent: Vec2::ZERO,
            attack_requested: false,
            interact_requested: false,
        }
    }

    pub fn collider(&self) -> Rect {
        Rect::from_center(self.pos, self.radius)
    }

    ///Stores the latest movement intent and derives facing from it. A
    ///horizontal component flips `facing_right`; any nonzero vector becomes
    ///the aim direction for the next attack.
    pub fn set_move_intent(&mut self, intent: Vec2) {
        self.move_intent = intent;
        if intent.x != 0.0 {
            self.facing_right = intent.x > 0.0;
        }
        if intent.length_squared() > 0.0 {
            self.last_direction = intent.normalized();
        }
    }

    ///Begins the attack animation if the player is free to swing. Returns
    ///false while another one-shot animation is playing, a swing is already
    ///in flight, or the player is dead.
    pub fn start_attack(&mut self) -> bool {
        if self.animator.kind.is_interruptible() && !self.is_attacking && !self.is_dead {
            self.animator.set(AnimKind::Attack);
            self.is_attacking = true;
            return true;
        }
        false
    }

    ///Applies incoming damage after defense. Returns the points actually
    ///dealt; 0 while dead or invulnerable. A non-fatal hit restarts the
    ///Hurt animation and grants an invulnerability window.
    pub fn take_damage(&mut self, raw: f32) -> i32 {
        if self.is_dead || self.is_invulnerable {
            return 0;
        }

        let dealt = effective_damage(raw, self.defense, PLAYER_MAX_DEFENSE);
        self.health -= dealt as f32;
        self.in_fight = true;

        if self.health <= 0.0 {
            self.health = 0.0;
            if !self.is_dead {
                self.is_dead = true;
                self.is_attacking = false;
                self.animator.set(AnimKind::Death);
            }
        } else {
            self.animator.restart(AnimKind::Hurt);
            self.is_invulnerable = true;
            self.invulnerability_timer = PLAYER_INVULNERABILITY_SECS;
        }
        dealt
    }

    ///One authoritative simulation step: timers, animation transitions,
    ///movement with axis-separated collision, world-bounds clamp, regen.
    pub fn update(&mut self, dt: f32, colliders: &[Rect], world_width: f32, world_height: f32) {
        if self.is_invulnerable {
            self.invulnerability_timer -= dt;
            if self.invulnerability_timer <= 0.0 {
                self.is_invulnerable = false;
            }
        }

        let base = if self.move_intent.length_squared() > 0.0 {
            AnimKind::Walk
        } else {
            AnimKind::Idle
        };

        let previous = self.animator.kind;
        let was_finished = self.animator.finished;
        if !self.is_dead {
            if matches!(previous, AnimKind::Attack | AnimKind::Hurt) && was_finished {
                self.animator.set(base);
            } else if previous.is_interruptible() {
                self.animator.set(base);
            }
            if previous == AnimKind::Attack && was_finished {
                self.is_attacking = false;
            }
        }
        if self.animator.kind != previous {
            self.is_attacking = self.animator.kind == AnimKind::Attack;
        }

        self.animator.advance(dt, &self.frames);

        // Movement is locked while a one-shot animation plays or the player
        // is dead.
        let can_move = self.animator.kind.is_interruptible() && !self.is_dead;
        let effective_speed = if can_move { self.speed } else { 0.0 };
        let delta = self.move_intent.scale(effective_speed * dt * 60.0);

        if delta.length_squared() > 0.0 {
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
        }

        self.pos.x = self.pos.x.clamp(self.radius, world_width - self.radius);
        self.pos.y = self.pos.y.clamp(self.radius, world_height - self.radius);

        if self.in_fight && self.health < self.max_health && !self.is_dead {
            let regen = PLAYER_HEALTH_REGEN * dt * 60.0;
            self.health = (self.health + regen).min(self.max_health);
        }
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            id: self.id,
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
            defense: self.defense,
            agility: self.agility,
        }
    }

    ///Overwrites mirror state from an authoritative snapshot. The animation
    ///is reset on a kind change, then the frame index always follows the
    ///server.
    pub fn apply_snapshot(&mut self, snap: &PlayerSnapshot) {
        self.pos = Vec2::new(snap.x, snap.y);
        self.health = snap.health;
        self.max_health = snap.max_health;
        self.facing_right = snap.facing_right;
        self.is_dead = snap.is_dead;
        self.is_invulnerable = snap.is_invulnerable;
        self.is_attacking = snap.is_attacking;
        self.defense = snap.defense;
        self.agility = snap.agility;
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

    fn test_player() -> Player {
        let assets = AssetTable::default();
        let frames = assets.get("player").unwrap().clone();
        Player::new(0, Vec2::new(500.0, 500.0), frames)
    }

    #[test]
    fn test_new_player_defaults() {
        let player = test_player();
        assert!(player.facing_right);
        assert_eq!(player.animator.kind, AnimKind::Idle);
        assert_approx_eq!(player.health, player.max_health);
        assert!(!player.is_dead);
    }

    #[test]
    fn test_intent_derives_facing() {
        let mut player = test_player();
        player.set_move_intent(Vec2::new(-1.0, 0.0));
        assert!(!player.facing_right);
        assert_approx_eq!(player.last_direction.x, -1.0);

        // Vertical-only input keeps the horizontal facing but re-aims.
        player.set_move_intent(Vec2::new(0.0, 1.0));
        assert!(!player.facing_right);
        assert_approx_eq!(player.last_direction.y, 1.0);
        assert_approx_eq!(player.last_direction.x, 0.0);
    }

    #[test]
    fn test_movement_scales_with_dt() {
        let mut player = test_player();
        player.set_move_intent(Vec2::new(1.0, 0.0));
        player.update(1.0 / 60.0, &[], WORLD_WIDTH, WORLD_HEIGHT);
        // One 60 Hz tick moves exactly one speed unit.
        assert_approx_eq!(player.pos.x, 500.0 + player.speed, 1e-3);
        assert_approx_eq!(player.pos.y, 500.0);
        assert_eq!(player.animator.kind, AnimKind::Walk);
    }

    #[test]
    fn test_movement_locked_while_attacking() {
        let mut player = test_player();
        assert!(player.start_attack());
        player.set_move_intent(Vec2::new(1.0, 0.0));
        player.update(1.0 / 60.0, &[], WORLD_WIDTH, WORLD_HEIGHT);
        assert_approx_eq!(player.pos.x, 500.0);
        assert!(player.is_attacking);
    }

    #[test]
    fn test_attack_rejected_while_attacking() {
        let mut player = test_player();
        assert!(player.start_attack());
        assert!(!player.start_attack());
    }

    #[test]
    fn test_attack_flag_clears_when_animation_ends() {
        let mut player = test_player();
        assert!(player.start_attack());
        // 200 ms steps guarantee one animation frame per update.
        for _ in 0..10 {
            player.update(0.2, &[], WORLD_WIDTH, WORLD_HEIGHT);
        }
        assert!(!player.is_attacking);
        assert_eq!(player.animator.kind, AnimKind::Idle);
    }

    #[test]
    fn test_collision_clamps_to_obstacle_edge() {
        let mut player = test_player();
        let wall = Rect::new(520.0, 400.0, 40.0, 200.0);
        player.set_move_intent(Vec2::new(1.0, 0.0));
        for _ in 0..20 {
            player.update(1.0 / 60.0, &[wall], WORLD_WIDTH, WORLD_HEIGHT);
        }
        assert_approx_eq!(player.pos.x, wall.left() - player.radius, 1e-3);
    }

    #[test]
    fn test_world_bounds_clamp() {
        let assets = AssetTable::default();
        let frames = assets.get("player").unwrap().clone();
        let mut player = Player::new(0, Vec2::new(5.0, 5.0), frames);
        player.set_move_intent(Vec2::new(-1.0, -1.0).normalized());
        player.update(1.0 / 60.0, &[], WORLD_WIDTH, WORLD_HEIGHT);
        assert_approx_eq!(player.pos.x, player.radius);
        assert_approx_eq!(player.pos.y, player.radius);
    }

    #[test]
    fn test_damage_applies_defense_and_grants_invulnerability() {
        let mut player = test_player();
        // 15 raw into 5% defense -> 14.25 -> 14.
        let dealt = player.take_damage(15.0);
        assert_eq!(dealt, 14);
        assert_approx_eq!(player.health, 86.0);
        assert_eq!(player.animator.kind, AnimKind::Hurt);
        assert!(player.is_invulnerable);

        // Second hit inside the invulnerability window does nothing.
        assert_eq!(player.take_damage(15.0), 0);
        assert_approx_eq!(player.health, 86.0);
    }

    #[test]
    fn test_death_is_idempotent() {
        let mut player = test_player();
        player.take_damage(1000.0);
        assert!(player.is_dead);
        assert_approx_eq!(player.health, 0.0);
        assert_eq!(player.animator.kind, AnimKind::Death);
        assert!(!player.is_attacking);

        let again = player.take_damage(1000.0);
        assert_eq!(again, 0);
        assert_approx_eq!(player.health, 0.0);
        assert!(player.is_dead);
    }

    #[test]
    fn test_regen_only_after_combat() {
        let mut player = test_player();
        // Untouched players do not regenerate (nothing to heal either way).
        player.update(1.0 / 60.0, &[], WORLD_WIDTH, WORLD_HEIGHT);
        assert_approx_eq!(player.health, player.max_health);

        player.take_damage(15.0);
        let hurt_health = player.health;
        player.update(1.0 / 60.0, &[], WORLD_WIDTH, WORLD_HEIGHT);
        assert_approx_eq!(player.health, hurt_health + PLAYER_HEALTH_REGEN, 1e-4);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut source = test_player();
        source.set_move_intent(Vec2::new(-1.0, 0.0));
        source.take_damage(15.0);
        source.pos = Vec2::new(321.0, 654.0);

        let mut mirror = test_player();
        mirror.apply_snapshot(&source.snapshot());

        assert_approx_eq!(mirror.pos.x, 321.0);
        assert_approx_eq!(mirror.pos.y, 654.0);
        assert_approx_eq!(mirror.health, source.health);
        assert!(!mirror.facing_right);
        assert_eq!(mirror.animator.kind, AnimKind::Hurt);
        assert!(mirror.is_invulnerable);
    }
}
