use crate::quadtree::Quadtree;
use crate::world::World;
use log::{debug, error, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use shared::anim::AssetTable;
use shared::combat::{attack_center, attack_connects, roll_dodge};
use shared::enemy::{Enemy, EnemyKind};
use shared::math::Vec2;
use shared::player::Player;
use shared::protocol::EnemySnapshot;
use shared::{PLAYER_ATTACK_POWER, PLAYER_ATTACK_RANGE};
use std::collections::HashMap;

///Owns the authoritative enemy list: spawning, the per-tick AI step, and
///damage application for both directions of combat. Enemy identifiers are
///assigned from a counter local to this manager, so a fresh manager starts
///over at zero.
pub struct CombatManager {
    pub enemies: Vec<Enemy>,
    assets: AssetTable,
    next_enemy_id: u32,
    rng: StdRng,
}

impl CombatManager {
    pub fn new(assets: AssetTable, rng: StdRng) -> CombatManager {
        CombatManager {
            enemies: Vec::new(),
            assets,
            next_enemy_id: 0,
            rng,
        }
    }

    ///Scatters `count` enemies across the overworld, rejecting points that
    ///land inside the kingdom. Gives up after a bounded number of attempts
    ///rather than spinning forever on a crowded map.
    pub fn spawn_overworld(&mut self, count: usize, world: &World) {
        let mut spawned = 0usize;
        let mut attempts = 0usize;
        let max_attempts = count * 20;

        while spawned < count && attempts < max_attempts {
            attempts += 1;
            let point = Vec2::new(
                self.rng.gen_range(0.0..world.width),
                self.rng.gen_range(0.0..world.height),
            );
            if world.in_kingdom(point) {
                continue;
            }

            let kind = EnemyKind::SwordOrc;
            let frames = match self.assets.get(kind.as_str()) {
                Some(frames) => frames.clone(),
                None => {
                    error!("No animation table for enemy kind '{}'", kind.as_str());
                    continue;
                }
            };

            let id = self.next_enemy_id;
            self.next_enemy_id += 1;
            self.enemies
                .push(Enemy::new(id, kind, point, frames, &mut self.rng));
            spawned += 1;
        }

        if spawned < count {
            warn!(
                "Enemy spawn budget exhausted: placed {} of {}",
                spawned, count
            );
        }
        info!("Spawned {} enemies in the overworld", spawned);
    }

    ///Resolves one player swing against every enemy and every other player.
    ///The swing is centered half the attack range ahead of the attacker in
    ///their facing direction; dodge is rolled per defender.
    pub fn handle_player_attack(&mut self, attacker_id: u32, players: &mut HashMap<u32, Player>) {
        let (origin, facing) = match players.get(&attacker_id) {
            Some(attacker) if !attacker.is_dead && attacker.is_attacking => {
                (attacker.pos, attacker.last_direction)
            }
            _ => return,
        };
        let center = attack_center(origin, facing, PLAYER_ATTACK_RANGE);

        for enemy in &mut self.enemies {
            if enemy.is_dead || enemy.is_invulnerable {
                continue;
            }
            if !attack_connects(center, PLAYER_ATTACK_RANGE, enemy.pos, enemy.radius) {
                continue;
            }
            if roll_dodge(&mut self.rng, enemy.agility) {
                debug!("Enemy {} dodged player {}'s swing", enemy.id, attacker_id);
                continue;
            }
            let dealt = enemy.take_damage(PLAYER_ATTACK_POWER);
            debug!("Player {} hit enemy {} for {}", attacker_id, enemy.id, dealt);
        }

        for (target_id, target) in players.iter_mut() {
            if *target_id == attacker_id || target.is_dead || target.is_invulnerable {
                continue;
            }
            if !attack_connects(center, PLAYER_ATTACK_RANGE, target.pos, target.radius) {
                continue;
            }
            if roll_dodge(&mut self.rng, target.agility) {
                info!(
                    "Player {} dodged player {}'s swing",
                    target_id, attacker_id
                );
                continue;
            }
            let dealt = target.take_damage(PLAYER_ATTACK_POWER);
            info!(
                "Player {} hit player {} for {}",
                attacker_id, target_id, dealt
            );
        }
    }

    ///Steps every enemy's state machine, applies any hit-frame damage to
    ///the enemy's current target, and reaps enemies whose death animation
    ///has finished. Skipped entirely while no players are connected.
    pub fn update(
        &mut self,
        players: &mut HashMap<u32, Player>,
        dt: f32,
        quadtree: &Quadtree,
        world: &World,
    ) {
        if players.is_empty() {
            return;
        }

        for enemy in &mut self.enemies {
            let margin = enemy.speed * 2.0 + 32.0;
            let colliders = quadtree.query(&enemy.collider().inflate(margin, margin));
            let reached_hit_frame =
                enemy.update(players, dt, &colliders, world.width, world.height, &mut self.rng);

            if reached_hit_frame {
                if let Some(target_id) = enemy.target_id {
                    if let Some(target) = players.get_mut(&target_id) {
                        resolve_enemy_hit(enemy, target, &mut self.rng);
                    }
                }
            }
        }

        self.enemies
            .retain(|enemy| !(enemy.is_dead && enemy.animator.finished));
    }

    pub fn enemy_snapshots(&self) -> HashMap<u32, EnemySnapshot> {
        self.enemies
            .iter()
            .map(|enemy| (enemy.id, enemy.snapshot()))
            .collect()
    }

    pub fn enemy_count(&self) -> usize {
        self.enemies.len()
    }
}

///The swing already connected when the animation started; re-check range at
///the hit frame so a target that slipped away is not hit through thin air.
fn resolve_enemy_hit<R: Rng>(enemy: &Enemy, target: &mut Player, rng: &mut R) {
    if enemy.is_dead || target.is_dead || target.is_invulnerable {
        return;
    }
    let range_sq = enemy.attack_range * enemy.attack_range;
    if enemy.pos.distance_squared(target.pos) >= range_sq {
        return;
    }
    if roll_dodge(rng, target.agility) {
        debug!("Player {} dodged enemy {}'s attack", target.id, enemy.id);
        return;
    }
    let dealt = target.take_damage(enemy.attack_power);
    debug!("Enemy {} hit player {} for {}", enemy.id, target.id, dealt);
}
