use crate::quadtree::Quadtree;
use crate::world::World;
use log::{error, info, warn};
use rand::rngs::StdRng;
use rand::Rng;
use shared::anim::AssetTable;
use shared::math::Vec2;
use shared::npc::{Npc, NPC_INTERACTION_RANGE};
use shared::protocol::{NpcSnapshot, NpcState};
use shared::{KINGDOM_CENTER_X, KINGDOM_CENTER_Y};
use std::collections::HashMap;
use std::f32::consts::TAU;

pub const VILLAGER_COUNT: usize = 5;

const SPAWN_SCATTER_RADIUS: f32 = 150.0;

const DIALOGUE_SETS: [[&str; 2]; 5] = [
    [
        "The weather's been strange lately.",
        "Seen any adventurers around here?",
    ],
    [
        "Welcome to our village!",
        "Watch out for the monsters in the forest.",
    ],
    ["Need anything?", "Just enjoying the day."],
    [
        "Did you hear the news?",
        "Something about the old ruins...",
    ],
    ["Ah, another traveler.", "Be safe out there."],
];

///Owns the villager population: spawning inside the kingdom, the per-tick
///behavior step, and routing player interaction to the nearest villager.
pub struct NpcManager {
    pub npcs: Vec<Npc>,
    next_npc_id: u32,
    rng: StdRng,
}

impl NpcManager {
    pub fn new(rng: StdRng) -> NpcManager {
        NpcManager {
            npcs: Vec::new(),
            next_npc_id: 0,
            rng,
        }
    }

    ///Places `count` villagers scattered around the kingdom center, each
    ///with a randomly chosen set of dialogue lines. Points outside the
    ///kingdom walls are rejected.
    pub fn spawn_kingdom(&mut self, count: usize, world: &World, assets: &AssetTable) {
        let frames = match assets.get("villager") {
            Some(frames) => frames.clone(),
            None => {
                error!("No animation table for villagers; skipping NPC spawn");
                return;
            }
        };

        let center = Vec2::new(KINGDOM_CENTER_X, KINGDOM_CENTER_Y);
        let mut spawned = 0usize;
        let mut attempts = 0usize;
        let max_attempts = count * 10;

        while spawned < count && attempts < max_attempts {
            attempts += 1;
            let angle = self.rng.gen_range(0.0..TAU);
            let dist = self.rng.gen_range(0.0..SPAWN_SCATTER_RADIUS);
            let point = center.add(Vec2::new(angle.cos(), angle.sin()).scale(dist));
            if !world.in_kingdom(point) {
                continue;
            }

            let set = &DIALOGUE_SETS[self.rng.gen_range(0..DIALOGUE_SETS.len())];
            let dialogue = set.iter().map(|line| line.to_string()).collect();

            let id = self.next_npc_id;
            self.next_npc_id += 1;
            self.npcs
                .push(Npc::new(id, point, dialogue, frames.clone(), &mut self.rng));
            spawned += 1;
        }

        if spawned < count {
            warn!("NPC spawn budget exhausted: placed {} of {}", spawned, count);
        }
        info!("Spawned {} villagers in the kingdom", spawned);
    }

    pub fn update(&mut self, dt: f32, quadtree: &Quadtree, world: &World) {
        for npc in &mut self.npcs {
            let margin = npc.speed * 2.0 + 32.0;
            let colliders = quadtree.query(&npc.collider().inflate(margin, margin));
            npc.update_behavior(dt, &colliders, world.width, world.height, &mut self.rng);
            npc.update_dialogue(dt);
        }
    }

    ///Starts a conversation with the villager closest to the player, if
    ///any is within interaction range.
    pub fn handle_interaction(&mut self, player_id: u32, player_pos: Vec2) {
        let range_sq = NPC_INTERACTION_RANGE * NPC_INTERACTION_RANGE;
        let mut closest: Option<(usize, f32)> = None;
        for (index, npc) in self.npcs.iter().enumerate() {
            let dist_sq = npc.pos.distance_squared(player_pos);
            if dist_sq < range_sq && closest.map_or(true, |(_, best)| dist_sq < best) {
                closest = Some((index, dist_sq));
            }
        }

        if let Some((index, _)) = closest {
            let npc = &mut self.npcs[index];
            if npc.state != NpcState::Talking {
                info!("Player {} talks to {}", player_id, npc.name);
            }
            npc.interact(player_id);
        }
    }

    pub fn npc_snapshots(&self) -> HashMap<u32, NpcSnapshot> {
        self.npcs.iter().map(|npc| (npc.id, npc.snapshot())).collect()
    }

    pub fn npc_count(&self) -> usize {
        self.npcs.len()
    }
}
