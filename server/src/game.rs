use crate::quadtree::Quadtree;
use crate::session::Session;
use crate::world::World;
use shared::math::Vec2;

pub struct Game {
    world: World,
    quadtree: Quadtree,
}

impl Game {
    pub fn new(world: World, quadtree: Quadtree) -> Game {
        Game { world, quadtree }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn step(&self, session: &mut Session, dt: f32) {
        let session = &mut *session;
        let players = &mut session.players;
        let combat = &mut session.combat;
        let npcs = &mut session.npcs;

        // Players advance in id order so a tick is deterministic for a
        // given set of intents.
        let mut ids: Vec<u32> = players.keys().copied().collect();
        ids.sort_unstable();

        for id in ids {
            let (pos, swing, interact) = match players.get_mut(&id) {
                Some(player) => {
                    let margin = player.speed * 2.0 + 32.0;
                    let colliders = self
                        .quadtree
                        .query(&player.collider().inflate(margin, margin));
                    player.update(dt, &colliders, self.world.width, self.world.height);

                    let swing = player.attack_requested && player.start_attack();
                    player.attack_requested = false;
                    let interact = player.interact_requested;
                    player.interact_requested = false;
                    (player.pos, swing, interact)
                }
                None => continue,
            };

            if swing {
                combat.handle_player_attack(id, players);
            }
            if interact {
                npcs.handle_interaction(id, pos);
            }
        }

        combat.update(players, dt, &self.quadtree, &self.world);
        npcs.update(dt, &self.quadtree, &self.world);
    }
}

///Stand-in pilot for the server's own player: a slowly turning heading
///that keeps the local participant on the move without a renderer.
pub struct LocalPlayer {
    pub id: u32,
    elapsed: f32,
}

impl LocalPlayer {
    pub fn new(id: u32) -> LocalPlayer {
        LocalPlayer { id, elapsed: 0.0 }
    }

    pub fn sample(&mut self, dt: f32) -> Vec2 {
        self.elapsed += dt;
        let heading = self.elapsed * 0.35;
        Vec2::new(heading.cos(), heading.sin())
    }
}
