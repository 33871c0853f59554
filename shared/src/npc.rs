use crate::anim::{AnimKind, Animator, FrameTable};
use crate::math::{Rect, Vec2};
use crate::protocol::{NpcSnapshot, NpcState};
use rand::Rng;
use std::f32::consts::TAU;

pub const NPC_RADIUS: f32 = 12.0;
pub const NPC_SPEED: f32 = 1.5;
pub const NPC_WANDER_RADIUS: f32 = 150.0;
pub const NPC_WANDER_TIME_MIN: f32 = 3.0;
pub const NPC_WANDER_TIME_MAX: f32 = 7.0;
pub const NPC_INTERACTION_RANGE: f32 = 50.0;
pub const NPC_LINE_SECS: f32 = 4.0;

///A friendly villager. Wanders near its spawn point, stops to talk when a
///player interacts, and walks its dialogue lines on a timer.
#[derive(Debug, Clone)]
pub struct Npc {
    pub id: u32,
    pub name: String,
    pub pos: Vec2,
    pub spawn: Vec2,
    pub radius: f32,
    pub speed: f32,
    pub state: NpcState,
    target_position: Option<Vec2>,
    wander_timer: f32,
    pub facing_right: bool,
    pub animator: Animator,
    pub frames: FrameTable,
    pub dialogue: Vec<String>,
    dialogue_active: bool,
    dialogue_index: usize,
    dialogue_timer: f32,
    pub dialogue_line: Option<String>,
    pub talking_to: Option<u32>,
}

impl Npc {
    pub fn new<R: Rng>(
        id: u32,
        pos: Vec2,
        dialogue: Vec<String>,
        frames: FrameTable,
        rng: &mut R,
    ) -> Npc {
        let name = format!("Villager #{}", id);
        let dialogue = if dialogue.is_empty() {
            vec![format!("Hello there, traveler! I'm {}.", name)]
        } else {
            dialogue
        };
        Npc {
            id,
            name,
            pos,
            spawn: pos,
            radius: NPC_RADIUS,
            speed: NPC_SPEED,
            state: NpcState::Idle,
            target_position: None,
            wander_timer: rng.gen_range(NPC_WANDER_TIME_MIN..NPC_WANDER_TIME_MAX),
            facing_right: true,
            animator: Animator::new(AnimKind::Idle),
            frames,
            dialogue,
            dialogue_active: false,
            dialogue_index: 0,
            dialogue_timer: 0.0,
            dialogue_line: None,
            talking_to: None,
        }
    }

    pub fn collider(&self) -> Rect {
        Rect::from_center(self.pos, self.radius)
    }

    ///Wander state machine. Talking NPCs stand still and keep their wander
    ///timer topped up so they don't bolt the moment the conversation ends.
    pub fn update_behavior<R: Rng>(
        &mut self,
        dt: f32,
        colliders: &[Rect],
        world_width: f32,
        world_height: f32,
        rng: &mut R,
    ) {
        if self.state == NpcState::Talking {
            self.wander_timer = rng.gen_range(NPC_WANDER_TIME_MIN..NPC_WANDER_TIME_MAX);
        } else {
            self.wander_timer -= dt;

            match self.state {
                NpcState::Idle => {
                    if self.wander_timer <= 0.0 {
                        let angle = rng.gen_range(0.0..TAU);
                        let dist = rng.gen_range(0.0..NPC_WANDER_RADIUS);
                        let target = Vec2::new(
                            (self.spawn.x + angle.cos() * dist)
                                .clamp(self.radius, world_width - self.radius),
                            (self.spawn.y + angle.sin() * dist)
                                .clamp(self.radius, world_height - self.radius),
                        );
                        self.target_position = Some(target);
                        self.state = NpcState::Wander;
                    }
                }
                NpcState::Wander => {
                    if let Some(target) = self.target_position {
                        let direction = target.sub(self.pos);
                        let dist = direction.length();
                        if dist < self.speed * dt * 60.0 * 0.5 {
                            self.state = NpcState::Idle;
                            self.target_position = None;
                            self.wander_timer =
                                rng.gen_range(NPC_WANDER_TIME_MIN..NPC_WANDER_TIME_MAX);
                        } else {
                            let dir = direction.normalized();
                            let step = dir.scale(self.speed * dt * 60.0);
                            self.facing_right = dir.x >= 0.0;

                            // An axis move is skipped entirely when it would
                            // overlap an obstacle; no edge clamping.
                            let next_x = self.pos.x + step.x;
                            let next_y = self.pos.y + step.y;
                            let rect_x = Rect::from_center(Vec2::new(next_x, self.pos.y), self.radius);
                            let rect_y = Rect::from_center(Vec2::new(self.pos.x, next_y), self.radius);
                            if !colliders.iter().any(|o| rect_x.intersects(o)) {
                                self.pos.x = next_x;
                            }
                            if !colliders.iter().any(|o| rect_y.intersects(o)) {
                                self.pos.y = next_y;
                            }
                        }
                    } else {
                        self.state = NpcState::Idle;
                        self.wander_timer =
                            rng.gen_range(NPC_WANDER_TIME_MIN..NPC_WANDER_TIME_MAX);
                    }
                }
                NpcState::Talking => {}
            }
        }

        let base = if self.state == NpcState::Wander {
            AnimKind::Walk
        } else {
            AnimKind::Idle
        };
        self.animator.set(base);
        self.animator.advance(dt, &self.frames);
    }

    ///Advances the active dialogue on its timer. After the last line the
    ///NPC goes back to idling and forgets its interlocutor.
    pub fn update_dialogue(&mut self, dt: f32) {
        if !self.dialogue_active {
            return;
        }
        self.dialogue_timer -= dt;
        if self.dialogue_timer <= 0.0 {
            self.dialogue_index += 1;
            if self.dialogue_index >= self.dialogue.len() {
                self.dialogue_active = false;
                self.dialogue_index = 0;
                self.state = NpcState::Idle;
                self.talking_to = None;
                self.dialogue_line = None;
            } else {
                self.dialogue_timer = NPC_LINE_SECS;
                self.dialogue_line = self.dialogue.get(self.dialogue_index).cloned();
            }
        }
    }

    ///Starts a conversation with `player_id`. Interacting again while a
    ///dialogue is already running is ignored; lines only advance on the
    ///timer.
    pub fn interact(&mut self, player_id: u32) {
        if self.dialogue_active {
            return;
        }
        self.state = NpcState::Talking;
        self.dialogue_active = true;
        self.dialogue_index = 0;
        self.dialogue_timer = NPC_LINE_SECS;
        self.talking_to = Some(player_id);
        self.dialogue_line = self.dialogue.first().cloned();
    }

    pub fn snapshot(&self) -> NpcSnapshot {
        NpcSnapshot {
            id: self.id,
            kind: "villager".to_string(),
            name: self.name.clone(),
            x: self.pos.x,
            y: self.pos.y,
            facing_right: self.facing_right,
            state: self.state,
            anim: self.animator.kind,
            anim_frame: self.animator.frame as u32,
            dialogue_line: self.dialogue_line.clone(),
            talking_to: self.talking_to,
        }
    }

    pub fn apply_snapshot(&mut self, snap: &NpcSnapshot) {
        self.pos = Vec2::new(snap.x, snap.y);
        self.name = snap.name.clone();
        self.state = snap.state;
        self.facing_right = snap.facing_right;
        self.dialogue_line = snap.dialogue_line.clone();
        self.talking_to = snap.talking_to;
        self.animator.set(snap.anim);
        self.animator.frame = snap.anim_frame as usize;
    }
}
