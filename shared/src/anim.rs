use serde::{Deserialize, Serialize};
use std::collections::HashMap;

///Milliseconds between animation frame advances, shared by every entity.
pub const ANIMATION_INTERVAL_MS: f32 = 150.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnimKind {
    Idle,
    Walk,
    Attack,
    Hurt,
    Death,
}

impl AnimKind {
    ///One-shot animations play once and then report finished; the rest loop.
    pub fn is_one_shot(&self) -> bool {
        matches!(self, AnimKind::Attack | AnimKind::Hurt | AnimKind::Death)
    }

    ///Only Idle and Walk may be interrupted by movement or a new attack.
    pub fn is_interruptible(&self) -> bool {
        matches!(self, AnimKind::Idle | AnimKind::Walk)
    }
}

///Frame counts and sprite dimensions for one entity kind. Populated from
///the asset table at construction; the simulation never reads assets.
#[derive(Debug, Clone, Copy)]
pub struct FrameTable {
    pub idle: usize,
    pub walk: usize,
    pub attack: usize,
    pub hurt: usize,
    pub death: usize,
    pub sprite_w: f32,
    pub sprite_h: f32,
}

impl FrameTable {
    pub fn frames(&self, kind: AnimKind) -> usize {
        match kind {
            AnimKind::Idle => self.idle,
            AnimKind::Walk => self.walk,
            AnimKind::Attack => self.attack,
            AnimKind::Hurt => self.hurt,
            AnimKind::Death => self.death,
        }
    }

    ///Default hit frame for an attack: 60% through the swing, clamped to
    ///the last frame.
    pub fn default_hit_frame(&self) -> usize {
        ((self.attack as f32 * 0.6) as usize).min(self.attack.saturating_sub(1))
    }
}

///Kind name → frame table, standing in for the asset pipeline.
#[derive(Debug, Clone)]
pub struct AssetTable {
    tables: HashMap<String, FrameTable>,
}

impl AssetTable {
    pub fn new() -> AssetTable {
        AssetTable {
            tables: HashMap::new(),
        }
    }

    pub fn insert(&mut self, kind: &str, table: FrameTable) {
        self.tables.insert(kind.to_string(), table);
    }

    pub fn get(&self, kind: &str) -> Option<&FrameTable> {
        self.tables.get(kind)
    }
}

impl Default for AssetTable {
    ///Built-in tables for the shipped kinds.
    fn default() -> AssetTable {
        let mut table = AssetTable::new();
        table.insert(
            "player",
            FrameTable {
                idle: 6,
                walk: 8,
                attack: 6,
                hurt: 4,
                death: 4,
                sprite_w: 32.0,
                sprite_h: 32.0,
            },
        );
        table.insert(
            "sword_orc",
            FrameTable {
                idle: 6,
                walk: 8,
                attack: 6,
                hurt: 4,
                death: 4,
                sprite_w: 64.0,
                sprite_h: 64.0,
            },
        );
        table.insert(
            "villager",
            FrameTable {
                idle: 4,
                walk: 6,
                attack: 1,
                hurt: 1,
                death: 1,
                sprite_w: 32.0,
                sprite_h: 32.0,
            },
        );
        table
    }
}

///Per-entity animation playhead. Frames advance on a fixed millisecond
///cadence driven by the simulation delta, so playback is deterministic
///under test.
#[derive(Debug, Clone)]
pub struct Animator {
    pub kind: AnimKind,
    pub frame: usize,
    pub finished: bool,
    timer_ms: f32,
}

impl Animator {
    pub fn new(kind: AnimKind) -> Animator {
        Animator {
            kind,
            frame: 0,
            finished: false,
            timer_ms: 0.0,
        }
    }

    ///Switches animation, restarting from frame zero. Setting the kind
    ///already playing is a no-op.
    pub fn set(&mut self, kind: AnimKind) {
        if kind != self.kind {
            self.kind = kind;
            self.frame = 0;
            self.finished = false;
        }
    }

    ///Like `set`, but rewinds to frame zero even when `kind` is already
    ///playing.
    pub fn restart(&mut self, kind: AnimKind) {
        self.kind = kind;
        self.frame = 0;
        self.finished = false;
    }

    ///Accumulates `dt` and steps at most one frame per call. Returns the
    ///new frame index when a step occurred. One-shots flag `finished` at
    ///the end; Death holds its last frame, Attack and Hurt rewind to zero.
    pub fn advance(&mut self, dt: f32, table: &FrameTable) -> Option<usize> {
        self.timer_ms += dt * 1000.0;
        if self.timer_ms < ANIMATION_INTERVAL_MS {
            return None;
        }
        self.timer_ms = 0.0;

        let num_frames = table.frames(self.kind);
        if num_frames == 0 || self.finished {
            return None;
        }

        let next = self.frame + 1;
        if next >= num_frames {
            if self.kind.is_one_shot() {
                self.finished = true;
                self.frame = if self.kind == AnimKind::Death {
                    num_frames - 1
                } else {
                    0
                };
            } else {
                self.frame = next % num_frames;
            }
        } else {
            self.frame = next;
        }
        Some(self.frame)
    }
}
