use serde::{Deserialize, Serialize};

///Represents a point or direction in 2D world space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Vec2 {
        Vec2 { x, y }
    }

    pub fn length_squared(&self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn length(&self) -> f32 {
        self.length_squared().sqrt()
    }

    ///Returns the normalized vector, or zero if the vector has no length.
    pub fn normalized(&self) -> Vec2 {
        let len = self.length();
        if len == 0.0 {
            Vec2::ZERO
        } else {
            Vec2 {
                x: self.x / len,
                y: self.y / len,
            }
        }
    }

    pub fn scale(&self, scalar: f32) -> Vec2 {
        Vec2 {
            x: self.x * scalar,
            y: self.y * scalar,
        }
    }

    pub fn add(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }

    pub fn sub(&self, other: Vec2) -> Vec2 {
        Vec2 {
            x: self.x - other.x,
            y: self.y - other.y,
        }
    }

    pub fn distance_squared(&self, other: Vec2) -> f32 {
        self.sub(other).length_squared()
    }
}

///Axis-aligned rectangle with its origin at the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Rect {
        Rect { x, y, w, h }
    }

    ///Square rect of side `2 * radius` centered on `center`. Entities
    ///collide with this footprint.
    pub fn from_center(center: Vec2, radius: f32) -> Rect {
        Rect {
            x: center.x - radius,
            y: center.y - radius,
            w: radius * 2.0,
            h: radius * 2.0,
        }
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    ///Strict overlap test: rects that merely touch along an edge do not
    ///intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() < other.bottom()
            && self.bottom() > other.top()
    }

    ///Grows (or shrinks, with negative amounts) the rect about its center.
    pub fn inflate(&self, dx: f32, dy: f32) -> Rect {
        Rect {
            x: self.x - dx / 2.0,
            y: self.y - dy / 2.0,
            w: self.w + dx,
            h: self.h + dy,
        }
    }

    ///True when `other` lies entirely inside this rect (edges may touch).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left() >= self.left()
            && other.right() <= self.right()
            && other.top() >= self.top()
            && other.bottom() <= self.bottom()
    }

    ///The overlapping region of two rects, or `None` if they only touch or
    ///are disjoint.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let x = self.left().max(other.left());
        let y = self.top().max(other.top());
        let w = self.right().min(other.right()) - x;
        let h = self.bottom().min(other.bottom()) - y;
        if w > 0.0 && h > 0.0 {
            Some(Rect { x, y, w, h })
        } else {
            None
        }
    }
}
