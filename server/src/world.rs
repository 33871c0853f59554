use crate::quadtree::Quadtree;
use log::{info, warn};
use rand::Rng;
use shared::math::{Rect, Vec2};
use shared::{KINGDOM_CENTER_X, KINGDOM_CENTER_Y, KINGDOM_RADIUS, WORLD_HEIGHT, WORLD_WIDTH};
use std::f32::consts::TAU;

pub const KINGDOM_VERTEX_COUNT: usize = 60;
pub const KINGDOM_RADIUS_VARIATION: f32 = 250.0;
pub const KINGDOM_WALL_THICKNESS: f32 = 35.0;
pub const GATE_OPENING_WIDTH: f32 = 180.0;
pub const TOWER_SIZE: f32 = KINGDOM_WALL_THICKNESS * 1.4;
pub const BUILDING_COUNT: usize = 45;
pub const BUILDING_WIDTH_MIN: f32 = 40.0;
pub const BUILDING_WIDTH_MAX: f32 = 65.0;
pub const BUILDING_HEIGHT_MIN: f32 = 35.0;
pub const BUILDING_HEIGHT_MAX: f32 = 60.0;
pub const BUILDING_SPACING: f32 = 25.0;

///Checks whether a point lies inside a polygon via ray casting. Points on a
///horizontal edge count as inside.
pub fn point_in_polygon(point: Vec2, vertices: &[Vec2]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let (x, y) = (point.x, point.y);
    let mut inside = false;
    let mut p1x = vertices[0].x;
    let mut p1y = vertices[0].y;
    for i in 0..=n {
        let p2x = vertices[i % n].x;
        let p2y = vertices[i % n].y;
        if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) {
            if p1y == p2y {
                if y == p1y && x >= p1x.min(p2x) && x <= p1x.max(p2x) {
                    return true;
                }
            } else {
                let x_intersect = (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
                if p1x == p2x {
                    if x <= p1x {
                        inside = !inside;
                    }
                } else if x <= x_intersect {
                    inside = !inside;
                }
            }
        }
        p1x = p2x;
        p1y = p2y;
    }
    inside
}

///Static world data consumed by the simulation: the kingdom zone polygon
///and every obstacle rectangle (wall ring, towers, buildings). Terrain
///detail beyond what collision and spawn filtering need is not modelled.
#[derive(Debug, Clone)]
pub struct World {
    pub width: f32,
    pub height: f32,
    pub kingdom_polygon: Vec<Vec2>,
    pub colliders: Vec<Rect>,
}

impl World {
    pub fn generate<R: Rng>(rng: &mut R) -> World {
        let center = Vec2::new(KINGDOM_CENTER_X, KINGDOM_CENTER_Y);

        let mut kingdom_polygon = Vec::with_capacity(KINGDOM_VERTEX_COUNT);
        for i in 0..KINGDOM_VERTEX_COUNT {
            let angle = i as f32 * TAU / KINGDOM_VERTEX_COUNT as f32;
            let radius = KINGDOM_RADIUS
                + rng.gen_range(-KINGDOM_RADIUS_VARIATION..KINGDOM_RADIUS_VARIATION);
            kingdom_polygon.push(Vec2::new(
                center.x + radius * angle.cos(),
                center.y + radius * angle.sin(),
            ));
        }

        // The wall ring leaves one gate opening on the bottom-most segment.
        let gate_segment = bottom_most_segment(&kingdom_polygon);
        let mut colliders = wall_ring(&kingdom_polygon, gate_segment);

        for vertex in &kingdom_polygon {
            colliders.push(Rect::from_center(*vertex, TOWER_SIZE / 2.0));
        }

        place_buildings(&kingdom_polygon, &mut colliders, rng);

        info!(
            "World generated: {} kingdom vertices, {} colliders",
            KINGDOM_VERTEX_COUNT,
            colliders.len()
        );

        World {
            width: WORLD_WIDTH,
            height: WORLD_HEIGHT,
            kingdom_polygon,
            colliders,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }

    pub fn in_kingdom(&self, point: Vec2) -> bool {
        point_in_polygon(point, &self.kingdom_polygon)
    }

    ///Builds the spatial index over all obstacle rects, clamping each to
    ///the world boundary first. Rebuilt only on a fresh world load.
    pub fn build_quadtree(&self) -> Quadtree {
        let bounds = self.bounds();
        let mut tree = Quadtree::new(bounds);
        let mut inserted = 0usize;
        let mut skipped = 0usize;
        for collider in &self.colliders {
            match bounds.intersection(collider) {
                Some(clamped) => {
                    if tree.insert(clamped) {
                        inserted += 1;
                    } else {
                        skipped += 1;
                    }
                }
                None => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("Quadtree population skipped {} out-of-bounds colliders", skipped);
        }
        info!("Quadtree populated with {} colliders", inserted);
        tree
    }
}

fn bottom_most_segment(vertices: &[Vec2]) -> usize {
    let mut best = 0;
    let mut max_y = f32::NEG_INFINITY;
    for i in 0..vertices.len() {
        let p1 = vertices[i];
        let p2 = vertices[(i + 1) % vertices.len()];
        let mid_y = (p1.y + p2.y) / 2.0;
        if mid_y > max_y {
            max_y = mid_y;
            best = i;
        }
    }
    best
}

///Lays square collision rects along every polygon segment, stepping at
///0.8x the wall thickness so neighbours overlap, with a gap of
///`GATE_OPENING_WIDTH` centered on the gate segment.
fn wall_ring(vertices: &[Vec2], gate_segment: usize) -> Vec<Rect> {
    let mut rects = Vec::new();
    let step = KINGDOM_WALL_THICKNESS * 0.8;

    for i in 0..vertices.len() {
        let p1 = vertices[i];
        let p2 = vertices[(i + 1) % vertices.len()];
        let segment = p2.sub(p1);
        let length = segment.length();
        if length < 1.0 {
            continue;
        }

        if i == gate_segment && length > GATE_OPENING_WIDTH {
            let mid = p1.add(segment.scale(0.5));
            let dir = segment.normalized();
            let gate_p1 = mid.sub(dir.scale(GATE_OPENING_WIDTH / 2.0));
            let gate_p2 = mid.add(dir.scale(GATE_OPENING_WIDTH / 2.0));
            lay_span(&mut rects, p1, gate_p1, step);
            lay_span(&mut rects, gate_p2, p2, step);
        } else {
            lay_span(&mut rects, p1, p2, step);
        }
    }
    rects
}

fn lay_span(rects: &mut Vec<Rect>, from: Vec2, to: Vec2, step: f32) {
    let span = to.sub(from);
    let length = span.length();
    if length < 1.0 {
        return;
    }
    let dir = span.normalized();
    let steps = (length / step) as usize;
    for j in 0..=steps {
        let center = from.add(dir.scale((j as f32 * step).min(length)));
        rects.push(Rect::from_center(center, KINGDOM_WALL_THICKNESS / 2.0));
    }
}

fn place_buildings<R: Rng>(polygon: &[Vec2], colliders: &mut Vec<Rect>, rng: &mut R) {
    let max_extent = KINGDOM_RADIUS + KINGDOM_RADIUS_VARIATION;
    let min_x = KINGDOM_CENTER_X - max_extent;
    let max_x = KINGDOM_CENTER_X + max_extent;
    let min_y = KINGDOM_CENTER_Y - max_extent;
    let max_y = KINGDOM_CENTER_Y + max_extent;

    let mut placed = 0usize;
    let mut attempts = 0usize;
    let max_attempts = BUILDING_COUNT * 30;

    while placed < BUILDING_COUNT && attempts < max_attempts {
        attempts += 1;
        let w = rng.gen_range(BUILDING_WIDTH_MIN..BUILDING_WIDTH_MAX);
        let h = rng.gen_range(BUILDING_HEIGHT_MIN..BUILDING_HEIGHT_MAX);
        let x = rng.gen_range(min_x..(max_x - w));
        let y = rng.gen_range(min_y..(max_y - h));
        let candidate = Rect::new(x, y, w, h);

        if !point_in_polygon(candidate.center(), polygon) {
            continue;
        }

        let padded = candidate.inflate(BUILDING_SPACING, BUILDING_SPACING);
        if colliders.iter().any(|existing| padded.intersects(existing)) {
            continue;
        }

        colliders.push(candidate);
        placed += 1;
    }

    if placed < BUILDING_COUNT {
        warn!(
            "Building placement budget exhausted: placed {} of {}",
            placed, BUILDING_COUNT
        );
    }
}
