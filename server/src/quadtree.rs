use shared::math::Rect;

pub const QT_NODE_CAPACITY: usize = 4;
pub const QT_MAX_DEPTH: usize = 10;

///Region-splitting tree over the static obstacle rectangles. Built once per
///world load and only read during simulation, so every moving entity can
///fetch the obstacles near its own footprint instead of scanning the full
///collider list.
#[derive(Debug)]
pub struct Quadtree {
    boundary: Rect,
    capacity: usize,
    depth: usize,
    items: Vec<Rect>,
    children: Option<Box<[Quadtree; 4]>>,
}

impl Quadtree {
    pub fn new(boundary: Rect) -> Quadtree {
        Quadtree::with_depth(boundary, QT_NODE_CAPACITY, 0)
    }

    fn with_depth(boundary: Rect, capacity: usize, depth: usize) -> Quadtree {
        Quadtree {
            boundary,
            capacity,
            depth,
            items: Vec::new(),
            children: None,
        }
    }

    pub fn boundary(&self) -> Rect {
        self.boundary
    }

    ///Inserts a rect, splitting the node once it holds more than `capacity`
    ///items. Returns false only when the rect lies outside this node's
    ///boundary. Rects that span a child split line stay at the enclosing
    ///node so a query on either side still finds them.
    pub fn insert(&mut self, rect: Rect) -> bool {
        if !self.boundary.intersects(&rect) {
            return false;
        }

        if self.children.is_none() && self.items.len() >= self.capacity && self.depth < QT_MAX_DEPTH
        {
            self.subdivide();
        }

        if let Some(children) = self.children.as_deref_mut() {
            for child in children.iter_mut() {
                if child.boundary.contains_rect(&rect) {
                    return child.insert(rect);
                }
            }
        }

        // Past the depth limit (or spanning a split line) the item is
        // retained here rather than recursing forever.
        self.items.push(rect);
        true
    }

    fn subdivide(&mut self) {
        let hw = self.boundary.w / 2.0;
        let hh = self.boundary.h / 2.0;
        if hw < 1.0 || hh < 1.0 {
            return;
        }

        let x = self.boundary.x;
        let y = self.boundary.y;
        let capacity = self.capacity;
        let depth = self.depth + 1;
        self.children = Some(Box::new([
            Quadtree::with_depth(Rect::new(x, y, hw, hh), capacity, depth),
            Quadtree::with_depth(Rect::new(x + hw, y, hw, hh), capacity, depth),
            Quadtree::with_depth(Rect::new(x, y + hh, hw, hh), capacity, depth),
            Quadtree::with_depth(Rect::new(x + hw, y + hh, hw, hh), capacity, depth),
        ]));

        let items = std::mem::take(&mut self.items);
        for item in items {
            self.insert(item);
        }
    }

    ///Returns every stored rect overlapping `range`.
    pub fn query(&self, range: &Rect) -> Vec<Rect> {
        let mut found = Vec::new();
        self.query_into(range, &mut found);
        found
    }

    fn query_into(&self, range: &Rect, out: &mut Vec<Rect>) {
        if !self.boundary.intersects(range) {
            return;
        }
        for item in &self.items {
            if range.intersects(item) {
                out.push(*item);
            }
        }
        if let Some(children) = self.children.as_deref() {
            for child in children.iter() {
                child.query_into(range, out);
            }
        }
    }

    pub fn len(&self) -> usize {
        let mut count = self.items.len();
        if let Some(children) = self.children.as_deref() {
            for child in children.iter() {
                count += child.len();
            }
        }
        count
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> Quadtree {
        Quadtree::new(Rect::new(0.0, 0.0, 1000.0, 1000.0))
    }

    #[test]
    fn test_insert_and_count() {
        let mut tree = world();
        assert!(tree.is_empty());
        for i in 0..10 {
            assert!(tree.insert(Rect::new(i as f32 * 50.0, 100.0, 10.0, 10.0)));
        }
        assert_eq!(tree.len(), 10);
    }

    #[test]
    fn test_insert_outside_boundary_rejected() {
        let mut tree = world();
        assert!(!tree.insert(Rect::new(2000.0, 2000.0, 10.0, 10.0)));
        assert!(tree.is_empty());
    }

    #[test]
    fn test_query_returns_only_overlapping() {
        let mut tree = world();
        tree.insert(Rect::new(100.0, 100.0, 20.0, 20.0));
        tree.insert(Rect::new(800.0, 800.0, 20.0, 20.0));

        let near_first = tree.query(&Rect::new(90.0, 90.0, 50.0, 50.0));
        assert_eq!(near_first.len(), 1);
        assert_eq!(near_first[0], Rect::new(100.0, 100.0, 20.0, 20.0));

        let nowhere = tree.query(&Rect::new(400.0, 100.0, 30.0, 30.0));
        assert!(nowhere.is_empty());
    }

    #[test]
    fn test_split_preserves_queries() {
        let mut tree = world();
        // Enough clustered items to force several subdivisions.
        for i in 0..40 {
            tree.insert(Rect::new(10.0 + i as f32 * 4.0, 10.0, 3.0, 3.0));
        }
        assert_eq!(tree.len(), 40);

        let all = tree.query(&Rect::new(0.0, 0.0, 400.0, 100.0));
        assert_eq!(all.len(), 40);
    }

    #[test]
    fn test_spanning_rect_found_from_both_sides() {
        let mut tree = world();
        // Push the root past capacity so it subdivides around the center.
        for i in 0..QT_NODE_CAPACITY {
            tree.insert(Rect::new(10.0 + i as f32 * 20.0, 10.0, 5.0, 5.0));
        }
        // Straddles the vertical split line at x=500.
        tree.insert(Rect::new(480.0, 300.0, 40.0, 10.0));

        let from_left = tree.query(&Rect::new(470.0, 295.0, 15.0, 20.0));
        let from_right = tree.query(&Rect::new(510.0, 295.0, 15.0, 20.0));
        assert_eq!(from_left.len(), 1);
        assert_eq!(from_right.len(), 1);
    }

    #[test]
    fn test_max_depth_retains_items() {
        let mut tree = world();
        // Identical rects can never separate into different children; the
        // depth cap stops the recursion and the node keeps the overflow.
        for _ in 0..50 {
            assert!(tree.insert(Rect::new(500.5, 500.5, 1.0, 1.0)));
        }
        assert_eq!(tree.len(), 50);
        let found = tree.query(&Rect::new(500.0, 500.0, 2.0, 2.0));
        assert_eq!(found.len(), 50);
    }
}
