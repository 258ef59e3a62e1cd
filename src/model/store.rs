//! Storage for the shapes of a single widget.

use super::ingest::ShapeInput;
use super::shape::{Point, Shape, ShapeId};

/// Live shapes in plot order, with id allocation and selection.
#[derive(Debug, Clone)]
pub struct ShapeStore {
    /// All shapes, in the order they were plotted.
    shapes: Vec<Shape>,
    /// Counter for generating unique shape IDs.
    next_id: ShapeId,
    /// Currently selected shape ID.
    selected_id: Option<ShapeId>,
}

impl Default for ShapeStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ShapeStore {
    pub fn new() -> Self {
        Self {
            shapes: Vec::new(),
            next_id: 1,
            selected_id: None,
        }
    }

    /// Add a shape and return its ID.
    ///
    /// A requested id is kept when no live shape uses it; otherwise a fresh
    /// id is allocated.
    pub fn insert(&mut self, input: ShapeInput) -> ShapeId {
        let id = match input.id {
            Some(requested) if self.get(requested).is_none() => requested,
            Some(requested) => {
                log::warn!("Shape id {} already in use, assigning a fresh id", requested);
                self.allocate_id()
            }
            None => self.allocate_id(),
        };
        if let Some(next) = id.checked_add(1) {
            self.next_id = self.next_id.max(next);
        }
        self.shapes.push(
            Shape::new(id, input.geometry)
                .with_categories(input.categories)
                .with_color(input.color),
        );
        id
    }

    /// Next free id, wrapping to 1 past `ShapeId::MAX`.
    fn allocate_id(&mut self) -> ShapeId {
        let mut id = self.next_id;
        while self.get(id).is_some() {
            id = id.checked_add(1).unwrap_or(1);
        }
        self.next_id = id.checked_add(1).unwrap_or(1);
        id
    }

    /// Remove a shape by ID.
    pub fn remove(&mut self, id: ShapeId) -> Option<Shape> {
        let index = self.shapes.iter().position(|s| s.id() == id)?;
        if self.selected_id == Some(id) {
            self.selected_id = None;
        }
        Some(self.shapes.remove(index))
    }

    /// Get a shape by ID.
    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    /// Get a mutable reference to a shape by ID.
    pub fn get_mut(&mut self, id: ShapeId) -> Option<&mut Shape> {
        self.shapes.iter_mut().find(|s| s.id() == id)
    }

    /// Iterate shapes in plot order.
    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Clear all shapes.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.selected_id = None;
    }

    /// Select a shape, or clear the selection with `None`.
    pub fn select(&mut self, id: Option<ShapeId>) {
        self.selected_id = id.filter(|id| self.get(*id).is_some());
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.selected_id
    }

    /// Find the top-most shape (last plotted) under a natural-space point.
    pub fn hit_test(&self, point: &Point, tolerance: f64) -> Option<ShapeId> {
        self.shapes
            .iter()
            .rev()
            .find(|s| s.geometry().contains(point, tolerance))
            .map(Shape::id)
    }

    /// Copy of every shape, in plot order.
    pub fn snapshot(&self) -> Vec<Shape> {
        self.shapes.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Geometry, rectangle_corners};

    fn rect(x: f64, y: f64, size: f64) -> ShapeInput {
        ShapeInput::new(Geometry::Rectangle {
            points: rectangle_corners(Point::new(x, y), Point::new(x + size, y + size)),
        })
    }

    #[test]
    fn test_shape_store() {
        let mut store = ShapeStore::new();
        let id1 = store.insert(rect(10.0, 10.0, 50.0));
        let id2 = store.insert(rect(100.0, 100.0, 5.0));

        assert_eq!(store.len(), 2);
        assert_ne!(id1, id2);

        store.remove(id1);
        assert_eq!(store.len(), 1);
        assert!(store.get(id1).is_none());
        assert!(store.remove(id1).is_none());
    }

    #[test]
    fn test_requested_ids_are_kept_unless_taken() {
        let mut store = ShapeStore::new();
        assert_eq!(store.insert(rect(0.0, 0.0, 5.0).with_id(7)), 7);
        let dup = store.insert(rect(0.0, 0.0, 5.0).with_id(7));
        assert_ne!(dup, 7);
        // Fresh ids never collide with requested ones
        let fresh = store.insert(rect(0.0, 0.0, 5.0));
        assert!(fresh != 7 && fresh != dup);
    }

    #[test]
    fn test_fresh_ids_after_largest_id() {
        let mut store = ShapeStore::new();
        assert_eq!(store.insert(rect(0.0, 0.0, 5.0).with_id(ShapeId::MAX)), ShapeId::MAX);
        let a = store.insert(rect(0.0, 0.0, 5.0));
        let b = store.insert(rect(0.0, 0.0, 5.0));
        assert_eq!(a, 1);
        assert_eq!(b, 2);
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_hit_test_prefers_top_most() {
        let mut store = ShapeStore::new();
        let below = store.insert(rect(0.0, 0.0, 100.0));
        let above = store.insert(rect(20.0, 20.0, 20.0));

        assert_eq!(store.hit_test(&Point::new(30.0, 30.0), 0.0), Some(above));
        assert_eq!(store.hit_test(&Point::new(80.0, 80.0), 0.0), Some(below));
        assert_eq!(store.hit_test(&Point::new(300.0, 300.0), 0.0), None);
    }

    #[test]
    fn test_removing_selected_clears_selection() {
        let mut store = ShapeStore::new();
        let id = store.insert(rect(0.0, 0.0, 10.0));
        store.select(Some(id));
        assert_eq!(store.selected(), Some(id));
        store.remove(id);
        assert_eq!(store.selected(), None);

        store.select(Some(99));
        assert_eq!(store.selected(), None);
    }
}
