//! In-progress shape drawn by pointer gestures.
//!
//! - Rectangle: press on one corner, drag, release on the opposite corner.
//! - Polygon: one vertex per press; closed by pressing the first vertex
//!   again or by an explicit completion (double click, Enter).
//! - Circle / Ellipse: press on the centre, drag out the radius, release.
//! - Dot: a single press.
//!
//! Points are natural-space coordinates.

use crate::constants::MIN_POLYGON_VERTICES;
use crate::model::{Geometry, Point, ShapeKind, rectangle_corners};

/// Outcome of feeding a gesture to a draft.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftStep {
    /// Still collecting input.
    Pending,
    /// The gesture finished a shape.
    Complete(Geometry),
    /// The gesture ended without a usable shape; the draft starts over.
    Discard,
}

#[derive(Debug, Clone)]
pub struct Draft {
    kind: ShapeKind,
    /// Anchor (rectangle, circle, ellipse) or vertices (polygon).
    points: Vec<Point>,
    pressed: bool,
    cursor: Option<Point>,
}

impl Draft {
    pub fn new(kind: ShapeKind) -> Self {
        Self {
            kind,
            points: Vec::new(),
            pressed: false,
            cursor: None,
        }
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Check if no point has been placed yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Start over, keeping the kind.
    pub fn reset(&mut self) {
        self.points.clear();
        self.pressed = false;
        self.cursor = None;
    }

    /// Primary button pressed at `p`. `close_radius` is how close a press
    /// must land to the first polygon vertex to close the outline.
    pub fn press(&mut self, p: Point, close_radius: f64) -> DraftStep {
        match self.kind {
            ShapeKind::Dot => DraftStep::Complete(Geometry::Dot { position: p }),
            ShapeKind::Polygon => {
                let closes = self.points.len() >= MIN_POLYGON_VERTICES
                    && self
                        .points
                        .first()
                        .is_some_and(|first| first.distance_to(&p) <= close_radius);
                if closes {
                    return self.complete();
                }
                // Second press of a double click lands on the last vertex
                if self
                    .points
                    .last()
                    .is_some_and(|last| last.distance_to(&p) <= close_radius)
                {
                    return DraftStep::Pending;
                }
                log::trace!("Polygon vertex {} at ({:.1}, {:.1})", self.points.len(), p.x, p.y);
                self.points.push(p);
                self.cursor = Some(p);
                DraftStep::Pending
            }
            ShapeKind::Rectangle | ShapeKind::Circle | ShapeKind::Ellipse => {
                self.points = vec![p];
                self.cursor = Some(p);
                self.pressed = true;
                DraftStep::Pending
            }
        }
    }

    /// Pointer moved to `p`.
    pub fn drag(&mut self, p: Point) {
        if self.kind == ShapeKind::Polygon || self.pressed {
            self.cursor = Some(p);
        }
    }

    /// Primary button released at `p`.
    pub fn release(&mut self, p: Point) -> DraftStep {
        if !self.pressed {
            return DraftStep::Pending;
        }
        self.pressed = false;
        self.cursor = Some(p);
        match self.geometry() {
            Some(geometry) if geometry.is_valid() => DraftStep::Complete(geometry),
            _ => {
                self.reset();
                DraftStep::Discard
            }
        }
    }

    /// Explicit completion. Only polygons finish this way.
    pub fn complete(&mut self) -> DraftStep {
        if self.kind != ShapeKind::Polygon || self.points.len() < MIN_POLYGON_VERTICES {
            return DraftStep::Pending;
        }
        DraftStep::Complete(Geometry::Polygon {
            points: std::mem::take(&mut self.points),
        })
    }

    /// Geometry described by the draft so far, following the cursor.
    pub fn geometry(&self) -> Option<Geometry> {
        let anchor = *self.points.first()?;
        let cursor = self.cursor.unwrap_or(anchor);
        match self.kind {
            ShapeKind::Rectangle => Some(Geometry::Rectangle {
                points: rectangle_corners(anchor, cursor),
            }),
            ShapeKind::Polygon => {
                let mut points = self.points.clone();
                if self.points.last() != Some(&cursor) {
                    points.push(cursor);
                }
                Some(Geometry::Polygon { points })
            }
            ShapeKind::Circle => Some(Geometry::Circle {
                centre: anchor,
                radius: anchor.distance_to(&cursor),
            }),
            ShapeKind::Ellipse => Some(Geometry::Ellipse {
                centre: anchor,
                radius_x: (cursor.x - anchor.x).abs(),
                radius_y: (cursor.y - anchor.y).abs(),
                phi: 0.0,
            }),
            ShapeKind::Dot => None,
        }
    }
}
