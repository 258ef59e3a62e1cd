//! Shape types for image annotations.
//!
//! All geometry is stored in natural (unscaled) image coordinates. The
//! serialized form matches the loosely-typed objects hosts hand in: a `type`
//! discriminator next to the kind-specific fields, points as `[x, y]` pairs.

use serde::{Deserialize, Serialize};

use crate::constants::{MIN_POLYGON_VERTICES, MIN_SHAPE_SIZE};

/// Unique identifier for a shape.
pub type ShapeId = u64;

// ============================================================================
// Core Geometry Types
// ============================================================================

/// A 2D point. Serialized as an `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Calculate distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Offset by `(dx, dy)` rotated by `degrees` around the origin.
    pub fn offset_rotated(&self, dx: f64, dy: f64, degrees: f64) -> Point {
        let (sin, cos) = degrees.to_radians().sin_cos();
        Point::new(self.x + dx * cos - dy * sin, self.y + dx * sin + dy * cos)
    }
}

impl From<[f64; 2]> for Point {
    fn from([x, y]: [f64; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f64; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// An axis-aligned box, used for hit-testing and rectangle rendering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    /// Smallest box containing every point, `None` for an empty slice.
    pub fn enclosing(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        })
    }

    /// Check if a point lies inside the box grown by `tolerance` on every side.
    pub fn contains(&self, point: &Point, tolerance: f64) -> bool {
        point.x >= self.x - tolerance
            && point.x <= self.x + self.width + tolerance
            && point.y >= self.y - tolerance
            && point.y <= self.y + self.height + tolerance
    }
}

/// Corners of the axis-aligned rectangle spanned by two opposite corners,
/// ordered top-left, top-right, bottom-right, bottom-left.
pub fn rectangle_corners(a: Point, b: Point) -> Vec<Point> {
    let (left, right) = (a.x.min(b.x), a.x.max(b.x));
    let (top, bottom) = (a.y.min(b.y), a.y.max(b.y));
    vec![
        Point::new(left, top),
        Point::new(right, top),
        Point::new(right, bottom),
        Point::new(left, bottom),
    ]
}

// ============================================================================
// Shape Kinds
// ============================================================================

/// The five kinds of shape the widget understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Polygon,
    Circle,
    Ellipse,
    Dot,
}

impl ShapeKind {
    /// Get the display name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::Rectangle => "rectangle",
            ShapeKind::Polygon => "polygon",
            ShapeKind::Circle => "circle",
            ShapeKind::Ellipse => "ellipse",
            ShapeKind::Dot => "dot",
        }
    }

    /// All kinds, in the order batches are plotted.
    pub fn all() -> &'static [ShapeKind] {
        &[
            ShapeKind::Rectangle,
            ShapeKind::Polygon,
            ShapeKind::Circle,
            ShapeKind::Ellipse,
            ShapeKind::Dot,
        ]
    }
}

/// Kind-specific geometry, tagged by `type` when serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Geometry {
    /// Corner points. Interactive draws produce four corners.
    Rectangle { points: Vec<Point> },
    /// Vertices in order; the outline is closed when rendered.
    Polygon { points: Vec<Point> },
    Circle { centre: Point, radius: f64 },
    /// `phi` is the rotation in degrees around the centre.
    Ellipse {
        centre: Point,
        #[serde(rename = "radiusX")]
        radius_x: f64,
        #[serde(rename = "radiusY")]
        radius_y: f64,
        #[serde(default)]
        phi: f64,
    },
    Dot { position: Point },
}

impl Geometry {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Geometry::Rectangle { .. } => ShapeKind::Rectangle,
            Geometry::Polygon { .. } => ShapeKind::Polygon,
            Geometry::Circle { .. } => ShapeKind::Circle,
            Geometry::Ellipse { .. } => ShapeKind::Ellipse,
            Geometry::Dot { .. } => ShapeKind::Dot,
        }
    }

    /// Check if the geometry is complete enough to be kept as a shape.
    pub fn is_valid(&self) -> bool {
        match self {
            Geometry::Rectangle { points } => Bounds::enclosing(points)
                .is_some_and(|b| b.width >= MIN_SHAPE_SIZE && b.height >= MIN_SHAPE_SIZE),
            Geometry::Polygon { points } => points.len() >= MIN_POLYGON_VERTICES,
            Geometry::Circle { radius, .. } => *radius >= MIN_SHAPE_SIZE,
            Geometry::Ellipse {
                radius_x, radius_y, ..
            } => *radius_x >= MIN_SHAPE_SIZE && *radius_y >= MIN_SHAPE_SIZE,
            Geometry::Dot { .. } => true,
        }
    }

    /// Check if a point is inside/on this geometry, within `tolerance`.
    pub fn contains(&self, point: &Point, tolerance: f64) -> bool {
        match self {
            Geometry::Rectangle { points } => {
                Bounds::enclosing(points).is_some_and(|b| b.contains(point, tolerance))
            }
            Geometry::Polygon { points } => {
                points.iter().any(|v| v.distance_to(point) <= tolerance)
                    || polygon_contains(points, point)
            }
            Geometry::Circle { centre, radius } => centre.distance_to(point) <= radius + tolerance,
            Geometry::Ellipse {
                centre,
                radius_x,
                radius_y,
                phi,
            } => {
                // Rotate into the ellipse's own frame
                let (sin, cos) = (-phi.to_radians()).sin_cos();
                let (dx, dy) = (point.x - centre.x, point.y - centre.y);
                let local_x = (dx * cos - dy * sin) / (radius_x + tolerance);
                let local_y = (dx * sin + dy * cos) / (radius_y + tolerance);
                local_x * local_x + local_y * local_y <= 1.0
            }
            Geometry::Dot { position } => position.distance_to(point) <= tolerance,
        }
    }
}

/// Point-in-polygon test using ray casting.
fn polygon_contains(vertices: &[Point], point: &Point) -> bool {
    if vertices.len() < MIN_POLYGON_VERTICES {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (vi, vj) = (&vertices[i], &vertices[j]);
        if ((vi.y > point.y) != (vj.y > point.y))
            && (point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x)
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

// ============================================================================
// Shape
// ============================================================================

/// A shape in the scene: identity, labels, optional color and geometry.
///
/// The kind is fixed at construction; only geometry of the same kind,
/// categories and color change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    id: ShapeId,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(flatten)]
    geometry: Geometry,
}

impl Shape {
    pub fn new(id: ShapeId, geometry: Geometry) -> Self {
        Self {
            id,
            categories: Vec::new(),
            color: None,
            geometry,
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_color(mut self, color: Option<String>) -> Self {
        self.color = color;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn kind(&self) -> ShapeKind {
        self.geometry.kind()
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// Replace the geometry. Returns `false` and leaves the shape untouched
    /// when `geometry` is of a different kind.
    pub fn set_geometry(&mut self, geometry: Geometry) -> bool {
        if geometry.kind() != self.kind() {
            return false;
        }
        self.geometry = geometry;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        rectangle_corners(Point::new(0.0, 0.0), Point::new(100.0, 100.0))
    }

    #[test]
    fn test_rectangle_corners_normalizes_order() {
        let corners = rectangle_corners(Point::new(50.0, 80.0), Point::new(10.0, 20.0));
        assert_eq!(corners[0], Point::new(10.0, 20.0));
        assert_eq!(corners[1], Point::new(50.0, 20.0));
        assert_eq!(corners[2], Point::new(50.0, 80.0));
        assert_eq!(corners[3], Point::new(10.0, 80.0));
    }

    #[test]
    fn test_polygon_contains() {
        let poly = Geometry::Polygon { points: square() };
        assert!(poly.contains(&Point::new(50.0, 50.0), 0.0));
        assert!(!poly.contains(&Point::new(150.0, 50.0), 0.0));
        // Near a vertex counts within tolerance
        assert!(poly.contains(&Point::new(-3.0, -3.0), 5.0));
    }

    #[test]
    fn test_rotated_ellipse_contains() {
        let ellipse = Geometry::Ellipse {
            centre: Point::new(0.0, 0.0),
            radius_x: 50.0,
            radius_y: 10.0,
            phi: 90.0,
        };
        // Rotated a quarter turn, the long axis is vertical
        assert!(ellipse.contains(&Point::new(0.0, 40.0), 0.0));
        assert!(!ellipse.contains(&Point::new(40.0, 0.0), 0.0));
    }

    #[test]
    fn test_set_geometry_rejects_kind_change() {
        let mut shape = Shape::new(1, Geometry::Dot {
            position: Point::new(1.0, 2.0),
        });
        assert!(!shape.set_geometry(Geometry::Circle {
            centre: Point::new(0.0, 0.0),
            radius: 4.0,
        }));
        assert_eq!(shape.kind(), ShapeKind::Dot);
        assert!(shape.set_geometry(Geometry::Dot {
            position: Point::new(5.0, 5.0),
        }));
    }

    #[test]
    fn test_degenerate_geometry_is_invalid() {
        let flat = Geometry::Rectangle {
            points: rectangle_corners(Point::new(0.0, 0.0), Point::new(40.0, 0.5)),
        };
        assert!(!flat.is_valid());
        let two = Geometry::Polygon {
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0)],
        };
        assert!(!two.is_valid());
    }

    #[test]
    fn test_serialized_form_uses_type_tag() {
        let shape = Shape::new(7, Geometry::Ellipse {
            centre: Point::new(10.0, 20.0),
            radius_x: 5.0,
            radius_y: 3.0,
            phi: 0.0,
        })
        .with_categories(vec!["cell".to_string()]);
        let json = serde_json::to_value(&shape).expect("serialize");
        assert_eq!(json["type"], "ellipse");
        assert_eq!(json["id"], 7);
        assert_eq!(json["radiusX"], 5.0);
        assert_eq!(json["centre"], serde_json::json!([10.0, 20.0]));
        assert!(json.get("color").is_none());
    }
}
