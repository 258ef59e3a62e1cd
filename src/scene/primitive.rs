//! Mapping from shapes to drawable primitives in display space.

use serde::Serialize;

use crate::model::{Bounds, Geometry, Point};
use crate::transform::Transform;

/// A vector primitive, positioned in display pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    /// Open while a polygon is still being drawn.
    Polygon { points: Vec<Point>, closed: bool },
    Circle { cx: f64, cy: f64, r: f64 },
    /// `rotation` in degrees.
    Ellipse {
        cx: f64,
        cy: f64,
        rx: f64,
        ry: f64,
        rotation: f64,
    },
}

impl Primitive {
    /// Primitive for a finalized shape.
    ///
    /// Rectangles render as their bounding box, dots as circles of
    /// `dot_radius` display pixels. Circles turn into ellipses when the
    /// vertical scale differs from the horizontal one.
    pub fn from_geometry(geometry: &Geometry, transform: &Transform, dot_radius: f64) -> Option<Self> {
        Self::build(geometry, transform, dot_radius, true)
    }

    /// Primitive for an in-progress draft; polygons stay open.
    pub fn preview(geometry: &Geometry, transform: &Transform, dot_radius: f64) -> Option<Self> {
        Self::build(geometry, transform, dot_radius, false)
    }

    fn build(geometry: &Geometry, t: &Transform, dot_radius: f64, closed: bool) -> Option<Self> {
        match geometry {
            Geometry::Rectangle { points } => {
                let display: Vec<Point> = points.iter().map(|p| t.to_display(*p)).collect();
                let b = Bounds::enclosing(&display)?;
                Some(Primitive::Rect {
                    x: b.x,
                    y: b.y,
                    width: b.width,
                    height: b.height,
                })
            }
            Geometry::Polygon { points } => {
                if points.is_empty() {
                    return None;
                }
                Some(Primitive::Polygon {
                    points: points.iter().map(|p| t.to_display(*p)).collect(),
                    closed,
                })
            }
            Geometry::Circle { centre, radius } => {
                let c = t.to_display(*centre);
                let (rx, ry) = (radius * t.scale_x(), radius * t.scale_y());
                if (rx - ry).abs() < f64::EPSILON {
                    Some(Primitive::Circle {
                        cx: c.x,
                        cy: c.y,
                        r: rx,
                    })
                } else {
                    Some(Primitive::Ellipse {
                        cx: c.x,
                        cy: c.y,
                        rx,
                        ry,
                        rotation: 0.0,
                    })
                }
            }
            Geometry::Ellipse {
                centre,
                radius_x,
                radius_y,
                phi,
            } => {
                let c = t.to_display(*centre);
                Some(Primitive::Ellipse {
                    cx: c.x,
                    cy: c.y,
                    rx: radius_x * t.scale_x(),
                    ry: radius_y * t.scale_y(),
                    rotation: *phi,
                })
            }
            Geometry::Dot { position } => {
                let c = t.to_display(*position);
                Some(Primitive::Circle {
                    cx: c.x,
                    cy: c.y,
                    r: dot_radius,
                })
            }
        }
    }
}
