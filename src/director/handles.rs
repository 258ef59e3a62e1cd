//! Edit handles: draggable control points of a shape being edited.

use crate::constants::MIN_SHAPE_SIZE;
use crate::model::{Geometry, Point};

/// Control points of a geometry, in natural space.
///
/// Rectangles and polygons expose every corner/vertex. Circles expose the
/// centre and a radius handle on the right. Ellipses expose the centre and
/// one handle at the end of each (rotated) axis.
pub fn control_points(geometry: &Geometry) -> Vec<Point> {
    match geometry {
        Geometry::Rectangle { points } | Geometry::Polygon { points } => points.clone(),
        Geometry::Circle { centre, radius } => {
            vec![*centre, Point::new(centre.x + radius, centre.y)]
        }
        Geometry::Ellipse {
            centre,
            radius_x,
            radius_y,
            phi,
        } => vec![
            *centre,
            centre.offset_rotated(*radius_x, 0.0, *phi),
            centre.offset_rotated(0.0, *radius_y, *phi),
        ],
        Geometry::Dot { position } => vec![*position],
    }
}

/// Index of the handle nearest to `p` within `radius`. Display space.
pub fn hit_handle(handles: &[Point], p: Point, radius: f64) -> Option<usize> {
    handles
        .iter()
        .enumerate()
        .map(|(i, h)| (i, h.distance_to(&p)))
        .filter(|(_, d)| *d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(i, _)| i)
}

/// Geometry after moving handle `index` to `p`.
///
/// Returns `None` for an out-of-range handle.
pub fn apply_handle_drag(geometry: &Geometry, index: usize, p: Point) -> Option<Geometry> {
    match geometry {
        Geometry::Rectangle { points } => {
            let mut points = points.clone();
            if index >= points.len() {
                return None;
            }
            if points.len() == 4 {
                // Neighbours follow so the box stays axis-aligned
                let next = (index + 1) % 4;
                let prev = (index + 3) % 4;
                if index % 2 == 0 {
                    points[next].y = p.y;
                    points[prev].x = p.x;
                } else {
                    points[next].x = p.x;
                    points[prev].y = p.y;
                }
            }
            points[index] = p;
            Some(Geometry::Rectangle { points })
        }
        Geometry::Polygon { points } => {
            let mut points = points.clone();
            *points.get_mut(index)? = p;
            Some(Geometry::Polygon { points })
        }
        Geometry::Circle { centre, radius } => match index {
            0 => Some(Geometry::Circle {
                centre: p,
                radius: *radius,
            }),
            1 => Some(Geometry::Circle {
                centre: *centre,
                radius: centre.distance_to(&p).max(MIN_SHAPE_SIZE),
            }),
            _ => None,
        },
        Geometry::Ellipse {
            centre,
            radius_x,
            radius_y,
            phi,
        } => match index {
            0 => Some(Geometry::Ellipse {
                centre: p,
                radius_x: *radius_x,
                radius_y: *radius_y,
                phi: *phi,
            }),
            // The x-axis handle also rotates the ellipse
            1 => Some(Geometry::Ellipse {
                centre: *centre,
                radius_x: centre.distance_to(&p).max(MIN_SHAPE_SIZE),
                radius_y: *radius_y,
                phi: (p.y - centre.y).atan2(p.x - centre.x).to_degrees(),
            }),
            2 => Some(Geometry::Ellipse {
                centre: *centre,
                radius_x: *radius_x,
                radius_y: centre.distance_to(&p).max(MIN_SHAPE_SIZE),
                phi: *phi,
            }),
            _ => None,
        },
        Geometry::Dot { .. } => (index == 0).then_some(Geometry::Dot { position: p }),
    }
}
