//! Natural ↔ display coordinate mapping and zoom.
//!
//! Shapes are stored in natural image pixels. What ends up on screen is
//! `natural × ratio × zoom` horizontally, with the extra height-zoom factor
//! applied vertically.

use crate::constants::MIN_ZOOM;
use crate::model::Point;

/// Fixed per-image values computed when the image finishes loading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Statics {
    /// Natural image width.
    pub width: f64,
    /// Natural image height.
    pub height: f64,
    /// Aspect-fit scale from natural to display size.
    pub ratio: f64,
    /// Vertical display multiplier.
    pub height_zoom: f64,
    /// Radius of edit handles and dots, in display pixels.
    pub disc_radius: f64,
    /// Render shapes without a border.
    pub hide_border: bool,
}

/// Compute the aspect-fit ratio for an image inside a viewport.
///
/// `requested` holds the explicit width/height props; missing or zero values
/// fall back to the container's scroll dimensions. Images are shrunk to fit
/// but never enlarged. `natural_size` bypasses fitting entirely.
pub fn fit_ratio(
    natural: (f64, f64),
    requested: (Option<f64>, Option<f64>),
    container_scroll: (f64, f64),
    natural_size: bool,
) -> f64 {
    if natural_size {
        return 1.0;
    }
    let (natural_width, natural_height) = natural;
    let max_width = requested.0.filter(|w| *w > 0.0).unwrap_or(container_scroll.0);
    let max_height = requested.1.filter(|h| *h > 0.0).unwrap_or(container_scroll.1);

    if natural_width <= 0.0 || natural_height <= 0.0 || max_width <= 0.0 || max_height <= 0.0 {
        log::warn!(
            "Cannot fit {}x{} image into {}x{} viewport, using ratio 1",
            natural_width,
            natural_height,
            max_width,
            max_height
        );
        return 1.0;
    }

    if max_width / max_height > natural_width / natural_height {
        // Viewport is wider than the image: height constrains
        max_height.min(natural_height) / natural_height
    } else {
        max_width.min(natural_width) / natural_width
    }
}

/// Represents the ratio/zoom transform state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub ratio: f64,
    pub height_zoom: f64,
    zoom: f64,
}

impl Transform {
    /// Create a transform at zoom 1.
    pub fn new(ratio: f64, height_zoom: f64) -> Self {
        Self {
            ratio,
            height_zoom,
            zoom: 1.0,
        }
    }

    pub fn identity() -> Self {
        Self::new(1.0, 1.0)
    }

    pub fn from_statics(statics: &Statics) -> Self {
        Self::new(statics.ratio, statics.height_zoom)
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Horizontal natural → display scale.
    pub fn scale_x(&self) -> f64 {
        self.ratio * self.zoom
    }

    /// Vertical natural → display scale.
    pub fn scale_y(&self) -> f64 {
        self.ratio * self.zoom * self.height_zoom
    }

    pub fn to_display(&self, p: Point) -> Point {
        Point::new(p.x * self.scale_x(), p.y * self.scale_y())
    }

    pub fn to_natural(&self, p: Point) -> Point {
        Point::new(p.x / self.scale_x(), p.y / self.scale_y())
    }

    /// Display size of a natural-size extent.
    pub fn display_size(&self, width: f64, height: f64) -> (f64, f64) {
        (width * self.scale_x(), height * self.scale_y())
    }

    /// Apply a zoom request and return the multiplier actually applied
    /// (new zoom / old zoom).
    ///
    /// Relative requests multiply the current zoom, absolute ones replace it.
    /// The result is clamped to [`MIN_ZOOM`]; non-finite or non-positive
    /// factors are ignored.
    pub fn apply_zoom(&mut self, factor: f64, relative: bool) -> f64 {
        if !factor.is_finite() || factor <= 0.0 {
            log::warn!("Ignoring invalid zoom factor {}", factor);
            return 1.0;
        }
        let old = self.zoom;
        let target = if relative { old * factor } else { factor };
        self.zoom = target.max(MIN_ZOOM);
        self.zoom / old
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn test_fit_ratio_width_constrained() {
        // 1000x500 image into a 500x500 box: width limits
        let ratio = fit_ratio((1000.0, 500.0), (Some(500.0), Some(500.0)), (0.0, 0.0), false);
        assert!(approx_eq(ratio, 0.5));
    }

    #[test]
    fn test_fit_ratio_height_constrained() {
        // 400x800 image into a 1000x400 box: height limits
        let ratio = fit_ratio((400.0, 800.0), (Some(1000.0), Some(400.0)), (0.0, 0.0), false);
        assert!(approx_eq(ratio, 0.5));
    }

    #[test]
    fn test_fit_ratio_never_enlarges() {
        let ratio = fit_ratio((100.0, 100.0), (Some(800.0), Some(600.0)), (0.0, 0.0), false);
        assert!(approx_eq(ratio, 1.0));
    }

    #[test]
    fn test_fit_ratio_falls_back_to_container() {
        let ratio = fit_ratio((1000.0, 1000.0), (Some(0.0), None), (250.0, 500.0), false);
        assert!(approx_eq(ratio, 0.25));
    }

    #[test]
    fn test_natural_size_bypasses_fit() {
        let ratio = fit_ratio((4000.0, 3000.0), (Some(100.0), Some(100.0)), (0.0, 0.0), true);
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_degenerate_viewport_uses_unit_ratio() {
        let ratio = fit_ratio((100.0, 100.0), (None, None), (0.0, 0.0), false);
        assert_eq!(ratio, 1.0);
    }

    #[test]
    fn test_relative_zoom_composes() {
        let mut relative = Transform::new(0.5, 1.0);
        relative.apply_zoom(2.0, true);
        relative.apply_zoom(2.0, true);

        let mut absolute = Transform::new(0.5, 1.0);
        absolute.apply_zoom(4.0, false);

        assert!(approx_eq(relative.zoom(), absolute.zoom()));
        assert!(approx_eq(relative.scale_x(), 2.0));
    }

    #[test]
    fn test_apply_zoom_returns_multiplier() {
        let mut t = Transform::identity();
        assert!(approx_eq(t.apply_zoom(3.0, false), 3.0));
        assert!(approx_eq(t.apply_zoom(1.5, false), 0.5));
        assert!(approx_eq(t.apply_zoom(-2.0, true), 1.0));
        assert!(approx_eq(t.zoom(), 1.5));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut t = Transform::identity();
        t.apply_zoom(0.0001, false);
        assert!(approx_eq(t.zoom(), MIN_ZOOM));
    }

    #[test]
    fn test_display_round_trip_with_height_zoom() {
        let mut t = Transform::new(0.5, 2.0);
        t.apply_zoom(3.0, true);
        let natural = Point::new(40.0, 10.0);
        let display = t.to_display(natural);
        assert!(approx_eq(display.x, 60.0));
        assert!(approx_eq(display.y, 30.0));
        let back = t.to_natural(display);
        assert!(approx_eq(back.x, natural.x));
        assert!(approx_eq(back.y, natural.y));
    }
}
