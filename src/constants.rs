//! Global constants for the annotation widget

/// Default radius of edit handles and dots, in display pixels
pub const DEFAULT_DISC_RADIUS: f64 = 5.0;

/// Default vertical display multiplier
pub const DEFAULT_HEIGHT_ZOOM: f64 = 1.0;

/// Smallest zoom factor a zoom request can reach
pub const MIN_ZOOM: f64 = 0.05;

/// Minimum width/height/radius (natural pixels) for a drawn shape to be kept
pub const MIN_SHAPE_SIZE: f64 = 1.0;

/// Minimum number of vertices required for a valid polygon
pub const MIN_POLYGON_VERTICES: usize = 3;

/// Container class toggled while the pan modifier is held
pub const GRABBABLE_CLASS: &str = "grabbable";

/// Playback marker constants.
pub mod marker {
    /// Marker width in display pixels
    pub const WIDTH: f64 = 10.0;
    /// Marker fill (translucent magenta)
    pub const COLOR: &str = "#ff00ff80";
}
