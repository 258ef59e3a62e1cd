//! Scene renderer adapter.
//!
//! The retained vector scene (an SVG document in the browser) is an external
//! collaborator. [`SceneRenderer`] is the surface the controller drives; the
//! rules for turning shapes into primitives live in [`primitive`].

mod primitive;
pub mod recording;

pub use primitive::Primitive;

use serde::Serialize;

use crate::model::{Point, Shape, ShapeId, ShapeKind};

/// Visual attributes of a plotted shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    /// Color override; the renderer's default applies when `None`.
    pub color: Option<String>,
    /// Category labels shown with the shape.
    pub categories: Vec<String>,
    pub hide_border: bool,
}

impl Style {
    pub fn for_shape(shape: &Shape, hide_border: bool) -> Self {
        Self {
            color: shape.color.clone(),
            categories: shape.categories.clone(),
            hide_border,
        }
    }
}

/// One shape of a plot batch, tagged with its id for later lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotItem {
    pub id: ShapeId,
    pub primitive: Primitive,
    pub style: Style,
}

/// Drawing operations the controller needs from the scene.
///
/// All coordinates are display pixels.
pub trait SceneRenderer {
    /// Begin loading the background image.
    fn load_image(&mut self, url: &str);

    /// Remove background images whose file name differs from `keep`.
    fn remove_stale_images(&mut self, keep: &str);

    /// Resize the drawing surface.
    fn set_viewport(&mut self, width: f64, height: f64);

    /// Resize the outer container.
    fn set_container_width(&mut self, width: f64);

    /// Toggle a class on the outer container.
    fn set_container_class(&mut self, class: &str, enabled: bool);

    /// Create primitives for a batch of shapes of one kind.
    fn plot(&mut self, kind: ShapeKind, items: &[PlotItem]);

    /// Reposition/resize an existing primitive.
    fn update(&mut self, id: ShapeId, primitive: &Primitive);

    /// Recolor/relabel an existing primitive.
    fn restyle(&mut self, id: ShapeId, style: &Style);

    fn remove(&mut self, id: ShapeId);

    /// Show the in-progress draft, or hide it with `None`.
    fn show_draft(&mut self, primitive: Option<&Primitive>);

    /// Replace the visible edit handles. An empty slice hides them.
    fn show_handles(&mut self, handles: &[Point], radius: f64);

    fn show_marker(&mut self, x: f64, height: f64);

    fn move_marker(&mut self, x: f64);

    fn remove_marker(&mut self);

    /// Scroll the container so display column `x` is visible.
    fn scroll_into_view(&mut self, x: f64);
}
