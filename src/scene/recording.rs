//! In-memory scene that records what it is asked to draw.
//!
//! Used by the headless demo binary and by tests to observe the controller.

use std::collections::BTreeSet;

use super::{PlotItem, Primitive, SceneRenderer, Style};
use crate::model::{Point, ShapeId, ShapeKind};

/// A single call made on the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneOp {
    LoadImage(String),
    RemoveStaleImages(String),
    Plot(ShapeKind, Vec<ShapeId>),
    Update(ShapeId),
    Restyle(ShapeId),
    Remove(ShapeId),
}

/// Current contents of the scene plus a log of structural operations.
#[derive(Debug, Clone, Default)]
pub struct RecordingScene {
    pub ops: Vec<SceneOp>,
    /// Live primitives in plot order.
    pub items: Vec<PlotItem>,
    pub images: Vec<String>,
    pub draft: Option<Primitive>,
    pub handles: Vec<Point>,
    pub handle_radius: f64,
    pub classes: BTreeSet<String>,
    pub viewport: (f64, f64),
    pub container_width: f64,
    /// Marker x position while a marker is shown.
    pub marker: Option<f64>,
    pub marker_height: f64,
    pub scrolled_to: Option<f64>,
}

impl RecordingScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self, id: ShapeId) -> Option<&PlotItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes.contains(class)
    }

    /// Kinds of each plot batch, in call order.
    pub fn plotted_kinds(&self) -> Vec<ShapeKind> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                SceneOp::Plot(kind, _) => Some(*kind),
                _ => None,
            })
            .collect()
    }
}

impl SceneRenderer for RecordingScene {
    fn load_image(&mut self, url: &str) {
        self.images.push(url.to_string());
        self.ops.push(SceneOp::LoadImage(url.to_string()));
    }

    fn remove_stale_images(&mut self, keep: &str) {
        self.images.retain(|url| crate::util::file_name(url) == keep);
        self.ops.push(SceneOp::RemoveStaleImages(keep.to_string()));
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = (width, height);
    }

    fn set_container_width(&mut self, width: f64) {
        self.container_width = width;
    }

    fn set_container_class(&mut self, class: &str, enabled: bool) {
        if enabled {
            self.classes.insert(class.to_string());
        } else {
            self.classes.remove(class);
        }
    }

    fn plot(&mut self, kind: ShapeKind, items: &[PlotItem]) {
        self.items.extend_from_slice(items);
        self.ops
            .push(SceneOp::Plot(kind, items.iter().map(|item| item.id).collect()));
    }

    fn update(&mut self, id: ShapeId, primitive: &Primitive) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.primitive = primitive.clone();
        }
        self.ops.push(SceneOp::Update(id));
    }

    fn restyle(&mut self, id: ShapeId, style: &Style) {
        if let Some(item) = self.items.iter_mut().find(|item| item.id == id) {
            item.style = style.clone();
        }
        self.ops.push(SceneOp::Restyle(id));
    }

    fn remove(&mut self, id: ShapeId) {
        self.items.retain(|item| item.id != id);
        self.ops.push(SceneOp::Remove(id));
    }

    fn show_draft(&mut self, primitive: Option<&Primitive>) {
        self.draft = primitive.cloned();
    }

    fn show_handles(&mut self, handles: &[Point], radius: f64) {
        self.handles = handles.to_vec();
        self.handle_radius = radius;
    }

    fn show_marker(&mut self, x: f64, height: f64) {
        self.marker = Some(x);
        self.marker_height = height;
    }

    fn move_marker(&mut self, x: f64) {
        if self.marker.is_some() {
            self.marker = Some(x);
        }
    }

    fn remove_marker(&mut self) {
        self.marker = None;
    }

    fn scroll_into_view(&mut self, x: f64) {
        self.scrolled_to = Some(x);
    }
}
