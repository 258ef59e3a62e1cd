//! Interaction controller.
//!
//! The [`Director`] owns the shapes of one widget and the scene they are
//! rendered into. It is always in exactly one of three modes: idle, drawing
//! a shape of some kind, or editing one shape. Entering a mode leaves the
//! previous one first, dropping any unfinished draft or visible handles.
//!
//! Pointer positions arrive in display space and are mapped through the
//! current [`Transform`] before they touch the model.

mod draft;
mod handles;

pub use draft::{Draft, DraftStep};
pub use handles::{apply_handle_drag, control_points, hit_handle};

use crate::callback::{Callback, Callback0};
use crate::model::{Point, Shape, ShapeId, ShapeInput, ShapeKind, ShapeStore, batch_by_kind};
use crate::scene::{PlotItem, Primitive, SceneRenderer, Style};
use crate::transform::{Statics, Transform};

/// Host notifications raised by the director.
#[derive(Debug, Default)]
pub struct DirectorActions {
    /// A drawn shape was finalized.
    pub on_added: Callback<Shape>,
    /// A shape was clicked while idle.
    pub on_selected: Callback<Shape>,
    /// A shape was right-clicked.
    pub on_context_menu: Callback<Shape>,
    /// An edit handle was released after moving.
    pub on_updated: Callback0,
}

/// Current interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Idle,
    Drawing(ShapeKind),
    Editing(ShapeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Secondary,
    Middle,
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => MouseButton::Middle,
            2 => MouseButton::Secondary,
            _ => MouseButton::Primary,
        }
    }
}

/// A pointer press, in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub button: MouseButton,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, button: MouseButton) -> Self {
        Self {
            position: Point::new(x, y),
            button,
        }
    }

    pub fn primary(x: f64, y: f64) -> Self {
        Self::new(x, y, MouseButton::Primary)
    }

    pub fn secondary(x: f64, y: f64) -> Self {
        Self::new(x, y, MouseButton::Secondary)
    }
}

#[derive(Debug, Clone, Copy)]
struct HandleDrag {
    handle: usize,
    moved: bool,
}

#[derive(Debug, Clone)]
enum Session {
    Idle,
    Drawing(Draft),
    Editing { id: ShapeId, drag: Option<HandleDrag> },
}

/// Per-widget drawing/editing state machine.
pub struct Director<R: SceneRenderer> {
    renderer: R,
    store: ShapeStore,
    transform: Transform,
    statics: Statics,
    enabled: Vec<ShapeKind>,
    session: Session,
    actions: DirectorActions,
}

impl<R: SceneRenderer> Director<R> {
    /// Create a director for a freshly loaded image and size the scene.
    pub fn new(renderer: R, statics: Statics, enabled: &[ShapeKind], actions: DirectorActions) -> Self {
        let mut director = Self {
            renderer,
            store: ShapeStore::new(),
            transform: Transform::from_statics(&statics),
            statics,
            enabled: enabled.to_vec(),
            session: Session::Idle,
            actions,
        };
        director.resize_viewport();
        log::debug!(
            "Director ready: {}x{} natural, ratio {:.3}",
            statics.width,
            statics.height,
            statics.ratio
        );
        director
    }

    /// Replace the host notifications.
    pub fn set_actions(&mut self, actions: DirectorActions) {
        self.actions = actions;
    }

    /// Give back the renderer and notifications, e.g. to rebuild for a
    /// new image.
    pub fn into_parts(self) -> (R, DirectorActions) {
        (self.renderer, self.actions)
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn mode(&self) -> Mode {
        match &self.session {
            Session::Idle => Mode::Idle,
            Session::Drawing(draft) => Mode::Drawing(draft.kind()),
            Session::Editing { id, .. } => Mode::Editing(*id),
        }
    }

    pub fn selected(&self) -> Option<ShapeId> {
        self.store.selected()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn statics(&self) -> &Statics {
        &self.statics
    }

    pub fn is_enabled(&self, kind: ShapeKind) -> bool {
        self.enabled.contains(&kind)
    }

    /// Displayed image size at the current zoom.
    pub fn display_size(&self) -> (f64, f64) {
        self.transform
            .display_size(self.statics.width, self.statics.height)
    }

    pub fn shape(&self, id: ShapeId) -> Option<&Shape> {
        self.store.get(id)
    }

    /// Snapshot of every live shape, in plot order.
    pub fn get_shapes(&self) -> Vec<Shape> {
        self.store.snapshot()
    }

    // ========================================================================
    // Shapes
    // ========================================================================

    /// Insert and render shapes, batched per kind. Shapes of disabled kinds
    /// are skipped. Returns the ids assigned, in insertion order.
    pub fn plot(&mut self, inputs: Vec<ShapeInput>) -> Vec<ShapeId> {
        let (accepted, rejected): (Vec<_>, Vec<_>) = inputs
            .into_iter()
            .partition(|input| self.enabled.contains(&input.kind()));
        if !rejected.is_empty() {
            log::warn!("Skipping {} shapes of disabled kinds", rejected.len());
        }

        let mut ids = Vec::new();
        for (kind, batch) in batch_by_kind(accepted) {
            let mut items = Vec::with_capacity(batch.len());
            for input in batch {
                let Some(primitive) = Primitive::from_geometry(
                    &input.geometry,
                    &self.transform,
                    self.statics.disc_radius,
                ) else {
                    log::debug!("Skipping {} without points", kind.name());
                    continue;
                };
                let id = self.store.insert(input);
                let style = self
                    .store
                    .get(id)
                    .map(|shape| Style::for_shape(shape, self.statics.hide_border))
                    .unwrap_or_default();
                items.push(PlotItem {
                    id,
                    primitive,
                    style,
                });
                ids.push(id);
            }
            if !items.is_empty() {
                log::debug!("Plotting {} {} shapes", items.len(), kind.name());
                self.renderer.plot(kind, &items);
            }
        }
        ids
    }

    /// Remove a shape. Unknown ids are ignored.
    pub fn remove_by_id(&mut self, id: ShapeId) -> bool {
        if self.store.remove(id).is_none() {
            log::debug!("Remove: no shape with id {}", id);
            return false;
        }
        self.renderer.remove(id);
        if matches!(self.session, Session::Editing { id: editing, .. } if editing == id) {
            self.stop_edit();
        }
        log::info!("Removed shape {}", id);
        true
    }

    /// Remove the shape being edited, or else the selected one.
    pub fn remove(&mut self) -> bool {
        let target = match self.session {
            Session::Editing { id, .. } => Some(id),
            _ => self.store.selected(),
        };
        match target {
            Some(id) => self.remove_by_id(id),
            None => false,
        }
    }

    /// Replace a shape's categories, and its color when one is given.
    /// Only the styling of the primitive changes.
    pub fn update_categories(&mut self, id: ShapeId, categories: Vec<String>, color: Option<String>) -> bool {
        let Some(shape) = self.store.get_mut(id) else {
            log::debug!("Update categories: no shape with id {}", id);
            return false;
        };
        shape.categories = categories;
        if color.is_some() {
            shape.color = color;
        }
        let style = Style::for_shape(shape, self.statics.hide_border);
        self.renderer.restyle(id, &style);
        true
    }

    /// Remove every shape and return to idle.
    pub fn clear(&mut self) {
        self.stop();
        for shape in self.store.iter() {
            self.renderer.remove(shape.id());
        }
        self.store.clear();
    }

    // ========================================================================
    // Modes
    // ========================================================================

    /// Start drawing a shape of `kind`, abandoning any current session.
    pub fn start_draw(&mut self, kind: ShapeKind) -> bool {
        if !self.enabled.contains(&kind) {
            log::warn!("Drawing {} is not enabled", kind.name());
            return false;
        }
        self.stop();
        self.session = Session::Drawing(Draft::new(kind));
        log::debug!("Drawing {}", kind.name());
        true
    }

    /// Leave drawing mode, dropping the unfinished draft.
    pub fn stop_draw(&mut self) {
        if let Session::Drawing(draft) = &self.session {
            log::debug!("Stopped drawing {}", draft.kind().name());
            self.renderer.show_draft(None);
            self.session = Session::Idle;
        }
    }

    /// Leave edit mode, hiding the handles. A handle drag cut short by
    /// this still counts as an update.
    pub fn stop_edit(&mut self) {
        if let Session::Editing { id, drag } = self.session {
            log::debug!("Stopped editing shape {}", id);
            self.renderer.show_handles(&[], self.statics.disc_radius);
            self.session = Session::Idle;
            if drag.is_some_and(|d| d.moved) {
                log::debug!("Shape {} updated", id);
                self.actions.on_updated.emit(());
            }
        }
    }

    /// Return to idle from any mode.
    pub fn stop(&mut self) {
        self.stop_draw();
        self.stop_edit();
    }

    /// Start editing a shape, abandoning any current session.
    pub fn edit(&mut self, id: ShapeId) -> bool {
        if self.store.get(id).is_none() {
            log::debug!("Edit: no shape with id {}", id);
            return false;
        }
        self.stop();
        self.store.select(Some(id));
        self.session = Session::Editing { id, drag: None };
        self.refresh_handles();
        log::debug!("Editing shape {}", id);
        true
    }

    /// Finish the polygon being drawn, if it has enough vertices.
    pub fn complete_draw(&mut self) -> Option<ShapeId> {
        let step = match &mut self.session {
            Session::Drawing(draft) => draft.complete(),
            _ => return None,
        };
        self.apply_step(step)
    }

    /// Apply a zoom request and rerender everything at the new scale.
    ///
    /// Returns the multiplier applied to the displayed size.
    pub fn zoom(&mut self, factor: f64, relative: bool) -> f64 {
        let multiplier = self.transform.apply_zoom(factor, relative);
        log::debug!("Zoom {:.3} (x{:.3})", self.transform.zoom(), multiplier);
        self.rerender();
        multiplier
    }

    // ========================================================================
    // Pointer input
    // ========================================================================

    /// Handle a button press. Returns whether the director consumed it.
    ///
    /// A secondary press is consumed only when it lands on a shape.
    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        let natural = self.transform.to_natural(event.position);
        log::trace!("Pointer down {:?} at {:?}", event.button, natural);
        match event.button {
            MouseButton::Middle => false,
            MouseButton::Secondary => {
                let Some(id) = self.store.hit_test(&natural, self.hit_tolerance()) else {
                    return false;
                };
                if let Some(shape) = self.store.get(id).cloned() {
                    self.actions.on_context_menu.emit(shape);
                }
                true
            }
            MouseButton::Primary => self.primary_down(event.position, natural),
        }
    }

    fn primary_down(&mut self, display: Point, natural: Point) -> bool {
        let close_radius = self.hit_tolerance();
        if let Session::Editing { id, .. } = self.session {
            let handles = self
                .store
                .get(id)
                .map(|shape| self.display_handles(shape))
                .unwrap_or_default();
            let Some(handle) = hit_handle(&handles, display, self.statics.disc_radius) else {
                return false;
            };
            if let Session::Editing { drag, .. } = &mut self.session {
                *drag = Some(HandleDrag {
                    handle,
                    moved: false,
                });
            }
            return true;
        }
        match &mut self.session {
            Session::Idle => {
                let hit = self.store.hit_test(&natural, close_radius);
                self.store.select(hit);
                let Some(shape) = hit.and_then(|id| self.store.get(id)).cloned() else {
                    return false;
                };
                log::debug!("Selected shape {}", shape.id());
                self.actions.on_selected.emit(shape);
                true
            }
            Session::Drawing(draft) => {
                let step = draft.press(natural, close_radius);
                self.apply_step(step);
                true
            }
            Session::Editing { .. } => false,
        }
    }

    /// Handle pointer movement. Returns whether anything changed.
    pub fn pointer_move(&mut self, position: Point) -> bool {
        let natural = self.transform.to_natural(position);
        match &mut self.session {
            Session::Idle => false,
            Session::Drawing(draft) => {
                draft.drag(natural);
                self.refresh_draft();
                true
            }
            Session::Editing { id, drag } => {
                let Some(active) = drag.as_mut() else {
                    return false;
                };
                let id = *id;
                let handle = active.handle;
                active.moved = true;
                self.move_handle(id, handle, natural)
            }
        }
    }

    /// Handle a button release. Returns whether the director consumed it.
    pub fn pointer_up(&mut self, position: Point) -> bool {
        let natural = self.transform.to_natural(position);
        match &mut self.session {
            Session::Idle => false,
            Session::Drawing(draft) => {
                let step = draft.release(natural);
                self.apply_step(step);
                true
            }
            Session::Editing { id, drag } => {
                let Some(finished) = drag.take() else {
                    return false;
                };
                if finished.moved {
                    log::debug!("Shape {} updated", id);
                    self.actions.on_updated.emit(());
                }
                true
            }
        }
    }

    /// A double click finishes the polygon being drawn.
    pub fn double_click(&mut self, _position: Point) -> bool {
        self.complete_draw().is_some()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Hit tolerance in natural units, matching the handle size on screen.
    fn hit_tolerance(&self) -> f64 {
        self.statics.disc_radius / self.transform.scale_x()
    }

    fn apply_step(&mut self, step: DraftStep) -> Option<ShapeId> {
        match step {
            DraftStep::Pending => {
                self.refresh_draft();
                None
            }
            DraftStep::Discard => {
                log::debug!("Discarded empty draft");
                self.renderer.show_draft(None);
                None
            }
            DraftStep::Complete(geometry) => {
                let kind = geometry.kind();
                self.renderer.show_draft(None);
                // Stay in drawing mode with a fresh draft
                self.session = Session::Drawing(Draft::new(kind));
                if !geometry.is_valid() {
                    log::debug!("Discarded degenerate {}", kind.name());
                    return None;
                }
                let id = self.plot(vec![ShapeInput::new(geometry)]).first().copied()?;
                let shape = self.store.get(id).cloned()?;
                log::info!("Added {} {}", kind.name(), id);
                self.actions.on_added.emit(shape);
                Some(id)
            }
        }
    }

    fn move_handle(&mut self, id: ShapeId, handle: usize, natural: Point) -> bool {
        let Some(shape) = self.store.get_mut(id) else {
            return false;
        };
        let Some(geometry) = apply_handle_drag(shape.geometry(), handle, natural) else {
            return false;
        };
        shape.set_geometry(geometry);
        log::trace!("Shape {} handle {} -> {:?}", id, handle, natural);
        self.rerender_shape(id);
        self.refresh_handles();
        true
    }

    fn display_handles(&self, shape: &Shape) -> Vec<Point> {
        control_points(shape.geometry())
            .into_iter()
            .map(|p| self.transform.to_display(p))
            .collect()
    }

    fn refresh_handles(&mut self) {
        let Session::Editing { id, .. } = self.session else {
            return;
        };
        let handles = self
            .store
            .get(id)
            .map(|shape| self.display_handles(shape))
            .unwrap_or_default();
        self.renderer
            .show_handles(&handles, self.statics.disc_radius);
    }

    fn refresh_draft(&mut self) {
        let Session::Drawing(draft) = &self.session else {
            return;
        };
        let preview = draft.geometry().and_then(|geometry| {
            Primitive::preview(&geometry, &self.transform, self.statics.disc_radius)
        });
        self.renderer.show_draft(preview.as_ref());
    }

    fn rerender_shape(&mut self, id: ShapeId) {
        let primitive = self.store.get(id).and_then(|shape| {
            Primitive::from_geometry(shape.geometry(), &self.transform, self.statics.disc_radius)
        });
        if let Some(primitive) = primitive {
            self.renderer.update(id, &primitive);
        }
    }

    fn resize_viewport(&mut self) {
        let (width, height) = self.display_size();
        self.renderer.set_viewport(width, height);
    }

    fn rerender(&mut self) {
        self.resize_viewport();
        let ids: Vec<ShapeId> = self.store.iter().map(Shape::id).collect();
        for id in ids {
            self.rerender_shape(id);
        }
        self.refresh_draft();
        self.refresh_handles();
    }
}
