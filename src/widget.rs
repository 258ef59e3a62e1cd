//! The mounted widget: image loading, host handles, keys and playback.
//!
//! A [`Widget`] owns its scene from construction. The [`Director`] only
//! exists once the image has loaded and its natural size is known; loading
//! a new image tears the old one down first. While mounted, the widget
//! holds exactly one window listener [`Subscription`].

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;
use web_time::Instant;

use crate::callback::{Callback, Callback0};
use crate::config::AnnotatorConfig;
use crate::constants::GRABBABLE_CLASS;
use crate::director::{Director, DirectorActions, Mode, MouseButton, PointerEvent};
use crate::keybindings::{KeyAction, KeyBindings};
use crate::listeners::{EventHub, Subscription, WindowEvent};
use crate::model::{Point, Shape, ShapeId, ShapeInput, ShapeKind};
use crate::playback::{PlaybackMarker, normalized_position};
use crate::scene::SceneRenderer;
use crate::transform::{Statics, fit_ratio};
use crate::util::file_name;

/// Reported to the host once the image is loaded and shapes are plotted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadyInfo {
    pub natural_width: f64,
    pub natural_height: f64,
    pub display_width: f64,
    pub display_height: f64,
    pub ratio: f64,
}

/// Every host notification of a widget.
#[derive(Debug, Default)]
pub struct WidgetCallbacks {
    pub on_ready: Callback<ReadyInfo>,
    pub on_added: Callback<Shape>,
    pub on_selected: Callback<Shape>,
    pub on_context_menu: Callback<Shape>,
    pub on_updated: Callback0,
    /// Normalized position of a right-click on empty canvas.
    pub on_right_click: Callback<f64>,
}

impl WidgetCallbacks {
    fn split(self) -> (Callback<ReadyInfo>, Callback<f64>, DirectorActions) {
        (
            self.on_ready,
            self.on_right_click,
            DirectorActions {
                on_added: self.on_added,
                on_selected: self.on_selected,
                on_context_menu: self.on_context_menu,
                on_updated: self.on_updated,
            },
        )
    }
}

enum Stage<R: SceneRenderer> {
    /// Waiting for the image; nothing is plotted.
    Loading { scene: R, actions: DirectorActions },
    Ready(Director<R>),
}

pub struct Widget<R: SceneRenderer> {
    config: AnnotatorConfig,
    initial_shapes: Vec<ShapeInput>,
    stage: Option<Stage<R>>,
    playback: Option<PlaybackMarker>,
    /// File name of the image load in flight.
    expected_image: Option<String>,
    container_width: f64,
    bindings: KeyBindings,
    window_listener: Option<Subscription>,
    on_ready: Callback<ReadyInfo>,
    on_right_click: Callback<f64>,
}

impl<R: SceneRenderer> Widget<R> {
    pub fn new(config: AnnotatorConfig, scene: R, callbacks: WidgetCallbacks) -> Self {
        let config = config.sanitize();
        let initial_shapes = config.initial_shapes();
        let playback = config
            .variant
            .has_playback()
            .then(|| PlaybackMarker::new(config.duration));
        let (on_ready, on_right_click, actions) = callbacks.split();
        Self {
            container_width: config.width.filter(|w| *w > 0.0).unwrap_or(0.0),
            config,
            initial_shapes,
            stage: Some(Stage::Loading { scene, actions }),
            playback,
            expected_image: None,
            bindings: KeyBindings::default(),
            window_listener: None,
            on_ready,
            on_right_click,
        }
    }

    /// Replace the host notifications.
    pub fn set_callbacks(&mut self, callbacks: WidgetCallbacks) {
        let (on_ready, on_right_click, actions) = callbacks.split();
        self.on_ready = on_ready;
        self.on_right_click = on_right_click;
        match self.stage.as_mut() {
            Some(Stage::Loading { actions: current, .. }) => *current = actions,
            Some(Stage::Ready(director)) => director.set_actions(actions),
            None => {}
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Mount the widget, holding `window_listener` until unmounted, and
    /// start loading the image. A mounted widget is unmounted first.
    pub fn mount(&mut self, window_listener: Subscription) {
        self.unmount();
        self.window_listener = Some(window_listener);
        log::debug!("Widget mounted");
        self.begin_load();
    }

    /// Tear down shapes, playback and the window listener.
    pub fn unmount(&mut self) {
        if !self.is_mounted() {
            return;
        }
        self.release_director();
        self.stop_playback();
        self.expected_image = None;
        if let Some(scene) = self.scene_mut() {
            scene.set_container_class(GRABBABLE_CLASS, false);
        }
        self.window_listener = None;
        log::debug!("Widget unmounted");
    }

    /// Switch to another image. The current shapes are discarded.
    pub fn set_image(&mut self, url: impl Into<String>) {
        self.config.image_url = url.into();
        if self.is_mounted() {
            self.release_director();
            self.stop_playback();
            self.begin_load();
        }
    }

    fn begin_load(&mut self) {
        let url = self.config.image_url.clone();
        if url.is_empty() {
            log::warn!("No image to load");
            return;
        }
        self.expected_image = Some(file_name(&url).to_string());
        log::debug!("Loading image {}", url);
        if let Some(scene) = self.scene_mut() {
            scene.load_image(&url);
        }
    }

    /// The scene finished loading `src`, whose natural size is `natural`.
    ///
    /// Completions for an image other than the one last requested are
    /// stale: their image elements are removed and nothing else happens.
    /// Returns whether the widget became ready.
    pub fn image_loaded(&mut self, src: &str, natural: (f64, f64), container_scroll: (f64, f64)) -> bool {
        if !self.is_mounted() {
            log::debug!("Ignoring image load while unmounted");
            return false;
        }
        let Some(expected) = self.expected_image.clone() else {
            return false;
        };
        if file_name(src) != expected {
            log::debug!("Discarding stale load of {} (expecting {})", src, expected);
            if let Some(scene) = self.scene_mut() {
                scene.remove_stale_images(&expected);
            }
            return false;
        }

        let Some((mut scene, actions)) = self.take_parts() else {
            return false;
        };
        let config = &self.config;
        let ratio = fit_ratio(
            natural,
            (config.width, config.height),
            container_scroll,
            config.natural_size,
        );
        let statics = Statics {
            width: natural.0,
            height: natural.1,
            ratio,
            height_zoom: config.height_zoom,
            disc_radius: config.disc_radius,
            hide_border: config.hide_border,
        };
        self.container_width = config.width.filter(|w| *w > 0.0).unwrap_or(natural.0);
        scene.set_container_width(self.container_width);

        let mut director = Director::new(scene, statics, config.variant.enabled_kinds(), actions);
        let plotted = director.plot(self.initial_shapes.clone()).len();
        let (display_width, display_height) = director.display_size();
        self.stage = Some(Stage::Ready(director));

        log::info!(
            "Widget ready: {} ({}x{} at ratio {:.3}), {} shapes",
            expected,
            natural.0,
            natural.1,
            ratio,
            plotted
        );
        self.on_ready.emit(ReadyInfo {
            natural_width: natural.0,
            natural_height: natural.1,
            display_width,
            display_height,
            ratio,
        });
        true
    }

    /// Take the scene and notifications out, clearing a live director.
    fn take_parts(&mut self) -> Option<(R, DirectorActions)> {
        match self.stage.take()? {
            Stage::Loading { scene, actions } => Some((scene, actions)),
            Stage::Ready(mut director) => {
                director.clear();
                Some(director.into_parts())
            }
        }
    }

    fn release_director(&mut self) {
        if let Some((scene, actions)) = self.take_parts() {
            self.stage = Some(Stage::Loading { scene, actions });
        }
    }

    // ========================================================================
    // Inspection
    // ========================================================================

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    pub fn is_mounted(&self) -> bool {
        self.window_listener.is_some()
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.stage, Some(Stage::Ready(_)))
    }

    pub fn director(&self) -> Option<&Director<R>> {
        match self.stage.as_ref()? {
            Stage::Ready(director) => Some(director),
            Stage::Loading { .. } => None,
        }
    }

    pub fn director_mut(&mut self) -> Option<&mut Director<R>> {
        match self.stage.as_mut()? {
            Stage::Ready(director) => Some(director),
            Stage::Loading { .. } => None,
        }
    }

    pub fn scene(&self) -> Option<&R> {
        match self.stage.as_ref()? {
            Stage::Loading { scene, .. } => Some(scene),
            Stage::Ready(director) => Some(director.renderer()),
        }
    }

    pub fn scene_mut(&mut self) -> Option<&mut R> {
        match self.stage.as_mut()? {
            Stage::Loading { scene, .. } => Some(scene),
            Stage::Ready(director) => Some(director.renderer_mut()),
        }
    }

    pub fn mode(&self) -> Mode {
        self.director().map_or(Mode::Idle, Director::mode)
    }

    pub fn playback(&self) -> Option<&PlaybackMarker> {
        self.playback.as_ref()
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn bindings_mut(&mut self) -> &mut KeyBindings {
        &mut self.bindings
    }

    // ========================================================================
    // Host handles
    // ========================================================================

    /// Enter drawing mode for `kind`.
    pub fn draw(&mut self, kind: ShapeKind) -> bool {
        match self.director_mut() {
            Some(director) => director.start_draw(kind),
            None => {
                log::debug!("Cannot draw {} before the image is loaded", kind.name());
                false
            }
        }
    }

    pub fn draw_rectangle(&mut self) -> bool {
        self.draw(ShapeKind::Rectangle)
    }

    pub fn draw_polygon(&mut self) -> bool {
        self.draw(ShapeKind::Polygon)
    }

    pub fn draw_circle(&mut self) -> bool {
        self.draw(ShapeKind::Circle)
    }

    pub fn draw_ellipse(&mut self) -> bool {
        self.draw(ShapeKind::Ellipse)
    }

    pub fn draw_dot(&mut self) -> bool {
        self.draw(ShapeKind::Dot)
    }

    /// Return to idle, abandoning any draw or edit.
    pub fn stop(&mut self) {
        if let Some(director) = self.director_mut() {
            director.stop();
        }
    }

    pub fn stop_edit(&mut self) {
        if let Some(director) = self.director_mut() {
            director.stop_edit();
        }
    }

    pub fn edit(&mut self, id: ShapeId) -> bool {
        self.director_mut().is_some_and(|director| director.edit(id))
    }

    pub fn delete(&mut self, id: ShapeId) -> bool {
        self.director_mut()
            .is_some_and(|director| director.remove_by_id(id))
    }

    pub fn update_categories(&mut self, id: ShapeId, categories: Vec<String>, color: Option<String>) -> bool {
        self.director_mut()
            .is_some_and(|director| director.update_categories(id, categories, color))
    }

    /// Zoom the image and everything on it. The container width follows.
    pub fn zoom(&mut self, factor: f64, relative: bool) -> f64 {
        let Some(Stage::Ready(director)) = self.stage.as_mut() else {
            log::debug!("Cannot zoom before the image is loaded");
            return 1.0;
        };
        let multiplier = director.zoom(factor, relative);
        self.container_width *= multiplier;
        director
            .renderer_mut()
            .set_container_width(self.container_width);
        if let Some(playback) = self.playback.as_mut() {
            playback.rescale(multiplier);
        }
        multiplier
    }

    /// Snapshot of the current shapes. Empty until the image has loaded.
    pub fn get_shapes(&self) -> Vec<Shape> {
        self.director().map(Director::get_shapes).unwrap_or_default()
    }

    /// Start playback from normalized `position` without notifying the host.
    pub fn set_marker_position(&mut self, position: f64) -> bool {
        self.start_marker(position.clamp(0.0, 1.0), Instant::now())
    }

    /// Remove the marker and halt its sweep.
    pub fn stop_playback(&mut self) {
        let Some(playback) = self.playback.as_mut() else {
            return;
        };
        playback.stop();
        if let Some(Stage::Ready(director)) = self.stage.as_mut() {
            director.renderer_mut().remove_marker();
        }
    }

    fn start_marker(&mut self, position: f64, now: Instant) -> bool {
        let (Some(playback), Some(Stage::Ready(director))) = (self.playback.as_mut(), self.stage.as_mut()) else {
            return false;
        };
        let start_x = playback.start(position, self.container_width, now);
        let (_, height) = director.display_size();
        let scene = director.renderer_mut();
        scene.remove_marker();
        scene.show_marker(start_x, height);
        scene.scroll_into_view(start_x);
        true
    }

    /// Advance the playback marker. Call once per animation frame.
    ///
    /// Returns the marker column while a sweep is running.
    pub fn tick(&mut self, now: Instant) -> Option<f64> {
        let (Some(playback), Some(Stage::Ready(director))) = (self.playback.as_mut(), self.stage.as_mut()) else {
            return None;
        };
        let x = playback.advance(now)?;
        let scene = director.renderer_mut();
        scene.move_marker(x);
        scene.scroll_into_view(x);
        if playback.is_finished(now) {
            // The marker stays parked at the far edge
            playback.stop();
        }
        Some(x)
    }

    // ========================================================================
    // Input
    // ========================================================================

    /// Handle a button press over the image.
    ///
    /// A right-click the shapes do not consume drives the playback marker.
    pub fn pointer_down(&mut self, event: PointerEvent) -> bool {
        let consumed = self
            .director_mut()
            .is_some_and(|director| director.pointer_down(event));
        if consumed || event.button != MouseButton::Secondary {
            return consumed;
        }
        self.right_click(event.position.x)
    }

    fn right_click(&mut self, x: f64) -> bool {
        if self.playback.is_none() {
            return false;
        }
        let position = normalized_position(x, self.container_width);
        if !self.start_marker(position, Instant::now()) {
            log::debug!("No marker before the image is loaded");
        }
        self.on_right_click.emit(position);
        true
    }

    pub fn pointer_move(&mut self, position: Point) -> bool {
        self.director_mut()
            .is_some_and(|director| director.pointer_move(position))
    }

    pub fn pointer_up(&mut self, position: Point) -> bool {
        self.director_mut()
            .is_some_and(|director| director.pointer_up(position))
    }

    pub fn double_click(&mut self, position: Point) -> bool {
        self.director_mut()
            .is_some_and(|director| director.double_click(position))
    }

    /// React to a window keyboard or focus event.
    pub fn handle_window_event(&mut self, event: WindowEvent) {
        match event {
            WindowEvent::KeyDown(key) => {
                if self.bindings.action_for_key(key) == Some(KeyAction::PanCursor) {
                    self.set_grabbable(true);
                }
            }
            WindowEvent::KeyUp(key) => match self.bindings.action_for_key(key) {
                Some(KeyAction::PanCursor) => self.set_grabbable(false),
                Some(KeyAction::DeleteSelected) => {
                    if let Some(director) = self.director_mut() {
                        director.remove();
                    }
                }
                Some(KeyAction::StopEdit) => self.stop_edit(),
                Some(KeyAction::FinishPolygon) => {
                    if let Some(director) = self.director_mut() {
                        director.complete_draw();
                    }
                }
                None => {}
            },
            WindowEvent::Blur => self.set_grabbable(false),
        }
    }

    fn set_grabbable(&mut self, enabled: bool) {
        if let Some(scene) = self.scene_mut() {
            scene.set_container_class(GRABBABLE_CLASS, enabled);
        }
    }
}

impl<R: SceneRenderer + 'static> Widget<R> {
    /// Window event handler bound to a shared widget.
    ///
    /// The handler holds a weak reference, so it never keeps a dropped
    /// widget alive.
    pub fn window_handler(this: &Rc<RefCell<Self>>) -> impl FnMut(&WindowEvent) + 'static {
        let widget = Rc::downgrade(this);
        move |event: &WindowEvent| {
            if let Some(widget) = widget.upgrade() {
                if let Ok(mut widget) = widget.try_borrow_mut() {
                    widget.handle_window_event(*event);
                }
            }
        }
    }

    /// Subscribe a shared widget to `hub` and mount it.
    pub fn attach(this: &Rc<RefCell<Self>>, hub: &EventHub<WindowEvent>) {
        let subscription = hub.subscribe(Self::window_handler(this));
        this.borrow_mut().mount(subscription);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WidgetVariant;
    use crate::keybindings::Key;
    use crate::scene::recording::{RecordingScene, SceneOp};
    use serde_json::json;
    use std::cell::Cell;
    use std::time::Duration;

    #[derive(Default, Clone)]
    struct Reported {
        ready: Rc<Cell<usize>>,
        added: Rc<Cell<usize>>,
        context_menu: Rc<Cell<usize>>,
        right_clicks: Rc<RefCell<Vec<f64>>>,
    }

    impl Reported {
        fn callbacks(&self) -> WidgetCallbacks {
            let ready = self.ready.clone();
            let added = self.added.clone();
            let context_menu = self.context_menu.clone();
            let right_clicks = self.right_clicks.clone();
            WidgetCallbacks {
                on_ready: Callback::new(move |_: ReadyInfo| ready.set(ready.get() + 1)),
                on_added: Callback::new(move |_: Shape| added.set(added.get() + 1)),
                on_context_menu: Callback::new(move |_: Shape| context_menu.set(context_menu.get() + 1)),
                on_right_click: Callback::new(move |p: f64| right_clicks.borrow_mut().push(p)),
                ..Default::default()
            }
        }
    }

    fn config() -> AnnotatorConfig {
        let mut config = AnnotatorConfig::new("https://host/frames/frame1.png");
        config.duration = 10.0;
        config.shapes = vec![
            json!({"type": "rectangle", "points": [[100, 100], [300, 100], [300, 300], [100, 300]]}),
            json!({"type": "dot", "position": [900, 400]}),
        ];
        config
    }

    /// Mounted and loaded 1000x500 image shown at ratio 1.
    fn ready_widget(config: AnnotatorConfig) -> (Rc<RefCell<Widget<RecordingScene>>>, EventHub<WindowEvent>, Reported) {
        let reported = Reported::default();
        let widget = Rc::new(RefCell::new(Widget::new(
            config,
            RecordingScene::new(),
            reported.callbacks(),
        )));
        let hub = EventHub::new();
        Widget::attach(&widget, &hub);
        let url = widget.borrow().config().image_url.clone();
        assert!(widget.borrow_mut().image_loaded(&url, (1000.0, 500.0), (1000.0, 500.0)));
        (widget, hub, reported)
    }

    #[test]
    fn test_load_plots_initial_shapes_and_reports_ready() {
        let (widget, _hub, reported) = ready_widget(config());
        let widget = widget.borrow();
        assert_eq!(reported.ready.get(), 1);
        assert!(widget.is_ready());
        assert_eq!(widget.get_shapes().len(), 2);
        assert_eq!(widget.container_width(), 1000.0);
        let scene = widget.scene().expect("scene");
        assert_eq!(scene.viewport, (1000.0, 500.0));
        assert_eq!(scene.container_width, 1000.0);
        assert_eq!(scene.plotted_kinds(), vec![ShapeKind::Rectangle, ShapeKind::Dot]);
    }

    #[test]
    fn test_stale_image_load_is_discarded() {
        let reported = Reported::default();
        let mut widget = Widget::new(config(), RecordingScene::new(), reported.callbacks());
        widget.mount(Subscription::new(|| {}));
        widget.set_image("https://host/frames/frame2.png");

        assert!(!widget.image_loaded("https://host/frames/frame1.png", (10.0, 10.0), (10.0, 10.0)));
        assert!(!widget.is_ready());
        let scene = widget.scene().expect("scene");
        assert!(scene.ops.contains(&SceneOp::RemoveStaleImages("frame2.png".to_string())));
        assert_eq!(scene.images, vec!["https://host/frames/frame2.png".to_string()]);

        assert!(widget.image_loaded("/frames/frame2.png?cache=1", (10.0, 10.0), (10.0, 10.0)));
        assert_eq!(reported.ready.get(), 1);
    }

    #[test]
    fn test_handles_are_no_ops_before_load() {
        let mut widget = Widget::new(config(), RecordingScene::new(), WidgetCallbacks::default());
        assert!(!widget.draw_rectangle());
        assert!(!widget.delete(1));
        assert_eq!(widget.zoom(2.0, true), 1.0);
        assert!(widget.get_shapes().is_empty());
        // Not mounted: loads are ignored
        assert!(!widget.image_loaded("https://host/frames/frame1.png", (10.0, 10.0), (10.0, 10.0)));
    }

    #[test]
    fn test_right_click_on_empty_canvas_starts_playback() {
        let (widget, _hub, reported) = ready_widget(config());
        let mut widget = widget.borrow_mut();

        assert!(widget.pointer_down(PointerEvent::secondary(250.0, 450.0)));
        assert_eq!(*reported.right_clicks.borrow(), vec![0.25]);
        assert_eq!(reported.context_menu.get(), 0);
        {
            let scene = widget.scene().expect("scene");
            assert_eq!(scene.marker, Some(250.0));
            assert_eq!(scene.marker_height, 500.0);
            assert_eq!(scene.scrolled_to, Some(250.0));
        }

        // 7.5s remain; well past that the marker sits at the far edge
        let later = Instant::now() + Duration::from_secs(30);
        assert_eq!(widget.tick(later), Some(1000.0));
        assert_eq!(widget.scene().and_then(|s| s.marker), Some(1000.0));

        widget.stop_playback();
        assert_eq!(widget.scene().and_then(|s| s.marker), None);
        assert_eq!(widget.tick(later), None);
    }

    #[test]
    fn test_right_click_on_shape_opens_context_menu_only() {
        let (widget, _hub, reported) = ready_widget(config());
        let mut widget = widget.borrow_mut();
        assert!(widget.pointer_down(PointerEvent::secondary(200.0, 200.0)));
        assert_eq!(reported.context_menu.get(), 1);
        assert!(reported.right_clicks.borrow().is_empty());
        assert_eq!(widget.scene().and_then(|s| s.marker), None);
    }

    #[test]
    fn test_right_click_before_load_still_reports_position() {
        let reported = Reported::default();
        let mut cfg = config();
        cfg.width = Some(400.0);
        let mut widget = Widget::new(cfg, RecordingScene::new(), reported.callbacks());
        assert!(widget.pointer_down(PointerEvent::secondary(100.0, 10.0)));
        assert_eq!(*reported.right_clicks.borrow(), vec![0.25]);
        assert_eq!(widget.scene().and_then(|s| s.marker), None);
    }

    #[test]
    fn test_set_marker_position_does_not_notify() {
        let (widget, _hub, reported) = ready_widget(config());
        let mut widget = widget.borrow_mut();
        assert!(widget.set_marker_position(0.5));
        assert_eq!(widget.scene().and_then(|s| s.marker), Some(500.0));
        assert!(reported.right_clicks.borrow().is_empty());
    }

    #[test]
    fn test_zoom_scales_container_and_marker() {
        let (widget, _hub, _) = ready_widget(config());
        let mut widget = widget.borrow_mut();
        widget.set_marker_position(0.5);
        assert_eq!(widget.zoom(2.0, true), 2.0);
        assert_eq!(widget.container_width(), 2000.0);
        assert_eq!(widget.scene().map(|s| s.container_width), Some(2000.0));
        assert_eq!(widget.playback().and_then(|p| p.advance(Instant::now() - Duration::from_secs(1))), Some(1000.0));
        assert_eq!(widget.zoom(0.5, false), 0.25);
        assert_eq!(widget.container_width(), 500.0);
    }

    #[test]
    fn test_editor_variant_limits_kinds_and_playback() {
        let mut cfg = config();
        cfg.variant = WidgetVariant::Editor;
        let (widget, _hub, reported) = ready_widget(cfg);
        let mut widget = widget.borrow_mut();

        // The initial dot is not plotted
        assert_eq!(widget.get_shapes().len(), 1);
        assert!(!widget.draw_ellipse());
        assert!(!widget.draw_dot());
        assert!(widget.draw_circle());

        widget.stop();
        assert!(!widget.pointer_down(PointerEvent::secondary(700.0, 450.0)));
        assert!(reported.right_clicks.borrow().is_empty());
        assert!(widget.playback().is_none());
    }

    #[test]
    fn test_keyboard_bindings() {
        let (widget, hub, _) = ready_widget(config());

        hub.dispatch(&WindowEvent::KeyDown(Key::Control));
        assert!(widget.borrow().scene().is_some_and(|s| s.has_class(GRABBABLE_CLASS)));
        hub.dispatch(&WindowEvent::Blur);
        assert!(!widget.borrow().scene().is_some_and(|s| s.has_class(GRABBABLE_CLASS)));
        hub.dispatch(&WindowEvent::KeyDown(Key::Control));
        hub.dispatch(&WindowEvent::KeyUp(Key::Control));
        assert!(!widget.borrow().scene().is_some_and(|s| s.has_class(GRABBABLE_CLASS)));

        // Escape leaves edit mode, Delete removes the selected shape
        let id = widget.borrow().get_shapes()[0].id();
        assert!(widget.borrow_mut().edit(id));
        hub.dispatch(&WindowEvent::KeyUp(Key::Escape));
        assert_eq!(widget.borrow().mode(), Mode::Idle);
        hub.dispatch(&WindowEvent::KeyUp(Key::Delete));
        assert_eq!(widget.borrow().get_shapes().len(), 1);

        // Enter closes the polygon being drawn
        {
            let mut w = widget.borrow_mut();
            w.draw_polygon();
            for (x, y) in [(500.0, 50.0), (600.0, 50.0), (600.0, 150.0)] {
                w.pointer_down(PointerEvent::primary(x, y));
                w.pointer_up(Point::new(x, y));
            }
        }
        hub.dispatch(&WindowEvent::KeyUp(Key::Enter));
        assert_eq!(widget.borrow().get_shapes().len(), 2);
    }

    #[test]
    fn test_unmount_releases_window_listener() {
        let (widget, hub, _) = ready_widget(config());
        assert_eq!(hub.listener_count(), 1);

        // Remounting replaces the listener instead of adding one
        Widget::attach(&widget, &hub);
        assert_eq!(hub.listener_count(), 1);

        widget.borrow_mut().unmount();
        assert_eq!(hub.listener_count(), 0);
        assert!(!widget.borrow().is_ready());
        assert!(widget.borrow().scene().is_some_and(|s| s.items.is_empty()));

        hub.dispatch(&WindowEvent::KeyDown(Key::Control));
        assert!(!widget.borrow().scene().is_some_and(|s| s.has_class(GRABBABLE_CLASS)));
    }

    #[test]
    fn test_dropped_widget_does_not_receive_events() {
        let (widget, hub, _) = ready_widget(config());
        drop(widget);
        // The subscription went away with the widget
        assert_eq!(hub.listener_count(), 0);
        hub.dispatch(&WindowEvent::Blur);
    }

    #[test]
    fn test_draw_through_widget_reports_added() {
        let (widget, _hub, reported) = ready_widget(config());
        let mut widget = widget.borrow_mut();
        assert!(widget.draw_rectangle());
        widget.pointer_down(PointerEvent::primary(500.0, 100.0));
        widget.pointer_move(Point::new(600.0, 200.0));
        widget.pointer_up(Point::new(600.0, 200.0));
        assert_eq!(reported.added.get(), 1);
        assert_eq!(widget.get_shapes().len(), 3);
        assert_eq!(widget.mode(), Mode::Drawing(ShapeKind::Rectangle));
    }
}
