//! Browser binding.
//!
//! [`WasmAnnotator`] wraps a [`Widget`] for JavaScript. Drawing is delegated
//! to a host-supplied scene object with one method per [`SceneRenderer`]
//! operation; arguments that are not plain numbers or strings are passed as
//! parsed JSON. Host callbacks are queued while the widget is borrowed and
//! delivered once the call that raised them returns, so a callback may call
//! back into the annotator.

use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Function, Reflect};
use serde::Serialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Event, KeyboardEvent};
use web_time::Instant;

use crate::callback::Callback;
use crate::config::AnnotatorConfig;
use crate::director::{MouseButton, PointerEvent};
use crate::error::AnnotatorError;
use crate::keybindings::Key;
use crate::listeners::{Subscription, WindowEvent};
use crate::model::{Point, Shape, ShapeId, ShapeKind};
use crate::scene::{PlotItem, Primitive, SceneRenderer, Style};
use crate::widget::{ReadyInfo, Widget, WidgetCallbacks};

/// Convert a serializable value into a plain JavaScript value.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    serde_json::to_string(value)
        .ok()
        .and_then(|json| js_sys::JSON::parse(&json).ok())
        .unwrap_or(JsValue::NULL)
}

// Shape ids cross to JavaScript as plain numbers, not BigInt
fn id_to_js(id: ShapeId) -> JsValue {
    JsValue::from_f64(id as f64)
}

fn id_from_js(id: f64) -> Option<ShapeId> {
    (id.is_finite() && id >= 0.0 && id.fract() == 0.0 && id < ShapeId::MAX as f64).then(|| id as ShapeId)
}

fn to_js_error(e: AnnotatorError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

// ============================================================================
// Scene
// ============================================================================

/// Scene implemented by a JavaScript object.
pub struct JsScene {
    target: JsValue,
}

impl JsScene {
    fn call(&self, method: &str, args: &[JsValue]) {
        let arguments: Array = args.iter().collect();
        let result = Reflect::get(&self.target, &JsValue::from_str(method))
            .and_then(|f| f.dyn_into::<Function>().map_err(JsValue::from))
            .and_then(|f| f.apply(&self.target, &arguments));
        if let Err(e) = result {
            log::warn!("Scene call {} failed: {:?}", method, e);
        }
    }
}

impl SceneRenderer for JsScene {
    fn load_image(&mut self, url: &str) {
        self.call("loadImage", &[url.into()]);
    }

    fn remove_stale_images(&mut self, keep: &str) {
        self.call("removeStaleImages", &[keep.into()]);
    }

    fn set_viewport(&mut self, width: f64, height: f64) {
        self.call("setViewport", &[width.into(), height.into()]);
    }

    fn set_container_width(&mut self, width: f64) {
        self.call("setContainerWidth", &[width.into()]);
    }

    fn set_container_class(&mut self, class: &str, enabled: bool) {
        self.call("setContainerClass", &[class.into(), enabled.into()]);
    }

    fn plot(&mut self, kind: ShapeKind, items: &[PlotItem]) {
        self.call("plot", &[kind.name().into(), to_js(&items)]);
    }

    fn update(&mut self, id: ShapeId, primitive: &Primitive) {
        self.call("update", &[id_to_js(id), to_js(primitive)]);
    }

    fn restyle(&mut self, id: ShapeId, style: &Style) {
        self.call("restyle", &[id_to_js(id), to_js(style)]);
    }

    fn remove(&mut self, id: ShapeId) {
        self.call("remove", &[id_to_js(id)]);
    }

    fn show_draft(&mut self, primitive: Option<&Primitive>) {
        let draft = primitive.map_or(JsValue::NULL, to_js);
        self.call("showDraft", &[draft]);
    }

    fn show_handles(&mut self, handles: &[Point], radius: f64) {
        self.call("showHandles", &[to_js(&handles), radius.into()]);
    }

    fn show_marker(&mut self, x: f64, height: f64) {
        self.call(
            "showMarker",
            &[
                x.into(),
                height.into(),
                crate::constants::marker::WIDTH.into(),
                crate::constants::marker::COLOR.into(),
            ],
        );
    }

    fn move_marker(&mut self, x: f64) {
        self.call("moveMarker", &[x.into()]);
    }

    fn remove_marker(&mut self) {
        self.call("removeMarker", &[]);
    }

    fn scroll_into_view(&mut self, x: f64) {
        self.call("scrollIntoView", &[x.into()]);
    }
}

// ============================================================================
// Host callbacks
// ============================================================================

enum Notification {
    Ready(ReadyInfo),
    Added(Shape),
    Selected(Shape),
    ContextMenu(Shape),
    Updated,
    RightClick(f64),
}

type Queue = Rc<RefCell<Vec<Notification>>>;

/// JavaScript callbacks and the notifications waiting for them.
struct Host {
    queue: Queue,
    on_ready: Option<Function>,
    on_added: Option<Function>,
    on_selected: Option<Function>,
    on_context_menu: Option<Function>,
    on_updated: Option<Function>,
    on_right_click: Option<Function>,
}

impl Host {
    fn new(callbacks: &JsValue) -> Self {
        let get = |name: &str| {
            Reflect::get(callbacks, &JsValue::from_str(name))
                .ok()
                .and_then(|f| f.dyn_into::<Function>().ok())
        };
        Self {
            queue: Rc::new(RefCell::new(Vec::new())),
            on_ready: get("onReady"),
            on_added: get("onAdded"),
            on_selected: get("onSelected"),
            on_context_menu: get("onContextMenu"),
            on_updated: get("onUpdated"),
            on_right_click: get("onRightClick"),
        }
    }

    /// Widget callbacks that queue notifications for [`Host::flush`].
    fn widget_callbacks(&self) -> WidgetCallbacks {
        let push = |queue: &Queue| {
            let queue = queue.clone();
            move |n: Notification| queue.borrow_mut().push(n)
        };
        let ready = push(&self.queue);
        let added = push(&self.queue);
        let selected = push(&self.queue);
        let context_menu = push(&self.queue);
        let updated = push(&self.queue);
        let right_click = push(&self.queue);
        WidgetCallbacks {
            on_ready: Callback::new(move |info: ReadyInfo| ready(Notification::Ready(info))),
            on_added: Callback::new(move |shape: Shape| added(Notification::Added(shape))),
            on_selected: Callback::new(move |shape: Shape| selected(Notification::Selected(shape))),
            on_context_menu: Callback::new(move |shape: Shape| context_menu(Notification::ContextMenu(shape))),
            on_updated: Callback::new(move |()| updated(Notification::Updated)),
            on_right_click: Callback::new(move |p: f64| right_click(Notification::RightClick(p))),
        }
    }

    /// Deliver every queued notification.
    fn flush(&self) {
        let notifications = std::mem::take(&mut *self.queue.borrow_mut());
        for notification in notifications {
            let (callback, arg) = match notification {
                Notification::Ready(info) => (&self.on_ready, to_js(&info)),
                Notification::Added(shape) => (&self.on_added, to_js(&shape)),
                Notification::Selected(shape) => (&self.on_selected, to_js(&shape)),
                Notification::ContextMenu(shape) => (&self.on_context_menu, to_js(&shape)),
                Notification::Updated => (&self.on_updated, JsValue::UNDEFINED),
                Notification::RightClick(p) => (&self.on_right_click, p.into()),
            };
            if let Some(f) = callback {
                if let Err(e) = f.call1(&JsValue::NULL, &arg) {
                    log::warn!("Host callback failed: {:?}", e);
                }
            }
        }
    }
}

// ============================================================================
// Window listeners
// ============================================================================

type EventMap = fn(&Event) -> Option<WindowEvent>;

fn key_down(event: &Event) -> Option<WindowEvent> {
    let key = event.dyn_ref::<KeyboardEvent>()?.key();
    Some(WindowEvent::KeyDown(Key::from_dom(&key)))
}

fn key_up(event: &Event) -> Option<WindowEvent> {
    let key = event.dyn_ref::<KeyboardEvent>()?.key();
    Some(WindowEvent::KeyUp(Key::from_dom(&key)))
}

fn blur(_: &Event) -> Option<WindowEvent> {
    Some(WindowEvent::Blur)
}

/// Register keydown/keyup/blur listeners on `window` for as long as the
/// returned subscription lives.
fn window_subscription(widget: &Rc<RefCell<Widget<JsScene>>>, host: &Rc<Host>) -> Result<Subscription, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let handler = Rc::new(RefCell::new(Widget::window_handler(widget)));

    let mut closures: Vec<(&'static str, Closure<dyn FnMut(Event)>)> = Vec::new();
    let events: [(&'static str, EventMap); 3] = [("keydown", key_down), ("keyup", key_up), ("blur", blur)];
    for (name, map) in events {
        let handler = handler.clone();
        let host = Rc::downgrade(host);
        let closure = Closure::wrap(Box::new(move |event: Event| {
            if let Some(event) = map(&event) {
                let mut handler = handler.borrow_mut();
                (&mut *handler)(&event);
            }
            if let Some(host) = host.upgrade() {
                host.flush();
            }
        }) as Box<dyn FnMut(Event)>);
        window.add_event_listener_with_callback(name, closure.as_ref().unchecked_ref())?;
        closures.push((name, closure));
    }

    Ok(Subscription::new(move || {
        for (name, closure) in &closures {
            if let Err(e) = window.remove_event_listener_with_callback(name, closure.as_ref().unchecked_ref()) {
                log::warn!("Failed to remove {} listener: {:?}", name, e);
            }
        }
    }))
}

// ============================================================================
// Exported annotator
// ============================================================================

/// Image annotation widget for JavaScript hosts.
#[wasm_bindgen]
pub struct WasmAnnotator {
    widget: Rc<RefCell<Widget<JsScene>>>,
    host: Rc<Host>,
}

impl WasmAnnotator {
    /// Run `f` on the widget, then deliver the notifications it raised.
    fn with<T>(&self, f: impl FnOnce(&mut Widget<JsScene>) -> T) -> T {
        let result = f(&mut self.widget.borrow_mut());
        self.host.flush();
        result
    }
}

#[wasm_bindgen]
impl WasmAnnotator {
    /// Create a widget from host props, a scene object and callbacks.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue, scene: JsValue, callbacks: JsValue) -> Result<WasmAnnotator, JsValue> {
        console_error_panic_hook::set_once();

        let json = js_sys::JSON::stringify(&config)?
            .as_string()
            .ok_or_else(|| to_js_error(AnnotatorError::js("config is not serializable")))?;
        let config = AnnotatorConfig::from_json(&json).map_err(to_js_error)?;
        config.validate().map_err(to_js_error)?;

        if let Some(level) = config.log_level.to_level_filter().to_level() {
            // A second widget finds the logger already installed
            let _ = console_log::init_with_level(level);
        }

        let host = Rc::new(Host::new(&callbacks));
        let widget = Widget::new(config, JsScene { target: scene }, host.widget_callbacks());
        Ok(Self {
            widget: Rc::new(RefCell::new(widget)),
            host,
        })
    }

    /// Install window listeners and start loading the image.
    pub fn mount(&self) -> Result<(), JsValue> {
        let subscription = window_subscription(&self.widget, &self.host)?;
        self.with(|w| w.mount(subscription));
        Ok(())
    }

    pub fn unmount(&self) {
        self.with(|w| w.unmount());
    }

    #[wasm_bindgen(js_name = setImage)]
    pub fn set_image(&self, url: String) {
        self.with(|w| w.set_image(url));
    }

    /// Report a finished image load from the scene.
    #[wasm_bindgen(js_name = imageLoaded)]
    pub fn image_loaded(
        &self,
        src: String,
        natural_width: f64,
        natural_height: f64,
        scroll_width: f64,
        scroll_height: f64,
    ) -> bool {
        self.with(|w| {
            w.image_loaded(
                &src,
                (natural_width, natural_height),
                (scroll_width, scroll_height),
            )
        })
    }

    #[wasm_bindgen(js_name = drawRectangle)]
    pub fn draw_rectangle(&self) -> bool {
        self.with(|w| w.draw_rectangle())
    }

    #[wasm_bindgen(js_name = drawPolygon)]
    pub fn draw_polygon(&self) -> bool {
        self.with(|w| w.draw_polygon())
    }

    #[wasm_bindgen(js_name = drawCircle)]
    pub fn draw_circle(&self) -> bool {
        self.with(|w| w.draw_circle())
    }

    #[wasm_bindgen(js_name = drawEllipse)]
    pub fn draw_ellipse(&self) -> bool {
        self.with(|w| w.draw_ellipse())
    }

    #[wasm_bindgen(js_name = drawDot)]
    pub fn draw_dot(&self) -> bool {
        self.with(|w| w.draw_dot())
    }

    pub fn stop(&self) {
        self.with(|w| w.stop());
    }

    #[wasm_bindgen(js_name = stopEdit)]
    pub fn stop_edit(&self) {
        self.with(|w| w.stop_edit());
    }

    pub fn edit(&self, id: f64) -> bool {
        id_from_js(id).is_some_and(|id| self.with(|w| w.edit(id)))
    }

    pub fn delete(&self, id: f64) -> bool {
        id_from_js(id).is_some_and(|id| self.with(|w| w.delete(id)))
    }

    #[wasm_bindgen(js_name = updateCategories)]
    pub fn update_categories(&self, id: f64, categories: Vec<String>, color: Option<String>) -> bool {
        id_from_js(id).is_some_and(|id| self.with(|w| w.update_categories(id, categories, color)))
    }

    /// Zoom relative to the current factor unless `relative` is `false`.
    pub fn zoom(&self, factor: f64, relative: Option<bool>) -> f64 {
        self.with(|w| w.zoom(factor, relative.unwrap_or(true)))
    }

    #[wasm_bindgen(js_name = getShapes)]
    pub fn get_shapes(&self) -> JsValue {
        to_js(&self.widget.borrow().get_shapes())
    }

    #[wasm_bindgen(js_name = setMarkerPosition)]
    pub fn set_marker_position(&self, position: f64) -> bool {
        self.with(|w| w.set_marker_position(position))
    }

    #[wasm_bindgen(js_name = stopPlayback)]
    pub fn stop_playback(&self) {
        self.with(|w| w.stop_playback());
    }

    /// Advance the playback marker; call from `requestAnimationFrame`.
    pub fn tick(&self) -> Option<f64> {
        self.with(|w| w.tick(Instant::now()))
    }

    #[wasm_bindgen(js_name = pointerDown)]
    pub fn pointer_down(&self, x: f64, y: f64, button: i16) -> bool {
        let event = PointerEvent::new(x, y, MouseButton::from_dom(button));
        self.with(|w| w.pointer_down(event))
    }

    #[wasm_bindgen(js_name = pointerMove)]
    pub fn pointer_move(&self, x: f64, y: f64) -> bool {
        self.with(|w| w.pointer_move(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = pointerUp)]
    pub fn pointer_up(&self, x: f64, y: f64) -> bool {
        self.with(|w| w.pointer_up(Point::new(x, y)))
    }

    #[wasm_bindgen(js_name = doubleClick)]
    pub fn double_click(&self, x: f64, y: f64) -> bool {
        self.with(|w| w.double_click(Point::new(x, y)))
    }
}
