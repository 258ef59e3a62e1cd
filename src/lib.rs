//! Shape Annotator - interactive image annotation widget core
//!
//! Draws rectangles, polygons, circles, ellipses and dots over an image,
//! lets the user select, edit and delete them, and reports every change to
//! the host. Rendering goes through the [`SceneRenderer`] trait; the browser
//! binding drives an SVG scene, tests and the demo use
//! [`scene::recording::RecordingScene`].

pub mod callback;
pub mod config;
pub mod constants;
pub mod director;
pub mod error;
pub mod keybindings;
pub mod listeners;
pub mod model;
pub mod playback;
pub mod scene;
pub mod transform;
mod util;
pub mod widget;

pub use callback::{Callback, Callback0};
pub use config::{AnnotatorConfig, LogLevel, WidgetVariant};
pub use director::{Director, DirectorActions, Mode, MouseButton, PointerEvent};
pub use error::{AnnotatorError, Result};
pub use listeners::{EventHub, Subscription, WindowEvent};
pub use model::{Geometry, Point, Shape, ShapeId, ShapeInput, ShapeKind};
pub use scene::{PlotItem, Primitive, SceneRenderer, Style};
pub use transform::{Statics, Transform};
pub use widget::{ReadyInfo, Widget, WidgetCallbacks};

// WASM entry point
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
