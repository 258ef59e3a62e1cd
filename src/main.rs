/// Headless demo for native builds.
///
/// Loads an image file, plots the shapes from an optional JSON file, draws
/// one rectangle through simulated pointer input and prints the resulting
/// shapes as JSON.
#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = demo::run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::cell::RefCell;
    use std::path::Path;
    use std::rc::Rc;

    use shape_annotator::scene::recording::RecordingScene;
    use shape_annotator::{
        AnnotatorConfig, AnnotatorError, Callback, EventHub, Point, PointerEvent, ReadyInfo, Result,
        Shape, Widget, WidgetCallbacks,
    };

    const USAGE: &str = "usage: shape-annotator-demo <image> [shapes.json]";

    pub fn run() -> Result<()> {
        let mut args = std::env::args().skip(1);
        let Some(image_path) = args.next() else {
            return Err(AnnotatorError::invalid_config(USAGE));
        };

        let mut config = AnnotatorConfig::new(image_path.clone());
        if let Some(shapes_path) = args.next() {
            let text = std::fs::read_to_string(shapes_path)?;
            config.shapes = serde_json::from_str(&text)?;
        }
        let config = config.sanitize();
        config.validate()?;

        env_logger::Builder::new()
            .filter_level(config.log_level.to_level_filter())
            .parse_default_env()
            .init();

        let path = Path::new(&image_path);
        if !path.exists() {
            return Err(AnnotatorError::image_not_found(path));
        }
        let (width, height) = image::image_dimensions(path)?;
        let natural = (f64::from(width), f64::from(height));
        log::info!("Image {} is {}x{}", image_path, width, height);

        let callbacks = WidgetCallbacks {
            on_ready: Callback::new(|info: ReadyInfo| {
                log::info!(
                    "Ready: displayed at {:.0}x{:.0}",
                    info.display_width,
                    info.display_height
                )
            }),
            on_added: Callback::new(|shape: Shape| {
                log::info!("Added {} with id {}", shape.kind().name(), shape.id())
            }),
            ..Default::default()
        };

        let widget = Rc::new(RefCell::new(Widget::new(
            config,
            RecordingScene::new(),
            callbacks,
        )));
        let hub = EventHub::new();
        Widget::attach(&widget, &hub);

        {
            let mut widget = widget.borrow_mut();
            if !widget.image_loaded(&image_path, natural, natural) {
                return Err(AnnotatorError::invalid_config("image load was not accepted"));
            }

            // Rectangle over the centre quarter of the image
            let (w, h) = widget
                .director()
                .map(|director| director.display_size())
                .unwrap_or(natural);
            widget.draw_rectangle();
            widget.pointer_down(PointerEvent::primary(w * 0.25, h * 0.25));
            widget.pointer_move(Point::new(w * 0.75, h * 0.75));
            widget.pointer_up(Point::new(w * 0.75, h * 0.75));
            widget.stop();
        }

        let shapes = widget.borrow().get_shapes();
        println!("{}", serde_json::to_string_pretty(&shapes)?);

        widget.borrow_mut().unmount();
        Ok(())
    }
}

// WASM doesn't use main(), it uses the exported WasmAnnotator
#[cfg(target_arch = "wasm32")]
fn main() {}
