//! Callback abstraction for host notifications
//!
//! The widget reports interactions through optional host-supplied closures.
//! Instead of spelling out `Option<Box<dyn FnMut(T)>>` everywhere, the
//! controller stores `Callback<T>` values which are simply skipped when unset.
//!
//! # Examples
//!
//! ```
//! use shape_annotator::Callback;
//!
//! let mut on_right_click: Callback<f64> = Callback::none();
//! on_right_click.emit(0.5); // no handler, nothing happens
//!
//! on_right_click = Callback::new(|position| println!("clicked at {position}"));
//! on_right_click.emit(0.25);
//! ```

use std::fmt;

/// An optional host callback receiving values of type `T`.
pub struct Callback<T> {
    f: Option<Box<dyn FnMut(T)>>,
}

impl<T> Callback<T> {
    /// Create a new callback from a function.
    pub fn new<F>(f: F) -> Self
    where
        F: FnMut(T) + 'static,
    {
        Self {
            f: Some(Box::new(f)),
        }
    }

    /// Create an empty callback (no handler).
    pub fn none() -> Self {
        Self { f: None }
    }

    /// Call the callback with a value, if it exists.
    pub fn emit(&mut self, value: T) {
        if let Some(f) = self.f.as_mut() {
            f(value);
        }
    }

    /// Check if the callback is set.
    pub fn is_some(&self) -> bool {
        self.f.is_some()
    }

    /// Check if the callback is not set.
    pub fn is_none(&self) -> bool {
        self.f.is_none()
    }
}

impl<T> Default for Callback<T> {
    fn default() -> Self {
        Self::none()
    }
}

impl<T> fmt::Debug for Callback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("set", &self.is_some())
            .finish()
    }
}

/// A callback that takes no parameters.
pub type Callback0 = Callback<()>;
