//! Playback marker: a vertical line sweeping across the image.
//!
//! A right-click at display column `x` of an image `W` pixels wide maps to
//! the normalized position `x / W`. The marker starts at `x` and moves
//! linearly to `W` over the remaining part of the clip duration.

use std::time::Duration;

use web_time::Instant;

/// An animation in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Sweep {
    start_x: f64,
    end_x: f64,
    duration: Duration,
    started_at: Instant,
}

impl Sweep {
    fn position_at(&self, now: Instant) -> f64 {
        if self.duration.is_zero() {
            return self.end_x;
        }
        let elapsed = now.saturating_duration_since(self.started_at);
        let t = (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0);
        self.start_x + (self.end_x - self.start_x) * t
    }

    fn is_finished(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.started_at) >= self.duration
    }
}

/// Normalized horizontal position of `x` on a surface `total_width` wide.
///
/// Clamped to `[0, 1]`. A surface without width yields 0.
pub fn normalized_position(x: f64, total_width: f64) -> f64 {
    if total_width <= 0.0 || !x.is_finite() {
        return 0.0;
    }
    (x / total_width).clamp(0.0, 1.0)
}

/// Time left in a clip of `duration` seconds when playback starts at
/// normalized `position`.
pub fn remaining_time(duration: f64, position: f64) -> f64 {
    (duration - duration * position).max(0.0)
}

/// State of the single playback marker of a widget.
#[derive(Debug, Clone)]
pub struct PlaybackMarker {
    /// Clip duration in seconds.
    duration: f64,
    sweep: Option<Sweep>,
}

impl PlaybackMarker {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            sweep: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.sweep.is_some()
    }

    /// Start a sweep from normalized `position` across a surface
    /// `total_width` display pixels wide, replacing any running sweep.
    ///
    /// Returns the marker's start column.
    pub fn start(&mut self, position: f64, total_width: f64, now: Instant) -> f64 {
        let position = position.clamp(0.0, 1.0);
        let start_x = position * total_width;
        let remaining = remaining_time(self.duration, position);
        log::debug!(
            "Playback from {:.3} ({:.1}px), {:.2}s remaining",
            position,
            start_x,
            remaining
        );
        self.sweep = Some(Sweep {
            start_x,
            end_x: total_width,
            duration: Duration::try_from_secs_f64(remaining).unwrap_or(Duration::MAX),
            started_at: now,
        });
        start_x
    }

    /// Current marker column, `None` when no sweep is running. A sweep
    /// that has reached the far edge stays parked there.
    pub fn advance(&self, now: Instant) -> Option<f64> {
        self.sweep.map(|sweep| sweep.position_at(now))
    }

    /// Check if the running sweep has reached the far edge.
    pub fn is_finished(&self, now: Instant) -> bool {
        self.sweep.is_some_and(|sweep| sweep.is_finished(now))
    }

    /// Halt and forget the current sweep.
    pub fn stop(&mut self) {
        if self.sweep.take().is_some() {
            log::debug!("Playback stopped");
        }
    }

    /// Rescale the sweep after the display width changed by `factor`.
    pub fn rescale(&mut self, factor: f64) {
        if let Some(sweep) = self.sweep.as_mut() {
            sweep.start_x *= factor;
            sweep.end_x *= factor;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    #[test]
    fn test_position_and_remaining_time() {
        let p = normalized_position(250.0, 1000.0);
        assert!((p - 0.25).abs() < EPSILON);
        assert!((remaining_time(10.0, p) - 7.5).abs() < EPSILON);
    }

    #[test]
    fn test_position_is_clamped() {
        assert_eq!(normalized_position(-20.0, 100.0), 0.0);
        assert_eq!(normalized_position(140.0, 100.0), 1.0);
        assert_eq!(normalized_position(10.0, 0.0), 0.0);
        assert_eq!(remaining_time(10.0, 1.0), 0.0);
    }

    #[test]
    fn test_sweep_moves_linearly_to_edge() {
        let mut marker = PlaybackMarker::new(10.0);
        let t0 = Instant::now();
        let start = marker.start(0.5, 200.0, t0);
        assert!((start - 100.0).abs() < EPSILON);

        // Five seconds remain; halfway through, the marker is at 150
        let mid = marker.advance(t0 + Duration::from_millis(2500)).unwrap_or_default();
        assert!((mid - 150.0).abs() < 1e-6);

        let end = t0 + Duration::from_secs(6);
        assert_eq!(marker.advance(end), Some(200.0));
        assert!(marker.is_finished(end));
    }

    #[test]
    fn test_restart_replaces_sweep() {
        let mut marker = PlaybackMarker::new(4.0);
        let t0 = Instant::now();
        marker.start(0.0, 100.0, t0);
        marker.start(0.75, 100.0, t0);
        assert_eq!(marker.advance(t0), Some(75.0));

        marker.stop();
        assert!(!marker.is_active());
        assert_eq!(marker.advance(t0), None);
    }

    #[test]
    fn test_huge_duration_does_not_overflow() {
        let t0 = Instant::now();
        for duration in [1e20, f64::INFINITY] {
            let mut marker = PlaybackMarker::new(duration);
            assert_eq!(marker.start(0.0, 100.0, t0), 0.0);
            assert_eq!(marker.advance(t0), Some(0.0));
            assert!(!marker.is_finished(t0 + Duration::from_secs(60)));
        }
    }

    #[test]
    fn test_rescale_follows_zoom() {
        let mut marker = PlaybackMarker::new(10.0);
        let t0 = Instant::now();
        marker.start(0.5, 100.0, t0);
        marker.rescale(2.0);
        assert_eq!(marker.advance(t0), Some(100.0));
    }
}
