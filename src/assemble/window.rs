//! Highlight window derivation.

/// The time range around a detected timestamp included in the output video.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightWindow {
    /// Window start in seconds.
    pub start: f64,
    /// Window end in seconds.
    pub end: f64,
}

impl HighlightWindow {
    /// Compute the window `[t - lead, t + trail]` clipped to `[0, duration]`.
    #[must_use]
    pub fn around(t: f64, lead: f64, trail: f64, duration: f64) -> Self {
        Self {
            start: (t - lead).max(0.0),
            end: (t + trail).min(duration),
        }
    }

    /// Length of the window in seconds.
    #[must_use]
    pub fn length(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }
}
