//! # Frame Probe
//!
//! Averages frame rate and emissions per frame over fixed windows of
//! frames, using the timestamps the host passes to `update`.

/// Frames per reporting window.
pub const PROBE_WINDOW: u32 = 120;

/// Averages over one completed window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ProbeReport {
    /// Frames per second.
    pub fps: f32,
    /// Emissions per frame.
    pub emits_per_frame: f32,
}

/// Rolling frame statistics.
#[derive(Clone, Debug, Default)]
pub struct FrameProbe {
    window_start: Option<u64>,
    frames: u32,
    emits: u32,
    last: Option<ProbeReport>,
}

impl FrameProbe {
    /// Creates an empty probe.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one emission in the current window.
    pub fn record_emit(&mut self) {
        self.emits = self.emits.saturating_add(1);
    }

    /// Counts one frame at `now`, closing the window every
    /// `PROBE_WINDOW` frames.
    ///
    /// # Returns
    ///
    /// The report of the window that just closed, if any.
    pub fn record_frame(&mut self, now: u64) -> Option<ProbeReport> {
        let start = *self.window_start.get_or_insert(now);
        self.frames += 1;
        if self.frames < PROBE_WINDOW {
            return None;
        }

        let elapsed = now.saturating_sub(start).max(1);
        let report = ProbeReport {
            fps: self.frames as f32 * 1000.0 / elapsed as f32,
            emits_per_frame: self.emits as f32 / self.frames as f32,
        };
        tracing::debug!(
            "probe: {:.1} fps, {:.3} emits/frame",
            report.fps,
            report.emits_per_frame
        );

        self.window_start = Some(now);
        self.frames = 0;
        self.emits = 0;
        self.last = Some(report);
        Some(report)
    }

    /// The most recent completed window.
    #[must_use]
    pub fn last_report(&self) -> Option<ProbeReport> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_averages() {
        let mut probe = FrameProbe::new();
        let mut report = None;
        for frame in 0..=PROBE_WINDOW {
            if frame % 4 == 0 {
                probe.record_emit();
            }
            if let Some(done) = probe.record_frame(u64::from(frame) * 10) {
                report = Some(done);
            }
        }

        let report = report.unwrap();
        assert_eq!(probe.last_report(), Some(report));
        assert!((report.emits_per_frame - 0.25).abs() < 0.01);
        assert!(report.fps > 95.0 && report.fps < 110.0, "{}", report.fps);
    }

    #[test]
    fn test_no_report_before_window() {
        let mut probe = FrameProbe::new();
        for frame in 0..PROBE_WINDOW - 1 {
            assert!(probe.record_frame(u64::from(frame) * 16).is_none());
        }
        assert!(probe.last_report().is_none());
    }
}
