//! Frame-driven visualization of frequency snapshots.
//!
//! The [`RenderLoop`] owns a pending frame request from a [`FrameScheduler`].
//! It only draws when a delivered frame handle matches the one it is waiting
//! for, so a stopped loop never touches the surface again.

pub mod plasma;
pub mod radial;
pub mod scheduler;
pub mod surface;
pub mod widget;

pub use scheduler::{FrameHandle, FrameScheduler, SteppedScheduler};
pub use surface::{PixelCanvas, Surface};
pub use widget::CanvasView;

use tracing::debug;

use crate::audio::SnapshotSource;
use crate::colors::{Theme, ThemeStyle};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisualMode {
    Radial,
    Plasma,
}

impl VisualMode {
    /// Neon themes and "Retro Synthwave" get the plasma waveform.
    pub fn default_for(theme: &Theme) -> Self {
        if theme.style == ThemeStyle::Neon || theme.name == "Retro Synthwave" {
            VisualMode::Plasma
        } else {
            VisualMode::Radial
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            VisualMode::Radial => VisualMode::Plasma,
            VisualMode::Plasma => VisualMode::Radial,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VisualMode::Radial => "Radial",
            VisualMode::Plasma => "Plasma",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            VisualMode::Radial => "Multi-layered radial bars with glow particles",
            VisualMode::Plasma => "Flowing organic waveforms with plasma effects",
        }
    }
}

pub struct RenderLoop<S: FrameScheduler> {
    scheduler: S,
    pending: Option<FrameHandle>,
    theme: Theme,
    mode: VisualMode,
    frames_drawn: u64,
}

impl<S: FrameScheduler> RenderLoop<S> {
    pub fn new(scheduler: S, theme: Theme) -> Self {
        Self {
            scheduler,
            pending: None,
            mode: VisualMode::default_for(&theme),
            theme,
            frames_drawn: 0,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn mode(&self) -> VisualMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.pending.is_some()
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn start(&mut self) {
        if self.pending.is_none() {
            debug!("Starting {} visualization", self.mode.label());
            self.pending = Some(self.scheduler.request_frame());
        }
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.pending.take() {
            debug!("Stopping visualization");
            self.scheduler.cancel_frame(handle);
        }
    }

    /// Runs the loop exactly while `active` holds (playing with an analyzer).
    pub fn sync(&mut self, active: bool) {
        if active {
            self.start();
        } else {
            self.stop();
        }
    }

    /// Switching theme cancels the pending frame, restores the theme's
    /// default mode and restarts if the loop was running.
    pub fn set_theme(&mut self, theme: Theme) {
        let was_running = self.is_running();
        self.stop();
        self.theme = theme;
        self.mode = VisualMode::default_for(&theme);
        if was_running {
            self.start();
        }
    }

    pub fn set_mode(&mut self, mode: VisualMode) {
        if mode == self.mode {
            return;
        }
        let was_running = self.is_running();
        self.stop();
        self.mode = mode;
        if was_running {
            self.start();
        }
    }

    pub fn toggle_mode(&mut self) {
        self.set_mode(self.mode.toggled());
    }

    /// Paints the theme background without drawing a frame.
    pub fn clear(&self, surface: &mut dyn Surface) {
        surface.fill_background(self.theme.colors.background);
    }

    /// Handles one delivered frame. Returns whether anything was drawn.
    ///
    /// `timestamp` is in seconds and drives the plasma motion.
    pub fn on_frame(
        &mut self,
        handle: FrameHandle,
        timestamp: f64,
        source: &mut dyn SnapshotSource,
        surface: &mut dyn Surface,
    ) -> bool {
        if self.pending != Some(handle) {
            return false;
        }

        surface.fill_background(self.theme.colors.background);
        if let Some(snapshot) = source.snapshot() {
            match self.mode {
                VisualMode::Radial => radial::draw(surface, snapshot.bins(), &self.theme),
                VisualMode::Plasma => {
                    plasma::draw(surface, snapshot.bins(), &self.theme, timestamp)
                }
            }
        }
        self.frames_drawn += 1;

        self.pending = Some(self.scheduler.request_frame());
        true
    }
}

impl<S: FrameScheduler> Drop for RenderLoop<S> {
    fn drop(&mut self) {
        self.stop();
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{DrawOp, FixedSnapshot, RecordingSurface};
    use super::*;
    use crate::analysis::FrequencySnapshot;
    use crate::colors::{MINIMAL_WAVE, NEON_DREAMS, RETRO_SYNTHWAVE};

    fn source() -> FixedSnapshot {
        FixedSnapshot(Some(FrequencySnapshot::from_bins(vec![200; 16])))
    }

    /// Delivers every ready frame and returns how many drew.
    fn step(
        viz: &mut RenderLoop<SteppedScheduler>,
        source: &mut FixedSnapshot,
        surface: &mut RecordingSurface,
    ) -> usize {
        let ready = viz.scheduler_mut().take_ready();
        ready
            .into_iter()
            .filter(|&handle| viz.on_frame(handle, 0.0, source, surface))
            .count()
    }

    #[test]
    fn test_default_mode_follows_theme() {
        assert_eq!(VisualMode::default_for(&NEON_DREAMS), VisualMode::Plasma);
        assert_eq!(VisualMode::default_for(&RETRO_SYNTHWAVE), VisualMode::Plasma);
        assert_eq!(VisualMode::default_for(&MINIMAL_WAVE), VisualMode::Radial);
    }

    #[test]
    fn test_frames_flow_while_running() {
        let mut viz = RenderLoop::new(SteppedScheduler::new(), MINIMAL_WAVE);
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let mut source = source();

        assert_eq!(step(&mut viz, &mut source, &mut surface), 0);
        viz.start();
        assert_eq!(step(&mut viz, &mut source, &mut surface), 1);
        assert_eq!(step(&mut viz, &mut source, &mut surface), 1);
        assert_eq!(viz.frames_drawn(), 2);
        assert_eq!(
            surface.ops()[0],
            DrawOp::Background(MINIMAL_WAVE.colors.background)
        );
    }

    #[test]
    fn test_pause_stops_all_canvas_writes() {
        let mut viz = RenderLoop::new(SteppedScheduler::new(), NEON_DREAMS);
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let mut source = source();

        viz.sync(true);
        step(&mut viz, &mut source, &mut surface);
        let writes = surface.ops().len();

        viz.sync(false);
        for _ in 0..5 {
            assert_eq!(step(&mut viz, &mut source, &mut surface), 0);
        }
        assert_eq!(surface.ops().len(), writes);

        viz.sync(true);
        assert_eq!(step(&mut viz, &mut source, &mut surface), 1);
        assert!(surface.ops().len() > writes);
    }

    #[test]
    fn test_stale_handle_draws_nothing() {
        let mut viz = RenderLoop::new(SteppedScheduler::new(), NEON_DREAMS);
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let mut source = source();

        viz.start();
        let stale = viz.scheduler_mut().take_ready()[0];
        viz.stop();
        viz.start();
        assert!(!viz.on_frame(stale, 0.0, &mut source, &mut surface));
        assert!(surface.ops().is_empty());
    }

    #[test]
    fn test_missing_analyzer_only_clears() {
        let mut viz = RenderLoop::new(SteppedScheduler::new(), MINIMAL_WAVE);
        let mut surface = RecordingSurface::new(800.0, 400.0);
        let mut source = FixedSnapshot(None);

        viz.start();
        let handle = viz.scheduler_mut().take_ready()[0];
        assert!(viz.on_frame(handle, 0.0, &mut source, &mut surface));
        assert_eq!(surface.ops().len(), 1);
    }

    #[test]
    fn test_theme_change_restarts_and_resets_mode() {
        let mut viz = RenderLoop::new(SteppedScheduler::new(), MINIMAL_WAVE);
        viz.toggle_mode();
        assert_eq!(viz.mode(), VisualMode::Plasma);

        viz.start();
        viz.set_theme(MINIMAL_WAVE.next());
        assert_eq!(viz.theme().name, "Retro Synthwave");
        assert_eq!(viz.mode(), VisualMode::Plasma);
        assert!(viz.is_running());
        // The old frame was cancelled, only the restarted one is queued
        assert_eq!(viz.scheduler_mut().pending(), 1);

        viz.set_theme(MINIMAL_WAVE);
        assert_eq!(viz.mode(), VisualMode::Radial);
    }

    #[test]
    fn test_frame_cost_is_bounded_on_a_terminal_sized_canvas() {
        // 160x60 cells, two pixels per cell vertically
        let mut canvas = PixelCanvas::scaled(800.0, 400.0, 160, 120);
        for mode in [VisualMode::Plasma, VisualMode::Radial] {
            let mut viz = RenderLoop::new(SteppedScheduler::new(), NEON_DREAMS);
            viz.set_mode(mode);
            viz.start();
            let handle = viz.scheduler_mut().take_ready()[0];
            let mut source = FixedSnapshot(Some(FrequencySnapshot::from_bins(vec![180; 1024])));

            canvas.take_visits();
            assert!(viz.on_frame(handle, 1.0, &mut source, &mut canvas));
            let visits = canvas.take_visits();
            assert!(
                visits < 3_000_000,
                "{} frame visited {} pixels",
                mode.label(),
                visits
            );
        }
    }

    #[test]
    fn test_toggle_while_stopped_does_not_start() {
        let mut viz = RenderLoop::new(SteppedScheduler::new(), MINIMAL_WAVE);
        viz.toggle_mode();
        assert!(!viz.is_running());
        assert_eq!(viz.scheduler_mut().pending(), 0);
    }
}
