use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::charts::ChartBoard;
use crate::config::DashboardConfig;
use crate::data::loader::load_dir;
use crate::data::model::Dataset;
use crate::selection::{Broadcaster, Outcome, Playback, PlaybackEvent, RangeSlider};

// ---------------------------------------------------------------------------
// Deferred UI actions
// ---------------------------------------------------------------------------

/// A selection change requested while drawing.
///
/// Charts are borrowed while they are drawn, so anything that publishes a
/// range is queued and applied once the frame's widgets are done.
#[derive(Debug, Clone, PartialEq)]
pub enum UiAction {
    /// Slider release or brush end, in (possibly fractional) years.
    SetRange(f64, f64),
    /// Year dropdown or pip click.
    SetText(String),
    Reset,
    TogglePlayback,
    OpenFolder(PathBuf),
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Read-only after load; shared with every chart.
    pub dataset: Rc<Dataset>,

    /// Owns the selected year range.
    pub broadcaster: Broadcaster,

    /// Charts subscribed to `broadcaster`.
    pub board: ChartBoard,

    /// Handle positions while dragging; synced after every change.
    pub slider: RangeSlider,

    pub playback: Playback,

    /// Folder the current dataset came from.
    pub data_dir: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    pending: Vec<UiAction>,
}

impl AppState {
    /// Empty dashboard wired to `config`. Fails only when the config holds
    /// values no chart can work with.
    pub fn new(config: DashboardConfig) -> Result<Self> {
        let dataset = Rc::new(Dataset::default());
        let mut broadcaster = Broadcaster::new(config.bounds);
        let mut board = ChartBoard::build(Rc::clone(&dataset), &config)
            .context("building charts from config")?;
        board.attach(&mut broadcaster);
        let slider = RangeSlider::new(broadcaster.bounds(), broadcaster.current());
        let playback = Playback::new(config.playback.window_years, config.playback.interval());
        Ok(AppState {
            config,
            dataset,
            broadcaster,
            board,
            slider,
            playback,
            data_dir: None,
            status_message: None,
            pending: Vec::new(),
        })
    }

    /// Load the three tables from `dir` and rebuild every chart over them.
    ///
    /// Tables that fail are reported in `status_message`; the rest load.
    pub fn load_folder(&mut self, dir: &Path) -> Result<()> {
        let report = load_dir(dir);
        self.status_message = report.failure_summary();
        self.set_dataset(report.dataset)?;
        self.data_dir = Some(dir.to_path_buf());
        Ok(())
    }

    /// Swap in a new dataset. The selection goes back to its default span.
    pub fn set_dataset(&mut self, dataset: Dataset) -> Result<()> {
        self.playback.cancel();
        self.board.detach(&mut self.broadcaster);

        self.dataset = Rc::new(dataset);
        self.board = ChartBoard::build(Rc::clone(&self.dataset), &self.config)
            .context("building charts from config")?;
        self.broadcaster.reset();
        self.board.attach(&mut self.broadcaster);
        self.slider.sync(self.broadcaster.current());
        log::info!(
            "Dataset ready: {} rows, {} charts",
            self.dataset.len(),
            self.board.charts.len()
        );
        Ok(())
    }

    /// Queue an action for [`AppState::apply_pending`].
    pub fn queue(&mut self, action: UiAction) {
        self.pending.push(action);
    }

    pub fn apply_pending(&mut self) {
        for action in std::mem::take(&mut self.pending) {
            self.apply_action(action);
        }
    }

    pub fn apply_action(&mut self, action: UiAction) {
        match action {
            UiAction::SetRange(min, max) => {
                self.stop_playback_for_input();
                if let Err(e) = self.broadcaster.set_range(min, max) {
                    self.status_message = Some(e.to_string());
                }
            }
            UiAction::SetText(text) => {
                self.stop_playback_for_input();
                if let Err(e) = self.broadcaster.set_range_text(&text) {
                    self.status_message = Some(e.to_string());
                }
            }
            UiAction::Reset => {
                self.playback.cancel();
                self.broadcaster.reset();
            }
            UiAction::TogglePlayback => {
                let years = self.dataset.years();
                if let Some(event) = self.playback.toggle(&years, Instant::now()) {
                    self.apply_playback_event(event);
                }
            }
            UiAction::OpenFolder(dir) => {
                if let Err(e) = self.load_folder(&dir) {
                    log::error!("Failed to load {}: {e:#}", dir.display());
                    self.status_message = Some(format!("Error: {e:#}"));
                }
            }
        }
        self.slider.sync(self.broadcaster.current());
    }

    /// Advance a running sweep. Returns how long until the next step, for
    /// scheduling a repaint.
    pub fn poll_playback(&mut self, now: Instant) -> Option<Duration> {
        if let Some(event) = self.playback.poll(now) {
            self.apply_playback_event(event);
            self.slider.sync(self.broadcaster.current());
        }
        self.playback.time_until_next(now)
    }

    fn apply_playback_event(&mut self, event: PlaybackEvent) {
        let outcome = match event {
            PlaybackEvent::Step { start, end } => self.broadcaster.set_years(start, end),
            PlaybackEvent::Finished => self.broadcaster.reset(),
        };
        if let Outcome::Unchanged(range) = outcome {
            log::debug!("Playback step {range} already selected");
        }
    }

    /// Manual input wins over a running sweep.
    fn stop_playback_for_input(&mut self) {
        if self.playback.cancel().is_some() {
            log::debug!("Playback cancelled by a manual selection");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::charts::RangeChart;
    use crate::data::fixtures::sample_dataset;
    use crate::selection::YearRange;

    fn state() -> AppState {
        let mut state = AppState::new(DashboardConfig::default()).unwrap();
        state.set_dataset(sample_dataset()).unwrap();
        state
    }

    fn chart_ranges(state: &AppState) -> Vec<Option<YearRange>> {
        state
            .board
            .charts
            .iter()
            .map(|c| c.borrow().last_range())
            .collect()
    }

    #[test]
    fn new_dataset_starts_at_default_span() {
        let state = state();
        let full = YearRange::new(2015, 2024).unwrap();
        assert_eq!(state.broadcaster.current(), full);
        assert!(chart_ranges(&state).iter().all(|r| *r == Some(full)));
        assert_eq!(state.slider.handles(), [2015.0, 2024.0]);
    }

    #[test]
    fn queued_actions_apply_after_drawing() {
        let mut state = state();
        state.queue(UiAction::SetRange(2010.0, 2030.0));
        state.queue(UiAction::SetText("2019".into()));
        assert_eq!(state.broadcaster.current(), YearRange::new(2015, 2024).unwrap());

        state.apply_pending();
        let single = YearRange::new(2019, 2019).unwrap();
        assert_eq!(state.broadcaster.current(), single);
        assert!(chart_ranges(&state).iter().all(|r| *r == Some(single)));
        assert_eq!(state.slider.handles(), [2019.0, 2019.0]);
    }

    #[test]
    fn bad_input_keeps_range_and_reports() {
        let mut state = state();
        state.apply_action(UiAction::SetText("last decade".into()));
        state.apply_action(UiAction::SetRange(f64::NAN, 2020.0));
        assert_eq!(state.broadcaster.current(), YearRange::new(2015, 2024).unwrap());
        assert!(state.status_message.is_some());
    }

    #[test]
    fn playback_steps_then_restores() {
        let mut state = state();
        state.playback = Playback::new(2, Duration::ZERO);
        state.apply_action(UiAction::TogglePlayback);
        assert!(state.playback.is_running());

        let now = Instant::now();
        state.poll_playback(now);
        assert_eq!(state.broadcaster.current(), YearRange::new(2015, 2017).unwrap());
        for _ in 0..10 {
            state.poll_playback(now);
        }
        assert!(!state.playback.is_running());
        assert_eq!(state.broadcaster.current(), YearRange::new(2015, 2024).unwrap());
    }

    #[test]
    fn manual_selection_cancels_playback() {
        let mut state = state();
        state.apply_action(UiAction::TogglePlayback);
        state.apply_action(UiAction::SetRange(2018.0, 2020.0));
        assert!(!state.playback.is_running());
        assert_eq!(state.broadcaster.current(), YearRange::new(2018, 2020).unwrap());
    }

    #[test]
    fn missing_folder_isolates_failures() {
        let mut state = state();
        let dir = std::env::temp_dir().join("happiness-dashboard-no-such-dir");
        state.apply_action(UiAction::OpenFolder(dir));
        assert!(state.dataset.is_empty());
        assert!(state.status_message.is_some());
        assert!(state.board.is_attached());
    }
}
