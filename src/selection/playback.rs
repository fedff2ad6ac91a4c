use std::time::{Duration, Instant};

// ---------------------------------------------------------------------------
// Auto-play sweep
// ---------------------------------------------------------------------------

/// What the frame loop should do after polling the sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Select `[start, end]`.
    Step { start: i32, end: i32 },
    /// The sweep stopped (completed or cancelled): restore the full range.
    Finished,
}

#[derive(Debug)]
enum State {
    Idle,
    Running { years: Vec<i32>, next: usize, due: Instant },
}

/// Sweeps a fixed-width window across the dataset years, one step per
/// interval. The timer is released on completion, cancellation or drop.
#[derive(Debug)]
pub struct Playback {
    window_years: i32,
    interval: Duration,
    state: State,
}

impl Playback {
    pub fn new(window_years: i32, interval: Duration) -> Self {
        Playback {
            window_years: window_years.max(0),
            interval,
            state: State::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, State::Running { .. })
    }

    /// Start a sweep over `years`, or cancel the one in progress.
    ///
    /// Cancelling returns [`PlaybackEvent::Finished`]; starting returns
    /// `None` and the first step fires one interval later.
    pub fn toggle(&mut self, years: &[i32], now: Instant) -> Option<PlaybackEvent> {
        if self.is_running() {
            return self.cancel();
        }
        let mut years = years.to_vec();
        years.sort_unstable();
        years.dedup();
        if years.is_empty() {
            log::warn!("Nothing to play: no years loaded");
            return None;
        }
        log::info!("Playback started over {} years", years.len());
        self.state = State::Running {
            years,
            next: 0,
            due: now + self.interval,
        };
        None
    }

    /// Stop a running sweep. Returns `Finished` if one was running.
    pub fn cancel(&mut self) -> Option<PlaybackEvent> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Running { .. } => {
                log::info!("Playback stopped");
                Some(PlaybackEvent::Finished)
            }
            State::Idle => None,
        }
    }

    /// Advance the sweep if its next step is due.
    pub fn poll(&mut self, now: Instant) -> Option<PlaybackEvent> {
        let interval = self.interval;
        let window = self.window_years;
        let State::Running { years, next, due } = &mut self.state else {
            return None;
        };
        if now < *due {
            return None;
        }
        let Some(&start) = years.get(*next) else {
            self.state = State::Idle;
            log::info!("Playback finished");
            return Some(PlaybackEvent::Finished);
        };
        let last = years.last().copied().unwrap_or(start);
        *next += 1;
        *due = now + interval;
        Some(PlaybackEvent::Step {
            start,
            end: (start + window).min(last),
        })
    }

    /// Time left before the next step, for scheduling a repaint.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        match &self.state {
            State::Running { due, .. } => Some(due.saturating_duration_since(now)),
            State::Idle => None,
        }
    }
}

impl Drop for Playback {
    fn drop(&mut self) {
        if self.cancel().is_some() {
            log::debug!("Playback released on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(700);

    fn run_to_end(p: &mut Playback, start: Instant) -> Vec<PlaybackEvent> {
        let mut events = Vec::new();
        let mut now = start;
        for _ in 0..50 {
            now += STEP;
            if let Some(e) = p.poll(now) {
                events.push(e);
                if e == PlaybackEvent::Finished {
                    break;
                }
            }
        }
        events
    }

    #[test]
    fn sweep_steps_through_years_then_finishes() {
        let mut p = Playback::new(2, STEP);
        let t0 = Instant::now();
        assert_eq!(p.toggle(&[2017, 2015, 2016], t0), None);
        assert!(p.is_running());
        assert_eq!(p.poll(t0), None, "first step waits one interval");

        let events = run_to_end(&mut p, t0);
        assert_eq!(
            events,
            vec![
                PlaybackEvent::Step { start: 2015, end: 2017 },
                PlaybackEvent::Step { start: 2016, end: 2017 },
                PlaybackEvent::Step { start: 2017, end: 2017 },
                PlaybackEvent::Finished,
            ]
        );
        assert!(!p.is_running());
        assert_eq!(p.time_until_next(t0), None);
    }

    #[test]
    fn second_toggle_cancels_and_restores() {
        let mut p = Playback::new(2, STEP);
        let t0 = Instant::now();
        p.toggle(&[2015, 2016], t0);
        p.poll(t0 + STEP);
        assert_eq!(p.toggle(&[2015, 2016], t0 + STEP), Some(PlaybackEvent::Finished));
        assert!(!p.is_running());
        assert_eq!(p.poll(t0 + STEP * 5), None);
    }

    #[test]
    fn empty_year_list_does_not_start() {
        let mut p = Playback::new(2, STEP);
        assert_eq!(p.toggle(&[], Instant::now()), None);
        assert!(!p.is_running());
    }

    #[test]
    fn cancel_when_idle_is_a_no_op() {
        let mut p = Playback::new(2, STEP);
        assert_eq!(p.cancel(), None);
    }
}
