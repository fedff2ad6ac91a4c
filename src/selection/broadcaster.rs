use thiserror::Error;

use super::{YearBounds, YearRange};

// ---------------------------------------------------------------------------
// Broadcaster – owns the authoritative YearRange and fans it out
// ---------------------------------------------------------------------------

/// Rejected selection input. The previous range stays in effect.
#[derive(Debug, Error, PartialEq)]
pub enum SelectionError {
    #[error("selection bounds must be finite numbers, got ({min}, {max})")]
    NonFinite { min: f64, max: f64 },
    #[error("cannot read a year selection from {0:?}")]
    Unparsable(String),
}

/// What an accepted candidate did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The range changed and every subscriber was notified once.
    Published(YearRange),
    /// The candidate clamped to the range already in effect.
    Unchanged(YearRange),
}

impl Outcome {
    pub fn range(&self) -> YearRange {
        match self {
            Outcome::Published(r) | Outcome::Unchanged(r) => *r,
        }
    }
}

/// Handle returned by [`Broadcaster::subscribe`]; pass it back to
/// [`Broadcaster::unsubscribe`] to stop receiving updates.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "dropping the handle makes the subscription permanent"]
pub struct Subscription(u64);

type Handler = Box<dyn FnMut(YearRange)>;

/// Single-threaded publish/subscribe hub for the shared year selection.
pub struct Broadcaster {
    bounds: YearBounds,
    current: YearRange,
    subscribers: Vec<(u64, Handler)>,
    next_id: u64,
}

impl Broadcaster {
    /// Start with the full enforced span selected.
    pub fn new(bounds: YearBounds) -> Self {
        let bounds = bounds.normalized();
        Broadcaster {
            bounds,
            current: bounds.full_range(),
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    pub fn bounds(&self) -> YearBounds {
        self.bounds
    }

    /// The latest published range.
    pub fn current(&self) -> YearRange {
        self.current
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Register a redraw callback. Subscribers are not called on
    /// registration; use [`Broadcaster::republish`] once wiring is done.
    pub fn subscribe(&mut self, handler: impl FnMut(YearRange) + 'static) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.subscribers.push((id, Box::new(handler)));
        Subscription(id)
    }

    /// Returns `false` if the subscription was already gone.
    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(id, _)| *id != subscription.0);
        self.subscribers.len() != before
    }

    /// Clamp a candidate to the enforced span and publish it if it differs
    /// from the current range. Non-finite input is rejected untouched.
    pub fn set_range(&mut self, min: f64, max: f64) -> Result<Outcome, SelectionError> {
        if !(min.is_finite() && max.is_finite()) {
            log::warn!("Ignoring selection ({min}, {max}): not finite");
            return Err(SelectionError::NonFinite { min, max });
        }
        Ok(self.apply(self.bounds.clamp(min, max)))
    }

    /// Integer-year convenience for inputs that already speak in years.
    pub fn set_years(&mut self, min: i32, max: i32) -> Outcome {
        self.apply(self.bounds.clamp(min as f64, max as f64))
    }

    /// Dropdown input: `"2019"` selects one year, `"2015-2024"` a span.
    pub fn set_range_text(&mut self, text: &str) -> Result<Outcome, SelectionError> {
        match parse_year_selection(text) {
            Some((min, max)) => self.set_range(min, max),
            None => {
                log::warn!("Ignoring selection {text:?}: not a year or year span");
                Err(SelectionError::Unparsable(text.to_string()))
            }
        }
    }

    /// Select the full enforced span.
    pub fn reset(&mut self) -> Outcome {
        self.apply(self.bounds.full_range())
    }

    /// Notify every subscriber of the current range, e.g. after the dataset
    /// was (re)loaded or new charts subscribed.
    pub fn republish(&mut self) {
        self.publish();
    }

    fn apply(&mut self, range: YearRange) -> Outcome {
        if range == self.current {
            return Outcome::Unchanged(range);
        }
        self.current = range;
        self.publish();
        Outcome::Published(range)
    }

    fn publish(&mut self) {
        let range = self.current;
        log::debug!(
            "Publishing year range {range} to {} subscribers",
            self.subscribers.len()
        );
        for (_, handler) in &mut self.subscribers {
            handler(range);
        }
    }
}

impl std::fmt::Debug for Broadcaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Broadcaster")
            .field("bounds", &self.bounds)
            .field("current", &self.current)
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

/// Parse `"2019"` or `"2015-2024"` (whitespace tolerated) into a candidate.
pub fn parse_year_selection(text: &str) -> Option<(f64, f64)> {
    let text = text.trim();
    let parse = |s: &str| s.trim().parse::<f64>().ok().filter(|v| v.is_finite());
    match text.split_once('-') {
        Some((a, b)) => Some((parse(a)?, parse(b)?)),
        None => {
            let y = parse(text)?;
            Some((y, y))
        }
    }
}
