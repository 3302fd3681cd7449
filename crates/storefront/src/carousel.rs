//! Banner and related-products index state machines.
//!
//! Both carousels are explicit finite-state objects independent of any
//! rendering framework: `next`/`prev`/`goto`/`tick` are the only
//! transitions, and time enters exclusively through the `now` argument.
//! The owner drives `tick` from its event loop and simply stops calling it
//! on teardown; there is no timer to cancel.
//!
//! # Loop-wrap protocol
//!
//! The banner renders slide 0 duplicated after slide `N-1`. Advancing past
//! the end moves the index to the transient position `N` (visually the
//! duplicate), then a 500 ms snap timer rewrites it to the real `0` with no
//! animated jump. Position `-1` mirrors this for backward navigation. While
//! a snap is pending the `transitioning` flag fences re-entrant advances.

use std::time::{Duration, Instant};

/// Delay before a wrap position snaps back onto the real slide range.
pub const SNAP_DELAY: Duration = Duration::from_millis(500);

/// Cadence of the automatic banner advance.
pub const AUTO_ADVANCE_INTERVAL: Duration = Duration::from_millis(5000);

/// The promotional banner carousel.
#[derive(Debug)]
pub struct BannerCarousel {
    slide_count: i64,
    /// Current position in `[-1, slide_count]`; the two out-of-range values
    /// are transient wrap positions.
    index: i64,
    transitioning: bool,
    snap_at: Option<Instant>,
    auto_at: Instant,
}

impl BannerCarousel {
    /// Create a carousel showing slide 0, with the auto-advance cadence
    /// anchored at `now`.
    #[must_use]
    pub fn new(slide_count: usize, now: Instant) -> Self {
        Self {
            slide_count: i64::try_from(slide_count).unwrap_or(i64::MAX),
            index: 0,
            transitioning: false,
            snap_at: None,
            auto_at: now + AUTO_ADVANCE_INTERVAL,
        }
    }

    /// Advance one slide. No-op while a transition is in flight.
    pub fn next(&mut self, now: Instant) {
        self.shift(1, now);
    }

    /// Go back one slide. No-op while a transition is in flight.
    pub fn prev(&mut self, now: Instant) {
        self.shift(-1, now);
    }

    /// Jump to a real slide (dot navigation). No-op while transitioning or
    /// for an out-of-range target.
    pub fn goto(&mut self, target: usize, now: Instant) {
        if self.transitioning || self.slide_count == 0 {
            return;
        }
        let Ok(target) = i64::try_from(target) else {
            return;
        };
        if target >= self.slide_count {
            return;
        }
        self.transitioning = true;
        self.index = target;
        self.settle(now);
    }

    fn shift(&mut self, step: i64, now: Instant) {
        if self.transitioning || self.slide_count == 0 {
            return;
        }
        self.transitioning = true;
        self.index += step;
        self.settle(now);
    }

    /// After a move: wrap positions wait for the snap timer, in-range
    /// positions settle immediately.
    fn settle(&mut self, now: Instant) {
        if self.index == -1 || self.index == self.slide_count {
            self.snap_at = Some(now + SNAP_DELAY);
        } else {
            self.transitioning = false;
            self.snap_at = None;
        }
    }

    /// Drive pending deadlines. Called from the owner's event loop.
    pub fn tick(&mut self, now: Instant) {
        if let Some(deadline) = self.snap_at
            && now >= deadline
        {
            self.snap_at = None;
            if self.index == self.slide_count {
                self.index = 0;
            } else if self.index == -1 {
                self.index = self.slide_count - 1;
            }
            self.transitioning = false;
        }

        if now >= self.auto_at {
            // A manual navigation already in flight supersedes this advance
            // rather than queueing it: next() is fenced to a no-op.
            self.auto_at = now + AUTO_ADVANCE_INTERVAL;
            self.next(now);
        }
    }

    /// The slide actually shown, mapping the transient wrap positions onto
    /// the real range `[0, N-1]`.
    #[must_use]
    pub fn display_index(&self) -> usize {
        let display = if self.index == self.slide_count {
            0
        } else if self.index == -1 {
            self.slide_count - 1
        } else {
            self.index
        };
        usize::try_from(display).unwrap_or(0)
    }

    /// Raw position, including the transient `-1`/`N` wrap values.
    #[must_use]
    pub const fn raw_index(&self) -> i64 {
        self.index
    }

    #[must_use]
    pub const fn is_transitioning(&self) -> bool {
        self.transitioning
    }
}

/// The related-products horizontal scroller.
///
/// Bounded index, no wraparound, no auto-advance; steps by one and shows
/// [`RelatedScroller::VISIBLE`] items at a time.
#[derive(Debug)]
pub struct RelatedScroller {
    item_count: usize,
    index: usize,
}

impl RelatedScroller {
    /// Items visible at once.
    pub const VISIBLE: usize = 3;

    #[must_use]
    pub const fn new(item_count: usize) -> Self {
        Self {
            item_count,
            index: 0,
        }
    }

    const fn max_index(&self) -> usize {
        self.item_count.saturating_sub(Self::VISIBLE)
    }

    /// Scroll one item forward; clamped at the last full window.
    pub const fn next(&mut self) {
        if self.index < self.max_index() {
            self.index += 1;
        }
    }

    /// Scroll one item back; clamped at zero.
    pub const fn prev(&mut self) {
        self.index = self.index.saturating_sub(1);
    }

    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Whether forward navigation is currently possible.
    #[must_use]
    pub const fn can_next(&self) -> bool {
        self.index < self.max_index()
    }

    #[must_use]
    pub const fn can_prev(&self) -> bool {
        self.index > 0
    }
}
