#![forbid(unsafe_code)]

//! Horizontal swipe recognition over decoded mouse events.
//!
//! The recognizer sits in the dispatch chain and tracks one press → drag →
//! release cycle at a time (single pointer). A completed drag classifies
//! against distance and duration thresholds into one of four swipes, each
//! mapped to a configured command string handed verbatim to an injected
//! executor. Vertical swipes are unsupported by design.
//!
//! # Claim semantics
//!
//! Presses and drag motion are observed but never claimed, so click
//! handling elsewhere in the chain still sees them. Only a release that
//! classifies as a swipe is claimed.

use std::fmt;
use std::time::{Duration, Instant};

use crate::dispatch::MouseHandler;
use crate::event::{MouseButton, MouseEvent};

/// A classified horizontal swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Swipe {
    /// Short drag to the left.
    LeftShort,

    /// Long drag to the left.
    LeftLong,

    /// Short drag to the right.
    RightShort,

    /// Long drag to the right.
    RightLong,
}

/// Command strings for each swipe, forwarded verbatim to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwipeCommands {
    /// Command for a short left swipe.
    pub left_short: String,

    /// Command for a long left swipe.
    pub left_long: String,

    /// Command for a short right swipe.
    pub right_short: String,

    /// Command for a long right swipe.
    pub right_long: String,
}

impl Default for SwipeCommands {
    fn default() -> Self {
        Self {
            left_short: "/window prev".into(),
            left_long: "/window 1".into(),
            right_short: "/window next".into(),
            right_long: "/window last".into(),
        }
    }
}

impl SwipeCommands {
    /// Look up the command string for a swipe.
    #[must_use]
    pub fn command_for(&self, swipe: Swipe) -> &str {
        match swipe {
            Swipe::LeftShort => &self.left_short,
            Swipe::LeftLong => &self.left_long,
            Swipe::RightShort => &self.right_short,
            Swipe::RightLong => &self.right_long,
        }
    }
}

/// Configuration for swipe recognition.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Minimum drag distance, in cells, before a drag counts as a swipe.
    /// A drag longer than twice this is a long swipe. Default: 10.
    pub sensitivity: u16,

    /// Maximum press-to-release duration for a swipe. Default: 1000 ms.
    pub timeout: Duration,

    /// Per-swipe command table.
    pub commands: SwipeCommands,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            sensitivity: 10,
            timeout: Duration::from_millis(1000),
            commands: SwipeCommands::default(),
        }
    }
}

/// One in-flight press/drag/release cycle.
#[derive(Debug, Clone, Copy, Default)]
struct Tracking {
    /// A gesture is being tracked.
    active: bool,
    /// The button is still down.
    dragging: bool,
    start: (u16, u16),
    current: (u16, u16),
    started_at: Option<Instant>,
    /// Captured from the area validator at press time.
    in_valid_area: bool,
}

/// Stateful swipe recognizer; register it on a [`HandlerChain`].
///
/// [`HandlerChain`]: crate::dispatch::HandlerChain
pub struct GestureRecognizer {
    config: GestureConfig,
    enabled: bool,
    state: Tracking,
    /// Decides whether a press location accepts gestures (e.g. the main
    /// pane, excluding side panels). Absent means everywhere does.
    area_validator: Option<Box<dyn Fn(u16, u16) -> bool>>,
    /// Runs the configured command for a classified swipe.
    executor: Option<Box<dyn FnMut(&str)>>,
}

impl GestureRecognizer {
    /// Create a recognizer with the given configuration, enabled, with no
    /// area validator and no executor installed.
    #[must_use]
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            enabled: true,
            state: Tracking::default(),
            area_validator: None,
            executor: None,
        }
    }

    /// Install the area validator consulted at press time.
    pub fn set_area_validator(&mut self, validator: impl Fn(u16, u16) -> bool + 'static) {
        self.area_validator = Some(Box::new(validator));
    }

    /// Install the command executor invoked for classified swipes.
    pub fn set_executor(&mut self, executor: impl FnMut(&str) + 'static) {
        self.executor = Some(Box::new(executor));
    }

    /// Whether recognition is enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enable or disable recognition. Disabling mid-gesture abandons the
    /// in-flight state.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.state = Tracking::default();
        }
    }

    /// Whether a gesture is currently being tracked.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active
    }

    /// Get a reference to the current configuration.
    #[must_use]
    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    /// Replace the configuration (settings reload).
    pub fn set_config(&mut self, config: GestureConfig) {
        self.config = config;
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    fn on_press(&mut self, event: &MouseEvent, now: Instant) {
        self.state.active = true;
        self.state.dragging = true;
        self.state.start = event.position();
        self.state.current = event.position();
        self.state.started_at = Some(now);
        self.state.in_valid_area = self
            .area_validator
            .as_ref()
            .is_none_or(|validator| validator(event.x, event.y));
    }

    /// Classify and fire on release. Returns whether the event is claimed.
    fn on_release(&mut self, now: Instant) -> bool {
        let duration = self
            .state
            .started_at
            .map_or(Duration::ZERO, |t| now.duration_since(t));
        let dx = i32::from(self.state.current.0) - i32::from(self.state.start.0);
        let dy = i32::from(self.state.current.1) - i32::from(self.state.start.1);

        if self.state.in_valid_area
            && duration <= self.config.timeout
            && let Some(swipe) = self.classify(dx, dy)
        {
            self.run_command(swipe);
            self.state = Tracking::default();
            return true;
        }
        self.state = Tracking::default();
        false
    }

    fn classify(&self, dx: i32, dy: i32) -> Option<Swipe> {
        let adx = dx.unsigned_abs();
        let ady = dy.unsigned_abs();
        let sensitivity = u32::from(self.config.sensitivity);

        if adx < sensitivity && ady < sensitivity {
            return None;
        }
        // Horizontal swipes only.
        if adx <= ady {
            return None;
        }

        let long = adx > sensitivity * 2;
        Some(match (dx < 0, long) {
            (true, true) => Swipe::LeftLong,
            (true, false) => Swipe::LeftShort,
            (false, true) => Swipe::RightLong,
            (false, false) => Swipe::RightShort,
        })
    }

    fn run_command(&mut self, swipe: Swipe) {
        let command = self.config.commands.command_for(swipe);
        if command.is_empty() {
            return;
        }
        #[cfg(feature = "tracing")]
        tracing::debug!(?swipe, command, "swipe recognized");
        if let Some(executor) = self.executor.as_mut() {
            executor(command);
        }
    }
}

impl MouseHandler for GestureRecognizer {
    fn handle(&mut self, event: &MouseEvent, now: Instant) -> bool {
        if !self.enabled || event.button != MouseButton::Left {
            return false;
        }

        let mut claimed = false;
        if event.press {
            // First press starts tracking; motion reports also carry the
            // press flag and fall through to the drag update below.
            if !self.state.active {
                self.on_press(event, now);
            }
        } else if self.state.active && self.state.dragging {
            claimed = self.on_release(now);
        }

        if event.is_motion() && self.state.active && self.state.dragging {
            self.state.current = event.position();
        }

        claimed
    }
}

impl fmt::Debug for GestureRecognizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GestureRecognizer")
            .field("config", &self.config)
            .field("enabled", &self.enabled)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
