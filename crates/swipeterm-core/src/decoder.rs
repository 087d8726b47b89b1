#![forbid(unsafe_code)]

//! Escape-sequence decoder for the raw terminal input stream.
//!
//! Terminals multiplex plain keys, arrow/function keys, and SGR mouse
//! reports into one overlapping escape grammar with no framing: a lone
//! `ESC` byte is itself a valid keypress, and the decoder cannot know on
//! receipt whether more bytes follow. This module resolves that ambiguity
//! with a bounded deadline and replays every byte it misclassified as
//! ordinary key input, so no keystroke is ever lost or duplicated.
//!
//! # Design
//!
//! The decoder is a phase machine fed one input unit at a time via
//! [`EscapeDecoder::feed`]. It reports whether it absorbed the unit; units
//! it declines must be handled by the caller as ordinary keys. Everything
//! the decoder produces — replayed keys and parsed mouse events — lands in
//! an ordered output queue drained with [`EscapeDecoder::pop_output`].
//! Replayed keys are plain data in that queue and are never fed back into
//! the phase machine, so replay cannot recurse.
//!
//! The escape deadline is a stored [`Instant`]; the embedding event loop
//! polls it via [`EscapeDecoder::poll_deadline`] during input silence and
//! can schedule a wakeup from [`EscapeDecoder::deadline`]. `feed` resolves
//! an already-expired deadline before interpreting its unit, matching an
//! event loop that fires timers between reads.
//!
//! # Failure Modes
//!
//! There is no error path. Malformed, truncated, or oversized sequences
//! degrade to replaying every consumed unit as if it had been typed
//! literally; a confused parser must never eat input permanently.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::event::{MouseButton, MouseEvent};

/// How long a lone `ESC` may sit unresolved before it is treated as a real
/// Escape keypress.
pub const ESC_DISAMBIGUATION_TIMEOUT: Duration = Duration::from_millis(50);

/// Sequences longer than this stop accumulating.
const SEQUENCE_CAPACITY: usize = 64;

const ESC: char = '\u{1b}';

/// Result of feeding one input unit to the decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedOutcome {
    /// The decoder absorbed the unit into in-progress disambiguation.
    Consumed,
    /// The decoder is not interested; the caller handles the unit as an
    /// ordinary key — after draining any queued output.
    NotConsumed,
}

/// Output produced by the decoder, drained in order by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecoderOutput {
    /// A previously consumed unit replayed as an ordinary keypress.
    Key(char),
    /// A fully parsed SGR mouse report.
    Mouse(MouseEvent),
}

/// Decoder phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Phase {
    /// No sequence in progress.
    #[default]
    Idle,
    /// Saw a lone `ESC`; the disambiguation deadline is armed.
    Esc,
    /// Saw `ESC O` (application-mode keys).
    EscO,
    /// Saw `ESC [`; the nature of the sequence is not yet known.
    Bracket,
    /// Saw `ESC [ <`; reading an SGR mouse body.
    SgrBody,
}

/// Streaming decoder for one terminal input stream.
///
/// Single-threaded and synchronous: `feed` and `poll_deadline` execute on
/// the thread that reads input, and output is dispatched strictly in the
/// order each terminating unit was received.
#[derive(Debug, Default)]
pub struct EscapeDecoder {
    phase: Phase,
    /// Sequence units accumulated after `ESC [`.
    buf: String,
    /// Armed iff `phase` is [`Phase::Esc`].
    deadline: Option<Instant>,
    /// Replayed keys and parsed mouse events, in production order.
    out: VecDeque<DecoderOutput>,
}

impl EscapeDecoder {
    /// Create a new decoder in the idle phase.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one input unit.
    ///
    /// Every raw input unit goes through this function before any other
    /// interpretation. [`FeedOutcome::NotConsumed`] means the unit is an
    /// ordinary key; the caller must drain [`pop_output`](Self::pop_output)
    /// first so replayed keys keep their position ahead of it.
    pub fn feed(&mut self, key: char, now: Instant) -> FeedOutcome {
        // An expired deadline resolves before the new unit is interpreted,
        // as if the event loop had fired the timer between reads.
        self.poll_deadline(now);

        match self.phase {
            Phase::Idle => self.feed_idle(key, now),
            Phase::Esc => self.feed_esc(key),
            Phase::EscO => self.feed_esc_o(key),
            Phase::Bracket | Phase::SgrBody => self.feed_sequence(key),
        }
    }

    /// Fire the escape-disambiguation deadline if it has passed.
    ///
    /// Call during input silence; `feed` also calls this internally.
    pub fn poll_deadline(&mut self, now: Instant) {
        let Some(deadline) = self.deadline else {
            return;
        };
        if now < deadline {
            return;
        }
        // The lone ESC never grew into a sequence: it was a real keypress.
        self.reset();
        self.out.push_back(DecoderOutput::Key(ESC));
    }

    /// Pop the oldest queued output, if any.
    pub fn pop_output(&mut self) -> Option<DecoderOutput> {
        self.out.pop_front()
    }

    /// The armed escape-disambiguation deadline, for event-loop scheduling.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether a lone `ESC` is still waiting to be disambiguated.
    #[must_use]
    pub fn escape_pending(&self) -> bool {
        self.phase == Phase::Esc
    }

    /// Whether no sequence is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    // -----------------------------------------------------------------------
    // Phase handlers
    // -----------------------------------------------------------------------

    fn feed_idle(&mut self, key: char, now: Instant) -> FeedOutcome {
        if key != ESC {
            return FeedOutcome::NotConsumed;
        }
        self.phase = Phase::Esc;
        self.buf.clear();
        // Re-arming always replaces the previous deadline: at most one is
        // outstanding.
        self.deadline = Some(now + ESC_DISAMBIGUATION_TIMEOUT);
        FeedOutcome::Consumed
    }

    fn feed_esc(&mut self, key: char) -> FeedOutcome {
        // Any continuation settles the ambiguity one way or the other.
        self.deadline = None;
        match key {
            '[' => {
                self.phase = Phase::Bracket;
                self.buf.clear();
                FeedOutcome::Consumed
            }
            'O' => {
                self.phase = Phase::EscO;
                FeedOutcome::Consumed
            }
            _ => {
                // False alarm: the ESC was a real keypress. Replay it ahead
                // of the current unit, which the caller handles normally.
                self.reset();
                self.out.push_back(DecoderOutput::Key(ESC));
                FeedOutcome::NotConsumed
            }
        }
    }

    fn feed_esc_o(&mut self, key: char) -> FeedOutcome {
        // Application-mode keys are not ours; hand all three units to the
        // ordinary key path.
        self.reset();
        self.out.push_back(DecoderOutput::Key(ESC));
        self.out.push_back(DecoderOutput::Key('O'));
        self.out.push_back(DecoderOutput::Key(key));
        FeedOutcome::Consumed
    }

    fn feed_sequence(&mut self, key: char) -> FeedOutcome {
        let first = self.buf.is_empty();
        let saturated = self.buf.len() >= SEQUENCE_CAPACITY;
        if !saturated {
            self.buf.push(key);
        }

        if self.phase == Phase::Bracket {
            if first {
                if matches!(key, 'A'..='D' | 'H' | 'F' | '1'..='6') {
                    // Arrow/navigation key, not a mouse report.
                    self.flush_sequence(None);
                    return FeedOutcome::Consumed;
                }
                if key == '<' {
                    self.phase = Phase::SgrBody;
                    return FeedOutcome::Consumed;
                }
            }
            if self.phase == Phase::Bracket {
                // Some other bracket sequence: accumulate to its terminator,
                // then hand everything back as ordinary keys. A sequence
                // that fills the buffer without terminating is flushed the
                // same way so the machine always resets.
                if matches!(key, 'm' | '~' | 'A'..='Z') {
                    self.flush_sequence(if saturated { Some(key) } else { None });
                } else if saturated {
                    self.flush_sequence(Some(key));
                }
                return FeedOutcome::Consumed;
            }
        }

        if key == 'M' || key == 'm' {
            self.finish_sgr(key);
        }
        FeedOutcome::Consumed
    }

    // -----------------------------------------------------------------------
    // Completion
    // -----------------------------------------------------------------------

    /// Parse the accumulated SGR body once a terminator arrives.
    ///
    /// An incomplete body (missing `;` separators) is not an error: keep
    /// reading, unless the buffer already saturated, in which case nothing
    /// further can complete it and the units are replayed instead.
    fn finish_sgr(&mut self, terminator: char) {
        let saturated = self.buf.len() >= SEQUENCE_CAPACITY;
        // buf is "<B;X;Y" plus, when not saturated, the terminator itself.
        let body = &self.buf[1..];
        let Some((field_button, rest)) = body.split_once(';') else {
            if saturated {
                self.flush_sequence(Some(terminator));
            }
            return;
        };
        let Some((field_x, field_y)) = rest.split_once(';') else {
            if saturated {
                self.flush_sequence(Some(terminator));
            }
            return;
        };

        let raw_button = decimal_prefix(field_button);
        let x = decimal_prefix(field_x).saturating_sub(1);
        let y = decimal_prefix(field_y).saturating_sub(1);
        let press = terminator == 'M';

        let button = if raw_button & 64 != 0 {
            // Only the bare wheel-up code reports up; modifier bits fall
            // through to down, as the protocol consumers expect.
            if raw_button == 64 {
                MouseButton::WheelUp
            } else {
                MouseButton::WheelDown
            }
        } else {
            match raw_button & 3 {
                0 => MouseButton::Left,
                1 => MouseButton::Middle,
                2 => MouseButton::Right,
                _ => MouseButton::Left,
            }
        };

        self.reset();
        self.out.push_back(DecoderOutput::Mouse(
            MouseEvent::new(button, x, y, press).with_raw_button(raw_button),
        ));
    }

    /// Replay `ESC [`, the accumulated units, and an optional unit that
    /// never made it into the saturated buffer, then reset.
    fn flush_sequence(&mut self, extra: Option<char>) {
        self.out.push_back(DecoderOutput::Key(ESC));
        self.out.push_back(DecoderOutput::Key('['));
        let buf = std::mem::take(&mut self.buf);
        for c in buf.chars() {
            self.out.push_back(DecoderOutput::Key(c));
        }
        if let Some(c) = extra {
            self.out.push_back(DecoderOutput::Key(c));
        }
        self.reset();
    }

    fn reset(&mut self) {
        self.phase = Phase::Idle;
        self.buf.clear();
        self.deadline = None;
    }
}

/// Decimal prefix parse with the wire protocol's tolerance: leading digits
/// count, anything else stops the scan, and garbage degrades to 0.
fn decimal_prefix(s: &str) -> u16 {
    let mut value: u16 = 0;
    for c in s.chars() {
        let Some(d) = c.to_digit(10) else {
            break;
        };
        value = value.saturating_mul(10).saturating_add(d as u16);
    }
    value
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
