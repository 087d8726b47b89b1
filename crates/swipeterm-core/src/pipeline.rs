#![forbid(unsafe_code)]

//! The input pipeline: decoder → dispatch chain → key replay queue.
//!
//! [`InputPipeline`] is the single entry point the embedding input loop
//! feeds raw units into. Decoded mouse events dispatch to the handler chain
//! immediately, in the order their terminating unit arrived; units the
//! decoder consumed but later ruled out as mouse input come back through
//! [`next_key`](InputPipeline::next_key) as ordinary keystrokes.
//!
//! # Contract
//!
//! After every [`feed`](InputPipeline::feed) or
//! [`poll`](InputPipeline::poll), drain [`next_key`](InputPipeline::next_key)
//! before handling the fed unit or reading further input. That keeps
//! replayed keys in their original stream position: a
//! [`NotConsumed`](FeedOutcome::NotConsumed) unit is handled *after* the
//! replays queued ahead of it.
//!
//! Everything here is single-threaded; the only "concurrency" is the
//! caller interleaving `feed` with deadline polls on one loop.

use std::collections::VecDeque;
use std::time::Instant;

use crate::decoder::{DecoderOutput, EscapeDecoder, FeedOutcome};
use crate::dispatch::{HandlerChain, HandlerId, MouseHandler};
use crate::event::MouseEvent;

/// Owns the decoder and the dispatch chain for one input stream.
#[derive(Debug)]
pub struct InputPipeline {
    decoder: EscapeDecoder,
    handlers: HandlerChain,
    /// Replayed plain keys, in stream order, awaiting the caller.
    keys: VecDeque<char>,
}

impl Default for InputPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl InputPipeline {
    /// Create a pipeline with an empty handler chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            decoder: EscapeDecoder::new(),
            handlers: HandlerChain::new(),
            keys: VecDeque::new(),
        }
    }

    /// Feed one raw input unit.
    ///
    /// Mouse events produced by this unit are dispatched before the call
    /// returns. On [`FeedOutcome::NotConsumed`] the caller handles the unit
    /// as an ordinary key — after draining [`next_key`](Self::next_key).
    pub fn feed(&mut self, key: char, now: Instant) -> FeedOutcome {
        let outcome = self.decoder.feed(key, now);
        self.route(now);
        outcome
    }

    /// Drive the escape-disambiguation deadline during input silence.
    pub fn poll(&mut self, now: Instant) {
        self.decoder.poll_deadline(now);
        self.route(now);
    }

    /// Pop the next replayed plain key, in stream order.
    pub fn next_key(&mut self) -> Option<char> {
        self.keys.pop_front()
    }

    /// The armed escape deadline, for event-loop wakeup scheduling.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.decoder.deadline()
    }

    /// Register a mouse handler (most recent registration runs first).
    pub fn register(&mut self, handler: impl MouseHandler + 'static) -> HandlerId {
        self.handlers.register(handler)
    }

    /// Remove a previously registered handler.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        self.handlers.unregister(id)
    }

    /// The handler chain, for direct manipulation.
    pub fn handlers_mut(&mut self) -> &mut HandlerChain {
        &mut self.handlers
    }

    /// The decoder, for state queries.
    #[must_use]
    pub fn decoder(&self) -> &EscapeDecoder {
        &self.decoder
    }

    /// Move decoder output along: mouse events out to the chain, replayed
    /// keys into the queue, preserving production order.
    fn route(&mut self, now: Instant) {
        while let Some(output) = self.decoder.pop_output() {
            match output {
                DecoderOutput::Key(key) => self.keys.push_back(key),
                DecoderOutput::Mouse(event) => {
                    self.dispatch(&event, now);
                }
            }
        }
    }

    fn dispatch(&mut self, event: &MouseEvent, now: Instant) {
        // Unclaimed events have no default behavior.
        let _claimed = self.handlers.dispatch(event, now);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
