#![forbid(unsafe_code)]

//! Ordered mouse event dispatch.
//!
//! Handlers form a chain walked in order on every decoded mouse event; the
//! first handler that claims an event stops the walk. Registration prepends,
//! so the most recently registered handler gets first refusal — consumers
//! that need priority register last. Events nobody claims are dropped.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::event::MouseEvent;

/// A consumer of decoded mouse events.
pub trait MouseHandler {
    /// Handle a decoded mouse event. Return `true` to claim it and stop
    /// the dispatch walk.
    fn handle(&mut self, event: &MouseEvent, now: Instant) -> bool;
}

/// Shared handles are handlers, so an embedder can keep one side for
/// state accessors while the chain owns the other.
impl<H: MouseHandler> MouseHandler for Rc<RefCell<H>> {
    fn handle(&mut self, event: &MouseEvent, now: Instant) -> bool {
        self.borrow_mut().handle(event, now)
    }
}

/// Adapter so plain closures can sit in the chain.
struct FnHandler<F>(F);

impl<F: FnMut(&MouseEvent, Instant) -> bool> MouseHandler for FnHandler<F> {
    fn handle(&mut self, event: &MouseEvent, now: Instant) -> bool {
        (self.0)(event, now)
    }
}

/// Opaque token identifying a registered handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// The ordered chain of registered mouse handlers.
#[derive(Default)]
pub struct HandlerChain {
    handlers: Vec<(HandlerId, Box<dyn MouseHandler>)>,
    next_id: u64,
}

impl HandlerChain {
    /// Create an empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler at the front of the chain.
    ///
    /// Returns a token for [`unregister`](Self::unregister). O(chain length).
    pub fn register(&mut self, handler: impl MouseHandler + 'static) -> HandlerId {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.handlers.insert(0, (id, Box::new(handler)));
        id
    }

    /// Register a closure at the front of the chain.
    pub fn register_fn(
        &mut self,
        handler: impl FnMut(&MouseEvent, Instant) -> bool + 'static,
    ) -> HandlerId {
        self.register(FnHandler(handler))
    }

    /// Remove a previously registered handler. O(chain length).
    ///
    /// Returns whether the token matched a live registration.
    pub fn unregister(&mut self, id: HandlerId) -> bool {
        match self.handlers.iter().position(|(hid, _)| *hid == id) {
            Some(index) => {
                self.handlers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Deliver an event to the chain in order.
    ///
    /// Returns whether any handler claimed it. Unclaimed events have no
    /// default behavior at this layer.
    pub fn dispatch(&mut self, event: &MouseEvent, now: Instant) -> bool {
        for (_, handler) in &mut self.handlers {
            if handler.handle(event, now) {
                return true;
            }
        }
        false
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerChain")
            .field("len", &self.handlers.len())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::MouseButton;

    fn click() -> MouseEvent {
        MouseEvent::new(MouseButton::Left, 1, 1, true)
    }

    #[test]
    fn empty_chain_claims_nothing() {
        let mut chain = HandlerChain::new();
        assert!(!chain.dispatch(&click(), Instant::now()));
        assert!(chain.is_empty());
    }

    #[test]
    fn most_recent_registration_sees_events_first() {
        let order = Rc::new(RefCell::new(Vec::new()));
        let mut chain = HandlerChain::new();

        let first = Rc::clone(&order);
        chain.register_fn(move |_, _| {
            first.borrow_mut().push("first");
            false
        });
        let second = Rc::clone(&order);
        chain.register_fn(move |_, _| {
            second.borrow_mut().push("second");
            false
        });

        chain.dispatch(&click(), Instant::now());
        assert_eq!(*order.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn claim_stops_the_walk() {
        let reached = Rc::new(RefCell::new(false));
        let mut chain = HandlerChain::new();

        let flag = Rc::clone(&reached);
        chain.register_fn(move |_, _| {
            *flag.borrow_mut() = true;
            false
        });
        chain.register_fn(|_, _| true);

        assert!(chain.dispatch(&click(), Instant::now()));
        assert!(!*reached.borrow(), "claimed event leaked past the claimer");
    }

    #[test]
    fn unregister_removes_only_the_matching_handler() {
        let hits = Rc::new(RefCell::new(0u32));
        let mut chain = HandlerChain::new();

        let a = Rc::clone(&hits);
        let id_a = chain.register_fn(move |_, _| {
            *a.borrow_mut() += 1;
            false
        });
        let b = Rc::clone(&hits);
        let _id_b = chain.register_fn(move |_, _| {
            *b.borrow_mut() += 1;
            false
        });

        assert!(chain.unregister(id_a));
        assert_eq!(chain.len(), 1);
        chain.dispatch(&click(), Instant::now());
        assert_eq!(*hits.borrow(), 1);

        // A stale token is a no-op.
        assert!(!chain.unregister(id_a));
    }

    #[test]
    fn shared_handle_stays_accessible_after_registration() {
        struct Counter {
            hits: u32,
        }
        impl MouseHandler for Counter {
            fn handle(&mut self, _: &MouseEvent, _: Instant) -> bool {
                self.hits += 1;
                false
            }
        }

        let counter = Rc::new(RefCell::new(Counter { hits: 0 }));
        let mut chain = HandlerChain::new();
        chain.register(Rc::clone(&counter));

        chain.dispatch(&click(), Instant::now());
        chain.dispatch(&click(), Instant::now());
        assert_eq!(counter.borrow().hits, 2);
    }
}
