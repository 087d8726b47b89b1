#![forbid(unsafe_code)]

//! Mouse tracking control sequences.
//!
//! Enabling selects basic mouse reporting (1000), button-event drag
//! tracking (1002), and SGR extended coordinate encoding (1006); disabling
//! resets the three modes in reverse order. The sequences are written
//! verbatim — terminals differ in which subsets they honor, and the exact
//! byte order is what the decoder's wire format assumes.

use std::io::{self, Write};

/// Sequences enabling mouse reporting, drag tracking, and SGR encoding.
pub const ENABLE_TRACKING: &[u8] = b"\x1b[?1000h\x1b[?1002h\x1b[?1006h";

/// The matching disable sequences, in reverse order.
pub const DISABLE_TRACKING: &[u8] = b"\x1b[?1006l\x1b[?1002l\x1b[?1000l";

/// Owns the terminal writer side of mouse tracking.
///
/// Dropping a tracker with tracking still enabled writes the disable
/// sequences best-effort, so a panicking embedder does not leave the
/// user's terminal spewing mouse reports.
#[derive(Debug)]
pub struct MouseTracking<W: Write> {
    out: W,
    enabled: bool,
}

impl<W: Write> MouseTracking<W> {
    /// Wrap a terminal writer; tracking starts disabled.
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            enabled: false,
        }
    }

    /// Enable mouse tracking.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to or flushing the terminal.
    pub fn enable(&mut self) -> io::Result<()> {
        self.out.write_all(ENABLE_TRACKING)?;
        self.out.flush()?;
        self.enabled = true;
        #[cfg(feature = "tracing")]
        tracing::info!("mouse tracking enabled");
        Ok(())
    }

    /// Disable mouse tracking.
    ///
    /// # Errors
    ///
    /// Returns any error from writing to or flushing the terminal.
    pub fn disable(&mut self) -> io::Result<()> {
        self.out.write_all(DISABLE_TRACKING)?;
        self.out.flush()?;
        self.enabled = false;
        #[cfg(feature = "tracing")]
        tracing::info!("mouse tracking disabled");
        Ok(())
    }

    /// Whether tracking is currently enabled.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl<W: Write> Drop for MouseTracking<W> {
    fn drop(&mut self) {
        if self.enabled {
            let _ = self.out.write_all(DISABLE_TRACKING);
            let _ = self.out.flush();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Test writer that survives the tracker's drop.
    #[derive(Clone, Default)]
    struct SharedBuf(Rc<RefCell<Vec<u8>>>);

    impl SharedBuf {
        fn bytes(&self) -> Vec<u8> {
            self.0.borrow().clone()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn enable_writes_exact_sequences() {
        let mut tracking = MouseTracking::new(Vec::new());
        tracking.enable().unwrap();
        assert!(tracking.is_enabled());
        assert_eq!(tracking.out, b"\x1b[?1000h\x1b[?1002h\x1b[?1006h");
    }

    #[test]
    fn disable_writes_reverse_order_sequences() {
        let mut tracking = MouseTracking::new(Vec::new());
        tracking.enable().unwrap();
        tracking.disable().unwrap();
        assert!(!tracking.is_enabled());
        let expected: Vec<u8> = [ENABLE_TRACKING, DISABLE_TRACKING].concat();
        assert_eq!(tracking.out, expected);
    }

    #[test]
    fn starts_disabled() {
        let tracking = MouseTracking::new(Vec::new());
        assert!(!tracking.is_enabled());
    }

    #[test]
    fn drop_disables_when_still_enabled() {
        let buf = SharedBuf::default();
        {
            let mut tracking = MouseTracking::new(buf.clone());
            tracking.enable().unwrap();
        }
        let expected: Vec<u8> = [ENABLE_TRACKING, DISABLE_TRACKING].concat();
        assert_eq!(buf.bytes(), expected);
    }

    #[test]
    fn drop_is_silent_when_already_disabled() {
        let buf = SharedBuf::default();
        {
            let mut tracking = MouseTracking::new(buf.clone());
            tracking.enable().unwrap();
            tracking.disable().unwrap();
        }
        let expected: Vec<u8> = [ENABLE_TRACKING, DISABLE_TRACKING].concat();
        assert_eq!(buf.bytes(), expected);
    }
}
