//! Receiver calls during replay.
//!
//! A receiver method returns `false` to stop receiving. That detaches it
//! for the rest of the current parse: later calls are skipped and the parse
//! result is unaffected.

/// Receiver calls for one parse, honouring a receiver that asked to stop.
#[derive(Debug, Default)]
pub struct Delivery {
    detached: bool,
}

impl Delivery {
    /// Make one receiver call unless the receiver already detached.
    ///
    /// `what` names the call in the log line written on refusal.
    pub fn call(&mut self, what: &str, call: impl FnOnce() -> bool) {
        if self.detached {
            return;
        }
        if !call() {
            log::warn!("receiver detached after {what}");
            self.detached = true;
        }
    }

    pub fn is_detached(&self) -> bool {
        self.detached
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stops_after_refusal() {
        let mut out = Delivery::default();
        let mut calls = 0;
        for keep in [true, false, true] {
            out.call("test", || {
                calls += 1;
                keep
            });
        }
        assert_eq!(calls, 2);
        assert!(out.is_detached());
    }

    #[test]
    fn accepting_receiver_stays_attached() {
        let mut out = Delivery::default();
        out.call("test", || true);
        out.call("test", || true);
        assert!(!out.is_detached());
    }
}
