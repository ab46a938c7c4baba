//! PIN Entry & Lockout Guard
//!
//! Tracks the digit buffer and failed attempts for one flow instance.
//! The attempt count only ever moves up; `Locked` is terminal - no
//! digit, clear, or resubmission is accepted past it.

/// Required PIN length
pub const PIN_LENGTH: usize = 4;

/// Observable phase of the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPhase {
    /// 0-3 digits entered
    Entering,
    /// 4 digits present, awaiting hold-to-confirm
    Ready,
    /// Submission in flight - input disabled
    Submitting,
    /// Terminal - attempt limit reached
    Locked,
}

/// Keypad input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPress {
    Digit(char),
    Backspace,
}

/// Result of recording a PIN rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinRejection {
    /// Buffer cleared, shake feedback fires once, stay on the pin step
    Retry { attempts_left: u8 },
    /// Attempt limit reached - flow must force-close after the lockout delay
    LockedOut,
}

/// Per-flow PIN state
#[derive(Debug, Clone)]
pub struct PinGuard {
    digits: String,
    attempts: u8,
    limit: u8,
    locked: bool,
    submitting: bool,
}

impl PinGuard {
    pub fn new(limit: u8) -> Self {
        Self {
            digits: String::with_capacity(PIN_LENGTH),
            attempts: 0,
            limit,
            locked: false,
            submitting: false,
        }
    }

    pub fn phase(&self) -> PinPhase {
        if self.locked {
            PinPhase::Locked
        } else if self.submitting {
            PinPhase::Submitting
        } else if self.digits.len() == PIN_LENGTH {
            PinPhase::Ready
        } else {
            PinPhase::Entering
        }
    }

    pub fn entered(&self) -> usize {
        self.digits.len()
    }

    pub fn attempts(&self) -> u8 {
        self.attempts
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// 4 digits present and the guard accepts a confirm gesture
    pub fn is_ready(&self) -> bool {
        self.phase() == PinPhase::Ready
    }

    /// Apply a keypad press. Returns false when the input was ignored
    /// (locked, submitting, buffer full, or not a digit).
    pub fn press(&mut self, key: KeyPress) -> bool {
        if self.locked || self.submitting {
            return false;
        }
        match key {
            KeyPress::Digit(d) => {
                if !d.is_ascii_digit() || self.digits.len() >= PIN_LENGTH {
                    return false;
                }
                self.digits.push(d);
                true
            }
            KeyPress::Backspace => {
                if self.digits.is_empty() {
                    return false;
                }
                self.digits.pop();
                true
            }
        }
    }

    /// Explicit clear (tap on the dot indicator)
    pub fn clear(&mut self) -> bool {
        if self.locked || self.submitting || self.digits.is_empty() {
            return false;
        }
        self.digits.clear();
        true
    }

    /// Take the PIN for submission, switching to `Submitting`.
    /// Returns None unless the guard is `Ready`.
    pub fn begin_submit(&mut self) -> Option<String> {
        if !self.is_ready() {
            return None;
        }
        self.submitting = true;
        Some(self.digits.clone())
    }

    /// Submission resolved without a PIN rejection (success, pending, or
    /// a generic failure). The buffer is NOT reset on success.
    pub fn end_submit(&mut self) {
        self.submitting = false;
    }

    /// Submission came back as "incorrect PIN". Attempts go strictly up,
    /// the buffer resets, and the limit flips the guard to `Locked`.
    pub fn record_rejection(&mut self) -> PinRejection {
        self.submitting = false;
        self.attempts = self.attempts.saturating_add(1);
        self.digits.clear();

        if self.attempts >= self.limit {
            self.locked = true;
            PinRejection::LockedOut
        } else {
            PinRejection::Retry {
                attempts_left: self.limit - self.attempts,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enter_pin(guard: &mut PinGuard, pin: &str) {
        for d in pin.chars() {
            assert!(guard.press(KeyPress::Digit(d)));
        }
    }

    #[test]
    fn test_digit_entry_to_ready() {
        let mut guard = PinGuard::new(3);
        assert_eq!(guard.phase(), PinPhase::Entering);

        enter_pin(&mut guard, "1234");
        assert_eq!(guard.phase(), PinPhase::Ready);

        // Fifth digit ignored
        assert!(!guard.press(KeyPress::Digit('5')));
        assert_eq!(guard.entered(), 4);
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut guard = PinGuard::new(3);
        enter_pin(&mut guard, "12");
        assert!(guard.press(KeyPress::Backspace));
        assert_eq!(guard.entered(), 1);

        assert!(guard.clear());
        assert_eq!(guard.entered(), 0);
        assert!(!guard.clear()); // already empty
        assert!(!guard.press(KeyPress::Backspace));
    }

    #[test]
    fn test_non_digit_ignored() {
        let mut guard = PinGuard::new(3);
        assert!(!guard.press(KeyPress::Digit('x')));
        assert_eq!(guard.entered(), 0);
    }

    #[test]
    fn test_rejection_clears_and_counts() {
        let mut guard = PinGuard::new(3);
        enter_pin(&mut guard, "1234");
        assert!(guard.begin_submit().is_some());
        assert_eq!(guard.phase(), PinPhase::Submitting);

        let rejection = guard.record_rejection();
        assert_eq!(rejection, PinRejection::Retry { attempts_left: 2 });
        assert_eq!(guard.entered(), 0);
        assert_eq!(guard.phase(), PinPhase::Entering);
        assert_eq!(guard.attempts(), 1);
    }

    #[test]
    fn test_lockout_at_limit() {
        let mut guard = PinGuard::new(3);
        for attempt in 1..=3u8 {
            enter_pin(&mut guard, "0000");
            assert!(guard.begin_submit().is_some());
            let rejection = guard.record_rejection();
            if attempt < 3 {
                assert_eq!(
                    rejection,
                    PinRejection::Retry {
                        attempts_left: 3 - attempt
                    }
                );
            } else {
                assert_eq!(rejection, PinRejection::LockedOut);
            }
        }
        assert!(guard.is_locked());
        assert_eq!(guard.phase(), PinPhase::Locked);
    }

    #[test]
    fn test_locked_is_terminal() {
        let mut guard = PinGuard::new(1);
        enter_pin(&mut guard, "0000");
        guard.begin_submit();
        assert_eq!(guard.record_rejection(), PinRejection::LockedOut);

        assert!(!guard.press(KeyPress::Digit('1')));
        assert!(!guard.press(KeyPress::Backspace));
        assert!(!guard.clear());
        assert!(guard.begin_submit().is_none());
    }

    #[test]
    fn test_input_disabled_while_submitting() {
        let mut guard = PinGuard::new(3);
        enter_pin(&mut guard, "1234");
        let pin = guard.begin_submit().unwrap();
        assert_eq!(pin, "1234");

        assert!(!guard.press(KeyPress::Digit('9')));
        assert!(!guard.clear());
        // Double submit guarded
        assert!(guard.begin_submit().is_none());

        // Success path: buffer survives, submitting flag drops
        guard.end_submit();
        assert_eq!(guard.entered(), 4);
        assert_eq!(guard.phase(), PinPhase::Ready);
    }
}
