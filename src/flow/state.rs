//! Flow Step Machine
//!
//! The wizard is strictly forward: details -> pin -> status. A PIN
//! rejection keeps the flow at `Pin`; there is no backward transition.

use std::fmt;

/// Wizard step of a transaction flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowStep {
    /// Collect recipient + amount (+ note, + operator for recharge)
    Details,
    /// PIN entry and hold-to-confirm
    Pin,
    /// Terminal: renders the classified outcome
    Status,
}

impl FlowStep {
    /// Terminal steps accept no further wizard input
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowStep::Status)
    }

    /// Legal forward transitions only
    pub fn can_advance_to(&self, next: FlowStep) -> bool {
        matches!(
            (self, next),
            (FlowStep::Details, FlowStep::Pin)
                | (FlowStep::Details, FlowStep::Status)
                | (FlowStep::Pin, FlowStep::Status)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowStep::Details => "DETAILS",
            FlowStep::Pin => "PIN",
            FlowStep::Status => "STATUS",
        }
    }
}

impl fmt::Display for FlowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
