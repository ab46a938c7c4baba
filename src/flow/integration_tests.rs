//! Integration Tests for the Transaction Flow
//!
//! These tests drive a complete flow through its command/event channels
//! with the MockBackend, on a paused-clock runtime so every timing
//! property (hold gesture, lockout close) is exercised deterministically.

use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::time::{Duration, advance};

use crate::config::FlowConfig;
use crate::core_types::{
    AccountRole, AccountSummary, TransactionStatus, TransactionType,
};
use crate::flow::backend::{MockBackend, ScriptedSubmit};
use crate::flow::coordinator::{FlowCommand, FlowEvent, FlowHandle, FlowParams, TransactionFlow};
use crate::flow::error::FlowError;
use crate::flow::outcome::Outcome;
use crate::flow::pin::KeyPress;
use crate::flow::state::FlowStep;

const CORRECT_PIN: &str = "1234";
const WRONG_PIN: &str = "0000";

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn account(id: &str, mobile: &str, role: AccountRole, balance: &str) -> AccountSummary {
    AccountSummary {
        id: id.to_string(),
        mobile: mobile.to_string(),
        name: format!("Account {}", id),
        role,
        balance: dec(balance),
        photo: None,
    }
}

/// Flow + backend wired together for one scenario
struct TestHarness {
    backend: Arc<MockBackend>,
    handle: FlowHandle,
}

impl TestHarness {
    /// Personal initiator (balance 100.00) with a personal peer and an
    /// agent in the directory
    fn new(tx_type: TransactionType) -> Self {
        Self::with_initial_recipient(tx_type, None)
    }

    /// Same directory, with a QR-scan recipient pre-fill
    fn with_initial_recipient(tx_type: TransactionType, initial: Option<&str>) -> Self {
        let initiator = account("u-1", "01700000001", AccountRole::Personal, "100");
        let backend = Arc::new(
            MockBackend::new(initiator.clone(), CORRECT_PIN)
                .with_directory_account(account("u-2", "01700000002", AccountRole::Personal, "20"))
                .with_directory_account(account("a-1", "01900000001", AccountRole::Agent, "5000")),
        );
        let handle = TransactionFlow::spawn(
            backend.clone(),
            FlowConfig::default(),
            FlowParams {
                initiator,
                tx_type,
                initial_recipient: initial.map(str::to_string),
            },
        );
        Self { backend, handle }
    }

    async fn send(&self, cmd: FlowCommand) {
        self.handle.commands.send(cmd).await.unwrap();
    }

    async fn next_event(&mut self) -> FlowEvent {
        self.handle.events.recv().await.expect("flow ended early")
    }

    /// Skip hold-progress noise and return the next substantive event
    async fn next_substantive(&mut self) -> FlowEvent {
        loop {
            match self.next_event().await {
                FlowEvent::HoldProgress(_) => continue,
                other => return other,
            }
        }
    }

    async fn submit_details(&self, recipient: &str, amount: &str) {
        self.send(FlowCommand::SubmitDetails {
            recipient: recipient.to_string(),
            amount: amount.to_string(),
            note: None,
            operator: None,
        })
        .await;
    }

    async fn enter_pin(&self, pin: &str) {
        for d in pin.chars() {
            self.send(FlowCommand::Press(KeyPress::Digit(d))).await;
        }
    }

    /// Enter a PIN and hold to the deadline. The paused clock advances
    /// through event awaits, so the gesture runs its full 5 s.
    async fn confirm_with_pin(&mut self, pin: &str) {
        self.enter_pin(pin).await;
        self.send(FlowCommand::HoldStart).await;
    }

    /// Drain until `Closed`, returning everything seen on the way
    async fn drain_to_close(&mut self) -> Vec<FlowEvent> {
        let mut seen = Vec::new();
        loop {
            let event = self.next_event().await;
            let done = event == FlowEvent::Closed;
            seen.push(event);
            if done {
                return seen;
            }
        }
    }
}

// ========================================================================
// Happy Path
// ========================================================================

/// Scenario: balance 100, amount "50", correct PIN, full hold ->
/// exactly one submission, Successful outcome, displayed amount "50.00"
#[tokio::test(start_paused = true)]
async fn test_send_money_happy_path() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000002", "50").await;
    assert!(matches!(
        harness.next_event().await,
        FlowEvent::RecipientResolved(r) if r.mobile == "01700000002"
    ));
    assert_eq!(
        harness.next_event().await,
        FlowEvent::StepChanged(FlowStep::Pin)
    );

    harness.confirm_with_pin(CORRECT_PIN).await;

    match harness.next_substantive().await {
        FlowEvent::OutcomeReady {
            outcome,
            display_amount,
        } => {
            assert!(outcome.is_successful());
            assert_eq!(display_amount, "50.00");
            let record = outcome.record().unwrap();
            assert_eq!(record.status, TransactionStatus::Successful);
            assert_eq!(record.to_id, "u-2");
            assert_eq!(record.amount, dec("50"));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(
        harness.next_event().await,
        FlowEvent::StepChanged(FlowStep::Status)
    );

    assert_eq!(harness.backend.submit_count(), 1);
    assert_eq!(harness.backend.resolve_count(), 1);

    // "Done" closes the flow; refresh fires after closure
    harness.send(FlowCommand::Acknowledge).await;
    assert_eq!(harness.next_event().await, FlowEvent::Closed);
    harness.handle.join.await.unwrap();
    assert_eq!(harness.backend.refresh_count(), 1);
}

/// Request-money comes back pending and classifies as Pending
#[tokio::test(start_paused = true)]
async fn test_request_money_is_pending() {
    let mut harness = TestHarness::new(TransactionType::RequestMoney);

    // Amount above balance: request-money is credit-type, no balance check
    harness.submit_details("01900000001", "150").await;
    assert!(matches!(
        harness.next_event().await,
        FlowEvent::RecipientResolved(_)
    ));
    assert_eq!(
        harness.next_event().await,
        FlowEvent::StepChanged(FlowStep::Pin)
    );

    harness.confirm_with_pin(CORRECT_PIN).await;
    match harness.next_substantive().await {
        FlowEvent::OutcomeReady { outcome, .. } => assert!(outcome.is_pending()),
        other => panic!("unexpected event: {:?}", other),
    }
}

/// QR-scanned flows pre-fill the recipient: an untouched field resolves
/// the pre-fill, a typed identifier overrides it
#[tokio::test(start_paused = true)]
async fn test_initial_recipient_prefill() {
    let mut harness =
        TestHarness::with_initial_recipient(TransactionType::SendMoney, Some("01700000002"));

    harness.submit_details("", "50").await;
    assert!(matches!(
        harness.next_event().await,
        FlowEvent::RecipientResolved(r) if r.mobile == "01700000002"
    ));
    assert_eq!(
        harness.next_event().await,
        FlowEvent::StepChanged(FlowStep::Pin)
    );

    // A typed identifier wins over the pre-fill: the agent's number
    // resolves (and role-mismatches) instead of the pre-filled peer
    let mut harness =
        TestHarness::with_initial_recipient(TransactionType::SendMoney, Some("01700000002"));
    harness.submit_details("01900000001", "50").await;
    assert_eq!(
        harness.next_event().await,
        FlowEvent::DetailsRejected(FlowError::RecipientTypeMismatch {
            expected: AccountRole::Personal
        })
    );

    // No pre-fill and an empty field still rejects
    let mut harness = TestHarness::new(TransactionType::SendMoney);
    harness.submit_details("", "50").await;
    assert!(matches!(
        harness.next_event().await,
        FlowEvent::DetailsRejected(FlowError::RecipientNotFound(_))
    ));
}

/// Mobile recharge skips the directory and synthesizes the operator
#[tokio::test(start_paused = true)]
async fn test_mobile_recharge_skips_lookup() {
    let mut harness = TestHarness::new(TransactionType::MobileRecharge);

    harness
        .send(FlowCommand::SubmitDetails {
            recipient: "01811111111".to_string(),
            amount: "20".to_string(),
            note: None,
            operator: Some("Robi".to_string()),
        })
        .await;

    match harness.next_event().await {
        FlowEvent::RecipientResolved(recipient) => {
            assert_eq!(recipient.name, "Robi Recharge");
            assert_eq!(recipient.account_id(), None);
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(harness.backend.resolve_count(), 0);
}

// ========================================================================
// Details Validation
// ========================================================================

/// Scenario: amount "150" over balance 100 -> InsufficientBalance shown
/// inline, no submission made beyond the recipient lookup
#[tokio::test(start_paused = true)]
async fn test_insufficient_balance_stays_on_details() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000002", "150").await;
    assert_eq!(
        harness.next_event().await,
        FlowEvent::DetailsRejected(FlowError::InsufficientBalance)
    );

    assert_eq!(harness.backend.resolve_count(), 1);
    assert_eq!(harness.backend.submit_count(), 0);

    // Flow is still alive at details: a corrected amount goes through
    harness.submit_details("01700000002", "50").await;
    assert!(matches!(
        harness.next_event().await,
        FlowEvent::RecipientResolved(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_self_transaction_rejected() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000001", "50").await;
    assert_eq!(
        harness.next_event().await,
        FlowEvent::DetailsRejected(FlowError::SelfTransactionNotAllowed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_recipient_role_mismatch() {
    let mut harness = TestHarness::new(TransactionType::CashOut);

    // Personal cash-out expects an agent; a personal peer is rejected
    harness.submit_details("01700000002", "50").await;
    assert_eq!(
        harness.next_event().await,
        FlowEvent::DetailsRejected(FlowError::RecipientTypeMismatch {
            expected: AccountRole::Agent
        })
    );

    // The agent passes
    harness.submit_details("01900000001", "50").await;
    assert!(matches!(
        harness.next_event().await,
        FlowEvent::RecipientResolved(_)
    ));
}

#[tokio::test(start_paused = true)]
async fn test_unknown_recipient_and_bad_amounts() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01999999999", "50").await;
    assert!(matches!(
        harness.next_event().await,
        FlowEvent::DetailsRejected(FlowError::RecipientNotFound(_))
    ));

    for bad_amount in ["0", "-5", "abc", ""] {
        harness.submit_details("01700000002", bad_amount).await;
        assert!(matches!(
            harness.next_event().await,
            FlowEvent::DetailsRejected(FlowError::InvalidAmount(_))
        ));
    }
}

// ========================================================================
// PIN Lockout
// ========================================================================

/// Scenario: 3 consecutive wrong PINs with limit 3 -> Locked, flow
/// auto-closes after the lockout delay, Closed fires exactly once
#[tokio::test(start_paused = true)]
async fn test_three_wrong_pins_lock_and_force_close() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000002", "50").await;
    harness.next_event().await; // RecipientResolved
    harness.next_event().await; // StepChanged(Pin)

    // First two rejections keep the flow at the pin step
    for expected_left in [2u8, 1] {
        harness.confirm_with_pin(WRONG_PIN).await;
        assert_eq!(
            harness.next_substantive().await,
            FlowEvent::PinRejected {
                attempts_left: expected_left
            }
        );
    }

    // Third rejection locks
    harness.confirm_with_pin(WRONG_PIN).await;
    assert_eq!(harness.next_substantive().await, FlowEvent::PinLockedOut);
    assert_eq!(harness.backend.submit_count(), 3);

    // The forced close arrives on its own after the lockout delay
    let seen = harness.drain_to_close().await;
    let closes = seen.iter().filter(|e| **e == FlowEvent::Closed).count();
    assert_eq!(closes, 1);

    harness.handle.join.await.unwrap();
    assert_eq!(harness.backend.refresh_count(), 1);
}

/// L-1 failures do not lock: a correct PIN on the last attempt succeeds
#[tokio::test(start_paused = true)]
async fn test_two_wrong_pins_then_correct_succeeds() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000002", "50").await;
    harness.next_event().await;
    harness.next_event().await;

    for expected_left in [2u8, 1] {
        harness.confirm_with_pin(WRONG_PIN).await;
        assert_eq!(
            harness.next_substantive().await,
            FlowEvent::PinRejected {
                attempts_left: expected_left
            }
        );
    }

    harness.confirm_with_pin(CORRECT_PIN).await;
    match harness.next_substantive().await {
        FlowEvent::OutcomeReady { outcome, .. } => assert!(outcome.is_successful()),
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(harness.backend.submit_count(), 3);
}

// ========================================================================
// Hold Gesture
// ========================================================================

/// Releasing before the deadline never submits
#[tokio::test(start_paused = true)]
async fn test_release_before_deadline_never_submits() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000002", "50").await;
    harness.next_event().await;
    harness.next_event().await;

    harness.enter_pin(CORRECT_PIN).await;
    // Press and release in quick succession - both commands queue before
    // any timer can fire
    harness.send(FlowCommand::HoldStart).await;
    harness.send(FlowCommand::HoldRelease).await;

    // Give the cancelled deadline room to (not) fire
    advance(Duration::from_millis(6_000)).await;
    tokio::task::yield_now().await;

    assert_eq!(harness.backend.submit_count(), 0);

    // The flow is still at the pin step: a fresh full hold submits once
    harness.send(FlowCommand::HoldStart).await;
    match harness.next_substantive().await {
        FlowEvent::OutcomeReady { outcome, .. } => assert!(outcome.is_successful()),
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(harness.backend.submit_count(), 1);
}

/// Holding without 4 digits present arms nothing
#[tokio::test(start_paused = true)]
async fn test_hold_requires_full_pin() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000002", "50").await;
    harness.next_event().await;
    harness.next_event().await;

    harness.enter_pin("12").await;
    harness.send(FlowCommand::HoldStart).await;
    advance(Duration::from_millis(6_000)).await;
    tokio::task::yield_now().await;

    assert_eq!(harness.backend.submit_count(), 0);
}

// ========================================================================
// Failure & Cancellation
// ========================================================================

/// A non-PIN submission failure is terminal: straight to Status/Failed
#[tokio::test(start_paused = true)]
async fn test_generic_failure_is_terminal() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);
    harness
        .backend
        .script_submit(ScriptedSubmit::Reject("Daily limit exceeded".into()));

    harness.submit_details("01700000002", "50").await;
    harness.next_event().await;
    harness.next_event().await;

    harness.confirm_with_pin(CORRECT_PIN).await;
    match harness.next_substantive().await {
        FlowEvent::OutcomeReady { outcome, .. } => {
            assert_eq!(outcome, Outcome::Failed("Daily limit exceeded".into()));
        }
        other => panic!("unexpected event: {:?}", other),
    }
    assert_eq!(
        harness.next_event().await,
        FlowEvent::StepChanged(FlowStep::Status)
    );

    // No retry happened behind the scenes
    assert_eq!(harness.backend.submit_count(), 1);

    // "Try again" signals a fresh flow restart, then closes
    harness.send(FlowCommand::Retry).await;
    assert_eq!(harness.next_event().await, FlowEvent::RestartRequested);
    assert_eq!(harness.next_event().await, FlowEvent::Closed);
}

/// Dismissing during the pin step cancels every timer: nothing fires
/// afterwards and Closed arrives exactly once
#[tokio::test(start_paused = true)]
async fn test_dismiss_during_pin_cancels_timers() {
    let mut harness = TestHarness::new(TransactionType::SendMoney);

    harness.submit_details("01700000002", "50").await;
    harness.next_event().await;
    harness.next_event().await;

    harness.enter_pin(CORRECT_PIN).await;
    harness.send(FlowCommand::HoldStart).await;
    harness.send(FlowCommand::Dismiss).await;

    let seen = harness.drain_to_close().await;
    let closes = seen.iter().filter(|e| **e == FlowEvent::Closed).count();
    assert_eq!(closes, 1);
    harness.handle.join.await.unwrap();

    // The held gesture died with the flow
    advance(Duration::from_millis(6_000)).await;
    assert_eq!(harness.backend.submit_count(), 0);
    assert_eq!(harness.backend.refresh_count(), 1);
}

/// Dropping the handle entirely is an implicit dismissal
#[tokio::test(start_paused = true)]
async fn test_dropped_handle_closes_flow() {
    let harness = TestHarness::new(TransactionType::SendMoney);
    let backend = harness.backend.clone();
    let join = harness.handle.join;

    drop(harness.handle.commands);
    drop(harness.handle.events);
    join.await.unwrap();

    assert_eq!(backend.refresh_count(), 1);
    assert_eq!(backend.submit_count(), 0);
}

// ========================================================================
// Approval Flow
// ========================================================================

mod approval {
    use super::*;
    use crate::flow::approval::{ApprovalError, ApprovalFlow, ApprovalOutcome};
    use crate::flow::types::TransactionRecord;
    use crate::core_types::TransactionId;

    fn pending_request() -> TransactionRecord {
        TransactionRecord {
            id: TransactionId::new(),
            tx_type: TransactionType::RequestMoney,
            amount: dec("75"),
            status: TransactionStatus::Pending,
            timestamp: 1_700_000_000_000,
            from_id: "u-2".to_string(),
            to_id: "a-1".to_string(),
            from_name: "Account u-2".to_string(),
            to_name: "Account a-1".to_string(),
            from_mobile: "01700000002".to_string(),
            to_mobile: "01900000001".to_string(),
            description: String::new(),
        }
    }

    fn agent_backend() -> Arc<MockBackend> {
        Arc::new(MockBackend::new(
            account("a-1", "01900000001", AccountRole::Agent, "5000"),
            CORRECT_PIN,
        ))
    }

    #[tokio::test]
    async fn test_approve_with_correct_pin() {
        let backend = agent_backend();
        let mut flow = ApprovalFlow::new(backend.clone(), pending_request());

        for d in CORRECT_PIN.chars() {
            assert!(flow.press(KeyPress::Digit(d)));
        }
        assert_eq!(flow.approve().await, Ok(ApprovalOutcome::Approved));
        assert_eq!(backend.update_count(), 1);
    }

    #[tokio::test]
    async fn test_approve_requires_full_pin() {
        let backend = agent_backend();
        let mut flow = ApprovalFlow::new(backend.clone(), pending_request());

        flow.press(KeyPress::Digit('1'));
        assert_eq!(flow.approve().await, Err(ApprovalError::PinIncomplete));
        assert_eq!(backend.update_count(), 0);
    }

    #[tokio::test]
    async fn test_wrong_pin_clears_and_retries_without_lockout() {
        let backend = agent_backend();
        let mut flow = ApprovalFlow::new(backend.clone(), pending_request());

        // Far past the transaction flow's limit - approval never locks
        for _ in 0..5 {
            for d in WRONG_PIN.chars() {
                flow.press(KeyPress::Digit(d));
            }
            assert_eq!(flow.approve().await, Err(ApprovalError::IncorrectPin));
            assert_eq!(flow.pin_entered(), 0); // buffer cleared
        }

        for d in CORRECT_PIN.chars() {
            flow.press(KeyPress::Digit(d));
        }
        assert_eq!(flow.approve().await, Ok(ApprovalOutcome::Approved));
    }

    #[tokio::test]
    async fn test_decline_needs_no_pin() {
        let backend = agent_backend();
        let mut flow = ApprovalFlow::new(backend.clone(), pending_request());

        assert_eq!(flow.decline().await, Ok(ApprovalOutcome::Declined));
        assert_eq!(backend.update_count(), 1);

        // Terminal: no second resolution
        assert!(flow.decline().await.is_err());
        assert!(!flow.press(KeyPress::Digit('1')));
    }
}
