//! Flow Coordinator
//!
//! Orchestrates one transaction flow: details -> pin -> status. Each
//! flow is a single task driven by a `tokio::select!` loop over the
//! caller's commands and the gesture/lockout timers, so closing the
//! flow (explicit dismissal, completion, or forced lockout closure)
//! drops every outstanding timer with it.

use std::ops::ControlFlow;
use std::pin::Pin;
use std::sync::Arc;

use rust_decimal::Decimal;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Sleep, sleep};
use tracing::{debug, info, warn};

use crate::config::FlowConfig;
use crate::core_types::{AccountSummary, TransactionType};
use crate::flow::backend::WalletBackend;
use crate::flow::error::FlowError;
use crate::flow::hold::{HoldGesture, HoldSignal};
use crate::flow::outcome::{Outcome, SubmitDisposition, classify};
use crate::flow::pin::{KeyPress, PinGuard, PinRejection};
use crate::flow::recipient::RecipientResolver;
use crate::flow::state::FlowStep;
use crate::flow::amount;
use crate::flow::types::{RecipientSummary, TransactionRequest};
use crate::money::format_amount;

/// Commands a UI sends into a running flow
#[derive(Debug, Clone)]
pub enum FlowCommand {
    /// Details step: recipient identifier + raw amount (+ note, +
    /// operator selection for recharge)
    SubmitDetails {
        recipient: String,
        amount: String,
        note: Option<String>,
        operator: Option<String>,
    },
    /// Keypad press at the pin step
    Press(KeyPress),
    /// Tap on the dot indicator
    ClearPin,
    /// Confirm button pressed down
    HoldStart,
    /// Confirm button released (or pointer left it)
    HoldRelease,
    /// "Done" at the status step
    Acknowledge,
    /// "Try again" after a generic failure - the caller starts a fresh flow
    Retry,
    /// Close the flow from any step
    Dismiss,
}

/// Events a flow emits for the UI to render
#[derive(Debug, Clone, PartialEq)]
pub enum FlowEvent {
    StepChanged(FlowStep),
    /// Details validation failed; flow stays at the details step
    DetailsRejected(FlowError),
    RecipientResolved(RecipientSummary),
    /// Shake feedback fires once per rejection
    PinRejected { attempts_left: u8 },
    /// Terminal: the flow force-closes after the lockout delay
    PinLockedOut,
    HoldProgress(u8),
    /// Display amount ("50.00") travels with the outcome
    OutcomeReady { outcome: Outcome, display_amount: String },
    /// Caller should start a fresh flow with cleared errors
    RestartRequested,
    /// Fired exactly once at terminal dismissal
    Closed,
}

/// Flow start parameters
#[derive(Debug, Clone)]
pub struct FlowParams {
    pub initiator: AccountSummary,
    pub tx_type: TransactionType,
    /// Pre-filled recipient for QR-scan-initiated flows
    pub initial_recipient: Option<String>,
}

/// Handle to a spawned flow
pub struct FlowHandle {
    pub commands: mpsc::Sender<FlowCommand>,
    pub events: mpsc::Receiver<FlowEvent>,
    pub join: JoinHandle<()>,
}

const EVENT_CHANNEL_CAPACITY: usize = 64;
const COMMAND_CHANNEL_CAPACITY: usize = 16;

/// What woke the flow loop up
enum Wakeup {
    LockoutElapsed,
    Hold(HoldSignal),
    Command(Option<FlowCommand>),
}

/// One transaction flow instance. Owns all of its mutable state; no
/// state is shared between flow instances.
pub struct TransactionFlow {
    flow_id: ulid::Ulid,
    config: FlowConfig,
    backend: Arc<dyn WalletBackend>,
    initiator: AccountSummary,
    tx_type: TransactionType,

    step: FlowStep,
    recipient: Option<RecipientSummary>,
    recipient_identifier: String,
    amount: Option<Decimal>,
    note: Option<String>,

    pin: PinGuard,
    hold: HoldGesture,
    outcome: Option<Outcome>,
    /// Armed on lockout: the delayed forced-close edge
    lockout_close: Option<Pin<Box<Sleep>>>,
}

impl TransactionFlow {
    pub fn new(backend: Arc<dyn WalletBackend>, config: FlowConfig, params: FlowParams) -> Self {
        Self {
            flow_id: ulid::Ulid::new(),
            pin: PinGuard::new(config.pin_attempt_limit),
            hold: HoldGesture::new(config.hold_duration_ms, config.hold_tick_ms),
            config,
            backend,
            initiator: params.initiator,
            tx_type: params.tx_type,
            step: FlowStep::Details,
            recipient: None,
            recipient_identifier: params.initial_recipient.unwrap_or_default(),
            amount: None,
            note: None,
            outcome: None,
            lockout_close: None,
        }
    }

    /// Spawn the flow task and return its handle
    pub fn spawn(
        backend: Arc<dyn WalletBackend>,
        config: FlowConfig,
        params: FlowParams,
    ) -> FlowHandle {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let flow = TransactionFlow::new(backend, config, params);
        let join = tokio::spawn(flow.run(cmd_rx, event_tx));
        FlowHandle {
            commands: cmd_tx,
            events: event_rx,
            join,
        }
    }

    /// Drive the flow to terminal dismissal.
    ///
    /// `Closed` fires exactly once, then the account refresh runs -
    /// regardless of outcome - so cached balances stay consistent.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<FlowCommand>,
        events: mpsc::Sender<FlowEvent>,
    ) {
        info!(
            flow_id = %self.flow_id,
            tx_type = %self.tx_type,
            initiator = %self.initiator.id,
            "Flow opened"
        );

        loop {
            let wakeup = {
                // Split borrows: the select only touches the timers and
                // the command channel, handlers below get `self` back
                let hold_active = self.hold.is_active();
                let lockout_armed = self.lockout_close.is_some();
                let hold = &mut self.hold;
                let lockout_close = &mut self.lockout_close;

                tokio::select! {
                    biased;

                    // Lockout forced close: a timed terminal edge,
                    // cancelled with everything else on early close
                    _ = async { lockout_close.as_mut().unwrap().await },
                        if lockout_armed => Wakeup::LockoutElapsed,

                    signal = hold.signal(), if hold_active => Wakeup::Hold(signal),

                    cmd = commands.recv() => Wakeup::Command(cmd),
                }
            };

            match wakeup {
                Wakeup::LockoutElapsed => {
                    info!(flow_id = %self.flow_id, "Lockout delay elapsed, force-closing");
                    break;
                }
                Wakeup::Hold(HoldSignal::Progress(pct)) => {
                    let _ = events.send(FlowEvent::HoldProgress(pct)).await;
                }
                Wakeup::Hold(HoldSignal::Complete) => {
                    if self.submit(&events).await.is_break() {
                        break;
                    }
                }
                Wakeup::Command(None) => {
                    // Caller dropped the handle: implicit dismissal
                    debug!(flow_id = %self.flow_id, "Command channel closed");
                    break;
                }
                Wakeup::Command(Some(cmd)) => {
                    if self.handle(cmd, &events).await.is_break() {
                        break;
                    }
                }
            }
        }

        // Teardown: no timer survives the flow
        self.hold.cancel();
        self.lockout_close = None;

        let _ = events.send(FlowEvent::Closed).await;
        info!(flow_id = %self.flow_id, step = %self.step, "Flow closed");

        if let Err(err) = self.backend.refresh_account().await {
            warn!(flow_id = %self.flow_id, error = %err, "Post-close account refresh failed");
        }
    }

    async fn handle(
        &mut self,
        cmd: FlowCommand,
        events: &mpsc::Sender<FlowEvent>,
    ) -> ControlFlow<()> {
        match cmd {
            FlowCommand::SubmitDetails {
                recipient,
                amount,
                note,
                operator,
            } => {
                if self.step == FlowStep::Details {
                    self.submit_details(recipient, amount, note, operator, events)
                        .await;
                }
            }
            FlowCommand::Press(key) => {
                if self.step == FlowStep::Pin {
                    self.pin.press(key);
                }
            }
            FlowCommand::ClearPin => {
                if self.step == FlowStep::Pin {
                    self.pin.clear();
                }
            }
            FlowCommand::HoldStart => {
                // Armed only with 4 digits present and the guard open
                if self.step == FlowStep::Pin && self.pin.is_ready() {
                    self.hold.press();
                }
            }
            FlowCommand::HoldRelease => {
                self.hold.release();
            }
            FlowCommand::Acknowledge => {
                if self.step.is_terminal() {
                    return ControlFlow::Break(());
                }
            }
            FlowCommand::Retry => {
                if self.step.is_terminal() {
                    let _ = events.send(FlowEvent::RestartRequested).await;
                    return ControlFlow::Break(());
                }
            }
            FlowCommand::Dismiss => {
                debug!(flow_id = %self.flow_id, step = %self.step, "Dismissed");
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }

    /// Details step: recipient resolution is awaited to completion
    /// before amount validation begins; the two never run concurrently.
    async fn submit_details(
        &mut self,
        recipient_input: String,
        amount_input: String,
        note: Option<String>,
        operator: Option<String>,
        events: &mpsc::Sender<FlowEvent>,
    ) {
        // QR-prefilled flows may leave the recipient field untouched
        let recipient_input = if recipient_input.trim().is_empty() {
            self.recipient_identifier.clone()
        } else {
            recipient_input
        };

        let result = self
            .validate_details(&recipient_input, &amount_input, operator.as_deref())
            .await;

        match result {
            Ok((recipient, amount)) => {
                let _ = events
                    .send(FlowEvent::RecipientResolved(recipient.clone()))
                    .await;
                self.recipient = Some(recipient);
                self.recipient_identifier = recipient_input;
                self.amount = Some(amount);
                self.note = note.filter(|n| !n.trim().is_empty());
                self.advance(FlowStep::Pin, events).await;
            }
            Err(err) => {
                debug!(flow_id = %self.flow_id, error = %err, "Details rejected");
                let _ = events.send(FlowEvent::DetailsRejected(err)).await;
            }
        }
    }

    async fn validate_details(
        &self,
        recipient_input: &str,
        amount_input: &str,
        operator: Option<&str>,
    ) -> Result<(RecipientSummary, Decimal), FlowError> {
        if recipient_input.trim().is_empty() {
            return Err(FlowError::RecipientNotFound(recipient_input.to_string()));
        }

        let resolver = RecipientResolver::new(self.backend.as_ref());
        let recipient = resolver
            .resolve(
                recipient_input,
                operator.unwrap_or(DEFAULT_OPERATOR),
                self.tx_type,
                &self.initiator,
            )
            .await?;

        let amount = amount::validate(amount_input, self.tx_type, self.initiator.balance)?;

        Ok((recipient, amount))
    }

    /// One submission call, fired by a completed hold gesture.
    ///
    /// Returns `Break` when the flow must close (nothing does today;
    /// lockout closes via the delayed edge).
    async fn submit(&mut self, events: &mpsc::Sender<FlowEvent>) -> ControlFlow<()> {
        let Some(pin) = self.pin.begin_submit() else {
            // Guard not ready (locked or already submitting): the
            // completed gesture is stale, drop it
            self.hold.cancel();
            return ControlFlow::Continue(());
        };
        self.hold.cancel();

        let (recipient, amount) = match (&self.recipient, self.amount) {
            (Some(r), Some(a)) => (r, a),
            // Unreachable through the wizard; guard anyway
            _ => return ControlFlow::Continue(()),
        };

        let request = TransactionRequest {
            tx_type: self.tx_type,
            initiator_id: self.initiator.id.clone(),
            recipient_identifier: recipient.mobile.clone(),
            amount,
            note: self.note.clone(),
            pin,
        };

        info!(flow_id = %self.flow_id, request = %request, "Submitting transaction");
        let result = self.backend.submit_transaction(&request).await;

        match classify(result) {
            SubmitDisposition::Terminal(outcome) => {
                self.pin.end_submit();
                let display_amount = format_amount(amount);
                info!(
                    flow_id = %self.flow_id,
                    successful = outcome.is_successful(),
                    pending = outcome.is_pending(),
                    "Submission resolved"
                );
                self.outcome = Some(outcome.clone());
                let _ = events
                    .send(FlowEvent::OutcomeReady {
                        outcome,
                        display_amount,
                    })
                    .await;
                self.advance(FlowStep::Status, events).await;
            }
            SubmitDisposition::RetryPin => match self.pin.record_rejection() {
                PinRejection::Retry { attempts_left } => {
                    debug!(flow_id = %self.flow_id, attempts_left, "PIN rejected");
                    let _ = events.send(FlowEvent::PinRejected { attempts_left }).await;
                }
                PinRejection::LockedOut => {
                    warn!(flow_id = %self.flow_id, "PIN attempt limit reached, locking");
                    let _ = events.send(FlowEvent::PinLockedOut).await;
                    self.lockout_close = Some(Box::pin(sleep(Duration::from_millis(
                        self.config.lockout_close_ms,
                    ))));
                }
            },
        }

        ControlFlow::Continue(())
    }

    async fn advance(&mut self, next: FlowStep, events: &mpsc::Sender<FlowEvent>) {
        debug_assert!(self.step.can_advance_to(next));
        // Step change tears down any gesture timers
        self.hold.cancel();
        self.step = next;
        let _ = events.send(FlowEvent::StepChanged(next)).await;
    }
}

/// Fallback recharge operator when the UI sends none
const DEFAULT_OPERATOR: &str = "Grameenphone";
