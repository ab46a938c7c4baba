//! FinPay - Transaction Flow Demo
//!
//! Drives the authorization wizard end to end without a UI. Architecture:
//!
//! ```text
//! ┌──────────┐    ┌─────────────┐    ┌──────────┐    ┌──────────┐
//! │  Config  │───▶│ Transaction │───▶│ Backend  │───▶│  Events  │
//! │  (YAML)  │    │    Flow     │    │ (mock)   │    │ (stdout) │
//! └──────────┘    └─────────────┘    └──────────┘    └──────────┘
//! ```
//!
//! Two scripted scenarios run back to back: a successful send-money
//! flow, then a PIN lockout with its forced close.

#![cfg_attr(not(feature = "mock-backend"), allow(dead_code, unused_imports))]

use std::sync::Arc;

use finpay::core_types::{AccountRole, AccountSummary, TransactionType};
use finpay::flow::coordinator::{FlowCommand, FlowEvent, FlowHandle, FlowParams, TransactionFlow};
use finpay::flow::pin::KeyPress;
use finpay::AppConfig;

#[cfg(feature = "mock-backend")]
use finpay::MockBackend;

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

fn demo_account() -> AccountSummary {
    AccountSummary {
        id: "demo-sender".to_string(),
        mobile: "01700000001".to_string(),
        name: "Demo Sender".to_string(),
        role: AccountRole::Personal,
        balance: "100".parse().unwrap(),
        photo: None,
    }
}

#[cfg(feature = "mock-backend")]
fn demo_backend() -> Arc<MockBackend> {
    Arc::new(
        MockBackend::new(demo_account(), "1234").with_directory_account(AccountSummary {
            id: "demo-recipient".to_string(),
            mobile: "01700000002".to_string(),
            name: "Demo Recipient".to_string(),
            role: AccountRole::Personal,
            balance: "0".parse().unwrap(),
            photo: None,
        }),
    )
}

async fn send(handle: &FlowHandle, cmd: FlowCommand) {
    handle.commands.send(cmd).await.expect("flow task died");
}

async fn enter_pin_and_hold(handle: &FlowHandle, pin: &str) {
    for d in pin.chars() {
        send(handle, FlowCommand::Press(KeyPress::Digit(d))).await;
    }
    send(handle, FlowCommand::HoldStart).await;
}

/// Print events until the flow closes. Progress ticks render as one
/// line each ten percent.
async fn watch(handle: &mut FlowHandle) {
    while let Some(event) = handle.events.recv().await {
        match &event {
            FlowEvent::HoldProgress(pct) if pct % 10 != 0 => {}
            FlowEvent::HoldProgress(pct) => println!("  holding... {}%", pct),
            FlowEvent::Closed => {
                println!("  flow closed");
                return;
            }
            other => println!("  {:?}", other),
        }
    }
}

#[cfg(feature = "mock-backend")]
async fn run_happy_path(config: &AppConfig) {
    println!("=== Scenario 1: send money, correct PIN ===");
    let backend = demo_backend();
    let mut handle = TransactionFlow::spawn(
        backend.clone(),
        config.flow.clone(),
        FlowParams {
            initiator: demo_account(),
            tx_type: TransactionType::SendMoney,
            initial_recipient: None,
        },
    );

    send(
        &handle,
        FlowCommand::SubmitDetails {
            recipient: "01700000002".to_string(),
            amount: "50".to_string(),
            note: Some("demo transfer".to_string()),
            operator: None,
        },
    )
    .await;
    enter_pin_and_hold(&handle, "1234").await;

    // Let the receipt land before acknowledging
    loop {
        let event = handle.events.recv().await.expect("flow task died");
        match &event {
            FlowEvent::HoldProgress(pct) if pct % 10 == 0 => println!("  holding... {}%", pct),
            FlowEvent::HoldProgress(_) => {}
            FlowEvent::OutcomeReady { .. } => {
                println!("  {:?}", event);
                break;
            }
            other => println!("  {:?}", other),
        }
    }
    send(&handle, FlowCommand::Acknowledge).await;
    watch(&mut handle).await;
    println!("  submissions: {}", backend.submit_count());
}

#[cfg(feature = "mock-backend")]
async fn run_lockout(config: &AppConfig) {
    println!("=== Scenario 2: three wrong PINs lock the flow ===");
    let backend = demo_backend();
    let mut handle = TransactionFlow::spawn(
        backend.clone(),
        config.flow.clone(),
        FlowParams {
            initiator: demo_account(),
            tx_type: TransactionType::SendMoney,
            initial_recipient: None,
        },
    );

    send(
        &handle,
        FlowCommand::SubmitDetails {
            recipient: "01700000002".to_string(),
            amount: "25".to_string(),
            note: None,
            operator: None,
        },
    )
    .await;

    for _ in 0..config.flow.pin_attempt_limit {
        enter_pin_and_hold(&handle, "0000").await;
        // Each attempt resolves as a rejection before the next one starts
        loop {
            let event = handle.events.recv().await.expect("flow task died");
            match &event {
                FlowEvent::HoldProgress(_) => {}
                FlowEvent::PinRejected { .. } | FlowEvent::PinLockedOut => {
                    println!("  {:?}", event);
                    break;
                }
                other => println!("  {:?}", other),
            }
        }
    }

    // The lockout closes the flow on its own
    watch(&mut handle).await;
    println!("  submissions: {}", backend.submit_count());
}

#[cfg(feature = "mock-backend")]
#[tokio::main]
async fn main() {
    let env = get_env();
    let app_config = AppConfig::load(&env);
    let _log_guard = finpay::logging::init_logging(&app_config);

    tracing::info!(
        "Starting FinPay flow demo in {} mode (build {})",
        env,
        env!("GIT_HASH")
    );

    run_happy_path(&app_config).await;
    run_lockout(&app_config).await;
}

// The demo drives the scripted backend; production builds embed the
// library, not this binary.
#[cfg(not(feature = "mock-backend"))]
fn main() {
    eprintln!("The demo binary requires the mock-backend feature");
    std::process::exit(1);
}
