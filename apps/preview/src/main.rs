use std::{sync::Arc, time::Duration};

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use client_core::{
    load_settings, AnalyticsEvent, AnalyticsSink, CommentsEmptyStateController,
    DeletePaymentMethodResponse, EnglishStrings, PaymentMethodsController, PaymentMethodsService,
    SessionProvider,
};
use shared::{
    domain::{CardId, CardType, CreditCard, ProjectId, ProjectSummary, UserId},
    error::{ApiError, ErrorCode},
};
use tokio::sync::{broadcast, Mutex};
use tracing::info;

#[derive(Parser, Debug)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Configure the comments empty state for a viewer/project combination
    /// and tap every affordance.
    CommentsEmptyState {
        /// Logged-in viewer id; omit to run logged out.
        #[arg(long)]
        viewer_id: Option<i64>,
        #[arg(long, default_value_t = 400)]
        creator_id: i64,
        /// Whether the viewer backs the project; omitted means unknown.
        #[arg(long)]
        backing: Option<bool>,
    },
    /// Walk the payment methods screen: load, toggle edit, delete a card,
    /// then add a new one.
    PaymentMethods {
        /// Fail every delete to show the alert and re-broadcast path.
        #[arg(long)]
        fail_deletes: bool,
    },
}

struct StaticSession {
    user: Option<UserId>,
}

impl SessionProvider for StaticSession {
    fn current_user(&self) -> Option<UserId> {
        self.user
    }
}

struct LoggingAnalytics;

impl AnalyticsSink for LoggingAnalytics {
    fn notify(&self, event: AnalyticsEvent) {
        info!(event = event.name(), "analytics");
    }
}

struct InMemoryPaymentMethodsService {
    cards: Mutex<Vec<CreditCard>>,
    fail_deletes: bool,
}

#[async_trait]
impl PaymentMethodsService for InMemoryPaymentMethodsService {
    async fn fetch_payment_methods(&self) -> Result<Vec<CreditCard>> {
        Ok(self.cards.lock().await.clone())
    }

    async fn delete_payment_method(
        &self,
        card_id: &CardId,
    ) -> Result<DeletePaymentMethodResponse> {
        if self.fail_deletes {
            return Err(ApiError::new(
                ErrorCode::Internal,
                "Could not delete the payment method",
            )
            .into());
        }
        let mut cards = self.cards.lock().await;
        let before = cards.len();
        cards.retain(|card| &card.id != card_id);
        if cards.len() == before {
            return Err(
                ApiError::new(ErrorCode::NotFound, format!("no stored card {}", card_id.0)).into(),
            );
        }
        Ok(DeletePaymentMethodResponse {
            total_count: cards.len(),
        })
    }
}

fn seed_card(id: &str, card_type: CardType, last_four: &str) -> CreditCard {
    CreditCard {
        id: CardId(id.to_string()),
        card_type,
        last_four: last_four.to_string(),
        expiration_date: NaiveDate::from_ymd_opt(2027, 3, 1).expect("valid seed date"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let cli = Cli::parse();

    match cli.command {
        Command::CommentsEmptyState {
            viewer_id,
            creator_id,
            backing,
        } => run_comments_empty_state(viewer_id, creator_id, backing),
        Command::PaymentMethods { fail_deletes } => run_payment_methods(fail_deletes).await,
    }
}

fn run_comments_empty_state(
    viewer_id: Option<i64>,
    creator_id: i64,
    backing: Option<bool>,
) -> Result<()> {
    let session = Arc::new(StaticSession {
        user: viewer_id.map(UserId),
    });
    let controller = CommentsEmptyStateController::new(session, Arc::new(EnglishStrings));
    let mut rx = controller.subscribe_outputs();

    controller.configure(
        ProjectSummary {
            project_id: ProjectId(1),
            creator_id: UserId(creator_id),
            is_backing: backing,
        },
        None,
    );
    controller.back_project_tapped();
    controller.leave_a_comment_tapped();
    controller.login_tapped();

    while let Ok(output) = rx.try_recv() {
        println!("{output:?}");
    }
    Ok(())
}

async fn run_payment_methods(fail_deletes: bool) -> Result<()> {
    let service = Arc::new(InMemoryPaymentMethodsService {
        cards: Mutex::new(vec![
            seed_card("10", CardType::Visa, "4242"),
            seed_card("11", CardType::Mastercard, "5100"),
        ]),
        fail_deletes,
    });
    let controller = PaymentMethodsController::new_with_settings(
        service.clone(),
        Arc::new(LoggingAnalytics),
        Arc::new(EnglishStrings),
        load_settings(),
    );
    let mut rx = controller.subscribe_outputs();

    controller.screen_appeared();
    controller.screen_loaded();
    drain(&mut rx).await;

    controller.edit_button_tapped();
    controller.delete_card(seed_card("11", CardType::Mastercard, "5100"));
    drain(&mut rx).await;

    controller.add_new_card_tapped();
    service
        .cards
        .lock()
        .await
        .push(seed_card("12", CardType::Amex, "0005"));
    controller.add_new_card_succeeded("You've added a new payment method.");
    drain(&mut rx).await;

    Ok(())
}

// Prints emissions until the stream goes quiet; in-flight fetches and
// deletes finish within the window.
async fn drain(rx: &mut broadcast::Receiver<client_core::PaymentMethodsOutput>) {
    while let Ok(Ok(output)) = tokio::time::timeout(Duration::from_millis(250), rx.recv()).await {
        println!("{output:?}");
    }
}
