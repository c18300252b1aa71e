use std::sync::Arc;

use anyhow::Result;
use shared::domain::{CardId, CreditCard};
use tokio::{
    sync::{broadcast, mpsc},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    outputs::OutputHub,
    strings::{LocalizedKey, StringsProvider},
    AnalyticsEvent, AnalyticsSink, DeletePaymentMethodResponse, PaymentMethodsService,
};

const OUTPUT_BUFFER: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentMethodsOutput {
    PaymentMethods(Vec<CreditCard>),
    EditButtonIsEnabled(bool),
    ErrorLoadingPaymentMethods(String),
    GoToAddCardScreen,
    PresentBanner(String),
    ReloadData,
    ShowAlert(String),
    IsEditing(bool),
}

#[derive(Debug)]
enum PaymentMethodsEvent {
    ScreenLoaded,
    ScreenAppeared,
    EditButtonTapped,
    AddNewCardTapped,
    AddNewCardSucceeded { message: String },
    AddNewCardDismissed,
    DeleteCard { card: CreditCard },
    CardsFetched { result: Result<Vec<CreditCard>> },
    CardDeleted { result: Result<DeletePaymentMethodResponse> },
}

#[derive(Debug)]
enum Effect {
    Fetch,
    Delete(CardId),
    Track(AnalyticsEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Loaded,
}

#[derive(Debug, Default)]
struct Step {
    outputs: Vec<PaymentMethodsOutput>,
    effects: Vec<Effect>,
}

/// All controller state. Touched only by the dispatch loop, one event at a
/// time; `cards` stays `None` until the first successful fetch so a delete
/// failure before that has no snapshot to re-broadcast.
#[derive(Debug, Default)]
struct PaymentMethodsState {
    cards: Option<Vec<CreditCard>>,
    is_editing: bool,
    phase: LoadPhase,
}

impl PaymentMethodsState {
    fn apply(&mut self, event: PaymentMethodsEvent, strings: &dyn StringsProvider) -> Step {
        let mut step = Step::default();
        match event {
            PaymentMethodsEvent::ScreenLoaded => {
                self.phase = LoadPhase::Loading;
                step.outputs.push(PaymentMethodsOutput::ReloadData);
                step.outputs
                    .push(PaymentMethodsOutput::EditButtonIsEnabled(false));
                step.effects.push(Effect::Fetch);
            }
            PaymentMethodsEvent::ScreenAppeared => {
                step.effects
                    .push(Effect::Track(AnalyticsEvent::ViewedPaymentMethods));
            }
            PaymentMethodsEvent::EditButtonTapped => {
                self.is_editing = !self.is_editing;
                step.outputs
                    .push(PaymentMethodsOutput::IsEditing(self.is_editing));
            }
            PaymentMethodsEvent::AddNewCardTapped => {
                self.is_editing = false;
                step.outputs.push(PaymentMethodsOutput::IsEditing(false));
                step.outputs.push(PaymentMethodsOutput::GoToAddCardScreen);
            }
            PaymentMethodsEvent::AddNewCardSucceeded { message } => {
                self.is_editing = false;
                self.phase = LoadPhase::Loading;
                step.outputs.push(PaymentMethodsOutput::IsEditing(false));
                if !message.is_empty() {
                    step.outputs.push(PaymentMethodsOutput::PresentBanner(message));
                }
                step.effects.push(Effect::Fetch);
            }
            PaymentMethodsEvent::AddNewCardDismissed => {
                self.phase = LoadPhase::Loading;
                step.effects.push(Effect::Fetch);
            }
            PaymentMethodsEvent::DeleteCard { card } => {
                step.effects.push(Effect::Delete(card.id));
            }
            PaymentMethodsEvent::CardsFetched { result } => {
                self.phase = LoadPhase::Loaded;
                match result {
                    Ok(cards) => {
                        let has_cards = !cards.is_empty();
                        step.outputs
                            .push(PaymentMethodsOutput::PaymentMethods(cards.clone()));
                        step.outputs
                            .push(PaymentMethodsOutput::EditButtonIsEnabled(has_cards));
                        self.cards = Some(cards);
                    }
                    // The latched snapshot stays on screen; the error is a
                    // one-shot notification.
                    Err(err) => {
                        step.outputs.push(
                            PaymentMethodsOutput::ErrorLoadingPaymentMethods(err.to_string()),
                        );
                    }
                }
            }
            PaymentMethodsEvent::CardDeleted { result } => match result {
                Ok(response) => {
                    step.outputs.push(PaymentMethodsOutput::EditButtonIsEnabled(
                        response.total_count > 0,
                    ));
                    step.effects
                        .push(Effect::Track(AnalyticsEvent::DeletedPaymentMethod));
                }
                Err(_) => {
                    step.outputs.push(PaymentMethodsOutput::ShowAlert(
                        strings.localized(LocalizedKey::UnableToRemovePaymentMethod),
                    ));
                    // Re-broadcast the last good snapshot instead of
                    // refetching, so the list never blanks out mid-edit.
                    if let Some(cards) = &self.cards {
                        step.outputs
                            .push(PaymentMethodsOutput::PaymentMethods(cards.clone()));
                    }
                    step.effects
                        .push(Effect::Track(AnalyticsEvent::ErroredDeletePaymentMethod));
                }
            },
        }
        step
    }
}

pub struct PaymentMethodsController {
    events: mpsc::UnboundedSender<PaymentMethodsEvent>,
    outputs: OutputHub<PaymentMethodsOutput>,
    worker: JoinHandle<()>,
}

impl PaymentMethodsController {
    pub fn new(
        service: Arc<dyn PaymentMethodsService>,
        analytics: Arc<dyn AnalyticsSink>,
        strings: Arc<dyn StringsProvider>,
    ) -> Self {
        Self::new_with_settings(service, analytics, strings, Settings::default())
    }

    pub fn new_with_settings(
        service: Arc<dyn PaymentMethodsService>,
        analytics: Arc<dyn AnalyticsSink>,
        strings: Arc<dyn StringsProvider>,
        settings: Settings,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let outputs = OutputHub::new(OUTPUT_BUFFER);
        let worker = PaymentMethodsWorker {
            state: PaymentMethodsState::default(),
            service,
            analytics,
            strings,
            settings,
            events: events_tx.clone(),
            outputs: outputs.clone(),
        };
        let worker = tokio::spawn(worker.run(events_rx));
        Self {
            events: events_tx,
            outputs,
            worker,
        }
    }

    pub fn subscribe_outputs(&self) -> broadcast::Receiver<PaymentMethodsOutput> {
        self.outputs.subscribe()
    }

    pub fn screen_loaded(&self) {
        self.dispatch(PaymentMethodsEvent::ScreenLoaded);
    }

    pub fn screen_appeared(&self) {
        self.dispatch(PaymentMethodsEvent::ScreenAppeared);
    }

    pub fn edit_button_tapped(&self) {
        self.dispatch(PaymentMethodsEvent::EditButtonTapped);
    }

    pub fn add_new_card_tapped(&self) {
        self.dispatch(PaymentMethodsEvent::AddNewCardTapped);
    }

    pub fn add_new_card_succeeded(&self, message: impl Into<String>) {
        self.dispatch(PaymentMethodsEvent::AddNewCardSucceeded {
            message: message.into(),
        });
    }

    pub fn add_new_card_dismissed(&self) {
        self.dispatch(PaymentMethodsEvent::AddNewCardDismissed);
    }

    pub fn delete_card(&self, card: CreditCard) {
        self.dispatch(PaymentMethodsEvent::DeleteCard { card });
    }

    fn dispatch(&self, event: PaymentMethodsEvent) {
        if self.events.send(event).is_err() {
            warn!("payment methods dispatch loop is gone; dropping event");
        }
    }
}

impl Drop for PaymentMethodsController {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

struct PaymentMethodsWorker {
    state: PaymentMethodsState,
    service: Arc<dyn PaymentMethodsService>,
    analytics: Arc<dyn AnalyticsSink>,
    strings: Arc<dyn StringsProvider>,
    settings: Settings,
    events: mpsc::UnboundedSender<PaymentMethodsEvent>,
    outputs: OutputHub<PaymentMethodsOutput>,
}

impl PaymentMethodsWorker {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<PaymentMethodsEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(event);
        }
        debug!("payment methods dispatch loop stopped");
    }

    fn handle(&mut self, event: PaymentMethodsEvent) {
        let phase_before = self.state.phase;
        let step = self.state.apply(event, self.strings.as_ref());
        if self.state.phase != phase_before {
            debug!(from = ?phase_before, to = ?self.state.phase, "load phase changed");
        }
        for output in step.outputs {
            self.outputs.emit(output);
        }
        for effect in step.effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&self, effect: Effect) {
        match effect {
            Effect::Fetch => self.start_fetch(),
            Effect::Delete(card_id) => self.start_delete(card_id),
            Effect::Track(event) => self.analytics.notify(event),
        }
    }

    // Fetches run to completion even when overlapping; completions are
    // marshaled back onto the event queue.
    fn start_fetch(&self) {
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        let api_delay = self.settings.api_delay;
        tokio::spawn(async move {
            if !api_delay.is_zero() {
                tokio::time::sleep(api_delay).await;
            }
            let result = service.fetch_payment_methods().await;
            if let Err(err) = &result {
                warn!(error = %err, "payment methods fetch failed");
            }
            let _ = events.send(PaymentMethodsEvent::CardsFetched { result });
        });
    }

    fn start_delete(&self, card_id: CardId) {
        let service = Arc::clone(&self.service);
        let events = self.events.clone();
        let api_delay = self.settings.api_delay;
        tokio::spawn(async move {
            if !api_delay.is_zero() {
                tokio::time::sleep(api_delay).await;
            }
            let result = service.delete_payment_method(&card_id).await;
            match &result {
                Ok(response) => info!(
                    card_id = %card_id.0,
                    total_count = response.total_count,
                    "payment method deleted"
                ),
                Err(err) => warn!(card_id = %card_id.0, error = %err, "payment method delete failed"),
            }
            let _ = events.send(PaymentMethodsEvent::CardDeleted { result });
        });
    }
}

#[cfg(test)]
#[path = "tests/payment_methods_tests.rs"]
mod tests;
