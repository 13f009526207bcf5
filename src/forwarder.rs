use chrono::{Local, NaiveDate};
use log::{debug, error, info};

use crate::alert::AlertRecord;
use crate::card::{build_card, ChatCard};
use crate::chat::ChatClient;
use crate::config::AppConfig;
use crate::error::ForwardError;
use crate::thread_store::{day_key, ThreadStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardOutcome {
    pub trigger_id: String,
    pub thread: String,
    /// Whether the message went into a thread that was already known.
    pub replied: bool,
    /// Whether a new trigger -> thread entry was persisted.
    pub recorded: bool,
}

/// Sends one Zabbix alert to a chat webhook, keeping follow-ups in the
/// thread of the first message for the same trigger.
pub struct AlertForwarder {
    config: AppConfig,
    store: ThreadStore,
    client: ChatClient,
}

impl AlertForwarder {
    pub fn new(config: AppConfig) -> Result<Self, ForwardError> {
        let store = ThreadStore::new(&config.zabbix.datafile);
        let client = ChatClient::new(&config.http)?;

        Ok(AlertForwarder {
            config,
            store,
            client,
        })
    }

    pub fn store(&self) -> &ThreadStore {
        &self.store
    }

    pub async fn forward(&self, webhook: &str, raw: &str) -> Result<ForwardOutcome, ForwardError> {
        self.forward_on(webhook, raw, Local::now().date_naive()).await
    }

    pub async fn forward_on(
        &self,
        webhook: &str,
        raw: &str,
        today: NaiveDate,
    ) -> Result<ForwardOutcome, ForwardError> {
        let webhook_url = self.config.webhook_url(webhook)?;
        let today = day_key(today);
        // the day reset is only persisted together with the new thread, after the send
        let mapping = self.store.load_for_day(&today);
        let record = AlertRecord::parse(raw)?;

        let trigger_id = record.trigger_id();
        let existing = mapping.thread_for(trigger_id);
        debug!("Trigger {} thread: {:?}", trigger_id, existing);

        let card = build_card(
            &record,
            self.config.zabbix_base_url(),
            &self.config.images,
            existing,
        );
        let thread = self.client.send(webhook_url, &card).await?;

        let recorded = match self.store.record_thread(trigger_id, &thread, &today) {
            Ok(recorded) => recorded,
            Err(e) => {
                // the message is already posted; failing now would only make Zabbix resend it
                error!("Failed to record thread for trigger {}: {}", trigger_id, e);
                false
            }
        };

        info!(
            "{:?} for trigger {} (event {}) sent to '{}'",
            record.kind(),
            trigger_id,
            record.event_id(),
            webhook
        );

        Ok(ForwardOutcome {
            trigger_id: trigger_id.to_string(),
            thread,
            replied: existing.is_some(),
            recorded,
        })
    }

    /// Builds the card that `forward_on` would send, without network or file writes.
    pub fn render(&self, raw: &str, today: NaiveDate) -> Result<ChatCard, ForwardError> {
        let mapping = self.store.load_for_day(&day_key(today));
        let record = AlertRecord::parse(raw)?;

        Ok(build_card(
            &record,
            self.config.zabbix_base_url(),
            &self.config.images,
            mapping.thread_for(record.trigger_id()),
        ))
    }
}
