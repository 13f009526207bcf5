//! Google Chat card payload.
//!
//! The JSON shape follows the legacy `cards` message format accepted by
//! incoming webhooks: a header, key/value widget sections and a button
//! linking back to the Zabbix event page. When `thread` is set the message
//! is posted as a reply in that thread.

use serde::{Deserialize, Serialize};

use crate::alert::{AckEvent, AlertRecord, TriggerEvent};
use crate::config::CardImages;

pub const BUTTON_TEXT: &str = "See the event on ZABBIX";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCard {
    pub cards: Vec<Card>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<ThreadRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadRef {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub header: CardHeader,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardHeader {
    pub title: String,
    pub subtitle: String,
    pub image_url: String,
    pub image_style: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub widgets: Vec<Widget>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Widget {
    KeyValue(KeyValue),
    Buttons(Vec<Button>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyValue {
    pub top_label: String,
    pub content: String,
    // the chat API takes the string "true" here
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_multiline: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Button {
    TextButton(TextButton),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextButton {
    pub text: String,
    pub on_click: OnClick,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnClick {
    pub open_link: OpenLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenLink {
    pub url: String,
}

impl KeyValue {
    fn new(top_label: &str, content: impl Into<String>) -> Self {
        Self {
            top_label: top_label.to_string(),
            content: content.into(),
            content_multiline: None,
        }
    }

    fn multiline(top_label: &str, content: impl Into<String>) -> Self {
        Self {
            content_multiline: Some("true".to_string()),
            ..Self::new(top_label, content)
        }
    }
}

impl ChatCard {
    /// Url of the first link button, if any.
    pub fn event_link(&self) -> Option<&str> {
        self.cards
            .iter()
            .flat_map(|card| &card.sections)
            .flat_map(|section| &section.widgets)
            .find_map(|widget| match widget {
                Widget::Buttons(buttons) => buttons.iter().find_map(|b| match b {
                    Button::TextButton(tb) => Some(tb.on_click.open_link.url.as_str()),
                }),
                _ => None,
            })
    }

    /// Content of the key/value row with the given label, if any.
    pub fn row(&self, top_label: &str) -> Option<&str> {
        self.cards
            .iter()
            .flat_map(|card| &card.sections)
            .flat_map(|section| &section.widgets)
            .find_map(|widget| match widget {
                Widget::KeyValue(kv) if kv.top_label == top_label => Some(kv.content.as_str()),
                _ => None,
            })
    }
}

pub fn event_link(zabbix_base_url: &str, trigger_id: &str, event_id: &str) -> String {
    format!(
        "{}/tr_events.php?triggerid={}&eventid={}",
        zabbix_base_url, trigger_id, event_id
    )
}

/// Display text for the event status of an acknowledgement.
pub fn event_status_label(status: &str) -> &str {
    match status {
        "PROBLEM" => "Ativo",
        "RESOLVED" => "Resolvido",
        other => other,
    }
}

/// Renders an alert into a chat card. No I/O.
pub fn build_card(
    record: &AlertRecord,
    zabbix_base_url: &str,
    images: &CardImages,
    thread: Option<&str>,
) -> ChatCard {
    let (header, rows) = match record {
        AlertRecord::Problem(event) => (
            trigger_header(event, "Problem", &images.problem),
            trigger_rows(event),
        ),
        AlertRecord::Resolved(event) => (
            trigger_header(event, "resolved", &images.resolved),
            trigger_rows(event),
        ),
        AlertRecord::Acknowledgement(ack) => (
            CardHeader {
                title: "Recognized".to_string(),
                subtitle: ack.ack_user.clone(),
                image_url: images.acknowledged.clone(),
                image_style: "IMAGE".to_string(),
            },
            ack_rows(ack),
        ),
    };

    let link = event_link(zabbix_base_url, record.trigger_id(), record.event_id());
    let button = Button::TextButton(TextButton {
        text: BUTTON_TEXT.to_string(),
        on_click: OnClick {
            open_link: OpenLink { url: link },
        },
    });

    ChatCard {
        cards: vec![Card {
            header,
            sections: vec![
                Section {
                    widgets: rows.into_iter().map(Widget::KeyValue).collect(),
                },
                Section {
                    widgets: vec![Widget::Buttons(vec![button])],
                },
            ],
        }],
        thread: thread.map(|name| ThreadRef {
            name: name.to_string(),
        }),
    }
}

fn trigger_header(event: &TriggerEvent, subtitle: &str, image_url: &str) -> CardHeader {
    CardHeader {
        title: format!("Severity: {}", event.severity),
        subtitle: subtitle.to_string(),
        image_url: image_url.to_string(),
        image_style: "IMAGE".to_string(),
    }
}

fn trigger_rows(event: &TriggerEvent) -> Vec<KeyValue> {
    vec![
        KeyValue::multiline("Alarm", event.trigger_name.as_str()),
        KeyValue::multiline(
            "Host",
            format!("{} {}", event.host_name, event.host_description),
        ),
        KeyValue::new("Date/Time", format!("{} - {}", event.date, event.time)),
        KeyValue::new("Event ID", event.event_id.as_str()),
    ]
}

fn ack_rows(ack: &AckEvent) -> Vec<KeyValue> {
    vec![
        KeyValue::multiline("Message", ack.ack_message.as_str()),
        KeyValue::new("Current Alarm Status", event_status_label(&ack.event_status)),
        KeyValue::new("Date/Time", format!("{} - {}", ack.date, ack.time)),
        KeyValue::new("Event ID", ack.event_id.as_str()),
    ]
}
