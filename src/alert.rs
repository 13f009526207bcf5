use std::fmt;

use crate::error::ForwardError;

pub const FIELD_DELIMITER: char = '#';

/// Status code sent by Zabbix as the first field of the alert message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Problem,
    Resolved,
    Acknowledgement,
}

impl AlertKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "0" => Some(AlertKind::Problem),
            "1" => Some(AlertKind::Resolved),
            "2" => Some(AlertKind::Acknowledgement),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AlertKind::Problem => "0",
            AlertKind::Resolved => "1",
            AlertKind::Acknowledgement => "2",
        }
    }

    /// Number of delimited fields, status code included.
    pub fn field_count(&self) -> usize {
        match self {
            AlertKind::Problem | AlertKind::Resolved => 10,
            AlertKind::Acknowledgement => 8,
        }
    }
}

/// Problem or recovery of a trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerEvent {
    pub time: String,
    pub date: String,
    pub trigger_name: String,
    pub host_name: String,
    pub severity: String,
    pub event_id: String,
    pub trigger_url: String,
    pub trigger_id: String,
    pub host_description: String,
}

/// Acknowledgement of an event by a Zabbix user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckEvent {
    pub time: String,
    pub date: String,
    pub ack_user: String,
    pub ack_message: String,
    pub event_status: String,
    pub event_id: String,
    pub trigger_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertRecord {
    Problem(TriggerEvent),
    Resolved(TriggerEvent),
    Acknowledgement(AckEvent),
}

impl AlertRecord {
    /// Parses a `#`-delimited alert message.
    ///
    /// Layout for problem (`0`) and resolved (`1`) messages:
    /// `status#time#date#trigger_name#host_name#severity#event_id#trigger_url#trigger_id#host_description`
    ///
    /// Layout for acknowledgements (`2`):
    /// `status#time#date#ack_user#ack_message#event_status#event_id#trigger_id`
    pub fn parse(raw: &str) -> Result<Self, ForwardError> {
        let fields: Vec<&str> = raw.trim_end().split(FIELD_DELIMITER).collect();

        let kind = AlertKind::from_code(fields[0]).ok_or_else(|| {
            ForwardError::MalformedAlert(format!("unknown status code '{}'", fields[0]))
        })?;

        if fields.len() < kind.field_count() {
            return Err(ForwardError::MalformedAlert(format!(
                "{:?} alert needs {} fields, got {}",
                kind,
                kind.field_count(),
                fields.len()
            )));
        }

        let record = match kind {
            AlertKind::Problem | AlertKind::Resolved => {
                let event = TriggerEvent {
                    time: fields[1].to_string(),
                    date: fields[2].to_string(),
                    trigger_name: fields[3].to_string(),
                    host_name: fields[4].to_string(),
                    severity: fields[5].to_string(),
                    event_id: parse_id("event id", fields[6])?,
                    trigger_url: fields[7].to_string(),
                    trigger_id: parse_id("trigger id", fields[8])?,
                    host_description: fields[9].to_string(),
                };
                if kind == AlertKind::Problem {
                    AlertRecord::Problem(event)
                } else {
                    AlertRecord::Resolved(event)
                }
            }
            AlertKind::Acknowledgement => AlertRecord::Acknowledgement(AckEvent {
                time: fields[1].to_string(),
                date: fields[2].to_string(),
                ack_user: fields[3].to_string(),
                ack_message: fields[4].to_string(),
                event_status: fields[5].to_string(),
                event_id: parse_id("event id", fields[6])?,
                trigger_id: parse_id("trigger id", fields[7])?,
            }),
        };

        Ok(record)
    }

    pub fn kind(&self) -> AlertKind {
        match self {
            AlertRecord::Problem(_) => AlertKind::Problem,
            AlertRecord::Resolved(_) => AlertKind::Resolved,
            AlertRecord::Acknowledgement(_) => AlertKind::Acknowledgement,
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            AlertRecord::Problem(e) | AlertRecord::Resolved(e) => &e.event_id,
            AlertRecord::Acknowledgement(a) => &a.event_id,
        }
    }

    /// Trigger id as sent by Zabbix; the thread mapping is keyed by this text.
    pub fn trigger_id(&self) -> &str {
        match self {
            AlertRecord::Problem(e) | AlertRecord::Resolved(e) => &e.trigger_id,
            AlertRecord::Acknowledgement(a) => &a.trigger_id,
        }
    }
}

// ids must be numeric but are kept verbatim, leading zeros included
fn parse_id(name: &str, value: &str) -> Result<String, ForwardError> {
    let id = value.trim();
    if id.is_empty() || !id.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ForwardError::MalformedAlert(format!(
            "{} '{}' is not a number",
            name, value
        )));
    }
    Ok(id.to_string())
}

impl fmt::Display for AlertRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = FIELD_DELIMITER;
        match self {
            AlertRecord::Problem(e) | AlertRecord::Resolved(e) => write!(
                f,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                self.kind().code(),
                e.time,
                e.date,
                e.trigger_name,
                e.host_name,
                e.severity,
                e.event_id,
                e.trigger_url,
                e.trigger_id,
                e.host_description,
            ),
            AlertRecord::Acknowledgement(a) => write!(
                f,
                "{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}{d}{}",
                self.kind().code(),
                a.time,
                a.date,
                a.ack_user,
                a.ack_message,
                a.event_status,
                a.event_id,
                a.trigger_id,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;

    const PROBLEM: &str =
        "0#14:32#05-06-2024#CPU high#host1#High#17#https://zbx.example.com#42#Production";
    const ACK: &str = "2#14:40#05-06-2024#jdoe#looking into it#PROBLEM#17#42";

    #[test]
    fn test_parse_problem() -> Result<()> {
        let record = AlertRecord::parse(PROBLEM)?;

        let expected = TriggerEvent {
            time: "14:32".to_string(),
            date: "05-06-2024".to_string(),
            trigger_name: "CPU high".to_string(),
            host_name: "host1".to_string(),
            severity: "High".to_string(),
            event_id: "17".to_string(),
            trigger_url: "https://zbx.example.com".to_string(),
            trigger_id: "42".to_string(),
            host_description: "Production".to_string(),
        };
        assert_eq!(record, AlertRecord::Problem(expected));
        assert_eq!(record.to_string(), PROBLEM);

        Ok(())
    }

    #[test]
    fn test_parse_resolved_uses_same_layout() -> Result<()> {
        let raw = PROBLEM.replacen('0', "1", 1);
        let record = AlertRecord::parse(&raw)?;

        assert_eq!(record.kind(), AlertKind::Resolved);
        assert_eq!(record.event_id(), "17");
        assert_eq!(record.trigger_id(), "42");
        assert_eq!(AlertRecord::parse(&record.to_string())?, record);

        Ok(())
    }

    #[test]
    fn test_parse_acknowledgement() -> Result<()> {
        let record = AlertRecord::parse(ACK)?;

        match &record {
            AlertRecord::Acknowledgement(ack) => {
                assert_eq!(ack.ack_user, "jdoe");
                assert_eq!(ack.ack_message, "looking into it");
                assert_eq!(ack.event_status, "PROBLEM");
                assert_eq!(ack.event_id, "17");
                assert_eq!(ack.trigger_id, "42");
            }
            other => panic!("expected acknowledgement, got {:?}", other),
        }
        assert_eq!(record.to_string(), ACK);

        Ok(())
    }

    #[test]
    fn test_trailing_newline_is_ignored() -> Result<()> {
        let record = AlertRecord::parse(&format!("{}\n", ACK))?;
        assert_eq!(record.trigger_id(), "42");
        Ok(())
    }

    #[test]
    fn test_unknown_status_code() {
        let err = AlertRecord::parse("9#14:32#05-06-2024").unwrap_err();
        assert!(matches!(err, ForwardError::MalformedAlert(_)));

        let err = AlertRecord::parse("").unwrap_err();
        assert!(matches!(err, ForwardError::MalformedAlert(_)));
    }

    #[test]
    fn test_missing_fields() {
        // a problem layout needs 10 fields, an ack layout only 8
        let err = AlertRecord::parse("0#14:40#05-06-2024#jdoe#msg#PROBLEM#17#42").unwrap_err();
        assert!(matches!(err, ForwardError::MalformedAlert(_)));

        let err = AlertRecord::parse("2#14:40#05-06-2024#jdoe#msg#PROBLEM#17").unwrap_err();
        assert!(matches!(err, ForwardError::MalformedAlert(_)));
    }

    #[test]
    fn test_trigger_id_kept_verbatim() -> Result<()> {
        let record = AlertRecord::parse("2#14:40#05-06-2024#jdoe#msg#PROBLEM#017#042")?;

        assert_eq!(record.trigger_id(), "042");
        assert_eq!(record.event_id(), "017");
        assert_eq!(record.to_string(), "2#14:40#05-06-2024#jdoe#msg#PROBLEM#017#042");

        Ok(())
    }

    #[test]
    fn test_non_numeric_ids() {
        let err = AlertRecord::parse("2#14:40#05-06-2024#jdoe#msg#PROBLEM#{EVENT.ID}#42")
            .unwrap_err();
        assert!(err.to_string().contains("event id"));

        let err = AlertRecord::parse("2#14:40#05-06-2024#jdoe#msg#PROBLEM#17#").unwrap_err();
        assert!(err.to_string().contains("trigger id"));
    }
}
