use tracing::warn;

use crate::header::SystemHeader;
use crate::jms::{DeliveryMode, JmsError, JmsMessage};

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

fn epoch_millis(header: SystemHeader, m: &dyn JmsMessage) -> Result<Option<i64>, JmsError> {
    let millis = match header {
        SystemHeader::DeliveryTime => Some(m.delivery_time()?),
        SystemHeader::Expiration => Some(m.expiration()?),
        SystemHeader::Timestamp => Some(m.timestamp()?),
        _ => None,
    };
    Ok(millis)
}

fn literal(header: SystemHeader, m: &dyn JmsMessage) -> Result<Option<String>, JmsError> {
    // Selectors compare timestamps as epoch millis
    if header.is_timestamp() {
        return Ok(epoch_millis(header, m)?.map(|v| v.to_string()));
    }
    let lit = match header {
        SystemHeader::CorrelationId => m.correlation_id()?.map(|s| quote(&s)),
        SystemHeader::MessageId => m.message_id()?.map(|s| quote(&s)),
        SystemHeader::Type => m.jms_type()?.map(|s| quote(&s)),
        SystemHeader::DeliveryMode => match DeliveryMode::from_value(m.delivery_mode()?) {
            DeliveryMode::Unknown(_) => None,
            mode => Some(quote(&mode.name())),
        },
        SystemHeader::Priority => Some(m.priority()?.to_string()),
        SystemHeader::Redelivered => Some(m.redelivered()?.to_string().to_uppercase()),
        _ => None,
    };
    Ok(lit)
}

/// Builds `<header> = <literal>` matching the message's value of `header`.
/// `None` when the header cannot appear in a selector or has no value.
pub fn selector_clause(header: SystemHeader, message: &dyn JmsMessage) -> Option<String> {
    if !header.is_selector() {
        return None;
    }
    match literal(header, message) {
        Ok(lit) => lit.map(|l| format!("{} = {}", header.header_name(), l)),
        Err(e) => {
            warn!(
                "Could not build selector for JMS header '{}': {}",
                header.header_name(),
                e
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::tests::{FakeMessage, sample};

    #[test]
    fn string_headers_are_quoted() {
        let m = FakeMessage {
            correlation_id: Some("it's".into()),
            ..sample()
        };
        assert_eq!(
            selector_clause(SystemHeader::CorrelationId, &m).as_deref(),
            Some("JMSCorrelationID = 'it''s'")
        );
        assert_eq!(
            selector_clause(SystemHeader::MessageId, &m).as_deref(),
            Some("JMSMessageID = 'ID:42'")
        );
    }

    #[test]
    fn numbers_and_timestamps_are_bare() {
        let m = sample();
        assert_eq!(
            selector_clause(SystemHeader::Priority, &m).as_deref(),
            Some("JMSPriority = 4")
        );
        assert_eq!(
            selector_clause(SystemHeader::Timestamp, &m).as_deref(),
            Some("JMSTimestamp = 1704164645678")
        );
        assert_eq!(
            selector_clause(SystemHeader::Redelivered, &m).as_deref(),
            Some("JMSRedelivered = TRUE")
        );
        assert_eq!(
            selector_clause(SystemHeader::DeliveryMode, &m).as_deref(),
            Some("JMSDeliveryMode = 'PERSISTENT'")
        );
    }

    #[test]
    fn timestamp_headers_select_on_epoch_millis() {
        let m = FakeMessage {
            expiration: 1704164705678,
            ..sample()
        };
        for header in SystemHeader::ALL.iter().filter(|h| h.is_timestamp() && h.is_selector()) {
            let clause = selector_clause(*header, &m).unwrap();
            let millis = clause.rsplit(" = ").next().unwrap();
            assert!(millis.parse::<i64>().is_ok(), "{clause}");
        }
        assert_eq!(
            selector_clause(SystemHeader::Expiration, &m).as_deref(),
            Some("JMSExpiration = 1704164705678")
        );
    }

    #[test]
    fn non_selector_headers_give_nothing() {
        let m = sample();
        for header in SystemHeader::ALL.iter().filter(|h| !h.is_selector()) {
            assert_eq!(selector_clause(*header, &m), None);
        }
    }

    #[test]
    fn absent_or_failing_values_give_nothing() {
        assert_eq!(selector_clause(SystemHeader::Type, &FakeMessage::default()), None);
        let m = FakeMessage {
            failure: Some(JmsError::Provider("gone".into())),
            ..sample()
        };
        assert_eq!(selector_clause(SystemHeader::Priority, &m), None);
    }
}
