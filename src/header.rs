//! JMS "system" headers that the browser can show as columns.
//!
//! The set is closed: eleven standard JMS headers plus the message class. Each
//! header knows its column metadata and how to pull its value off a message.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{trace, warn};

use crate::domain::JmsvError;
use crate::jms::{DeliveryMode, Destination, JmsError, JmsMessage};
use crate::timestamp::format_timestamp;

/// Column metadata of a system header.
#[derive(Debug, PartialEq)]
pub struct HeaderDescriptor {
    pub header_name: &'static str,
    pub display_name: &'static str,
    /// Default column width in pixels.
    pub display_width: u16,
    /// Usable in a JMS selector expression.
    pub selector: bool,
    pub timestamp: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SystemHeader {
    CorrelationId,
    DeliveryMode,
    DeliveryTime,
    Destination,
    Expiration,
    MessageId,
    Priority,
    Redelivered,
    ReplyTo,
    Timestamp,
    Type,
    MessageClass,
}

const fn descriptor(
    header_name: &'static str,
    display_name: &'static str,
    display_width: u16,
    selector: bool,
    timestamp: bool,
) -> HeaderDescriptor {
    HeaderDescriptor {
        header_name,
        display_name,
        display_width,
        selector,
        timestamp,
    }
}

// Same order as SystemHeader::ALL
static DESCRIPTORS: [HeaderDescriptor; 12] = [
    descriptor("JMSCorrelationID", "JMS Correlation ID", 150, true, false),
    descriptor("JMSDeliveryMode", "Delivery Mode", 120, true, false),
    descriptor("JMSDeliveryTime", "Delivery Time", 180, false, true),
    descriptor("JMSDestination", "Destination", 200, false, false),
    descriptor("JMSExpiration", "Expiration", 180, true, true),
    descriptor("JMSMessageID", "ID", 200, true, false),
    descriptor("JMSPriority", "Priority", 60, true, false),
    descriptor("JMSRedelivered", "Redelivered", 60, true, false),
    descriptor("JMSReplyTo", "Reply To", 200, false, false),
    descriptor("JMSTimestamp", "JMS Timestamp", 180, true, true),
    descriptor("JMSType", "JMS Type", 100, true, false),
    descriptor("Message Class", "Type", 60, false, false),
];

static BY_NAME: LazyLock<HashMap<&'static str, SystemHeader>> = LazyLock::new(|| {
    SystemHeader::ALL
        .iter()
        .map(|h| (h.header_name(), *h))
        .collect()
});

/// Extracted header value, typed the way the column sorts it.
#[derive(Debug, Clone, PartialEq)]
pub enum HeaderValue {
    Text(String),
    Integer(i32),
    Flag(bool),
}

impl HeaderValue {
    fn empty() -> Self {
        HeaderValue::Text(String::new())
    }

    fn text(value: Option<String>) -> Self {
        HeaderValue::Text(value.unwrap_or_default())
    }

    fn destination(value: Option<Destination>) -> Self {
        HeaderValue::Text(value.map(|d| d.to_string()).unwrap_or_default())
    }
}

impl fmt::Display for HeaderValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeaderValue::Text(s) => f.write_str(s),
            HeaderValue::Integer(i) => write!(f, "{i}"),
            HeaderValue::Flag(b) => write!(f, "{b}"),
        }
    }
}

impl SystemHeader {
    pub const ALL: [SystemHeader; 12] = [
        SystemHeader::CorrelationId,
        SystemHeader::DeliveryMode,
        SystemHeader::DeliveryTime,
        SystemHeader::Destination,
        SystemHeader::Expiration,
        SystemHeader::MessageId,
        SystemHeader::Priority,
        SystemHeader::Redelivered,
        SystemHeader::ReplyTo,
        SystemHeader::Timestamp,
        SystemHeader::Type,
        SystemHeader::MessageClass,
    ];

    pub fn from_header_name(name: &str) -> Option<SystemHeader> {
        BY_NAME.get(name).copied()
    }

    /// Unknown names are assumed to be user properties, which selectors accept.
    pub fn is_selector_name(name: &str) -> bool {
        Self::from_header_name(name).is_none_or(|h| h.is_selector())
    }

    pub fn is_timestamp_name(name: &str) -> bool {
        Self::from_header_name(name).is_some_and(|h| h.is_timestamp())
    }

    pub fn descriptor(&self) -> &'static HeaderDescriptor {
        &DESCRIPTORS[*self as usize]
    }

    pub fn header_name(&self) -> &'static str {
        self.descriptor().header_name
    }

    pub fn display_name(&self) -> &'static str {
        self.descriptor().display_name
    }

    pub fn display_width(&self) -> u16 {
        self.descriptor().display_width
    }

    pub fn is_selector(&self) -> bool {
        self.descriptor().selector
    }

    pub fn is_timestamp(&self) -> bool {
        self.descriptor().timestamp
    }

    /// Reads this header off `message`. Never fails: errors from the messaging
    /// layer are logged and give an empty value.
    pub fn value(&self, message: &dyn JmsMessage, long: bool) -> HeaderValue {
        match self.read(message, long) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    "Error occurred when reading JMS header '{}': {}",
                    self.header_name(),
                    e
                );
                HeaderValue::empty()
            }
        }
    }

    fn read(&self, m: &dyn JmsMessage, long: bool) -> Result<HeaderValue, JmsError> {
        let value = match self {
            SystemHeader::CorrelationId => HeaderValue::text(m.correlation_id()?),
            SystemHeader::DeliveryMode => {
                let mode = DeliveryMode::from_value(m.delivery_mode()?);
                HeaderValue::Text(format!("{} ({})", mode.name(), mode.value()))
            }
            SystemHeader::DeliveryTime => match m.delivery_time() {
                Ok(millis) => HeaderValue::Text(format_timestamp(millis, long)),
                Err(e) => {
                    trace!("No delivery time: {e}");
                    HeaderValue::empty()
                }
            },
            SystemHeader::Destination => HeaderValue::destination(m.destination()?),
            SystemHeader::Expiration => HeaderValue::Text(format_timestamp(m.expiration()?, long)),
            SystemHeader::MessageId => HeaderValue::text(m.message_id()?),
            SystemHeader::Priority => HeaderValue::Integer(m.priority()?),
            SystemHeader::Redelivered => HeaderValue::Flag(m.redelivered()?),
            SystemHeader::ReplyTo => HeaderValue::destination(m.reply_to()?),
            SystemHeader::Timestamp => HeaderValue::Text(format_timestamp(m.timestamp()?, long)),
            SystemHeader::Type => HeaderValue::text(m.jms_type()?),
            SystemHeader::MessageClass => {
                HeaderValue::Text(m.kind().description().to_string())
            }
        };
        Ok(value)
    }
}

impl fmt::Display for SystemHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header_name())
    }
}

impl FromStr for SystemHeader {
    type Err = JmsvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SystemHeader::from_header_name(s.trim()).ok_or_else(|| JmsvError::UnknownHeader(s.into()))
    }
}
