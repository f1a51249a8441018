use std::fmt;

/// Failure reported by the messaging layer when a header cannot be read.
#[derive(Debug, Clone, PartialEq)]
pub enum JmsError {
    /// The message implementation predates the header (e.g. JMS 1.1 and delivery time).
    Unsupported(&'static str),
    InvalidHeader { header: &'static str, reason: String },
    Provider(String),
}

impl fmt::Display for JmsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JmsError::Unsupported(header) => write!(f, "{header} is not supported by this message"),
            JmsError::InvalidHeader { header, reason } => write!(f, "invalid {header}: {reason}"),
            JmsError::Provider(reason) => write!(f, "provider error: {reason}"),
        }
    }
}

impl std::error::Error for JmsError {}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeliveryMode {
    NonPersistent,
    Persistent,
    Unknown(i32),
}

impl DeliveryMode {
    pub fn from_value(value: i32) -> Self {
        match value {
            1 => DeliveryMode::NonPersistent,
            2 => DeliveryMode::Persistent,
            v => DeliveryMode::Unknown(v),
        }
    }

    pub fn value(&self) -> i32 {
        match self {
            DeliveryMode::NonPersistent => 1,
            DeliveryMode::Persistent => 2,
            DeliveryMode::Unknown(v) => *v,
        }
    }

    pub fn name(&self) -> String {
        match self {
            DeliveryMode::NonPersistent => "NON_PERSISTENT".to_string(),
            DeliveryMode::Persistent => "PERSISTENT".to_string(),
            DeliveryMode::Unknown(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Destination {
    Queue(String),
    Topic(String),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Queue(name) => write!(f, "queue://{name}"),
            Destination::Topic(name) => write!(f, "topic://{name}"),
        }
    }
}

impl Destination {
    /// Parses `queue://NAME` or `topic://NAME`. A bare name is taken as a queue.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }
        if let Some(name) = s.strip_prefix("topic://") {
            Some(Destination::Topic(name.to_string()))
        } else {
            Some(Destination::Queue(
                s.strip_prefix("queue://").unwrap_or(s).to_string(),
            ))
        }
    }
}

/// Body type of a message, as shown in the "Message Class" column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MessageKind {
    Text,
    Bytes,
    Map,
    Object,
    Stream,
    Message,
}

impl MessageKind {
    pub fn description(&self) -> &'static str {
        match self {
            MessageKind::Text => "Text",
            MessageKind::Bytes => "Bytes",
            MessageKind::Map => "Map",
            MessageKind::Object => "Object",
            MessageKind::Stream => "Stream",
            MessageKind::Message => "Message",
        }
    }

    /// Classifies a recorded kind, accepting descriptions and JMS interface names
    /// (`Text`, `TextMessage`, `javax.jms.TextMessage`).
    pub fn classify(raw: &str) -> Option<Self> {
        let name = raw.trim().rsplit('.').next().unwrap_or("").to_ascii_lowercase();
        let name = name
            .strip_suffix("message")
            .filter(|n| !n.is_empty())
            .unwrap_or(name.as_str());
        match name {
            "text" => Some(MessageKind::Text),
            "bytes" => Some(MessageKind::Bytes),
            "map" => Some(MessageKind::Map),
            "object" => Some(MessageKind::Object),
            "stream" => Some(MessageKind::Stream),
            "message" => Some(MessageKind::Message),
            _ => None,
        }
    }
}

/// Header accessors of a JMS message. Each read may fail in the messaging layer.
pub trait JmsMessage {
    fn correlation_id(&self) -> Result<Option<String>, JmsError>;
    fn delivery_mode(&self) -> Result<i32, JmsError>;

    /// Only JMS 2.0 messages carry a delivery time.
    fn delivery_time(&self) -> Result<i64, JmsError> {
        Err(JmsError::Unsupported("JMSDeliveryTime"))
    }

    fn destination(&self) -> Result<Option<Destination>, JmsError>;
    fn expiration(&self) -> Result<i64, JmsError>;
    fn message_id(&self) -> Result<Option<String>, JmsError>;
    fn priority(&self) -> Result<i32, JmsError>;
    fn redelivered(&self) -> Result<bool, JmsError>;
    fn reply_to(&self) -> Result<Option<Destination>, JmsError>;
    fn timestamp(&self) -> Result<i64, JmsError>;
    fn jms_type(&self) -> Result<Option<String>, JmsError>;
    fn kind(&self) -> MessageKind;
}
