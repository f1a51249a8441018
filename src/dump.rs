use polars::prelude::*;
use std::fmt::Display;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Instant;
use tracing::{debug, info, trace};

use crate::domain::JmsvError;
use crate::header::SystemHeader;
use crate::jms::{Destination, JmsError, JmsMessage, MessageKind};

#[derive(Debug)]
enum FileType {
    CSV,
    PARQUET,
    ARROW,
}

/// A message read back from a recorded dump. Each header keeps its own read
/// result so a malformed cell only affects that header.
#[derive(Debug, Clone)]
pub struct RecordedMessage {
    correlation_id: Option<String>,
    delivery_mode: Result<i32, JmsError>,
    delivery_time: Result<i64, JmsError>,
    destination: Option<Destination>,
    expiration: Result<i64, JmsError>,
    message_id: Option<String>,
    priority: Result<i32, JmsError>,
    redelivered: Result<bool, JmsError>,
    reply_to: Option<Destination>,
    timestamp: Result<i64, JmsError>,
    jms_type: Option<String>,
    kind: MessageKind,
}

impl JmsMessage for RecordedMessage {
    fn correlation_id(&self) -> Result<Option<String>, JmsError> {
        Ok(self.correlation_id.clone())
    }

    fn delivery_mode(&self) -> Result<i32, JmsError> {
        self.delivery_mode.clone()
    }

    fn delivery_time(&self) -> Result<i64, JmsError> {
        self.delivery_time.clone()
    }

    fn destination(&self) -> Result<Option<Destination>, JmsError> {
        Ok(self.destination.clone())
    }

    fn expiration(&self) -> Result<i64, JmsError> {
        self.expiration.clone()
    }

    fn message_id(&self) -> Result<Option<String>, JmsError> {
        Ok(self.message_id.clone())
    }

    fn priority(&self) -> Result<i32, JmsError> {
        self.priority.clone()
    }

    fn redelivered(&self) -> Result<bool, JmsError> {
        self.redelivered.clone()
    }

    fn reply_to(&self) -> Result<Option<Destination>, JmsError> {
        Ok(self.reply_to.clone())
    }

    fn timestamp(&self) -> Result<i64, JmsError> {
        self.timestamp.clone()
    }

    fn jms_type(&self) -> Result<Option<String>, JmsError> {
        Ok(self.jms_type.clone())
    }

    fn kind(&self) -> MessageKind {
        self.kind
    }
}

type Cells = Option<Vec<Option<String>>>;

/// String cells of one header column, `None` if the dump has no such column.
struct HeaderColumns {
    columns: Vec<Cells>,
}

impl HeaderColumns {
    fn load(df: &DataFrame) -> Result<Self, PolarsError> {
        for name in df.get_column_names() {
            if SystemHeader::from_header_name(name).is_none() {
                debug!("Ignoring column '{name}', not a JMS system header");
            }
        }
        let columns = SystemHeader::ALL
            .iter()
            .map(|h| Self::load_column(df, h.header_name()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { columns })
    }

    fn load_column(df: &DataFrame, name: &str) -> Result<Cells, PolarsError> {
        let Ok(column) = df.column(name) else {
            debug!("Dump has no '{name}' column");
            return Ok(None);
        };
        trace!(
            "Loading '{name}' as {} (timestamp: {})",
            column.dtype(),
            SystemHeader::is_timestamp_name(name)
        );
        let col = column.cast(&DataType::String)?;
        let series = col.str()?;
        Ok(Some(
            series
                .into_iter()
                .map(|v| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()))
                .collect(),
        ))
    }

    fn has(&self, header: SystemHeader) -> bool {
        self.columns[header as usize].is_some()
    }

    fn cell(&self, header: SystemHeader, row: usize) -> Option<&String> {
        self.columns[header as usize]
            .as_ref()
            .and_then(|c| c.get(row))
            .and_then(|v| v.as_ref())
    }

    fn text(&self, header: SystemHeader, row: usize) -> Option<String> {
        self.cell(header, row).cloned()
    }

    fn destination(&self, header: SystemHeader, row: usize) -> Option<Destination> {
        self.cell(header, row).and_then(|s| Destination::parse(s))
    }

    /// Blank cells take the JMS default for the header.
    fn parse<T>(&self, header: SystemHeader, row: usize, default: T) -> Result<T, JmsError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match self.cell(header, row) {
            None => Ok(default),
            Some(raw) => raw.parse::<T>().map_err(|e| JmsError::InvalidHeader {
                header: header.header_name(),
                reason: format!("'{raw}': {e}"),
            }),
        }
    }

    fn flag(&self, header: SystemHeader, row: usize) -> Result<bool, JmsError> {
        match self.cell(header, row).map(|s| s.to_ascii_lowercase()).as_deref() {
            None | Some("false") | Some("0") => Ok(false),
            Some("true") | Some("1") => Ok(true),
            Some(other) => Err(JmsError::InvalidHeader {
                header: header.header_name(),
                reason: format!("'{other}' is not a boolean"),
            }),
        }
    }

    fn message(&self, row: usize) -> RecordedMessage {
        let delivery_time = if self.has(SystemHeader::DeliveryTime) {
            self.parse(SystemHeader::DeliveryTime, row, 0)
        } else {
            Err(JmsError::Unsupported("JMSDeliveryTime"))
        };
        RecordedMessage {
            correlation_id: self.text(SystemHeader::CorrelationId, row),
            delivery_mode: self.parse(SystemHeader::DeliveryMode, row, 2),
            delivery_time,
            destination: self.destination(SystemHeader::Destination, row),
            expiration: self.parse(SystemHeader::Expiration, row, 0),
            message_id: self.text(SystemHeader::MessageId, row),
            priority: self.parse(SystemHeader::Priority, row, 4),
            redelivered: self.flag(SystemHeader::Redelivered, row),
            reply_to: self.destination(SystemHeader::ReplyTo, row),
            timestamp: self.parse(SystemHeader::Timestamp, row, 0),
            jms_type: self.text(SystemHeader::Type, row),
            kind: self
                .cell(SystemHeader::MessageClass, row)
                .and_then(|s| MessageKind::classify(s))
                .unwrap_or(MessageKind::Message),
        }
    }
}

/// Reads recorded messages from a CSV, Parquet or Arrow IPC dump whose columns
/// are named after the JMS headers.
pub fn load_messages(path: PathBuf, max_rows: Option<usize>) -> Result<Vec<RecordedMessage>, JmsvError> {
    let file_type = get_file_type(&path)?;
    let mut frame = match file_type {
        FileType::CSV => load_csv(&path)?,
        FileType::PARQUET => load_parquet(&path)?,
        FileType::ARROW => load_arrow(&path)?,
    };
    if let Some(n) = max_rows {
        // IdxSize is u32 unless polars is built with bigidx
        frame = frame.limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX));
    }

    let start_time = Instant::now();
    let df = frame.collect()?;
    let headers = HeaderColumns::load(&df)?;
    let messages: Vec<RecordedMessage> = (0..df.height()).map(|row| headers.message(row)).collect();

    info!(
        "Loaded {} messages from {:?} ({:?}) in {}ms",
        messages.len(),
        path,
        file_type,
        start_time.elapsed().as_millis()
    );
    Ok(messages)
}

fn get_file_type(path: &Path) -> Result<FileType, JmsvError> {
    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => JmsvError::FileNotFound,
        ErrorKind::PermissionDenied => JmsvError::PermissionDenied,
        _ => JmsvError::IoError(e),
    })?;
    if !metadata.is_file() {
        return Err(JmsvError::LoadingFailed("Not a file!".into()));
    }
    detect_file_type(path)
}

fn detect_file_type(path: &Path) -> Result<FileType, JmsvError> {
    match path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_uppercase())
        .as_deref()
    {
        Some("CSV") => Ok(FileType::CSV),
        Some("PARQUET") | Some("PQ") => Ok(FileType::PARQUET),
        Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::ARROW),
        _ => Err(JmsvError::UnknownFileType),
    }
}

fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyCsvReader::new(PlPath::Local(path.into()))
        .with_has_header(true)
        .finish()
}

fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
}

fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
    LazyFrame::scan_ipc(
        PlPath::Local(path.into()),
        polars::io::ipc::IpcScanOptions,
        UnifiedScanArgs::default(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::HeaderValue;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_dump(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .prefix("jmsv-")
            .suffix(suffix)
            .tempfile()
            .unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_jms2_dump() {
        let dump = write_dump(
            ".csv",
            "JMSMessageID,JMSCorrelationID,JMSDeliveryMode,JMSDeliveryTime,JMSDestination,JMSPriority,JMSRedelivered,JMSTimestamp,JMSType,Message Class\n\
             ID:1,c1,2,1704164645678,queue://ORDERS,7,true,1704164645678,order,TextMessage\n\
             ID:2,,1,,topic://PRICES,3,false,0,,Bytes\n",
        );
        let messages = load_messages(dump.path().to_path_buf(), None).unwrap();

        assert_eq!(messages.len(), 2);
        let m = &messages[0];
        assert_eq!(
            SystemHeader::DeliveryTime.value(m, false).to_string(),
            "2024-01-02 03:04:05.678"
        );
        assert_eq!(SystemHeader::Priority.value(m, false), HeaderValue::Integer(7));
        assert_eq!(SystemHeader::Redelivered.value(m, false), HeaderValue::Flag(true));
        assert_eq!(SystemHeader::MessageClass.value(m, false).to_string(), "Text");
        assert_eq!(SystemHeader::Destination.value(m, false).to_string(), "queue://ORDERS");

        let m = &messages[1];
        assert_eq!(SystemHeader::CorrelationId.value(m, false).to_string(), "");
        assert_eq!(SystemHeader::DeliveryTime.value(m, false).to_string(), "");
        assert_eq!(SystemHeader::DeliveryMode.value(m, false).to_string(), "NON_PERSISTENT (1)");
        assert_eq!(SystemHeader::Destination.value(m, false).to_string(), "topic://PRICES");
        assert_eq!(SystemHeader::MessageClass.value(m, false).to_string(), "Bytes");
    }

    #[test]
    fn jms1_dump_has_no_delivery_time() {
        let dump = write_dump(".csv", "JMSMessageID,JMSPriority\nID:9,5\n");
        let messages = load_messages(dump.path().to_path_buf(), None).unwrap();

        let m = &messages[0];
        assert_eq!(m.delivery_time(), Err(JmsError::Unsupported("JMSDeliveryTime")));
        assert_eq!(SystemHeader::DeliveryTime.value(m, true).to_string(), "");
        // Missing columns fall back to JMS defaults
        assert_eq!(SystemHeader::DeliveryMode.value(m, false).to_string(), "PERSISTENT (2)");
        assert_eq!(SystemHeader::MessageClass.value(m, false).to_string(), "Message");
    }

    #[test]
    fn malformed_cell_only_breaks_its_header() {
        let dump = write_dump(".csv", "JMSMessageID,JMSPriority\nID:1,high\n");
        let messages = load_messages(dump.path().to_path_buf(), None).unwrap();

        let m = &messages[0];
        assert!(matches!(m.priority(), Err(JmsError::InvalidHeader { .. })));
        assert_eq!(SystemHeader::Priority.value(m, false), HeaderValue::Text(String::new()));
        assert_eq!(SystemHeader::MessageId.value(m, false).to_string(), "ID:1");
    }

    #[test]
    fn max_rows_limits_messages() {
        let dump = write_dump(".csv", "JMSMessageID\nID:1\nID:2\nID:3\n");
        let messages = load_messages(dump.path().to_path_buf(), Some(2)).unwrap();
        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn rejects_unknown_files() {
        assert!(matches!(
            load_messages(PathBuf::from("/definitely/not/here.csv"), None),
            Err(JmsvError::FileNotFound)
        ));
        let dump = write_dump(".txt", "JMSMessageID\nID:1\n");
        let result = load_messages(dump.path().to_path_buf(), None);
        assert!(matches!(result, Err(JmsvError::UnknownFileType)));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn huge_max_rows_loads_everything() {
        let dump = write_dump(".csv", "JMSMessageID\nID:1\nID:2\n");
        let messages = load_messages(dump.path().to_path_buf(), Some(usize::MAX)).unwrap();
        assert_eq!(messages.len(), 2);
        let messages = load_messages(dump.path().to_path_buf(), Some(1usize << 32)).unwrap();
        assert_eq!(messages.len(), 2);
    }
}
