use tracing::{debug, info, trace};

use crate::domain::{Action, Config, HELP_TEXT};
use crate::header::SystemHeader;
use crate::jms::JmsMessage;
use crate::selector::selector_clause;

/// Pixels per terminal cell when turning descriptor widths into columns.
pub const PIXELS_PER_CELL: u16 = 8;
pub const TABLE_HEADER_HEIGHT: usize = 1;
pub const STATUSLINE_HEIGHT: usize = 1;

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    QUITTING,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub name: String,
    pub width: usize,
    pub data: Vec<String>,
}

/// Everything the UI needs for one frame.
#[derive(Clone, Debug)]
pub struct UIData {
    pub name: String,
    pub table: Vec<ColumnView>,
    pub nrows: usize,
    pub selected_row: usize,
    pub selected_column: usize,
    pub abs_selected_row: usize,
    pub status_message: String,
    pub help: &'static str,
}

pub struct Model {
    name: String,
    pub status: Status,
    messages: Vec<Box<dyn JmsMessage>>,
    columns: Vec<SystemHeader>,
    long_format: bool,
    curser_row: usize,
    curser_column: usize,
    offset_row: usize,
    table_height: usize,
    uidata: UIData,
    status_message: String,
}

impl Model {
    pub fn init(
        name: impl Into<String>,
        config: &Config,
        messages: Vec<Box<dyn JmsMessage>>,
        ui_height: usize,
    ) -> Self {
        let mut model = Self {
            name: name.into(),
            status: Status::READY,
            messages,
            columns: config.columns.clone(),
            long_format: config.long_format,
            curser_row: 0,
            curser_column: 0,
            offset_row: 0,
            table_height: Self::table_height(ui_height),
            uidata: UIData {
                name: String::new(),
                table: Vec::new(),
                nrows: 0,
                selected_row: 0,
                selected_column: 0,
                abs_selected_row: 0,
                status_message: String::new(),
                help: HELP_TEXT,
            },
            status_message: String::new(),
        };
        let nmessages = model.messages.len();
        model.set_status_message(format!("Loaded {nmessages} messages"));
        model.update_table_data();
        model
    }

    fn table_height(ui_height: usize) -> usize {
        ui_height.saturating_sub(TABLE_HEADER_HEIGHT + STATUSLINE_HEIGHT)
    }

    /// Column width in cells for a header, never narrower than its title.
    pub fn column_width(header: SystemHeader) -> usize {
        let cells = header.display_width().div_ceil(PIXELS_PER_CELL) as usize;
        std::cmp::max(cells, header.display_name().len())
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
    }

    fn update_table_data(&mut self) {
        let rbegin = self.offset_row;
        let rend = std::cmp::min(rbegin + self.table_height, self.messages.len());
        trace!(
            "Table: Cr {}, Cc {}, Or {}, Rb {}, Re {}, th {}",
            self.curser_row,
            self.curser_column,
            self.offset_row,
            rbegin,
            rend,
            self.table_height
        );

        let table = self
            .columns
            .iter()
            .map(|header| ColumnView {
                name: header.display_name().to_string(),
                width: Self::column_width(*header),
                data: self.messages[rbegin..rend]
                    .iter()
                    .map(|m| header.value(m.as_ref(), self.long_format).to_string())
                    .collect(),
            })
            .collect();

        self.uidata = UIData {
            name: self.name.clone(),
            table,
            nrows: self.messages.len(),
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            abs_selected_row: self.offset_row + self.curser_row,
            status_message: self.status_message.clone(),
            help: HELP_TEXT,
        };
    }

    fn ui_resize(&mut self, _width: usize, height: usize) {
        trace!("UI was resized! h:{}->{}", self.table_height, height);
        self.table_height = Self::table_height(height);
        // Keep the selected message visible
        let abs = self.offset_row + self.curser_row;
        if self.table_height == 0 {
            self.offset_row = abs;
            self.curser_row = 0;
        } else if self.curser_row >= self.table_height {
            self.offset_row = abs + 1 - self.table_height;
            self.curser_row = self.table_height - 1;
        }
    }

    pub fn update(&mut self, action: Option<Action>) {
        if let Some(action) = action {
            match action {
                Action::Quit => self.quit(),
                Action::MoveDown => self.move_selection_down(1),
                Action::MoveUp => self.move_selection_up(1),
                Action::MovePageDown => self.move_selection_down(self.table_height.max(1)),
                Action::MovePageUp => self.move_selection_up(self.table_height.max(1)),
                Action::MoveBeginning => self.select_row(0),
                Action::MoveEnd => self.select_row(self.messages.len().saturating_sub(1)),
                Action::MoveLeft => {
                    self.curser_column = self.curser_column.saturating_sub(1);
                    self.show_current_header();
                }
                Action::MoveRight => {
                    if self.curser_column + 1 < self.columns.len() {
                        self.curser_column += 1;
                    }
                    self.show_current_header();
                }
                Action::ToggleLongFormat => self.toggle_long_format(),
                Action::Selector => self.show_selector(),
                Action::Resize(width, height) => self.ui_resize(width, height),
            }
            self.update_table_data();
        }
    }

    fn current_header(&self) -> Option<SystemHeader> {
        self.columns.get(self.curser_column).copied()
    }

    fn current_message(&self) -> Option<&dyn JmsMessage> {
        self.messages
            .get(self.offset_row + self.curser_row)
            .map(|m| m.as_ref())
    }

    fn show_current_header(&mut self) {
        if let Some(header) = self.current_header() {
            let mut flags = Vec::new();
            if header.is_selector() {
                flags.push("selector");
            }
            if header.is_timestamp() {
                flags.push("timestamp");
            }
            self.set_status_message(format!("{} [{}]", header.header_name(), flags.join(", ")));
        }
    }

    fn toggle_long_format(&mut self) {
        self.long_format = !self.long_format;
        debug!("Long timestamp format: {}", self.long_format);
        let msg = if self.long_format {
            "Timestamps show epoch millis"
        } else {
            "Timestamps show date only"
        };
        self.set_status_message(msg);
    }

    fn show_selector(&mut self) {
        let (Some(header), Some(message)) = (self.current_header(), self.current_message()) else {
            return;
        };
        let msg = if !header.is_selector() {
            format!("{} cannot be used in a selector", header.header_name())
        } else {
            match selector_clause(header, message) {
                Some(clause) => {
                    info!("Selector: {clause}");
                    clause
                }
                None => format!("{} has no value to select on", header.header_name()),
            }
        };
        self.set_status_message(msg);
    }

    fn select_row(&mut self, row: usize) {
        if self.messages.is_empty() {
            return;
        }
        let row = std::cmp::min(row, self.messages.len() - 1);
        if row < self.offset_row || row >= self.offset_row + self.table_height {
            self.offset_row = row.saturating_sub(self.table_height.saturating_sub(1));
        }
        self.curser_row = row - self.offset_row;
    }

    fn move_selection_up(&mut self, size: usize) {
        let abs = self.offset_row + self.curser_row;
        let target = abs.saturating_sub(size);
        if target < self.offset_row {
            self.offset_row = target;
        }
        self.curser_row = target - self.offset_row;
    }

    fn move_selection_down(&mut self, size: usize) {
        self.select_row(self.offset_row + self.curser_row + size);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::tests::{FakeMessage, sample};

    fn messages(n: usize) -> Vec<Box<dyn JmsMessage>> {
        (0..n)
            .map(|i| {
                Box::new(FakeMessage {
                    message_id: Some(format!("ID:{i}")),
                    priority: (i % 10) as i32,
                    ..sample()
                }) as Box<dyn JmsMessage>
            })
            .collect()
    }

    fn model(n: usize, columns: Vec<SystemHeader>) -> Model {
        let cfg = Config::default().with_columns(columns);
        // 5 visible rows
        Model::init("test", &cfg, messages(n), 5 + TABLE_HEADER_HEIGHT + STATUSLINE_HEIGHT)
    }

    #[test]
    fn column_widths_follow_descriptors() {
        assert_eq!(Model::column_width(SystemHeader::MessageId), 25);
        assert_eq!(Model::column_width(SystemHeader::Priority), 8);
        assert_eq!(Model::column_width(SystemHeader::CorrelationId), 19);
    }

    #[test]
    fn renders_visible_rows_of_chosen_columns() {
        let m = model(20, vec![SystemHeader::MessageId, SystemHeader::Priority]);
        let ui = m.get_uidata();
        assert_eq!(ui.table.len(), 2);
        assert_eq!(ui.table[0].name, "ID");
        assert_eq!(ui.table[1].name, "Priority");
        assert_eq!(ui.table[0].data, vec!["ID:0", "ID:1", "ID:2", "ID:3", "ID:4"]);
        assert_eq!(ui.nrows, 20);
        assert_eq!(ui.status_message, "Loaded 20 messages");
    }

    #[test]
    fn scrolling_moves_the_window() {
        let mut m = model(20, vec![SystemHeader::MessageId]);
        for _ in 0..6 {
            m.update(Some(Action::MoveDown));
        }
        let ui = m.get_uidata();
        assert_eq!(ui.abs_selected_row, 6);
        assert_eq!(ui.selected_row, 4);
        assert_eq!(ui.table[0].data[0], "ID:2");

        m.update(Some(Action::MoveEnd));
        assert_eq!(m.get_uidata().abs_selected_row, 19);
        assert_eq!(m.get_uidata().table[0].data.last().unwrap(), "ID:19");

        m.update(Some(Action::MoveBeginning));
        assert_eq!(m.get_uidata().abs_selected_row, 0);
        assert_eq!(m.get_uidata().table[0].data[0], "ID:0");

        m.update(Some(Action::MoveUp));
        assert_eq!(m.get_uidata().abs_selected_row, 0);
    }

    #[test]
    fn toggling_long_format_rerenders_timestamps() {
        let mut m = model(1, vec![SystemHeader::Timestamp]);
        assert_eq!(m.get_uidata().table[0].data[0], "2024-01-02 03:04:05.678");
        m.update(Some(Action::ToggleLongFormat));
        assert_eq!(
            m.get_uidata().table[0].data[0],
            "2024-01-02 03:04:05.678 (1704164645678)"
        );
    }

    #[test]
    fn selector_for_current_cell() {
        let mut m = model(3, vec![SystemHeader::Destination, SystemHeader::Priority]);
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::Selector));
        assert_eq!(m.get_uidata().status_message, "JMSDestination cannot be used in a selector");

        m.update(Some(Action::MoveRight));
        assert_eq!(m.get_uidata().status_message, "JMSPriority [selector]");
        m.update(Some(Action::Selector));
        assert_eq!(m.get_uidata().status_message, "JMSPriority = 1");

        m.update(Some(Action::MoveRight));
        assert_eq!(m.get_uidata().selected_column, 1);
    }

    #[test]
    fn quit_and_empty_model() {
        let mut m = model(0, SystemHeader::ALL.to_vec());
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::Selector));
        assert_eq!(m.get_uidata().table[0].data.len(), 0);
        m.update(Some(Action::Quit));
        assert_eq!(m.status, Status::QUITTING);
    }

    #[test]
    fn resize_keeps_selection_visible() {
        let mut m = model(20, vec![SystemHeader::MessageId]);
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::Resize(80, 2 + TABLE_HEADER_HEIGHT + STATUSLINE_HEIGHT)));
        let ui = m.get_uidata();
        assert_eq!(ui.abs_selected_row, 3);
        assert_eq!(ui.selected_row, 1);
        assert_eq!(ui.table[0].data, vec!["ID:2", "ID:3"]);
    }

    #[test]
    fn zero_height_resize_keeps_selection() {
        let mut m = model(20, vec![SystemHeader::MessageId]);
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::MoveDown));
        m.update(Some(Action::Resize(80, TABLE_HEADER_HEIGHT + STATUSLINE_HEIGHT)));
        assert_eq!(m.get_uidata().abs_selected_row, 3);
        m.update(Some(Action::Resize(80, 5 + TABLE_HEADER_HEIGHT + STATUSLINE_HEIGHT)));
        let ui = m.get_uidata();
        assert_eq!(ui.abs_selected_row, 3);
        assert_eq!(ui.table[0].data[ui.selected_row], "ID:3");
    }
}
