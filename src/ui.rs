use ratatui::{
    Frame,
    layout::{Constraint, Layout},
    style::{Style, Stylize},
    text::Line,
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::model::{Model, STATUSLINE_HEIGHT, TABLE_HEADER_HEIGHT, UIData};

#[derive(Default)]
pub struct TableUI {
    state: TableState,
}

impl TableUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();
        let [table_area, status_area] = Layout::vertical([
            Constraint::Min(TABLE_HEADER_HEIGHT as u16),
            Constraint::Length(STATUSLINE_HEIGHT as u16),
        ])
        .areas(frame.area());

        self.state.select(Some(uidata.selected_row));
        self.state.select_column(Some(uidata.selected_column));
        frame.render_stateful_widget(Self::table(uidata), table_area, &mut self.state);
        frame.render_widget(Self::statusline(uidata), status_area);
    }

    fn table(uidata: &UIData) -> Table<'_> {
        let header = Row::new(
            uidata
                .table
                .iter()
                .map(|c| Cell::from(c.name.as_str()).bold()),
        )
        .height(TABLE_HEADER_HEIGHT as u16);

        let nrows = uidata.table.first().map(|c| c.data.len()).unwrap_or(0);
        let rows = (0..nrows).map(|r| {
            Row::new(
                uidata
                    .table
                    .iter()
                    .map(|c| Cell::from(c.data[r].as_str())),
            )
        });
        let widths = uidata
            .table
            .iter()
            .map(|c| Constraint::Length(c.width as u16));

        Table::new(rows, widths)
            .header(header)
            .column_spacing(1)
            .row_highlight_style(Style::new().reversed())
            .cell_highlight_style(Style::new().yellow().bold())
    }

    fn statusline(uidata: &UIData) -> Paragraph<'_> {
        let position = format!(
            " {} {}/{} ",
            uidata.name,
            if uidata.nrows == 0 { 0 } else { uidata.abs_selected_row + 1 },
            uidata.nrows
        );
        Paragraph::new(Line::from(vec![
            position.blue().bold(),
            format!(" {} ", uidata.status_message).into(),
            uidata.help.dark_gray(),
        ]))
    }
}
