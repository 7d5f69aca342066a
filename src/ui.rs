use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    symbols::border,
    text::{Line, Span},
    widgets::{Block, Clear, Paragraph, Wrap},
};

use crate::domain::{CMDMode, TVConfig};
use crate::model::{GroupCell, Model, UIData};

pub const COLUMN_WIDTH_MARGIN: usize = 1;
pub const COLUMN_SPACING: usize = 1;
pub const SORT_INDICATOR_WIDTH: usize = 2;
pub const CMDLINE_HEIGH: u16 = 1;
pub const SUMMARY_HEIGHT: u16 = 1;

const POPUP_WIDTH_PERCENT: u16 = 60;
const POPUP_HEIGHT_PERCENT: u16 = 70;

#[derive(Debug)]
pub struct TableUI {
    header_style: Style,
    footer_style: Style,
    selected_row_style: Style,
    selected_cell_style: Style,
}

impl TableUI {
    pub fn new(_cfg: &TVConfig) -> Self {
        Self {
            header_style: Style::default().add_modifier(Modifier::BOLD),
            footer_style: Style::default().add_modifier(Modifier::ITALIC),
            selected_row_style: Style::default().add_modifier(Modifier::UNDERLINED),
            selected_cell_style: Style::default().add_modifier(Modifier::REVERSED),
        }
    }

    pub fn draw(&mut self, model: &Model, frame: &mut Frame) {
        let uidata = model.get_uidata();

        let [table_area, summary_area, cmd_area] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(SUMMARY_HEIGHT),
            Constraint::Length(CMDLINE_HEIGH),
        ])
        .areas(frame.area());

        let block = Block::bordered()
            .title(Line::from(Span::from(format!(" {} ", uidata.name)).bold()).centered())
            .title_bottom(Line::from(vec![" Help ".into(), "<?> ".blue().bold()]).centered())
            .border_set(border::PLAIN);
        frame.render_widget(Paragraph::new(self.table_lines(uidata)).block(block), table_area);

        frame.render_widget(Paragraph::new(uidata.summary.as_str()), summary_area);
        self.draw_cmdline(uidata, frame, cmd_area);

        if uidata.show_popup {
            let area = Self::popup_area(frame.area());
            let popup = Paragraph::new(uidata.popup_message.as_str())
                .wrap(Wrap { trim: false })
                .block(
                    Block::bordered()
                        .title(Line::from(" Help ".bold()).centered())
                        .title_bottom(Line::from(" Close <Esc> ").centered())
                        .border_set(border::THICK),
                );
            frame.render_widget(Clear, area);
            frame.render_widget(popup, area);
        }
    }

    fn table_lines<'a>(&self, uidata: &'a UIData) -> Vec<Line<'a>> {
        let mut lines = Vec::new();
        let nheader = uidata.header_groups.len();

        for (ridx, row) in uidata.header_groups.iter().enumerate() {
            // Only the leaf row marks the selected column
            let leaf_row = ridx + 1 == nheader;
            lines.push(self.group_line(row, self.header_style, leaf_row));
        }

        for r in 0..uidata.nrows {
            let row_selected = r == uidata.selected_row;
            let mut spans = Vec::with_capacity(uidata.table.len() * 2);
            for (cidx, column) in uidata.table.iter().enumerate() {
                if cidx > 0 {
                    spans.push(Span::raw(" ".repeat(COLUMN_SPACING)));
                }
                let value = column.data.get(r).map(|s| s.as_str()).unwrap_or("");
                let mut style = Style::default();
                if row_selected {
                    style = style.patch(self.selected_row_style);
                    if cidx == uidata.selected_column {
                        style = style.patch(self.selected_cell_style);
                    }
                }
                spans.push(Span::styled(Self::pad(value, column.width), style));
            }
            lines.push(Line::from(spans));
        }

        for row in uidata.footer_groups.iter() {
            lines.push(self.group_line(row, self.footer_style, false));
        }
        lines
    }

    fn group_line<'a>(&self, row: &[GroupCell], style: Style, mark_selected: bool) -> Line<'a> {
        let mut spans = Vec::with_capacity(row.len() * 2);
        for (idx, cell) in row.iter().enumerate() {
            if idx > 0 {
                spans.push(Span::raw(" ".repeat(COLUMN_SPACING)));
            }
            let mut cell_style = style;
            if mark_selected && cell.selected {
                cell_style = cell_style.patch(self.selected_cell_style);
            }
            if cell.placeholder {
                cell_style = Style::default();
            }
            spans.push(Span::styled(Self::pad(&cell.label, cell.width), cell_style));
        }
        Line::from(spans)
    }

    fn draw_cmdline(&self, uidata: &UIData, frame: &mut Frame, area: Rect) {
        if uidata.active_cmdinput {
            let prefix = match uidata.cmd_mode {
                Some(CMDMode::Search) => "/",
                None => ":",
            };
            frame.render_widget(
                Paragraph::new(Line::from(vec![
                    prefix.bold(),
                    Span::raw(uidata.cmdinput.input.as_str()),
                ])),
                area,
            );
            let offset = u16::try_from(prefix.len() + uidata.cmdinput.cursor).unwrap_or(u16::MAX);
            let x = area.x.saturating_add(offset);
            frame.set_cursor_position((std::cmp::min(x, area.right().saturating_sub(1)), area.y));
        } else {
            frame.render_widget(
                Paragraph::new(uidata.status_message.as_str().yellow()),
                area,
            );
        }
    }

    fn percent_of(length: u16, percent: u16) -> u16 {
        // A percentage of a u16 always fits back into a u16
        (u32::from(length) * u32::from(percent) / 100) as u16
    }

    fn pad(value: &str, width: usize) -> String {
        format!("{value:<width$}")
    }

    fn popup_area(area: Rect) -> Rect {
        let width = Self::percent_of(area.width, POPUP_WIDTH_PERCENT);
        let height = Self::percent_of(area.height, POPUP_HEIGHT_PERCENT);
        Rect {
            x: area.x + (area.width - width) / 2,
            y: area.y + (area.height - height) / 2,
            width,
            height,
        }
    }
}
