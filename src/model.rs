use arboard::Clipboard;
use rand::rngs::StdRng;
use ratatui::crossterm::event::KeyEvent;
use rayon::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, instrument, trace, warn};

use crate::columns::{Column, HeaderCell, TableSchema};
use crate::domain::{CMDMode, HELP_TEXT, Message, TVConfig, TVError};
use crate::inputter::{InputResult, InputState, Inputter};
use crate::person::{Person, PersonGenerator, SyllableNames};
use crate::sorting::{Memo, SortDirection, SortState, compute_order, visible_rows};
use crate::ui::{COLUMN_SPACING, COLUMN_WIDTH_MARGIN, SORT_INDICATOR_WIDTH};

#[derive(Debug, PartialEq)]
pub enum Status {
    Ready,
    Quitting,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    Table,
    Popup,
    CmdInput,
}

/// A body column of the visible page, ready for rendering.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnView {
    pub width: usize,
    pub data: Vec<String>,
}

/// A header or footer cell with its render width resolved.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupCell {
    pub label: String,
    pub width: usize,
    pub placeholder: bool,
    pub selected: bool,
}

pub struct UIData {
    pub name: String,
    pub header_groups: Vec<Vec<GroupCell>>,
    pub table: Vec<ColumnView>,
    pub footer_groups: Vec<Vec<GroupCell>>,
    pub nrows: usize, // Rows on the visible page
    pub summary: String,
    pub selected_row: usize,
    pub selected_column: usize,
    pub show_popup: bool,
    pub popup_message: String,
    pub cmdinput: InputResult,
    pub cmd_mode: Option<CMDMode>,
    pub active_cmdinput: bool,
    pub status_message: String,
    pub last_update: Instant,
}

impl UIData {
    pub fn empty() -> Self {
        UIData {
            name: String::new(),
            header_groups: Vec::new(),
            table: Vec::new(),
            footer_groups: Vec::new(),
            nrows: 0,
            summary: String::new(),
            selected_row: 0,
            selected_column: 0,
            show_popup: false,
            popup_message: String::new(),
            cmdinput: InputResult::default(),
            cmd_mode: None,
            active_cmdinput: false,
            status_message: String::new(),
            last_update: Instant::now(),
        }
    }
}

/// Cursor and search state of the visible page.
#[derive(Default)]
struct TableView {
    curser_row: usize,
    curser_column: usize,
    search_results: Vec<(usize, usize)>, // (page row, leaf column)
    search_idx: usize,
}

pub struct Model {
    config: TVConfig,
    pub status: Status,
    modus: Modus,
    previous_modus: Modus,
    generator: PersonGenerator<StdRng, SyllableNames<StdRng>>,
    people: Arc<Vec<Person>>,
    data_version: u64,
    schema: TableSchema,
    sort: SortState,
    rows: Memo<(u64, SortState), Vec<usize>>,
    footers: Memo<u64, Vec<Vec<HeaderCell>>>,
    table: TableView,
    uidata: UIData,
    clipboard: Option<Clipboard>,
    input: Inputter,
    cmd_mode: Option<CMDMode>,
    last_input: InputResult,
    active_cmdinput: bool,
    status_message: String,
}

impl Model {
    /// Validates the column tree, then generates `config.records` people.
    #[instrument(skip_all, fields(records = config.records))]
    pub fn init(config: &TVConfig, columns: Vec<Column>) -> Result<Self, TVError> {
        let mut generator = PersonGenerator::from_seed(config.seed);
        let people = generator.generate(config.records);
        Self::with_people(config, columns, generator, people)
    }

    pub fn with_people(
        config: &TVConfig,
        columns: Vec<Column>,
        generator: PersonGenerator<StdRng, SyllableNames<StdRng>>,
        people: Vec<Person>,
    ) -> Result<Self, TVError> {
        let config = config.clone().validate()?;
        let schema = TableSchema::new(columns)?;
        let mut model = Self {
            config,
            status: Status::Ready,
            modus: Modus::Table,
            previous_modus: Modus::Table,
            generator,
            people: Arc::new(people),
            data_version: 0,
            schema,
            sort: SortState::unsorted(),
            rows: Memo::new(),
            footers: Memo::new(),
            table: TableView::default(),
            uidata: UIData::empty(),
            clipboard: None,
            input: Inputter::default(),
            cmd_mode: None,
            last_input: InputResult::default(),
            active_cmdinput: false,
            status_message: String::new(),
        };
        let n = model.people.len();
        model.set_status_message(format!("Generated {n} people. Press ? for help."));
        model.update_table_data();
        Ok(model)
    }

    pub fn get_uidata(&self) -> &UIData {
        &self.uidata
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn sort_state(&self) -> SortState {
        self.sort
    }

    pub fn raw_keyevents(&self) -> bool {
        self.active_cmdinput
    }

    pub fn quit(&mut self) {
        self.status = Status::Quitting;
    }

    /// Row order of the full record set under the current sort.
    pub fn ordered_rows(&mut self) -> Arc<Vec<usize>> {
        let people = &self.people;
        let schema = &self.schema;
        let sort = self.sort;
        self.rows.get_or_compute((self.data_version, sort), || {
            debug!("Computing row order for {:?}", sort.key());
            compute_order(people, schema, &sort)
        })
    }

    /// Footer rows. Totals run over every record, not only the visible page.
    fn footer_groups(&mut self) -> Arc<Vec<Vec<HeaderCell>>> {
        let people = &self.people;
        let schema = &self.schema;
        self.footers.get_or_compute(self.data_version, || {
            debug!("Computing footers over {} records", people.len());
            schema.footer_groups(people)
        })
    }

    pub fn set_sort(&mut self, column: usize, direction: Option<SortDirection>) {
        self.sort.set_sort(column, direction);
        self.sort_changed();
    }

    pub fn toggle_sort(&mut self, column: usize) {
        self.sort.toggle(column);
        self.sort_changed();
    }

    pub fn regenerate(&mut self) {
        let people = self.generator.generate(self.config.records);
        self.replace_people(people);
    }

    /// Swaps in a new record set, which invalidates every derived value.
    pub fn replace_people(&mut self, people: Vec<Person>) {
        self.people = Arc::new(people);
        self.data_version += 1;
        self.table = TableView::default();
        let n = self.people.len();
        info!("Record set replaced, now {n} people (version {})", self.data_version);
        self.set_status_message(format!("Generated {n} people"));
        self.update_table_data();
    }

    pub fn update(&mut self, msg: Message) {
        match self.modus {
            Modus::Table => match msg {
                Message::Quit => self.quit(),
                Message::MoveUp => self.move_selection_up(),
                Message::MoveDown => self.move_selection_down(),
                Message::MoveLeft => self.move_selection_left(),
                Message::MoveRight => self.move_selection_right(),
                Message::MoveBeginning => self.move_selection_beginning(),
                Message::MoveEnd => self.move_selection_end(),
                Message::ToggleSort => self.toggle_sort(self.table.curser_column),
                Message::SortAscending => {
                    self.set_sort(self.table.curser_column, Some(SortDirection::Ascending))
                }
                Message::SortDescending => {
                    self.set_sort(self.table.curser_column, Some(SortDirection::Descending))
                }
                Message::ClearSort => {
                    self.sort.clear();
                    self.sort_changed();
                }
                Message::Regenerate => self.regenerate(),
                Message::Search => self.enter_cmd_mode(CMDMode::Search),
                Message::SearchNext => self.search_next(1),
                Message::SearchPrev => self.search_next(-1),
                Message::CopyCell => self.copy_table_cell(),
                Message::CopyRow => self.copy_table_row(),
                Message::Help => self.show_help(),
                Message::Exit | Message::RawKey(_) => (),
            },
            Modus::Popup => match msg {
                Message::Quit => self.quit(),
                Message::Exit | Message::Help => self.exit(),
                _ => (),
            },
            Modus::CmdInput => {
                if let Message::RawKey(key) = msg {
                    self.raw_input(key)
                }
            }
        }
    }

    fn sort_changed(&mut self) {
        // Search hits are page positions, a new order makes them stale.
        self.table.search_results.clear();
        self.table.search_idx = 0;
        let message = match self.sort.key() {
            Some((column, dir)) => {
                let header = self
                    .schema
                    .leaf(column)
                    .map(|l| l.header.as_str())
                    .unwrap_or("?");
                format!("Sorted by {header}{}", dir.indicator())
            }
            None => "Unsorted".to_string(),
        };
        self.set_status_message(message);
        self.update_table_data();
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.uidata.status_message = self.status_message.clone();
        self.uidata.last_update = Instant::now();
    }

    fn get_visible_name(name: &str, width: usize) -> String {
        if width < 3 {
            return String::new();
        }
        if name.chars().count() > width {
            let mut reduced: String = name.chars().take(width - 3).collect();
            reduced.push_str("...");
            reduced
        } else {
            name.to_string()
        }
    }

    fn calculate_column_widths(
        &self,
        body: &[Vec<String>],
        footers: &[Vec<HeaderCell>],
    ) -> Vec<usize> {
        let max_width = self.config.max_column_width;
        let mut widths: Vec<usize> = body
            .iter()
            .map(|data| {
                let w = data.iter().map(|s| s.chars().count()).max().unwrap_or(0);
                std::cmp::min(w + COLUMN_WIDTH_MARGIN, max_width)
            })
            .collect();

        // Grow the last leaf under a cell until its label fits.
        for cell in self
            .schema
            .header_groups()
            .iter()
            .chain(footers.iter())
            .flatten()
        {
            let extra = if cell.leaf.is_some() {
                SORT_INDICATOR_WIDTH
            } else {
                0
            };
            let mut need = cell.label.chars().count() + extra + COLUMN_WIDTH_MARGIN;
            if cell.span == 1 {
                need = std::cmp::min(need, max_width);
            }
            let have = Self::span_width(&widths, cell);
            if need > have {
                widths[cell.first_leaf + cell.span - 1] += need - have;
            }
        }
        widths
    }

    fn span_width(widths: &[usize], cell: &HeaderCell) -> usize {
        widths[cell.first_leaf..cell.first_leaf + cell.span]
            .iter()
            .sum::<usize>()
            + (cell.span - 1) * COLUMN_SPACING
    }

    fn group_cells(&self, row: &[HeaderCell], widths: &[usize], header: bool) -> Vec<GroupCell> {
        let selected = self.table.curser_column;
        row.iter()
            .map(|cell| {
                let width = Self::span_width(widths, cell);
                let mut label = cell.label.clone();
                if header
                    && let Some(leaf) = cell.leaf
                    && let Some(dir) = self.sort.direction_of(leaf)
                {
                    label.push_str(dir.indicator());
                }
                GroupCell {
                    label: Self::get_visible_name(&label, width),
                    width,
                    placeholder: cell.placeholder,
                    selected: (cell.first_leaf..cell.first_leaf + cell.span).contains(&selected),
                }
            })
            .collect()
    }

    fn update_table_data(&mut self) {
        let rows = self.ordered_rows();
        let footers = self.footer_groups();
        let page = visible_rows(&rows, self.config.page_size);

        let body: Vec<Vec<String>> = self
            .schema
            .leaves()
            .iter()
            .map(|leaf| {
                page.iter()
                    .map(|&ridx| leaf.field.value(&self.people[ridx]).to_string())
                    .collect()
            })
            .collect();
        let widths = self.calculate_column_widths(&body, &footers);

        let nleaves = self.schema.leaves().len();
        self.table.curser_column =
            std::cmp::min(self.table.curser_column, nleaves.saturating_sub(1));
        self.table.curser_row =
            std::cmp::min(self.table.curser_row, page.len().saturating_sub(1));

        let table = body
            .into_iter()
            .zip(widths.iter())
            .map(|(data, &width)| ColumnView {
                width,
                data: data
                    .into_iter()
                    .map(|s| Self::get_visible_name(&s, width))
                    .collect(),
            })
            .collect();

        let header_groups = self
            .schema
            .header_groups()
            .iter()
            .map(|row| self.group_cells(row, &widths, true))
            .collect();
        let footer_groups = footers
            .iter()
            .map(|row| self.group_cells(row, &widths, false))
            .collect();

        trace!(
            "Table: Cr {}, Cc {}, page {}, total {}",
            self.table.curser_row,
            self.table.curser_column,
            page.len(),
            rows.len()
        );

        let name = match self.sort.key() {
            Some((column, dir)) => format!(
                "people, sorted by {}{}",
                self.schema.leaf(column).map(|l| l.header.as_str()).unwrap_or("?"),
                dir.indicator()
            ),
            None => "people".to_string(),
        };

        self.uidata = UIData {
            name,
            header_groups,
            table,
            footer_groups,
            nrows: page.len(),
            summary: format!(
                "Showing the first {} results of {} rows",
                page.len(),
                rows.len()
            ),
            selected_row: self.table.curser_row,
            selected_column: self.table.curser_column,
            show_popup: self.modus == Modus::Popup,
            popup_message: self.uidata.popup_message.clone(),
            cmdinput: self.last_input.clone(),
            cmd_mode: self.cmd_mode,
            active_cmdinput: self.active_cmdinput,
            status_message: self.status_message.clone(),
            last_update: Instant::now(),
        };
    }

    // -------------------- Control handling functions ---------------------- //

    fn exit(&mut self) {
        if self.modus == Modus::Popup {
            trace!("Close popup ...");
            self.modus = self.previous_modus;
            self.previous_modus = Modus::Popup;
            self.uidata.show_popup = false;
            self.uidata.last_update = Instant::now();
        }
    }

    fn show_help(&mut self) {
        self.previous_modus = self.modus;
        self.modus = Modus::Popup;
        self.uidata.popup_message = HELP_TEXT.to_string();
        self.uidata.show_popup = true;
        self.uidata.last_update = Instant::now();
    }

    fn raw_input(&mut self, key: KeyEvent) {
        if self.active_cmdinput {
            self.last_input = self.input.read(key);
            if self.last_input.finished() {
                self.handle_cmd_input();
            }
            self.uidata.cmdinput = self.last_input.clone();
            self.uidata.cmd_mode = self.cmd_mode;
            self.uidata.active_cmdinput = self.active_cmdinput;
            self.uidata.last_update = Instant::now();
        }
    }

    fn enter_cmd_mode(&mut self, mode: CMDMode) {
        trace!("Entering command mode {mode:?} ...");
        self.previous_modus = self.modus;
        self.modus = Modus::CmdInput;
        self.cmd_mode = Some(mode);

        self.active_cmdinput = true;
        self.input.clear();
        self.last_input = self.input.get();

        self.uidata.cmdinput = self.last_input.clone();
        self.uidata.active_cmdinput = self.active_cmdinput;
        self.uidata.cmd_mode = self.cmd_mode;
        self.uidata.last_update = Instant::now();
    }

    fn handle_cmd_input(&mut self) {
        trace!("Handle cmd input {:?}", self.last_input);

        self.active_cmdinput = false;
        self.modus = self.previous_modus;
        self.previous_modus = Modus::CmdInput;

        let cmd_input = self.last_input.input.clone();
        match (self.cmd_mode, self.last_input.state) {
            (_, InputState::Canceled) => self.set_status_message(""),
            (Some(CMDMode::Search), _) if !cmd_input.is_empty() => self.search(&cmd_input),
            _ => {}
        }
        self.cmd_mode = None;
    }

    /// Matches as (page row, leaf column), sorted row first.
    fn search_page(&mut self, term: &str) -> Vec<(usize, usize)> {
        let rows = self.ordered_rows();
        let page = visible_rows(&rows, self.config.page_size);
        let people = &self.people;

        let mut matches: Vec<(usize, usize)> = self
            .schema
            .leaves()
            .par_iter()
            .enumerate()
            .flat_map(|(col_idx, leaf)| {
                page.iter()
                    .enumerate()
                    .filter(|(_, ridx)| {
                        leaf.field.value(&people[**ridx]).to_string().contains(term)
                    })
                    .map(|(row, _)| (row, col_idx))
                    .collect::<Vec<_>>()
            })
            .collect();
        matches.sort_unstable();
        matches
    }

    fn search(&mut self, term: &str) {
        trace!("Starting search for {} ...", term);
        let start_time = Instant::now();
        let matches = self.search_page(term);
        trace!(
            "Search found {} matches in {}ms",
            matches.len(),
            start_time.elapsed().as_millis()
        );

        if matches.is_empty() {
            self.table.search_results.clear();
            self.set_status_message("Found no matches!");
            self.update_table_data();
            return;
        }

        // Continue from the first match at or after the cursor
        let cursor = (self.table.curser_row, self.table.curser_column);
        self.table.search_idx = matches.iter().position(|&m| m >= cursor).unwrap_or(0);
        self.table.search_results = matches;
        self.search_next(0);
    }

    fn search_next(&mut self, step: i64) {
        let total = self.table.search_results.len();
        if total == 0 {
            return;
        }
        let idx = (self.table.search_idx as i64 + step).rem_euclid(total as i64) as usize;
        self.table.search_idx = idx;
        let (row, column) = self.table.search_results[idx];
        self.table.curser_row = row;
        self.table.curser_column = column;
        self.set_status_message(format!("Search result {}/{}", idx + 1, total));
        self.update_table_data();
    }

    fn selected_person(&mut self) -> Option<&Person> {
        let rows = self.ordered_rows();
        let ridx = *visible_rows(&rows, self.config.page_size).get(self.table.curser_row)?;
        self.people.get(ridx)
    }

    fn wrap_cell_content(c: &str) -> String {
        let needs_wrapping = c.chars().any(|c| matches!(c, ' ' | '\t' | ',' | '"'));
        let escaped = c.replace('"', "\"\"");
        if needs_wrapping {
            format!("\"{escaped}\"")
        } else {
            escaped
        }
    }

    fn row_as_csv(schema: &TableSchema, person: &Person) -> String {
        schema
            .leaves()
            .iter()
            .map(|leaf| Self::wrap_cell_content(&leaf.field.value(person).to_string()))
            .collect::<Vec<String>>()
            .join(",")
    }

    fn copy_table_cell(&mut self) {
        let column = self.table.curser_column;
        let Some(field) = self.schema.leaf(column).map(|l| l.field) else {
            return;
        };
        let Some(cell) = self.selected_person().map(|p| field.value(p).to_string()) else {
            return;
        };
        trace!("Cell content: {}", cell);
        self.copy_to_clipboard(cell);
    }

    fn copy_table_row(&mut self) {
        let Some(person) = self.selected_person().cloned() else {
            return;
        };
        let content = Self::row_as_csv(&self.schema, &person);
        self.copy_to_clipboard(content);
    }

    fn copy_to_clipboard(&mut self, content: String) {
        if self.clipboard.is_none() {
            match Clipboard::new() {
                Ok(cb) => self.clipboard = Some(cb),
                Err(e) => {
                    warn!("Clipboard not available: {e:?}");
                    self.set_status_message("Clipboard not available");
                    return;
                }
            }
        }
        let Some(clipboard) = self.clipboard.as_mut() else {
            return;
        };
        match clipboard.set_text(content) {
            Ok(_) => {
                trace!("Copied content to clipboard.");
                self.set_status_message("Copied to clipboard");
            }
            Err(e) => {
                warn!("Error copying to clipboard: {e:?}");
                self.set_status_message("Copying to clipboard failed");
            }
        }
    }

    fn move_selection_up(&mut self) {
        self.table.curser_row = self.table.curser_row.saturating_sub(1);
        self.update_table_data();
    }

    fn move_selection_down(&mut self) {
        // update_table_data clamps to the last visible row
        self.table.curser_row += 1;
        self.update_table_data();
    }

    fn move_selection_left(&mut self) {
        self.table.curser_column = self.table.curser_column.saturating_sub(1);
        self.update_table_data();
    }

    fn move_selection_right(&mut self) {
        self.table.curser_column += 1;
        self.update_table_data();
    }

    fn move_selection_beginning(&mut self) {
        self.table.curser_row = 0;
        self.update_table_data();
    }

    fn move_selection_end(&mut self) {
        self.table.curser_row = usize::MAX;
        self.update_table_data();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::columns::default_columns;
    use crate::person::RelationshipStatus;
    use ratatui::crossterm::event::{KeyCode, KeyModifiers};

    const AGE: usize = 2;
    const VISITS: usize = 3;

    fn person(first: &str, age: u32, visits: u32) -> Person {
        Person {
            first_name: first.to_string(),
            last_name: "Doe".to_string(),
            age,
            visits,
            progress: 10,
            status: RelationshipStatus::Relationship,
        }
    }

    fn model_with(people: Vec<Person>) -> Model {
        let cfg = TVConfig::default().with_seed(1);
        let generator = PersonGenerator::from_seed(cfg.seed);
        Model::with_people(&cfg, default_columns(), generator, people).unwrap()
    }

    fn first_names(model: &Model) -> Vec<String> {
        model.get_uidata().table[0].data.clone()
    }

    fn type_keys(model: &mut Model, s: &str) {
        for c in s.chars() {
            model.update(Message::RawKey(KeyEvent::new(
                KeyCode::Char(c),
                KeyModifiers::NONE,
            )));
        }
        model.update(Message::RawKey(KeyEvent::new(
            KeyCode::Enter,
            KeyModifiers::NONE,
        )));
    }

    #[test]
    fn footer_total_covers_rows_beyond_the_page() {
        // 25 records with visits summing to 1000, only 20 shown
        let people = (0..25).map(|i| person(&format!("P{i}"), i, 40)).collect();
        let model = model_with(people);
        let ui = model.get_uidata();
        assert_eq!(ui.nrows, 20);
        assert_eq!(ui.footer_groups[0][VISITS].label, "Total: 1000");
        assert_eq!(ui.summary, "Showing the first 20 results of 25 rows");
    }

    #[test]
    fn empty_record_set() {
        let model = model_with(Vec::new());
        let ui = model.get_uidata();
        assert_eq!(ui.nrows, 0);
        assert!(ui.table.iter().all(|c| c.data.is_empty()));
        assert_eq!(ui.summary, "Showing the first 0 results of 0 rows");
        assert_eq!(ui.footer_groups[0][VISITS].label, "Total: 0");
    }

    #[test]
    fn footer_is_independent_of_sort() {
        let people = (0..30).map(|i| person(&format!("P{i}"), 30 - i, i)).collect();
        let mut model = model_with(people);
        let before = model.get_uidata().footer_groups.clone();
        model.set_sort(VISITS, Some(SortDirection::Descending));
        assert_eq!(model.get_uidata().footer_groups[0][VISITS].label, "Total: 435");
        assert_eq!(model.get_uidata().footer_groups[0][VISITS], before[0][VISITS]);
    }

    #[test]
    fn toggle_sort_updates_header_and_order() {
        let people = vec![person("B", 5, 1), person("A", 2, 1), person("C", 9, 1)];
        let mut model = model_with(people);
        for _ in 0..AGE {
            model.update(Message::MoveRight);
        }

        model.update(Message::ToggleSort);
        assert_eq!(first_names(&model), vec!["A", "B", "C"]);
        assert_eq!(model.get_uidata().header_groups[1][AGE].label, "Age ▲");

        model.update(Message::ToggleSort);
        assert_eq!(first_names(&model), vec!["C", "B", "A"]);
        assert_eq!(model.get_uidata().header_groups[1][AGE].label, "Age ▼");

        model.update(Message::ToggleSort);
        assert_eq!(first_names(&model), vec!["B", "A", "C"]);
        assert_eq!(model.sort_state(), SortState::unsorted());
        assert_eq!(model.get_uidata().header_groups[1][AGE].label, "Age");
    }

    #[test]
    fn clear_sort_restores_insertion_order() {
        let people = vec![person("B", 5, 1), person("A", 2, 1), person("C", 9, 1)];
        let mut model = model_with(people);
        model.set_sort(AGE, Some(SortDirection::Descending));
        assert_eq!(first_names(&model), vec!["C", "B", "A"]);

        model.update(Message::ClearSort);
        assert_eq!(model.sort_state(), SortState::unsorted());
        assert_eq!(first_names(&model), vec!["B", "A", "C"]);
        assert_eq!(model.get_uidata().header_groups[1][AGE].label, "Age");
        assert_eq!(model.get_uidata().status_message, "Unsorted");

        model.set_sort(AGE, Some(SortDirection::Ascending));
        model.set_sort(AGE, None);
        assert_eq!(first_names(&model), vec!["B", "A", "C"]);
    }

    #[test]
    fn row_order_is_memoized_per_sort_state() {
        let mut model = model_with((0..10).map(|i| person("X", i, i)).collect());
        let a = model.ordered_rows();
        let b = model.ordered_rows();
        assert!(Arc::ptr_eq(&a, &b));

        model.set_sort(AGE, Some(SortDirection::Descending));
        let c = model.ordered_rows();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c[0], 9);
    }

    #[test]
    fn regenerate_replaces_data_and_keeps_sort() {
        let mut model = model_with(vec![person("A", 1, 1)]);
        model.set_sort(AGE, Some(SortDirection::Ascending));
        model.update(Message::Regenerate);
        assert_eq!(model.people().len(), TVConfig::default().records);
        assert_eq!(model.sort_state().key(), Some((AGE, SortDirection::Ascending)));

        let ages: Vec<u32> = model.get_uidata().table[AGE]
            .data
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        assert!(ages.windows(2).all(|w| w[0] <= w[1]));
        let total: u32 = model.people().iter().map(|p| p.visits).sum();
        assert_eq!(
            model.get_uidata().footer_groups[0][VISITS].label,
            format!("Total: {total}")
        );
    }

    #[test]
    fn cursor_stays_inside_the_page() {
        let mut model = model_with((0..3).map(|i| person("X", i, i)).collect());
        model.update(Message::MoveEnd);
        assert_eq!(model.get_uidata().selected_row, 2);
        model.update(Message::MoveDown);
        assert_eq!(model.get_uidata().selected_row, 2);
        for _ in 0..10 {
            model.update(Message::MoveRight);
        }
        assert_eq!(model.get_uidata().selected_column, 5);
        model.update(Message::MoveBeginning);
        assert_eq!(model.get_uidata().selected_row, 0);
    }

    #[test]
    fn search_moves_cursor_through_matches() {
        let people = vec![
            person("Anna", 1, 1),
            person("Bert", 2, 2),
            person("Hanna", 3, 3),
        ];
        let mut model = model_with(people);
        model.update(Message::Search);
        assert!(model.raw_keyevents());
        type_keys(&mut model, "nna");
        assert!(!model.raw_keyevents());

        let ui = model.get_uidata();
        assert_eq!((ui.selected_row, ui.selected_column), (0, 0));
        assert_eq!(ui.status_message, "Search result 1/2");

        model.update(Message::SearchNext);
        assert_eq!(model.get_uidata().selected_row, 2);
        model.update(Message::SearchNext);
        assert_eq!(model.get_uidata().selected_row, 0);
        model.update(Message::SearchPrev);
        assert_eq!(model.get_uidata().selected_row, 2);
    }

    #[test]
    fn search_without_match_reports_it() {
        let mut model = model_with(vec![person("Anna", 1, 1)]);
        model.update(Message::Search);
        type_keys(&mut model, "zzz");
        assert_eq!(model.get_uidata().status_message, "Found no matches!");
    }

    #[test]
    fn help_popup_opens_and_closes() {
        let mut model = model_with(vec![person("Anna", 1, 1)]);
        model.update(Message::Help);
        assert!(model.get_uidata().show_popup);
        // Table keys are ignored while the popup is open
        model.update(Message::ToggleSort);
        assert_eq!(model.sort_state(), SortState::unsorted());
        model.update(Message::Exit);
        assert!(!model.get_uidata().show_popup);
        model.update(Message::Quit);
        assert_eq!(model.status, Status::Quitting);
    }

    #[test]
    fn unknown_accessor_aborts_model_construction() {
        let cfg = TVConfig::default();
        let columns = vec![Column::group("Info", vec![Column::leaf("Mail", "email")])];
        let res = Model::with_people(&cfg, columns, PersonGenerator::from_seed(Some(1)), vec![]);
        assert!(matches!(res, Err(TVError::UnknownAccessor(_))));
    }

    #[test]
    fn rows_are_copied_as_quoted_csv() {
        let schema = TableSchema::new(default_columns()).unwrap();
        let mut p = person("Mary Ann", 4, 7);
        p.last_name = "O\"Neil".to_string();
        assert_eq!(
            Model::row_as_csv(&schema, &p),
            "\"Mary Ann\",\"O\"\"Neil\",4,7,relationship,10"
        );
    }

    #[test]
    fn group_cells_span_their_leaves() {
        let model = model_with(vec![person("Anna", 1, 1)]);
        let ui = model.get_uidata();
        let widths: Vec<usize> = ui.table.iter().map(|c| c.width).collect();
        let name = &ui.header_groups[0][0];
        assert_eq!(name.label, "Name");
        assert_eq!(name.width, widths[0] + widths[1] + COLUMN_SPACING);
        let info = &ui.header_groups[0][1];
        assert_eq!(info.width, widths[2..].iter().sum::<usize>() + 3 * COLUMN_SPACING);
        // Room for the sort indicator is always reserved
        assert!(widths[AGE] >= "Age".len() + SORT_INDICATOR_WIDTH);
    }
}
