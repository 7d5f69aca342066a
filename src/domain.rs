use std::fmt;
use std::io::Error;

use derive_setters::Setters;
use ratatui::crossterm::event::KeyEvent;

pub const DEFAULT_RECORDS: usize = 20;
pub const DEFAULT_PAGE_SIZE: usize = 20;

pub const HELP_TEXT: &str = "
Navigation
  ←/h, →/l      previous / next column
  ↑/k, ↓/j      previous / next row
  g, G          first / last visible row

Sorting
  s, Enter      toggle sort on the selected column (▲ → ▼ → none)
  a, d          sort ascending / descending
  x             clear sorting

Data
  r             generate a new set of people
  /             search in the visible rows
  n, N          next / previous search result
  c, C          copy cell / row to the clipboard

  ?             this help, Esc to close
  q             quit
";

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct TVConfig {
    pub event_poll_time: u64,
    pub records: usize,
    pub page_size: usize,
    #[setters(strip_option)]
    pub seed: Option<u64>,
    pub max_column_width: usize,
}

impl Default for TVConfig {
    fn default() -> Self {
        Self {
            event_poll_time: 100,
            records: DEFAULT_RECORDS,
            page_size: DEFAULT_PAGE_SIZE,
            seed: None,
            max_column_width: 24,
        }
    }
}

impl TVConfig {
    pub fn validate(self) -> Result<Self, TVError> {
        if self.page_size == 0 {
            return Err(TVError::InvalidConfig(
                "page size has to be at least 1".to_string(),
            ));
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CMDMode {
    Search,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    ToggleSort,
    SortAscending,
    SortDescending,
    ClearSort,
    Regenerate,
    Search,
    SearchNext,
    SearchPrev,
    CopyCell,
    CopyRow,
    Help,
    Exit,
    RawKey(KeyEvent),
}

#[derive(Debug)]
pub enum TVError {
    IoError(Error),
    UnknownAccessor(String),
    InvalidFooter { accessor: String },
    EmptyGroup(String),
    InvalidConfig(String),
}

impl fmt::Display for TVError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TVError::IoError(e) => write!(f, "io error: {e}"),
            TVError::UnknownAccessor(a) => {
                write!(f, "column accessor \"{a}\" does not name a person field")
            }
            TVError::InvalidFooter { accessor } => {
                write!(f, "column \"{accessor}\" is not numeric and can't be totalled")
            }
            TVError::EmptyGroup(h) => write!(f, "column group \"{h}\" has no columns"),
            TVError::InvalidConfig(m) => write!(f, "invalid configuration: {m}"),
        }
    }
}

impl std::error::Error for TVError {}

impl From<Error> for TVError {
    fn from(err: Error) -> Self {
        TVError::IoError(err)
    }
}
