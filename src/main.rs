use std::process::ExitCode;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info};

mod columns;
mod controller;
mod domain;
mod inputter;
mod logging;
mod model;
mod person;
mod sorting;
mod ui;

use columns::default_columns;
use controller::Controller;
use domain::{DEFAULT_PAGE_SIZE, DEFAULT_RECORDS, TVConfig, TVError};
use model::{Model, Status};
use ui::TableUI;

/// Browse a sortable table of randomly generated people.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Number of people to generate
    #[arg(short = 'n', long, default_value_t = DEFAULT_RECORDS,
          value_parser = parse_record_count, allow_negative_numbers = true)]
    records: usize,

    /// Maximum number of rows shown
    #[arg(short, long, default_value_t = DEFAULT_PAGE_SIZE,
          value_parser = parse_page_size, allow_negative_numbers = true)]
    page_size: usize,

    /// Seed for reproducible data
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to this file (RUST_LOG controls the level)
    #[arg(long)]
    log_file: Option<String>,

    /// Event poll interval in milliseconds
    #[arg(long, default_value_t = 100)]
    poll: u64,
}

fn parse_record_count(s: &str) -> Result<usize, String> {
    let n: i64 = s
        .trim()
        .parse()
        .map_err(|_| format!("\"{s}\" is not a whole number"))?;
    usize::try_from(n).map_err(|_| format!("the count can't be negative, got {n}"))
}

fn parse_page_size(s: &str) -> Result<usize, String> {
    match parse_record_count(s)? {
        0 => Err("the page size has to be at least 1".to_string()),
        n => Ok(n),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Err(e) => {
            error!("Exiting with error: {e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: Args) -> Result<(), TVError> {
    logging::init(args.log_file.as_deref())?;
    info!("Starting people-tv!");

    let mut cfg = TVConfig::default()
        .with_records(args.records)
        .with_page_size(args.page_size)
        .with_event_poll_time(args.poll);
    if let Some(seed) = args.seed {
        cfg = cfg.with_seed(seed);
    }
    let cfg = cfg.validate()?;

    let mut model = Model::init(&cfg, default_columns())?;
    info!("Showing {} people", model.people().len());
    let mut ui = TableUI::new(&cfg);
    let controller = Controller::new(&cfg);

    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, &mut model, &mut ui, &controller);
    ratatui::restore();
    info!("Bye! Last sort key: {:?}", model.sort_state().key());
    result
}

fn event_loop(
    terminal: &mut DefaultTerminal,
    model: &mut Model,
    ui: &mut TableUI,
    controller: &Controller,
) -> Result<(), TVError> {
    while model.status != Status::Quitting {
        // Render the current view
        terminal.draw(|f| ui.draw(model, f))?;

        // Handle events and map to a Message
        if let Some(message) = controller.handle_event(model)? {
            model.update(message);
        };
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_count_parsing() {
        assert_eq!(parse_record_count("20"), Ok(20));
        assert_eq!(parse_record_count("0"), Ok(0));
        assert!(parse_record_count("-3").unwrap_err().contains("negative"));
        assert!(parse_record_count("2.5").unwrap_err().contains("whole number"));
        assert!(parse_page_size("0").is_err());
    }

    #[test]
    fn cli_defaults() {
        let args = Args::try_parse_from(["people-tv"]).unwrap();
        assert_eq!(args.records, 20);
        assert_eq!(args.page_size, 20);
        assert_eq!(args.seed, None);

        let args = Args::try_parse_from(["people-tv", "-n", "25", "--seed", "4"]).unwrap();
        assert_eq!(args.records, 25);
        assert_eq!(args.seed, Some(4));

        assert!(Args::try_parse_from(["people-tv", "-n", "-1"]).is_err());
    }
}
