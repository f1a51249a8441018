use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ratatui::DefaultTerminal;
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod controller;
mod domain;
mod dump;
mod header;
mod jms;
mod model;
mod selector;
mod timestamp;
mod ui;

use controller::Controller;
use domain::{Config, JmsvError};
use header::SystemHeader;
use jms::JmsMessage;
use model::{Model, Status};
use ui::TableUI;

/// Browse the JMS system headers of a recorded message dump.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Message dump (csv, parquet or arrow) with one column per JMS header
    path: String,

    /// Comma separated header names to show, e.g. JMSMessageID,JMSTimestamp
    #[arg(short, long, value_delimiter = ',', value_parser = parse_header)]
    columns: Vec<SystemHeader>,

    /// Append epoch millis to timestamps
    #[arg(short, long)]
    long: bool,

    /// Only load the first N messages
    #[arg(short = 'n', long)]
    max_rows: Option<usize>,

    #[arg(long, default_value = "jmsv.log")]
    log_file: String,
}

fn parse_header(name: &str) -> Result<SystemHeader, String> {
    name.parse::<SystemHeader>().map_err(|e| e.to_string())
}

impl Args {
    fn config(&self) -> Config {
        let columns = if self.columns.is_empty() {
            SystemHeader::ALL.to_vec()
        } else {
            self.columns.clone()
        };
        Config::default()
            .with_columns(columns)
            .with_long_format(self.long)
            .with_max_rows(self.max_rows)
    }
}

fn init_logging(log_file: &str) -> Result<(), JmsvError> {
    let path = shellexpand::full(log_file)
        .map_err(|e| JmsvError::LoadingFailed(e.to_string()))?
        .into_owned();
    let file = File::create(path)?;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().with_writer(Arc::new(file)).with_ansi(false))
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    if let Err(e) = init_logging(&args.log_file) {
        eprintln!("Error: could not open log file: {e}");
        return ExitCode::FAILURE;
    }

    match run(&args) {
        Err(e) => {
            error!("{e:?}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn run(args: &Args) -> Result<(), JmsvError> {
    let cfg = args.config();
    let path = PathBuf::from(
        shellexpand::full(&args.path)
            .map_err(|e| JmsvError::LoadingFailed(e.to_string()))?
            .as_ref(),
    );
    info!("Starting jmsv on {:?} with columns {:?}", path, cfg.columns);

    let name = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("???")
        .to_string();
    let messages: Vec<Box<dyn JmsMessage>> = dump::load_messages(path, cfg.max_rows)?
        .into_iter()
        .map(|m| Box::new(m) as Box<dyn JmsMessage>)
        .collect();

    // The terminal is only touched once the dump loaded
    let mut terminal = ratatui::init();
    let result = browse(&mut terminal, name, &cfg, messages);
    ratatui::restore();
    result
}

fn browse(
    terminal: &mut DefaultTerminal,
    name: String,
    cfg: &Config,
    messages: Vec<Box<dyn JmsMessage>>,
) -> Result<(), JmsvError> {
    let size = terminal.size()?;
    let mut model = Model::init(name, cfg, messages, size.height as usize);
    let mut ui = TableUI::new();
    let controller = Controller::new(cfg);

    while model.status != Status::QUITTING {
        terminal.draw(|f| ui.draw(&model, f))?;
        model.update(controller.handle_event()?);
    }

    Ok(())
}
