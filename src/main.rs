use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
};
use rust_decimal::Decimal;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tui::{backend::CrosstermBackend, Terminal};

use proforma_editor::app::{self, Outcome};
use proforma_editor::config::Config;
use proforma_editor::submission;
use proforma_editor::ui::proforma_form::ProformaFormState;

/// Compose a proforma in the terminal and emit it as a form post body
#[derive(Parser, Debug)]
#[command(name = "proforma", version)]
struct Cli {
    /// Write the encoded form to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
    /// IVA rate as a fraction, e.g. 0.12
    #[arg(long)]
    tax_rate: Option<Decimal>,
    /// Symbol printed before every amount
    #[arg(long)]
    currency: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Environment first, then command line overrides
    let config = Config::load()?.with_overrides(cli.tax_rate, cli.currency, cli.output)?;
    init_tracing(&config.log_file)?;
    info!(tax_rate = %config.tax_rate, output = ?config.output_path(), "starting proforma editor");

    let mut sink = submission::sink::for_output(config.output_path());

    // Setup terminal
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = ProformaFormState::new(config.tax_policy());
    let result = app::run_app(&mut terminal, &mut state, sink.as_mut());

    // Restore terminal
    terminal::disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    match result {
        Ok(Outcome::Submitted) => {
            sink.finish()?;
            eprintln!("Proforma enviada.");
        }
        Ok(Outcome::Cancelled) => eprintln!("Proforma descartada."),
        Err(err) => eprintln!("Error: {}", err),
    }

    Ok(())
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("could not open log file {}", log_file.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // stdout belongs to the terminal UI
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
