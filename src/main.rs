use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};
use tracing::{info, warn};

use trilha::{
    app::App,
    app_dirs::AppDirs,
    catalog::{CatalogError, TrackCatalog},
    logging,
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner},
    settings::{FileSettingsStore, Settings, SettingsStore, TextSize, Theme},
    speech::{CommandLine, CommandSpeech},
    ui,
};

const TICK_RATE_MS: u64 = 100;

/// accessible literacy-learning tui with guided tracks
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guided literacy tracks in the terminal: one question per screen, large readable text, optional narration and dictation through external speech programs."
)]
pub struct Cli {
    /// open this track right away instead of the home screen
    #[clap(short = 't', long)]
    track: Option<String>,

    /// load tracks from a json file instead of the built-in catalog
    #[clap(short = 'c', long)]
    catalog: Option<PathBuf>,

    /// read and write settings at this path
    #[clap(long)]
    settings: Option<PathBuf>,

    /// print the available tracks and exit
    #[clap(short = 'l', long)]
    list: bool,

    /// turn narration off for this run
    #[clap(long)]
    no_narration: bool,

    /// turn dictation off for this run
    #[clap(long)]
    no_dictation: bool,

    /// color theme for this run
    #[clap(long, value_enum)]
    theme: Option<Theme>,

    /// text size for this run
    #[clap(long, value_enum)]
    text_size: Option<TextSize>,
}

impl Cli {
    fn load_catalog(&self) -> Result<TrackCatalog, CatalogError> {
        match &self.catalog {
            Some(path) => TrackCatalog::from_path(path),
            None => TrackCatalog::builtin(),
        }
    }

    fn settings_store(&self) -> FileSettingsStore {
        match &self.settings {
            Some(path) => FileSettingsStore::with_path(path),
            None => FileSettingsStore::new(),
        }
    }

    /// Command line flags win over stored settings
    fn apply_overrides(&self, settings: &mut Settings) {
        if self.no_narration {
            settings.voice_narration_enabled = false;
        }
        if self.no_dictation {
            settings.voice_dictation_enabled = false;
        }
        if let Some(theme) = self.theme {
            settings.theme = theme;
        }
        if let Some(size) = self.text_size {
            settings.text_size = size;
        }
    }
}

fn list_tracks(catalog: &TrackCatalog) -> String {
    catalog
        .tracks()
        .iter()
        .map(|track| {
            if track.locked {
                format!("{}\t{} (locked)", track.id, track.title)
            } else {
                format!("{}\t{} ({} steps)", track.id, track.title, track.steps.len())
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let catalog = match cli.load_catalog() {
        Ok(catalog) => catalog,
        Err(err) => Cli::command().error(ErrorKind::Io, err).exit(),
    };

    if cli.list {
        println!("{}", list_tracks(&catalog));
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(err) = logging::init(&AppDirs::log_path()) {
        eprintln!("logging disabled: {err}");
    }

    let store = cli.settings_store();
    let mut settings = store.load();
    cli.apply_overrides(&mut settings);
    info!(tracks = catalog.len(), settings = ?settings, "starting");

    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let speech = CommandSpeech::new(
        settings.narration_command.as_deref().and_then(CommandLine::parse),
        settings.dictation_command.as_deref().and_then(CommandLine::parse),
        runner.event_source().sender(),
    );

    let mut app = App::new(Arc::new(catalog), Box::new(speech), settings, Box::new(store));
    if let Some(track) = &cli.track {
        app.open_track(track);
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    if let Err(err) = &result {
        warn!(%err, "terminal loop failed");
    }
    result
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, FixedTicker>,
) -> Result<(), Box<dyn Error>> {
    let size = terminal.size()?;
    app.set_area(size.width, size.height);
    terminal.draw(|f| ui::draw(app, f))?;

    while !app.should_quit {
        let event = runner.step();
        let redraw = match &event {
            AppEvent::Resize => {
                let size = terminal.size()?;
                app.set_area(size.width, size.height);
                true
            }
            // idle ticks only repaint while confetti is falling
            AppEvent::Tick => app.celebration.is_active(),
            AppEvent::Key(_) | AppEvent::Dictation { .. } => true,
        };
        let was_celebrating = app.celebration.is_active();
        app.handle_event(event);

        if redraw || was_celebrating {
            terminal.draw(|f| ui::draw(app, f))?;
        }
    }

    info!("bye");
    Ok(())
}
