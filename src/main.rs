use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    layout::Rect,
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::Sender,
    time::Duration,
};
use tracing::{error, info};

use whackr::{
    app::{App, Control, Session},
    audio::{AudioSink, Silent, TerminalBell},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{CrosstermEventSource, FixedTicker, GameEvent, Runner, ThreadScheduler},
    session::GameSession,
    sinks::{BoardView, PendingNotice},
};

const TICK_RATE_MS: u64 = 100;

type TuiApp = App<Box<dyn AudioSink>, ThreadScheduler>;

/// whack-a-mole for the terminal: click the target before it moves
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A reaction game on a 3x3 grid. The target jumps to a random cell at a fixed interval; click it to score, click anywhere else to lose a life. The round ends when the clock or your lives run out."
)]
pub struct Cli {
    /// milliseconds between target moves
    #[clap(short = 'i', long)]
    interval_ms: Option<u64>,

    /// length of a round in seconds
    #[clap(short = 's', long)]
    secs: Option<u32>,

    /// number of misses allowed
    #[clap(short = 'l', long)]
    lives: Option<u32>,

    /// sound volume between 0.0 and 1.0
    #[clap(long)]
    volume: Option<f32>,

    /// disable sound
    #[clap(long)]
    mute: bool,

    /// seed for target placement, for reproducible rounds
    #[clap(long)]
    seed: Option<u64>,

    /// write the effective settings to the config file
    #[clap(long)]
    save_config: bool,

    /// debug-level logging to the log file
    #[clap(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    /// Flags override whatever the config file holds
    fn merge(&self, mut cfg: Config) -> Config {
        if let Some(ms) = self.interval_ms {
            cfg.relocation_interval_ms = ms;
        }
        if let Some(secs) = self.secs {
            cfg.session_secs = secs;
        }
        if let Some(lives) = self.lives {
            cfg.lives = lives;
        }
        if let Some(volume) = self.volume {
            cfg.volume = volume;
        }
        if self.mute {
            cfg.muted = true;
        }
        cfg
    }
}

fn new_app(config: &Config, seed: Option<u64>, tx: Sender<GameEvent>) -> TuiApp {
    let audio: Box<dyn AudioSink> = if config.muted {
        Box::new(Silent)
    } else {
        Box::new(TerminalBell::new(config.volume))
    };
    let scheduler = ThreadScheduler::new(tx);
    let session_config = config.session_config();

    let session: Session<Box<dyn AudioSink>, ThreadScheduler> = match seed {
        Some(seed) => GameSession::with_seed(
            session_config,
            BoardView::default(),
            audio,
            PendingNotice::default(),
            scheduler,
            seed,
        ),
        None => GameSession::new(
            session_config,
            BoardView::default(),
            audio,
            PendingNotice::default(),
            scheduler,
        ),
    };
    App::new(session)
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let store = FileConfigStore::new();
    let config = cli.merge(store.load());
    if let Err(e) = config.validate() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::ValueValidation, e).exit();
    }
    if cli.save_config {
        store.save(&config)?;
        info!(path = %store.path().display(), "config saved");
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &config, cli.seed);
    if let Err(e) = &result {
        error!(error = %e, "tui loop failed");
    }

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    config: &Config,
    seed: Option<u64>,
) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );
    let mut app = new_app(config, seed, runner.sender());
    let mut area: Rect = terminal.draw(|f| f.render_widget(&app, f.area()))?.area;

    loop {
        match app.handle(runner.step(), area) {
            Control::Continue => {}
            Control::Restart => {
                info!("new round");
                app = new_app(config, seed, runner.sender());
            }
            Control::Quit => break,
        }
        area = terminal.draw(|f| f.render_widget(&app, f.area()))?.area;
    }

    Ok(())
}
