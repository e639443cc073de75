use clap::Parser;
use ringview::collection::{ImageRecord, ImageRing, collect_images};
use ringview::commands::Command;
use ringview::config::{self, ViewerConfig};
use ringview::imaging::{Dimensions, PixelBuffer, RustBackend, ScaleMode};
use ringview::output;
use ringview::session::{DisplayMode, Flow, Navigation, Presenter, Session, ViewSettings};
use ringview::slideshow::{DeadlineScheduler, Slideshow};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ringview", version)]
#[command(about = "Keyboard-driven image viewer")]
#[command(long_about = "\
Keyboard-driven image viewer

Shows each image in turn and reads one command per line from stdin.
Directories given on the command line contribute their image files,
sorted by name.

Keys (press Enter after each):
  Enter, n      next image            -, b     previous image
  h             first image           q        quit
  r / l / u     rotate right/left/180 d        delete file (asks first)
  f / F         fullscreen / fullsize p        presentation mode
  + / /         zoom in / out         i        image info
  0-9           toggle note list      c TEXT   set comment
  s N           slideshow every N seconds (s 0 stops)

At exit, note lists and comments are printed to stdout.

Run 'ringview --print-config' for a documented config.toml.")]
struct Cli {
    /// Image files or directories
    #[arg(required_unless_present = "print_config")]
    paths: Vec<PathBuf>,

    /// Config file (default: ringview/config.toml in the user config directory)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Advance automatically every SECONDS
    #[arg(short, long, value_name = "SECONDS", value_parser = parse_delay)]
    slideshow: Option<Duration>,

    /// Start in presentation mode
    #[arg(short, long)]
    presentation: bool,

    /// Scale mode: normal, fullsize, img-ratio, screen-ratio, fullscreen
    #[arg(long, value_name = "MODE")]
    mode: Option<ScaleMode>,

    /// Monitor size used to fit images, e.g. 2560x1440
    #[arg(long, value_name = "WxH")]
    screen: Option<Dimensions>,

    /// Log debug detail to stderr
    #[arg(short, long)]
    debug: bool,

    /// Print a stock config.toml with all options documented
    #[arg(long)]
    print_config: bool,
}

fn parse_delay(s: &str) -> Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|_| format!("not a number: '{s}'"))?;
    if !secs.is_finite() || secs < 0.0 {
        return Err(format!("must be zero or more seconds, got '{s}'"));
    }
    Ok(Duration::from_secs_f64(secs))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    if cli.print_config {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let config = load_config(&cli)?;
    let mut view = config.view_settings();
    if let Some(mode) = cli.mode {
        view.scale_mode = mode;
    }
    if cli.presentation {
        view.display_mode = DisplayMode::Presentation;
    }
    let delay = cli.slideshow.unwrap_or_else(|| config.slideshow_delay());
    let screen = cli.screen.unwrap_or_else(|| config.screen_size());

    let images = collect_images(&cli.paths);
    tracing::debug!(count = images.len(), %screen, "collected images");
    let ring = ImageRing::from_paths(images);

    let presenter = TerminalPresenter::new(screen, spawn_stdin_reader());
    let slideshow = Slideshow::new(DeadlineScheduler::new(), delay);
    let mut session = Session::new(ring, view, RustBackend::new(), presenter, slideshow);

    if session.next_image()? == Navigation::Exhausted {
        eprintln!("ringview: no loadable images");
        std::process::exit(1);
    }

    run(&mut session);
    output::print_summary(session.ring());
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ViewerConfig, config::ConfigError> {
    match (&cli.config, config::default_config_dir()) {
        (Some(path), _) => config::load_config_file(path),
        (None, Some(dir)) => config::load_config(&dir),
        (None, None) => config::resolve_config(config::stock_defaults_value(), None),
    }
}

type TerminalSession = Session<RustBackend, TerminalPresenter, DeadlineScheduler>;

/// Read commands until the user quits, stdin closes, or no images are left.
fn run(session: &mut TerminalSession) {
    loop {
        let wait = session
            .slideshow()
            .scheduler()
            .time_remaining(Instant::now());
        let outcome = match session.presenter().next_input(wait) {
            Input::Closed => break,
            Input::Timeout => {
                if !session.slideshow_mut().scheduler_mut().take_due(Instant::now()) {
                    continue;
                }
                session.on_timer()
            }
            Input::Line(line) => match line.parse::<Command>() {
                Ok(command) => session.execute(&command),
                Err(err) => {
                    eprintln!("{err}");
                    continue;
                }
            },
        };
        match outcome {
            Ok(Flow::Continue) => {}
            Ok(Flow::Ended) => break,
            Err(err) => tracing::warn!(%err, "command failed"),
        }
    }
}

// =========================================================================
// Terminal front end
// =========================================================================

enum Input {
    Line(String),
    Timeout,
    Closed,
}

fn spawn_stdin_reader() -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Presenter for a plain terminal: the "window" is a title line on stdout,
/// questions and commands come in as lines on stdin.
struct TerminalPresenter {
    screen: Dimensions,
    lines: Receiver<String>,
}

impl TerminalPresenter {
    fn new(screen: Dimensions, lines: Receiver<String>) -> Self {
        Self { screen, lines }
    }

    /// Wait for a line, at most `wait` if given.
    fn next_input(&self, wait: Option<Duration>) -> Input {
        match wait {
            Some(wait) => match self.lines.recv_timeout(wait) {
                Ok(line) => Input::Line(line),
                Err(RecvTimeoutError::Timeout) => Input::Timeout,
                Err(RecvTimeoutError::Disconnected) => Input::Closed,
            },
            None => self.lines.recv().map_or(Input::Closed, Input::Line),
        }
    }
}

impl Presenter for TerminalPresenter {
    fn monitor_size(&self) -> Dimensions {
        self.screen
    }

    fn window_size(&self) -> Dimensions {
        self.screen
    }

    fn on_buffer_ready(&mut self, _buffer: &PixelBuffer, record: &ImageRecord, view: &ViewSettings) {
        println!("{}", output::format_title(record, view));
    }

    fn prompt_user(&mut self, message: &str, affirmative: &str, _negative: &str) -> bool {
        print!("{message} ");
        std::io::stdout().flush().ok();
        self.lines
            .recv()
            .ok()
            .and_then(|answer| answer.trim().chars().next())
            .is_some_and(|key| affirmative.contains(key))
    }

    fn warn(&mut self, message: &str) {
        eprintln!("{message}");
    }

    fn show_info(&mut self, record: &ImageRecord, position: usize, total: usize, view: &ViewSettings) {
        output::print_info(record, position, total, view);
    }
}
