// hopmap - live terminal map of network hosts and the hops between them

mod app;
mod capture;
mod error;
mod net;
mod theme;
mod topology;
mod ui;

use anyhow::{Context, Result};
use app::{event::handle_key_event, AppState};
use capture::{
    host_devices, load_devices, Collaborator, DomainResolver, HostsTable, ReplayCapture,
    SocketTableCapture,
};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use topology::DomainCache;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "hopmap", version, about = "Live terminal map of network hosts and hops")]
struct Args {
    /// Replay packets from a file ("src dst" or JSON per line) instead of live sockets
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Delay between replayed packets
    #[arg(long, default_value_t = app::config::DEFAULT_REPLAY_INTERVAL_MS)]
    replay_interval_ms: u64,

    /// JSON file describing the capture devices (replay mode)
    #[arg(long)]
    devices: Option<PathBuf>,

    /// Device to select at startup
    #[arg(long)]
    device: Option<String>,

    /// Socket table poll interval
    #[arg(long, default_value_t = app::config::DEFAULT_POLL_MS)]
    poll_ms: u64,

    /// Directory for the log file (default: system temp dir)
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Show domain labels from the start
    #[arg(long)]
    domain_labels: bool,

    /// Hosts file used for domain lookups
    #[arg(long, default_value = capture::DEFAULT_HOSTS_PATH)]
    hosts: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let log_dir = args.log_dir.clone().unwrap_or_else(std::env::temp_dir);
    let _log_guard = init_logging(&log_dir);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to start the async runtime")?;

    let (collaborator, resolver) = wire(&args)?;
    let domains = Arc::new(DomainCache::new(resolver));
    let mut app = AppState::new(runtime.handle().clone(), collaborator, domains);

    if let Some(name) = &args.device {
        app.select_device(name)
            .with_context(|| format!("cannot select device {}", name))?;
    }
    if args.domain_labels {
        app.set_domain_labels(true);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let res = run_app(&mut terminal, &mut app);
    app.stop_capture();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }
    info!("hopmap exiting");
    Ok(())
}

/// Log to a daily file; the terminal belongs to the UI
fn init_logging(dir: &Path) -> WorkerGuard {
    let appender = tracing_appender::rolling::daily(dir, "hopmap.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,hopmap=debug")))
        .with(tracing_subscriber::fmt::layer().with_writer(writer).with_ansi(false))
        .init();

    guard
}

/// Pick the packet source: a replay file when given, live sockets otherwise
fn wire(args: &Args) -> Result<(Arc<dyn Collaborator>, Arc<dyn DomainResolver>)> {
    let hosts = HostsTable::load(&args.hosts)
        .with_context(|| format!("cannot read hosts file {}", args.hosts.display()))?;
    info!(entries = hosts.len(), path = %args.hosts.display(), "Hosts table loaded");

    if let Some(path) = &args.replay {
        let devices = match &args.devices {
            Some(file) => load_devices(file)
                .with_context(|| format!("cannot load devices from {}", file.display()))?,
            None => host_devices(),
        };
        if devices.is_empty() {
            warn!("Replay has no devices to select");
        }
        let replay = Arc::new(ReplayCapture::new(
            path.clone(),
            Duration::from_millis(args.replay_interval_ms),
            devices,
            hosts,
        ));
        info!(path = %path.display(), "Replay capture configured");
        let collaborator: Arc<dyn Collaborator> = replay.clone();
        let resolver: Arc<dyn DomainResolver> = replay;
        return Ok((collaborator, resolver));
    }

    let live = Arc::new(SocketTableCapture::new(hosts, Duration::from_millis(args.poll_ms)));
    info!(poll_ms = args.poll_ms, "Socket table capture configured");
    let collaborator: Arc<dyn Collaborator> = live.clone();
    let resolver: Arc<dyn DomainResolver> = live;
    Ok((collaborator, resolver))
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut AppState) -> Result<()> {
    loop {
        app.on_tick();
        terminal.draw(|f| ui::draw(f, app))?;

        if !app.running {
            return Ok(());
        }

        if event::poll(app.refresh_config.ui_interval())? {
            if let Event::Key(key) = event::read()? {
                handle_key_event(app, key.code);
            }
        }
    }
}
