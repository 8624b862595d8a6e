mod config;
mod keys;
mod tui;

use std::io;
use std::net::SocketAddr;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute};

use config::PeerConfig;
use dungeon::{
    FixedTimestep, InputState, PlayerClass, RenderFrame, Session, SessionEvent, SessionLoop,
    SessionPhase, Transport, UdpTransport,
};
use keys::KeyLatch;
use tui::TuiRenderer;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ClassArg {
    Warrior,
    Mage,
}

impl From<ClassArg> for PlayerClass {
    fn from(class: ClassArg) -> Self {
        match class {
            ClassArg::Warrior => PlayerClass::Warrior,
            ClassArg::Mage => PlayerClass::Mage,
        }
    }
}

#[derive(Parser)]
#[command(name = "dungeon-peer")]
#[command(about = "Two-player dungeon crawler peer")]
struct Args {
    /// Host a session, listening on this address. The host owns the world.
    #[arg(long, value_name = "BIND", conflicts_with = "join", required_unless_present = "join")]
    host: Option<String>,

    /// Join the session hosted at this address.
    #[arg(long, value_name = "ADDR")]
    join: Option<SocketAddr>,

    /// Local address when joining.
    #[arg(long, default_value = "0.0.0.0:0")]
    bind: String,

    #[arg(short, long, value_enum, default_value_t = ClassArg::Warrior)]
    class: ClassArg,

    /// Map seed (host only). Random when omitted.
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long, default_value_t = dungeon::DEFAULT_TICK_RATE)]
    tick_rate: u32,

    /// Log to stderr instead of drawing the terminal UI.
    #[arg(long)]
    headless: bool,

    /// Stop after this many ticks.
    #[arg(long)]
    ticks: Option<u64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = PeerConfig::from_args(&args);

    let transport = match (&args.host, args.join) {
        (Some(bind), _) => UdpTransport::host(bind.as_str())
            .with_context(|| format!("binding host socket on {}", bind))?,
        (None, Some(remote)) => UdpTransport::join(args.bind.as_str(), remote)
            .with_context(|| format!("binding {} to join {}", args.bind, remote))?,
        (None, None) => anyhow::bail!("either --host or --join is required"),
    };

    let session = Session::new(config.game.clone(), transport.is_host(), config.class)
        .context("invalid session configuration")?;
    let mut session_loop = SessionLoop::new(session, transport);

    if args.headless {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        log::info!(
            "Peer on {} as {} ({})",
            session_loop.transport().local_addr(),
            if config.host { "host" } else { "joiner" },
            config.class.name()
        );
        run_headless(&mut session_loop, &config);
        log::info!("Peer shutting down");
    } else {
        run_with_tui(&mut session_loop, &config)?;
    }

    session_loop.transport_mut().close();
    Ok(())
}

fn log_events(session_loop: &mut SessionLoop<UdpTransport>) {
    for event in session_loop.drain_events() {
        match event {
            SessionEvent::PhaseChanged(SessionPhase::InitPending) => {
                if let Some(peer) = session_loop.transport().remote_addr() {
                    log::info!("Connected to {}", peer);
                }
            }
            SessionEvent::PeerLost { was_authority } => {
                let role = if was_authority { "host" } else { "joiner" };
                log::warn!("Lost the {}", role);
            }
            SessionEvent::InitRejected(e) => log::error!("World from host rejected: {}", e),
            other => log::debug!("{:?}", other),
        }
    }
}

fn run_headless(session_loop: &mut SessionLoop<UdpTransport>, config: &PeerConfig) {
    let mut timestep = FixedTimestep::new(config.game.tick_rate);
    let mut last = Instant::now();
    let mut ticks = 0u64;
    let status_every = u64::from(config.game.tick_rate);

    loop {
        let now = Instant::now();
        timestep.accumulate(now - last);
        last = now;

        while timestep.consume_tick() {
            session_loop.tick(InputState::empty(), &mut |_: &RenderFrame<'_>| {});
            log_events(session_loop);
            ticks += 1;

            if ticks % status_every == 0 {
                let session = session_loop.session();
                let stats = session_loop.transport().stats();
                let enemies = session.world().map_or(0, |w| w.enemies.len());
                log::info!(
                    "tick {} | {} | hp {}/{} | enemies {} | sent {} recv {}",
                    session.tick(),
                    session.phase().name(),
                    session.local_player().body.hp,
                    session.local_player().body.max_hp,
                    enemies,
                    stats.packets_sent,
                    stats.packets_received
                );
            }
            if config.max_ticks.is_some_and(|max| ticks >= max) {
                return;
            }
        }

        thread::sleep(timestep.time_until_tick());
    }
}

fn run_with_tui(session_loop: &mut SessionLoop<UdpTransport>, config: &PeerConfig) -> Result<()> {
    terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, cursor::Hide)?;

    let mut renderer = TuiRenderer::new(stdout)?;
    let result = tui_loop(session_loop, config, &mut renderer);

    terminal::disable_raw_mode()?;
    execute!(renderer.backend_mut(), LeaveAlternateScreen, cursor::Show)?;

    result
}

fn tui_loop(
    session_loop: &mut SessionLoop<UdpTransport>,
    config: &PeerConfig,
    renderer: &mut TuiRenderer,
) -> Result<()> {
    let mut timestep = FixedTimestep::new(config.game.tick_rate);
    let mut keys = KeyLatch::new();
    let mut last = Instant::now();
    let mut ticks = 0u64;

    let role = if config.host { "host" } else { "joiner" };
    renderer.state_mut().log_info(format!(
        "Listening on {} as {}",
        session_loop.transport().local_addr(),
        role
    ));

    loop {
        let wait = timestep.time_until_tick();
        if event::poll(wait)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                        return Ok(());
                    }
                    keys.press(key.code);
                }
            }
        }

        let now = Instant::now();
        timestep.accumulate(now - last);
        last = now;

        while timestep.consume_tick() {
            renderer.state_mut().network = session_loop.transport().stats();
            session_loop.tick(keys.sample(now), renderer);
            renderer.take_error()?;

            for event in session_loop.drain_events() {
                if event == SessionEvent::PhaseChanged(SessionPhase::InitPending) {
                    if let Some(peer) = session_loop.transport().remote_addr() {
                        renderer.state_mut().log_info(format!("Connected to {}", peer));
                    }
                }
                renderer.state_mut().record(&event);
            }

            ticks += 1;
            if config.max_ticks.is_some_and(|max| ticks >= max) {
                return Ok(());
            }
        }
    }
}
