use anyhow::Context;
use clap::{Parser, Subcommand};
use rigplay_control::PdController;
use rigplay_input::{Command, Keymap};
use rigplay_kernel::{ArticulatedWorld, World};
use rigplay_render::{DebugTextRenderer, HudRenderer, RenderView, Renderer};
use rigplay_session::{CommandOutcome, SceneSpec, Session, SessionConfig};
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "rigplay", about = "Simulate, bake and play back an articulated scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Scene description (JSON). Uses the built-in demo scene when absent.
    #[arg(long, global = true)]
    scene: Option<PathBuf>,

    /// Wall-clock period of one tick, in milliseconds
    #[arg(long, default_value = "30")]
    period_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version, scene layout and key bindings
    Info,
    /// Print the built-in demo scene as JSON
    Scene,
    /// Feed a key sequence to a session without waiting on the clock
    Script {
        /// Keys to press, in order (e.g. " pp]")
        #[arg(short, long)]
        keys: String,
        /// Ticks to run after each key while the driver is armed
        #[arg(short, long, default_value = "10")]
        ticks_per_key: usize,
        /// Print the display state as JSON instead of HUD text
        #[arg(long, conflicts_with = "debug")]
        json: bool,
        /// Print the full debug dump (mode, time, camera, HUD) after each key
        #[arg(long)]
        debug: bool,
    },
    /// Interactive session: type keys followed by enter
    Run,
}

type DemoSession = Session<ArticulatedWorld, PdController>;

/// How `script` reports the state after each key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptOutput {
    Hud,
    Json,
    Debug,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let period = Duration::from_millis(cli.period_ms);

    match cli.command {
        Commands::Info => {
            let spec = load_scene(cli.scene.as_deref())?;
            let session = open_session(&spec, period)?;
            let world = session.world();
            println!("rigplay v{}", env!("CARGO_PKG_VERSION"));
            for body in world.layout().bodies() {
                println!(
                    "  {}: {} ({} DOFs)",
                    body,
                    world.body_name(body).unwrap_or("?"),
                    world.layout().count(body)?
                );
            }
            println!("total DOFs: {}", world.layout().total());
            println!("timestep: {} s", world.timestep());
            println!("steps per tick: {}", session.steps_per_tick());
            println!(
                "trajectory: {}",
                if session.controller().has_trajectory() {
                    "tracking"
                } else {
                    "none"
                }
            );
            print!("{}", Keymap::new().help());
        }
        Commands::Scene => {
            println!("{}", serde_json::to_string_pretty(&SceneSpec::demo())?);
        }
        Commands::Script {
            keys,
            ticks_per_key,
            json,
            debug,
        } => {
            let output = match (json, debug) {
                (true, _) => ScriptOutput::Json,
                (_, true) => ScriptOutput::Debug,
                _ => ScriptOutput::Hud,
            };
            let spec = load_scene(cli.scene.as_deref())?;
            let mut session = open_session(&spec, period)?;
            run_script(&mut session, &keys, ticks_per_key, output)?;
        }
        Commands::Run => {
            let spec = load_scene(cli.scene.as_deref())?;
            let session = open_session(&spec, period)?;
            run_interactive(session, period)?;
        }
    }

    Ok(())
}

fn load_scene(path: Option<&std::path::Path>) -> anyhow::Result<SceneSpec> {
    match path {
        Some(path) => {
            SceneSpec::load(path).with_context(|| format!("loading {}", path.display()))
        }
        None => Ok(SceneSpec::demo()),
    }
}

fn open_session(spec: &SceneSpec, period: Duration) -> anyhow::Result<DemoSession> {
    let scene = spec.build(&spec.planner())?;
    if let Some(duration) = scene.trajectory_duration {
        tracing::info!(duration, "startup motion planned");
    }
    let config = SessionConfig {
        tick_period: period,
        controlled_body: scene.controlled_body,
        ..SessionConfig::default()
    };
    Ok(Session::new(scene.world, scene.controller, config)?)
}

fn run_script(
    session: &mut DemoSession,
    keys: &str,
    ticks_per_key: usize,
    output: ScriptOutput,
) -> anyhow::Result<()> {
    let keymap = Keymap::new();
    let hud = HudRenderer::new();
    let debug = DebugTextRenderer::new();
    let view = RenderView::default();

    for key in keys.chars() {
        let Some(command) = keymap.lookup(key) else {
            tracing::warn!(?key, "unbound key skipped");
            continue;
        };
        let outcome = session.apply(command)?;
        tracing::debug!(%command, ?outcome, "applied");
        if outcome == CommandOutcome::Quit {
            break;
        }
        let ticks = session.run_ticks(ticks_per_key).context("session terminated")?;

        let state = session.display_state();
        match output {
            ScriptOutput::Json => println!("{}", serde_json::to_string(&state)?),
            ScriptOutput::Debug => {
                println!("[{command}] ticks={ticks}");
                print!("{}", debug.render(&state, &view));
            }
            ScriptOutput::Hud => {
                println!("[{command}] ticks={ticks}");
                print!("{}", hud.render(&state, &view));
            }
        }
    }
    Ok(())
}

/// Paces the driver like a one-shot timer re-armed after every tick: the
/// first tick fires one period after the driver arms, the next one period
/// after that.
#[derive(Debug)]
struct TickTimer {
    period: Duration,
    next: Option<Instant>,
}

impl TickTimer {
    fn new(period: Duration) -> Self {
        Self { period, next: None }
    }

    /// Whether a tick is due at `now`. Disarming cancels the pending tick.
    fn due(&mut self, armed: bool, now: Instant) -> bool {
        if !armed {
            self.next = None;
            return false;
        }
        match self.next {
            None => {
                self.next = Some(now + self.period);
                false
            }
            Some(at) if now >= at => {
                self.next = Some(now + self.period);
                true
            }
            Some(_) => false,
        }
    }
}

/// Read lines from stdin on a helper thread and forward each character.
fn spawn_key_reader() -> Receiver<char> {
    let (tx, rx) = mpsc::channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            // An empty line is a bare enter; treat it as space so pausing is one keystroke.
            let keys = if line.is_empty() { " ".to_string() } else { line };
            for key in keys.chars() {
                if tx.send(key).is_err() {
                    return;
                }
            }
        }
    });
    rx
}

fn run_interactive(mut session: DemoSession, period: Duration) -> anyhow::Result<()> {
    let keymap = Keymap::new();
    let hud = HudRenderer::new();
    let view = RenderView::default();
    let keys = spawn_key_reader();
    let mut timer = TickTimer::new(period);
    // Poll keys more often than the tick period so input stays responsive.
    let poll = period.min(Duration::from_millis(10));

    println!("Keys (type, then enter):");
    print!("{}", keymap.help());

    let mut stdout = std::io::stdout();
    loop {
        let started = Instant::now();

        loop {
            match keys.try_recv() {
                Ok(key) => {
                    if let Some(command) = keymap.lookup(key) {
                        session.apply(command)?;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    session.apply(Command::Quit)?;
                    break;
                }
            }
        }
        if session.should_quit() {
            break;
        }

        if timer.due(session.is_driver_armed(), Instant::now()) {
            session.tick().context("session terminated")?;
        }

        if session.take_redraw() {
            let frame = hud.render(&session.display_state(), &view);
            write!(
                stdout,
                "\r{:<10} {:<18} {:<18} contacts={}   ",
                frame.label,
                frame.sim_frame,
                frame.play_frame,
                frame.markers.len()
            )?;
            stdout.flush()?;
        }

        if let Some(rest) = poll.checked_sub(started.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    writeln!(stdout)?;
    tracing::info!(
        frames = session.history().len(),
        sim_frame = session.sim_frame(),
        "session ended"
    );
    Ok(())
}
