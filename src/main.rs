use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use voicekey::commands::{CommandDispatcher, CommandExecutor, CommandRegistry, Dispatch};
use voicekey::config::{Config, ConsoleOutput, ExecutionMode};
use voicekey::driver::{TickDriver, WorkerDriver, command_queue};
use voicekey::host::{ConsoleSink, LogConsole, LogEquip, NoFocus, StdoutConsole, WindowFocus};
use voicekey::input::{
    CancelToken, ClockPacer, InputBackend, InputEvent, Injector, KeyNameResolver, LogBackend, Pacer,
    PressScheduler, RecordingBackend, VirtualPacer,
};
use voicekey::ipc::{FavoriteEntry, IpcTransport};
use voicekey::session::HostSession;
use voicekey::worker::SpeechWorker;

#[derive(Parser)]
#[command(name = "voicekey", version, about = "Run voice commands as timed keyboard and mouse input")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the speech worker and execute the commands it sends
    Run {
        /// Config file (defaults to ./voicekey.toml if present)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override the configured execution mode
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Execute a `;`-separated command script locally
    Exec {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Record events on a virtual clock instead of injecting them
        #[arg(long)]
        dry_run: bool,
        #[arg(required = true)]
        command: Vec<String>,
    },
    /// List key names and their scan codes
    Keys,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Worker,
    Tick,
}

impl From<ModeArg> for ExecutionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Worker => ExecutionMode::Worker,
            ModeArg::Tick => ExecutionMode::Tick,
        }
    }
}

#[hotpath::main]
fn main() -> anyhow::Result<()> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Run { config, mode } => {
            let mut config = load_config(config.as_deref())?;
            init_tracing(&config.logging.filter);
            if let Some(mode) = mode {
                config.executor.mode = mode.into();
            }
            run(config).await
        }
        Command::Exec {
            config,
            dry_run,
            command,
        } => {
            let config = load_config(config.as_deref())?;
            init_tracing(&config.logging.filter);
            exec(&config, &command.join(" "), dry_run);
            Ok(())
        }
        Command::Keys => {
            for (name, code) in KeyNameResolver::new().key_names() {
                println!("{:<20} {}", name, code);
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.context("loading configuration")
}

fn init_tracing(filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// OS injection when built with `inject`, otherwise log only
fn input_backend() -> Box<dyn InputBackend> {
    #[cfg(feature = "inject")]
    {
        match voicekey::input::EnigoBackend::new() {
            Ok(backend) => return Box::new(backend),
            Err(e) => warn!("{}, falling back to logging input", e),
        }
    }
    Box::new(LogBackend)
}

fn window_focus() -> Arc<dyn WindowFocus> {
    #[cfg(target_os = "linux")]
    {
        use voicekey::host::{SysinfoLookup, XdotoolFocus};
        Arc::new(XdotoolFocus::new(Box::new(SysinfoLookup)))
    }
    #[cfg(not(target_os = "linux"))]
    {
        Arc::new(NoFocus)
    }
}

fn build_executor(config: &Config, pacer: Arc<dyn Pacer>, backend: Box<dyn InputBackend>, focus: Arc<dyn WindowFocus>) -> CommandExecutor {
    let scheduler = PressScheduler::new(
        Arc::new(KeyNameResolver::new()),
        Injector::new(backend),
        pacer,
        config.executor.default_press_ms,
    );
    CommandExecutor::new(scheduler, focus, config.window.default_target.clone())
}

fn exec(config: &Config, script: &str, dry_run: bool) {
    let dispatcher = CommandDispatcher::new(Arc::new(CommandRegistry::standard()));

    let (pacer, recorder): (Arc<dyn Pacer>, Option<RecordingBackend>) = if dry_run {
        let pacer: Arc<dyn Pacer> = Arc::new(VirtualPacer::new());
        let recorder = RecordingBackend::new(pacer.clone());
        (pacer, Some(recorder))
    } else {
        (Arc::new(ClockPacer::new(CancelToken::new())), None)
    };

    let backend: Box<dyn InputBackend> = match &recorder {
        Some(recorder) => Box::new(recorder.clone()),
        None => input_backend(),
    };
    let focus: Arc<dyn WindowFocus> = if dry_run { Arc::new(NoFocus) } else { window_focus() };
    let mut executor = build_executor(config, pacer, backend, focus);

    for command in script.split(';').map(str::trim).filter(|c| !c.is_empty()) {
        match dispatcher.dispatch(command) {
            Dispatch::Handled(invocation) => executor.execute(&invocation),
            Dispatch::NotCustom => println!("console: {}", command),
        }
    }

    if let Some(recorder) = recorder {
        for event in recorder.events() {
            let what = match event.event {
                InputEvent::Key(code, direction) => format!("key {} {:?}", code, direction),
                InputEvent::Mouse(kind) => format!("mouse {:?}", kind),
            };
            println!("{:>6}ms  {}", event.at.as_millis(), what);
        }
    }
}

async fn run(config: Config) -> anyhow::Result<()> {
    let running = Arc::new(AtomicBool::new(true));
    let token = CancelToken::new();
    let r = running.clone();
    let t = token.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
        t.cancel();
    })?;

    let (worker, pipes) = SpeechWorker::spawn(&config.speech)?;
    let transport = Arc::new(IpcTransport::new(Box::new(pipes.stdin)));
    let reader = transport
        .spawn_reader(pipes.stdout, config.speech.line_settings())
        .context("starting response reader")?;

    let dispatcher = CommandDispatcher::new(Arc::new(CommandRegistry::standard()));
    let (queue, rx) = command_queue(dispatcher, config.executor.queue_capacity);

    let console: Arc<dyn ConsoleSink> = match config.console.output {
        ConsoleOutput::Log => Arc::new(LogConsole),
        ConsoleOutput::Stdout => Arc::new(StdoutConsole),
    };
    let session = HostSession::new(transport.clone(), queue, console, Arc::new(LogEquip));

    let pacer: Arc<dyn Pacer> = Arc::new(ClockPacer::new(token.clone()));
    let config = Arc::new(config);

    let (worker_driver, mut tick_driver) = match config.executor.mode {
        ExecutionMode::Worker => {
            let config = config.clone();
            let pacer = pacer.clone();
            let driver = WorkerDriver::spawn(rx, running.clone(), move || {
                build_executor(&config, pacer, input_backend(), window_focus())
            })
            .context("starting command executor")?;
            (Some(driver), None)
        }
        ExecutionMode::Tick => {
            let executor = build_executor(&config, pacer.clone(), input_backend(), window_focus());
            (None, Some(TickDriver::new(rx, executor)))
        }
    };
    info!(mode = ?config.executor.mode, pid = worker.id(), "voicekey running");

    // Host console stand-in
    let (input_tx, input_rx) = flume::unbounded::<String>();
    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if input_tx.send(line.trim().to_string()).is_err() {
                break;
            }
        }
    });

    let mut interval = tokio::time::interval(Duration::from_millis(config.executor.tick_interval_ms.max(1)));

    while running.load(Ordering::SeqCst) {
        tokio::select! {
            biased;

            Ok(line) = input_rx.recv_async() => {
                shell_line(&transport, &line);
            }

            _ = interval.tick() => {
                session.tick();
                if let Some(driver) = tick_driver.as_mut() {
                    tokio::task::block_in_place(|| driver.drain_one());
                }
                if reader.is_finished() {
                    warn!("speech worker channel closed");
                    break;
                }
            }
        }
    }

    info!("shutting down");
    running.store(false, Ordering::SeqCst);
    token.cancel();

    // Closing the pipe tells the worker to exit
    drop(session);
    drop(transport);
    worker.shutdown();

    if let Some(driver) = worker_driver {
        driver.join();
    }
    Ok(())
}

fn shell_line(transport: &IpcTransport, line: &str) {
    let result = if let Some(topics) = line.strip_prefix(":dialogue") {
        let lines: Vec<String> = topics
            .split('|')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(String::from)
            .collect();
        transport.start_dialogue(&lines).map(|_| ())
    } else if line == ":close" {
        transport.stop_dialogue()
    } else if let Some(entries) = line.strip_prefix(":favorites") {
        let mut favorites = Vec::new();
        for text in entries.split('|').map(str::trim).filter(|e| !e.is_empty()) {
            match FavoriteEntry::parse(text) {
                Some(entry) => favorites.push(entry),
                None => warn!(entry = text, "skipping malformed favorite"),
            }
        }
        transport.send_favorites(favorites)
    } else if let Some(raw) = line.strip_prefix(":send ") {
        transport.write_line(raw)
    } else {
        if !line.is_empty() {
            transport.inbox().push_command(line.to_string());
        }
        Ok(())
    };

    if let Err(e) = result {
        warn!("host command failed: {}", e);
    }
}
