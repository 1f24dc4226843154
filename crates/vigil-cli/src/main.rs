mod console;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use vigil_engine::catalog::{BACKENDS, MODELS};
use vigil_engine::sim::{SimConfig, SimEngine};
use vigil_engine::{AssetSource, DetectionEngine};
use vigil_proto::event::{SurfaceHandle, UiEvent};
use vigil_proto::{DetectMode, Facing};
use vigil_session::Session;
use vigil_settings::doctor::{check_store, Limits};
use vigil_settings::{FileStore, SettingKey, SettingsStore};

use console::{ConsolePresenter, Msg, ScriptPermissions};

#[derive(Debug, Parser)]
#[command(name = "vigil", version, about = "vigil - camera/inference session controller")]
struct Cli {
    #[arg(long, default_value = "vigil.toml")]
    config: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    Doctor,
    /// List bundled models and compute backends.
    Models,
    Settings { #[command(subcommand)] cmd: SettingsCmd },
    /// Start a session and replay UI events (one JSON object per line).
    Run {
        #[arg(long)]
        script: String,
    },
}

#[derive(Debug, Subcommand)]
enum SettingsCmd {
    Show,
    Reset,
    Set { key: String, value: i32 },
}

#[derive(Debug, serde::Deserialize)]
struct Config {
    settings: SettingsCfg,
    engine: EngineCfg,
    #[serde(default)]
    permission: PermissionCfg,
    surface: Option<SurfaceCfg>,
}

#[derive(Debug, serde::Deserialize)]
struct SettingsCfg { path: String }

#[derive(Debug, serde::Deserialize)]
struct EngineCfg {
    kind: String, // "sim" | "native"
    asset_root: Option<String>,
    #[serde(default = "yes")]
    gpu_available: bool,
    #[serde(default)]
    unavailable_facings: Vec<Facing>,
    #[serde(default = "yes")]
    reset_on_load: bool,
}

#[derive(Debug, serde::Deserialize)]
struct PermissionCfg {
    #[serde(default = "yes")]
    granted: bool,
    #[serde(default = "yes")]
    grant_on_request: bool,
}

impl Default for PermissionCfg {
    fn default() -> Self {
        Self { granted: true, grant_on_request: true }
    }
}

#[derive(Debug, serde::Deserialize)]
struct SurfaceCfg { width: u32, height: u32, format: i32 }

fn yes() -> bool { true }

fn load_config(path: &str) -> Result<Config> {
    let s = std::fs::read_to_string(path).context("read config")?;
    toml::from_str(&s).context("parse config toml")
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    if matches!(cli.cmd, Command::Models) {
        models();
        return Ok(());
    }
    let cfg = load_config(&cli.config)?;

    match cli.cmd {
        Command::Doctor => doctor(&cfg)?,
        Command::Models => models(),
        Command::Settings { cmd } => settings_cmd(&cfg, cmd)?,
        Command::Run { script } => run(&cfg, &script).await?,
    }
    Ok(())
}

fn limits() -> Limits {
    Limits {
        models: MODELS.len() as u32,
        backends: BACKENDS.len() as u32,
        detect_modes: DetectMode::ALL.len() as u32,
    }
}

fn assets(cfg: &Config) -> AssetSource {
    match &cfg.engine.asset_root {
        Some(root) => AssetSource::dir(root),
        None => AssetSource::bundled(),
    }
}

fn doctor(cfg: &Config) -> Result<()> {
    info!("doctor: starting");

    anyhow::ensure!(
        matches!(cfg.engine.kind.as_str(), "sim" | "native"),
        "unknown engine.kind: {}",
        cfg.engine.kind
    );

    let store = FileStore::open(&cfg.settings.path).context("open settings")?;
    check_store(&store, limits()).context("stored settings")?;

    let assets = assets(cfg);
    if assets.root().is_some() {
        let missing: Vec<String> = MODELS
            .iter()
            .flat_map(|m| assets.missing_files(m))
            .map(|p| p.display().to_string())
            .collect();
        anyhow::ensure!(missing.is_empty(), "model assets missing: {}", missing.join(", "));
    } else {
        info!("doctor: no engine.asset_root, assets are bundled with the engine");
    }

    if !cfg.engine.gpu_available {
        warn!("doctor: gpu backend will fail to load (engine.gpu_available=false)");
    }

    info!("doctor: OK");
    Ok(())
}

fn models() {
    for (i, m) in MODELS.iter().enumerate() {
        println!("model {}: {} target={} files={},{}", i, m.name, m.target_size, m.param_file(), m.bin_file());
    }
    for b in BACKENDS {
        println!("backend {}: {}", b.index(), b);
    }
}

fn settings_cmd(cfg: &Config, cmd: SettingsCmd) -> Result<()> {
    let mut store = FileStore::open(&cfg.settings.path).context("open settings")?;
    match cmd {
        SettingsCmd::Show => {
            println!("# {}", store.path().display());
            for (k, v) in store.snapshot() {
                match v {
                    Some(v) => println!("{} = {}", k, v),
                    None => println!("{} = {} (default)", k, k.default_value()),
                }
            }
        }
        SettingsCmd::Reset => {
            store.reset()?;
            info!("settings: reset");
        }
        SettingsCmd::Set { key, value } => {
            let key = SettingKey::parse(&key)?;
            store.set(key, value)?;
            if let Err(e) = check_store(&store, limits()) {
                warn!("settings: stored, but will be replaced on restore: {:#}", e);
            }
            info!("settings: {} = {}", key, store.get_int(key, key.default_value()));
        }
    }
    Ok(())
}

fn init_engine(cfg: &Config) -> Result<Box<dyn DetectionEngine>> {
    match cfg.engine.kind.as_str() {
        "sim" => Ok(Box::new(SimEngine::new(SimConfig {
            gpu_available: cfg.engine.gpu_available,
            unavailable_facings: cfg.engine.unavailable_facings.clone(),
            reset_on_load: cfg.engine.reset_on_load,
        }))),
        "native" => native_engine(),
        other => anyhow::bail!("unknown engine.kind: {}", other),
    }
}

#[cfg(feature = "engine-native")]
fn native_engine() -> Result<Box<dyn DetectionEngine>> {
    Ok(Box::new(vigil_engine::native::NativeEngine::new()))
}

#[cfg(not(feature = "engine-native"))]
fn native_engine() -> Result<Box<dyn DetectionEngine>> {
    anyhow::bail!("engine.kind=native but binary not built with --features engine-native")
}

async fn run(cfg: &Config, script: &str) -> Result<()> {
    info!("run: starting");

    let store = FileStore::open(&cfg.settings.path).context("open settings")?;
    let engine = init_engine(cfg)?;
    let (tx, mut rx) = mpsc::unbounded_channel::<Msg>();
    let permissions = ScriptPermissions::new(cfg.permission.granted, cfg.permission.grant_on_request, tx.clone());

    let mut session = Session::new(engine, store, ConsolePresenter::default(), permissions, assets(cfg));
    session.initialize();

    // display layer comes up, then the app is resumed
    if let Some(sf) = &cfg.surface {
        queue(&tx, UiEvent::SurfaceCreated);
        queue(
            &tx,
            UiEvent::SurfaceChanged { handle: SurfaceHandle(1), format: sf.format, width: sf.width, height: sf.height },
        );
    }
    queue(&tx, UiEvent::Resume);

    let reader = tokio::spawn(read_script(script.to_string(), tx));

    while let Some(msg) = rx.recv().await {
        match msg {
            Msg::Event(ev) => dispatch(&mut session, ev),
            Msg::End => {
                // permission answers queued by the last events
                while let Ok(Msg::Event(ev)) = rx.try_recv() {
                    dispatch(&mut session, ev);
                }
                break;
            }
        }
    }
    reader.await.context("script reader")??;

    let ts = time::OffsetDateTime::now_utc().unix_timestamp_nanos() as i64 / 1_000_000;
    println!("{}", serde_json::to_string_pretty(&session.status(ts))?);

    session.handle(UiEvent::Pause)?;
    info!("run: done");
    Ok(())
}

fn queue(tx: &mpsc::UnboundedSender<Msg>, ev: UiEvent) {
    if let Err(e) = tx.send(Msg::Event(ev)) {
        warn!("run: event loop gone, dropped {:?}", e.0);
    }
}

fn dispatch<E, S, P, G>(session: &mut Session<E, S, P, G>, ev: UiEvent)
where
    E: DetectionEngine,
    S: SettingsStore,
    P: vigil_session::Presenter,
    G: vigil_session::Permissions,
{
    if let Err(e) = session.handle(ev) {
        warn!("run: event rejected: {:#}", e);
    }
}

async fn read_script(path: String, tx: mpsc::UnboundedSender<Msg>) -> Result<()> {
    let f = tokio::fs::File::open(&path).await.with_context(|| format!("open script {}", path))?;
    let mut lines = BufReader::new(f).lines();
    let mut n = 0usize;
    let result = async {
        while let Some(line) = lines.next_line().await? {
            n += 1;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let ev: UiEvent = serde_json::from_str(line).with_context(|| format!("script line {}", n))?;
            if tx.send(Msg::Event(ev)).is_err() {
                break;
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;
    if tx.send(Msg::End).is_err() {
        warn!("run: event loop gone before end of script");
    }
    result
}
