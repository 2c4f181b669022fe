use anyhow::{Context, bail};
use clap::Parser;
use image::RgbaImage;
use log::{error, info, warn};
use referee_vision::core_modules::utils::image_helper::image_helper;
use referee_vision::{Referee, RefereeConfig, RefereeEngine, SessionError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

mod player;

use player::AssetPlayer;

/// Replays a folder of frames through the referee and takes button presses from stdin.
#[derive(Debug, Parser)]
#[command(name = "referee_runner", version)]
struct Args {
    /// TOML file overriding the default game settings.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Directory of still images played back in name order, looping.
    #[arg(long)]
    frames: PathBuf,
    /// Directory holding the phrase audio files.
    #[arg(long)]
    assets: PathBuf,
    /// Frames delivered per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,
    /// How long each phrase takes to speak, in milliseconds.
    #[arg(long, default_value_t = 2500)]
    phrase_ms: u64,
    /// Where `snap` writes debug images.
    #[arg(long, default_value = ".")]
    debug_dir: PathBuf,
}

/// Button presses forwarded to the camera thread.
#[derive(Debug)]
enum CameraCommand {
    CycleView,
    Snapshot,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // --- 1. Argument Parsing & Setup ---
    let args = Args::parse();
    if args.fps == 0 {
        bail!("--fps must be at least 1");
    }
    let config = match &args.config {
        Some(path) => RefereeConfig::load(path)?,
        None => RefereeConfig::default(),
    };
    let frames = load_frames(&args.frames)?;
    info!("loaded {} frames from {}", frames.len(), args.frames.display());

    // --- 2. Referee Initialization ---
    let player = Arc::new(AssetPlayer::new(&args.assets, Duration::from_millis(args.phrase_ms)));
    let referee = Referee::new(config, player);
    let engine = referee.engine();

    // --- 3. Camera Schedule ---
    let running = Arc::new(AtomicBool::new(true));
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let frame_interval = Duration::from_secs(1) / args.fps;
    let camera = {
        let running = Arc::clone(&running);
        let debug_dir = args.debug_dir.clone();
        thread::spawn(move || run_camera(referee, frames, frame_interval, command_rx, &debug_dir, &running))
    };

    // --- 4. Trigger Loop ---
    info!("commands: start | stop | view | snap | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "start" => start_session(&engine),
            "stop" => {
                if !engine.end_session() {
                    info!("no session running");
                }
            }
            "view" => command_tx.send(CameraCommand::CycleView)?,
            "snap" => command_tx.send(CameraCommand::Snapshot)?,
            "quit" => break,
            "" => {}
            other => warn!("unknown command {other:?}"),
        }
    }

    // --- 5. Shutdown ---
    engine.end_session();
    running.store(false, Ordering::Relaxed);
    if camera.join().is_err() {
        error!("camera thread panicked");
    }
    Ok(())
}

/// Starts a session and reports its outcome once it ends.
fn start_session(engine: &RefereeEngine) {
    match engine.start_session() {
        Ok(handle) => {
            tokio::spawn(async move {
                let number = handle.number();
                match handle.wait().await {
                    Ok(outcome) => info!("session {number}: {outcome:?}"),
                    Err(e) => error!("session {number} failed: {e:#}"),
                }
            });
        }
        Err(SessionError::AlreadyRunning) => info!("a session is already running"),
        Err(e) => error!("could not start a session: {e}"),
    }
}

/// Feeds frames to the referee at a fixed cadence until told to stop.
fn run_camera(
    mut referee: Referee,
    frames: Vec<RgbaImage>,
    frame_interval: Duration,
    mut commands: mpsc::UnboundedReceiver<CameraCommand>,
    debug_dir: &Path,
    running: &AtomicBool,
) {
    let mut snapshots = 0u32;
    for frame in frames.iter().cycle() {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        let started = Instant::now();
        referee.process_frame(frame);

        while let Ok(command) = commands.try_recv() {
            match command {
                CameraCommand::CycleView => info!("debug view: {:?}", referee.cycle_debug_view()),
                CameraCommand::Snapshot => {
                    snapshots += 1;
                    let path = debug_dir.join(format!("{:?}_{snapshots}.png", referee.debug_view()).to_lowercase());
                    let saved = match referee.debug_preview() {
                        Some(preview) => image_helper::save_mask(&path, &preview),
                        None => image_helper::save_frame(&path, frame),
                    };
                    match saved {
                        Ok(()) => info!("saved {} ({:?})", path.display(), referee.positions()),
                        Err(e) => error!("could not save {}: {e}", path.display()),
                    }
                }
            }
        }

        if let Some(rest) = frame_interval.checked_sub(started.elapsed()) {
            thread::sleep(rest);
        }
    }
}

/// Reads every decodable image in `dir`, sorted by file name.
fn load_frames(dir: &Path) -> anyhow::Result<Vec<RgbaImage>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("reading frame directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut frames = Vec::with_capacity(paths.len());
    for path in paths {
        match image::open(&path) {
            Ok(img) => frames.push(img.to_rgba8()),
            Err(e) => warn!("skipping {}: {e}", path.display()),
        }
    }
    if frames.is_empty() {
        bail!("no frames found in {}", dir.display());
    }
    Ok(frames)
}
