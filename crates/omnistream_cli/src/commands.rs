use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use engine_logging::{engine_info, engine_warn};
use omnistream_core::{parse_tags, update, BoardState, ConnectionMode, Msg, Platform, VideoMetadata};
use omnistream_engine::{
    connect_account, disconnect_account, AccountStore, CopyGenerator, EngineConfig, EngineEvent,
    EngineHandle, FileAccountStore, GeminiCopyGenerator, JobEngine, MediaAsset,
};

use crate::cli::Command;
use crate::render;

/// Whether the process should exit successfully.
pub type Outcome = bool;

pub fn run(command: Command, config: &EngineConfig, state_dir: &Path) -> Result<Outcome> {
    let store = FileAccountStore::in_dir(state_dir);
    match command {
        Command::Platforms => {
            print!("{}", render::platform_table());
            Ok(true)
        }
        Command::Accounts => {
            let accounts = store.list().context("reading connected accounts")?;
            if accounts.is_empty() {
                println!("No accounts connected. Use `omnistream connect <platform>`.");
            }
            for account in &accounts {
                println!("{}", render::account_line(account));
            }
            Ok(true)
        }
        Command::Connect {
            platform,
            mode,
            token,
        } => connect(&store, platform, mode, token),
        Command::Disconnect { platform } => {
            if disconnect_account(&store, platform)? {
                println!("Disconnected {platform}.");
            } else {
                println!("{platform} was not connected.");
            }
            Ok(true)
        }
        Command::Generate { topic, platform } => generate(config, &topic, platform),
        Command::Publish {
            file,
            title,
            description,
            tags,
            platforms,
        } => {
            let metadata = VideoMetadata::new(title, description, parse_tags(&tags));
            publish(config, Arc::new(store), &file, metadata, &platforms)
        }
    }
}

fn connect(
    store: &dyn AccountStore,
    platform: Platform,
    mode: ConnectionMode,
    token: Option<String>,
) -> Result<Outcome> {
    if mode == ConnectionMode::Authenticated && token.is_none() {
        engine_warn!("connecting {} in authenticated mode without a token", platform);
        println!("Warning: no --token given; uploads will fall back to the simulated protocol.");
    }
    if mode == ConnectionMode::Authenticated && !platform.has_real_protocol() {
        println!("Note: real API support for {platform} is under development; publishing will fail until you reconnect in simulated mode.");
    }
    let account = connect_account(store, platform, mode, token)?;
    engine_info!("connected {} as {} ({})", platform, account.username, account.mode);
    println!("Connected {} as {} ({}).", platform, account.username, account.mode);
    Ok(true)
}

fn generate(config: &EngineConfig, topic: &str, platform: Platform) -> Result<Outcome> {
    let generator = GeminiCopyGenerator::from_env(
        config.endpoints.gemini.clone(),
        config.copy.clone(),
        &config.http,
    )?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let metadata = runtime.block_on(generator.generate(topic, platform))?;

    println!("Title:       {}", metadata.title);
    println!("Description: {}", metadata.description);
    println!("Tags:        {}", metadata.tags.join(", "));
    Ok(true)
}

fn publish(
    config: &EngineConfig,
    store: Arc<FileAccountStore>,
    file: &Path,
    metadata: VideoMetadata,
    platforms: &[Platform],
) -> Result<Outcome> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let asset = runtime
        .block_on(MediaAsset::from_path(file))
        .with_context(|| format!("reading {}", file.display()))?;
    drop(runtime);
    println!(
        "Publishing {} ({:.2}MB) to {} platform(s)...",
        asset.file_name(),
        asset.size_mb(),
        platforms.len()
    );

    let handle = EngineHandle::new(JobEngine::new(config, store)).context("starting engine")?;
    handle.distribute(Some(Arc::new(asset)), metadata, platforms)?;

    let mut board = BoardState::new();
    loop {
        let Some(event) = handle.recv() else {
            bail!("engine stopped before the run finished");
        };
        print_event(&board, &event);
        let finished = event == EngineEvent::RunFinished;
        board = update(board, Msg::from(event));
        if finished {
            break;
        }
    }

    let Some(summary) = board.summary() else {
        bail!("run finished without results");
    };
    print!("{}", render::summary_block(&summary, board.jobs()));
    Ok(summary.failed == 0)
}

fn print_event(board: &BoardState, event: &EngineEvent) {
    match event {
        EngineEvent::JobCreated(job) => println!("{}", render::job_created_line(job)),
        EngineEvent::JobUpdated { job_id, update } => {
            let line = board
                .job(*job_id)
                .and_then(|job| render::update_line(job.platform(), *job_id, update));
            if let Some(line) = line {
                println!("{line}");
            }
        }
        EngineEvent::RunStarted { .. } | EngineEvent::RunFinished => {}
    }
}
