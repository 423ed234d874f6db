mod common;

use std::sync::Arc;

use common::{account, asset, init_logging, metadata, TestSink};
use omnistream_core::{ConnectionMode, Job, JobUpdate, LogLevel, Platform, UploadState};
use omnistream_engine::{
    simulated_locator, EngineConfig, InMemoryAccountStore, JobEngine, UpdateSink,
};
use pretty_assertions::assert_eq;
use tokio_util::sync::CancellationToken;

fn engine_with(config: &EngineConfig, accounts: Vec<omnistream_core::Account>) -> JobEngine {
    JobEngine::new(config, Arc::new(InMemoryAccountStore::with_accounts(accounts)))
}

async fn run_one(engine: &JobEngine, job: Job, sink: Arc<TestSink>) -> Job {
    let sink: Arc<dyn UpdateSink> = sink;
    engine
        .run(job, &asset(), &metadata(), sink, &CancellationToken::new())
        .await
}

#[tokio::test]
async fn missing_account_fails_immediately_with_one_log_entry() {
    init_logging();
    let engine = engine_with(&EngineConfig::instant(), vec![]);
    let sink = TestSink::new();

    let job = run_one(&engine, Job::new(1, Platform::TikTok), sink.clone()).await;

    assert_eq!(job.state(), UploadState::Error);
    assert_eq!(job.progress(), 0);
    assert_eq!(job.log().len(), 1);
    let entry = job.log().last().unwrap();
    assert_eq!(entry.level, LogLevel::Error);
    assert!(entry.message.contains("not connected"));
    assert_eq!(job.error_message(), Some("account not connected"));
    assert!(job.result_url().is_none());
    assert_eq!(
        sink.updates_for(1).last(),
        Some(&JobUpdate::State(UploadState::Error))
    );
}

#[tokio::test]
async fn simulated_generic_run_succeeds_with_deterministic_locator() {
    init_logging();
    let engine = engine_with(
        &EngineConfig::instant(),
        vec![account(Platform::Bilibili, ConnectionMode::Simulated, None)],
    );
    let sink = TestSink::new();

    let job = run_one(&engine, Job::new(3, Platform::Bilibili), sink.clone()).await;

    assert_eq!(job.state(), UploadState::Success);
    assert_eq!(job.progress(), 100);
    assert_eq!(job.result_url(), Some(simulated_locator(Platform::Bilibili).as_str()));
    assert!(job.log().len() >= 5);
    assert_eq!(job.log().count(LogLevel::Success), 1);
    assert_eq!(job.log().last().unwrap().level, LogLevel::Success);
    assert_eq!(
        sink.updates_for(3).last(),
        Some(&JobUpdate::State(UploadState::Success))
    );
}

#[tokio::test]
async fn simulated_families_report_monotonic_progress() {
    init_logging();
    let platforms = [Platform::Douyin, Platform::YouTube, Platform::X];
    let accounts = platforms
        .iter()
        .map(|p| account(*p, ConnectionMode::Simulated, None))
        .collect();
    let engine = engine_with(&EngineConfig::instant(), accounts);

    for (id, platform) in platforms.into_iter().enumerate() {
        let id = id as u64 + 1;
        let sink = TestSink::new();
        let job = run_one(&engine, Job::new(id, platform), sink.clone()).await;
        assert_eq!(job.state(), UploadState::Success, "{platform}");

        let progress: Vec<u8> = sink
            .updates_for(id)
            .into_iter()
            .filter_map(|u| match u {
                JobUpdate::Progress(p) => Some(p),
                _ => None,
            })
            .collect();
        assert!(progress.windows(2).all(|w| w[0] < w[1]), "{platform}: {progress:?}");
        assert_eq!(progress.last(), Some(&100));
    }
}

#[tokio::test]
async fn chunked_simulation_logs_each_chunk() {
    init_logging();
    let engine = engine_with(
        &EngineConfig::instant(),
        vec![account(Platform::Douyin, ConnectionMode::Simulated, None)],
    );
    let job = run_one(&engine, Job::new(1, Platform::Douyin), TestSink::new()).await;

    let messages: Vec<_> = job.log().iter().map(|e| e.message.clone()).collect();
    for i in 1..=5 {
        let line = format!("Uploading chunk {i}/5...");
        assert!(messages.contains(&line), "missing {line}");
    }
    assert!(messages.iter().any(|m| m == "Submitting video metadata..."));
}

#[tokio::test]
async fn authenticated_run_on_unsupported_platform_recommends_simulated_mode() {
    init_logging();
    let engine = engine_with(
        &EngineConfig::instant(),
        vec![account(
            Platform::Kuaishou,
            ConnectionMode::Authenticated,
            Some("token"),
        )],
    );

    let job = run_one(&engine, Job::new(5, Platform::Kuaishou), TestSink::new()).await;

    assert_eq!(job.state(), UploadState::Error);
    assert!(job.error_message().unwrap().contains("under development"));
    assert!(job
        .log()
        .iter()
        .any(|e| e.level == LogLevel::Warning && e.message.contains("simulated mode")));
    assert_eq!(job.log().last().unwrap().level, LogLevel::Error);
    assert_eq!(job.log().count(LogLevel::Error), 1);
}

#[tokio::test]
async fn authenticated_account_without_token_runs_simulated() {
    init_logging();
    let engine = engine_with(
        &EngineConfig::instant(),
        vec![account(Platform::YouTube, ConnectionMode::Authenticated, None)],
    );

    let job = run_one(&engine, Job::new(2, Platform::YouTube), TestSink::new()).await;

    assert_eq!(job.state(), UploadState::Success);
    assert_eq!(job.log().count(LogLevel::Warning), 1);
    assert_eq!(job.result_url(), Some(simulated_locator(Platform::YouTube).as_str()));
}

#[tokio::test]
async fn terminal_jobs_are_not_reopened() {
    init_logging();
    let store = Arc::new(InMemoryAccountStore::new());
    let engine = JobEngine::new(&EngineConfig::instant(), store.clone());

    let failed = run_one(&engine, Job::new(1, Platform::X), TestSink::new()).await;
    assert_eq!(failed.state(), UploadState::Error);

    omnistream_engine::connect_account(store.as_ref(), Platform::X, ConnectionMode::Simulated, None)
        .unwrap();

    let sink = TestSink::new();
    let again = run_one(&engine, failed.clone(), sink.clone()).await;
    assert_eq!(again, failed);
    assert!(sink.events().is_empty());

    let fresh = run_one(&engine, Job::new(2, Platform::X), TestSink::new()).await;
    assert_eq!(fresh.state(), UploadState::Success);
    assert!(fresh.log().iter().all(|e| e.level != LogLevel::Error));
}

#[tokio::test]
async fn cancelled_run_ends_in_error() {
    init_logging();
    let engine = engine_with(
        &EngineConfig::default(),
        vec![account(Platform::TikTok, ConnectionMode::Simulated, None)],
    );
    let cancel = CancellationToken::new();
    cancel.cancel();

    let sink: Arc<dyn UpdateSink> = TestSink::new();
    let job = engine
        .run(Job::new(1, Platform::TikTok), &asset(), &metadata(), sink, &cancel)
        .await;

    assert_eq!(job.state(), UploadState::Error);
    assert_eq!(job.error_message(), Some("cancelled"));
}

#[tokio::test]
async fn cancelled_token_wins_even_without_delays() {
    init_logging();
    let platforms = [Platform::X, Platform::Douyin, Platform::YouTube];
    let accounts = platforms
        .iter()
        .map(|p| account(*p, ConnectionMode::Simulated, None))
        .collect();
    let engine = engine_with(&EngineConfig::instant(), accounts);
    let cancel = CancellationToken::new();
    cancel.cancel();

    for round in 0..50u64 {
        for (offset, platform) in platforms.into_iter().enumerate() {
            let sink: Arc<dyn UpdateSink> = TestSink::new();
            let job = engine
                .run(
                    Job::new(round * 10 + offset as u64, platform),
                    &asset(),
                    &metadata(),
                    sink,
                    &cancel,
                )
                .await;
            assert_eq!(job.state(), UploadState::Error, "{platform} round {round}");
            assert_eq!(job.error_message(), Some("cancelled"));
            assert!(job.result_url().is_none());
        }
    }
}

#[tokio::test(start_paused = true)]
async fn slow_job_times_out() {
    init_logging();
    let mut config = EngineConfig::default();
    config.job_timeout_secs = Some(2);
    let engine = engine_with(
        &config,
        vec![account(Platform::Xiaohongshu, ConnectionMode::Simulated, None)],
    );

    let job = run_one(&engine, Job::new(1, Platform::Xiaohongshu), TestSink::new()).await;

    assert_eq!(job.state(), UploadState::Error);
    assert_eq!(job.error_message(), Some("timed out after 2s"));
    assert!(job.progress() < 100);
}

#[tokio::test(start_paused = true)]
async fn default_schedule_completes_on_virtual_clock() {
    init_logging();
    let engine = engine_with(
        &EngineConfig::default(),
        vec![account(Platform::WeChatChannels, ConnectionMode::Simulated, None)],
    );

    let job = run_one(&engine, Job::new(1, Platform::WeChatChannels), TestSink::new()).await;

    assert_eq!(job.state(), UploadState::Success);
    assert_eq!(job.progress(), 100);
}
