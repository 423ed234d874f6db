use omnistream_core::{
    Account, Job, JobId, JobUpdate, LogLevel, Platform, Region, RunSummary, UploadState,
};

pub fn platform_table() -> String {
    let mut out = String::new();
    for platform in Platform::ALL {
        let info = platform.info();
        let region = match info.region {
            Region::Cn => "CN",
            Region::Global => "Global",
        };
        let duration = info
            .max_duration_secs
            .map(|secs| format!("{}m", secs / 60))
            .unwrap_or_else(|| "-".to_string());
        let real = if platform.has_real_protocol() {
            "real+simulated"
        } else {
            "simulated"
        };
        out.push_str(&format!(
            "{:<16} {:<18} {:<7} {:<14} {:<6} {}\n",
            platform.id(),
            info.display_name,
            region,
            info.supported_formats.join(","),
            duration,
            real
        ));
    }
    out
}

pub fn account_line(account: &Account) -> String {
    let status = if account.is_active() { "" } else { " (expired)" };
    format!(
        "{:<16} {:<24} {:<14} since {}{}",
        account.platform.id(),
        account.username,
        account.mode.to_string(),
        account.connected_at.format("%Y-%m-%d %H:%M"),
        status
    )
}

pub fn job_created_line(job: &Job) -> String {
    format!("[{}] #{} queued", job.platform(), job.id())
}

/// One terminal line per update; `None` for updates not worth printing.
pub fn update_line(platform: Platform, job_id: JobId, update: &JobUpdate) -> Option<String> {
    let prefix = format!("[{platform}] #{job_id}");
    match update {
        JobUpdate::State(state) => Some(format!("{prefix} state: {state}")),
        JobUpdate::Progress(progress) => Some(format!("{prefix} {progress:>3}%")),
        JobUpdate::Log(entry) => {
            let marker = match entry.level {
                LogLevel::Info => "  ",
                LogLevel::Success => "OK",
                LogLevel::Warning => "!!",
                LogLevel::Error => "XX",
            };
            Some(format!("{prefix} {marker} {}", entry.message))
        }
        JobUpdate::ResultUrl(url) => Some(format!("{prefix} -> {url}")),
        JobUpdate::ErrorMessage(_) => None,
    }
}

pub fn summary_block<'a>(summary: &RunSummary, jobs: impl IntoIterator<Item = &'a Job>) -> String {
    let mut out = format!(
        "\nRun {}: {}/{} succeeded, {} failed\n",
        summary.status, summary.succeeded, summary.total, summary.failed
    );
    for job in jobs {
        let detail = match job.state() {
            UploadState::Success => job.result_url().unwrap_or("published").to_string(),
            _ => job.error_message().unwrap_or("failed").to_string(),
        };
        out.push_str(&format!(
            "  {:<16} {:<8} {}\n",
            job.platform().id(),
            job.state().to_string(),
            detail
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use omnistream_core::{LogEntry, RunStatus};
    use pretty_assertions::assert_eq;

    #[test]
    fn platform_table_lists_every_platform() {
        let table = platform_table();
        assert_eq!(table.lines().count(), Platform::ALL.len());
        assert!(table.lines().any(|l| l.starts_with("YouTube") && l.ends_with("real+simulated")));
    }

    #[test]
    fn log_updates_are_marked_by_level() {
        let line = update_line(
            Platform::Douyin,
            4,
            &JobUpdate::Log(LogEntry::warning("Tip: check token")),
        );
        assert_eq!(line.as_deref(), Some("[Douyin] #4 !! Tip: check token"));
        assert_eq!(
            update_line(Platform::X, 1, &JobUpdate::ErrorMessage("x".into())),
            None
        );
    }

    #[test]
    fn summary_lists_outcomes() {
        let mut ok = Job::new(1, Platform::X);
        for update in [
            JobUpdate::Progress(100),
            JobUpdate::ResultUrl("https://x.com/video/1".into()),
            JobUpdate::State(UploadState::Success),
        ] {
            ok.apply(update).unwrap();
        }
        let summary = RunSummary {
            total: 1,
            succeeded: 1,
            failed: 0,
            status: RunStatus::Complete,
        };
        let block = summary_block(&summary, [&ok]);
        assert!(block.contains("Run Complete: 1/1 succeeded, 0 failed"));
        assert!(block.contains("https://x.com/video/1"));
    }
}
