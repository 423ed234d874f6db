use crate::{JobId, LogEntry, Platform, RunSummary, UploadState};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BoardViewModel {
    pub job_count: usize,
    pub rows: Vec<JobRowView>,
    pub finished: bool,
    pub summary: Option<RunSummary>,
    pub ignored_updates: usize,
    pub dirty: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRowView {
    pub job_id: JobId,
    pub platform: Platform,
    pub state: UploadState,
    pub progress: u8,
    pub last_log: Option<LogEntry>,
    pub log_len: usize,
    pub result_url: Option<String>,
    pub error_message: Option<String>,
}
