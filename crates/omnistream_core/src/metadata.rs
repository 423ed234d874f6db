use serde::{Deserialize, Serialize};

/// Copy attached to the published video. Shared read-only by every job of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoMetadata {
    pub title: String,
    pub description: String,
    /// Order is kept and duplicates are allowed.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl VideoMetadata {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        tags: Vec<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            tags,
        }
    }
}

/// Splits a comma separated tag list, trimming and dropping empty entries.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
