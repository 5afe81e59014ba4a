use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Kind of derived artifact attached to a record.
#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    ProcessedVideo,
    Thumbnail,
    Subtitles,
    SubtitlesJson,
    Summary,
}

impl OutputKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputKind::ProcessedVideo => "processed_video",
            OutputKind::Thumbnail => "thumbnail",
            OutputKind::Subtitles => "subtitles",
            OutputKind::SubtitlesJson => "subtitles_json",
            OutputKind::Summary => "summary",
        }
    }
}

impl Display for OutputKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Derived-artifact storage keys, by kind.
///
/// Serializes as a plain JSON object (`{"thumbnail": "media/..."}`) so it can
/// live in a JSONB column.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct OutputMap(BTreeMap<OutputKind, String>);

impl OutputMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an artifact, returning the storage key it supersedes (if any)
    /// so the caller can clean the old file up.
    pub fn insert(&mut self, kind: OutputKind, storage_key: String) -> Option<String> {
        self.0.insert(kind, storage_key)
    }

    pub fn get(&self, kind: OutputKind) -> Option<&String> {
        self.0.get(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// All recorded storage keys, for cleanup on delete.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.0.values()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OutputKind, &String)> {
        self.0.iter()
    }
}
