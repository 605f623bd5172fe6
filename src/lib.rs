pub mod cli;
pub mod client;
pub mod config;
pub mod editor;
pub mod intake;
pub mod ocr;
pub mod report;

pub use client::AnalyzeClient;
pub use config::Config;

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueKind {
    Spelling,
    Grammar,
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueKind::Spelling => write!(f, "spelling"),
            IssueKind::Grammar => write!(f, "grammar"),
        }
    }
}

/// Half-open character range `[start, end)` into a document buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub start: usize,
    pub end: usize,
}

/// A single spelling or grammar finding reported by the analysis service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: IssueKind,
    pub message: String,
    pub original: String,
    #[serde(default)]
    pub suggestions: Vec<String>,
    pub position: Position,
}
