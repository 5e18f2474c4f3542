//! Search options
//!
//! Options are plain data handed to `Search::new`. They can be built in code
//! or read from TOML layered over the embedded defaults:
//!
//! ```toml
//! workers = 4
//! case_insensitive = true
//! mode = "first_per_sentence"
//! result_limit = 1000
//! dedup = "span"
//!
//! [window]
//! start = 0
//! end = 20
//! ```

use crate::cache::DedupPolicy;
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::ops::Range;
use std::path::Path;
use thiserror::Error;

const DEFAULT_OPTIONS: &str = r#"
workers          = 0
case_insensitive = false
mode             = "exhaustive"
collect_entries  = true

[window]
start = 0
"#;

#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("failed to read search options: {0}")]
    Config(#[from] config::ConfigError),

    #[error("window {start}..{end} is empty")]
    EmptyWindow { start: usize, end: usize },

    #[error("result limit must be positive")]
    ZeroLimit,
}

/// How many matches a sentence may report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Every consistent assignment
    #[default]
    Exhaustive,
    /// Stop a sentence after its first accepted match
    FirstPerSentence,
}

/// Word positions a match may occupy, `start..end` (`end` defaults to the
/// sentence length)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WindowBounds {
    pub start: usize,
    pub end: Option<usize>,
}

impl WindowBounds {
    pub fn new(start: usize, end: Option<usize>) -> Self {
        Self { start, end }
    }

    /// Positions available in a sentence of `len` words
    pub fn range(&self, len: usize) -> Range<usize> {
        let end = self.end.map_or(len, |end| end.min(len));
        self.start.min(end)..end
    }

    pub fn is_empty(&self) -> bool {
        self.end.is_some_and(|end| end <= self.start)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Worker threads; 0 uses the available parallelism
    pub workers: usize,
    pub case_insensitive: bool,
    pub mode: SearchMode,
    /// Stop once this many entries are stored
    pub result_limit: Option<usize>,
    pub window: WindowBounds,
    /// Dedup policy; `None` uses the matcher's default
    pub dedup: Option<DedupPolicy>,
    /// When false only counts are kept
    pub collect_entries: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            workers: 0,
            case_insensitive: false,
            mode: SearchMode::Exhaustive,
            result_limit: None,
            window: WindowBounds::default(),
            dedup: None,
            collect_entries: true,
        }
    }
}

impl SearchOptions {
    /// Parse TOML on top of the defaults
    pub fn from_toml_str(toml: &str) -> Result<Self, OptionsError> {
        let options: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_OPTIONS, config::FileFormat::Toml))
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    /// Read a TOML file on top of the defaults
    pub fn load(path: &Path) -> Result<Self, OptionsError> {
        let options: Self = config::Config::builder()
            .add_source(config::File::from_str(DEFAULT_OPTIONS, config::FileFormat::Toml))
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if let Some(end) = self.window.end
            && self.window.is_empty()
        {
            return Err(OptionsError::EmptyWindow {
                start: self.window.start,
                end,
            });
        }
        if self.result_limit == Some(0) {
            return Err(OptionsError::ZeroLimit);
        }
        Ok(())
    }

    /// Resolved worker count (at least 1)
    pub fn worker_count(&self) -> usize {
        match self.workers {
            0 => std::thread::available_parallelism().map_or(1, NonZeroUsize::get),
            n => n,
        }
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_mode(mut self, mode: SearchMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_case_insensitive(mut self, case_insensitive: bool) -> Self {
        self.case_insensitive = case_insensitive;
        self
    }

    pub fn with_result_limit(mut self, limit: usize) -> Self {
        self.result_limit = Some(limit);
        self
    }

    pub fn with_window(mut self, window: WindowBounds) -> Self {
        self.window = window;
        self
    }

    pub fn with_dedup(mut self, dedup: DedupPolicy) -> Self {
        self.dedup = Some(dedup);
        self
    }

    pub fn with_collect_entries(mut self, collect_entries: bool) -> Self {
        self.collect_entries = collect_entries;
        self
    }
}
