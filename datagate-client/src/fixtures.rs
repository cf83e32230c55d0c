//! Local fixture collections for sections without a remote backend.

use crate::error::{DataAccessError, DataAccessResult};
use async_trait::async_trait;
use datagate_core::{Record, Section};
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Source of the static record collection for a section.
#[async_trait]
pub trait FixtureSource: Send + Sync {
    async fn load(&self, section: &Section) -> DataAccessResult<Vec<Record>>;
}

/// Fixtures stored as `<root>/<reduced section>.json`.
#[derive(Debug, Clone)]
pub struct DirectoryFixtures {
    root: PathBuf,
}

impl DirectoryFixtures {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, section: &Section) -> PathBuf {
        self.root.join(format!("{}.json", section.reduced()))
    }
}

#[async_trait]
impl FixtureSource for DirectoryFixtures {
    async fn load(&self, section: &Section) -> DataAccessResult<Vec<Record>> {
        let path = self.path_for(section);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(DataAccessError::FixtureNotFound {
                    section: section.to_string(),
                })
            }
            Err(e) => {
                return Err(DataAccessError::Fixture {
                    section: section.to_string(),
                    reason: format!("{}: {}", path.display(), e),
                })
            }
        };
        let records = parse_fixture(section, &path.display().to_string(), &content)?;
        tracing::debug!(%section, path = %path.display(), records = records.len(), "loaded fixture");
        Ok(records)
    }
}

/// In-memory fixtures keyed by section name.
#[derive(Debug, Clone, Default)]
pub struct StaticFixtures {
    sections: HashMap<String, Vec<Record>>,
}

impl StaticFixtures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, section: impl Into<String>, records: Vec<Record>) -> Self {
        self.sections.insert(section.into(), records);
        self
    }
}

#[async_trait]
impl FixtureSource for StaticFixtures {
    async fn load(&self, section: &Section) -> DataAccessResult<Vec<Record>> {
        self.sections
            .get(section.as_str())
            .or_else(|| self.sections.get(section.reduced()))
            .cloned()
            .ok_or_else(|| DataAccessError::FixtureNotFound {
                section: section.to_string(),
            })
    }
}

/// Parse fixture content: a JSON array of records, or an object wrapping one
/// under `items`.
pub fn parse_fixture(section: &Section, source: &str, content: &str) -> DataAccessResult<Vec<Record>> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| DataAccessError::json_parse(format!("fixture {source}"), e))?;
    match value {
        Value::Array(records) => Ok(records),
        Value::Object(mut map) => match map.remove("items") {
            Some(Value::Array(records)) => Ok(records),
            _ => Err(DataAccessError::Fixture {
                section: section.to_string(),
                reason: format!("{source} has no `items` array"),
            }),
        },
        _ => Err(DataAccessError::Fixture {
            section: section.to_string(),
            reason: format!("{source} is not a JSON array of records"),
        }),
    }
}
