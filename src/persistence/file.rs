//! JSON file persistence adapter.

use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::PersistenceAdapter;
use crate::cache::CacheEntry;

#[derive(Serialize)]
struct SnapshotRef<'a, V> {
    saved_at: DateTime<Utc>,
    entries: &'a [CacheEntry<V>],
}

#[derive(Deserialize)]
struct Snapshot<V> {
    #[allow(dead_code)]
    saved_at: DateTime<Utc>,
    entries: Vec<CacheEntry<V>>,
}

/// Stores the whole cache as a single JSON document.
///
/// Writes go to a sibling temp file first and are renamed into place, so a
/// crash mid-save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileAdapter<V> {
    path: PathBuf,
    _value: PhantomData<fn() -> V>,
}

impl<V> JsonFileAdapter<V> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _value: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.file_name().unwrap_or_default().to_os_string();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl<V> PersistenceAdapter<V> for JsonFileAdapter<V>
where
    V: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn save(&self, entries: &[CacheEntry<V>]) -> anyhow::Result<()> {
        let snapshot = SnapshotRef {
            saved_at: Utc::now(),
            entries,
        };
        let bytes = serde_json::to_vec(&snapshot).context("serializing cache snapshot")?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &bytes)
            .await
            .with_context(|| format!("writing {}", temp.display()))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .with_context(|| format!("replacing {}", self.path.display()))?;

        debug!("Wrote {} bytes to {}", bytes.len(), self.path.display());
        Ok(())
    }

    async fn load(&self) -> anyhow::Result<Vec<CacheEntry<V>>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {}", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        let snapshot: Snapshot<V> = serde_json::from_slice(&bytes)
            .with_context(|| format!("parsing snapshot {}", self.path.display()))?;
        Ok(snapshot.entries)
    }
}
