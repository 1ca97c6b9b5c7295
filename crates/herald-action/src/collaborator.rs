//! Interfaces to the collaborators handlers consult, plus in-process
//! implementations used by the application binary and tests.

use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use herald_core::config::ProjectEntry;
use herald_core::types::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::ActionError;

/// Outcome of resolving a project name against the whitelist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResolution {
    pub valid: bool,
    pub matched: Option<String>,
    pub path: Option<String>,
    #[serde(default)]
    pub known_projects: Vec<String>,
}

/// Resolves a project name to a deployable path.
#[async_trait]
pub trait ProjectResolver: Send + Sync {
    async fn resolve(&self, name: &str) -> Result<ProjectResolution, ActionError>;
}

/// Fetches a project document. `Ok(None)` means the document does not exist.
#[async_trait]
pub trait DocumentFetcher: Send + Sync {
    async fn fetch(&self, project: &str, path: &str) -> Result<Option<String>, ActionError>;
}

// =============================================================================
// Static project registry
// =============================================================================

/// Project whitelist backed by the `[projects]` config table.
///
/// Matches case-insensitively on the project name, then on the repo slug.
pub struct StaticProjectRegistry {
    projects: BTreeMap<String, ProjectEntry>,
}

impl StaticProjectRegistry {
    pub fn new(projects: BTreeMap<String, ProjectEntry>) -> Self {
        Self { projects }
    }

    fn find(&self, name: &str) -> Option<(&String, &ProjectEntry)> {
        let needle = name.trim().to_lowercase();
        self.projects
            .iter()
            .find(|(key, _)| key.to_lowercase() == needle)
            .or_else(|| {
                self.projects.iter().find(|(_, entry)| {
                    entry
                        .repo
                        .as_deref()
                        .is_some_and(|repo| repo.to_lowercase() == needle)
                })
            })
    }
}

#[async_trait]
impl ProjectResolver for StaticProjectRegistry {
    async fn resolve(&self, name: &str) -> Result<ProjectResolution, ActionError> {
        let known_projects: Vec<String> = self.projects.keys().cloned().collect();
        match self.find(name) {
            Some((key, entry)) => Ok(ProjectResolution {
                valid: true,
                matched: Some(key.clone()),
                path: Some(entry.path.clone()),
                known_projects,
            }),
            None => Ok(ProjectResolution {
                valid: false,
                matched: None,
                path: None,
                known_projects,
            }),
        }
    }
}

// =============================================================================
// Caching decorator
// =============================================================================

/// Wraps a resolver and memoises valid resolutions for `ttl_secs`.
///
/// Invalid resolutions are never cached so newly whitelisted projects are
/// picked up immediately.
pub struct CachedResolver<R> {
    inner: R,
    ttl_secs: u64,
    cache: Mutex<HashMap<String, (Timestamp, ProjectResolution)>>,
}

impl<R: ProjectResolver> CachedResolver<R> {
    pub fn new(inner: R, ttl_secs: u64) -> Self {
        Self {
            inner,
            ttl_secs,
            cache: Mutex::new(HashMap::new()),
        }
    }

    fn cached(&self, key: &str, now: Timestamp) -> Option<ProjectResolution> {
        let cache = self.cache.lock().unwrap_or_else(|e| e.into_inner());
        cache
            .get(key)
            .filter(|(stored_at, _)| stored_at.age_secs_at(now) < self.ttl_secs)
            .map(|(_, resolution)| resolution.clone())
    }
}

#[async_trait]
impl<R: ProjectResolver> ProjectResolver for CachedResolver<R> {
    async fn resolve(&self, name: &str) -> Result<ProjectResolution, ActionError> {
        let key = name.trim().to_lowercase();
        let now = Timestamp::now();
        if let Some(hit) = self.cached(&key, now) {
            return Ok(hit);
        }

        let resolution = self.inner.resolve(name).await?;
        if resolution.valid {
            self.cache
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .insert(key, (now, resolution.clone()));
        }
        Ok(resolution)
    }
}

// =============================================================================
// File-backed document fetcher
// =============================================================================

/// Reads `<root>/<project>/<path>` from the local filesystem.
pub struct FsDocumentFetcher {
    root: PathBuf,
}

impl FsDocumentFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

fn is_contained(relative: &str) -> bool {
    Path::new(relative)
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[async_trait]
impl DocumentFetcher for FsDocumentFetcher {
    async fn fetch(&self, project: &str, path: &str) -> Result<Option<String>, ActionError> {
        if !is_contained(project) || !is_contained(path) {
            return Err(ActionError::Collaborator(format!(
                "Refusing to read outside the documents root: {}/{}",
                project, path
            )));
        }

        let full = self.root.join(project).join(path);
        match tokio::fs::read_to_string(&full).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ActionError::Collaborator(format!(
                "Failed to read {}: {}",
                full.display(),
                e
            ))),
        }
    }
}
