// SPDX-License-Identifier: Apache-2.0

use crate::{Platform, PlatformError, PlatformErrorCode};
use errata_model::{Analysis, Container, ContainerType};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

/// Side effect applied to the in-memory tree, recorded for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    DeletedFile { container: String, name: String },
    AddedTag { container: String, tag: String },
    RemovedTag { container: String, tag: String },
    UpdatedAnalysisLabel { analysis: String, label: String },
}

#[derive(Debug, Default)]
struct State {
    containers: BTreeMap<String, Container>,
    children: BTreeMap<String, Vec<String>>,
    file_bytes: BTreeMap<(String, String), Vec<u8>>,
    analyses: BTreeMap<String, Analysis>,
    mutations: Vec<Mutation>,
}

/// Deterministic in-memory platform used by tests and dry runs. Mutations
/// are applied to the tree and journaled.
#[derive(Debug, Default)]
pub struct MemoryPlatform {
    state: Mutex<State>,
}

impl MemoryPlatform {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_container(self, container: Container) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.containers.insert(container.id.clone(), container);
        }
        self
    }

    #[must_use]
    pub fn with_child(self, parent_id: &str, child_id: &str) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .children
                .entry(parent_id.to_string())
                .or_default()
                .push(child_id.to_string());
        }
        self
    }

    #[must_use]
    pub fn with_file_bytes(self, container_id: &str, name: &str, bytes: Vec<u8>) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state
                .file_bytes
                .insert((container_id.to_string(), name.to_string()), bytes);
        }
        self
    }

    #[must_use]
    pub fn with_analysis(self, analysis: Analysis) -> Self {
        if let Ok(mut state) = self.state.lock() {
            state.analyses.insert(analysis.id.clone(), analysis);
        }
        self
    }

    /// Snapshot of every side effect applied so far, in order.
    #[must_use]
    pub fn mutations(&self) -> Vec<Mutation> {
        self.state
            .lock()
            .map(|s| s.mutations.clone())
            .unwrap_or_default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, PlatformError> {
        self.state
            .lock()
            .map_err(|_| PlatformError::new(PlatformErrorCode::Internal, "state lock poisoned"))
    }
}

impl Platform for MemoryPlatform {
    fn site_url(&self) -> String {
        "https://imaging.test".to_string()
    }

    fn get_container(&self, id: &str) -> Result<Container, PlatformError> {
        self.lock()?
            .containers
            .get(id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found(format!("container {id}")))
    }

    fn get_analysis(&self, id: &str) -> Result<Analysis, PlatformError> {
        self.lock()?
            .analyses
            .get(id)
            .cloned()
            .ok_or_else(|| PlatformError::not_found(format!("analysis {id}")))
    }

    fn list_children(
        &self,
        _parent_type: ContainerType,
        parent_id: &str,
        child_type: ContainerType,
        tag: Option<&str>,
    ) -> Result<Vec<Container>, PlatformError> {
        let state = self.lock()?;
        let ids = state.children.get(parent_id).cloned().unwrap_or_default();
        let mut out = Vec::new();
        for id in ids {
            let Some(container) = state.containers.get(&id) else {
                continue;
            };
            if container.container_type != child_type {
                continue;
            }
            if let Some(tag) = tag {
                if !container.has_tag(tag) {
                    continue;
                }
            }
            out.push(container.clone());
        }
        Ok(out)
    }

    fn read_file(&self, container_id: &str, name: &str) -> Result<Vec<u8>, PlatformError> {
        self.lock()?
            .file_bytes
            .get(&(container_id.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| PlatformError::not_found(format!("file {name} on {container_id}")))
    }

    fn delete_file(&self, container_id: &str, name: &str) -> Result<(), PlatformError> {
        let mut state = self.lock()?;
        let removed = state
            .file_bytes
            .remove(&(container_id.to_string(), name.to_string()))
            .is_some();
        let mut listed = false;
        if let Some(container) = state.containers.get_mut(container_id) {
            let before = container.files.len();
            container.files.retain(|f| f.name != name);
            listed = container.files.len() != before;
        }
        if !removed && !listed {
            return Err(PlatformError::not_found(format!(
                "file {name} on {container_id}"
            )));
        }
        state.mutations.push(Mutation::DeletedFile {
            container: container_id.to_string(),
            name: name.to_string(),
        });
        Ok(())
    }

    fn add_tag(&self, container_id: &str, tag: &str) -> Result<(), PlatformError> {
        let mut state = self.lock()?;
        let container = state
            .containers
            .get_mut(container_id)
            .ok_or_else(|| PlatformError::not_found(format!("container {container_id}")))?;
        if container.has_tag(tag) {
            return Err(PlatformError::new(
                PlatformErrorCode::Conflict,
                format!("tag {tag} already present on {container_id}"),
            ));
        }
        container.tags.push(tag.to_string());
        state.mutations.push(Mutation::AddedTag {
            container: container_id.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }

    fn delete_tag(&self, container_id: &str, tag: &str) -> Result<(), PlatformError> {
        let mut state = self.lock()?;
        let container = state
            .containers
            .get_mut(container_id)
            .ok_or_else(|| PlatformError::not_found(format!("container {container_id}")))?;
        if !container.has_tag(tag) {
            return Err(PlatformError::not_found(format!(
                "tag {tag} on {container_id}"
            )));
        }
        container.tags.retain(|t| t != tag);
        state.mutations.push(Mutation::RemovedTag {
            container: container_id.to_string(),
            tag: tag.to_string(),
        });
        Ok(())
    }

    fn update_analysis_label(
        &self,
        _parent: &Container,
        analysis_id: &str,
        label: &str,
    ) -> Result<(), PlatformError> {
        let mut state = self.lock()?;
        let analysis = state
            .analyses
            .get_mut(analysis_id)
            .ok_or_else(|| PlatformError::not_found(format!("analysis {analysis_id}")))?;
        analysis.label = label.to_string();
        state.mutations.push(Mutation::UpdatedAnalysisLabel {
            analysis: analysis_id.to_string(),
            label: label.to_string(),
        });
        Ok(())
    }
}
