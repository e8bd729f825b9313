use super::{RecordStore, Workspace};
use crate::error::StoreError;
use crate::model::{new_id, Collection, Environment, Request};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// In-memory store, optionally backed by one pretty-printed JSON file that
/// is rewritten after every successful mutation.
#[derive(Debug)]
pub struct JsonStore {
    path: Option<PathBuf>,
    state: RwLock<Workspace>,
}

impl JsonStore {
    pub fn in_memory() -> Self {
        Self::from_workspace(Workspace::default())
    }

    pub fn from_workspace(workspace: Workspace) -> Self {
        Self {
            path: None,
            state: RwLock::new(workspace),
        }
    }

    /// Opens a workspace file. A missing file is an empty workspace; it is
    /// created on the first write.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let workspace = if path.exists() {
            let text = fs::read_to_string(&path)?;
            if text.trim().is_empty() {
                Workspace::default()
            } else {
                serde_json::from_str(&text)?
            }
        } else {
            tracing::debug!("workspace {} does not exist yet", path.display());
            Workspace::default()
        };
        Ok(Self {
            path: Some(path),
            state: RwLock::new(workspace),
        })
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn snapshot(&self) -> Result<Workspace, StoreError> {
        self.read(|ws| Ok(ws.clone()))
    }

    fn read<T>(&self, f: impl FnOnce(&Workspace) -> Result<T, StoreError>) -> Result<T, StoreError> {
        let guard = self.state.read().map_err(|_| StoreError::Poisoned)?;
        f(&guard)
    }

    /// Applies a mutation and persists it. The in-memory state is rolled back
    /// when the file cannot be written.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Workspace) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.state.write().map_err(|_| StoreError::Poisoned)?;
        let before = guard.clone();
        let value = f(&mut guard)?;
        if let Err(e) = self.persist(&guard) {
            *guard = before;
            return Err(e);
        }
        Ok(value)
    }

    fn persist(&self, workspace: &Workspace) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(workspace)?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, text)?;
        fs::rename(&tmp, path)?;
        tracing::debug!("workspace saved to {}", path.display());
        Ok(())
    }
}

fn ensure_id(id: &mut String) {
    if id.trim().is_empty() {
        *id = new_id();
    }
}

impl RecordStore for JsonStore {
    fn list_collections(&self) -> Result<Vec<Collection>, StoreError> {
        self.read(|ws| Ok(ws.collections.clone()))
    }

    fn get_collection(&self, id: &str) -> Result<Collection, StoreError> {
        self.read(|ws| {
            ws.collections
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| StoreError::CollectionNotFound(id.to_string()))
        })
    }

    fn create_collection(&self, mut collection: Collection) -> Result<Collection, StoreError> {
        ensure_id(&mut collection.id);
        self.mutate(|ws| {
            if ws.collections.iter().any(|c| c.id == collection.id) {
                return Err(StoreError::DuplicateId(collection.id.clone()));
            }
            ws.collections.push(collection.clone());
            Ok(collection)
        })
    }

    fn update_collection(&self, collection: Collection) -> Result<Collection, StoreError> {
        self.mutate(|ws| {
            let slot = ws
                .collections
                .iter_mut()
                .find(|c| c.id == collection.id)
                .ok_or_else(|| StoreError::CollectionNotFound(collection.id.clone()))?;
            *slot = collection.clone();
            Ok(collection)
        })
    }

    fn delete_collection(&self, id: &str) -> Result<usize, StoreError> {
        self.mutate(|ws| {
            let before = ws.collections.len();
            ws.collections.retain(|c| c.id != id);
            if ws.collections.len() == before {
                return Err(StoreError::CollectionNotFound(id.to_string()));
            }
            let requests = ws.requests.len();
            ws.requests.retain(|r| r.collection_id != id);
            Ok(requests - ws.requests.len())
        })
    }

    fn list_requests(&self, collection_id: &str) -> Result<Vec<Request>, StoreError> {
        self.read(|ws| {
            if !ws.collections.iter().any(|c| c.id == collection_id) {
                return Err(StoreError::CollectionNotFound(collection_id.to_string()));
            }
            let mut requests: Vec<Request> = ws
                .requests
                .iter()
                .filter(|r| r.collection_id == collection_id)
                .cloned()
                .collect();
            requests.sort_by_key(|r| r.order);
            Ok(requests)
        })
    }

    fn get_request(&self, id: &str) -> Result<Request, StoreError> {
        self.read(|ws| {
            ws.requests
                .iter()
                .find(|r| r.id == id)
                .cloned()
                .ok_or_else(|| StoreError::RequestNotFound(id.to_string()))
        })
    }

    fn create_request(&self, mut request: Request) -> Result<Request, StoreError> {
        ensure_id(&mut request.id);
        self.mutate(|ws| {
            if !ws.collections.iter().any(|c| c.id == request.collection_id) {
                return Err(StoreError::CollectionNotFound(request.collection_id.clone()));
            }
            if ws.requests.iter().any(|r| r.id == request.id) {
                return Err(StoreError::DuplicateId(request.id.clone()));
            }
            ws.requests.push(request.clone());
            Ok(request)
        })
    }

    fn update_request(&self, request: Request) -> Result<Request, StoreError> {
        self.mutate(|ws| {
            if !ws.collections.iter().any(|c| c.id == request.collection_id) {
                return Err(StoreError::CollectionNotFound(request.collection_id.clone()));
            }
            let slot = ws
                .requests
                .iter_mut()
                .find(|r| r.id == request.id)
                .ok_or_else(|| StoreError::RequestNotFound(request.id.clone()))?;
            *slot = request.clone();
            Ok(request)
        })
    }

    fn delete_request(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|ws| {
            let before = ws.requests.len();
            ws.requests.retain(|r| r.id != id);
            if ws.requests.len() == before {
                return Err(StoreError::RequestNotFound(id.to_string()));
            }
            Ok(())
        })
    }

    fn list_environments(&self) -> Result<Vec<Environment>, StoreError> {
        self.read(|ws| Ok(ws.environments.clone()))
    }

    fn get_environment(&self, id: &str) -> Result<Environment, StoreError> {
        self.read(|ws| {
            ws.environments
                .iter()
                .find(|e| e.id == id)
                .cloned()
                .ok_or_else(|| StoreError::EnvironmentNotFound(id.to_string()))
        })
    }

    fn create_environment(&self, mut environment: Environment) -> Result<Environment, StoreError> {
        ensure_id(&mut environment.id);
        self.mutate(|ws| {
            if ws.environments.iter().any(|e| e.id == environment.id) {
                return Err(StoreError::DuplicateId(environment.id.clone()));
            }
            ws.environments.push(environment.clone());
            Ok(environment)
        })
    }

    fn update_environment(&self, environment: Environment) -> Result<Environment, StoreError> {
        self.mutate(|ws| {
            let slot = ws
                .environments
                .iter_mut()
                .find(|e| e.id == environment.id)
                .ok_or_else(|| StoreError::EnvironmentNotFound(environment.id.clone()))?;
            *slot = environment.clone();
            Ok(environment)
        })
    }

    fn delete_environment(&self, id: &str) -> Result<(), StoreError> {
        self.mutate(|ws| {
            let before = ws.environments.len();
            ws.environments.retain(|e| e.id != id);
            if ws.environments.len() == before {
                return Err(StoreError::EnvironmentNotFound(id.to_string()));
            }
            Ok(())
        })
    }
}
