//! Persistence boundary. The engine only needs whole-record reads and writes
//! keyed by id, plus listing requests by collection.

mod json_store;

pub use json_store::JsonStore;

use crate::error::StoreError;
use crate::model::{Collection, Environment, Request};
use serde::{Deserialize, Serialize};

/// Everything a store holds, in the shape of the workspace file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    #[serde(default)]
    pub collections: Vec<Collection>,
    #[serde(default)]
    pub requests: Vec<Request>,
    #[serde(default)]
    pub environments: Vec<Environment>,
}

pub trait RecordStore: Send + Sync {
    fn list_collections(&self) -> Result<Vec<Collection>, StoreError>;
    fn get_collection(&self, id: &str) -> Result<Collection, StoreError>;
    fn create_collection(&self, collection: Collection) -> Result<Collection, StoreError>;
    fn update_collection(&self, collection: Collection) -> Result<Collection, StoreError>;
    /// Removes the collection and its requests. Returns how many requests went with it.
    fn delete_collection(&self, id: &str) -> Result<usize, StoreError>;

    /// Requests of one collection, sorted by `order`.
    fn list_requests(&self, collection_id: &str) -> Result<Vec<Request>, StoreError>;
    fn get_request(&self, id: &str) -> Result<Request, StoreError>;
    fn create_request(&self, request: Request) -> Result<Request, StoreError>;
    fn update_request(&self, request: Request) -> Result<Request, StoreError>;
    fn delete_request(&self, id: &str) -> Result<(), StoreError>;

    fn list_environments(&self) -> Result<Vec<Environment>, StoreError>;
    fn get_environment(&self, id: &str) -> Result<Environment, StoreError>;
    fn create_environment(&self, environment: Environment) -> Result<Environment, StoreError>;
    fn update_environment(&self, environment: Environment) -> Result<Environment, StoreError>;
    fn delete_environment(&self, id: &str) -> Result<(), StoreError>;

    /// Looks a collection up by id, then by exact title.
    fn find_collection(&self, id_or_title: &str) -> Result<Collection, StoreError> {
        match self.get_collection(id_or_title) {
            Err(StoreError::CollectionNotFound(_)) => self
                .list_collections()?
                .into_iter()
                .find(|c| c.title == id_or_title)
                .ok_or_else(|| StoreError::CollectionNotFound(id_or_title.to_string())),
            other => other,
        }
    }

    /// Looks an environment up by id, then by exact name.
    fn find_environment(&self, id_or_name: &str) -> Result<Environment, StoreError> {
        match self.get_environment(id_or_name) {
            Err(StoreError::EnvironmentNotFound(_)) => self
                .list_environments()?
                .into_iter()
                .find(|e| e.name == id_or_name)
                .ok_or_else(|| StoreError::EnvironmentNotFound(id_or_name.to_string())),
            other => other,
        }
    }
}
