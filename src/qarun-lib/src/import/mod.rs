mod example;
mod openapi;

pub use example::example_from_schema;
pub use openapi::{
    group_by_folder, parse_openapi, validate_openapi_format, ImportedRequest, ParsedSpec,
    DEFAULT_FOLDER,
};

use crate::error::ImportError;
use crate::model::Collection;
use crate::store::RecordStore;
use indexmap::IndexMap;
use serde::Serialize;

pub const ALL_REQUESTS_FOLDER: &str = "All Requests";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub collections: Vec<Collection>,
    pub total_requests: usize,
    pub message: String,
}

/// Parses an OpenAPI/Swagger JSON document and stores its requests. With
/// `separate_collections` every first tag gets its own collection.
pub fn import_openapi(
    store: &dyn RecordStore,
    text: &str,
    separate_collections: bool,
) -> Result<ImportSummary, ImportError> {
    let spec = parse_openapi(text)?;
    let groups = if separate_collections {
        group_by_folder(spec.requests)
    } else {
        let mut all = IndexMap::new();
        all.insert(
            ALL_REQUESTS_FOLDER.to_string(),
            spec.requests.into_iter().map(|r| r.request).collect(),
        );
        all
    };

    let mut collections = Vec::with_capacity(groups.len());
    let mut total_requests = 0;
    for (folder, requests) in groups {
        let collection = store.create_collection(if separate_collections {
            Collection {
                id: String::new(),
                title: format!("{} - {}", spec.title, folder),
                description: Some(format!("{} endpoints from {}", folder, spec.title)),
            }
        } else {
            Collection {
                id: String::new(),
                title: spec.title.clone(),
                description: spec.description.clone(),
            }
        })?;

        for (order, mut request) in requests.into_iter().enumerate() {
            request.collection_id = collection.id.clone();
            request.order = order as u32;
            store.create_request(request)?;
            total_requests += 1;
        }
        collections.push(collection);
    }

    let message = format!(
        "Successfully imported {} API requests from {}",
        total_requests, spec.title
    );
    tracing::info!("{message}");
    Ok(ImportSummary {
        collections,
        total_requests,
        message,
    })
}

/// Downloads a document for [`import_openapi`].
pub async fn fetch_document(client: &reqwest::Client, url: &str) -> Result<String, ImportError> {
    let failed = |message: String| ImportError::Fetch {
        url: url.to_string(),
        message,
    };
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| failed(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(failed(format!("status {}", status.as_u16())));
    }
    response.text().await.map_err(|e| failed(e.to_string()))
}
