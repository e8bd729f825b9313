use crate::error::RunError;
use crate::executor::RequestExecutor;
use crate::extraction;
use crate::model::{CollectionRunSummary, Execution, ExecutionStatus, Request, RunResult};
use crate::store::RecordStore;
use crate::variables::VariableMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

/// Variables and controls for one run.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Environment id or name. `None` runs with no environment variables.
    pub environment: Option<String>,
    /// Secrets and command-line values. They shadow environment variables and
    /// are shadowed by extracted ones.
    pub overrides: VariableMap,
    /// Checked before each request; once set, the run stops and reports what
    /// it executed so far.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl RunOptions {
    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::SeqCst))
    }
}

pub struct CollectionRunner<'a> {
    store: &'a dyn RecordStore,
    executor: &'a RequestExecutor,
}

impl<'a> CollectionRunner<'a> {
    pub fn new(store: &'a dyn RecordStore, executor: &'a RequestExecutor) -> Self {
        Self { store, executor }
    }

    fn environment_variables(&self, options: &RunOptions) -> Result<VariableMap, RunError> {
        Ok(match &options.environment {
            Some(name) => self.store.find_environment(name)?.variables,
            None => VariableMap::new(),
        })
    }

    /// Runs every request of the collection in stored order. Only missing
    /// records or an empty collection fail the run itself.
    pub async fn run(
        &self,
        collection_id: &str,
        options: &RunOptions,
    ) -> Result<CollectionRunSummary, RunError> {
        let collection = self.store.find_collection(collection_id)?;
        let environment = self.environment_variables(options)?;
        let requests = self.store.list_requests(&collection.id)?;
        if requests.is_empty() {
            return Err(RunError::EmptyCollection(collection.title));
        }

        tracing::info!(
            "running collection '{}' ({} requests)",
            collection.title,
            requests.len()
        );
        Ok(self
            .run_requests(&collection.id, &requests, &environment, options)
            .await)
    }

    /// The run loop over already loaded requests.
    pub async fn run_requests(
        &self,
        collection_id: &str,
        requests: &[Request],
        environment: &VariableMap,
        options: &RunOptions,
    ) -> CollectionRunSummary {
        let started = Instant::now();
        let mut extracted = VariableMap::new();
        let mut results = Vec::with_capacity(requests.len());
        let mut cancelled = false;

        for (index, request) in requests.iter().enumerate() {
            if options.cancelled() {
                tracing::warn!("run cancelled after {index} of {} requests", requests.len());
                cancelled = true;
                break;
            }

            let scopes = [&extracted, &options.overrides, environment];
            let execution = self.executor.execute(request, &scopes).await;

            let harvested = extraction::extract(
                &request.extraction_rules,
                execution.response_body.as_deref().unwrap_or_default(),
            );
            extracted.extend(harvested.clone());

            tracing::info!(
                "[{}/{}] {} {} -> {}",
                index + 1,
                requests.len(),
                request.method,
                request.title,
                execution.status.as_str()
            );
            results.push(RunResult {
                request_id: request.id.clone(),
                title: request.title.clone(),
                error: match execution.status {
                    ExecutionStatus::Error => execution.error_message.clone(),
                    _ => None,
                },
                execution,
                extracted: harvested,
            });
        }

        let summary = CollectionRunSummary::from_results(
            collection_id,
            results,
            cancelled,
            started.elapsed().as_millis() as u64,
        );
        tracing::info!(
            "run finished: {} passed, {} failed, {} errors of {}",
            summary.passed,
            summary.failed,
            summary.errors,
            summary.total
        );
        summary
    }

    /// Runs one stored request outside a collection run.
    pub async fn run_request(
        &self,
        request_id: &str,
        options: &RunOptions,
    ) -> Result<Execution, RunError> {
        let request = self.store.get_request(request_id)?;
        let environment = self.environment_variables(options)?;
        let scopes = [&options.overrides, &environment];
        Ok(self.executor.execute(&request, &scopes).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::error::StoreError;
    use crate::model::Collection;
    use crate::store::JsonStore;

    fn store_with_collection(requests: usize) -> JsonStore {
        let store = JsonStore::in_memory();
        store
            .create_collection(Collection {
                id: "c1".to_string(),
                title: "Smoke".to_string(),
                description: None,
            })
            .unwrap();
        for i in 0..requests {
            store
                .create_request(Request {
                    id: format!("r{i}"),
                    title: format!("request {i}"),
                    url: "http://127.0.0.1:9/".to_string(),
                    collection_id: "c1".to_string(),
                    order: i as u32,
                    ..Default::default()
                })
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn test_empty_collection_is_rejected() {
        let store = store_with_collection(0);
        let executor = RequestExecutor::new(EngineConfig::default()).unwrap();
        let runner = CollectionRunner::new(&store, &executor);
        let error = runner.run("c1", &RunOptions::default()).await.unwrap_err();
        assert_eq!(error.to_string(), "No requests in collection Smoke");
    }

    #[tokio::test]
    async fn test_missing_environment_is_rejected() {
        let store = store_with_collection(1);
        let executor = RequestExecutor::new(EngineConfig::default()).unwrap();
        let runner = CollectionRunner::new(&store, &executor);
        let options = RunOptions {
            environment: Some("prod".to_string()),
            ..Default::default()
        };
        let error = runner.run("c1", &options).await.unwrap_err();
        assert!(matches!(
            error,
            RunError::Store(StoreError::EnvironmentNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_errors_do_not_stop_the_run() {
        let store = store_with_collection(3);
        let executor = RequestExecutor::new(EngineConfig::default()).unwrap();
        let runner = CollectionRunner::new(&store, &executor);
        let summary = runner.run("Smoke", &RunOptions::default()).await.unwrap();
        assert_eq!(summary.total, 3);
        assert_eq!(summary.errors, 3);
        assert!(summary.results.iter().all(|r| r.error.is_some()));
        assert!(!summary.all_passed());
    }

    #[tokio::test]
    async fn test_cancelled_before_start_runs_nothing() {
        let store = store_with_collection(2);
        let executor = RequestExecutor::new(EngineConfig::default()).unwrap();
        let runner = CollectionRunner::new(&store, &executor);
        let options = RunOptions {
            cancel: Some(Arc::new(AtomicBool::new(true))),
            ..Default::default()
        };
        let summary = runner.run("c1", &options).await.unwrap();
        assert!(summary.cancelled);
        assert_eq!(summary.total, 0);
    }
}
