use crate::commands::collection::RunResultView;
use crate::commands::shared::{
    run_options, EngineArgs, EnvArgs, OutputArgs, VariableArgs, WorkspaceArgs,
};
use crate::core::error::QaError;
use crate::core::formatter::get_formatter;
use crate::core::logger::Logger;
use clap::{Args, Subcommand};
use qarun_lib::model::{Execution, ExecutionStatus, Request, RunResult};
use qarun_lib::{generate_code, CollectionRunner, JsonStore, RecordStore, RequestExecutor};
use serde::Serialize;

#[derive(Serialize)]
pub struct RequestSummaryView {
    pub id: String,
    pub title: String,
    pub method: String,
    pub url: String,
    pub collection: String,
    pub order: u32,
}

impl RequestSummaryView {
    fn new(request: &Request, collection: &str) -> Self {
        Self {
            id: request.id.clone(),
            title: request.title.clone(),
            method: request.method.to_string(),
            url: request.url.clone(),
            collection: collection.to_string(),
            order: request.order,
        }
    }
}

#[derive(Serialize)]
pub struct AssertionView {
    #[serde(rename = "type")]
    pub assertion_type: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub field: String,
    pub operator: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expected: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
}

#[derive(Serialize)]
pub struct RequestDetailsView {
    #[serde(rename = "Request")]
    pub title: String,
    #[serde(rename = "Id")]
    pub id: String,
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Headers")]
    pub headers: Vec<String>,
    #[serde(rename = "Query")]
    pub query: Vec<String>,
    #[serde(rename = "Body type")]
    pub body_type: String,
    #[serde(rename = "Auth")]
    pub auth: String,
    #[serde(rename = "Assertions")]
    pub assertions: Vec<AssertionView>,
    #[serde(rename = "Extracts")]
    pub extracts: Vec<String>,
    #[serde(rename = "Pre-request script", skip_serializing_if = "Option::is_none")]
    pub pre_request_script: Option<String>,
}

impl From<&Request> for RequestDetailsView {
    fn from(request: &Request) -> Self {
        Self {
            title: request.title.clone(),
            id: request.id.clone(),
            method: request.method.to_string(),
            url: request.url.clone(),
            headers: request
                .headers
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect(),
            query: request
                .query_params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect(),
            body_type: request.body.body_type().as_str().to_string(),
            auth: request.auth.auth_type().as_str().to_string(),
            assertions: request
                .assertions
                .iter()
                .map(|a| AssertionView {
                    assertion_type: a.assertion_type.to_string(),
                    field: a.field.clone(),
                    operator: a.operator.to_string(),
                    expected: a.expected_value.clone(),
                    disabled: !a.enabled,
                })
                .collect(),
            extracts: request
                .extraction_rules
                .iter()
                .filter(|rule| rule.enabled)
                .map(|rule| format!("{} <- {}", rule.variable_name, rule.json_path))
                .collect(),
            pre_request_script: request.pre_request_script.clone(),
        }
    }
}

#[derive(Debug, Args)]
#[command(about = "Inspect, run and export requests")]
pub struct RequestCommand {
    #[command(subcommand)]
    pub command: RequestSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum RequestSubcommand {
    #[command(about = "List requests")]
    List(ListArgs),
    #[command(about = "Show request details")]
    Show(ShowArgs),
    #[command(about = "Run a single request")]
    Run(RunArgs),
    #[command(about = "Generate a Playwright test for a request")]
    Code(CodeArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(
        short = 'c',
        long = "collection",
        help = "Only requests of this collection (id or title)"
    )]
    pub collection: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(help = "Request id")]
    pub id: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(help = "Request id")]
    pub id: String,

    #[command(flatten)]
    pub env_args: EnvArgs,

    #[command(flatten)]
    pub variables: VariableArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[arg(long = "body", help = "Print the response body")]
    pub show_body: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct CodeArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(help = "Request id")]
    pub id: String,

    #[arg(
        long = "run",
        help = "Execute the request first and export what was actually sent"
    )]
    pub run: bool,

    #[command(flatten)]
    pub env_args: EnvArgs,

    #[command(flatten)]
    pub variables: VariableArgs,

    #[command(flatten)]
    pub engine: EngineArgs,
}

fn get_request(store: &JsonStore, id: &str) -> Result<Request, QaError> {
    Ok(store.get_request(id)?)
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let collections = match &args.collection {
        Some(reference) => vec![store.find_collection(reference).map_err(QaError::from)?],
        None => store.list_collections().map_err(QaError::from)?,
    };

    let mut views = Vec::new();
    for collection in &collections {
        for request in store.list_requests(&collection.id).map_err(QaError::from)? {
            views.push(RequestSummaryView::new(&request, &collection.title));
        }
    }

    let formatter = get_formatter(&args.output.output);
    print!("{}", formatter.format_list(&views, "", "No requests found"));

    Ok(())
}

pub fn execute_show(args: &ShowArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let request = get_request(&store, &args.id)?;

    let formatter = get_formatter(&args.output.output);
    let view = RequestDetailsView::from(&request);
    print!("{}", formatter.format_view(&view, &request));

    Ok(())
}

async fn execute_stored(
    store: &JsonStore,
    executor: &RequestExecutor,
    workspace: &WorkspaceArgs,
    env_args: &EnvArgs,
    variables: &VariableArgs,
    id: &str,
) -> Result<Execution, QaError> {
    let options = run_options(workspace, env_args, variables, None)?;
    let runner = CollectionRunner::new(store, executor);
    Ok(runner.run_request(id, &options).await?)
}

fn log_execution(execution: &Execution) {
    if !Logger::is_debug() {
        return;
    }
    tracing::debug!("--- HTTP Response ---");
    if let Some(code) = execution.status_code {
        tracing::debug!("Response status: {} ({} ms)", code, execution.response_time);
    }
    for (key, value) in &execution.response_headers {
        tracing::debug!("  {key}: {value}");
    }
    tracing::debug!("--- End Response ---");
}

pub async fn execute_run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let request = get_request(&store, &args.id)?;
    let executor = args.engine.executor()?;
    let execution = execute_stored(
        &store,
        &executor,
        &args.workspace,
        &args.env_args,
        &args.variables,
        &request.id,
    )
    .await?;
    log_execution(&execution);

    let formatter = get_formatter(&args.output.output);
    let result = RunResult {
        request_id: request.id.clone(),
        title: request.title.clone(),
        error: execution.error_message.clone(),
        execution,
        extracted: Default::default(),
    };
    let view = RunResultView::from(&result);
    print!("{}", formatter.format_view(&view, &result.execution));
    if args.show_body && !formatter.is_json() {
        if let Some(body) = result.execution.response_body.as_deref() {
            println!("{body}");
        }
    }

    match result.execution.status {
        ExecutionStatus::Passed => Ok(()),
        ExecutionStatus::Error => Err(QaError::Execution(
            result.execution.error_message.unwrap_or_default(),
        )
        .into()),
        ExecutionStatus::Failed => Err(QaError::RunFailed {
            not_passed: 1,
            total: 1,
        }
        .into()),
    }
}

pub async fn execute_code(args: &CodeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let request = get_request(&store, &args.id)?;

    let execution = if args.run {
        let executor = args.engine.executor()?;
        let execution = execute_stored(
            &store,
            &executor,
            &args.workspace,
            &args.env_args,
            &args.variables,
            &request.id,
        )
        .await?;
        if let Some(message) = &execution.error_message {
            tracing::warn!("request failed, exporting the stored definition: {message}");
        }
        Some(execution)
    } else {
        None
    };

    print!("{}", generate_code(&request, execution.as_ref()));

    Ok(())
}
