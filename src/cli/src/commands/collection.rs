use crate::commands::shared::{
    cancel_on_ctrl_c, run_options, EngineArgs, EnvArgs, OutputArgs, VariableArgs, WorkspaceArgs,
};
use crate::core::error::QaError;
use crate::core::formatter::get_formatter;
use clap::{Args, Subcommand};
use qarun_lib::model::{Collection, CollectionRunSummary, RunResult};
use qarun_lib::{CollectionRunner, RecordStore};
use serde::Serialize;

#[derive(Serialize)]
pub struct CollectionView {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub requests: usize,
}

#[derive(Serialize)]
pub struct RunResultView {
    pub request: String,
    pub status: String,
    #[serde(rename = "code", skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(rename = "time")]
    pub response_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub failures: Vec<String>,
    pub warnings: Vec<String>,
}

impl From<&RunResult> for RunResultView {
    fn from(result: &RunResult) -> Self {
        let execution = &result.execution;
        Self {
            request: result.title.clone(),
            status: execution.status.as_str().to_string(),
            status_code: execution.status_code,
            response_time: format!("{} ms", execution.response_time),
            error: result.error.clone(),
            failures: execution.failures.clone(),
            warnings: execution.warnings.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct RunSummaryView {
    #[serde(rename = "Collection")]
    pub collection: String,
    #[serde(rename = "Results")]
    pub results: Vec<RunResultView>,
    #[serde(rename = "Total")]
    pub total: usize,
    #[serde(rename = "Passed")]
    pub passed: usize,
    #[serde(rename = "Failed")]
    pub failed: usize,
    #[serde(rename = "Errors")]
    pub errors: usize,
    #[serde(rename = "Pass rate")]
    pub pass_rate: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Cancelled", skip_serializing_if = "std::ops::Not::not")]
    pub cancelled: bool,
}

impl RunSummaryView {
    fn new(title: &str, summary: &CollectionRunSummary) -> Self {
        Self {
            collection: title.to_string(),
            results: summary.results.iter().map(RunResultView::from).collect(),
            total: summary.total,
            passed: summary.passed,
            failed: summary.failed,
            errors: summary.errors,
            pass_rate: format!("{:.1}%", summary.pass_rate),
            duration: format!("{} ms", summary.duration_ms),
            cancelled: summary.cancelled,
        }
    }
}

#[derive(Debug, Args)]
#[command(about = "Manage and run collections")]
pub struct CollectionCommand {
    #[command(subcommand)]
    pub command: CollectionSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum CollectionSubcommand {
    #[command(about = "List collections")]
    List(ListArgs),
    #[command(about = "Create an empty collection")]
    Create(CreateArgs),
    #[command(about = "Delete a collection and its requests")]
    Delete(DeleteArgs),
    #[command(about = "Run every request of a collection in order")]
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(short = 't', long = "title", help = "Collection title")]
    pub title: String,

    #[arg(short = 'd', long = "description", help = "Collection description")]
    pub description: Option<String>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(help = "Collection id or title")]
    pub collection: String,
}

#[derive(Debug, Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(help = "Collection id or title")]
    pub collection: String,

    #[command(flatten)]
    pub env_args: EnvArgs,

    #[command(flatten)]
    pub variables: VariableArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let views = store
        .list_collections()
        .map_err(QaError::from)?
        .into_iter()
        .map(|collection| {
            let requests = store.list_requests(&collection.id)?.len();
            Ok(CollectionView {
                id: collection.id,
                title: collection.title,
                description: collection.description,
                requests,
            })
        })
        .collect::<Result<Vec<_>, QaError>>()?;

    let formatter = get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(&views, "Collections found:", "No collections found")
    );

    Ok(())
}

pub fn execute_create(args: &CreateArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.title.trim().is_empty() {
        return Err(QaError::Validation("Collection title is empty".to_string()).into());
    }
    let store = args.workspace.open()?;
    let collection = store
        .create_collection(Collection {
            id: String::new(),
            title: args.title.trim().to_string(),
            description: args.description.clone(),
        })
        .map_err(QaError::from)?;

    let formatter = get_formatter(&args.output.output);
    print!("{}", formatter.format(&collection));

    Ok(())
}

pub fn execute_delete(args: &DeleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let collection = store.find_collection(&args.collection).map_err(QaError::from)?;
    let removed = store.delete_collection(&collection.id).map_err(QaError::from)?;
    println!(
        "Deleted collection '{}' and {} request(s)",
        collection.title, removed
    );

    Ok(())
}

pub async fn execute_run(args: &RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let collection = store.find_collection(&args.collection).map_err(QaError::from)?;
    let executor = args.engine.executor()?;
    let options = run_options(
        &args.workspace,
        &args.env_args,
        &args.variables,
        Some(cancel_on_ctrl_c()),
    )?;

    let runner = CollectionRunner::new(&store, &executor);
    let summary = runner
        .run(&collection.id, &options)
        .await
        .map_err(QaError::from)?;

    let formatter = get_formatter(&args.output.output);
    let view = RunSummaryView::new(&collection.title, &summary);
    print!("{}", formatter.format_view(&view, &summary));

    if summary.cancelled {
        return Err(QaError::Generic(format!(
            "Run cancelled after {} request(s)",
            summary.total
        ))
        .into());
    }
    if summary.all_passed() {
        Ok(())
    } else {
        Err(QaError::RunFailed {
            not_passed: summary.total - summary.passed,
            total: summary.total,
        }
        .into())
    }
}
