use crate::commands::shared::{
    run_options, AiArgs, EngineArgs, EnvArgs, OutputArgs, VariableArgs, WorkspaceArgs,
};
use crate::commands::validators;
use crate::core::error::QaError;
use crate::core::formatter::get_formatter;
use clap::{Args, Subcommand};
use qarun_lib::ai::{generate_assertions, generate_request, GeneratedAssertion, OpenAiClient};
use qarun_lib::{CollectionRunner, RecordStore};
use serde::Serialize;

#[derive(Serialize)]
pub struct GeneratedAssertionView {
    pub assertion: String,
    pub description: String,
}

impl From<&GeneratedAssertion> for GeneratedAssertionView {
    fn from(generated: &GeneratedAssertion) -> Self {
        let a = &generated.assertion;
        let mut assertion = a.assertion_type.to_string();
        if !a.field.is_empty() {
            assertion.push_str(&format!(" {}", a.field));
        }
        assertion.push_str(&format!(" {}", a.operator));
        if !a.expected_value.is_empty() {
            assertion.push_str(&format!(" {}", a.expected_value));
        }
        Self {
            assertion,
            description: generated.description.clone(),
        }
    }
}

#[derive(Debug, Args)]
#[command(about = "Generate assertions and requests with an OpenAI-compatible model")]
pub struct AiCommand {
    #[command(subcommand)]
    pub command: AiSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum AiSubcommand {
    #[command(about = "Suggest assertions for a request's response")]
    Assertions(AssertionsArgs),
    #[command(about = "Draft a request from a plain-language description")]
    Request(RequestArgs),
}

#[derive(Debug, Args)]
pub struct AssertionsArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(help = "Request id")]
    pub id: String,

    #[arg(
        long = "body-file",
        help = "Use this saved response body instead of running the request",
        value_parser = validators::validate_path_exists
    )]
    pub body_file: Option<String>,

    #[arg(
        long = "status",
        default_value = "200",
        help = "Status code that goes with --body-file",
        value_parser = validators::validate_status_code
    )]
    pub status: u16,

    #[arg(long = "save", help = "Append the suggestions to the stored request")]
    pub save: bool,

    #[command(flatten)]
    pub env_args: EnvArgs,

    #[command(flatten)]
    pub variables: VariableArgs,

    #[command(flatten)]
    pub engine: EngineArgs,

    #[command(flatten)]
    pub ai: AiArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(help = "What the request should do")]
    pub description: String,

    #[arg(
        short = 'c',
        long = "collection",
        help = "Save the request at the end of this collection (id or title)"
    )]
    pub collection: Option<String>,

    #[command(flatten)]
    pub ai: AiArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub async fn execute_assertions(args: &AssertionsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let mut request = store.get_request(&args.id).map_err(QaError::from)?;

    let (body, status) = match &args.body_file {
        Some(path) => (std::fs::read_to_string(path).map_err(QaError::from)?, args.status),
        None => {
            let executor = args.engine.executor()?;
            let options = run_options(&args.workspace, &args.env_args, &args.variables, None)?;
            let execution = CollectionRunner::new(&store, &executor)
                .run_request(&request.id, &options)
                .await
                .map_err(QaError::from)?;
            match (execution.status_code, execution.response_body) {
                (Some(status), Some(body)) => (body, status),
                _ => {
                    return Err(QaError::Execution(
                        execution.error_message.unwrap_or_default(),
                    )
                    .into())
                }
            }
        }
    };

    let client = OpenAiClient::new(args.ai.config()).map_err(QaError::from)?;
    let generated = generate_assertions(&client, &body, status)
        .await
        .map_err(QaError::from)?;

    let formatter = get_formatter(&args.output.output);
    let views: Vec<GeneratedAssertionView> =
        generated.iter().map(GeneratedAssertionView::from).collect();
    if formatter.is_json() {
        print!("{}", formatter.format(&generated));
    } else {
        print!(
            "{}",
            formatter.format_list(&views, "Suggested assertions:", "No assertions suggested")
        );
    }

    if args.save && !generated.is_empty() {
        let added = generated.len();
        request
            .assertions
            .extend(generated.into_iter().map(|g| g.assertion));
        store.update_request(request).map_err(QaError::from)?;
        eprintln!("Saved {added} assertion(s) to request {}", args.id);
    }

    Ok(())
}

pub async fn execute_request(args: &RequestArgs) -> Result<(), Box<dyn std::error::Error>> {
    let client = OpenAiClient::new(args.ai.config()).map_err(QaError::from)?;
    let mut generated = generate_request(&client, &args.description)
        .await
        .map_err(QaError::from)?;

    if let Some(reference) = &args.collection {
        let store = args.workspace.open()?;
        let collection = store.find_collection(reference).map_err(QaError::from)?;
        let existing = store.list_requests(&collection.id).map_err(QaError::from)?;
        generated.request.collection_id = collection.id.clone();
        generated.request.order = existing.iter().map(|r| r.order + 1).max().unwrap_or(0);
        generated.request = store
            .create_request(generated.request)
            .map_err(QaError::from)?;
        eprintln!(
            "Saved request {} to collection '{}'",
            generated.request.id, collection.title
        );
    }

    let formatter = get_formatter(&args.output.output);
    print!("{}", formatter.format(&generated));

    Ok(())
}
