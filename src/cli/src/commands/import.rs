use crate::commands::shared::{OutputArgs, WorkspaceArgs};
use crate::commands::validators;
use crate::core::error::QaError;
use crate::core::formatter::get_formatter;
use clap::{Args, Subcommand};
use qarun_lib::import::{fetch_document, import_openapi, ImportSummary};
use qarun_lib::EngineConfig;
use serde::Serialize;

#[derive(Serialize)]
pub struct ImportView {
    #[serde(rename = "Result")]
    pub message: String,
    #[serde(rename = "Collections")]
    pub collections: Vec<String>,
}

impl From<&ImportSummary> for ImportView {
    fn from(summary: &ImportSummary) -> Self {
        Self {
            message: summary.message.clone(),
            collections: summary
                .collections
                .iter()
                .map(|c| format!("{} ({})", c.title, c.id))
                .collect(),
        }
    }
}

#[derive(Debug, Args)]
#[command(about = "Import requests from API descriptions")]
pub struct ImportCommand {
    #[command(subcommand)]
    pub command: ImportSubcommand,
}

#[derive(Debug, Subcommand)]
pub enum ImportSubcommand {
    #[command(about = "Import an OpenAPI 3 or Swagger 2 JSON document")]
    Openapi(OpenApiArgs),
}

#[derive(Debug, Args)]
pub struct OpenApiArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[arg(
        help = "File path or http(s) URL of the document",
        value_parser = validators::validate_source
    )]
    pub source: String,

    #[arg(
        long = "separate",
        help = "Create one collection per tag instead of a single collection"
    )]
    pub separate: bool,

    #[command(flatten)]
    pub output: OutputArgs,
}

async fn read_source(source: &str) -> Result<String, QaError> {
    if validators::is_url(source) {
        let client = qarun_lib::http::build_client(&EngineConfig::default())?;
        Ok(fetch_document(&client, source).await?)
    } else {
        std::fs::read_to_string(source).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => QaError::FileNotFound(source.to_string()),
            _ => QaError::Io(e),
        })
    }
}

pub async fn execute_openapi(args: &OpenApiArgs) -> Result<(), Box<dyn std::error::Error>> {
    let text = read_source(&args.source).await?;
    let store = args.workspace.open()?;
    let summary = import_openapi(&store, &text, args.separate).map_err(QaError::from)?;

    let formatter = get_formatter(&args.output.output);
    let view = ImportView::from(&summary);
    print!("{}", formatter.format_view(&view, &summary));

    Ok(())
}
