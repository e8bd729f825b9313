use crate::commands::shared::{OutputArgs, WorkspaceArgs};
use crate::core::error::QaError;
use clap::{Args, Subcommand};
use qarun_lib::RecordStore;
use serde::Serialize;

#[derive(Serialize)]
pub struct EnvironmentView {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Names only; values may hold credentials.
    pub variables: Vec<String>,
}

#[derive(Args)]
#[command(name = "env")]
#[command(about = "Manage environments")]
pub struct EnvCommand {
    #[command(subcommand)]
    pub command: EnvSubcommand,
}

#[derive(Subcommand)]
pub enum EnvSubcommand {
    #[command(about = "List environments")]
    List(ListArgs),
}

#[derive(Args)]
pub struct ListArgs {
    #[command(flatten)]
    pub workspace: WorkspaceArgs,

    #[command(flatten)]
    pub output: OutputArgs,
}

pub fn execute_list(args: &ListArgs) -> Result<(), Box<dyn std::error::Error>> {
    let store = args.workspace.open()?;
    let env_list: Vec<EnvironmentView> = store
        .list_environments()
        .map_err(QaError::from)?
        .into_iter()
        .map(|env| EnvironmentView {
            id: env.id,
            name: env.name,
            description: env.description,
            variables: env.variables.into_keys().collect(),
        })
        .collect();

    let formatter = crate::core::formatter::get_formatter(&args.output.output);
    print!(
        "{}",
        formatter.format_list(&env_list, "Environments found:", "No environments found")
    );

    Ok(())
}
