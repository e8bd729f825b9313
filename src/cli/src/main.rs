use clap::{CommandFactory, Parser};

mod commands;
mod core;

use commands::Commands;
use core::exit_code::ExitCode;

#[derive(Parser)]
#[command(name = "qarun")]
#[command(
    about = "Runs API test collections: variables, auth, scripts, assertions and chained extraction."
)]
#[command(version = crate::core::version::long_version())]
struct Args {
    #[arg(short, long, help = "Enable debug logging", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        let exit_code = ExitCode::from(&e);
        std::process::exit(exit_code.code());
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    crate::core::logger::Logger::init(args.debug);

    match args.command {
        Some(Commands::Collection(collection_command)) => match collection_command.command {
            commands::collection::CollectionSubcommand::List(list_args) => {
                commands::collection::execute_list(&list_args)
            }
            commands::collection::CollectionSubcommand::Create(create_args) => {
                commands::collection::execute_create(&create_args)
            }
            commands::collection::CollectionSubcommand::Delete(delete_args) => {
                commands::collection::execute_delete(&delete_args)
            }
            commands::collection::CollectionSubcommand::Run(run_args) => {
                commands::collection::execute_run(&run_args).await
            }
        },
        Some(Commands::Request(request_command)) => match request_command.command {
            commands::request::RequestSubcommand::List(list_args) => {
                commands::request::execute_list(&list_args)
            }
            commands::request::RequestSubcommand::Show(show_args) => {
                commands::request::execute_show(&show_args)
            }
            commands::request::RequestSubcommand::Run(run_args) => {
                commands::request::execute_run(&run_args).await
            }
            commands::request::RequestSubcommand::Code(code_args) => {
                commands::request::execute_code(&code_args).await
            }
        },
        Some(Commands::Env(env_command)) => match env_command.command {
            commands::env::EnvSubcommand::List(list_args) => commands::env::execute_list(&list_args),
        },
        Some(Commands::Import(import_command)) => match import_command.command {
            commands::import::ImportSubcommand::Openapi(openapi_args) => {
                commands::import::execute_openapi(&openapi_args).await
            }
        },
        Some(Commands::Ai(ai_command)) => match ai_command.command {
            commands::ai::AiSubcommand::Assertions(assertions_args) => {
                commands::ai::execute_assertions(&assertions_args).await
            }
            commands::ai::AiSubcommand::Request(request_args) => {
                commands::ai::execute_request(&request_args).await
            }
        },
        None => {
            Args::command().print_help()?;
            println!();
            Ok(())
        }
    }
}
