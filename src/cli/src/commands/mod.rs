pub mod ai;
pub mod collection;
pub mod env;
pub mod import;
pub mod request;
pub mod shared;
pub mod validators;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    Collection(collection::CollectionCommand),
    Request(request::RequestCommand),
    Env(env::EnvCommand),
    Import(import::ImportCommand),
    Ai(ai::AiCommand),
}
