pub mod functions;
pub mod secrets;
mod substitute;

pub use substitute::{lookup, substitute, substitute_json, unresolved_variables};

use indexmap::IndexMap;

/// One scope of `name -> value` pairs. Lookups walk a slice of scopes in order.
pub type VariableMap = IndexMap<String, String>;
