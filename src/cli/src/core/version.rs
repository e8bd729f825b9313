use lazy_static::lazy_static;

lazy_static! {
    static ref LONG_VERSION: String =
        format!("{} (engine {})", app_version(), qarun_lib::config::version());
}

pub fn app_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// Version line shown by `--version`, with the engine version it was built against.
pub fn long_version() -> &'static str {
    LONG_VERSION.as_str()
}
