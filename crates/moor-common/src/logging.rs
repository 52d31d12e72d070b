/// Initializes the logger with an `info` default filter.
/// The filter can be overridden via the `RUST_LOG` environment variable.
pub fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
}

/// A variant of [`init_logging`] that tolerates repeated initialization.
/// This is useful in tests where multiple test functions may run in one process.
pub fn try_init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .is_test(true)
        .try_init();
}
