use log::LevelFilter;

/// Initializes `env_logger`. `RUST_LOG` module filters still apply on top of `level`.
pub fn init_logger(level: LevelFilter) {
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
