//! Logger setup for the blockclean CLI.
//! License: MIT OR Apache-2.0

use env_logger::{Builder, Env, Target};
use log::LevelFilter;

/// Initializes `env_logger` on stderr.
///
/// `RUST_LOG` is honored (defaulting to `warn`) unless `level` forces a
/// filter. Calling it twice is harmless.
pub fn init_logger(level: Option<LevelFilter>) {
    let mut builder = Builder::from_env(Env::default().default_filter_or("warn"));
    if let Some(level) = level {
        builder.filter_level(level);
    }
    builder.format_timestamp(None).target(Target::Stderr);
    builder.try_init().ok();
}
