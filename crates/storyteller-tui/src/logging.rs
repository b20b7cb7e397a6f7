use anyhow::Result;
use env_logger::{Env, Target};
use std::fs::{self, OpenOptions};
use std::path::PathBuf;
use storyteller_core::Config;

const LOG_FILE: &str = "storyteller.log";

/// Send log output to a file so it never draws over the alternate screen.
/// Level comes from `RUST_LOG`, defaulting to `info`.
pub fn init() -> Result<PathBuf> {
    let dir = Config::config_dir()?;
    fs::create_dir_all(&dir)?;

    let path = dir.join(LOG_FILE);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .try_init()?;

    Ok(path)
}
