// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;

use anyhow::{Context, Result, bail};
use config::Config;
use lazytime_app::AppState;
use lazytime_db::Store;
use log::{error, info};
use std::env;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    parse_cli_args(env::args().skip(1))?;

    let config_path = Config::default_path()?;
    let config = Config::load(&config_path)
        .with_context(|| format!("load config {}", config_path.display()))?;

    let _logger = match config
        .log_dir()
        .and_then(|dir| logging::init_logging(config.log_level(), &dir))
    {
        Ok(handle) => Some(handle),
        Err(error) => {
            eprintln!("warning: file logging disabled: {error:#}");
            None
        }
    };

    let db_path = config.db_path()?;
    let mut store = Store::open(&db_path).with_context(|| {
        format!(
            "open database {} -- if this path is wrong, set [storage].db_path or LAZYTIME_DB_PATH",
            db_path.display()
        )
    })?;
    if let Err(err) = store.bootstrap() {
        error!("event=store_bootstrap module=cli status=error error={err:#}");
        return Err(err).with_context(|| format!("prepare database {}", db_path.display()));
    }

    let mut state = AppState::default();
    let result = lazytime_tui::run_app(&mut state, &mut store);
    match &result {
        Ok(()) => info!("event=session_end module=cli status=ok"),
        Err(err) => error!("event=session_end module=cli status=error error={err:#}"),
    }
    result
}

fn parse_cli_args<I, S>(args: I) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    if let Some(arg) = args.into_iter().next() {
        bail!(
            "unexpected argument {:?}\nusage: lazytime\n\nlazytime takes no flags; set [storage].db_path in the config or LAZYTIME_DB_PATH to choose the database",
            arg.as_ref()
        );
    }
    Ok(())
}
