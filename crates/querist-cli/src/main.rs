use std::{
    env,
    fs,
    io::{self, Read},
    path::PathBuf,
};

use clap::Parser;
use cli::{Args, Commands};
use error::{CliResult, ErrorContext};
use logging::setup_logging;
use querist_config::{
    config::{generate_default_config, Config, CONFIG_PATH},
    error::ConfigError,
};
use querist_db::{connect, Database, ExecOptions, Row, SqliteDriver};
use querist_query::{count, select};
use tracing::{debug, info};
use utils::{format_row, COLOR};

mod cli;
mod error;
mod logging;
mod utils;

fn load_config(args: &Args) -> CliResult<Config> {
    if let Some(ref c) = args.config {
        let path = PathBuf::from(c);
        let path = if path.is_absolute() {
            path
        } else {
            env::current_dir()
                .with_context(|| "retrieving current directory".into())?
                .join(path)
        };
        let mut config_path = CONFIG_PATH.write().unwrap();
        *config_path = path;
    }

    let mut config = Config::new()?;
    if let Some(ref db) = args.db {
        if db.trim().is_empty() {
            return Err(ConfigError::EmptyPath.into());
        }
        config.path = db.clone();
    }
    Ok(config)
}

fn read_script(file: &str) -> CliResult<String> {
    if file == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .with_context(|| "reading script from stdin".into())?;
        Ok(buffer)
    } else {
        fs::read_to_string(file).with_context(|| format!("reading script {file}"))
    }
}

fn print_row(row: &Row, json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string(row)?);
    } else {
        println!("{}", format_row(row));
    }
    Ok(())
}

fn open(config: &Config) -> CliResult<Database<SqliteDriver>> {
    debug!("Connecting to {} ({:?})", config.path, config.engine);
    Ok(connect(config)?)
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    if args.no_color {
        let mut color = COLOR.write().unwrap();
        *color = false;
    }

    if let Commands::DefConfig = args.command {
        setup_logging(&args, false);
        generate_default_config()?;
        return Ok(());
    }

    let config = load_config(&args)?;
    setup_logging(&args, config.verbose);

    match args.command {
        Commands::Exec {
            ref file,
            no_clean,
            transact,
        } => {
            let script = read_script(file)?;
            let db = open(&config)?;
            db.exec(
                script,
                ExecOptions {
                    clean: !no_clean,
                    transact,
                },
            )?;
            info!("Script executed");
        }
        Commands::All {
            ref sql,
        } => {
            let db = open(&config)?;
            let mut failed = None;
            let rows = db.each(sql, |row| {
                if failed.is_none() {
                    failed = print_row(&row, args.json).err();
                }
            })?;
            if let Some(err) = failed {
                return Err(err);
            }
            debug!("{rows} row(s)");
        }
        Commands::Get {
            ref sql,
        } => {
            let db = open(&config)?;
            match db.get(sql)? {
                Some(row) => print_row(&row, args.json)?,
                None => info!("No rows"),
            }
        }
        Commands::Run {
            ref sql,
        } => {
            let db = open(&config)?;
            let result = db.run(sql)?;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "last_insert_id": result.last_insert_id,
                        "changes": result.changes,
                    })
                );
            } else {
                info!(
                    "{} row(s) changed, last insert id {}",
                    result.changes, result.last_insert_id
                );
            }
        }
        Commands::Count {
            ref table,
        } => {
            let db = open(&config)?;
            let query = select([count()]).from(table.as_str());
            if let Some(row) = db.get(&query)? {
                print_row(&row, args.json)?;
            }
        }
        Commands::Env => {
            info!("QUERIST_CONFIG={}", CONFIG_PATH.read().unwrap().display());
            info!("QUERIST_DB={}", config.path);
            info!("QUERIST_ENGINE={:?}", config.engine);
            info!("QUERIST_MODE={}", config.mode.as_deref().unwrap_or("rwc"));
        }
        Commands::DefConfig => unreachable!(),
    }

    Ok(())
}

fn main() {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))
    .ok();

    if let Err(err) = handle_cli() {
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(1);
    }
}
