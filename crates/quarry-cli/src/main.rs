use std::{env, fs, path::PathBuf};

use clap::Parser;
use cli::{AddCommand, Args, Commands, EntityKind, UpdateCommand};
use commands::{ListOptions, Session};
use entities::{Product, User};
use error::{CliError, CliResult};
use logging::setup_logging;
use quarry_config::{
    config::{config_path, generate_default_config},
    paths::resolve_path,
    Config,
};
use quarry_db::{CancellationToken, SqliteExecutor};
use tracing::{debug, info};

mod cli;
mod commands;
mod entities;
mod error;
mod logging;
mod parse;
mod render;
mod utils;

/// Runs `$body` with `$E` bound to the entity type behind `$kind`.
macro_rules! with_entity {
    ($kind:expr, $E:ident => $body:expr) => {
        match $kind {
            EntityKind::Products => {
                type $E = Product;
                $body
            }
            EntityKind::Users => {
                type $E = User;
                $body
            }
        }
    };
}

fn config_file(args: &Args) -> CliResult<PathBuf> {
    let Some(ref c) = args.config else {
        return Ok(config_path());
    };
    let path = resolve_path(c)?;
    if path.is_absolute() {
        return Ok(path);
    }
    let cwd = env::current_dir().map_err(|source| CliError::IoError {
        action: "retrieving current directory".into(),
        source,
    })?;
    Ok(cwd.join(path))
}

fn open_database(config: &Config) -> CliResult<SqliteExecutor> {
    let path = config.get_db_path()?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|source| CliError::IoError {
            action: format!("creating directory {}", parent.display()),
            source,
        })?;
    }
    debug!("using database {}", path.display());
    Ok(SqliteExecutor::open(&path)?.with_busy_timeout(config.busy_timeout())?)
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::disable_color();
    }

    let path = config_file(&args)?;

    if let Commands::Config { init } = args.command {
        if init {
            generate_default_config(&path)?;
        } else {
            let config = Config::load(&path)?;
            info!("{}", config.to_annotated_document()?);
        }
        return Ok(());
    }

    let config = Config::load(&path)?;
    let session = Session {
        db: open_database(&config)?,
        config,
        ctx: CancellationToken::new(),
        json: args.json,
    };

    match args.command {
        Commands::Init => commands::init(&session)?,
        Commands::List {
            entity,
            filter,
            orders,
            page,
            size,
            select,
            exclude,
        } => {
            let opts = ListOptions {
                filter: &filter,
                orders: &orders,
                page,
                size,
                select: select.as_deref(),
                exclude: exclude.as_deref(),
            };
            with_entity!(entity, E => commands::list::<E>(&session, opts)?)
        }
        Commands::Count { entity, filter } => {
            with_entity!(entity, E => commands::count::<E>(&session, &filter)?)
        }
        Commands::Get { entity, id } => {
            with_entity!(entity, E => commands::get::<E>(&session, id)?)
        }
        Commands::Delete { entity, id, filter } => {
            with_entity!(entity, E => commands::delete::<E>(&session, id, &filter)?)
        }
        Commands::Add(AddCommand::Product(args)) => {
            commands::add_product(&session, args)?;
        }
        Commands::Add(AddCommand::User(args)) => {
            commands::add_user(&session, args)?;
        }
        Commands::Update(UpdateCommand::Product(args)) => {
            commands::update::<Product>(&session, &args)?;
        }
        Commands::Update(UpdateCommand::User(args)) => {
            commands::update::<User>(&session, &args)?;
        }
        Commands::Config { .. } => unreachable!(),
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
