use clap::Parser;
use cli::{Args, Commands};
use error::CliResult;
use inspect::{list_columns, list_tables};
use logging::setup_logging;
use query::SelectOptions;
use sqldb::Database;
use sqldb_config::config::{generate_default_config, set_config_path, Config};
use sqldb_utils::{
    id::{uid, uuid},
    path::resolve_path,
};
use tracing::{debug, info};

mod cli;
mod error;
mod inspect;
mod logging;
mod output;
mod query;
mod utils;

fn open_database(args: &Args) -> CliResult<Database> {
    let config = Config::new()?;
    let profile = config.select_profile(args.profile.as_deref())?;
    debug!(
        "using {} profile `{}`",
        profile.backend,
        args.profile.as_deref().unwrap_or(&config.default_profile)
    );
    Ok(Database::new(profile.clone())?)
}

fn handle_cli() -> CliResult<()> {
    let args = Args::parse();

    setup_logging(&args);

    if args.no_color {
        utils::disable_color();
    }

    if let Some(ref c) = args.config {
        set_config_path(resolve_path(c)?);
    }

    let json = args.json;

    match args.command {
        Commands::DefConfig => generate_default_config()?,
        Commands::Uid {
            length,
        } => info!("{}", uid(length)),
        Commands::Uuid => info!("{}", uuid()),
        ref command => {
            let mut db = open_database(&args)?;

            match command {
                Commands::Tables => list_tables(&mut db, json)?,
                Commands::Columns {
                    table,
                    raw,
                } => list_columns(&mut db, table, !raw, json)?,
                Commands::Select {
                    table,
                    columns,
                    filter,
                    or,
                    order,
                    desc,
                    limit,
                    sql,
                } => query::select(
                    &mut db,
                    SelectOptions {
                        table: table.clone(),
                        columns: columns.clone(),
                        filters: filter.clone(),
                        or: *or,
                        order: order.clone(),
                        desc: *desc,
                        limit: *limit,
                        sql: *sql,
                    },
                    json,
                )?,
                Commands::Count {
                    table,
                    filter,
                    or,
                } => query::count(&mut db, table, filter, *or, json)?,
                Commands::Query {
                    sql,
                } => query::query(&mut db, sql, json)?,
                Commands::Exec {
                    sql,
                } => query::exec(&mut db, sql, json)?,
                Commands::Exists {
                    table,
                } => query::exists(&mut db, table.as_deref(), json)?,
                Commands::CreateDb => {
                    db.builder().create()?;
                    info!("Created database `{}`", db.config().name);
                }
                Commands::DropDb => {
                    db.builder().drop()?;
                    info!("Dropped database `{}`", db.config().name);
                }
                Commands::DefConfig | Commands::Uid { .. } | Commands::Uuid => unreachable!(),
            }
        }
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
