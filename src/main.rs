use clap::Parser;
use tablestat::cli::{Cli, Command, ShowArgs};
use tablestat::config::Config;
use tablestat::error::Error;
use tablestat::store::{sqlite, TrackingRegistry};
use tablestat::{logging, report, ResourceKey, Resolver, RunScope, Table};

fn open_registry(config: &Config) -> Result<TrackingRegistry, Error> {
    let conn = sqlite::open(&config.database, config.timeout)?;
    Ok(sqlite::registry(&conn, &config.tracking)?)
}

fn show(config: &Config, args: &ShowArgs) -> Result<(), Error> {
    let key = ResourceKey::new(args.server.as_str(), args.database.as_str(), args.table.as_str())?;
    let registry = open_registry(config)?;

    let scope = if args.last_run { RunScope::LastRun } else { RunScope::Latest };
    let resolver = Resolver::new(&registry)
        .with_scope(scope)
        .with_timeout(config.timeout);

    let table = Table::find_with(&resolver, &key)?;
    report::print(&table, args.json)?;
    Ok(())
}

fn kinds(config: &Config) -> Result<(), Error> {
    let registry = open_registry(config)?;

    println!("{:<16} {:<24}", "Kind", "Tracking table");
    println!("{}", "-".repeat(40));
    for (kind, store) in registry.iter() {
        println!("{:<16} {:<24}", kind.as_str(), store.source());
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.global.verbose);

    let config = match Config::load(&cli.global) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            std::process::exit(1);
        }
    };

    let result = match &cli.command {
        Command::Show(args) => show(&config, args),
        Command::Kinds => kinds(&config),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
