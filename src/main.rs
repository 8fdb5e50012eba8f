use anyhow::{Context, bail};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::{error, info};
use whatsapp_sqlstore::StoreConfig;
use whatsapp_sqlstore::lid_migration::LidMigrationMappingSyncPayload;
use whatsapp_sqlstore::store::{Container, Dialect, SqlExecutor};

// Maintenance tool for the client's database.
//
// Usage:
//   wastore upgrade                                    # ./whatsapp.db, SQLite
//   wastore --dialect postgres --database-url postgres://... upgrade
//   wastore version
//   wastore check
//   wastore decode-lid-payload 0a0608e80710d00f

#[derive(Parser)]
#[command(name = "wastore", version, about = "Manage the WhatsApp client store")]
struct Cli {
    #[arg(long, env = "WASTORE_DATABASE_URL", default_value = "whatsapp.db")]
    database_url: String,

    /// postgres, mysql or sqlite
    #[arg(long, env = "WASTORE_DIALECT", default_value = "sqlite")]
    dialect: Dialect,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply all pending schema upgrades
    Upgrade,
    /// Print the stored schema version
    Version,
    /// Verify that every table exists
    Check,
    /// Decode a hex-encoded LIDMigrationMappingSyncPayload and print it as JSON
    DecodeLidPayload { hex: String },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{:<5}] [{}] - {}",
                Local::now().format("%H:%M:%S"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e:#}");
        std::process::exit(1);
    }
}

fn decode_lid_payload(hex: &str) -> anyhow::Result<()> {
    let bytes = hex::decode(hex.trim()).context("payload is not valid hex")?;
    let payload = LidMigrationMappingSyncPayload::decode(&bytes)?;
    println!("{}", serde_json::to_string_pretty(&payload)?);
    Ok(())
}

fn run(cli: Cli) -> anyhow::Result<()> {
    // Decoding needs no database.
    if let Command::DecodeLidPayload { hex } = &cli.command {
        return decode_lid_payload(hex);
    }

    let config = StoreConfig::new(cli.database_url, cli.dialect);
    match config.dialect {
        Dialect::Sqlite => {
            let container = Container::open_sqlite(&config.database_url)
                .with_context(|| format!("failed to open {}", config.database_url))?;
            run_command(container, &cli.command)
        }
        #[cfg(feature = "postgres")]
        Dialect::Postgres => run_command(Container::<diesel::PgConnection>::connect(&config)?, &cli.command),
        #[cfg(feature = "mysql")]
        Dialect::MySql => run_command(Container::<diesel::MysqlConnection>::connect(&config)?, &cli.command),
        #[allow(unreachable_patterns)]
        other => bail!("wastore was built without {other} support"),
    }
}

fn run_command<C: SqlExecutor>(mut container: Container<C>, command: &Command) -> anyhow::Result<()> {
    match command {
        Command::Upgrade => {
            let version = container.upgrade()?;
            info!("{} database is at v{version}", container.dialect());
        }
        Command::Version => {
            let version = container.version()?;
            println!("{version} (latest {})", container.latest_version());
        }
        Command::Check => {
            container.verify_tables()?;
            println!("all tables present");
        }
        Command::DecodeLidPayload { hex } => decode_lid_payload(hex)?,
    }
    Ok(())
}
