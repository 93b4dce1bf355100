use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use actix_web::{App, HttpServer};
use api::{HttpState, RequestTrace, configure};
use leaf_core::model::UserId;
use services::{AppServices, Clock, SeedOutcome};

#[derive(Debug, Parser)]
#[command(name = "leaf", about = "Leaf points ledger HTTP service", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
    /// SQLite URL or path; relative paths resolve against the working directory.
    #[arg(
        long = "db",
        env = "LEAF_DB_URL",
        default_value = "sqlite://leaf.sqlite3",
        global = true
    )]
    db_url: String,
    /// Use the in-memory store instead of SQLite.
    #[arg(long, global = true)]
    in_memory: bool,
    #[arg(long, env = "LEAF_BIND", default_value = "127.0.0.1:8080", global = true)]
    bind: String,
    /// User that `/current` routes act for.
    #[arg(long, env = "LEAF_USER_ID", default_value_t = 1, global = true)]
    user_id: u64,
    /// Seed demo data before serving.
    #[arg(long, global = true)]
    seed: bool,
    /// Emit logs as JSON lines.
    #[arg(long, env = "LEAF_LOG_JSON", global = true)]
    log_json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
enum Command {
    /// Run the HTTP server (default).
    Serve,
    /// Insert the demo dataset and exit.
    Seed,
}

impl Cli {
    fn subcommand(&self) -> Command {
        self.command.unwrap_or(Command::Serve)
    }
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = result {
        eprintln!("tracing init failed: {e}");
    }
}

/// Resolves `sqlite:` / `sqlite://` URLs and bare paths to an absolute
/// `sqlite://` URL, keeping any `?` options.
fn normalize_sqlite_url(raw: String) -> String {
    let trimmed = raw.trim();
    if trimmed == "sqlite::memory:" {
        return trimmed.to_string();
    }

    let rest = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
        .unwrap_or(trimmed);
    let (path_str, options) = match rest.split_once('?') {
        Some((path, options)) => (path, Some(options)),
        None => (rest, None),
    };
    if path_str.is_empty() {
        return trimmed.to_string();
    }

    let path = std::path::Path::new(path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| std::path::PathBuf::from("."))
            .join(path)
    };
    match options {
        Some(options) => format!("sqlite://{}?{options}", absolute.display()),
        None => format!("sqlite://{}", absolute.display()),
    }
}

#[derive(Debug)]
struct InvalidDbUrl(String);

impl std::fmt::Display for InvalidDbUrl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid --db value: {}", self.0)
    }
}

impl std::error::Error for InvalidDbUrl {}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| InvalidDbUrl(db_url.to_string()))?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(InvalidDbUrl(db_url.to_string()).into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

async fn open_services(cli: &Cli, clock: Clock) -> Result<AppServices, Box<dyn std::error::Error>> {
    if cli.in_memory {
        info!("using in-memory store");
        return Ok(AppServices::in_memory(clock));
    }

    if cli.db_url.trim().is_empty() {
        return Err(InvalidDbUrl(cli.db_url.clone()).into());
    }
    let db_url = normalize_sqlite_url(cli.db_url.clone());
    prepare_sqlite_file(&db_url)?;
    info!(db_url = %db_url, "opening sqlite store");
    Ok(AppServices::new_sqlite(&db_url, clock).await?)
}

async fn seed(services: &AppServices) -> Result<UserId, Box<dyn std::error::Error>> {
    let outcome = services.seed_demo().await?;
    if let SeedOutcome::AlreadySeeded { user_id } = outcome {
        warn!(%user_id, "demo data already complete");
    }
    Ok(outcome.user_id())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.log_json);

    let services = open_services(&cli, Clock::System).await?;

    match cli.subcommand() {
        Command::Seed => {
            let user_id = seed(&services).await?;
            println!("demo user id: {user_id}");
            Ok(())
        }
        Command::Serve => {
            // An in-memory store starts empty, so it is always seeded.
            if cli.seed || cli.in_memory {
                seed(&services).await?;
            }
            let routes = configure(HttpState::new(services, UserId::new(cli.user_id)));
            info!(bind = %cli.bind, user_id = cli.user_id, "starting http server");
            HttpServer::new(move || App::new().wrap(RequestTrace).configure(routes.clone()))
                .bind(cli.bind.as_str())?
                .run()
                .await?;
            Ok(())
        }
    }
}

#[actix_web::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["leaf", "--in-memory", "--bind", "0.0.0.0:9000"]).unwrap();
        assert_eq!(cli.subcommand(), Command::Serve);
        assert!(cli.in_memory);
        assert_eq!(cli.bind, "0.0.0.0:9000");
    }

    #[test]
    fn flags_follow_the_seed_subcommand() {
        let cli = Cli::try_parse_from(["leaf", "seed", "--db", "sqlite::memory:", "--user-id", "3"])
            .unwrap();
        assert_eq!(cli.subcommand(), Command::Seed);
        assert_eq!(cli.db_url, "sqlite::memory:");
        assert_eq!(cli.user_id, 3);
    }

    #[test]
    fn rejects_non_numeric_user_id() {
        assert!(Cli::try_parse_from(["leaf", "--user-id", "me"]).is_err());
    }

    #[test]
    fn relative_paths_become_absolute_urls() {
        let url = normalize_sqlite_url("data/leaf.sqlite3".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/leaf.sqlite3"));

        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///var/leaf.db".into()),
            "sqlite:///var/leaf.db"
        );
        assert_eq!(normalize_sqlite_url("sqlite:/tmp/a.db".into()), "sqlite:///tmp/a.db");
    }

    #[test]
    fn default_db_url_is_made_absolute() {
        let cli = Cli::try_parse_from(["leaf"]).unwrap();
        let url = normalize_sqlite_url(cli.db_url);
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(url, format!("sqlite://{}", cwd.join("leaf.sqlite3").display()));

        let url = normalize_sqlite_url("sqlite://data/leaf.db?mode=rwc".into());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/leaf.db?mode=rwc"));
        assert_eq!(normalize_sqlite_url("sqlite://".into()), "sqlite://");
    }

    #[test]
    fn prepare_rejects_unknown_schemes() {
        assert!(prepare_sqlite_file("sqlite::memory:").is_ok());
        assert!(prepare_sqlite_file("postgres://localhost/leaf").is_err());
        assert!(prepare_sqlite_file("sqlite://").is_err());
    }
}
