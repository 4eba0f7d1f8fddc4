//! sessiongate - inspect the local session store and exercise the route guard.
//!
//! The binary stands in for the browser shell around the mediator: it can
//! write or clear a session record (as the login flow would), report what the
//! guard decides for a path, and send authenticated API requests.

use std::io;

use anyhow::{bail, Context, Result};
use sessiongate_core::api::authorization_value;
use sessiongate_core::session::{SessionUser, UserId};
use sessiongate_core::{
    ApiClient, ApiError, Config, FileStorage, Navigation, RequestAuthenticator, RouteTable, Router,
    SessionAccessor, SessionRecord, SessionState, SessionStorage, SESSION_KEY,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const USAGE: &str = "\
Usage: sessiongate <command>

Commands:
  status                                   Show the stored session
  check <path>                             Run the route guard for a path
  headers                                  Show the Authorization header that would be sent
  get <path>                               Send an authenticated GET to the API
  login --token <t> --role <r> [--id <id>] Store a session record
  logout                                   Remove the session record";

/// Initialize the tracing subscriber for logging
fn init_tracing() {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

/// Config plus the storage and accessor built from it
struct Shell {
    config: Config,
    storage: FileStorage,
    session: SessionAccessor,
}

impl Shell {
    fn load() -> Result<Self> {
        let config = Config::load().context("Failed to load config")?;
        let storage = config.storage()?;
        let session = SessionAccessor::from_storage(storage.clone());
        Ok(Self {
            config,
            storage,
            session,
        })
    }

    fn router(&self) -> Result<Router> {
        let table = RouteTable::application().context("Invalid route table")?;
        Ok(Router::with_config(table, self.session.clone(), &self.config))
    }

    fn client(&self) -> Result<ApiClient> {
        ApiClient::new(&self.config, RequestAuthenticator::new(self.session.clone()))
    }
}

fn status(shell: &Shell) {
    println!("Storage: {}", shell.storage.path().display());
    match shell.session.read() {
        SessionState::Absent => println!("Session: none"),
        SessionState::Present(record) => {
            println!("Session: present");
            println!(
                "  token: {}",
                if record.bearer_token().is_some() { "present" } else { "missing" }
            );
            match record.user {
                Some(ref user) => {
                    let id = user.id.as_ref().map(UserId::to_string);
                    println!("  user id: {}", id.as_deref().unwrap_or("-"));
                    println!("  role: {}", user.role().unwrap_or("-"));
                }
                None => println!("  user: missing"),
            }
        }
    }
}

fn check(shell: &Shell, path: &str) -> Result<()> {
    match shell.router()?.navigate(path) {
        Navigation::Proceed { path, view, params } => {
            println!("proceed {} ({})", path, view.as_deref().unwrap_or("no view"));
            for (name, value) in params {
                println!("  {} = {}", name, value);
            }
        }
        Navigation::Redirect { to } => println!("redirect {}", to),
    }
    Ok(())
}

fn headers(shell: &Shell) {
    // Only the scheme is printed so the token does not end up in shell history
    match authorization_value(&shell.session.read()) {
        Some(_) => println!("Authorization: Bearer <token>"),
        None => println!("(no Authorization header)"),
    }
}

async fn get(shell: &Shell, path: &str) -> Result<()> {
    let body: serde_json::Value = match shell.client()?.get(path).await {
        Ok(body) => body,
        Err(e) if e.downcast_ref::<ApiError>().is_some_and(ApiError::is_auth_failure) => {
            bail!("{}\nThe stored session was refused; run `sessiongate login` again", e)
        }
        Err(e) => return Err(e),
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

enum Command {
    Help,
    Status,
    Check(String),
    Headers,
    Get(String),
    Login(SessionRecord),
    Logout,
}

impl Command {
    /// Parse the arguments after the binary name. Needs no config or storage,
    /// so `help` keeps working when either is broken.
    fn parse(args: &[String]) -> Result<Self> {
        let Some(command) = args.first() else {
            return Ok(Command::Help);
        };
        let command = match (command.as_str(), args.get(1)) {
            ("help" | "--help" | "-h", _) => Command::Help,
            ("status", _) => Command::Status,
            ("check", Some(path)) => Command::Check(path.clone()),
            ("headers", _) => Command::Headers,
            ("get", Some(path)) => Command::Get(path.clone()),
            ("login", _) => Command::Login(parse_login(&args[1..])?),
            ("logout", _) => Command::Logout,
            _ => bail!("Unknown or incomplete command\n\n{}", USAGE),
        };
        Ok(command)
    }
}

fn parse_login(args: &[String]) -> Result<SessionRecord> {
    let mut token = None;
    let mut role = None;
    let mut id = None;

    let mut iter = args.iter();
    while let Some(flag) = iter.next() {
        let value = iter
            .next()
            .with_context(|| format!("Missing value for {}", flag))?;
        match flag.as_str() {
            "--token" => token = Some(value.clone()),
            "--role" => role = Some(value.clone()),
            "--id" => id = Some(UserId::from(value.as_str())),
            other => bail!("Unknown option {}\n\n{}", other, USAGE),
        }
    }

    let Some(token) = token else {
        bail!("login requires --token\n\n{}", USAGE);
    };
    let Some(role) = role else {
        bail!("login requires --role\n\n{}", USAGE);
    };

    Ok(SessionRecord {
        token: Some(token),
        user: Some(SessionUser {
            id,
            role: Some(role),
            ..SessionUser::default()
        }),
    })
}

fn login(shell: &Shell, record: &SessionRecord) -> Result<()> {
    shell
        .storage
        .set(SESSION_KEY, &record.to_json()?)
        .context("Failed to store session")?;
    info!(path = %shell.storage.path().display(), "Session stored");
    println!("Session stored");
    Ok(())
}

fn logout(shell: &Shell) -> Result<()> {
    shell
        .storage
        .remove(SESSION_KEY)
        .context("Failed to remove session")?;
    println!("Session removed");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = Command::parse(&args)?;
    if let Command::Help = command {
        println!("{}", USAGE);
        return Ok(());
    }

    let shell = Shell::load()?;
    match command {
        Command::Help => println!("{}", USAGE),
        Command::Status => status(&shell),
        Command::Check(path) => check(&shell, &path)?,
        Command::Headers => headers(&shell),
        Command::Get(path) => get(&shell, &path).await?,
        Command::Login(record) => login(&shell, &record)?,
        Command::Logout => logout(&shell)?,
    }
    Ok(())
}
