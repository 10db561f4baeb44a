use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use filmes::api::HttpFilmesApi;
use filmes::app::{DeleteOutcome, FilmeApp, Gate};
use filmes::config::{self, ClientConfig, ConfigError};
use filmes::error::FilmesError;
use filmes::filme::{FilmeDraft, FilmeId};
use filmes::session::SessionContext;
use filmes::session::claims::RoleResolver;
use filmes::session::provider::{Auth0Provider, AuthError};
use filmes::store::RecordStore;
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),
    #[error("{0}")]
    Filmes(#[from] FilmesError),
    #[error("{0}")]
    Action(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

#[derive(Parser, Debug)]
#[command(name = "filmes", about = "Filmes catalogue client")]
struct Cli {
    /// Override `FILMES_API_URL`.
    #[arg(long)]
    api_url: Option<String>,

    /// Log at debug level (includes the unverified token summary).
    #[arg(long, short, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the identity-provider login URL.
    LoginUrl {
        #[arg(long, default_value = "http://localhost:5173")]
        redirect_uri: String,
    },
    /// Print the identity-provider logout URL.
    LogoutUrl {
        #[arg(long, default_value = "http://localhost:5173")]
        return_to: String,
    },
    /// Show the logged-in user and their roles.
    Whoami,
    List,
    Create {
        #[arg(long)]
        nome: String,
        #[arg(long)]
        descricao: String,
        #[arg(long, help = "Rating between 0 and 5")]
        nota: String,
        #[arg(long)]
        diretor: String,
    },
    Delete {
        id: String,
        #[arg(long, short, default_value_t = false, help = "Skip the confirmation prompt")]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    dotenvy::dotenv().ok();

    let mut config = ClientConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.api_url = api_url.trim_end_matches('/').to_string();
    }
    let provider = Arc::new(Auth0Provider::new(config.auth.clone(), config.timeouts)?);

    match cli.command {
        Command::LoginUrl { redirect_uri } => {
            let (url, state) = provider.authorize_url(&redirect_uri)?;
            println!("{url}");
            eprintln!("state: {state}");
            Ok(())
        }
        Command::LogoutUrl { return_to } => {
            println!("{}", provider.logout_url(&return_to)?);
            Ok(())
        }
        command => {
            let session = Arc::new(SessionContext::new(
                provider.clone(),
                config.auth.audience.clone(),
                RoleResolver::with_namespace(config.auth.roles_claim.clone()),
            ));
            if let Err(e) = session.establish_from_provider().await {
                let (url, _) = provider.authorize_url("http://localhost:5173")?;
                eprintln!("log in at {url} and export FILMES_ACCESS_TOKEN");
                return Err(e.into());
            }
            let api = Arc::new(HttpFilmesApi::new(config.api_url.clone(), config.timeouts)?);
            let mut app = FilmeApp::new(RecordStore::new(api, session));
            run_command(&mut app, command).await
        }
    }
}

fn init_tracing(verbose: bool) {
    let directive = config::log_directive(verbose, std::env::var(EnvFilter::DEFAULT_ENV).ok());
    let filter = EnvFilter::try_new(directive)
        .unwrap_or_else(|_| EnvFilter::new(config::default_log_directive(verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

async fn run_command(app: &mut FilmeApp, command: Command) -> Result<(), CliError> {
    debug_assert_eq!(app.gate(), Gate::Ready);
    match command {
        Command::Whoami => {
            let profile = app.profile().unwrap_or_default();
            print_json(&serde_json::json!({
                "name": profile.name,
                "email": profile.email,
                "picture": profile.picture,
                "admin": app.can_delete(),
            }))
        }
        Command::List => {
            if !app.reload().await {
                return Err(take_error(app));
            }
            print_json(&serde_json::to_value(app.filmes())?)
        }
        Command::Create { nome, descricao, nota, diretor } => {
            app.form = FilmeDraft { nome, descricao, nota, diretor };
            match app.submit().await {
                Some(created) => print_json(&serde_json::to_value(created)?),
                None => Err(take_error(app)),
            }
        }
        Command::Delete { id, yes } => {
            if !app.can_delete() {
                tracing::warn!("current user has no admin role; the server will likely refuse");
            }
            let id = FilmeId::from(id.as_str());
            let confirm = |prompt: &str| yes || prompt_yes_no(prompt);
            match app.delete(&id, &confirm).await {
                DeleteOutcome::Deleted => {
                    println!("deleted {id}");
                    Ok(())
                }
                DeleteOutcome::Cancelled => {
                    eprintln!("cancelled");
                    Ok(())
                }
                DeleteOutcome::Failed => Err(take_error(app)),
            }
        }
        Command::LoginUrl { .. } | Command::LogoutUrl { .. } => Ok(()),
    }
}

fn take_error(app: &mut FilmeApp) -> CliError {
    let message = app.error().unwrap_or("unknown error").to_owned();
    app.dismiss_error();
    CliError::Action(message)
}

fn prompt_yes_no(prompt: &str) -> bool {
    eprint!("{prompt} [y/N] ");
    if io::stderr().flush().is_err() {
        return false;
    }
    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line).is_err() {
        return false;
    }
    matches!(line.trim(), "y" | "Y" | "yes" | "s" | "sim")
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}
