use std::fs::File;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use simplelog::{ConfigBuilder, WriteLogger};

use docent::api::{AuthBackend, BackendClient, Credentials};
use docent::core::action::Action;
use docent::core::auth::{DEFAULT_EXCHANGE_FAILURE, SessionGate};
use docent::core::config::{self, ResolvedConfig};
use docent::core::credentials;
use docent::core::driver::Driver;
use docent::core::state::App;
use docent::core::store::JsonFileStore;
use docent::core::SessionError;

#[derive(Parser)]
#[command(name = "docent", about = "Chat with an assistant grounded in your SharePoint documents")]
struct Args {
    /// Backend API root, e.g. http://localhost:8000/api
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Open the chat interface (default)
    Chat,
    /// Sign in with an authorization code or the full redirect URL
    Login {
        /// Code or redirect URL; prompted for when omitted
        code: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in and which backend is used
    Status,
    /// Manage the file-store app registration
    #[command(subcommand)]
    Credentials(CredentialsCommand),
}

#[derive(Subcommand)]
enum CredentialsCommand {
    Show,
    Set {
        #[arg(long)]
        client_id: String,
        #[arg(long)]
        client_secret: String,
        #[arg(long)]
        tenant_id: String,
    },
}

fn init_logging(config: &ResolvedConfig) {
    let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
    let path = config::config_dir()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok())
        .map(|dir| dir.join("docent.log"))
        .unwrap_or_else(|| "docent.log".into());

    if let Ok(log_file) = File::create(&path) {
        let _ = WriteLogger::init(config.log_filter(), log_config, log_file);
    }
}

fn open_gate() -> SessionGate {
    let path = config::config_dir()
        .map(|dir| dir.join("auth.json"))
        .unwrap_or_else(|| "auth.json".into());
    SessionGate::restore(Box::new(JsonFileStore::open_or_empty(path)))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let (file_config, config_source) = match config::load_config() {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let config = config::resolve(&file_config, args.base_url.as_deref());
    init_logging(&config);
    config_source.log();
    log::debug!("Config: {:?}", file_config);
    log::info!("Docent starting up against {}", config.base_url);

    let gate = open_gate();
    let backend = Arc::new(BackendClient::from_config(&config));

    let result = match args.command.unwrap_or(Command::Chat) {
        Command::Chat => docent::tui::run(App::new(gate, &config), backend)
            .map_err(|e| e.to_string()),
        Command::Login { code } => login(App::new(gate, &config), backend, code).await,
        Command::Logout => {
            let mut gate = gate;
            gate.logout();
            println!("Signed out.");
            Ok(())
        }
        Command::Status => {
            match gate.username() {
                Some(user) if gate.is_authenticated() => println!("Signed in as {user}"),
                _ if gate.is_authenticated() => println!("Signed in"),
                _ => println!("Not signed in"),
            }
            println!("Backend: {}", config.base_url);
            Ok(())
        }
        Command::Credentials(cmd) => run_credentials(gate, backend.as_ref(), cmd)
            .await
            .map_err(|e| e.to_string()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn login(app: App, backend: Arc<BackendClient>, code: Option<String>) -> Result<(), String> {
    if app.gate.is_authenticated() {
        println!("Already signed in. Run `docent logout` first.");
        return Ok(());
    }

    let code = match code {
        Some(code) => code,
        None => {
            let url = backend
                .login_url(&app.redirect_uri)
                .await
                .map_err(|e| e.to_string())?;
            println!("Open this URL to sign in:\n\n  {url}\n");
            print!("Paste the redirect URL or code: ");
            io::stdout().flush().map_err(|e| e.to_string())?;
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| e.to_string())?;
            line
        }
    };

    let mut driver = Driver::new(app, backend);
    driver.dispatch(Action::CompleteLogin(code)).await;
    if driver.app.gate.is_authenticated() {
        println!("Signed in as {}", driver.app.gate.username().unwrap_or("unknown user"));
        Ok(())
    } else {
        Err(driver
            .app
            .login_error
            .unwrap_or_else(|| DEFAULT_EXCHANGE_FAILURE.to_string()))
    }
}

async fn run_credentials(
    mut gate: SessionGate,
    backend: &BackendClient,
    cmd: CredentialsCommand,
) -> Result<(), SessionError> {
    match cmd {
        CredentialsCommand::Show => match credentials::fetch_credentials(&mut gate, backend).await? {
            Some(c) if c.is_configured() => {
                println!("client_id: {}", c.client_id.unwrap_or_default());
                println!("client_secret: ********");
                println!("tenant_id: {}", c.tenant_id.unwrap_or_default());
            }
            _ => println!("No credentials configured."),
        },
        CredentialsCommand::Set {
            client_id,
            client_secret,
            tenant_id,
        } => {
            let creds = Credentials::new(client_id, client_secret, tenant_id);
            credentials::save_credentials(&mut gate, backend, &creds).await?;
            println!("Credentials saved successfully!");
        }
    }
    Ok(())
}
