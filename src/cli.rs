use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::api::ApiClient;
use crate::commands::{auth, browse, contact, owner, tenant, tui};
use crate::domain::{Decision, Role};
use crate::session::SessionStore;

#[derive(Parser, Debug)]
#[command(
    name = "rently",
    about = "Property rental console",
    version = crate::version::VERSION,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// API origin of the rental backend (scheme+host+port).
    #[arg(
        long,
        global = true,
        env = "RENTLY_API_BASE_URL",
        value_name = "ORIGIN",
        default_value = "http://127.0.0.1:5000"
    )]
    pub api_base_url: String,

    /// Directory holding durable client state (the session files).
    #[arg(
        long,
        global = true,
        env = "RENTLY_DATA_DIR",
        value_name = "PATH",
        default_value = "./data"
    )]
    pub data_dir: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Login(LoginArgs),
    Register(RegisterArgs),
    Logout,
    /// Show the current session and the actions it unlocks.
    Whoami(WhoamiArgs),

    /// Browse the public listing (no login required).
    Properties(ListArgs),

    #[command(subcommand)]
    Owner(OwnerCommand),

    #[command(subcommand)]
    Tenant(TenantCommand),

    Contact(ContactArgs),
    Tui(TuiArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LoginArgs {
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    /// Password on the command line (prefer `--password-stdin`).
    #[arg(long, value_name = "PASSWORD", conflicts_with = "password_stdin")]
    pub password: Option<String>,

    /// Read the password from stdin.
    #[arg(long)]
    pub password_stdin: bool,
}

#[derive(Args, Debug, Clone)]
pub struct RegisterArgs {
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    #[arg(long, value_name = "PASSWORD", conflicts_with = "password_stdin")]
    pub password: Option<String>,

    #[arg(long)]
    pub password_stdin: bool,

    #[arg(long, value_enum, value_name = "ROLE")]
    pub role: Role,
}

#[derive(Args, Debug, Clone)]
pub struct WhoamiArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum OwnerCommand {
    /// List your properties.
    Properties(ListArgs),
    /// Stats and pending requests across your properties.
    Dashboard,
    /// Create a new listing.
    Add(AddPropertyArgs),
    /// Accept or reject a tenant application.
    Decide(DecideArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AddPropertyArgs {
    #[arg(long, value_name = "TEXT", default_value = "")]
    pub title: String,

    #[arg(long, value_name = "TEXT", default_value = "")]
    pub description: String,

    #[arg(long, value_name = "TEXT", default_value = "")]
    pub address: String,

    /// Monthly rent, forwarded as entered.
    #[arg(long, value_name = "PRICE", default_value = "")]
    pub price: String,

    /// Image file to attach to the listing.
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct DecideArgs {
    #[arg(value_name = "REQUEST_ID")]
    pub request_id: String,

    #[arg(value_enum, value_name = "ACTION")]
    pub action: Decision,
}

#[derive(Subcommand, Debug)]
pub enum TenantCommand {
    /// Browse properties open for applications.
    Explore(ListArgs),
    /// List your applications and their status.
    Applications(ListArgs),
    /// Stats over the explore and applications snapshots.
    Dashboard,
    /// Apply for a property.
    Apply(ApplyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ApplyArgs {
    #[arg(value_name = "PROPERTY_ID")]
    pub property_id: String,
}

#[derive(Args, Debug, Clone)]
pub struct ContactArgs {
    /// Defaults to the logged-in user's name.
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// Defaults to the logged-in user's email.
    #[arg(long, value_name = "EMAIL")]
    pub email: Option<String>,

    #[arg(long, value_name = "PHONE")]
    pub phone: Option<String>,

    #[arg(long, value_name = "SUBJECT")]
    pub subject: Option<String>,

    #[arg(long, value_name = "TEXT")]
    pub message: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct TuiArgs {}

#[derive(Debug)]
pub struct ExitError {
    pub code: i32,
    pub message: String,
}

impl ExitError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

pub async fn run() -> i32 {
    let cli = Cli::parse();
    match dispatch(cli).await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e.message);
            e.code
        }
    }
}

async fn dispatch(cli: Cli) -> Result<(), ExitError> {
    validate_origin(&cli.api_base_url)?;
    let api = ApiClient::new(cli.api_base_url.clone());
    let mut store = SessionStore::open(&cli.data_dir)
        .map_err(|e| ExitError::new(6, format!("filesystem_error: {e:#}")))?;

    match cli.command {
        Some(Command::Login(args)) => auth::cmd_login(&api, &mut store, args).await,
        Some(Command::Register(args)) => auth::cmd_register(&api, &store, args).await,
        Some(Command::Logout) => auth::cmd_logout(&mut store),
        Some(Command::Whoami(args)) => auth::cmd_whoami(&store, args),
        Some(Command::Properties(args)) => browse::cmd_properties(&api, args).await,
        Some(Command::Owner(cmd)) => match cmd {
            OwnerCommand::Properties(args) => owner::cmd_properties(&api, &store, args).await,
            OwnerCommand::Dashboard => owner::cmd_dashboard(&api, &store).await,
            OwnerCommand::Add(args) => owner::cmd_add(&api, &store, args).await,
            OwnerCommand::Decide(args) => owner::cmd_decide(&api, &store, args).await,
        },
        Some(Command::Tenant(cmd)) => match cmd {
            TenantCommand::Explore(args) => tenant::cmd_explore(&api, &store, args).await,
            TenantCommand::Applications(args) => tenant::cmd_applications(&api, &store, args).await,
            TenantCommand::Dashboard => tenant::cmd_dashboard(&api, &store).await,
            TenantCommand::Apply(args) => tenant::cmd_apply(&api, &store, args).await,
        },
        Some(Command::Contact(args)) => contact::cmd_contact(&api, &store, args).await,
        Some(Command::Tui(_args)) => tui::cmd_tui(&api, &store).await,
        None => tui::cmd_tui(&api, &store).await,
    }
}

fn validate_origin(origin: &str) -> Result<(), ExitError> {
    let url = reqwest::Url::parse(origin)
        .map_err(|_| ExitError::new(2, "invalid_args: --api-base-url must be a valid URL"))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ExitError::new(
            2,
            "invalid_args: --api-base-url must use http or https",
        ));
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err(ExitError::new(
            2,
            "invalid_args: --api-base-url must be an origin (no path/query)",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_flags_absent() {
        let cli = Cli::try_parse_from(["rently", "whoami"]).unwrap();
        assert_eq!(cli.api_base_url, "http://127.0.0.1:5000");
        assert_eq!(cli.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn decide_takes_request_id_and_action() {
        let cli = Cli::try_parse_from(["rently", "owner", "decide", "r1", "accepted"]).unwrap();
        let Some(Command::Owner(OwnerCommand::Decide(args))) = cli.command else {
            panic!("expected owner decide");
        };
        assert_eq!(args.request_id, "r1");
        assert_eq!(args.action, Decision::Accepted);
    }

    #[test]
    fn password_flag_conflicts_with_stdin() {
        let err = Cli::try_parse_from([
            "rently",
            "login",
            "--password",
            "pw",
            "--password-stdin",
        ])
        .unwrap_err();
        assert!(err.to_string().contains("--password-stdin"));
    }

    #[test]
    fn origin_must_not_carry_a_path() {
        assert!(validate_origin("http://127.0.0.1:5000").is_ok());
        assert!(validate_origin("http://127.0.0.1:5000/api").is_err());
        assert!(validate_origin("ftp://127.0.0.1").is_err());
        assert!(validate_origin("not a url").is_err());
    }
}
