use std::io::{self, Read};

use serde::Serialize;

use crate::api::ApiClient;
use crate::cli::{ExitError, LoginArgs, RegisterArgs, WhoamiArgs};
use crate::domain::{Role, User};
use crate::session::SessionStore;

pub async fn cmd_login(
    api: &ApiClient,
    store: &mut SessionStore,
    args: LoginArgs,
) -> Result<(), ExitError> {
    let email = prompt_if_absent(args.email, "email")?;
    let password = read_password(args.password, args.password_stdin)?;
    if email.is_empty() || password.is_empty() {
        return Err(ExitError::new(
            2,
            "invalid_args: email and password must not be empty",
        ));
    }

    let outcome = store.login(api, &email, &password).await;
    if !outcome.success {
        let message = outcome
            .message
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(ExitError::new(4, format!("login_failed: {message}")));
    }

    let role = outcome.role.map(|r| r.as_str()).unwrap_or("-");
    eprintln!("logged in as {email} ({role})");
    Ok(())
}

pub async fn cmd_register(
    api: &ApiClient,
    store: &SessionStore,
    args: RegisterArgs,
) -> Result<(), ExitError> {
    let name = prompt_if_absent(args.name, "name")?;
    let email = prompt_if_absent(args.email, "email")?;
    let password = read_password(args.password, args.password_stdin)?;
    if name.is_empty() || email.is_empty() || password.is_empty() {
        return Err(ExitError::new(
            2,
            "invalid_args: name, email and password must not be empty",
        ));
    }

    let outcome = store.register(api, &name, &email, &password, args.role).await;
    if !outcome.success {
        let message = outcome
            .message
            .unwrap_or_else(|| "unknown error".to_string());
        return Err(ExitError::new(4, format!("register_failed: {message}")));
    }

    let role = outcome.role.unwrap_or(args.role);
    eprintln!("registered {email} as {role}; run `rently login` to sign in");
    Ok(())
}

pub fn cmd_logout(store: &mut SessionStore) -> Result<(), ExitError> {
    store
        .logout()
        .map_err(|e| ExitError::new(6, format!("filesystem_error: {e:#}")))?;
    eprintln!("logged out");
    Ok(())
}

#[derive(Debug, Serialize)]
struct WhoamiJson<'a> {
    logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<&'a User>,
    actions: Vec<&'static str>,
}

pub fn cmd_whoami(store: &SessionStore, args: WhoamiArgs) -> Result<(), ExitError> {
    let user = store.user();
    let actions = available_actions(store.session().role());

    if args.json {
        let out = WhoamiJson {
            logged_in: user.is_some(),
            user,
            actions,
        };
        println!("{}", super::to_json_pretty(&out)?);
        return Ok(());
    }

    match user {
        Some(user) => println!("{} <{}> · {}", user.name, user.email, user.role),
        None => println!("not logged in"),
    }
    println!("available: {}", actions.join(", "));
    Ok(())
}

fn available_actions(role: Option<Role>) -> Vec<&'static str> {
    match role {
        None => vec!["properties", "contact", "login", "register"],
        Some(Role::Owner) => vec![
            "owner properties",
            "owner dashboard",
            "owner add",
            "owner decide",
            "contact",
            "logout",
        ],
        Some(Role::Tenant) => vec![
            "tenant explore",
            "tenant applications",
            "tenant dashboard",
            "tenant apply",
            "contact",
            "logout",
        ],
    }
}

/// Gate for role-specific commands: a session must exist and carry `role`.
pub fn require_role(store: &SessionStore, role: Role) -> Result<&str, ExitError> {
    let Some(user) = store.user() else {
        return Err(ExitError::new(3, "not_logged_in: run `rently login` first"));
    };
    if user.role != role {
        return Err(ExitError::new(
            3,
            format!(
                "role_mismatch: requires a {role} session, current session is {}",
                user.role
            ),
        ));
    }
    store
        .token()
        .ok_or_else(|| ExitError::new(3, "not_logged_in: run `rently login` first"))
}

fn prompt_if_absent(value: Option<String>, label: &str) -> Result<String, ExitError> {
    if let Some(v) = value {
        return Ok(v);
    }
    dialoguer::Input::<String>::new()
        .with_prompt(label)
        .interact_text()
        .map_err(|e| ExitError::new(2, format!("invalid_args: {label}: {e}")))
}

fn read_password(flag: Option<String>, from_stdin: bool) -> Result<String, ExitError> {
    if from_stdin {
        let mut s = String::new();
        io::stdin()
            .read_to_string(&mut s)
            .map_err(|e| ExitError::new(2, format!("invalid_args: read stdin: {e}")))?;
        return Ok(s.trim().to_string());
    }
    if let Some(p) = flag {
        return Ok(p);
    }
    dialoguer::Password::new()
        .with_prompt("password")
        .interact()
        .map_err(|e| ExitError::new(2, format!("invalid_args: password: {e}")))
}
