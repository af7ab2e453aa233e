use crate::api::ApiClient;
use crate::cli::{ContactArgs, ExitError};
use crate::commands::api_exit;
use crate::domain::{self, ContactForm};
use crate::session::SessionStore;

pub async fn cmd_contact(
    api: &ApiClient,
    store: &SessionStore,
    args: ContactArgs,
) -> Result<(), ExitError> {
    let user = store.user();
    let name = args
        .name
        .or_else(|| user.map(|u| u.name.clone()))
        .unwrap_or_default();
    let email = args
        .email
        .or_else(|| user.map(|u| u.email.clone()))
        .unwrap_or_default();
    let message = match args.message {
        Some(m) => m,
        None => dialoguer::Input::<String>::new()
            .with_prompt("message")
            .interact_text()
            .map_err(|e| ExitError::new(2, format!("invalid_args: message: {e}")))?,
    };

    let form = ContactForm {
        name,
        email,
        phone: args.phone,
        subject: args.subject,
        message,
    };
    domain::validate_contact(&form).map_err(|e| ExitError::new(2, format!("invalid_args: {e}")))?;

    let reply = api.contact(&form).await.map_err(api_exit)?;
    eprintln!("{reply}");
    Ok(())
}
