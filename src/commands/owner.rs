use tracing::warn;

use crate::api::{ApiClient, ImageUpload};
use crate::cli::{AddPropertyArgs, DecideArgs, ExitError, ListArgs};
use crate::commands::{api_exit, auth::require_role, format_price};
use crate::domain::{self, ApplicationStatus, Decision, NewProperty, Role};
use crate::session::SessionStore;
use crate::stats;

pub async fn cmd_properties(
    api: &ApiClient,
    store: &SessionStore,
    args: ListArgs,
) -> Result<(), ExitError> {
    let token = require_role(store, Role::Owner)?;
    let properties = api.owner_properties(token).await.map_err(api_exit)?;

    if args.json {
        println!("{}", super::to_json_pretty(&properties)?);
        return Ok(());
    }

    if properties.is_empty() {
        println!("no properties yet");
        return Ok(());
    }
    for p in &properties {
        let pending = p
            .requests
            .iter()
            .filter(|r| r.status == ApplicationStatus::Pending)
            .count();
        println!(
            "{}  {} · {}/month ({pending} pending)",
            p.id,
            p.title,
            format_price(p.price)
        );
        if !p.address.is_empty() {
            println!("    {}", p.address);
        }
    }
    Ok(())
}

pub async fn cmd_dashboard(api: &ApiClient, store: &SessionStore) -> Result<(), ExitError> {
    let token = require_role(store, Role::Owner)?;
    let name = store.user().map(|u| u.name.clone()).unwrap_or_default();
    let properties = api.owner_properties(token).await.map_err(api_exit)?;

    println!("owner dashboard · {name}");
    println!("  total properties: {}", properties.len());
    println!(
        "  pending requests: {}",
        stats::pending_request_count(&properties)
    );
    println!(
        "  active tenants: {}",
        stats::active_tenant_count(&properties)
    );

    for p in &properties {
        let pending: Vec<_> = p
            .requests
            .iter()
            .filter(|r| r.status == ApplicationStatus::Pending)
            .collect();
        if pending.is_empty() {
            continue;
        }
        println!("\n{} · {} pending:", p.title, pending.len());
        for req in pending {
            let (who, email) = req
                .tenant
                .as_ref()
                .map(|t| (t.name.as_str(), t.email.as_str()))
                .unwrap_or(("unknown", "-"));
            println!("  {}  {who} <{email}>", req.id);
        }
    }
    Ok(())
}

pub async fn cmd_add(
    api: &ApiClient,
    store: &SessionStore,
    args: AddPropertyArgs,
) -> Result<(), ExitError> {
    let token = require_role(store, Role::Owner)?;
    let fields = NewProperty {
        title: args.title,
        description: args.description,
        address: args.address,
        price: args.price,
    };
    domain::validate_new_property(&fields)
        .map_err(|e| ExitError::new(2, format!("invalid_args: {e}")))?;

    let image = match &args.image {
        Some(path) => {
            let bytes = std::fs::read(path).map_err(|e| {
                ExitError::new(2, format!("invalid_args: image {}: {e}", path.display()))
            })?;
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image".to_string());
            Some(ImageUpload { file_name, bytes })
        }
        None => None,
    };

    api.add_property(token, &fields, image)
        .await
        .map_err(api_exit)?;
    eprintln!("property added: {}", fields.title);

    match api.owner_properties(token).await {
        Ok(properties) => println!("you now have {} properties", properties.len()),
        Err(e) => warn!(error = %e, "refresh after add failed"),
    }
    Ok(())
}

pub async fn cmd_decide(
    api: &ApiClient,
    store: &SessionStore,
    args: DecideArgs,
) -> Result<(), ExitError> {
    let token = require_role(store, Role::Owner)?;
    submit_decision(api, token, &args.request_id, args.action).await
}

/// Posts the decision and re-fetches the property list; the refreshed snapshot
/// is the only source for the counts we report (no optimistic update).
pub(crate) async fn submit_decision(
    api: &ApiClient,
    token: &str,
    request_id: &str,
    action: Decision,
) -> Result<(), ExitError> {
    api.handle_request(token, request_id, action)
        .await
        .map_err(api_exit)?;
    eprintln!("request {request_id} {action}");

    match api.owner_properties(token).await {
        Ok(properties) => println!(
            "{} requests still pending",
            stats::pending_request_count(&properties)
        ),
        Err(e) => warn!(error = %e, "refresh after decision failed"),
    }
    Ok(())
}

