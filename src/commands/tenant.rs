use tracing::warn;

use crate::api::ApiClient;
use crate::cli::{ApplyArgs, ExitError, ListArgs};
use crate::commands::{api_exit, auth::require_role, browse::print_listing};
use crate::domain::{Application, Role};
use crate::session::SessionStore;
use crate::stats;

pub async fn cmd_explore(
    api: &ApiClient,
    store: &SessionStore,
    args: ListArgs,
) -> Result<(), ExitError> {
    let token = require_role(store, Role::Tenant)?;
    let (properties, applications) = tokio::join!(api.explore(token), api.applications(token));
    let properties = properties.map_err(api_exit)?;
    // Applied markers are best-effort; the listing is the point of the command.
    let applications = match applications {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "fetch applications failed");
            Vec::new()
        }
    };

    if args.json {
        println!("{}", super::to_json_pretty(&properties)?);
        return Ok(());
    }

    if properties.is_empty() {
        println!("nothing to explore");
        return Ok(());
    }
    for p in &properties {
        print_listing(p);
        if stats::is_applied(&applications, &p.id) {
            println!("    already applied");
        }
    }
    Ok(())
}

pub async fn cmd_applications(
    api: &ApiClient,
    store: &SessionStore,
    args: ListArgs,
) -> Result<(), ExitError> {
    let token = require_role(store, Role::Tenant)?;
    let applications = api.applications(token).await.map_err(api_exit)?;

    if args.json {
        println!("{}", super::to_json_pretty(&applications)?);
        return Ok(());
    }

    if applications.is_empty() {
        println!("no applications yet");
        return Ok(());
    }
    for a in &applications {
        print_application(a);
    }
    Ok(())
}

pub async fn cmd_dashboard(api: &ApiClient, store: &SessionStore) -> Result<(), ExitError> {
    let token = require_role(store, Role::Tenant)?;
    let name = store.user().map(|u| u.name.clone()).unwrap_or_default();

    // Both fetches run concurrently with no ordering between them; the stats
    // are derived from whatever each one returned.
    let (properties, applications) = tokio::join!(api.explore(token), api.applications(token));
    let properties = match properties {
        Ok(p) => p,
        Err(e) => {
            warn!(error = %e, "fetch properties failed");
            Vec::new()
        }
    };
    let applications = match applications {
        Ok(a) => a,
        Err(e) => {
            warn!(error = %e, "fetch applications failed");
            Vec::new()
        }
    };

    let derived = stats::tenant_stats(&properties, &applications);
    println!("tenant dashboard · {name}");
    println!("  available properties: {}", derived.total_properties);
    println!("  pending applications: {}", derived.pending);
    println!("  approved applications: {}", derived.approved);

    if !properties.is_empty() {
        println!("\navailable:");
        for p in &properties {
            let marker = if stats::is_applied(&applications, &p.id) {
                "  [applied]"
            } else {
                ""
            };
            println!("  {}  {}{marker}", p.id, p.title);
        }
    }

    if !applications.is_empty() {
        println!("\nmy applications ({}):", applications.len());
        for a in &applications {
            print_application(a);
        }
    }
    Ok(())
}

pub async fn cmd_apply(
    api: &ApiClient,
    store: &SessionStore,
    args: ApplyArgs,
) -> Result<(), ExitError> {
    let token = require_role(store, Role::Tenant)?;
    submit_application(api, token, &args.property_id).await
}

/// Applies, then re-fetches the applications list; the applied state is only
/// reported from the refreshed snapshot, never assumed.
pub(crate) async fn submit_application(
    api: &ApiClient,
    token: &str,
    property_id: &str,
) -> Result<(), ExitError> {
    let message = api.apply(token, property_id).await.map_err(api_exit)?;
    eprintln!("{message}");

    match api.applications(token).await {
        Ok(applications) => {
            let state = if stats::is_applied(&applications, property_id) {
                "recorded"
            } else {
                "not visible yet"
            };
            println!("application {state}; {} total", applications.len());
        }
        Err(e) => warn!(error = %e, "refresh after apply failed"),
    }
    Ok(())
}

fn print_application(a: &Application) {
    let (title, address) = a
        .property
        .as_ref()
        .map(|p| (p.title.as_str(), p.address.as_str()))
        .unwrap_or(("(removed property)", "-"));
    println!("  {}  {title} ({address}) · {}", a.id, a.status);
}
