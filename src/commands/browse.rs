use crate::api::ApiClient;
use crate::cli::{ExitError, ListArgs};
use crate::commands::{api_exit, format_price};
use crate::domain::Property;

pub async fn cmd_properties(api: &ApiClient, args: ListArgs) -> Result<(), ExitError> {
    let properties = api.public_properties().await.map_err(api_exit)?;

    if args.json {
        println!("{}", super::to_json_pretty(&properties)?);
        return Ok(());
    }

    if properties.is_empty() {
        println!("no properties listed");
        return Ok(());
    }
    for p in &properties {
        print_listing(p);
    }
    Ok(())
}

pub(crate) fn print_listing(p: &Property) {
    println!("{}  {} · {}/month", p.id, p.title, format_price(p.price));
    if !p.address.is_empty() {
        println!("    {}", p.address);
    }
    if !p.description.is_empty() {
        println!("    {}", p.description);
    }
    if let Some(url) = p.images.first() {
        println!("    image: {url}");
    }
}
