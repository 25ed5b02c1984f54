use anyhow::Result;

use super::{redact_key, resolve_config};
use crate::ProviderArgs;

pub fn run(args: &ProviderArgs) -> Result<()> {
    let (config, group) = resolve_config(args)?;

    let service = match group.service() {
        Ok(service) => service.to_string(),
        Err(e) => format!("{} ({})", group.service, e),
    };
    let api_key = if group.api_key.is_empty() {
        "(not set)".to_string()
    } else {
        redact_key(&group.api_key)
    };

    println!("Group:    {}", args.group);
    println!("Service:  {}", service);
    println!("API key:  {}", api_key);
    println!("Timeout:  {}s", config.timeout().as_secs());
    if let Some(radius) = args.radius {
        println!("Radius:   {}", radius);
    }
    println!(
        "Groups:   {}",
        config.group_names().collect::<Vec<_>>().join(", ")
    );

    Ok(())
}
