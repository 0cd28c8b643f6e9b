//! CLI command handlers for login and permissions.

use std::sync::Arc;

use chrono::{Local, Utc};

use crate::api::HttpApiClient;
use crate::auth::{DeviceAuthController, LoginStatus, Navigator, PollPolicy};
use crate::config::ClientConfig;
use crate::permissions::{can_edit_organization, can_view_organization, fetch_organization_permissions};

/// Prints the redirect target; a terminal cannot load it in place.
struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, url: &str) {
        println!("🔗 Continue at: {url}");
    }
}

fn load_config(url: Option<String>) -> Result<ClientConfig, Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    Ok(match url {
        Some(url) => config.with_base_url(url),
        None => config,
    })
}

/// Handle `device-auth login`.
pub async fn handle_login(
    url: Option<String>,
    state: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(url)?;
    let policy = PollPolicy {
        fallback_interval: config.fallback_interval,
    };
    let api = Arc::new(HttpApiClient::new(config)?);
    let controller = DeviceAuthController::new(api, Arc::new(PrintNavigator)).with_policy(policy);

    let mut login = controller.start(state);
    let mut updates = login.subscribe();
    let mut shown_device = false;

    loop {
        let status = updates.borrow_and_update().clone();
        if let (false, Some(device)) = (shown_device, status.device()) {
            println!("🔗 Visit: {}", device.verification_uri);
            println!("📋 Enter code: {}", device.user_code);
            if let Some(expires_at) = device.expires_at(Utc::now()) {
                let local = expires_at.with_timezone(&Local);
                println!("⌛ Code expires at {}", local.format("%H:%M:%S"));
            }
            println!("⏳ Waiting for authorization...");
            shown_device = true;
        }
        if status.is_terminal() || updates.changed().await.is_err() {
            break;
        }
    }

    let status = login.wait().await;
    if let LoginStatus::Succeeded { .. } = status {
        println!("✅ Login successful!");
    }
    status.into_result()?;
    Ok(())
}

/// Handle `device-auth permissions <organization>`.
pub async fn handle_permissions(
    url: Option<String>,
    organization_id: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = HttpApiClient::new(load_config(url)?)?;
    let permissions = fetch_organization_permissions(&api, organization_id).await?;

    println!("🔐 Organization {organization_id}\n");
    println!("  View organization: {}", yes_no(can_view_organization(Some(&permissions))));
    println!("  Edit organization: {}", yes_no(can_edit_organization(Some(&permissions))));
    println!("\n{}", serde_json::to_string_pretty(&permissions)?);
    Ok(())
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "✅"
    } else {
        "❌"
    }
}
