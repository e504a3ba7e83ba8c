//! Session command handlers.

use anyhow::Result;
use rxdesk_core::ApiClient;
use rxdesk_core::session::mask_token;

use super::report;

pub async fn login(client: &ApiClient, username: &str, password: &str) -> Result<()> {
    let session = client.login(username, password).await.map_err(report)?;
    println!("Logged in as {} ({})", session.username, session.role);
    Ok(())
}

pub async fn logout(client: &ApiClient) -> Result<()> {
    if client.logout().await.map_err(report)? {
        println!("Logged out.");
    } else {
        println!("Not logged in.");
    }
    Ok(())
}

pub fn whoami(client: &ApiClient) -> Result<()> {
    let Some(session) = client.current_session().map_err(report)? else {
        anyhow::bail!("Not logged in. Run `rxdesk login` first.");
    };

    println!("username: {}", session.username);
    println!("id:       {}", session.user_id);
    println!("role:     {}", session.role);
    println!(
        "access:   {}",
        if session.role.is_staff() {
            "back office"
        } else {
            "storefront"
        }
    );
    Ok(())
}

pub async fn refresh(client: &ApiClient) -> Result<()> {
    let token = client.refresh().await.map_err(report)?;
    println!("Access token refreshed ({})", mask_token(&token));
    Ok(())
}
