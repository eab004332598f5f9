use crate::{
    config::Config,
    error, info,
    management::credentials::{self, set_client_id, set_client_secret},
    success, warning,
};

/// Sets or clears the client credential overrides, or shows what resolves
/// when called without arguments. An empty value clears the override.
pub async fn credentials(config: &Config, client_id: Option<String>, client_secret: Option<String>) {
    if client_id.is_none() && client_secret.is_none() {
        show(config).await;
        return;
    }

    if let Some(id) = client_id {
        if let Err(e) = set_client_id(config, &id).await {
            error!("Failed to store client id: {}", e);
        }
        if id.trim().is_empty() {
            success!("Client id override cleared.");
        } else {
            success!("Client id override stored.");
        }
    }

    if let Some(secret) = client_secret {
        if let Err(e) = set_client_secret(config, &secret).await {
            error!("Failed to store client secret: {}", e);
        }
        if secret.trim().is_empty() {
            success!("Client secret override cleared.");
        } else {
            success!("Client secret override stored.");
        }
    }
}

async fn show(config: &Config) {
    match credentials::client_id(config).await {
        Ok(Some(id)) => info!("Client id: {}", id),
        Ok(None) => warning!("No client id configured."),
        Err(e) => error!("Failed to read client id: {}", e),
    }
    match credentials::client_secret(config).await {
        Ok(Some(_)) => info!("Client secret: configured"),
        Ok(None) => warning!("No client secret configured."),
        Err(e) => error!("Failed to read client secret: {}", e),
    }
}
