//! CLI auth command handlers for login, status, and logout.

use std::sync::Arc;

use crate::auth::store::{FileTokenStore, TokenStore};
use crate::auth::{ActivationStatus, AuthError, DeviceFlowCoordinator};
use crate::config::TadoConfig;

/// Load configuration from the environment, applying the `--profile` flag.
pub fn load_config(profile: Option<&str>) -> Result<TadoConfig, Box<dyn std::error::Error>> {
    let mut config = TadoConfig::from_env()?;
    if let Some(profile) = profile {
        config.profile = profile.to_string();
    }
    Ok(config)
}

/// Coordinator backed by the default file store, restored when possible.
pub fn coordinator(config: TadoConfig) -> Result<DeviceFlowCoordinator, AuthError> {
    let coordinator =
        DeviceFlowCoordinator::new(config).with_store(Arc::new(FileTokenStore::new_default()));
    coordinator.restore_from_store()?;
    Ok(coordinator)
}

/// Handle `tado auth login`.
pub async fn handle_login(
    config: TadoConfig,
    force: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let profile = config.profile.clone();
    let auth = coordinator(config)?;

    if auth.activation_status() == ActivationStatus::Completed {
        if !force {
            println!("✅ Already logged in (profile {profile})");
            println!("   Use --force to link again.");
            return Ok(());
        }
        auth.logout()?;
    }

    let session = auth.begin_device_flow().await?;
    println!("🔗 Visit: {}", session.verification_url());
    println!("📋 Enter code: {}", session.user_code);
    println!("⏳ Waiting for authorization...");

    match auth.await_activation().await {
        Ok(credential) => {
            println!("✅ tado login successful!");
            println!(
                "   Access token valid until {}",
                credential.expires_at.format("%Y-%m-%d %H:%M")
            );
            Ok(())
        }
        Err(AuthError::AuthorizationDenied) => {
            eprintln!("❌ Authorization denied");
            std::process::exit(1);
        }
        Err(AuthError::AuthorizationExpired | AuthError::AuthorizationTimeout { .. }) => {
            eprintln!("❌ Device code expired, please try again");
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle `tado auth status`.
pub async fn handle_status(config: TadoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let store = FileTokenStore::new_default();

    println!("🔐 Authentication Status\n");

    let status = match store.load(&config.profile)? {
        Some(credential) => {
            if credential.expires_at > chrono::Utc::now() {
                format!(
                    "✅ Logged in (expires {})",
                    credential.expires_at.format("%Y-%m-%d %H:%M")
                )
            } else if credential.refresh_token.is_some() {
                "⚠️  Token expired (will auto-refresh)".to_string()
            } else {
                "⚠️  Token expired, run `tado auth login`".to_string()
            }
        }
        None => "❌ Not logged in".to_string(),
    };
    println!("  {}: {status}", config.profile);

    println!("\n📌 Environment Variables:");
    for env_key in ["TADO_CLIENT_ID", "TADO_PROFILE", "TADO_API_BASE_URL"] {
        let status = if std::env::var(env_key).is_ok() {
            "✅ Set"
        } else {
            "❌ Not set"
        };
        println!("  {env_key}: {status}");
    }

    Ok(())
}

/// Handle `tado auth logout`.
pub async fn handle_logout(config: TadoConfig) -> Result<(), Box<dyn std::error::Error>> {
    let profile = config.profile.clone();
    let auth = coordinator(config)?;
    auth.logout()?;
    println!("✅ Logged out from profile {profile}");
    Ok(())
}
