//! tado° cloud API client.
//!
//! The core is [`auth::DeviceFlowCoordinator`], which links a device to a
//! tado account through the OAuth2 device-authorization grant and keeps the
//! resulting credential fresh. [`client::TadoClient`] layers a typed subset
//! of the v2 REST API on top of it.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use tado_client::prelude::*;
//!
//! # async fn example() -> tado_client::error::Result<()> {
//! let auth = Arc::new(DeviceFlowCoordinator::new(TadoConfig::from_env()?));
//! let session = auth.begin_device_flow().await?;
//! println!("Open {} and confirm code {}", session.verification_url(), session.user_code);
//! auth.await_activation().await?;
//!
//! let client = TadoClient::new(auth);
//! println!("{:?}", client.get_weather().await?);
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod prelude;
pub mod util;

#[cfg(feature = "cli")]
pub mod cli;
