//! Convenience re-exports for common use.

pub use crate::auth::{
    ActivationStatus, AuthError, Clock, DeviceCodeSession, DeviceFlowCoordinator,
    FileTokenStore, TokenCredential, TokenStore,
};
pub use crate::client::TadoClient;
pub use crate::config::TadoConfig;
pub use crate::error::{Result, TadoError};
pub use crate::models::{HomeId, PresenceMode, SerialNo, ZoneId, ZoneOverlayRequest};
