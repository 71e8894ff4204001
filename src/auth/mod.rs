//! OAuth2 device-authorization flow, credential refresh and token storage.

pub mod clock;
pub mod coordinator;
pub mod device_code;
pub mod error;
pub mod oauth;
pub mod store;
pub mod token;

pub use clock::{Clock, TokioClock};
pub use coordinator::DeviceFlowCoordinator;
pub use device_code::{ActivationStatus, DeviceCodePoll, DeviceCodeSession};
pub use error::AuthError;
pub use oauth::TadoOAuth;
pub use store::{FileTokenStore, TokenStore};
pub use token::TokenCredential;
