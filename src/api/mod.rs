pub mod cached_client;
pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use cached_client::CachedApiClient;
pub use client::{HttpClient, Transport};
pub use error::ApiError;
pub use session::{CredentialStore, SessionFile, StaticToken};
pub use types::{ApiRequest, ApiResponse};
