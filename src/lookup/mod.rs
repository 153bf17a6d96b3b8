//! Image lookup against a reverse-image-search provider
//!
//! - `image` normalizes uploads and base64 strings into data URLs
//! - `provider` is the seam to the external service, `serpapi_client` its implementation
//! - `relay` runs one lookup and shapes the provider document

pub mod image;
pub mod models;
pub mod provider;
pub mod relay;
pub mod serpapi_client;

pub use image::{InboundImage, DEFAULT_MIME_TYPE};
pub use models::{IdentifyResult, MatchResult, ResponseShape, DEFAULT_MAX_RESULTS};
pub use provider::{ProviderError, VisualSearchProvider};
pub use relay::ImageLookupRelay;
pub use serpapi_client::SerpApiClient;
