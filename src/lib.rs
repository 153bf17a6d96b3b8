//! Image lookup relay
//!
//! Accepts one image per request, forwards it to a reverse-image-search
//! provider and returns the provider document or a projection of its visual
//! matches.

pub mod api;
pub mod automation;
pub mod config;
pub mod error;
pub mod lookup;
pub mod metrics;

pub use config::Config;
pub use error::{RelayError, Result};
pub use lookup::{IdentifyResult, ImageLookupRelay, InboundImage, MatchResult, ResponseShape};
