//! Image caption generator: an axum service that forwards an inline image to a
//! hosted vision model and relays the caption, plus the client pieces that
//! produce those images.

pub mod captioner;
pub mod client;
pub mod config;
pub mod error;
pub mod openai;
pub mod page;
pub mod payload;
pub mod provider;
pub mod routes;

pub use captioner::{Captioner, FALLBACK_CAPTION};
pub use config::{Config, RetryPolicy};
pub use error::{CaptionError, ErrorCategory, ErrorDescriptor, ProviderFailure};
pub use payload::ImagePayload;
pub use provider::{CaptionRequest, VisionProvider};
pub use routes::{router, AppState};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs the global fmt subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
