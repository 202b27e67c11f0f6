//! Application state shared across handlers.

use std::sync::Arc;

use thiserror::Error;

use crate::config::StorefrontConfig;
use crate::stripe::{StripeClient, StripeError};
use crate::woo::{WooClient, WooError};

/// Error constructing application state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("backend client: {0}")]
    Woo(#[from] WooError),
    #[error("payment client: {0}")]
    Stripe(#[from] StripeError),
}

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`. There is no shared mutable state: all
/// cross-request coordination lives in the external backend and payment
/// provider.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    woo: WooClient,
    stripe: StripeClient,
}

impl AppState {
    /// Create a new application state, building both API clients from the
    /// configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if either HTTP client fails to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let woo = WooClient::new(&config.woo, config.backend_timeout)?;
        let stripe = StripeClient::new(&config.stripe, config.backend_timeout)?;

        Ok(Self {
            inner: Arc::new(AppStateInner { config, woo, stripe }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the WooCommerce API client.
    #[must_use]
    pub fn woo(&self) -> &WooClient {
        &self.inner.woo
    }

    /// Get a reference to the Stripe API client.
    #[must_use]
    pub fn stripe(&self) -> &StripeClient {
        &self.inner.stripe
    }
}
