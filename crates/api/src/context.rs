use std::sync::Arc;

use dokon_infra::ShopController;
use dokon_rates::RateProvider;

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct ApiContext {
    pub controller: Arc<ShopController>,
    pub rates: Arc<RateProvider>,
}

/// The acting account for a request, taken from the `x-account` header.
///
/// This is identity, not authentication: session handling lives outside this
/// service. Capability checks resolve against the account store per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorContext {
    username: String,
}

impl ActorContext {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}
