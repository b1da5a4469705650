use axum::http::StatusCode;

use dokon_accounts::Capability;

use crate::app::errors;
use crate::context::{ActorContext, ApiContext};

/// Reject the request unless the acting account holds `capability`.
pub async fn require_capability(
    context: &ApiContext,
    actor: &ActorContext,
    capability: Capability,
) -> Result<(), axum::response::Response> {
    let capabilities = context.controller.capabilities(actor.username()).await;
    if capabilities.allows(capability) {
        Ok(())
    } else {
        Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!(
                "account '{}' lacks the {capability:?} capability",
                actor.username()
            ),
        ))
    }
}
