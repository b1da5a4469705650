use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::context::ActorContext;

/// Resolve the acting account from the `x-account` header.
///
/// Every domain route requires an actor (it is stamped on audit log entries
/// and drives capability checks). Requests without one are rejected.
pub async fn actor_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let username = extract_actor(req.headers())?;

    req.extensions_mut().insert(ActorContext::new(username));

    Ok(next.run(req).await)
}

fn extract_actor(headers: &HeaderMap) -> Result<String, StatusCode> {
    let header = headers
        .get("x-account")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let username = header
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .trim();

    if username.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(username.to_string())
}
