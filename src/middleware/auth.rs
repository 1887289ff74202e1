use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};

use crate::auth;
use crate::graphql::context::CurrentUser;

/// Request-scoped authentication state built by the middleware. `user` is
/// `None` for anonymous requests and for invalid tokens; authorization is
/// enforced per-resolver, so absence of a token is not a protocol error.
#[derive(Clone, Debug, Default)]
pub struct AuthContext {
    pub user: Option<CurrentUser>,
}

pub async fn auth_context_middleware(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Response {
    let user = bearer_token(&headers)
        .and_then(|token| auth::validate_jwt(&token).ok())
        .map(CurrentUser::from);

    request.extensions_mut().insert(AuthContext { user });
    next.run(request).await
}

/// Extracts the token from a `Bearer` Authorization header.
fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))?
        .to_str()
        .ok()?;

    let token = value.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
