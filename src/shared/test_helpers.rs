#[cfg(test)]
use crate::features::auth::model::AuthenticatedUser;

#[cfg(test)]
use axum::{extract::Request, middleware::Next, response::Response, Router};

#[cfg(test)]
pub fn create_staff_user(username: &str) -> AuthenticatedUser {
    AuthenticatedUser {
        sub: username.to_string(),
        display_name: Some("Test Staff".to_string()),
        roles: vec!["staff".to_string()],
    }
}

#[cfg(test)]
async fn inject_staff_middleware(mut request: Request, next: Next) -> Response {
    request
        .extensions_mut()
        .insert(create_staff_user("teststaff"));
    next.run(request).await
}

/// Wrap a router so every request carries a pre-resolved staff identity,
/// standing in for the JWT middleware.
#[cfg(test)]
pub fn with_staff_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_staff_middleware))
}
