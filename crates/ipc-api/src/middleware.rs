use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Basic},
};

use crate::{AppState, errors::ApiError, helpers::credentials_match};

/// Guards the admin routes with HTTP Basic credentials.
pub async fn require_admin(
    State(state): State<AppState>,
    auth: Option<TypedHeader<Authorization<Basic>>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(TypedHeader(basic)) = auth else {
        return Err(ApiError::Unauthorized(
            "Admin credentials required".to_string(),
        ));
    };

    let admin = &state.config.admin;
    let user_ok = credentials_match(&admin.username, basic.username());
    let pass_ok = credentials_match(&admin.password, basic.password());
    if !(user_ok && pass_ok) {
        tracing::warn!(
            username = basic.username(),
            path = %request.uri().path(),
            "Rejected admin credentials"
        );
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    Ok(next.run(request).await)
}
