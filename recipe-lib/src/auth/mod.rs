use crate::user::UserId;
use actix_web::dev::ServiceRequest;
use actix_web::error::ErrorInternalServerError;
use actix_web::web::Data;
use actix_web::{Error, HttpMessage};
use actix_web_httpauth::extractors::bearer::BearerAuth;
use actix_web_httpauth::extractors::{bearer, AuthenticationError};
use actix_web_httpauth::headers::www_authenticate::bearer::Bearer;
use jwt::JWTAuth;
use recipe_repo::user_repo::{UserRepo, UserRepoError};
use std::sync::Arc;
use tracing::error;
use tracing_actix_web::RootSpan;

pub mod jwt;
pub mod password;

enum Rejection {
    InvalidToken,
    Internal(anyhow::Error),
}

/// Resolves the token to an active user.
async fn authenticate(req: &ServiceRequest, token: &str) -> Result<UserId, Rejection> {
    let jwt_auth = req
        .app_data::<JWTAuth>()
        .ok_or_else(|| Rejection::Internal(anyhow::anyhow!("JWTAuth is not configured")))?;
    let user_id = jwt_auth
        .validate_token(token)
        .map_err(|_| Rejection::InvalidToken)?;

    let user_repo = req
        .app_data::<Data<Arc<dyn UserRepo>>>()
        .ok_or_else(|| Rejection::Internal(anyhow::anyhow!("UserRepo is not configured")))?;
    match user_repo.get_user(user_id).await {
        Ok(user) if user.is_active => Ok(user.id),
        Ok(_) | Err(UserRepoError::UserNotFound(_)) => Err(Rejection::InvalidToken),
        Err(e) => Err(Rejection::Internal(e.into())),
    }
}

/// Validates credentials using [JWTAuth] and checks that the user still exists and is active. If
/// valid, injects the user id into request and into the [RootSpan]
pub async fn credentials_validator(
    req: ServiceRequest,
    credentials: BearerAuth,
) -> Result<ServiceRequest, (Error, ServiceRequest)> {
    match authenticate(&req, credentials.token()).await {
        Ok(user) => {
            if let Some(root_span) = req.extensions().get::<RootSpan>() {
                root_span.record("user_id", user);
            }
            req.extensions_mut().insert::<UserId>(user);
            Ok(req)
        }
        Err(Rejection::InvalidToken) => {
            let challenge = Bearer::build().error(bearer::Error::InvalidToken).finish();
            Err((AuthenticationError::new(challenge).into(), req))
        }
        Err(Rejection::Internal(e)) => {
            error!(error = ?e, "Unable to validate credentials");
            Err((ErrorInternalServerError("Unable to validate credentials"), req))
        }
    }
}
