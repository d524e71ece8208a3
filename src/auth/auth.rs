use actix_web::{FromRequest, HttpRequest, dev::Payload, web::Data};
use futures::future::{Ready, ready};

use crate::auth::jwt::{TokenType, verify_token};
use crate::config::Config;
use crate::error::ApiError;
use crate::model::role::Role;
use crate::model::rt::Rt;

/// The authenticated identity handlers work against. Never ambient: every
/// handler that needs the caller takes this as an argument.
pub struct AuthUser {
    pub user_id: u64,
    pub email: String,
    pub role: Role,
    pub rt: Option<Rt>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ApiError::Unauthorized("Missing token".into()).into())),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(actix_web::error::ErrorInternalServerError(
                    "Config missing",
                )));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ApiError::Unauthorized("Invalid token".into()).into())),
        };

        if claims.token_type != TokenType::Access {
            return ready(Err(ApiError::Unauthorized("Invalid token".into()).into()));
        }

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            email: claims.sub,
            role: claims.role,
            rt: claims.rt,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(ApiError::Forbidden(
                "Hanya admin yang dapat melakukan aksi ini".into(),
            ))
        }
    }
}
