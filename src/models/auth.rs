//! Signed-in user extracted from the session token.
//!
//! Tokens are HS256 JWTs issued by the auth service. They are read from the
//! identity cookie or, for API clients, from an `Authorization: Bearer` header.

use std::future::{Ready, ready};

use actix_identity::IdentityExt;
use actix_web::dev::Payload;
use actix_web::error::{ErrorInternalServerError, ErrorUnauthorized};
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::domain::role::Role;
use crate::domain::types::{PersonName, TypeConstraintError, UserEmail};
use crate::domain::user::NewUser;
use crate::guard::SessionUser;
use crate::models::config::ServerConfig;

/// Claims carried by the session token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthenticatedUser {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub role_id: i32,
    pub exp: usize,
}

impl AuthenticatedUser {
    /// Known role of the user, `None` when the token carries an unknown id.
    pub fn role(&self) -> Option<Role> {
        Role::from_id(self.role_id)
    }

    pub fn from_jwt(token: &str, secret: &str) -> Result<Self, jsonwebtoken::errors::Error> {
        let validation = Validation::default();
        let data = decode::<Self>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )?;
        Ok(data.claims)
    }

    pub fn to_jwt(&self, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
        encode(
            &Header::default(),
            self,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
    }
}

impl TryFrom<&AuthenticatedUser> for NewUser {
    type Error = TypeConstraintError;

    fn try_from(user: &AuthenticatedUser) -> Result<Self, Self::Error> {
        Ok(NewUser::new(
            PersonName::new(user.name.as_str())?,
            UserEmail::new(user.email.as_str())?,
            Role::try_from(user.role_id)?,
        ))
    }
}

impl From<&AuthenticatedUser> for SessionUser {
    fn from(user: &AuthenticatedUser) -> Self {
        Self {
            id: user.sub.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role_id: user.role_id,
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Option<String> {
    let header = req.headers().get(AUTHORIZATION)?.to_str().ok()?;
    header
        .strip_prefix("Bearer ")
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

fn extract_user(req: &HttpRequest) -> Result<AuthenticatedUser, actix_web::Error> {
    let config = req
        .app_data::<web::Data<ServerConfig>>()
        .ok_or_else(|| ErrorInternalServerError("server configuration is not registered"))?;

    let token = match bearer_token(req) {
        Some(token) => token,
        None => req
            .get_identity()
            .and_then(|identity| identity.id())
            .map_err(|_| ErrorUnauthorized("not signed in"))?,
    };

    AuthenticatedUser::from_jwt(&token, &config.secret).map_err(|err| {
        log::warn!("Rejected session token: {err}");
        ErrorUnauthorized("invalid session token")
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(extract_user(req))
    }
}
