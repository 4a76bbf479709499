// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Admin authorization gate.
//!
//! Two strategies, picked once at startup from `ADMIN_AUTH_MODE`:
//! - [`CookieAuth`]: the login endpoint sets an httpOnly `admin_pass` cookie
//!   that is compared against the configured password on every request.
//! - [`TokenAuth`]: the login endpoint returns a signed, expiring bearer
//!   token that is verified on every request.
//!
//! The catalog never sees any of this; it only runs behind [`require_admin`].

use crate::config::{AdminAuthMode, Config};
use crate::error::AppError;
use crate::AppState;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use subtle::ConstantTimeEq;

/// Cookie carrying the admin password in cookie mode.
pub const ADMIN_COOKIE: &str = "admin_pass";
/// Lifetime of both the cookie and the token.
pub const ADMIN_SESSION_SECS: i64 = 7 * 24 * 60 * 60;
const ADMIN_SUBJECT: &str = "admin";

/// A way of proving admin rights on a request.
pub trait AdminAuthStrategy: Send + Sync {
    fn mode(&self) -> AdminAuthMode;

    /// `Ok` when the request carries valid admin credentials.
    fn authorize(&self, headers: &HeaderMap, jar: &CookieJar) -> Result<(), AppError>;

    /// Hand out credentials after a successful password login. Returns the
    /// updated cookie jar and, for token mode, the bearer token.
    fn issue(&self, jar: CookieJar) -> Result<(CookieJar, Option<String>), AppError>;

    /// Drop whatever [`issue`](Self::issue) handed out, where possible.
    fn revoke(&self, jar: CookieJar) -> CookieJar;
}

/// Build the strategy selected by configuration.
pub fn strategy_from_config(config: &Config) -> Arc<dyn AdminAuthStrategy> {
    match config.admin_auth_mode {
        AdminAuthMode::Cookie => Arc::new(CookieAuth::new(
            config.admin_password.clone(),
            config.is_production(),
        )),
        AdminAuthMode::Token => Arc::new(TokenAuth::new(config.admin_token_secret.clone())),
    }
}

/// Constant-time password comparison. An empty configured password never
/// matches.
pub fn password_matches(expected: &str, candidate: &str) -> bool {
    !expected.is_empty() && bool::from(expected.as_bytes().ct_eq(candidate.as_bytes()))
}

// ─── Cookie mode ─────────────────────────────────────────────

pub struct CookieAuth {
    password: String,
    secure: bool,
}

impl CookieAuth {
    /// `secure` marks the cookie HTTPS-only (production).
    pub fn new(password: String, secure: bool) -> Self {
        Self { password, secure }
    }

    fn cookie(&self, value: String, max_age: time::Duration) -> Cookie<'static> {
        Cookie::build((ADMIN_COOKIE, value))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(max_age)
            .build()
    }
}

impl AdminAuthStrategy for CookieAuth {
    fn mode(&self) -> AdminAuthMode {
        AdminAuthMode::Cookie
    }

    fn authorize(&self, _headers: &HeaderMap, jar: &CookieJar) -> Result<(), AppError> {
        match jar.get(ADMIN_COOKIE) {
            Some(cookie) if password_matches(&self.password, cookie.value()) => Ok(()),
            _ => Err(AppError::Unauthorized),
        }
    }

    fn issue(&self, jar: CookieJar) -> Result<(CookieJar, Option<String>), AppError> {
        let cookie = self.cookie(
            self.password.clone(),
            time::Duration::seconds(ADMIN_SESSION_SECS),
        );
        Ok((jar.add(cookie), None))
    }

    fn revoke(&self, jar: CookieJar) -> CookieJar {
        jar.add(self.cookie(String::new(), time::Duration::ZERO))
    }
}

// ─── Token mode ──────────────────────────────────────────────

/// Admin token claims.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AdminClaims {
    /// Always "admin"
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

pub struct TokenAuth {
    secret: Vec<u8>,
}

impl TokenAuth {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }

    /// Verify signature, expiry and subject.
    pub fn verify(&self, token: &str) -> Result<AdminClaims, AppError> {
        let key = DecodingKey::from_secret(&self.secret);
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let claims = decode::<AdminClaims>(token, &key, &validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "Admin token rejected");
                AppError::Unauthorized
            })?
            .claims;

        if claims.sub != ADMIN_SUBJECT {
            return Err(AppError::Unauthorized);
        }
        Ok(claims)
    }
}

/// Sign an admin token valid for `ttl_secs`.
pub fn create_admin_token(secret: &[u8], ttl_secs: i64) -> anyhow::Result<String> {
    let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs() as i64;

    let claims = AdminClaims {
        sub: ADMIN_SUBJECT.to_string(),
        iat: now.max(0) as usize,
        exp: (now + ttl_secs).max(0) as usize,
    };

    Ok(encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(secret),
    )?)
}

impl AdminAuthStrategy for TokenAuth {
    fn mode(&self) -> AdminAuthMode {
        AdminAuthMode::Token
    }

    fn authorize(&self, headers: &HeaderMap, _jar: &CookieJar) -> Result<(), AppError> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
            .ok_or(AppError::Unauthorized)?;

        self.verify(token.trim()).map(|_| ())
    }

    fn issue(&self, jar: CookieJar) -> Result<(CookieJar, Option<String>), AppError> {
        let token = create_admin_token(&self.secret, ADMIN_SESSION_SECS)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Token creation failed: {}", e)))?;
        Ok((jar, Some(token)))
    }

    fn revoke(&self, jar: CookieJar) -> CookieJar {
        // Tokens are stateless; the client discards its copy.
        jar
    }
}

// ─── Middleware ──────────────────────────────────────────────

/// Middleware that requires admin credentials.
pub async fn require_admin(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Err(e) = state.admin_auth.authorize(request.headers(), &jar) {
        tracing::warn!(
            mode = ?state.admin_auth.mode(),
            path = %request.uri().path(),
            "Rejected admin request"
        );
        return Err(e);
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &[u8] = b"test_admin_secret_32_bytes_min!!";

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
        );
        headers
    }

    #[test]
    fn test_password_matches() {
        assert!(password_matches("bonsai", "bonsai"));
        assert!(!password_matches("bonsai", "bonsa"));
        assert!(!password_matches("bonsai", ""));
        assert!(!password_matches("", ""));
    }

    #[test]
    fn test_cookie_auth_round_trip() {
        let auth = CookieAuth::new("bonsai".to_string(), false);
        let headers = HeaderMap::new();

        assert!(auth.authorize(&headers, &CookieJar::new()).is_err());

        let (jar, token) = auth.issue(CookieJar::new()).unwrap();
        assert!(token.is_none());
        assert!(auth.authorize(&headers, &jar).is_ok());

        let wrong = CookieJar::new().add(Cookie::new(ADMIN_COOKIE, "guess"));
        assert!(matches!(
            auth.authorize(&headers, &wrong),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_token_auth_round_trip() {
        let auth = TokenAuth::new(SECRET.to_vec());
        let (_, token) = auth.issue(CookieJar::new()).unwrap();
        let token = token.expect("token mode returns a token");

        assert!(auth.authorize(&bearer(&token), &CookieJar::new()).is_ok());
        assert!(auth
            .authorize(&HeaderMap::new(), &CookieJar::new())
            .is_err());
    }

    #[test]
    fn test_token_rejects_wrong_secret_and_expiry() {
        let auth = TokenAuth::new(SECRET.to_vec());

        let forged = create_admin_token(b"some_other_secret", ADMIN_SESSION_SECS).unwrap();
        assert!(auth.verify(&forged).is_err());

        let expired = create_admin_token(SECRET, -60).unwrap();
        assert!(auth.verify(&expired).is_err());

        let claims = auth
            .verify(&create_admin_token(SECRET, ADMIN_SESSION_SECS).unwrap())
            .unwrap();
        assert_eq!(claims.sub, "admin");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_token_rejects_other_subject() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs() as usize;
        let claims = AdminClaims {
            sub: "player".to_string(),
            iat: now,
            exp: now + 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .unwrap();

        assert!(TokenAuth::new(SECRET.to_vec()).verify(&token).is_err());
    }

    #[test]
    fn test_strategy_follows_config() {
        let mut config = Config::test_default();
        assert_eq!(strategy_from_config(&config).mode(), AdminAuthMode::Cookie);

        config.admin_auth_mode = AdminAuthMode::Token;
        assert_eq!(strategy_from_config(&config).mode(), AdminAuthMode::Token);
    }
}
