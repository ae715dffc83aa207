use std::collections::HashSet;
use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::COOKIE;
use axum::http::request::Parts;

use super::AppState;
use crate::docker::ContainerRuntime;
use crate::ssr::SESSION_COOKIE;

/// Decides whether a session token belongs to a signed-in admin.
pub trait Authenticator: Send + Sync + 'static {
    fn authenticate(&self, token: &str) -> bool;
}

/// Accepts a fixed set of tokens.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenAuthenticator {
    tokens: HashSet<String>,
}

impl StaticTokenAuthenticator {
    pub fn new(tokens: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            tokens: tokens
                .into_iter()
                .map(Into::into)
                .filter(|token: &String| !token.is_empty())
                .collect(),
        }
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> bool {
        self.tokens.contains(token)
    }
}

/// Reads the admin session cookie from the request headers.
pub fn session_token(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_owned())
        .filter(|value| !value.is_empty())
}

/// The caller's session, whether or not it is valid.
#[derive(Debug, Clone, Default)]
pub struct Session {
    pub token: Option<String>,
    pub authenticated: bool,
}

impl<R: ContainerRuntime> FromRequestParts<AppState<R>> for Session {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let token = session_token(parts);
        let authenticated = token
            .as_deref()
            .is_some_and(|token| state.authenticator.authenticate(token));
        Ok(Self {
            token,
            authenticated,
        })
    }
}

/// Extractor that rejects requests without a valid session.
#[derive(Debug, Clone)]
pub struct Authenticated;

impl<R: ContainerRuntime> FromRequestParts<AppState<R>> for Authenticated {
    type Rejection = StatusCode;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<R>,
    ) -> Result<Self, Self::Rejection> {
        let Ok(session) = Session::from_request_parts(parts, state).await;
        if session.authenticated {
            Ok(Authenticated)
        } else {
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}
