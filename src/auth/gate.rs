//! The authentication gate: an ordered chain of credential verifiers.
//!
//! A bearer token is checked first; if that yields nothing the server-side
//! session is consulted; otherwise the request is rejected with a 401. An
//! unusable token (bad signature, expired) is logged and deliberately falls
//! through to the session check rather than hard-failing - existing clients
//! depend on that behaviour.

use crate::{
    auth::{session, token, StaffIdentity},
    error::GatherError,
    state::GatherState,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use http::header::AUTHORIZATION;
use tower_sessions::Session;

#[async_trait::async_trait]
impl FromRequestParts<GatherState> for StaffIdentity {
    type Rejection = GatherError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &GatherState,
    ) -> Result<Self, Self::Rejection> {
        if let Some(identity) = verify_bearer(parts, state) {
            return Ok(identity);
        }

        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(_, message)| GatherError::SessionUnavailable { message })?;

        match session::read_identity(&session).await? {
            Some(identity) => Ok(identity),
            None => Err(GatherError::NotAuthenticated),
        }
    }
}

fn verify_bearer(parts: &Parts, state: &GatherState) -> Option<StaffIdentity> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = header.strip_prefix("Bearer ")?;

    match token::decode_token(token, &state.settings.auth.token_secret) {
        Ok(claims) => Some(claims.into()),
        Err(e) => {
            warn!(?e, "Unusable bearer token, falling back to session");
            None
        }
    }
}
