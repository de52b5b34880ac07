use crate::{
    auth::{session, token, StaffIdentity},
    error::{GatherError, SqlxAction, SqlxSnafu},
    state::{
        db_objects::{DbStaff, StaffSummary},
        GatherState,
    },
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use bcrypt::verify;
use serde::Deserialize;
use serde_json::json;
use snafu::ResultExt;
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: Option<String>,
    pub password: Option<String>,
}

///`POST /staff-login` - verifies the password, issues a 24h bearer token and
///populates the session so either credential works afterwards.
#[axum::debug_handler]
async fn post_login(
    session: Session,
    State(state): State<GatherState>,
    Json(LoginForm { email, password }): Json<LoginForm>,
) -> Result<impl IntoResponse, GatherError> {
    let mut missing = vec![];
    if email.is_none() {
        missing.push("email");
    }
    if password.is_none() {
        missing.push("password");
    }
    let (Some(email), Some(password)) = (email, password) else {
        return Err(GatherError::MissingFields { fields: missing });
    };

    let db_staff = sqlx::query_as::<_, DbStaff>(
        r#"
SELECT id, email, first_name, last_name, hashed_password, role
FROM staff
WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(&email)
    .fetch_optional(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingStaff(email.clone().into()),
    })?;

    let Some(db_staff) = db_staff else {
        return Err(GatherError::InvalidCredentials);
    };
    let Some(hashed_password) = &db_staff.hashed_password else {
        warn!(%email, "Staff member has no password set");
        return Err(GatherError::InvalidCredentials);
    };

    if !verify(&password, hashed_password)? {
        error!(%email, "Failed login attempt");
        return Err(GatherError::InvalidPassword);
    }

    let identity = StaffIdentity {
        id: db_staff.id,
        email: db_staff.email.clone(),
        role: db_staff.role.clone(),
    };

    let token = token::issue_token(
        &identity,
        &state.settings.auth.token_secret,
        state.settings.auth.token_expiry_hours,
    )?;
    session::store_identity(&session, &identity).await?;

    info!(staff_id = identity.id, "Staff member logged in");

    Ok(Json(json!({
        "token": token,
        "staff": StaffSummary::from(db_staff),
    })))
}

#[axum::debug_handler]
async fn post_logout(session: Session) -> Result<impl IntoResponse, GatherError> {
    session::clear(&session).await?;
    Ok(Json(json!({ "message": "Logged out" })))
}

#[axum::debug_handler]
async fn post_clear_session(session: Session) -> Result<impl IntoResponse, GatherError> {
    session::clear(&session).await?;
    Ok(Json(json!({ "message": "Session cleared" })))
}

///`GET /check-staff-session` - introspects the session alone, never the token.
#[axum::debug_handler]
async fn get_check_session(session: Session) -> Result<impl IntoResponse, GatherError> {
    match session::read_identity(&session).await? {
        Some(identity) => Ok(Json(json!({
            "authenticated": true,
            "staff": identity,
        }))),
        None => Err(GatherError::NotAuthenticated),
    }
}

///`GET /auth/me` - introspects through the full gate, token or session.
#[axum::debug_handler(state = GatherState)]
async fn get_me(identity: StaffIdentity) -> Json<StaffIdentity> {
    Json(identity)
}

pub fn router() -> Router<GatherState> {
    Router::new()
        .route("/staff-login", post(post_login))
        .route("/staff-logout", post(post_logout))
        .route("/clear-session", post(post_clear_session))
        .route("/check-staff-session", get(get_check_session))
        .route("/auth/me", get(get_me))
}
