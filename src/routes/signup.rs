use crate::{
    error::{GatherError, SqlxAction, SqlxSnafu},
    state::GatherState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use snafu::ResultExt;

#[derive(Deserialize, Debug)]
pub struct SignupForm {
    pub email: Option<String>,
}

///`POST /events/:event_id/signup` - records a community member's interest.
///
///The lookup-then-insert matches what clients already see ("already used" on
///a repeat), and the unique index on (LOWER(email), event_id) catches the
///race two concurrent requests would otherwise win together.
#[axum::debug_handler]
async fn post_signup(
    Path(event_id): Path<i32>,
    State(state): State<GatherState>,
    Json(SignupForm { email }): Json<SignupForm>,
) -> Result<impl IntoResponse, GatherError> {
    let Some(email) = email else {
        return Err(GatherError::MissingFields {
            fields: vec!["email"],
        });
    };

    let event_exists = sqlx::query_scalar::<_, i32>(
        r#"
SELECT id FROM events WHERE id = $1
        "#,
    )
    .bind(event_id)
    .fetch_optional(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingEvent(event_id),
    })?;

    if event_exists.is_none() {
        return Err(GatherError::EventNotFound { id: event_id });
    }

    let existing = sqlx::query_scalar::<_, i32>(
        r#"
SELECT id FROM signups
WHERE LOWER(email) = LOWER($1) AND event_id = $2
        "#,
    )
    .bind(&email)
    .bind(event_id)
    .fetch_optional(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingSignup { event_id },
    })?;

    if existing.is_some() {
        return Err(GatherError::AlreadySignedUp { event_id });
    }

    if let Err(e) = sqlx::query(
        r#"
INSERT INTO signups (email, event_id)
VALUES ($1, $2)
        "#,
    )
    .bind(&email)
    .bind(event_id)
    .execute(&mut *state.get_connection().await?)
    .await
    {
        //two requests can pass the lookup together - the index decides
        if e.as_database_error()
            .is_some_and(|db| db.is_unique_violation())
        {
            return Err(GatherError::AlreadySignedUp { event_id });
        }
        return Err(e).context(SqlxSnafu {
            action: SqlxAction::AddingSignup { event_id },
        });
    }

    info!(event_id, "Recorded signup");

    Ok(Json(json!({ "message": "Signed Up" })))
}

pub fn router() -> Router<GatherState> {
    Router::new().route("/events/:event_id/signup", post(post_signup))
}
