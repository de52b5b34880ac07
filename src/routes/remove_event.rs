use crate::{
    auth::StaffIdentity,
    error::{GatherError, SqlxAction, SqlxSnafu},
    state::GatherState,
};
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::delete,
    Json, Router,
};
use serde_json::json;
use snafu::ResultExt;

///`DELETE /events/:event_id` - removes the event and every signup against it.
#[axum::debug_handler]
async fn delete_event(
    identity: StaffIdentity,
    Path(event_id): Path<i32>,
    State(state): State<GatherState>,
) -> Result<impl IntoResponse, GatherError> {
    let exists = sqlx::query_scalar::<_, i32>(
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

    if exists.is_none() {
        return Err(GatherError::EventNotFound { id: event_id });
    }

    //both deletes or neither - a failure in between must not strand the cascade
    let mut tx = state.begin().await?;

    let removed_signups = sqlx::query(
        r#"
DELETE FROM signups WHERE event_id = $1
        "#,
    )
    .bind(event_id)
    .execute(&mut *tx)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::RemovingSignups { event_id },
    })?
    .rows_affected();

    sqlx::query(
        r#"
DELETE FROM events WHERE id = $1
        "#,
    )
    .bind(event_id)
    .execute(&mut *tx)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::RemovingEvent(event_id),
    })?;

    tx.commit().await.context(SqlxSnafu {
        action: SqlxAction::RemovingEvent(event_id),
    })?;

    info!(event_id, removed_signups, staff_id = identity.id, "Removed event");

    Ok(Json(json!({ "message": "Event Deleted" })))
}

pub fn router() -> Router<GatherState> {
    Router::new().route("/events/:event_id", delete(delete_event))
}
