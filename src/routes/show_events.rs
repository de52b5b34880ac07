use crate::{
    error::{GatherError, SqlxAction, SqlxSnafu},
    routes::{EventOwner, EventResponse},
    state::{db_objects::DbEvent, GatherState},
};
use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use snafu::ResultExt;
use sqlx::FromRow;

#[derive(FromRow)]
struct EventWithOwnerRow {
    pub id: i32,
    pub event_name: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub image_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub staff_id: i32,
    pub owner_first_name: Option<String>,
    pub owner_last_name: Option<String>,
    pub owner_email: Option<String>,
}

impl From<EventWithOwnerRow> for EventResponse {
    fn from(row: EventWithOwnerRow) -> Self {
        let staff = match (row.owner_first_name, row.owner_last_name, row.owner_email) {
            (Some(first_name), Some(last_name), Some(email)) => Some(EventOwner {
                first_name,
                last_name,
                email,
            }),
            _ => None,
        };

        Self::new(
            DbEvent {
                id: row.id,
                event_name: row.event_name,
                description: row.description,
                date: row.date,
                image_url: row.image_url,
                duration_minutes: row.duration_minutes,
                zip_code: row.zip_code,
                address: row.address,
                city: row.city,
                staff_id: row.staff_id,
            },
            staff,
        )
    }
}

///`GET /events` - every event, owner populated via the staff join.
#[axum::debug_handler]
async fn get_events(State(state): State<GatherState>) -> Result<impl IntoResponse, GatherError> {
    trace!("Getting events");

    let events: Vec<EventResponse> = sqlx::query_as::<_, EventWithOwnerRow>(
        r#"
SELECT e.id, e.event_name, e.description, e.date, e.image_url, e.duration_minutes,
       e.zip_code, e.address, e.city, e.staff_id,
       s.first_name AS owner_first_name, s.last_name AS owner_last_name, s.email AS owner_email
FROM events e
LEFT JOIN staff s ON s.id = e.staff_id
ORDER BY e.date DESC
        "#,
    )
    .fetch_all(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingAllEvents,
    })?
    .into_iter()
    .map(EventResponse::from)
    .collect();

    Ok(Json(events))
}

pub fn router() -> Router<GatherState> {
    Router::new().route("/events", get(get_events))
}
