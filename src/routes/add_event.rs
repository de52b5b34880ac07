//! `POST /events` - staff-authenticated event creation.
//!
//! NB: image uploads are not handled here; clients send an already-hosted
//! `image_url` if they have one.

use crate::{
    auth::StaffIdentity,
    error::{GatherError, SqlxAction, SqlxSnafu},
    routes::EventResponse,
    state::{db_objects::DbEvent, GatherState},
};
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::Deserialize;
use snafu::ResultExt;

#[derive(Deserialize, Debug)]
pub struct LocationForm {
    pub zip_code: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct EventForm {
    pub name: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub duration_minutes: Option<i32>,
    pub location: Option<LocationForm>,
}

#[axum::debug_handler]
async fn post_add_event(
    identity: StaffIdentity,
    State(state): State<GatherState>,
    Json(form): Json<EventForm>,
) -> Result<impl IntoResponse, GatherError> {
    let mut missing = vec![];
    if form.name.is_none() {
        missing.push("name");
    }
    if form.date.is_none() {
        missing.push("date");
    }
    let (Some(name), Some(date)) = (form.name, form.date) else {
        return Err(GatherError::MissingFields { fields: missing });
    };

    let location = form.location.unwrap_or(LocationForm {
        zip_code: None,
        address: None,
        city: None,
    });

    debug!(%name, staff_id = identity.id, "Adding event");

    let event = sqlx::query_as::<_, DbEvent>(
        r#"
INSERT INTO events
(event_name, description, "date", image_url, duration_minutes, zip_code, address, city, staff_id)
VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
RETURNING id, event_name, description, "date", image_url, duration_minutes, zip_code, address, city, staff_id
        "#,
    )
    .bind(&name)
    .bind(&form.description)
    .bind(date)
    .bind(&form.image_url)
    .bind(form.duration_minutes)
    .bind(&location.zip_code)
    .bind(&location.address)
    .bind(&location.city)
    .bind(identity.id)
    .fetch_one(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::AddingEvent,
    })?;

    Ok((StatusCode::CREATED, Json(EventResponse::new(event, None))))
}

pub fn router() -> Router<GatherState> {
    Router::new().route("/events", post(post_add_event))
}
