//! Organiser links: a join record grouping a staff member with an ordered
//! batch of events under one timestamp. Largely redundant with the owning
//! staff reference on events themselves, but kept as its own surface.

use crate::{
    auth::StaffIdentity,
    error::{GatherError, SqlxAction, SqlxSnafu},
    routes::EventResponse,
    state::{
        db_objects::{DbEvent, DbOrganiserLink, DbStaff, StaffSummary},
        GatherState,
    },
};
use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use http::StatusCode;
use serde::{Deserialize, Serialize};
use snafu::ResultExt;

#[derive(Serialize)]
struct PopulatedOrganiserLink {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub staff: Option<StaffSummary>,
    pub events: Vec<EventResponse>,
}

///`GET /organisers` - every link with its staff member and events populated.
#[axum::debug_handler]
async fn get_organisers(
    State(state): State<GatherState>,
) -> Result<impl IntoResponse, GatherError> {
    let links = sqlx::query_as::<_, DbOrganiserLink>(
        r#"
SELECT id, created_at, staff_id, event_ids
FROM organiser_links
ORDER BY created_at DESC
        "#,
    )
    .fetch_all(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingOrganiserLinks,
    })?;

    let mut populated = vec![];
    for link in links {
        let staff = sqlx::query_as::<_, DbStaff>(
            r#"
SELECT id, email, first_name, last_name, hashed_password, role
FROM staff
WHERE id = $1
            "#,
        )
        .bind(link.staff_id)
        .fetch_optional(&mut *state.get_connection().await?)
        .await
        .context(SqlxSnafu {
            action: SqlxAction::FindingStaff(link.staff_id.into()),
        })?
        .map(StaffSummary::from);

        let events = sqlx::query_as::<_, DbEvent>(
            r#"
SELECT id, event_name, description, "date", image_url, duration_minutes, zip_code, address, city, staff_id
FROM events
WHERE id = ANY($1)
            "#,
        )
        .bind(&link.event_ids)
        .fetch_all(&mut *state.get_connection().await?)
        .await
        .context(SqlxSnafu {
            action: SqlxAction::FindingAllEvents,
        })?;

        //keep the batch in the order the link recorded it
        let mut ordered = vec![];
        for id in &link.event_ids {
            if let Some(event) = events.iter().find(|e| e.id == *id) {
                ordered.push(EventResponse::new(event.clone(), None));
            }
        }

        populated.push(PopulatedOrganiserLink {
            id: link.id,
            created_at: link.created_at,
            staff,
            events: ordered,
        });
    }

    Ok(Json(populated))
}

#[derive(Deserialize, Debug)]
pub struct OrganiserForm {
    pub event_ids: Option<Vec<i32>>,
}

///`POST /organisers` - links the authenticated staff member to a batch of
///existing events.
#[axum::debug_handler]
async fn post_organisers(
    identity: StaffIdentity,
    State(state): State<GatherState>,
    Json(OrganiserForm { event_ids }): Json<OrganiserForm>,
) -> Result<impl IntoResponse, GatherError> {
    let Some(event_ids) = event_ids else {
        return Err(GatherError::MissingFields {
            fields: vec!["event_ids"],
        });
    };

    let found = sqlx::query_scalar::<_, i32>(
        r#"
SELECT id FROM events WHERE id = ANY($1)
        "#,
    )
    .bind(&event_ids)
    .fetch_all(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingAllEvents,
    })?;

    if let Some(missing) = event_ids.iter().find(|id| !found.contains(id)) {
        return Err(GatherError::EventNotFound { id: *missing });
    }

    let link = sqlx::query_as::<_, DbOrganiserLink>(
        r#"
INSERT INTO organiser_links (staff_id, event_ids)
VALUES ($1, $2)
RETURNING id, created_at, staff_id, event_ids
        "#,
    )
    .bind(identity.id)
    .bind(&event_ids)
    .fetch_one(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::AddingOrganiserLink,
    })?;

    info!(link_id = link.id, staff_id = identity.id, "Created organiser link");

    Ok((StatusCode::CREATED, Json(link)))
}

pub fn router() -> Router<GatherState> {
    Router::new()
        .route("/organisers", get(get_organisers))
        .route("/organisers", post(post_organisers))
}
