//! Calendar export, three ways: a downloadable iCalendar file (whole listing
//! or one event), a Google Calendar deep link, and a server-side insert into
//! the caller's own Google Calendar using an OAuth access token they supply.

use crate::{
    error::{GatherError, ReqwestAction, ReqwestSnafu, SqlxAction, SqlxSnafu},
    state::{db_objects::DbEvent, GatherState},
};
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Duration, Utc};
use icalendar::{Calendar, Component, Event as IcalEvent, EventLike};
use serde::{Deserialize, Serialize};
use serde_json::json;
use snafu::ResultExt;
use url::Url;

const DEFAULT_DURATION_MINUTES: i64 = 60;
const GOOGLE_RENDER_URL: &str = "https://calendar.google.com/calendar/render";
const GOOGLE_DATE_FMT: &str = "%Y%m%dT%H%M%SZ";

fn event_end(event: &DbEvent) -> DateTime<Utc> {
    let minutes = event
        .duration_minutes
        .map_or(DEFAULT_DURATION_MINUTES, i64::from);
    event.date + Duration::minutes(minutes)
}

fn location_line(event: &DbEvent) -> String {
    [&event.address, &event.city, &event.zip_code]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .collect::<Vec<_>>()
        .join(", ")
}

fn build_calendar(events: &[DbEvent]) -> String {
    let mut calendar = Calendar::new();
    for event in events {
        let description = event.description.clone().unwrap_or_default();

        calendar.push(
            IcalEvent::new()
                .summary(&event.event_name)
                .starts(event.date)
                .ends(event_end(event))
                .description(&description)
                .location(&location_line(event))
                .done(),
        );
    }

    calendar.done().to_string()
}

///Builds the no-round-trip Google Calendar deep link for one event.
fn google_link(event: &DbEvent) -> Result<String, GatherError> {
    let dates = format!(
        "{}/{}",
        event.date.format(GOOGLE_DATE_FMT),
        event_end(event).format(GOOGLE_DATE_FMT)
    );

    let url = Url::parse_with_params(
        GOOGLE_RENDER_URL,
        [
            ("action", "TEMPLATE"),
            ("text", event.event_name.as_str()),
            ("dates", dates.as_str()),
            ("details", event.description.as_deref().unwrap_or_default()),
            ("location", location_line(event).as_str()),
        ],
    )?;

    Ok(url.to_string())
}

fn ics_attachment(filename: &str, body: String) -> impl IntoResponse {
    (
        [
            (
                header::CONTENT_TYPE,
                "text/calendar; charset=utf-8".to_string(),
            ),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        body,
    )
}

async fn fetch_event(state: &GatherState, event_id: i32) -> Result<DbEvent, GatherError> {
    sqlx::query_as::<_, DbEvent>(
        r#"
SELECT id, event_name, description, "date", image_url, duration_minutes, zip_code, address, city, staff_id
FROM events
WHERE id = $1
        "#,
    )
    .bind(event_id)
    .fetch_optional(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingEvent(event_id),
    })?
    .ok_or(GatherError::EventNotFound { id: event_id })
}

///`GET /calendar.ics` - the whole listing as a subscribable feed.
#[axum::debug_handler]
async fn get_calendar_feed(
    State(state): State<GatherState>,
) -> Result<impl IntoResponse, GatherError> {
    let events = sqlx::query_as::<_, DbEvent>(
        r#"
SELECT id, event_name, description, "date", image_url, duration_minutes, zip_code, address, city, staff_id
FROM events
ORDER BY "date"
        "#,
    )
    .fetch_all(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingAllEvents,
    })?;

    Ok(ics_attachment("calendar.ics", build_calendar(&events)))
}

///`GET /events/:event_id/calendar.ics` - one event as a download.
#[axum::debug_handler]
async fn get_event_ics(
    Path(event_id): Path<i32>,
    State(state): State<GatherState>,
) -> Result<impl IntoResponse, GatherError> {
    let event = fetch_event(&state, event_id).await?;
    let filename = format!("event-{event_id}.ics");

    Ok(ics_attachment(&filename, build_calendar(&[event])))
}

///`GET /events/:event_id/google-link`
#[axum::debug_handler]
async fn get_google_link(
    Path(event_id): Path<i32>,
    State(state): State<GatherState>,
) -> Result<impl IntoResponse, GatherError> {
    let event = fetch_event(&state, event_id).await?;
    Ok(Json(json!({ "link": google_link(&event)? })))
}

#[derive(Deserialize, Debug)]
pub struct CalendarEventPayload {
    pub summary: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

#[derive(Deserialize, Debug)]
pub struct CalendarPushForm {
    pub token: Option<String>,
    pub event: Option<CalendarEventPayload>,
}

#[derive(Serialize)]
struct GoogleEventTime {
    #[serde(rename = "dateTime")]
    date_time: DateTime<Utc>,
}

#[derive(Serialize)]
struct GoogleEventResource {
    summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    start: GoogleEventTime,
    end: GoogleEventTime,
}

#[derive(Deserialize)]
struct GoogleInsertResponse {
    #[serde(rename = "htmlLink")]
    html_link: Option<String>,
}

///`POST /events/calendar` - inserts the event into the caller's Google
///Calendar with the OAuth access token the browser obtained.
#[axum::debug_handler]
async fn post_calendar_insert(
    State(state): State<GatherState>,
    Json(form): Json<CalendarPushForm>,
) -> Result<impl IntoResponse, GatherError> {
    let mut missing = vec![];
    if form.token.is_none() {
        missing.push("token");
    }
    if form.event.is_none() {
        missing.push("event");
    }
    let (Some(token), Some(event)) = (form.token, form.event) else {
        return Err(GatherError::MissingFields { fields: missing });
    };

    let mut missing = vec![];
    if event.summary.is_none() {
        missing.push("event.summary");
    }
    if event.start.is_none() {
        missing.push("event.start");
    }
    let (Some(summary), Some(start)) = (event.summary, event.start) else {
        return Err(GatherError::MissingFields { fields: missing });
    };

    let resource = GoogleEventResource {
        summary,
        description: event.description,
        location: event.location,
        start: GoogleEventTime { date_time: start },
        end: GoogleEventTime {
            date_time: event
                .end
                .unwrap_or(start + Duration::minutes(DEFAULT_DURATION_MINUTES)),
        },
    };

    debug!("Inserting event into external calendar");

    let response = state
        .http
        .post(format!(
            "{}/calendars/primary/events",
            state.settings.google.calendar_api_base
        ))
        .bearer_auth(&token)
        .json(&resource)
        .send()
        .await
        .context(ReqwestSnafu {
            action: ReqwestAction::GoogleCalendarInsert,
        })?
        .error_for_status()
        .with_context(|e| ReqwestSnafu {
            action: ReqwestAction::ErrorForStatus(e.status()),
        })?
        .json::<GoogleInsertResponse>()
        .await
        .context(ReqwestSnafu {
            action: ReqwestAction::DecodingGoogleResponse,
        })?;

    Ok(Json(json!({
        "message": "Event added to calendar",
        "link": response.html_link,
    })))
}

pub fn router() -> Router<GatherState> {
    Router::new()
        .route("/calendar.ics", get(get_calendar_feed))
        .route("/events/:event_id/calendar.ics", get(get_event_ics))
        .route("/events/:event_id/google-link", get(get_google_link))
        .route("/events/calendar", post(post_calendar_insert))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn event() -> DbEvent {
        DbEvent {
            id: 1,
            event_name: "Summer Fete".into(),
            description: Some("Cakes and games".into()),
            date: Utc.with_ymd_and_hms(2030, 1, 1, 10, 0, 0).unwrap(),
            image_url: None,
            duration_minutes: None,
            zip_code: Some("123456".into()),
            address: Some("1 High Street".into()),
            city: Some("Springfield".into()),
            staff_id: 1,
        }
    }

    #[test]
    fn end_defaults_to_an_hour_after_the_start() {
        let e = event();
        assert_eq!(event_end(&e), e.date + Duration::minutes(60));

        let mut e = event();
        e.duration_minutes = Some(90);
        assert_eq!(event_end(&e), e.date + Duration::minutes(90));
    }

    #[test]
    fn google_link_encodes_the_event() {
        let link = google_link(&event()).unwrap();

        assert!(link.starts_with(GOOGLE_RENDER_URL));
        assert!(link.contains("action=TEMPLATE"));
        assert!(link.contains("text=Summer+Fete"));
        assert!(link.contains("20300101T100000Z"));
        assert!(link.contains("20300101T110000Z"));
        assert!(link.contains("details=Cakes+and+games"));
    }

    #[test]
    fn location_joins_the_parts_that_exist() {
        assert_eq!(
            location_line(&event()),
            "1 High Street, Springfield, 123456"
        );

        let mut e = event();
        e.address = None;
        e.zip_code = None;
        assert_eq!(location_line(&e), "Springfield");
    }

    #[test]
    fn ics_output_is_a_valid_block_with_the_event() {
        let ics = build_calendar(&[event()]);

        assert!(ics.contains("BEGIN:VCALENDAR"));
        assert!(ics.contains("END:VCALENDAR"));
        assert!(ics.contains("BEGIN:VEVENT"));
        assert!(ics.contains("SUMMARY:Summer Fete"));
        assert!(ics.contains("Cakes and games"));
    }
}
