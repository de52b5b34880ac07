use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use snafu::Snafu;

#[derive(Debug)]
pub enum StaffIdentifier {
    Id(i32),
    Email(String),
}

impl From<i32> for StaffIdentifier {
    fn from(value: i32) -> Self {
        Self::Id(value)
    }
}
impl From<String> for StaffIdentifier {
    fn from(value: String) -> Self {
        Self::Email(value)
    }
}

#[derive(Debug)]
pub enum SqlxAction {
    FindingStaff(StaffIdentifier),
    AddingStaff,

    FindingEvent(i32),
    FindingAllEvents,
    AddingEvent,
    RemovingEvent(i32),

    FindingSignup { event_id: i32 },
    AddingSignup { event_id: i32 },
    RemovingSignups { event_id: i32 },

    FindingOrganiserLinks,
    AddingOrganiserLink,

    AcquiringConnection,
}

#[derive(Debug)]
pub enum SessionAction {
    ReadingIdentity,
    StoringIdentity,
    Flushing,
}

#[derive(Debug)]
pub enum TokenAction {
    Issuing,
}

#[derive(Debug)]
pub enum ReqwestAction {
    GoogleCalendarInsert,
    ErrorForStatus(Option<StatusCode>),
    DecodingGoogleResponse,
}

#[derive(Snafu, Debug)]
#[snafu(visibility(pub))]
pub enum GatherError {
    //external errors
    #[snafu(display("Database Error: {source:?}. Cause: {action:?}"))]
    Sqlx {
        source: sqlx::Error,
        action: SqlxAction,
    },
    #[snafu(display("Session Error: {source:?} whilst {action:?}"))]
    Session {
        source: tower_sessions::session::Error,
        action: SessionAction,
    },
    #[snafu(display("Session layer unavailable: {message}"))]
    SessionUnavailable { message: &'static str },
    #[snafu(display("Token Error: {source:?} whilst {action:?}"))]
    Token {
        source: jsonwebtoken::errors::Error,
        action: TokenAction,
    },
    #[snafu(display("Error with Encrypting: {source:?}"), context(false))]
    Bcrypt { source: bcrypt::BcryptError },
    #[snafu(display("Error reqwest-ing: {source:?} whilst trying to {action:?}"))]
    Reqwest {
        source: reqwest::Error,
        action: ReqwestAction,
    },
    #[snafu(display("Error building calendar link: {source:?}"), context(false))]
    CalendarLink { source: url::ParseError },

    //client-facing errors
    #[snafu(display("missing required fields: {}", fields.join(", ")))]
    MissingFields { fields: Vec<&'static str> },
    #[snafu(display("Staff member already exists"))]
    EmailTaken { email: String },
    #[snafu(display("Event Not Found"))]
    EventNotFound { id: i32 },
    #[snafu(display("Email already used"))]
    AlreadySignedUp { event_id: i32 },
    #[snafu(display("invalid credentials"))]
    InvalidCredentials,
    #[snafu(display("invalid password"))]
    InvalidPassword,
    #[snafu(display("not authenticated"))]
    NotAuthenticated,
}

impl GatherError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingFields { .. }
            | Self::EmailTaken { .. }
            | Self::AlreadySignedUp { .. } => StatusCode::BAD_REQUEST,
            Self::EventNotFound { .. } => StatusCode::NOT_FOUND,
            Self::InvalidCredentials | Self::InvalidPassword | Self::NotAuthenticated => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatherError {
    fn into_response(self) -> axum::response::Response {
        let code = self.status_code();
        if code == StatusCode::INTERNAL_SERVER_ERROR {
            error!(?code, "Dealing with error: {self:?}");
        } else {
            debug!(?code, "Rejecting request: {self}");
        }

        (code, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_spec_statuses() {
        assert_eq!(
            GatherError::MissingFields {
                fields: vec!["email"]
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatherError::EventNotFound { id: 42 }.status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            GatherError::AlreadySignedUp { event_id: 42 }.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            GatherError::InvalidPassword.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            GatherError::NotAuthenticated.status_code(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn missing_fields_are_enumerated_in_the_message() {
        let msg = GatherError::MissingFields {
            fields: vec!["email", "password", "firstName"],
        }
        .to_string();
        assert_eq!(msg, "missing required fields: email, password, firstName");
    }

    #[test]
    fn not_found_message_matches_client_contract() {
        assert_eq!(
            GatherError::EventNotFound { id: 7 }.to_string(),
            "Event Not Found"
        );
    }
}
