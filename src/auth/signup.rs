use crate::{
    error::{GatherError, SqlxAction, SqlxSnafu},
    state::{
        db_objects::{DbStaff, StaffSummary},
        GatherState,
    },
};
use axum::{extract::State, response::IntoResponse, routing::post, Json, Router};
use bcrypt::{hash, DEFAULT_COST};
use http::StatusCode;
use serde::Deserialize;
use snafu::ResultExt;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaffSignupForm {
    pub email: Option<String>,
    pub password: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<String>,
}

struct ValidStaffSignup {
    email: String,
    password: String,
    first_name: String,
    last_name: String,
    role: String,
}

impl StaffSignupForm {
    ///Enumerates every missing required field; role defaults to "Staff".
    fn validated(self) -> Result<ValidStaffSignup, GatherError> {
        let mut missing = vec![];
        if self.email.is_none() {
            missing.push("email");
        }
        if self.password.is_none() {
            missing.push("password");
        }
        if self.first_name.is_none() {
            missing.push("firstName");
        }
        if self.last_name.is_none() {
            missing.push("lastName");
        }

        match (self.email, self.password, self.first_name, self.last_name) {
            (Some(email), Some(password), Some(first_name), Some(last_name)) => {
                Ok(ValidStaffSignup {
                    email,
                    password,
                    first_name,
                    last_name,
                    role: self.role.unwrap_or_else(|| "Staff".to_string()),
                })
            }
            _ => Err(GatherError::MissingFields { fields: missing }),
        }
    }
}

///`POST /staff-signup` - creates a staff account; the plaintext password is
///hashed before it goes anywhere near the database.
#[axum::debug_handler]
async fn post_staff_signup(
    State(state): State<GatherState>,
    Json(form): Json<StaffSignupForm>,
) -> Result<impl IntoResponse, GatherError> {
    let ValidStaffSignup {
        email,
        password,
        first_name,
        last_name,
        role,
    } = form.validated()?;

    let existing = sqlx::query_scalar::<_, i32>(
        r#"
SELECT id FROM staff
WHERE LOWER(email) = LOWER($1)
        "#,
    )
    .bind(&email)
    .fetch_optional(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::FindingStaff(email.clone().into()),
    })?;

    if existing.is_some() {
        return Err(GatherError::EmailTaken { email });
    }

    let hashed = hash(&password, DEFAULT_COST)?;

    let db_staff = sqlx::query_as::<_, DbStaff>(
        r#"
INSERT INTO staff (email, first_name, last_name, hashed_password, role)
VALUES ($1, $2, $3, $4, $5)
RETURNING id, email, first_name, last_name, hashed_password, role
        "#,
    )
    .bind(&email)
    .bind(&first_name)
    .bind(&last_name)
    .bind(&hashed)
    .bind(&role)
    .fetch_one(&mut *state.get_connection().await?)
    .await
    .context(SqlxSnafu {
        action: SqlxAction::AddingStaff,
    })?;

    info!(staff_id = db_staff.id, "Created staff account");

    Ok((StatusCode::CREATED, Json(StaffSummary::from(db_staff))))
}

pub fn router() -> Router<GatherState> {
    Router::new().route("/staff-signup", post(post_staff_signup))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_form() -> StaffSignupForm {
        StaffSignupForm {
            email: Some("a@b.com".into()),
            password: Some("pw123456".into()),
            first_name: Some("A".into()),
            last_name: Some("B".into()),
            role: None,
        }
    }

    #[test]
    fn empty_form_enumerates_all_required_fields() {
        let form = StaffSignupForm {
            email: None,
            password: None,
            first_name: None,
            last_name: None,
            role: None,
        };

        let Err(GatherError::MissingFields { fields }) = form.validated() else {
            panic!("expected a missing-fields error");
        };
        assert_eq!(fields, vec!["email", "password", "firstName", "lastName"]);
    }

    #[test]
    fn only_the_absent_fields_are_reported() {
        let form = StaffSignupForm {
            password: None,
            last_name: None,
            ..full_form()
        };

        let Err(GatherError::MissingFields { fields }) = form.validated() else {
            panic!("expected a missing-fields error");
        };
        assert_eq!(fields, vec!["password", "lastName"]);
    }

    #[test]
    fn role_defaults_to_staff() {
        let valid = full_form().validated().unwrap();
        assert_eq!(valid.role, "Staff");

        let valid = StaffSignupForm {
            role: Some("Coordinator".into()),
            ..full_form()
        }
        .validated()
        .unwrap();
        assert_eq!(valid.role, "Coordinator");
    }

    #[test]
    fn stored_hash_is_not_the_plaintext() {
        let hashed = hash("pw123456", DEFAULT_COST).unwrap();
        assert_ne!(hashed, "pw123456");
        assert!(bcrypt::verify("pw123456", &hashed).unwrap());
    }
}
