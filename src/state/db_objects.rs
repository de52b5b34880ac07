use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Deserialize, Clone, FromRow, Debug)]
pub struct DbStaff {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub hashed_password: Option<String>,
    pub role: String,
}

///What the API hands out for a staff member - never includes the hash.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StaffSummary {
    pub id: i32,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub role: String,
}

impl From<DbStaff> for StaffSummary {
    fn from(
        DbStaff {
            id,
            email,
            first_name,
            last_name,
            hashed_password: _,
            role,
        }: DbStaff,
    ) -> Self {
        Self {
            id,
            email,
            first_name,
            last_name,
            role,
        }
    }
}

#[derive(Deserialize, Clone, FromRow, Debug)]
pub struct DbEvent {
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
}

#[derive(Serialize, Deserialize, Clone, FromRow, Debug)]
pub struct DbOrganiserLink {
    pub id: i32,
    pub created_at: DateTime<Utc>,
    pub staff_id: i32,
    pub event_ids: Vec<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn staff_summary_never_serialises_the_hash() {
        let summary = StaffSummary::from(DbStaff {
            id: 1,
            email: "a@b.com".into(),
            first_name: "A".into(),
            last_name: "B".into(),
            hashed_password: Some("$2b$12$secret".into()),
            role: "Staff".into(),
        });

        let json = serde_json::to_value(&summary).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("hashedPassword"));
        assert!(!obj.contains_key("hashed_password"));
        assert_eq!(obj["firstName"], "A");
        assert_eq!(obj["email"], "a@b.com");
    }
}
