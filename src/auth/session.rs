use crate::{
    auth::StaffIdentity,
    error::{GatherError, SessionAction, SessionSnafu},
};
use snafu::ResultExt;
use tower_sessions::Session;

pub const STAFF_ID_KEY: &str = "staff_id";
pub const STAFF_EMAIL_KEY: &str = "staff_email";
pub const STAFF_ROLE_KEY: &str = "staff_role";
pub const AUTHENTICATED_KEY: &str = "authenticated";

///Writes the identity fields plus the authenticated flag into the session.
pub async fn store_identity(
    session: &Session,
    identity: &StaffIdentity,
) -> Result<(), GatherError> {
    session
        .insert(STAFF_ID_KEY, identity.id)
        .await
        .context(SessionSnafu {
            action: SessionAction::StoringIdentity,
        })?;
    session
        .insert(STAFF_EMAIL_KEY, identity.email.clone())
        .await
        .context(SessionSnafu {
            action: SessionAction::StoringIdentity,
        })?;
    session
        .insert(STAFF_ROLE_KEY, identity.role.clone())
        .await
        .context(SessionSnafu {
            action: SessionAction::StoringIdentity,
        })?;
    session
        .insert(AUTHENTICATED_KEY, true)
        .await
        .context(SessionSnafu {
            action: SessionAction::StoringIdentity,
        })
}

///`None` when the session exists but was never marked authenticated, or is
///missing any of the identity fields.
pub async fn read_identity(session: &Session) -> Result<Option<StaffIdentity>, GatherError> {
    let authenticated = session
        .get::<bool>(AUTHENTICATED_KEY)
        .await
        .context(SessionSnafu {
            action: SessionAction::ReadingIdentity,
        })?
        .unwrap_or(false);

    if !authenticated {
        return Ok(None);
    }

    let id = session
        .get::<i32>(STAFF_ID_KEY)
        .await
        .context(SessionSnafu {
            action: SessionAction::ReadingIdentity,
        })?;
    let email = session
        .get::<String>(STAFF_EMAIL_KEY)
        .await
        .context(SessionSnafu {
            action: SessionAction::ReadingIdentity,
        })?;
    let role = session
        .get::<String>(STAFF_ROLE_KEY)
        .await
        .context(SessionSnafu {
            action: SessionAction::ReadingIdentity,
        })?;

    Ok(match (id, email, role) {
        (Some(id), Some(email), Some(role)) => Some(StaffIdentity { id, email, role }),
        _ => None,
    })
}

///Removes the session from the store and expires the client cookie.
pub async fn clear(session: &Session) -> Result<(), GatherError> {
    session.flush().await.context(SessionSnafu {
        action: SessionAction::Flushing,
    })
}
