pub mod gate;
pub mod login;
pub mod session;
pub mod signup;
pub mod token;

use serde::{Deserialize, Serialize};

///Who a request is acting as, produced by the [`gate`] from either a bearer
///token or the server-side session.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct StaffIdentity {
    pub id: i32,
    pub email: String,
    pub role: String,
}
