use serde::Serialize;

use crate::services::auth::Role;

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: String,
    pub email: Option<String>,
    pub role: Role,
}
