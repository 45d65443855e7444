use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub csrf_token: String, // Compared against the `csrf_token` field of POSTed forms
}
