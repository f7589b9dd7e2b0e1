use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusIn {
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct StatusOut {
    pub status: String,
}
