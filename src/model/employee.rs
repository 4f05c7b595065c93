use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The slice of a master employee record the print artifacts need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    #[serde(rename = "pegawai_id")]
    pub id: Uuid,
    #[serde(default)]
    pub nik: String,
    #[serde(rename = "nama_lengkap")]
    pub full_name: String,
    #[serde(rename = "nama_panggilan", default)]
    pub nickname: Option<String>,
}
