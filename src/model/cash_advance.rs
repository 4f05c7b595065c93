use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A cash advance (kasbon) and its outstanding balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashAdvance {
    #[serde(rename = "kasbon_id")]
    pub id: Uuid,
    #[serde(rename = "pegawai_id")]
    pub employee_id: Uuid,
    #[serde(rename = "tanggal_pengajuan")]
    pub requested_on: NaiveDate,
    #[serde(rename = "nominal_pengajuan")]
    pub requested_amount: i64,
    #[serde(rename = "nominal_disetujui", default)]
    pub approved_amount: Option<i64>,
    #[serde(rename = "alasan", default)]
    pub reason: Option<String>,
    /// diajukan | disetujui | ditolak | dicairkan | lunas
    #[serde(rename = "status_kasbon")]
    pub status: String,
    #[serde(rename = "disetujui_oleh", default)]
    pub approved_by: Option<String>,
    #[serde(rename = "tanggal_persetujuan", default)]
    pub approved_on: Option<NaiveDate>,
    #[serde(rename = "tanggal_cair", default)]
    pub disbursed_on: Option<NaiveDate>,
    #[serde(rename = "metode_pencairan", default)]
    pub disbursement_method: Option<String>,
    /// potong_gaji | cicilan
    #[serde(rename = "metode_potong")]
    pub repayment_method: String,
    #[serde(rename = "saldo_kasbon")]
    pub balance: i64,
    #[serde(rename = "catatan", default)]
    pub note: Option<String>,
}

impl CashAdvance {
    /// Approved amount when set, otherwise what was requested.
    pub fn principal(&self) -> i64 {
        self.approved_amount.unwrap_or(self.requested_amount)
    }

    pub fn repaid(&self) -> i64 {
        self.principal() - self.balance
    }

    pub fn is_settled(&self) -> bool {
        self.status == "lunas" || self.balance <= 0
    }
}

/// One repayment against a cash advance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashAdvanceMutation {
    #[serde(rename = "mutasi_id")]
    pub id: Uuid,
    /// potong_gaji | cicilan_manual | penyesuaian
    #[serde(rename = "tipe_mutasi")]
    pub kind: String,
    #[serde(rename = "nominal_mutasi")]
    pub amount: i64,
    #[serde(rename = "saldo_sebelum")]
    pub balance_before: i64,
    #[serde(rename = "saldo_sesudah")]
    pub balance_after: i64,
    #[serde(rename = "tanggal_mutasi")]
    pub date: NaiveDate,
    #[serde(rename = "catatan", default)]
    pub note: Option<String>,
    #[serde(rename = "penggajian_id", default)]
    pub payslip_id: Option<Uuid>,
}
