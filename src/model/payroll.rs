use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One payroll run for one employee, as the backend returns it. Amounts are
/// whole rupiah.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payslip {
    #[serde(rename = "penggajian_id")]
    pub id: Uuid,
    #[serde(rename = "pegawai_id")]
    pub employee_id: Uuid,
    #[serde(rename = "periode_mulai")]
    pub period_start: NaiveDate,
    #[serde(rename = "periode_akhir")]
    pub period_end: NaiveDate,
    /// harian | mingguan | bulanan
    #[serde(rename = "tipe_gaji")]
    pub pay_type: String,
    #[serde(rename = "jumlah_hari_kerja", default)]
    pub days_worked: Option<i32>,
    #[serde(rename = "upah_per_hari", default)]
    pub daily_wage: Option<i64>,

    #[serde(rename = "upah_pokok", default)]
    pub base_pay: i64,
    #[serde(rename = "uang_lembur", default)]
    pub overtime: i64,
    #[serde(rename = "tunjangan_makan", default)]
    pub meal_allowance: i64,
    #[serde(rename = "tunjangan_transport", default)]
    pub transport_allowance: i64,
    #[serde(rename = "tunjangan_lain", default)]
    pub other_allowance: i64,
    #[serde(default)]
    pub bonus: i64,
    #[serde(rename = "total_pendapatan", default)]
    pub total_earnings: i64,

    #[serde(rename = "potongan_kasbon", default)]
    pub cash_advance_deduction: i64,
    #[serde(rename = "potongan_bpjs", default)]
    pub bpjs_deduction: i64,
    #[serde(rename = "potongan_pph21", default)]
    pub income_tax_deduction: i64,
    #[serde(rename = "potongan_lain", default)]
    pub other_deduction: i64,
    #[serde(rename = "total_potongan", default)]
    pub total_deductions: i64,

    #[serde(rename = "gaji_bersih", default)]
    pub net_pay: i64,

    /// draft | disetujui | dibayar
    #[serde(rename = "status_gaji")]
    pub status: String,
    #[serde(rename = "tanggal_bayar", default)]
    pub paid_on: Option<NaiveDate>,
    #[serde(rename = "metode_bayar", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "catatan", default)]
    pub note: Option<String>,
}

impl Payslip {
    pub fn is_daily(&self) -> bool {
        self.pay_type.eq_ignore_ascii_case("harian")
    }
}
