use askama::Template;
use chrono::NaiveDate;

use crate::model::cash_advance::{CashAdvance, CashAdvanceMutation};
use crate::print::format::{capitalize, date_long, date_medium, idr, rupiah, short_ref};
use crate::print::{Accent, Branding, Page};

const ACCENT: Accent = Accent {
    dark: "#78350f",
    light: "#b45309",
};

pub fn mutation_kind_label(kind: &str) -> &str {
    match kind {
        "potong_gaji" => "Potong Gaji",
        "cicilan_manual" => "Cicilan Manual",
        "penyesuaian" => "Penyesuaian",
        other => other,
    }
}

pub fn repayment_method_label(method: &str) -> &str {
    match method {
        "potong_gaji" => "Potong Gaji",
        "cicilan" => "Cicilan Manual",
        other => other,
    }
}

/// CSS class for a mutation kind: lowercase letters and underscores only.
fn kind_class(kind: &str) -> String {
    kind.chars().filter(|c| c.is_ascii_lowercase() || *c == '_').collect()
}

struct MutationRow {
    date: String,
    kind: String,
    kind_class: String,
    payslip: Option<String>,
    amount: String,
    before: String,
    after: String,
    settled: bool,
    note: String,
}

impl MutationRow {
    fn new(m: &CashAdvanceMutation) -> Self {
        Self {
            date: date_medium(m.date),
            kind: mutation_kind_label(&m.kind).to_string(),
            kind_class: kind_class(&m.kind),
            payslip: m.payslip_id.map(|id| id.to_string().chars().take(8).collect()),
            amount: idr(m.amount),
            before: rupiah(m.balance_before),
            after: rupiah(m.balance_after),
            settled: m.balance_after <= 0,
            note: m
                .note
                .as_deref()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or("-")
                .to_string(),
        }
    }
}

#[derive(Template)]
#[template(path = "print/cash_advance.html")]
struct CashAdvanceTemplate {
    page: Page,
    requested_on: String,
    disbursed_on: String,
    settled: bool,
    repayment_method: String,
    disbursement_method: String,
    principal: String,
    repaid: String,
    remaining: String,
    /// Oldest first.
    rows: Vec<MutationRow>,
}

/// `mutations` arrive newest first and are printed oldest first.
pub fn render_cash_advance(
    advance: &CashAdvance,
    mutations: &[CashAdvanceMutation],
    employee_name: &str,
    branding: &Branding,
    printed_on: NaiveDate,
) -> Result<String, askama::Error> {
    let advance_ref = short_ref(&advance.id.to_string(), 13);

    let extras = [("Alasan", &advance.reason), ("Catatan", &advance.note)]
        .into_iter()
        .filter_map(|(label, text)| {
            text.as_deref()
                .filter(|t| !t.trim().is_empty())
                .map(|t| format!("{label}: {t}"))
        })
        .collect();

    let page = Page {
        title: format!("Kasbon - {employee_name} - {advance_ref}"),
        accent: ACCENT,
        branding: branding.clone(),
        watermark: "KASBON",
        heading: "Slip Kasbon",
        reference: format!("KB-{advance_ref}"),
        printed: date_long(Some(printed_on)),
        signer_label: "Peminjam",
        signer: employee_name.to_string(),
        approver: advance
            .approved_by
            .as_deref()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or("________________")
            .to_string(),
        extras,
    };

    CashAdvanceTemplate {
        page,
        requested_on: date_long(Some(advance.requested_on)),
        disbursed_on: date_long(advance.disbursed_on),
        settled: advance.is_settled(),
        repayment_method: repayment_method_label(&advance.repayment_method).to_string(),
        disbursement_method: advance
            .disbursement_method
            .as_deref()
            .map(capitalize)
            .unwrap_or_else(|| "-".to_string()),
        principal: rupiah(advance.principal()),
        repaid: rupiah(advance.repaid()),
        remaining: rupiah(advance.balance),
        rows: mutations.iter().rev().map(MutationRow::new).collect(),
    }
    .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn advance(balance: i64, status: &str) -> CashAdvance {
        serde_json::from_value(json!({
            "kasbon_id": "9c0d2e4f-1a2b-4c3d-8e9f-a0b1c2d3e4f5",
            "pegawai_id": "a1b2c3d4-0000-4000-8000-000000000001",
            "tanggal_pengajuan": "2024-02-10",
            "nominal_pengajuan": 2000000,
            "nominal_disetujui": 1500000,
            "alasan": "Biaya sekolah & seragam",
            "status_kasbon": status,
            "disetujui_oleh": "Bu Rina",
            "tanggal_cair": "2024-02-12",
            "metode_pencairan": "tunai",
            "metode_potong": "cicilan",
            "saldo_kasbon": balance
        }))
        .unwrap()
    }

    fn mutation(amount: i64, before: i64, after: i64, date: &str, kind: &str) -> CashAdvanceMutation {
        serde_json::from_value(json!({
            "mutasi_id": "11111111-2222-4333-8444-555555555555",
            "tipe_mutasi": kind,
            "nominal_mutasi": amount,
            "saldo_sebelum": before,
            "saldo_sesudah": after,
            "tanggal_mutasi": date,
            "penggajian_id": "3f2a9c1e-7b44-4d2a-8c55-0e9d1b2a3c4d"
        }))
        .unwrap()
    }

    fn printed_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 4, 2).unwrap()
    }

    #[test]
    fn summarises_principal_repaid_and_remaining() {
        let newest_first = vec![
            mutation(500_000, 1_000_000, 500_000, "2024-03-31", "cicilan_manual"),
            mutation(500_000, 1_500_000, 1_000_000, "2024-02-29", "potong_gaji"),
        ];
        let html = render_cash_advance(
            &advance(500_000, "dicairkan"),
            &newest_first,
            "Hilmy",
            &Branding::default(),
            printed_on(),
        )
        .unwrap();
        assert!(html.contains("No: KB-9C0D2E4F-1A2B"));
        assert!(html.contains("Total Pinjaman</div><div class=\"sc-value\">Rp 1.500.000"));
        assert!(html.contains("Total Terbayar (2&times;)</div><div class=\"sc-value\">Rp 1.000.000"));
        assert!(html.contains("Sisa Pinjaman</div><div class=\"sc-value\">Rp 500.000"));
        assert!(html.contains("BERJALAN"));
        assert!(html.contains("Cicilan Manual"));
        assert!(html.contains("Slip: 3f2a9c1e"));
    }

    #[test]
    fn prints_mutations_oldest_first() {
        let newest_first = vec![
            mutation(500_000, 1_000_000, 500_000, "2024-03-31", "cicilan_manual"),
            mutation(500_000, 1_500_000, 1_000_000, "2024-02-29", "potong_gaji"),
        ];
        let html = render_cash_advance(
            &advance(500_000, "dicairkan"),
            &newest_first,
            "Hilmy",
            &Branding::default(),
            printed_on(),
        )
        .unwrap();
        let feb = html.find("29 Feb 2024").unwrap();
        let mar = html.find("31 Mar 2024").unwrap();
        assert!(feb < mar);
    }

    #[test]
    fn zero_balance_is_settled() {
        let history = vec![mutation(1_500_000, 1_500_000, 0, "2024-03-31", "potong_gaji")];
        let html = render_cash_advance(&advance(0, "dicairkan"), &history, "Hilmy", &Branding::default(), printed_on()).unwrap();
        assert!(html.contains("status-badge settled"));
        assert!(html.contains("Rp 0 (LUNAS)"));
        assert!(html.contains(r#"<span class="td-settled">LUNAS</span>"#));
    }

    #[test]
    fn empty_history_shows_placeholder() {
        let html = render_cash_advance(&advance(1_500_000, "dicairkan"), &[], "Hilmy", &Branding::default(), printed_on()).unwrap();
        assert!(html.contains("Belum ada riwayat pembayaran."));
        assert!(html.contains("(0 transaksi)"));
    }

    #[test]
    fn escapes_reason_and_approver() {
        let html = render_cash_advance(&advance(0, "lunas"), &[], "Hilmy", &Branding::default(), printed_on()).unwrap();
        assert!(html.contains("Alasan: Biaya sekolah &amp; seragam"));
        assert!(html.contains(r#"<div class="sig-name">Bu Rina</div>"#));
    }

    #[test]
    fn labels_fall_back_to_raw_values() {
        assert_eq!(mutation_kind_label("penyesuaian"), "Penyesuaian");
        assert_eq!(mutation_kind_label("bonus"), "bonus");
        assert_eq!(repayment_method_label("potong_gaji"), "Potong Gaji");
        assert_eq!(repayment_method_label("cicilan"), "Cicilan Manual");
    }
}
