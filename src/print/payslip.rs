use askama::Template;
use chrono::NaiveDate;

use crate::model::payroll::Payslip;
use crate::print::format::{capitalize, date_long, rupiah, short_ref};
use crate::print::{Accent, Branding, Page};

const ACCENT: Accent = Accent {
    dark: "#0f172a",
    light: "#334155",
};

struct Component {
    label: &'static str,
    amount: String,
}

struct DailyRate {
    days: i32,
    wage: String,
}

#[derive(Template)]
#[template(path = "print/payslip.html")]
struct PayslipTemplate {
    page: Page,
    period_start: String,
    period_end: String,
    pay_type: String,
    daily_rate: Option<DailyRate>,
    employee_ref: String,
    paid_on: String,
    method: String,
    /// Empty sections print a "Tidak ada komponen" row.
    earnings: Vec<Component>,
    deductions: Vec<Component>,
    total_earnings: String,
    total_deductions: String,
    net: String,
}

/// Only components with a positive amount are listed.
fn components<const N: usize>(items: [(&'static str, i64); N]) -> Vec<Component> {
    items
        .into_iter()
        .filter(|(_, amount)| *amount > 0)
        .map(|(label, amount)| Component {
            label,
            amount: rupiah(amount),
        })
        .collect()
}

pub fn render_payslip(
    slip: &Payslip,
    employee_name: &str,
    branding: &Branding,
    printed_on: NaiveDate,
) -> Result<String, askama::Error> {
    let slip_ref = short_ref(&slip.id.to_string(), 13);

    let daily_rate = match (slip.is_daily(), slip.days_worked) {
        (true, Some(days)) if days > 0 => Some(DailyRate {
            days,
            wage: rupiah(slip.daily_wage.unwrap_or(0)),
        }),
        _ => None,
    };

    let page = Page {
        title: format!("Slip Gaji - {employee_name} - {slip_ref}"),
        accent: ACCENT,
        branding: branding.clone(),
        watermark: "SLIP GAJI",
        heading: "Slip Gaji",
        reference: format!("SG-{slip_ref}"),
        printed: date_long(Some(printed_on)),
        signer_label: "Diterima oleh",
        signer: employee_name.to_string(),
        approver: "________________".to_string(),
        extras: slip
            .note
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .map(|n| format!("Catatan: {n}"))
            .into_iter()
            .collect(),
    };

    PayslipTemplate {
        page,
        period_start: date_long(Some(slip.period_start)),
        period_end: date_long(Some(slip.period_end)),
        pay_type: capitalize(&slip.pay_type),
        daily_rate,
        employee_ref: slip.employee_id.to_string().chars().take(8).collect(),
        paid_on: date_long(slip.paid_on),
        method: slip
            .payment_method
            .as_deref()
            .map(capitalize)
            .unwrap_or_else(|| "-".to_string()),
        earnings: components([
            ("Upah Pokok", slip.base_pay),
            ("Uang Lembur", slip.overtime),
            ("Tunjangan Makan", slip.meal_allowance),
            ("Tunjangan Transport", slip.transport_allowance),
            ("Tunjangan Lain", slip.other_allowance),
            ("Bonus", slip.bonus),
        ]),
        deductions: components([
            ("Potongan Kasbon", slip.cash_advance_deduction),
            ("BPJS", slip.bpjs_deduction),
            ("PPh 21", slip.income_tax_deduction),
            ("Potongan Lain", slip.other_deduction),
        ]),
        total_earnings: rupiah(slip.total_earnings),
        total_deductions: rupiah(slip.total_deductions),
        net: rupiah(slip.net_pay),
    }
    .render()
}
