use chrono::{Datelike, NaiveDate};

const MONTHS_LONG: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

const MONTHS_SHORT: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "Mei", "Jun", "Jul", "Agu", "Sep", "Okt", "Nov", "Des",
];

/// Whole rupiah with `.` as thousands separator: `1.234.567`.
pub fn idr(amount: i64) -> String {
    let digits = amount.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if amount < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// `Rp 1.234.567`
pub fn rupiah(amount: i64) -> String {
    format!("Rp {}", idr(amount))
}

/// `5 Maret 2024`, or `-` when absent.
pub fn date_long(date: Option<NaiveDate>) -> String {
    match date {
        Some(d) => format!("{} {} {}", d.day(), MONTHS_LONG[d.month0() as usize], d.year()),
        None => "-".to_string(),
    }
}

/// `5 Mar 2024`
pub fn date_medium(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), MONTHS_SHORT[date.month0() as usize], date.year())
}

pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// First `len` characters of an id, upper-cased, for slip references.
pub fn short_ref(id: &str, len: usize) -> String {
    id.chars().take(len).collect::<String>().to_uppercase()
}
