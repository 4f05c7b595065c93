//! Printable A5-landscape HTML documents rendered from the askama templates
//! under `templates/print/`. Each page is self-contained and opens the
//! browser's print dialog once loaded.

pub mod cash_advance;
pub mod format;
pub mod payslip;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branding {
    pub company_name: String,
    pub company_address: String,
    /// Short text shown inside the logo block.
    pub company_logo: String,
}

impl Default for Branding {
    fn default() -> Self {
        Self {
            company_name: "PT. SBP Epoxy Contractor".to_string(),
            company_address: "Jl. Raya Industri No. 88, Surabaya, Jawa Timur".to_string(),
            company_logo: "SBP".to_string(),
        }
    }
}

/// Gradient colours of the top bar and logo.
pub(crate) struct Accent {
    pub dark: &'static str,
    pub light: &'static str,
}

/// Header and footer shared by every document in `templates/print/base.html`.
/// Values are plain text; the templates escape them.
pub(crate) struct Page {
    pub title: String,
    pub accent: Accent,
    pub branding: Branding,
    pub watermark: &'static str,
    pub heading: &'static str,
    pub reference: String,
    pub printed: String,
    /// Left signature caption, above `signer`.
    pub signer_label: &'static str,
    pub signer: String,
    pub approver: String,
    /// Italic lines under the legal note.
    pub extras: Vec<String>,
}
