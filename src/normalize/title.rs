//! Classification of free-text insider titles.

use crate::core::InsiderTitle;

/// Classify a free-text title cell.
///
/// Ordered case-insensitive rules, most specific first, so a combined title
/// like "CEO and Director" lands on the most senior match. Unmatched text is
/// `Unknown`.
pub(crate) fn classify(raw: &str) -> InsiderTitle {
    let t = raw.trim().to_ascii_uppercase();
    if t.contains("CEO") {
        return InsiderTitle::Ceo;
    }
    if t.contains("CFO") {
        return InsiderTitle::Cfo;
    }
    if t.contains("COO") || t.contains("PRES") || t.contains("CHAIR") || t.contains("COB") {
        return InsiderTitle::CooOrPresident;
    }
    if t.contains("DIRECTOR") || t == "DIR" || t == "D" {
        return InsiderTitle::Director;
    }
    if (t.contains("10") && t.contains('%')) || (t.contains("TEN") && t.contains("OWN")) {
        return InsiderTitle::TenPercentOwner;
    }
    if t.contains("VICE") || t.contains("VP") || t.contains("GENERAL COUNSEL") || t == "GC" {
        return InsiderTitle::OtherOfficer;
    }
    if t.contains("OFFICER") {
        return InsiderTitle::OtherOfficer;
    }
    // bare "Owner" without the 10% qualifier still lands on the owner tier
    if t.contains("OWNER") {
        return InsiderTitle::TenPercentOwner;
    }
    InsiderTitle::Unknown
}
