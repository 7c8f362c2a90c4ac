use once_cell::sync::Lazy;
use regex::Regex;

use crate::filing::Filing;
use crate::metrics::Governance;
use crate::xbrl::context::parse_date;
use crate::xbrl::normalize;

const RELATED_PARTY_MARKER: &str = "関連当事者";

static AUDIT_FIRM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"((?:PwC|ＰｗＣ|EY|ＥＹ|有限責任|監査法人|Deloitte|KPMG).*?監査法人)").unwrap()
});
static AUDIT_FIRM_LABELLED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:監査法人|会計監査人)の名称\s*[:：]?\s*(.*?監査法人)").unwrap()
});
static MARKUP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s\u{3000}]+").unwrap());
static AUDITOR_BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:監査法人|会計監査人)の名称[:：]?|当社の監査公認会計士等は[、,]|業務を執行した公認会計士")
        .unwrap()
});
static AUDITOR_EDGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\s:：>＞・等]+|[\s:：>＞・]+$").unwrap());

// Document text beyond this point is boilerplate attachments; the auditor
// name appears near the top.
const AUDITOR_SWEEP_LIMIT: usize = 50_000;

/// Extracts governance metadata from a filing: disclosure fields, auditor
/// name, and related-party footprint. Best effort throughout; anything that
/// cannot be read is left at its default.
pub fn extract(filing: &Filing) -> Governance {
    let mut gov = Governance::default();

    for fact in filing.index.all() {
        if fact.raw.is_empty() {
            continue;
        }
        if gov.period_end.is_none() && fact.tag.contains("CurrentPeriodEndDate") {
            gov.period_end = parse_date(&fact.raw);
        }
        if gov.accounting_standard.is_none() && fact.tag.contains("AccountingStandards") {
            gov.accounting_standard = Some(fact.raw.clone());
        }
        if fact
            .tag
            .contains("WhetherConsolidatedFinancialStatementsArePrepared")
        {
            gov.consolidated = fact.raw.eq_ignore_ascii_case("true");
        }
        if gov.auditor.is_none() && fact.tag.contains("AuditFirm") {
            gov.auditor = AUDIT_FIRM_RE
                .find(&fact.raw)
                .map(|m| clean_auditor_name(m.as_str()));
        }
        if fact.tag.contains("RelatedPartyTransactions") && fact.tag.contains("Amount") {
            if let Some(value) = normalize::decode_value(fact) {
                gov.related_party_amount += value.abs();
            }
        }
    }

    for doc in &filing.documents {
        gov.related_party_hits += doc.content.matches(RELATED_PARTY_MARKER).count();

        if gov.auditor.is_none() {
            let head = truncate_at_boundary(&doc.content, AUDITOR_SWEEP_LIMIT);
            let normalized = WHITESPACE_RE.replace_all(head, " ");
            let hit = AUDIT_FIRM_LABELLED_RE
                .captures(&normalized)
                .and_then(|c| c.get(1).map(|m| m.as_str().to_string()))
                .or_else(|| AUDIT_FIRM_RE.find(&normalized).map(|m| m.as_str().to_string()));
            gov.auditor = hit.map(|name| clean_auditor_name(&name));
        }
    }

    gov
}

fn clean_auditor_name(raw: &str) -> String {
    let unescaped = html_escape::decode_html_entities(raw);
    let stripped = MARKUP_RE.replace_all(&unescaped, " ");
    let collapsed = WHITESPACE_RE.replace_all(&stripped, " ");
    let without_boilerplate = AUDITOR_BOILERPLATE_RE.replace_all(&collapsed, "");
    AUDITOR_EDGE_RE
        .replace_all(without_boilerplate.trim(), "")
        .to_string()
}

fn truncate_at_boundary(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
