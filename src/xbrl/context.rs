use chrono::NaiveDate;
use std::collections::HashMap;

use crate::config::ResolverConfig;

const CONSOLIDATED_MEMBER: &str = "ConsolidatedMember";
const NON_CONSOLIDATED_MEMBER: &str = "NonConsolidatedMember";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodType {
    Instant,
    Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Consolidated,
    NonConsolidated,
}

/// Table column a resolution request targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Current,
    Previous,
}

/// Classification of a context once the target period is known. Contexts that
/// match neither boundary stay unclassified and are excluded from resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PeriodBucket {
    Current,
    Previous,
    CurrentNonConsolidated,
    PreviousNonConsolidated,
}

impl PeriodBucket {
    pub fn period(self) -> Period {
        match self {
            PeriodBucket::Current | PeriodBucket::CurrentNonConsolidated => Period::Current,
            PeriodBucket::Previous | PeriodBucket::PreviousNonConsolidated => Period::Previous,
        }
    }

    pub fn is_consolidated(self) -> bool {
        matches!(self, PeriodBucket::Current | PeriodBucket::Previous)
    }
}

/// One reporting context declaration: a period plus a consolidation scope.
#[derive(Debug, Clone)]
pub struct Context {
    pub id: String,
    pub period_type: PeriodType,
    pub start: Option<NaiveDate>,
    pub end: NaiveDate,
    pub scope: Scope,
    pub dimension_member: Option<String>,
}

impl Context {
    /// Length of the reporting period in days; zero for instants.
    pub fn duration_days(&self) -> i64 {
        match (self.period_type, self.start) {
            (PeriodType::Duration, Some(start)) => (self.end - start).num_days(),
            _ => 0,
        }
    }
}

/// Every usable context declaration of a filing, keyed by context id. Ids are
/// unique within a filing; the first declaration wins on collision.
#[derive(Debug, Default)]
pub struct ContextRegistry {
    contexts: HashMap<String, Context>,
}

impl ContextRegistry {
    pub fn collect(&mut self, doc: &roxmltree::Document<'_>, cfg: &ResolverConfig) {
        for node in doc
            .root_element()
            .descendants()
            .filter(|n| n.is_element() && n.tag_name().name() == "context")
        {
            let Some(ctx) = parse_context(&node, cfg) else {
                continue;
            };
            self.contexts.entry(ctx.id.clone()).or_insert(ctx);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Context> {
        self.contexts.get(id)
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Latest point-in-time boundary among all contexts, used as a fallback
    /// anchor when no anchor fact is present.
    pub fn latest_instant_end(&self) -> Option<NaiveDate> {
        self.contexts
            .values()
            .filter(|c| c.period_type == PeriodType::Instant)
            .map(|c| c.end)
            .max()
    }
}

/// Parses a YYYY-MM-DD date, tolerating trailing time components.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    let head = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

fn parse_context(node: &roxmltree::Node<'_, '_>, cfg: &ResolverConfig) -> Option<Context> {
    let id = node.attribute("id")?.to_string();

    // Sub-segment breakdowns can never carry a top-level metric.
    if cfg.segment_markers.iter().any(|m| id.contains(m.as_str())) {
        return None;
    }
    if cfg.separate_markers.iter().any(|m| id.contains(m.as_str())) {
        return None;
    }

    let mut scope = if id.contains(&cfg.non_consolidated_marker) {
        Scope::NonConsolidated
    } else {
        Scope::Consolidated
    };

    let mut dimension_member = None;
    if let Some(member) = node
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "explicitMember")
    {
        let text = member.text().unwrap_or("").trim().to_string();
        if cfg.separate_markers.iter().any(|m| text.contains(m.as_str())) {
            scope = Scope::NonConsolidated;
        } else if text.contains(NON_CONSOLIDATED_MEMBER) {
            scope = Scope::NonConsolidated;
        } else if !text.contains(CONSOLIDATED_MEMBER) {
            // Any other explicit member restricts the context to a named
            // subset of the group; it is not a top-level scope.
            return None;
        }
        dimension_member = Some(text);
    }

    let period = node
        .children()
        .find(|n| n.is_element() && n.tag_name().name() == "period")?;

    let find_date = |name: &str| {
        period
            .descendants()
            .find(|n| n.is_element() && n.tag_name().name() == name)
            .and_then(|n| n.text())
            .and_then(parse_date)
    };

    let (period_type, start, end) = if let Some(instant) = find_date("instant") {
        (PeriodType::Instant, None, instant)
    } else {
        let start = find_date("startDate")?;
        let end = find_date("endDate")?;
        (PeriodType::Duration, Some(start), end)
    };

    Some(Context {
        id,
        period_type,
        start,
        end,
        scope,
        dimension_member,
    })
}
