use crate::xbrl::context::Period;
use crate::xbrl::normalize;
use crate::xbrl::resolve::Resolver;

/// Sums a summation-group category over every spelling with data in the
/// requested period.
///
/// Different spellings are never mutually exclusive: trade receivables and
/// lease receivables both count. Within one spelling, consolidated facts are
/// preferred and the non-consolidated total is added only when no
/// consolidated fact exists for that spelling, so the same line item is never
/// counted twice. A spelling contributes at most once per period across all
/// documents of the filing: only the first document with a qualifying fact
/// counts, so a line item repeated verbatim in another document is not
/// re-added.
pub fn aggregate(resolver: &Resolver<'_>, tags: &[String], period: Period) -> f64 {
    let mut total = 0.0;
    for spelling in tags {
        let mut source_doc: Option<usize> = None;
        let mut consolidated = 0.0;
        let mut found_consolidated = false;
        let mut non_consolidated = 0.0;
        let mut found_non_consolidated = false;

        for fact in resolver.index.facts(spelling) {
            let Some(ctx) = resolver.registry.get(&fact.context_id) else {
                continue;
            };
            let Some(bucket) = resolver.target.classify(ctx, resolver.cfg.bucket_tolerance_days)
            else {
                continue;
            };
            if bucket.period() != period {
                continue;
            }
            let Some(value) = normalize::decode_value(fact) else {
                continue;
            };
            if *source_doc.get_or_insert(fact.doc) != fact.doc {
                continue;
            }
            if bucket.is_consolidated() {
                consolidated += value;
                found_consolidated = true;
            } else {
                non_consolidated += value;
                found_non_consolidated = true;
            }
        }

        if found_consolidated {
            total += consolidated;
        } else if found_non_consolidated {
            total += non_consolidated;
        }
    }
    total
}
