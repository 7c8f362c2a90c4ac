use std::collections::HashMap;

/// One tagged leaf value bound to a context. A fact with non-numeric or empty
/// raw text is inert: it never contributes to a category.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    /// Taxonomy-local element name, namespace prefix stripped.
    pub tag: String,
    pub context_id: String,
    pub raw: String,
    /// Power-of-ten exponent from inline markup, applied during decode.
    pub scale: Option<i32>,
    /// Negation flag from inline markup.
    pub sign: bool,
    /// Ordinal of the source document within the filing.
    pub doc: usize,
}

// Structural elements of the instance document that are never facts.
const NON_FACT_ELEMENTS: [&str; 13] = [
    "context",
    "unit",
    "xbrl",
    "schemaRef",
    "period",
    "instant",
    "startDate",
    "endDate",
    "entity",
    "identifier",
    "segment",
    "scenario",
    "explicitMember",
];

/// Tag-to-facts index for one filing, case- and prefix-insensitive, with all
/// facts kept in document order.
#[derive(Debug, Default)]
pub struct FactIndex {
    facts: Vec<Fact>,
    by_tag: HashMap<String, Vec<usize>>,
    doc_count: usize,
}

impl FactIndex {
    pub fn collect(&mut self, doc: &roxmltree::Document<'_>) {
        let ordinal = self.doc_count;
        self.doc_count += 1;
        for node in doc.root_element().descendants().filter(|n| {
            n.is_element()
                && n.tag_name().namespace().is_some()
                && !NON_FACT_ELEMENTS.contains(&n.tag_name().name())
        }) {
            let Some(context_id) = node.attribute("contextRef") else {
                continue;
            };
            let tag = node.tag_name().name().to_string();
            let fact = Fact {
                context_id: context_id.to_string(),
                raw: node.text().unwrap_or("").trim().to_string(),
                scale: node.attribute("scale").and_then(|s| s.trim().parse().ok()),
                sign: node.attribute("sign") == Some("-"),
                doc: ordinal,
                tag,
            };
            let key = normalize_tag(&fact.tag);
            let idx = self.facts.len();
            self.facts.push(fact);
            self.by_tag.entry(key).or_default().push(idx);
        }
    }

    /// Facts carrying the given tag spelling, in document order.
    pub fn facts(&self, tag: &str) -> impl Iterator<Item = &Fact> + '_ {
        self.by_tag
            .get(&normalize_tag(tag))
            .into_iter()
            .flatten()
            .map(|&i| &self.facts[i])
    }

    /// Every fact of the filing, in document order.
    pub fn all(&self) -> &[Fact] {
        &self.facts
    }
}

fn normalize_tag(tag: &str) -> String {
    let local = tag.rsplit(':').next().unwrap_or(tag);
    local.to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_from(xml: &str) -> FactIndex {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut index = FactIndex::default();
        index.collect(&doc);
        index
    }

    #[test]
    fn lookup_is_case_and_prefix_insensitive() {
        let index = index_from(
            r#"<xbrl xmlns:jppfs="http://example.com/jppfs">
                <jppfs:NetSales contextRef="Cur">1000</jppfs:NetSales>
            </xbrl>"#,
        );
        assert_eq!(index.facts("NetSales").count(), 1);
        assert_eq!(index.facts("netsales").count(), 1);
        assert_eq!(index.facts("jppfs:NetSales").count(), 1);
        assert_eq!(index.facts("Sales").count(), 0);
    }

    #[test]
    fn structural_elements_are_not_indexed() {
        let index = index_from(
            r#"<xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
                     xmlns:jppfs="http://example.com/jppfs">
                <xbrli:context id="Cur">
                    <xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period>
                </xbrli:context>
                <jppfs:Assets contextRef="Cur">500</jppfs:Assets>
            </xbrl>"#,
        );
        assert_eq!(index.all().len(), 1);
        assert_eq!(index.all()[0].tag, "Assets");
    }

    #[test]
    fn each_collect_pass_gets_its_own_document_ordinal() {
        let xml = r#"<xbrl xmlns:jppfs="http://example.com/jppfs">
            <jppfs:Assets contextRef="Cur">500</jppfs:Assets>
        </xbrl>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut index = FactIndex::default();
        index.collect(&doc);
        index.collect(&doc);
        let docs: Vec<usize> = index.facts("Assets").map(|f| f.doc).collect();
        assert_eq!(docs, vec![0, 1]);
    }

    #[test]
    fn scale_and_sign_attributes_are_captured() {
        let index = index_from(
            r#"<xbrl xmlns:jppfs="http://example.com/jppfs">
                <jppfs:Assets contextRef="Cur" scale="3" sign="-">42</jppfs:Assets>
            </xbrl>"#,
        );
        let fact = &index.all()[0];
        assert_eq!(fact.scale, Some(3));
        assert!(fact.sign);
    }
}
