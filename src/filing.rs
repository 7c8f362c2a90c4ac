use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{Cursor, Read};

use crate::config::ResolverConfig;
use crate::xbrl::context::ContextRegistry;
use crate::xbrl::index::FactIndex;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One markup document extracted from the archive.
#[derive(Debug, Clone)]
pub struct Document {
    pub name: String,
    pub content: String,
}

/// One disclosure's bundle of documents, with every usable context and fact
/// already parsed out. Immutable once loaded.
#[derive(Debug)]
pub struct Filing {
    pub documents: Vec<Document>,
    pub registry: ContextRegistry,
    pub index: FactIndex,
}

impl Filing {
    /// Loads a filing from ZIP archive bytes. Only a completely unreadable
    /// archive, or one without any recognizable instance document, is an
    /// error; individual documents that fail to parse are skipped.
    pub fn from_zip(bytes: &[u8], cfg: &ResolverConfig) -> Result<Self> {
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| anyhow!("unreadable filing archive: {e}"))?;

        let names: Vec<String> = archive
            .file_names()
            .filter(|n| n.ends_with(".xbrl") && n.contains("PublicDoc"))
            .map(str::to_string)
            .collect();
        if names.is_empty() {
            bail!("no XBRL instance document in archive");
        }

        let mut documents = Vec::with_capacity(names.len());
        for name in names {
            let mut entry = archive
                .by_name(&name)
                .map_err(|e| anyhow!("unreadable archive entry {name}: {e}"))?;
            let mut buf = Vec::new();
            entry.read_to_end(&mut buf)?;
            // BOM-aware lossy decode; EDINET instances are UTF-8.
            let (content, _, _) = encoding_rs::UTF_8.decode(&buf);
            documents.push(Document {
                name,
                content: content.into_owned(),
            });
        }

        let mut registry = ContextRegistry::default();
        let mut index = FactIndex::default();
        let mut parsed = 0usize;
        for doc in &documents {
            let normalized = WHITESPACE_RE.replace_all(&doc.content, " ");
            match roxmltree::Document::parse(&normalized) {
                Ok(tree) => {
                    registry.collect(&tree, cfg);
                    index.collect(&tree);
                    parsed += 1;
                }
                Err(e) => {
                    log::warn!("skipping unparseable document {}: {}", doc.name, e);
                }
            }
        }
        if parsed == 0 {
            bail!("no parseable XBRL document in archive");
        }
        log::debug!(
            "loaded filing: {} documents, {} contexts, {} facts",
            parsed,
            registry.len(),
            index.all().len()
        );

        Ok(Filing {
            documents,
            registry,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn archive_with(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut cursor);
        for (name, content) in entries {
            writer
                .start_file(name.to_string(), SimpleFileOptions::default())
                .unwrap();
            writer.write_all(content.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
        cursor.into_inner()
    }

    const INSTANCE: &str = r#"<xbrl xmlns:xbrli="http://www.xbrl.org/2003/instance"
             xmlns:jppfs="http://example.com/jppfs">
        <xbrli:context id="CurrentYearInstant">
            <xbrli:period><xbrli:instant>2024-03-31</xbrli:instant></xbrli:period>
        </xbrli:context>
        <jppfs:Assets contextRef="CurrentYearInstant">100</jppfs:Assets>
    </xbrl>"#;

    #[test]
    fn loads_public_doc_instances_only() {
        let bytes = archive_with(&[
            ("XBRL/PublicDoc/jpcrp030000-asr-001.xbrl", INSTANCE),
            ("XBRL/AuditDoc/jpaud-aar-cn-001.xbrl", INSTANCE),
            ("XBRL/PublicDoc/manifest.xml", "<manifest/>"),
        ]);
        let filing = Filing::from_zip(&bytes, &ResolverConfig::default()).unwrap();
        assert_eq!(filing.documents.len(), 1);
        assert_eq!(filing.registry.len(), 1);
        assert_eq!(filing.index.all().len(), 1);
    }

    #[test]
    fn corrupt_archive_is_a_filing_level_error() {
        assert!(Filing::from_zip(b"not a zip", &ResolverConfig::default()).is_err());
    }

    #[test]
    fn archive_without_instance_document_is_an_error() {
        let bytes = archive_with(&[("readme.txt", "hello")]);
        assert!(Filing::from_zip(&bytes, &ResolverConfig::default()).is_err());
    }

    #[test]
    fn unparseable_documents_are_skipped_not_fatal() {
        let bytes = archive_with(&[
            ("XBRL/PublicDoc/good.xbrl", INSTANCE),
            ("XBRL/PublicDoc/bad.xbrl", "<xbrl><unclosed"),
        ]);
        let filing = Filing::from_zip(&bytes, &ResolverConfig::default()).unwrap();
        assert_eq!(filing.index.all().len(), 1);
    }
}
