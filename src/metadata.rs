//! Metadata strategy: per-format extraction of content URLs from
//! `<metadata>` fragments.
//!
//! Each OAI-PMH metadata format names its URL-bearing element differently;
//! the strategy carries the (prefix, namespace, tag) triple identifying the
//! format and knows how to pull one URL out of each fragment. Formats whose
//! schema fits the namespace+tag lookup are pure configuration of
//! [`MetadataFormat`]; a format needing bespoke parsing implements
//! [`OaiMetadataHandler`] directly and overrides `extract_urls`.

use std::collections::BTreeSet;

use roxmltree::Node;

use crate::xml::{first_in_namespace, get_text};

/// Dublin Core metadata prefix.
pub const DC_PREFIX: &str = "oai_dc";

/// Dublin Core element namespace.
pub const DC_NAMESPACE_URI: &str = "http://purl.org/dc/elements/1.1/";

/// Dublin Core element carrying the content URL.
pub const DC_URL_TAG: &str = "identifier";

/// Strategy for interpreting one metadata format.
pub trait OaiMetadataHandler {
    /// The metadataPrefix request argument identifying this format.
    fn metadata_prefix(&self) -> &str;

    /// Namespace URI of the format's elements.
    fn metadata_namespace_uri(&self) -> &str;

    /// Local name of the URL-bearing element.
    fn url_tag_name(&self) -> &str;

    /// Extract content URLs from the `<metadata>` fragments of one page.
    ///
    /// The default walks each fragment, takes the text of the first element
    /// matching (namespace, tag), and skips fragments with no match — a
    /// skip is logged, never an abort.
    fn extract_urls(&self, fragments: &[Node<'_, '_>]) -> BTreeSet<String> {
        let mut urls = BTreeSet::new();
        for fragment in fragments {
            let found = first_in_namespace(
                *fragment,
                self.metadata_namespace_uri(),
                self.url_tag_name(),
            )
            .map(get_text)
            .filter(|text| !text.is_empty());

            match found {
                Some(url) => {
                    urls.insert(url);
                }
                None => {
                    tracing::warn!(
                        tag = self.url_tag_name(),
                        namespace = self.metadata_namespace_uri(),
                        "Metadata fragment without URL-bearing element, skipping"
                    );
                }
            }
        }
        urls
    }
}

/// Base metadata strategy: a format fully described by its identifying
/// triple, extracted with the default namespace+tag lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataFormat {
    prefix: String,
    namespace_uri: String,
    url_tag: String,
}

impl MetadataFormat {
    /// Build a format from its identifying triple.
    #[must_use]
    pub fn new(
        prefix: impl Into<String>,
        namespace_uri: impl Into<String>,
        url_tag: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            namespace_uri: namespace_uri.into(),
            url_tag: url_tag.into(),
        }
    }

    /// Dublin Core (`oai_dc`), the format every OAI-PMH repository must
    /// support. URLs are read from `<dc:identifier>`.
    #[must_use]
    pub fn dublin_core() -> Self {
        Self::new(DC_PREFIX, DC_NAMESPACE_URI, DC_URL_TAG)
    }
}

impl OaiMetadataHandler for MetadataFormat {
    fn metadata_prefix(&self) -> &str {
        &self.prefix
    }

    fn metadata_namespace_uri(&self) -> &str {
        &self.namespace_uri
    }

    fn url_tag_name(&self) -> &str {
        &self.url_tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    fn fragments<'a, 'input>(doc: &'a Document<'input>) -> Vec<Node<'a, 'input>> {
        crate::protocol::metadata_fragments(doc)
    }

    const PAGE: &str = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
      <ListRecords>
        <record><metadata>
          <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
                     xmlns:dc="http://purl.org/dc/elements/1.1/">
            <dc:title>First article</dc:title>
            <dc:identifier>https://x.org/a</dc:identifier>
          </oai_dc:dc>
        </metadata></record>
        <record><metadata>
          <oai_dc:dc xmlns:oai_dc="http://www.openarchives.org/OAI/2.0/oai_dc/"
                     xmlns:dc="http://purl.org/dc/elements/1.1/">
            <dc:identifier>https://x.org/b</dc:identifier>
            <dc:identifier>https://x.org/b-alternate</dc:identifier>
          </oai_dc:dc>
        </metadata></record>
      </ListRecords>
    </OAI-PMH>"#;

    #[test]
    fn test_dublin_core_identifying_fields() {
        let format = MetadataFormat::dublin_core();
        assert_eq!(format.metadata_prefix(), "oai_dc");
        assert_eq!(
            format.metadata_namespace_uri(),
            "http://purl.org/dc/elements/1.1/"
        );
        assert_eq!(format.url_tag_name(), "identifier");
    }

    #[test]
    fn test_extract_urls_first_identifier_per_fragment() {
        let doc = Document::parse(PAGE).unwrap();
        let urls = MetadataFormat::dublin_core().extract_urls(&fragments(&doc));

        // One URL per fragment; the second identifier of record two is
        // not consulted.
        assert_eq!(urls.len(), 2);
        assert!(urls.contains("https://x.org/a"));
        assert!(urls.contains("https://x.org/b"));
        assert!(!urls.contains("https://x.org/b-alternate"));
    }

    #[test]
    fn test_extract_urls_skips_fragment_without_match() {
        let xml = r#"<OAI-PMH><ListRecords>
          <record><metadata>
            <dc xmlns:dc="http://purl.org/dc/elements/1.1/">
              <dc:title>No identifier here</dc:title>
            </dc>
          </metadata></record>
          <record><metadata>
            <dc xmlns:dc="http://purl.org/dc/elements/1.1/">
              <dc:identifier>https://x.org/only</dc:identifier>
            </dc>
          </metadata></record>
        </ListRecords></OAI-PMH>"#;
        let doc = Document::parse(xml).unwrap();
        let urls = MetadataFormat::dublin_core().extract_urls(&fragments(&doc));
        assert_eq!(urls.len(), 1);
        assert!(urls.contains("https://x.org/only"));
    }

    #[test]
    fn test_extract_urls_namespace_must_match() {
        // An identifier outside the Dublin Core namespace is not a URL.
        let xml = r#"<OAI-PMH><ListRecords>
          <record><metadata>
            <plain><identifier>https://x.org/wrong-ns</identifier></plain>
          </metadata></record>
        </ListRecords></OAI-PMH>"#;
        let doc = Document::parse(xml).unwrap();
        let urls = MetadataFormat::dublin_core().extract_urls(&fragments(&doc));
        assert!(urls.is_empty());
    }

    #[test]
    fn test_extract_urls_deduplicates_within_page() {
        let xml = r#"<OAI-PMH><ListRecords>
          <record><metadata>
            <dc xmlns:dc="http://purl.org/dc/elements/1.1/">
              <dc:identifier>https://x.org/same</dc:identifier>
            </dc>
          </metadata></record>
          <record><metadata>
            <dc xmlns:dc="http://purl.org/dc/elements/1.1/">
              <dc:identifier>https://x.org/same</dc:identifier>
            </dc>
          </metadata></record>
        </ListRecords></OAI-PMH>"#;
        let doc = Document::parse(xml).unwrap();
        let urls = MetadataFormat::dublin_core().extract_urls(&fragments(&doc));
        assert_eq!(urls.len(), 1);
    }

    #[test]
    fn test_custom_format_configuration() {
        let format = MetadataFormat::new("oai_mods", "http://www.loc.gov/mods/v3", "url");
        assert_eq!(format.metadata_prefix(), "oai_mods");

        let xml = r#"<OAI-PMH><ListRecords>
          <record><metadata>
            <mods xmlns:m="http://www.loc.gov/mods/v3">
              <m:url>https://x.org/mods-item</m:url>
            </mods>
          </metadata></record>
        </ListRecords></OAI-PMH>"#;
        let doc = Document::parse(xml).unwrap();
        let urls = format.extract_urls(&fragments(&doc));
        assert!(urls.contains("https://x.org/mods-item"));
    }

    #[test]
    fn test_bespoke_handler_can_override_extraction() {
        struct EveryIdentifier;

        impl OaiMetadataHandler for EveryIdentifier {
            fn metadata_prefix(&self) -> &str {
                DC_PREFIX
            }
            fn metadata_namespace_uri(&self) -> &str {
                DC_NAMESPACE_URI
            }
            fn url_tag_name(&self) -> &str {
                DC_URL_TAG
            }
            fn extract_urls(&self, fragments: &[Node<'_, '_>]) -> BTreeSet<String> {
                fragments
                    .iter()
                    .flat_map(|f| f.descendants())
                    .filter(|n| {
                        n.is_element()
                            && n.tag_name().name() == DC_URL_TAG
                            && n.tag_name().namespace() == Some(DC_NAMESPACE_URI)
                    })
                    .map(crate::xml::get_text)
                    .filter(|t| !t.is_empty())
                    .collect()
            }
        }

        let doc = Document::parse(PAGE).unwrap();
        let urls = EveryIdentifier.extract_urls(&fragments(&doc));
        assert_eq!(urls.len(), 3);
        assert!(urls.contains("https://x.org/b-alternate"));
    }
}
