//! XML utility functions for navigating OAI-PMH response documents.

use roxmltree::{Document, Node};

/// Get the tag name without namespace prefix.
pub fn local_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find all descendant elements with the given local tag name, ignoring
/// namespaces.
///
/// OAI-PMH envelope elements (`error`, `metadata`, `resumptionToken`) live
/// in the protocol namespace, but repositories are inconsistent about
/// declaring it; matching on the local name is the robust lookup.
pub fn descendants_named<'a, 'input>(
    doc: &'a Document<'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    doc.descendants()
        .filter(move |n| n.is_element() && local_name(*n) == tag)
}

/// Find the first descendant element matching (namespace URI, local tag
/// name) within a fragment.
///
/// # Arguments
/// * `fragment` - Node to search under (the node itself is not considered)
/// * `namespace_uri` - Required namespace URI of the target element
/// * `tag` - Local tag name of the target element
pub fn first_in_namespace<'a, 'input>(
    fragment: Node<'a, 'input>,
    namespace_uri: &str,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    fragment
        .descendants()
        .filter(|n| *n != fragment)
        .find(|n| {
            n.is_element()
                && n.tag_name().name() == tag
                && n.tag_name().namespace() == Some(namespace_uri)
        })
}

/// Get the text content of a node, trimmed.
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;

    const DC_NS: &str = "http://purl.org/dc/elements/1.1/";

    #[test]
    fn test_local_name_strips_prefix() {
        let xml = r#"<oai:record xmlns:oai="http://www.openarchives.org/OAI/2.0/"/>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(local_name(doc.root_element()), "record");
    }

    #[test]
    fn test_descendants_named() {
        let xml = r#"<OAI-PMH xmlns="http://www.openarchives.org/OAI/2.0/">
            <ListRecords>
                <record><metadata/></record>
                <record><metadata/></record>
            </ListRecords>
        </OAI-PMH>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(descendants_named(&doc, "metadata").count(), 2);
        assert_eq!(descendants_named(&doc, "resumptionToken").count(), 0);
    }

    #[test]
    fn test_first_in_namespace() {
        let xml = r#"<metadata>
            <dc xmlns:dc="http://purl.org/dc/elements/1.1/">
                <dc:title>A title</dc:title>
                <dc:identifier>https://x.org/a</dc:identifier>
                <dc:identifier>https://x.org/other</dc:identifier>
            </dc>
        </metadata>"#;
        let doc = Document::parse(xml).unwrap();
        let found = first_in_namespace(doc.root_element(), DC_NS, "identifier");
        assert_eq!(found.and_then(|n| n.text()), Some("https://x.org/a"));
    }

    #[test]
    fn test_first_in_namespace_wrong_namespace() {
        let xml = r#"<metadata><identifier>https://x.org/a</identifier></metadata>"#;
        let doc = Document::parse(xml).unwrap();
        assert!(first_in_namespace(doc.root_element(), DC_NS, "identifier").is_none());
    }

    #[test]
    fn test_get_text_trims() {
        let xml = r#"<token>  abc123  </token>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "abc123");
    }

    #[test]
    fn test_get_text_empty_element() {
        let xml = r#"<token/>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(get_text(doc.root_element()), "");
    }
}
