//! Small XML helpers shared by the POM parser, rewriter and synthesizer

use roxmltree::Node;

/// First child element with the given local name
pub(crate) fn child_element<'a, 'input>(
    node: &Node<'a, 'input>,
    name: &str,
) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|n| n.is_element() && n.tag_name().name() == name)
}

/// All child elements with the given local name, in document order
///
/// A single child and a list of one look the same from here, so callers
/// never special-case either shape.
pub(crate) fn child_elements<'a, 'input>(
    node: Node<'a, 'input>,
    name: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> + 'a
where
    'input: 'a,
{
    node.children()
        .filter(move |n| n.is_element() && n.tag_name().name() == name)
}

/// Follow a chain of child element names from `node`
pub(crate) fn descend<'a, 'input>(
    node: &Node<'a, 'input>,
    path: &[&str],
) -> Option<Node<'a, 'input>> {
    let mut current = *node;
    for name in path {
        current = child_element(&current, name)?;
    }
    Some(current)
}

/// Trimmed text of a child element, `None` when absent or blank
pub(crate) fn child_text(node: &Node<'_, '_>, name: &str) -> Option<String> {
    child_element(node, name)
        .and_then(|n| n.text())
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Escape text for use inside an element
pub(crate) fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Escape text for use inside a double-quoted attribute
pub(crate) fn escape_attribute(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

/// Indenting writer producing pretty-printed XML
///
/// Output depends only on the calls made, so identical inputs always give
/// byte-identical documents.
pub(crate) struct XmlWriter {
    buf: String,
    depth: usize,
    indent: &'static str,
}

impl XmlWriter {
    pub(crate) fn new() -> Self {
        let mut buf = String::new();
        buf.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        Self {
            buf,
            depth: 0,
            indent: "    ",
        }
    }

    fn pad(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str(self.indent);
        }
    }

    pub(crate) fn open(&mut self, tag: &str) {
        self.open_with_attributes(tag, &[]);
    }

    pub(crate) fn open_with_attributes(&mut self, tag: &str, attributes: &[(&str, &str)]) {
        self.pad();
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attributes {
            self.buf.push(' ');
            self.buf.push_str(name);
            self.buf.push_str("=\"");
            self.buf.push_str(&escape_attribute(value));
            self.buf.push('"');
        }
        self.buf.push_str(">\n");
        self.depth += 1;
    }

    pub(crate) fn close(&mut self, tag: &str) {
        self.depth = self.depth.saturating_sub(1);
        self.pad();
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    pub(crate) fn leaf(&mut self, tag: &str, text: &str) {
        self.pad();
        self.buf.push_str(&format!("<{tag}>{}</{tag}>\n", escape_text(text)));
    }

    pub(crate) fn blank_line(&mut self) {
        self.buf.push('\n');
    }

    pub(crate) fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_child_helpers() {
        let doc = roxmltree::Document::parse(
            "<project><a> x </a><b/><list><i>1</i><i>2</i></list></project>",
        )
        .unwrap();
        let root = doc.root_element();
        assert_eq!(child_text(&root, "a").as_deref(), Some("x"));
        assert_eq!(child_text(&root, "b"), None);
        assert_eq!(child_text(&root, "missing"), None);

        let list = descend(&root, &["list"]).unwrap();
        let items: Vec<_> = child_elements(list, "i").filter_map(|n| n.text()).collect();
        assert_eq!(items, vec!["1", "2"]);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a<b&c>"), "a&lt;b&amp;c&gt;");
        assert_eq!(escape_attribute("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn test_writer_indents() {
        let mut writer = XmlWriter::new();
        writer.open_with_attributes("project", &[("xmlns", "urn:x")]);
        writer.leaf("name", "a & b");
        writer.close("project");
        let xml = writer.finish();
        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<project xmlns=\"urn:x\">\n    <name>a &amp; b</name>\n</project>\n"
        );
    }
}
