//! Render a document to the HTML markup that gets persisted as the body.
//!
//! Lines are delimited by `\n` inside text inserts; block formatting lives on
//! the newline that ends a line, inline formatting on the text itself.

use serde_json::Value;

use crate::domain::document::{Attributes, Document, Operation};

pub fn render(document: &Document) -> String {
    let mut renderer = Renderer::default();
    for op in document.operations() {
        match op {
            Operation::TextInsert {
                content,
                attributes,
            } => renderer.push_text(content, attributes),
            Operation::ImageEmbed { source, attributes } => {
                renderer.line.push_str(&image_html(source.as_str(), attributes));
            }
            Operation::FormatMark { .. } => {}
        }
    }
    renderer.finish()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Paragraph,
    Header(u8),
    Blockquote,
    Code,
    Ordered,
    Bullet,
}

impl Block {
    fn from_attributes(attributes: &Attributes) -> Self {
        if let Some(level) = attributes
            .get("header")
            .and_then(Value::as_u64)
            .filter(|level| (1..=6).contains(level))
        {
            // Range-checked above.
            return Self::Header(u8::try_from(level).unwrap_or(1));
        }
        if is_on(attributes, "code-block") {
            return Self::Code;
        }
        if is_on(attributes, "blockquote") {
            return Self::Blockquote;
        }
        match attributes.get("list").and_then(Value::as_str) {
            Some("ordered") => Self::Ordered,
            Some(_) => Self::Bullet,
            None => Self::Paragraph,
        }
    }

    /// Wrapper shared by consecutive lines of the same kind.
    fn container(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Ordered => Some(("<ol>", "</ol>")),
            Self::Bullet => Some(("<ul>", "</ul>")),
            Self::Code => Some(("<pre>", "</pre>")),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Renderer {
    out: String,
    line: String,
    open: Option<Block>,
    code_lines: usize,
}

impl Renderer {
    fn push_text(&mut self, content: &str, attributes: &Attributes) {
        for (idx, segment) in content.split('\n').enumerate() {
            if idx > 0 {
                self.end_line(Block::from_attributes(attributes));
            }
            if !segment.is_empty() {
                self.line.push_str(&inline_html(segment, attributes));
            }
        }
    }

    fn end_line(&mut self, block: Block) {
        let line = std::mem::take(&mut self.line);
        if self.open != Some(block) {
            self.close_container();
            if let Some((open, _)) = block.container() {
                self.out.push_str(open);
                self.open = Some(block);
            }
        }

        let filled = if line.is_empty() { "<br>" } else { line.as_str() };
        match block {
            Block::Paragraph => push_wrapped(&mut self.out, "p", filled),
            Block::Header(level) => push_wrapped(&mut self.out, &format!("h{level}"), filled),
            Block::Blockquote => push_wrapped(&mut self.out, "blockquote", filled),
            Block::Ordered | Block::Bullet => push_wrapped(&mut self.out, "li", filled),
            Block::Code => {
                if self.code_lines > 0 {
                    self.out.push('\n');
                }
                self.out.push_str(&line);
                self.code_lines += 1;
            }
        }
    }

    fn close_container(&mut self) {
        if let Some((_, close)) = self.open.take().and_then(Block::container) {
            self.out.push_str(close);
        }
        self.code_lines = 0;
    }

    fn finish(mut self) -> String {
        if !self.line.is_empty() {
            self.end_line(Block::Paragraph);
        }
        self.close_container();
        self.out
    }
}

fn push_wrapped(out: &mut String, tag: &str, inner: &str) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    out.push_str(inner);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn inline_html(text: &str, attributes: &Attributes) -> String {
    let mut html = escape(text);
    for (key, tag) in [
        ("code", "code"),
        ("strike", "s"),
        ("underline", "u"),
        ("italic", "em"),
        ("bold", "strong"),
    ] {
        if is_on(attributes, key) {
            html = format!("<{tag}>{html}</{tag}>");
        }
    }
    wrap_link(html, attributes)
}

fn image_html(src: &str, attributes: &Attributes) -> String {
    let mut html = String::with_capacity(src.len() + 32);
    html.push_str("<img src=\"");
    html.push_str(&escape(src));
    html.push('"');
    for key in ["alt", "width", "height"] {
        let value = match attributes.get(key) {
            Some(Value::String(value)) => value.clone(),
            Some(Value::Number(value)) => value.to_string(),
            _ => continue,
        };
        html.push(' ');
        html.push_str(key);
        html.push_str("=\"");
        html.push_str(&escape(&value));
        html.push('"');
    }
    html.push('>');
    wrap_link(html, attributes)
}

fn wrap_link(html: String, attributes: &Attributes) -> String {
    match attributes.get("link").and_then(Value::as_str) {
        Some(href) => format!("<a href=\"{}\">{html}</a>", escape(href)),
        None => html,
    }
}

fn is_on(attributes: &Attributes, key: &str) -> bool {
    match attributes.get(key) {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Null) | None => false,
        Some(_) => true,
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::ImageSource;

    fn doc(raw: &str) -> Document {
        Document::from_json(raw).expect("valid delta")
    }

    #[test]
    fn blank_editor_renders_empty_paragraph() {
        assert_eq!(render(&Document::blank()), "<p><br></p>");
    }

    #[test]
    fn paragraphs_and_inline_marks() {
        let html = render(&doc(
            r#"{"ops":[
                {"insert":"Hello "},
                {"insert":"bold","attributes":{"bold":true}},
                {"insert":" & "},
                {"insert":"link","attributes":{"link":"https://x.dev/?a=1&b=2","italic":true}},
                {"insert":"\nsecond\n"}
            ]}"#,
        ));
        assert_eq!(
            html,
            "<p>Hello <strong>bold</strong> &amp; <a href=\"https://x.dev/?a=1&amp;b=2\"><em>link</em></a></p><p>second</p>"
        );
    }

    #[test]
    fn block_attributes_on_newlines() {
        let html = render(&doc(
            r#"{"ops":[
                {"insert":"Title"},{"insert":"\n","attributes":{"header":2}},
                {"insert":"one"},{"insert":"\n","attributes":{"list":"bullet"}},
                {"insert":"two"},{"insert":"\n","attributes":{"list":"bullet"}},
                {"insert":"first"},{"insert":"\n","attributes":{"list":"ordered"}},
                {"insert":"let x = 1;"},{"insert":"\n","attributes":{"code-block":true}},
                {"insert":"x < 2"},{"insert":"\n","attributes":{"code-block":true}},
                {"insert":"quoted"},{"insert":"\n","attributes":{"blockquote":true}}
            ]}"#,
        ));
        assert_eq!(
            html,
            "<h2>Title</h2><ul><li>one</li><li>two</li></ul><ol><li>first</li></ol>\
             <pre>let x = 1;\nx &lt; 2</pre><blockquote>quoted</blockquote>"
        );
    }

    #[test]
    fn images_render_inline_with_attributes() {
        let mut attributes = Attributes::new();
        attributes.insert("alt".into(), serde_json::json!("a \"cat\""));
        attributes.insert("width".into(), serde_json::json!(120));
        let document = Document::new(vec![
            Operation::text("see "),
            Operation::ImageEmbed {
                source: ImageSource::Hosted("/media/img/a.png".into()),
                attributes,
            },
            Operation::text("\n"),
        ]);
        assert_eq!(
            render(&document),
            "<p>see <img src=\"/media/img/a.png\" alt=\"a &quot;cat&quot;\" width=\"120\"></p>"
        );
    }

    #[test]
    fn trailing_text_without_newline_is_flushed() {
        let document = Document::new(vec![Operation::text("tail")]);
        assert_eq!(render(&document), "<p>tail</p>");
    }

    #[test]
    fn format_marks_render_nothing() {
        let document = Document::new(vec![
            Operation::text("a\n"),
            Operation::FormatMark {
                length: 1,
                attributes: Attributes::new(),
            },
        ]);
        assert_eq!(render(&document), "<p>a</p>");
    }
}
