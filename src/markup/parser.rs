//! # Markup Tokenizer and Parser
//!
//! Turns message text with inline tags into a tree of [`Node`]s.
//!
//! ## Grammar
//!
//! ```text
//! <b>bold <u1>and underlined</u1></b>   nested tags
//! <center/>                             self-closing (no children)
//! \<b\>                                 escaped, printed literally as <b>
//! <blink>                               unknown opening tag, printed literally
//! ```
//!
//! ## Recovery
//!
//! The parser never fails:
//!
//! - A closing tag unwinds the open-tag stack down to and including the
//!   nearest matching open tag. If nothing matches, the whole stack unwinds.
//! - Tags left open at the end of input keep everything after them as
//!   children. They are never auto-closed earlier.
//! - Unknown opening tags become literal text. Closing tags are never
//!   printed, known or not.

use std::sync::LazyLock;

use regex::Regex;

use super::tags::{self, TagSpec};

/// Placeholder for `\<` while tags are being split out.
const ESCAPED_OPEN: char = '\u{E000}';
/// Placeholder for `\>` while tags are being split out.
const ESCAPED_CLOSE: char = '\u{E001}';

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("tag pattern is valid"));

/// A node of the parsed markup tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text, escapes already resolved.
    Text(String),
    /// A registered tag and everything nested inside it.
    Styled(Styled),
}

/// A tag node with its children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Styled {
    pub tag: &'static TagSpec,
    pub children: Vec<Node>,
}

impl Styled {
    fn new(tag: &'static TagSpec) -> Self {
        Self {
            tag,
            children: Vec::new(),
        }
    }
}

/// Parse markup into a list of root nodes.
///
/// ## Example
///
/// ```
/// use missive::markup::{parse, Node};
///
/// let nodes = parse("hi <b>there</b>");
/// assert_eq!(nodes.len(), 2);
/// assert_eq!(nodes[0], Node::Text("hi ".into()));
/// match &nodes[1] {
///     Node::Styled(styled) => assert_eq!(styled.tag.name, "b"),
///     other => panic!("expected a styled node, got {:?}", other),
/// }
/// ```
pub fn parse(src: &str) -> Vec<Node> {
    let src = src
        .replace(r"\<", &ESCAPED_OPEN.to_string())
        .replace(r"\>", &ESCAPED_CLOSE.to_string());

    let mut tree = TreeBuilder::default();
    let mut cursor = 0;

    for found in TAG_PATTERN.find_iter(&src) {
        if found.start() > cursor {
            tree.text(&src[cursor..found.start()]);
        }
        tree.tag(found.as_str());
        cursor = found.end();
    }
    if cursor < src.len() {
        tree.text(&src[cursor..]);
    }

    tree.finish()
}

fn unescape(s: &str) -> String {
    s.replace(ESCAPED_OPEN, "<").replace(ESCAPED_CLOSE, ">")
}

/// What a `<...>` token turned out to be.
#[derive(Debug, PartialEq, Eq)]
enum TagToken<'a> {
    Open { name: &'a str, self_closing: bool },
    Close { name: &'a str },
}

impl<'a> TagToken<'a> {
    /// Normalise a raw tag: strip `</`, `<`, `/>`, `>` and whitespace, keep
    /// the first word. Returns `None` when no name is left.
    fn classify(raw: &'a str) -> Option<Self> {
        let trimmed = raw.trim();
        let name = trimmed
            .trim_matches(|c: char| matches!(c, '<' | '/' | '>') || c.is_whitespace())
            .split_whitespace()
            .next()?;

        if trimmed.starts_with("</") {
            Some(Self::Close { name })
        } else {
            Some(Self::Open {
                name,
                self_closing: trimmed.ends_with("/>"),
            })
        }
    }
}

/// Builds the tree while tokens stream in.
///
/// Open nodes live on `open` until closed; closing moves a node into its
/// parent's children (or the root list), so sibling order follows the input.
#[derive(Default)]
struct TreeBuilder {
    root: Vec<Node>,
    open: Vec<Styled>,
}

impl TreeBuilder {
    fn container(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(node) => &mut node.children,
            None => &mut self.root,
        }
    }

    fn text(&mut self, raw: &str) {
        let text = unescape(raw);
        self.container().push(Node::Text(text));
    }

    fn tag(&mut self, raw: &str) {
        let Some(token) = TagToken::classify(raw) else {
            self.text(raw);
            return;
        };

        match token {
            TagToken::Close { name } => self.close_named(&name.to_lowercase()),
            TagToken::Open { name, self_closing } => match tags::lookup(&name.to_lowercase()) {
                Some(spec) if self_closing => {
                    self.container().push(Node::Styled(Styled::new(spec)));
                }
                Some(spec) => self.open.push(Styled::new(spec)),
                None => self.text(raw),
            },
        }
    }

    fn close_top(&mut self) {
        if let Some(node) = self.open.pop() {
            self.container().push(Node::Styled(node));
        }
    }

    /// Unwinds to and including the nearest open `name`, or everything.
    fn close_named(&mut self, name: &str) {
        while let Some(top) = self.open.last() {
            let matched = top.tag.name == name;
            self.close_top();
            if matched {
                break;
            }
        }
    }

    fn finish(mut self) -> Vec<Node> {
        while !self.open.is_empty() {
            self.close_top();
        }
        self.root
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> Node {
        Node::Text(s.to_string())
    }

    fn styled(name: &str, children: Vec<Node>) -> Node {
        Node::Styled(Styled {
            tag: tags::lookup(name).unwrap(),
            children,
        })
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(parse("hello world"), vec![text("hello world")]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse("").is_empty());
    }

    #[test]
    fn test_single_tag() {
        assert_eq!(parse("<b>bold</b>"), vec![styled("b", vec![text("bold")])]);
    }

    #[test]
    fn test_nested_tags_keep_order() {
        assert_eq!(
            parse("a<u2>b<b>c</b>d</u2>e"),
            vec![
                text("a"),
                styled("u2", vec![text("b"), styled("b", vec![text("c")]), text("d")]),
                text("e"),
            ]
        );
    }

    #[test]
    fn test_tag_names_are_case_insensitive_and_trimmed() {
        assert_eq!(
            parse("<CENTER >x</ center>"),
            vec![styled("center", vec![text("x")])]
        );
    }

    #[test]
    fn test_attributes_are_ignored() {
        assert_eq!(
            parse("<h1 class=\"big\">T</h1>"),
            vec![styled("h1", vec![text("T")])]
        );
    }

    #[test]
    fn test_self_closing_tag_has_no_children() {
        assert_eq!(
            parse("a<center/>b"),
            vec![text("a"), styled("center", vec![]), text("b")]
        );
    }

    #[test]
    fn test_unknown_open_tag_is_literal_text() {
        assert_eq!(parse("<blink>hi</blink>"), vec![text("<blink>"), text("hi")]);
    }

    #[test]
    fn test_unknown_close_tag_unwinds_open_frames() {
        assert_eq!(
            parse("<b>x</blink>y"),
            vec![styled("b", vec![text("x")]), text("y")]
        );
    }

    #[test]
    fn test_unterminated_tag_swallows_rest() {
        assert_eq!(
            parse("x<b>y<u1>z"),
            vec![text("x"), styled("b", vec![text("y"), styled("u1", vec![text("z")])])]
        );
    }

    #[test]
    fn test_mismatched_close_unwinds_to_match() {
        // </b> closes the open <u1> on its way down to <b>
        assert_eq!(
            parse("<b>1<u1>2</b>3"),
            vec![styled("b", vec![text("1"), styled("u1", vec![text("2")])]), text("3")]
        );
    }

    #[test]
    fn test_unmatched_close_unwinds_everything() {
        assert_eq!(
            parse("<b>1<u1>2</invert>3"),
            vec![styled("b", vec![text("1"), styled("u1", vec![text("2")])]), text("3")]
        );
    }

    #[test]
    fn test_stray_close_at_root_is_dropped() {
        assert_eq!(parse("a</b>c"), vec![text("a"), text("c")]);
    }

    #[test]
    fn test_escaped_brackets_are_literal() {
        assert_eq!(parse(r"\<b\>text\</b\>"), vec![text("<b>text</b>")]);
    }

    #[test]
    fn test_escape_inside_tag_body() {
        assert_eq!(
            parse(r"<b>1 \< 2</b>"),
            vec![styled("b", vec![text("1 < 2")])]
        );
    }

    #[test]
    fn test_blank_tag_is_literal() {
        assert_eq!(parse("< >"), vec![text("< >")]);
    }

    #[test]
    fn test_lone_angle_bracket_is_text() {
        assert_eq!(parse("a < b"), vec![text("a < b")]);
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            TagToken::classify("<b/>"),
            Some(TagToken::Open {
                name: "b",
                self_closing: true
            })
        );
        assert_eq!(TagToken::classify("</u1>"), Some(TagToken::Close { name: "u1" }));
        assert_eq!(TagToken::classify("</>"), None);
    }
}
