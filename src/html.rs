//! Targeted extraction from block markup.
//!
//! The normalizer only needs a handful of facts from a block's `innerHTML`:
//! attributes of the first tag of some kind, the text of an element, and tag
//! counts. These helpers answer exactly that over flat markup. They are not
//! an HTML parser and never fail: malformed fragments just yield `None`.

use std::sync::LazyLock;

use regex::Regex;

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    // `<name attrs>` or `<name attrs/>`. Attribute values containing `>` are
    // not supported.
    Regex::new(r"<([A-Za-z][A-Za-z0-9]*)\b([^>]*)>").expect("Invalid regex pattern for open tag")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+))"#)
        .expect("Invalid regex pattern for tag attribute")
});

static ANY_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex pattern for tag"));

/// An opening tag and its attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    /// Lowercased tag name.
    pub name: String,
    /// Attributes in source order; names lowercased, values entity-decoded.
    pub attrs: Vec<(String, String)>,
    /// Byte offset just past the tag's `>`.
    pub end: usize,
}

impl Tag {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Whitespace-separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }
}

/// All opening tags in `html`, in order.
pub fn open_tags(html: &str) -> impl Iterator<Item = Tag> + '_ {
    OPEN_TAG.captures_iter(html).map(|caps| {
        let attrs = caps.get(2).map_or("", |m| m.as_str());
        Tag {
            name: caps[1].to_ascii_lowercase(),
            attrs: parse_attributes(attrs),
            end: caps.get(0).map_or(0, |m| m.end()),
        }
    })
}

/// The first opening tag named `name` (case-insensitive).
pub fn first_tag(html: &str, name: &str) -> Option<Tag> {
    open_tags(html).find(|tag| tag.name.eq_ignore_ascii_case(name))
}

/// The first opening tag of any kind.
pub fn first_open_tag(html: &str) -> Option<Tag> {
    open_tags(html).next()
}

/// Number of opening tags named `name`.
pub fn count_tags(html: &str, name: &str) -> usize {
    open_tags(html)
        .filter(|tag| tag.name.eq_ignore_ascii_case(name))
        .count()
}

/// Markup between the first `<name ...>` and its closing tag.
///
/// Nested elements of the same name are not tracked; the first closing tag
/// wins. Returns `None` when either tag is missing.
pub fn element_inner_html<'a>(html: &'a str, name: &str) -> Option<&'a str> {
    let open = first_tag(html, name)?;
    let closing = format!("</{}", name.to_ascii_lowercase());
    // ASCII lowercasing keeps byte offsets aligned with `html`.
    let lower = html.to_ascii_lowercase();
    let close = open.end + lower[open.end..].find(&closing)?;
    Some(&html[open.end..close])
}

/// Text content of the first `<name>` element: tags stripped, entities
/// decoded, surrounding whitespace trimmed.
pub fn element_text(html: &str, name: &str) -> Option<String> {
    element_inner_html(html, name).map(text_content)
}

/// Strip tags from a fragment and decode entities.
pub fn text_content(fragment: &str) -> String {
    let stripped = ANY_TAG.replace_all(fragment, "");
    decode_entities(&stripped).trim().to_string()
}

pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

fn parse_attributes(s: &str) -> Vec<(String, String)> {
    ATTRIBUTE
        .captures_iter(s)
        .map(|caps| {
            let value = caps
                .get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map_or("", |m| m.as_str());
            (caps[1].to_ascii_lowercase(), decode_entities(value))
        })
        .collect()
}
