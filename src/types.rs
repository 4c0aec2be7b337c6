use std::ops::Range;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize, Serializer};

/// Byte range of a node within the source text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// A JSON attribute value as found in a block delimiter's payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttrValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    Array(Vec<AttrValue>),
    Object(Attrs),
}

/// Block attributes, kept in the order they were declared.
pub type Attrs = IndexMap<String, AttrValue>;

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        match self {
            AttrValue::Number(n) => n.as_u64(),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[AttrValue]> {
        match self {
            AttrValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<serde_json::Value> for AttrValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => AttrValue::Null,
            serde_json::Value::Bool(b) => AttrValue::Bool(b),
            serde_json::Value::Number(n) => AttrValue::Number(n),
            serde_json::Value::String(s) => AttrValue::String(s),
            serde_json::Value::Array(items) => {
                AttrValue::Array(items.into_iter().map(AttrValue::from).collect())
            }
            serde_json::Value::Object(map) => AttrValue::Object(
                map.into_iter()
                    .map(|(k, v)| (k, AttrValue::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::String(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::String(s)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

impl From<u64> for AttrValue {
    fn from(n: u64) -> Self {
        AttrValue::Number(n.into())
    }
}

/// One entry of a block's `innerContent`: either a run of markup or the slot
/// an inner block occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentPart {
    Html(String),
    InnerBlock,
}

impl Serialize for ContentPart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ContentPart::Html(html) => serializer.serialize_str(html),
            ContentPart::InnerBlock => serializer.serialize_none(),
        }
    }
}

/// A parsed node: either free text (`block_name == None`) or a block.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockNode {
    pub block_name: Option<String>,
    pub attrs: Attrs,
    pub inner_blocks: Vec<BlockNode>,
    #[serde(rename = "innerHTML")]
    pub inner_html: String,
    pub inner_content: Vec<ContentPart>,
    #[serde(skip)]
    pub span: Span,
}

impl BlockNode {
    /// A free-text node covering `text`.
    pub fn freeform(text: &str, span: Span) -> Self {
        BlockNode {
            block_name: None,
            attrs: Attrs::new(),
            inner_blocks: Vec::new(),
            inner_html: text.to_string(),
            inner_content: vec![ContentPart::Html(text.to_string())],
            span,
        }
    }

    /// A block with no content yet. The parser fills in the rest.
    pub fn block(name: impl Into<String>, attrs: Attrs, span: Span) -> Self {
        BlockNode {
            block_name: Some(name.into()),
            attrs,
            inner_blocks: Vec::new(),
            inner_html: String::new(),
            inner_content: Vec::new(),
            span,
        }
    }

    pub fn is_freeform(&self) -> bool {
        self.block_name.is_none()
    }

    pub fn name(&self) -> Option<&str> {
        self.block_name.as_deref()
    }

    /// The part of the block name before `/`.
    pub fn namespace(&self) -> Option<&str> {
        self.name().and_then(|n| n.split_once('/')).map(|(ns, _)| ns)
    }

    /// Append a run of markup to both `innerHTML` and `innerContent`.
    pub(crate) fn push_html(&mut self, html: &str) {
        if html.is_empty() {
            return;
        }
        self.inner_html.push_str(html);
        self.inner_content.push(ContentPart::Html(html.to_string()));
    }

    pub(crate) fn push_inner_block(&mut self, block: BlockNode) {
        self.inner_blocks.push(block);
        self.inner_content.push(ContentPart::InnerBlock);
    }
}
