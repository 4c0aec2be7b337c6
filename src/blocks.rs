//! Per-block-type attribute normalization.
//!
//! `normalize_block` fills in attributes of known core blocks from the
//! block's own `innerHTML`. A key that is already present in `attrs` is never
//! touched, so explicit delimiter attributes always win. Unknown block names
//! and free-text nodes pass through unchanged.

use crate::html::{Tag, count_tags, element_text, first_open_tag, first_tag, open_tags};
use crate::types::{AttrValue, Attrs, BlockNode};

const GALLERY_DEFAULT_COLUMNS: u64 = 3;
const HEADING_DEFAULT_LEVEL: u64 = 2;

/// Normalize every node of a parsed document.
pub fn normalize_blocks(blocks: Vec<BlockNode>) -> Vec<BlockNode> {
    blocks.into_iter().map(normalize_block).collect()
}

/// Normalize one node and, depth first, all of its inner blocks.
pub fn normalize_block(mut block: BlockNode) -> BlockNode {
    block.inner_blocks = normalize_blocks(std::mem::take(&mut block.inner_blocks));

    let Some(name) = block.block_name.clone() else {
        return block;
    };

    match name.as_str() {
        "core/image" => normalize_image(&mut block),
        "core/gallery" => normalize_gallery(&mut block),
        "core/heading" => normalize_heading(&mut block),
        _ => {}
    }
    block
}

// ------------------------------------------------------------------
// Attribute helpers
// ------------------------------------------------------------------

/// Insert `key` unless it is already declared.
fn fill(attrs: &mut Attrs, key: &str, value: impl Into<AttrValue>) {
    if !attrs.contains_key(key) {
        attrs.insert(key.to_string(), value.into());
    }
}

/// Like [`fill`], but only computes the value when the key is missing and
/// leaves the key out when nothing could be derived.
fn fill_with<V: Into<AttrValue>>(attrs: &mut Attrs, key: &str, derive: impl FnOnce() -> Option<V>) {
    if attrs.contains_key(key) {
        return;
    }
    if let Some(value) = derive() {
        attrs.insert(key.to_string(), value.into());
    }
}

// ------------------------------------------------------------------
// Per-block normalizers
// ------------------------------------------------------------------

fn normalize_image(block: &mut BlockNode) {
    let img = first_tag(&block.inner_html, "img");
    let attrs = &mut block.attrs;

    fill_with(attrs, "url", || img.as_ref().and_then(|t| t.attr("src")).map(str::to_string));
    fill_with(attrs, "alt", || {
        Some(img.as_ref().and_then(|t| t.attr("alt")).unwrap_or_default().to_string())
    });
    fill_with(attrs, "caption", || {
        Some(element_text(&block.inner_html, "figcaption").unwrap_or_default())
    });
}

fn normalize_gallery(block: &mut BlockNode) {
    fill(&mut block.attrs, "imageCrop", true);
    fill(&mut block.attrs, "linkTo", "none");
    if !block.attrs.contains_key("columns") {
        let columns = gallery_columns(block);
        block.attrs.insert("columns".to_string(), columns.into());
    }
}

/// Column count for a gallery without an explicit `columns` attribute.
///
/// A `columns-N` class on the gallery's container wins. Otherwise the default
/// of three is clamped to the number of items, counted as `<li>` entries or,
/// for galleries built from nested image blocks, as `core/image` children.
fn gallery_columns(block: &BlockNode) -> u64 {
    let from_class = first_open_tag(&block.inner_html).and_then(|tag| {
        tag.classes()
            .filter_map(|class| class.strip_prefix("columns-")?.parse::<u64>().ok())
            .find(|&n| n > 0)
    });
    if let Some(columns) = from_class {
        return columns;
    }

    let mut items = count_tags(&block.inner_html, "li");
    if items == 0 {
        items = block
            .inner_blocks
            .iter()
            .filter(|inner| inner.name() == Some("core/image"))
            .count();
    }
    match items {
        0 => GALLERY_DEFAULT_COLUMNS,
        n => (n as u64).min(GALLERY_DEFAULT_COLUMNS),
    }
}

fn normalize_heading(block: &mut BlockNode) {
    fill(&mut block.attrs, "level", HEADING_DEFAULT_LEVEL);

    let Some(tag) = heading_tag(&block.inner_html) else {
        return;
    };
    let attrs = &mut block.attrs;
    fill_with(attrs, "align", || heading_align(&tag));
    fill_with(attrs, "className", || {
        let classes: Vec<&str> = tag.classes().filter(|c| !is_reserved_class(c)).collect();
        (!classes.is_empty()).then(|| classes.join(" "))
    });
    fill_with(attrs, "anchor", || {
        tag.attr("id").filter(|id| !id.is_empty()).map(str::to_string)
    });
}

/// The first `<h1>`..`<h6>` tag.
fn heading_tag(html: &str) -> Option<Tag> {
    open_tags(html).find(|tag| {
        let bytes = tag.name.as_bytes();
        bytes.len() == 2 && bytes[0] == b'h' && (b'1'..=b'6').contains(&bytes[1])
    })
}

fn heading_align(tag: &Tag) -> Option<String> {
    let from_style = tag.attr("style").and_then(|style| {
        style.split(';').find_map(|decl| {
            let (prop, value) = decl.split_once(':')?;
            let value = value.trim();
            (prop.trim().eq_ignore_ascii_case("text-align") && !value.is_empty())
                .then(|| value.to_ascii_lowercase())
        })
    });
    from_style.or_else(|| {
        tag.classes()
            .find_map(|c| c.strip_prefix("has-text-align-"))
            .filter(|align| !align.is_empty())
            .map(str::to_string)
    })
}

/// Classes the editor adds on its own; they never round-trip as `className`.
fn is_reserved_class(class: &str) -> bool {
    class.starts_with("wp-block-")
        || class.starts_with("has-text-align-")
        || class == "has-background"
        || class == "has-custom-font-size"
        || (class.starts_with("has-") && (class.ends_with("-color") || class.ends_with("-font-size")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Span;
    use pretty_assertions::assert_eq;

    /// Helper: a block with the given attrs and inner markup.
    fn block(name: &str, attrs: Attrs, inner_html: &str) -> BlockNode {
        let mut node = BlockNode::block(name, attrs, Span::new(0, 100));
        node.push_html(inner_html);
        node
    }

    /// Helper: quick attrs builder.
    fn attrs(pairs: &[(&str, AttrValue)]) -> Attrs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn string(s: &str) -> AttrValue {
        AttrValue::from(s)
    }

    // -- Image -----------------------------------------------------

    const IMAGE_HTML: &str = concat!(
        r#"<div class="wp-block-image"><figure class="aligncenter">"#,
        r#"<img src="https://cldup.com/YLYhpou2oq.jpg" alt="Test alt"/>"#,
        r#"<figcaption>Give it a try. Press the &quot;really wide&quot; button on the image toolbar.</figcaption>"#,
        "</figure></div>",
    );

    #[test]
    fn normalize_image_from_markup() {
        let node = normalize_block(block(
            "core/image",
            attrs(&[("align", string("center"))]),
            IMAGE_HTML,
        ));
        assert_eq!(node.attrs["align"], string("center"));
        assert_eq!(node.attrs["url"], string("https://cldup.com/YLYhpou2oq.jpg"));
        assert_eq!(node.attrs["alt"], string("Test alt"));
        assert_eq!(
            node.attrs["caption"],
            string(r#"Give it a try. Press the "really wide" button on the image toolbar."#)
        );
    }

    #[test]
    fn normalize_image_keeps_explicit_values() {
        let node = normalize_block(block(
            "core/image",
            attrs(&[("url", string("https://example.com/other.png")), ("alt", string(""))]),
            IMAGE_HTML,
        ));
        assert_eq!(node.attrs["url"], string("https://example.com/other.png"));
        assert_eq!(node.attrs["alt"], string(""));
        assert!(node.attrs.contains_key("caption"));
    }

    #[test]
    fn normalize_image_without_markup() {
        let node = normalize_block(block("core/image", Attrs::new(), "<figure></figure>"));
        assert!(!node.attrs.contains_key("url"));
        assert_eq!(node.attrs["alt"], string(""));
        assert_eq!(node.attrs["caption"], string(""));
    }

    // -- Gallery ---------------------------------------------------

    const GALLERY_HTML: &str = r#"
        <ul class="wp-block-gallery columns-2 is-cropped">
            <li class="blocks-gallery-item"><figure><img src="https://cldup.com/uuUqE_dXzy.jpg" alt="title" /></figure></li>
            <li class="blocks-gallery-item"><figure><img src="http://google.com/hi.png" alt="title" /></figure></li>
        </ul>
    "#;

    #[test]
    fn normalize_gallery_defaults() {
        let ids = AttrValue::Array(vec![AttrValue::from(1u64), AttrValue::from(2u64)]);
        let node = normalize_block(block("core/gallery", attrs(&[("ids", ids.clone())]), GALLERY_HTML));
        assert_eq!(node.attrs["ids"], ids);
        assert_eq!(node.attrs["imageCrop"], AttrValue::Bool(true));
        assert_eq!(node.attrs["linkTo"], string("none"));
        assert_eq!(node.attrs["columns"], AttrValue::from(2u64));
    }

    #[test]
    fn normalize_gallery_explicit_attrs_win() {
        let node = normalize_block(block(
            "core/gallery",
            attrs(&[
                ("imageCrop", AttrValue::Bool(false)),
                ("linkTo", string("media")),
                ("columns", AttrValue::from(5u64)),
            ]),
            GALLERY_HTML,
        ));
        assert_eq!(node.attrs["imageCrop"], AttrValue::Bool(false));
        assert_eq!(node.attrs["linkTo"], string("media"));
        assert_eq!(node.attrs["columns"], AttrValue::from(5u64));
    }

    #[test]
    fn normalize_gallery_columns_from_item_count() {
        let two = "<ul class=\"wp-block-gallery\"><li>a</li><li>b</li></ul>";
        let node = normalize_block(block("core/gallery", Attrs::new(), two));
        assert_eq!(node.attrs["columns"], AttrValue::from(2u64));

        let five = "<ul><li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ul>";
        let node = normalize_block(block("core/gallery", Attrs::new(), five));
        assert_eq!(node.attrs["columns"], AttrValue::from(3u64));

        let empty = normalize_block(block("core/gallery", Attrs::new(), ""));
        assert_eq!(empty.attrs["columns"], AttrValue::from(3u64));
    }

    #[test]
    fn normalize_gallery_class_beats_item_count() {
        let html = "<ul class=\"wp-block-gallery columns-4\"><li>a</li><li>b</li></ul>";
        let node = normalize_block(block("core/gallery", Attrs::new(), html));
        assert_eq!(node.attrs["columns"], AttrValue::from(4u64));
    }

    #[test]
    fn normalize_gallery_ignores_unusable_column_classes() {
        let five = "<li>1</li><li>2</li><li>3</li><li>4</li><li>5</li></ul>";
        for class in ["columns-0", "columns-wide"] {
            let html = format!("<ul class=\"wp-block-gallery {class}\">{five}");
            let node = normalize_block(block("core/gallery", Attrs::new(), &html));
            assert_eq!(node.attrs["columns"], AttrValue::from(3u64), "class {class}");
        }

        let two = "<ul class=\"columns-0\"><li>a</li><li>b</li></ul>";
        let node = normalize_block(block("core/gallery", Attrs::new(), two));
        assert_eq!(node.attrs["columns"], AttrValue::from(2u64));
    }

    #[test]
    fn normalize_gallery_reads_class_from_container_only() {
        let html = "<ul class=\"wp-block-gallery\"><li class=\"columns-6\">a</li></ul>";
        let node = normalize_block(block("core/gallery", Attrs::new(), html));
        assert_eq!(node.attrs["columns"], AttrValue::from(1u64));
    }

    #[test]
    fn normalize_gallery_counts_nested_images() {
        let mut gallery = block("core/gallery", Attrs::new(), "<figure class=\"wp-block-gallery\">");
        gallery.push_inner_block(block("core/image", Attrs::new(), "<img src=\"a.png\"/>"));
        gallery.push_html("</figure>");
        let node = normalize_block(gallery);
        assert_eq!(node.attrs["columns"], AttrValue::from(1u64));
        assert_eq!(node.inner_blocks[0].attrs["url"], string("a.png"));
    }

    // -- Heading ---------------------------------------------------

    #[test]
    fn normalize_heading_keeps_explicit_and_adds_anchor() {
        let node = normalize_block(block(
            "core/heading",
            attrs(&[
                ("level", AttrValue::from(3u64)),
                ("align", string("center")),
                ("className", string("class")),
            ]),
            r#"<h3 style="text-align:center" id="anchor" class="class">Header</h3>"#,
        ));
        assert_eq!(node.attrs["level"], AttrValue::from(3u64));
        assert_eq!(node.attrs["align"], string("center"));
        assert_eq!(node.attrs["className"], string("class"));
        assert_eq!(node.attrs["anchor"], string("anchor"));
    }

    #[test]
    fn normalize_heading_derives_from_tag() {
        let node = normalize_block(block(
            "core/heading",
            Attrs::new(),
            r#"<h2 class="wp-block-heading has-text-align-right has-primary-color fancy big" id="intro">Intro</h2>"#,
        ));
        assert_eq!(node.attrs["level"], AttrValue::from(2u64));
        assert_eq!(node.attrs["align"], string("right"));
        assert_eq!(node.attrs["className"], string("fancy big"));
        assert_eq!(node.attrs["anchor"], string("intro"));
    }

    #[test]
    fn normalize_heading_style_beats_class_for_align() {
        let node = normalize_block(block(
            "core/heading",
            Attrs::new(),
            r#"<h4 style="color: red; Text-Align: Left" class="has-text-align-right">x</h4>"#,
        ));
        assert_eq!(node.attrs["align"], string("left"));
        assert!(!node.attrs.contains_key("className"));
        assert!(!node.attrs.contains_key("anchor"));
    }

    #[test]
    fn normalize_heading_without_tag_only_sets_level() {
        let node = normalize_block(block("core/heading", Attrs::new(), "Header"));
        assert_eq!(node.attrs.len(), 1);
        assert_eq!(node.attrs["level"], AttrValue::from(2u64));
    }

    // -- Pass-through ----------------------------------------------

    #[test]
    fn normalize_unknown_block_unchanged() {
        let original = block("core/paragraph", attrs(&[("dropCap", AttrValue::Bool(true))]), "<p>x</p>");
        assert_eq!(normalize_block(original.clone()), original);
    }

    #[test]
    fn normalize_freeform_unchanged() {
        let text = BlockNode::freeform("<img src=\"x.png\">", Span::new(0, 17));
        assert_eq!(normalize_block(text.clone()), text);
    }

    #[test]
    fn normalize_is_idempotent() {
        for node in [
            block("core/image", Attrs::new(), IMAGE_HTML),
            block("core/gallery", Attrs::new(), GALLERY_HTML),
            block("core/heading", Attrs::new(), "<h5 id=\"a\" class=\"b\">c</h5>"),
        ] {
            let once = normalize_block(node);
            let twice = normalize_block(once.clone());
            assert_eq!(twice, once);
        }
    }

    #[test]
    fn reserved_classes() {
        assert!(is_reserved_class("wp-block-heading"));
        assert!(is_reserved_class("has-vivid-red-background-color"));
        assert!(is_reserved_class("has-large-font-size"));
        assert!(!is_reserved_class("has-shadow"));
        assert!(!is_reserved_class("class"));
    }
}
