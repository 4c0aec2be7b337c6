//! `wp-block-parse` — parser for the WordPress block grammar.
//!
//! Post content stores blocks as HTML comments around ordinary markup:
//!
//! ```text
//! <!-- wp:heading {"level":3} --><h3 id="intro">Intro</h3><!-- /wp:heading -->
//! ```
//!
//! This crate splits such a document into [`BlockNode`]s and fills in the
//! attributes of well-known core blocks from their markup.
//!
//! # Quick start
//!
//! ```
//! let blocks = wp_block_parse::get_blocks(
//!     r#"<!-- wp:heading {"level":3} --><h3 id="intro">Intro</h3><!-- /wp:heading -->"#,
//! ).unwrap();
//! assert_eq!(blocks[0].block_name.as_deref(), Some("core/heading"));
//! assert_eq!(blocks[0].attrs["anchor"].as_str(), Some("intro"));
//! ```

pub mod blocks;
pub mod error;
pub mod html;
pub mod lexer;
pub mod parse;
#[cfg(feature = "terminal")]
pub mod render_term;
pub mod types;

pub use blocks::{normalize_block, normalize_blocks};
pub use error::*;
pub use parse::{ParseOptions, ParseResult, parse, parse_with_options};
pub use types::*;

/// Whether `text` contains at least one opening or self-closing block
/// delimiter.
pub fn has_blocks(text: &str) -> bool {
    lexer::has_block_opener(text)
}

/// Parse `text` and return its normalized blocks, free text dropped.
pub fn get_blocks(text: &str) -> Result<Vec<BlockNode>, ParseError> {
    get_blocks_with(text, &ParseOptions::default())
}

/// [`get_blocks`] with explicit resource limits.
///
/// Recovered problems are not reported here; call [`parse_with_options`] for
/// the diagnostics.
///
/// ```
/// use wp_block_parse::{ParseError, ParseOptions, get_blocks_with};
///
/// let options = ParseOptions { max_depth: 1, ..ParseOptions::default() };
/// let nested = "<!-- wp:group --><!-- wp:spacer /--><!-- /wp:group -->";
/// assert!(matches!(
///     get_blocks_with(nested, &options),
///     Err(ParseError::NestingTooDeep { limit: 1, .. })
/// ));
/// ```
pub fn get_blocks_with(text: &str, options: &ParseOptions) -> Result<Vec<BlockNode>, ParseError> {
    let result = parse_with_options(text, options)?;
    Ok(result
        .blocks
        .into_iter()
        .filter(|node| !node.is_freeform())
        .map(normalize_block)
        .collect())
}
