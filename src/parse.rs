//! Block grammar parser.
//!
//! Consumes the delimiter stream from [`crate::lexer`] with an explicit
//! stack of open blocks. Text between delimiters
//! becomes free-text nodes at the top level, or `innerHTML` /
//! `innerContent` fragments of the enclosing block.
//!
//! Malformed markup never aborts the parse. Bad attribute JSON, stray
//! closers and unclosed openers are repaired and reported as
//! [`Diagnostic`]s. Only the resource limits in [`ParseOptions`] produce a
//! [`ParseError`].

use serde::Deserialize;

use crate::error::{Diagnostic, DiagnosticCode, ParseError};
use crate::lexer::{Delimiter, DelimiterKind, Lexer};
use crate::types::{AttrValue, Attrs, BlockNode, Span};

/// Resource limits applied while parsing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParseOptions {
    /// Largest accepted input, in bytes.
    pub max_input_len: usize,
    /// Deepest accepted block nesting. A top-level block is at depth 1.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            max_input_len: 16 * 1024 * 1024,
            max_depth: 128,
        }
    }
}

/// Output of a successful parse.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseResult {
    /// Top-level nodes in document order, free text included.
    pub blocks: Vec<BlockNode>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Parse `input` with the default [`ParseOptions`].
pub fn parse(input: &str) -> Result<ParseResult, ParseError> {
    parse_with_options(input, &ParseOptions::default())
}

pub fn parse_with_options(input: &str, options: &ParseOptions) -> Result<ParseResult, ParseError> {
    if input.len() > options.max_input_len {
        return Err(ParseError::InputTooLarge {
            len: input.len(),
            limit: options.max_input_len,
        });
    }

    let mut parser = Parser {
        input,
        options,
        lexer: Lexer::new(input),
        text_start: 0,
        stack: Vec::new(),
        output: Vec::new(),
        diagnostics: Vec::new(),
    };
    parser.run()?;

    Ok(ParseResult {
        blocks: parser.output,
        diagnostics: parser.diagnostics,
    })
}

struct Parser<'a> {
    input: &'a str,
    options: &'a ParseOptions,
    lexer: Lexer<'a>,
    /// Start of the text run not yet assigned to a node. Runs may include
    /// unmatched closers, which are kept as literal text.
    text_start: usize,
    /// Open blocks, innermost last. Each block's span starts at its opener.
    stack: Vec<BlockNode>,
    output: Vec<BlockNode>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Parser<'a> {
    fn run(&mut self) -> Result<(), ParseError> {
        while let Some(delimiter) = self.lexer.next() {
            tracing::trace!(
                kind = ?delimiter.kind,
                name = %delimiter.name,
                start = delimiter.span.start,
                "block delimiter"
            );
            match delimiter.kind {
                DelimiterKind::Opener => self.open(&delimiter)?,
                DelimiterKind::Void => self.void(&delimiter)?,
                DelimiterKind::Closer => self.close(&delimiter),
            }
        }
        self.finish();
        Ok(())
    }

    fn open(&mut self, delimiter: &Delimiter<'_>) -> Result<(), ParseError> {
        self.check_depth(delimiter)?;
        self.flush_text(delimiter.span.start);
        let attrs = self.decode_attrs(delimiter);
        self.stack
            .push(BlockNode::block(delimiter.name.clone(), attrs, delimiter.span));
        self.text_start = delimiter.span.end;
        Ok(())
    }

    fn void(&mut self, delimiter: &Delimiter<'_>) -> Result<(), ParseError> {
        self.check_depth(delimiter)?;
        self.flush_text(delimiter.span.start);
        let attrs = self.decode_attrs(delimiter);
        let block = BlockNode::block(delimiter.name.clone(), attrs, delimiter.span);
        self.attach(block);
        self.text_start = delimiter.span.end;
        Ok(())
    }

    fn close(&mut self, delimiter: &Delimiter<'_>) {
        let Some(index) = self
            .stack
            .iter()
            .rposition(|open| open.name() == Some(delimiter.name.as_str()))
        else {
            tracing::debug!(name = %delimiter.name, start = delimiter.span.start, "unmatched closer kept as text");
            self.diagnostics.push(Diagnostic::warning(
                DiagnosticCode::UnmatchedCloser,
                format!("closing delimiter for `{}` has no open block", delimiter.name),
                delimiter.span,
            ));
            return;
        };

        self.flush_text(delimiter.span.start);

        // Blocks opened inside the one being closed end where the closer starts.
        while self.stack.len() > index + 1 {
            self.close_implicitly(delimiter.span.start);
        }

        if let Some(mut block) = self.stack.pop() {
            block.span.end = delimiter.span.end;
            self.attach(block);
        }
        self.text_start = delimiter.span.end;
    }

    fn finish(&mut self) {
        let end = self.input.len();
        self.flush_text(end);
        while !self.stack.is_empty() {
            self.close_implicitly(end);
        }
    }

    /// Pop the innermost open block, ending it at `end`.
    fn close_implicitly(&mut self, end: usize) {
        let Some(mut block) = self.stack.pop() else {
            return;
        };
        let name = block.block_name.clone().unwrap_or_default();
        tracing::debug!(name = %name, start = block.span.start, end, "closing block implicitly");
        self.diagnostics.push(Diagnostic::warning(
            DiagnosticCode::UnclosedBlock,
            format!("block `{name}` is never closed"),
            Span::new(block.span.start, end),
        ));
        block.span.end = end;
        self.attach(block);
    }

    fn attach(&mut self, block: BlockNode) {
        match self.stack.last_mut() {
            Some(parent) => parent.push_inner_block(block),
            None => self.output.push(block),
        }
    }

    /// Assign the pending text run ending at `end` to the current context.
    fn flush_text(&mut self, end: usize) {
        if end <= self.text_start {
            return;
        }
        let span = Span::new(self.text_start, end);
        let text = &self.input[span.range()];
        match self.stack.last_mut() {
            Some(parent) => parent.push_html(text),
            None => self.output.push(BlockNode::freeform(text, span)),
        }
        self.text_start = end;
    }

    fn check_depth(&self, delimiter: &Delimiter<'_>) -> Result<(), ParseError> {
        if self.stack.len() >= self.options.max_depth {
            return Err(ParseError::NestingTooDeep {
                limit: self.options.max_depth,
                offset: delimiter.span.start,
            });
        }
        Ok(())
    }

    fn decode_attrs(&mut self, delimiter: &Delimiter<'_>) -> Attrs {
        let Some(raw) = delimiter.raw_attrs else {
            return Attrs::new();
        };
        let problem = match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(raw) {
            Ok(map) => {
                return map
                    .into_iter()
                    .map(|(key, value)| (key, AttrValue::from(value)))
                    .collect();
            }
            Err(err) => format!("attribute payload is not a JSON object: {err}"),
        };
        tracing::debug!(name = %delimiter.name, start = delimiter.span.start, "{problem}");
        self.diagnostics.push(Diagnostic::warning(
            DiagnosticCode::MalformedAttrs,
            format!("`{}`: {problem}", delimiter.name),
            delimiter.span,
        ));
        Attrs::new()
    }
}
