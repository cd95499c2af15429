//! Markup tokenizer for lattice documents.
//!
//! Lattice documents use a small subset of XML: elements with quoted
//! attributes, comments, processing instructions, `<!DOCTYPE ...>`
//! declarations and CDATA sections. The tokenizer turns source text into a
//! flat stream of [`PositionedMarkup`] items; nesting is checked afterwards by
//! the [`document`](crate::document) builder.
//!
//! Tokenizing is error-recovering: after a failure the tokenizer skips to the
//! next `<` and continues, so a single pass reports every malformed tag.

use winnow::{
    Parser as _,
    ascii::multispace0,
    combinator::{alt, cut_err, preceded, terminated},
    error::{ContextError, ErrMode},
    stream::Stream,
    token::{one_of, take_till, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::{Span, Spanned},
};

/// Rich diagnostic information for markup errors.
///
/// Attached to winnow errors via `.context()`. The error span runs from the
/// start of the construct to the position where reading failed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct MarkupDiagnostic {
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    /// Remaining input length (`eof_offset()`) where the construct started.
    start_remaining: usize,
}

type Input<'a> = &'a str;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<MarkupDiagnostic>>>;

/// An attribute as written in the source, before entity decoding.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawAttribute<'a> {
    pub name: Spanned<&'a str>,
    /// The value between the quotes.
    pub value: Spanned<&'a str>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Markup<'a> {
    /// `<name attr="value" ...>` or `<name ... />`
    Open {
        name: &'a str,
        attributes: Vec<RawAttribute<'a>>,
        self_closing: bool,
    },
    /// `</name>`
    Close { name: &'a str },
    /// Character data between tags, including CDATA sections.
    Text(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct PositionedMarkup<'a> {
    pub markup: Markup<'a>,
    pub span: Span,
}

fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == ':'
}

fn is_name_char(c: char) -> bool {
    is_name_start(c) || c.is_alphanumeric() || c == '-' || c == '.'
}

fn diagnostic(
    code: ErrorCode,
    message: &'static str,
    help: Option<&'static str>,
    start_remaining: usize,
) -> MarkupDiagnostic {
    MarkupDiagnostic {
        code,
        message,
        help,
        start_remaining,
    }
}

fn cut_error(context: MarkupDiagnostic) -> ErrMode<ContextError<MarkupDiagnostic>> {
    let mut e = ContextError::new();
    e.push(context);
    ErrMode::Cut(e)
}

/// Parse an element or attribute name.
fn name<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    (one_of(is_name_start), take_while(0.., is_name_char))
        .take()
        .parse_next(input)
}

/// Parse `<!-- ... -->`.
fn comment<'a>(input: &mut Input<'a>) -> IResult<Option<Markup<'a>>> {
    let start = input.eof_offset();
    preceded(
        "<!--",
        cut_err(terminated(take_until(0.., "-->"), "-->")).context(diagnostic(
            ErrorCode::E001,
            "unterminated comment",
            Some("close the comment with `-->`"),
            start,
        )),
    )
    .value(None)
    .parse_next(input)
}

/// Parse `<![CDATA[ ... ]]>` as text.
fn cdata<'a>(input: &mut Input<'a>) -> IResult<Option<Markup<'a>>> {
    let start = input.eof_offset();
    preceded(
        "<![CDATA[",
        cut_err(terminated(take_until(0.., "]]>"), "]]>")).context(diagnostic(
            ErrorCode::E001,
            "unterminated CDATA section",
            Some("close the section with `]]>`"),
            start,
        )),
    )
    .map(|text| Some(Markup::Text(text)))
    .parse_next(input)
}

/// Parse `<?xml ... ?>` processing instructions.
fn processing_instruction<'a>(input: &mut Input<'a>) -> IResult<Option<Markup<'a>>> {
    let start = input.eof_offset();
    preceded(
        "<?",
        cut_err(terminated(take_until(0.., "?>"), "?>")).context(diagnostic(
            ErrorCode::E001,
            "unterminated processing instruction",
            Some("close the instruction with `?>`"),
            start,
        )),
    )
    .value(None)
    .parse_next(input)
}

/// Parse `<!DOCTYPE ...>` and similar declarations.
fn declaration<'a>(input: &mut Input<'a>) -> IResult<Option<Markup<'a>>> {
    let start = input.eof_offset();
    preceded(
        "<!",
        cut_err(terminated(take_till(0.., '>'), '>')).context(diagnostic(
            ErrorCode::E001,
            "unterminated declaration",
            Some("close the declaration with `>`"),
            start,
        )),
    )
    .value(None)
    .parse_next(input)
}

/// Parse a quoted attribute value, returning the text between the quotes.
fn attribute_value<'a>(input: &mut Input<'a>, source_len: usize) -> IResult<Spanned<&'a str>> {
    let start = input.eof_offset();
    let quote = one_of(['"', '\'']).parse_next(input)?;

    let value_start = source_len - input.eof_offset();
    let value = cut_err(terminated(take_till(0.., [quote, '<']), quote))
        .context(diagnostic(
            ErrorCode::E003,
            "unterminated attribute value",
            Some("close the value with a matching quote"),
            start,
        ))
        .parse_next(input)?;

    let span = Span::new(value_start..value_start + value.len());
    Ok(Spanned::new(value, span))
}

/// Parse `name = "value"`.
fn attribute<'a>(input: &mut Input<'a>, source_len: usize) -> IResult<RawAttribute<'a>> {
    let start = input.eof_offset();
    let name_start = source_len - start;
    let attr_name = name(input)?;
    let name_span = Span::new(name_start..name_start + attr_name.len());

    let value = cut_err(preceded((multispace0, '=', multispace0), |i: &mut Input<'a>| {
        attribute_value(i, source_len)
    }))
    .context(diagnostic(
        ErrorCode::E002,
        "expected `=\"value\"` after attribute name",
        Some("write attributes as `name=\"value\"`"),
        start,
    ))
    .parse_next(input)?;

    Ok(RawAttribute {
        name: Spanned::new(attr_name, name_span),
        value,
    })
}

/// Parse an opening or self-closing tag.
fn open_tag<'a>(input: &mut Input<'a>, source_len: usize) -> IResult<Option<Markup<'a>>> {
    let start = input.eof_offset();
    '<'.parse_next(input)?;
    let tag_name = name(input)?;

    let mut attributes = Vec::new();
    loop {
        let had_space = !multispace0.parse_next(input)?.is_empty();

        if input.starts_with("/>") {
            "/>".parse_next(input)?;
            return Ok(Some(Markup::Open {
                name: tag_name,
                attributes,
                self_closing: true,
            }));
        }
        if input.starts_with('>') {
            '>'.parse_next(input)?;
            return Ok(Some(Markup::Open {
                name: tag_name,
                attributes,
                self_closing: false,
            }));
        }
        if input.is_empty() {
            return Err(cut_error(diagnostic(
                ErrorCode::E002,
                "unexpected end of document inside a tag",
                Some("close the tag with `>`"),
                start,
            )));
        }
        if !had_space || !input.starts_with(is_name_start) {
            let here = input.eof_offset();
            return Err(cut_error(diagnostic(
                ErrorCode::E002,
                "unexpected character in tag",
                Some("separate attributes with whitespace"),
                here,
            )));
        }

        attributes.push(attribute(input, source_len)?);
    }
}

/// Parse `</name>`.
fn close_tag<'a>(input: &mut Input<'a>) -> IResult<Option<Markup<'a>>> {
    let start = input.eof_offset();
    preceded(
        "</",
        cut_err(terminated(name, (multispace0, '>'))).context(diagnostic(
            ErrorCode::E002,
            "malformed closing tag",
            Some("write closing tags as `</name>`"),
            start,
        )),
    )
    .map(|tag_name| Some(Markup::Close { name: tag_name }))
    .parse_next(input)
}

/// Parse character data up to the next tag.
fn text<'a>(input: &mut Input<'a>) -> IResult<Option<Markup<'a>>> {
    take_till(1.., '<')
        .map(|text| Some(Markup::Text(text)))
        .parse_next(input)
}

/// Parse a single markup item with position tracking.
///
/// Returns `None` for items that carry no content (comments, declarations).
fn positioned_markup<'a>(
    input: &mut Input<'a>,
    source_len: usize,
) -> IResult<Option<PositionedMarkup<'a>>> {
    let start_pos = source_len - input.eof_offset();

    let markup = alt((
        comment,                // Must come before declaration
        cdata,                  // Must come before declaration
        declaration,            // Must come before open tag
        processing_instruction, // Must come before open tag
        close_tag,              // Must come before open tag
        |i: &mut Input<'a>| open_tag(i, source_len),
        text,
    ))
    .parse_next(input)?;

    let end_pos = source_len - input.eof_offset();
    Ok(markup.map(|markup| PositionedMarkup {
        markup,
        span: Span::new(start_pos..end_pos),
    }))
}

/// Tokenizer that accumulates markup items and diagnostics.
struct Tokenizer<'a> {
    source: &'a str,
    items: Vec<PositionedMarkup<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Tokenizer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            items: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    fn offset(&self, input: &Input<'a>) -> usize {
        self.source.len() - input.eof_offset()
    }

    fn tokenize(&mut self) {
        let mut input: Input<'a> = self.source;
        let source_len = self.source.len();

        while !input.is_empty() {
            let item_start = self.offset(&input);
            match positioned_markup(&mut input, source_len) {
                Ok(Some(item)) => self.items.push(item),
                Ok(None) => {}
                Err(e) => {
                    let error_pos = self.offset(&input).max(item_start);
                    let diagnostic = self.convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    // Resume at the next tag after the failure point.
                    let resume = if error_pos > item_start {
                        error_pos
                    } else {
                        item_start + self.source[item_start..].chars().next().map_or(1, char::len_utf8)
                    };
                    let skip = self.source[resume..].find('<').unwrap_or(source_len - resume);
                    input = &self.source[resume + skip..];
                }
            }
        }
    }

    fn finish(self) -> Result<Vec<PositionedMarkup<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.items)
    }

    /// Convert an ErrMode into a Diagnostic.
    ///
    /// Uses the first `MarkupDiagnostic` context when present and falls back
    /// to E002 (unexpected character) otherwise.
    fn convert_err_mode(
        &self,
        err: ErrMode<ContextError<MarkupDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(MarkupDiagnostic {
            code,
            message,
            help,
            start_remaining,
        }) = context_error.context().next()
        {
            let start = self.source.len() - start_remaining;
            let end = error_pos.max(start + 1).min(self.source.len().max(start));
            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(Span::new(start..end), code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Split a lattice document into markup items, collecting every error.
pub(crate) fn tokenize(source: &str) -> Result<Vec<PositionedMarkup<'_>>, ParseError> {
    let mut tokenizer = Tokenizer::new(source);
    tokenizer.tokenize();
    tokenizer.finish()
}

/// Decode entity and character references in attribute text.
///
/// `span` is the source span of `raw`, used to locate a bad reference.
pub(crate) fn unescape(raw: &str, span: Span) -> Result<String, Diagnostic> {
    if !raw.contains('&') {
        return Ok(raw.to_string());
    }

    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let ref_start = span.start() + (raw.len() - rest.len()) + amp;

        let decoded = after.find(';').and_then(|semi| {
            let entity = &after[..semi];
            let ch = match entity {
                "lt" => Some('<'),
                "gt" => Some('>'),
                "amp" => Some('&'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => entity
                    .strip_prefix("#x")
                    .or_else(|| entity.strip_prefix("#X"))
                    .map(|hex| u32::from_str_radix(hex, 16))
                    .or_else(|| entity.strip_prefix('#').map(str::parse::<u32>))
                    .and_then(|code| code.ok())
                    .and_then(char::from_u32),
            };
            ch.map(|ch| (ch, semi))
        });

        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                let len = after.find(';').map_or(1, |semi| semi + 2);
                return Err(Diagnostic::error("invalid entity reference")
                    .with_code(ErrorCode::E004)
                    .with_label(
                        Span::new(ref_start..ref_start + len),
                        ErrorCode::E004.description(),
                    )
                    .with_help("write a literal `&` as `&amp;`"));
            }
        }
    }
    out.push_str(rest);
    Ok(out)
}
