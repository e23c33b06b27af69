//! LuaCATS tag lexer — one comment block in, ordered tags out.
//!
//! Lines arrive with their indentation and comment prefix still attached.
//! Tag payloads are parsed per kind; a known tag whose payload does not
//! parse is kept as an unknown tag so nothing is silently dropped.

use crate::model::AliasVariant;
use crate::types::{generic_names, is_identifier, parse_fun, split_comment, split_type};
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

static RE_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@([A-Za-z_][A-Za-z0-9_.-]*)\s*(.*)$").unwrap());

static RE_MODIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\(\s*([A-Za-z_]+)\s*\)\s*(.*)$").unwrap());

static RE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\s*(.*)$").unwrap());

// Name<T, K> on @class
static RE_CLASS_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)(?:\s*<([^<>]*)>)?\s*(.*)$").unwrap()
});

static RE_PARAM_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*|\.\.\.)(\?)?\s*(.*)$").unwrap());

static RE_FIELD_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*|\[[^\]]+\])(\?)?\s*(.*)$").unwrap()
});

static RE_PARENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^:\s*([A-Za-z_][A-Za-z0-9_.]*(?:\s*,\s*[A-Za-z_][A-Za-z0-9_.]*)*)\s*(.*)$")
        .unwrap()
});

const VISIBILITY: &[&str] = &["private", "protected", "public", "package"];

// -- Types --------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagKind {
    Meta,
    Class,
    Field,
    Param,
    Return,
    Type,
    Alias,
    Enum,
    Nodiscard,
    Vararg,
    Generic,
    Overload,
    Deprecated,
    See,
    Async,
    Unknown,
}

impl TagKind {
    /// Kind named by a tag word, `None` for words we do not recognise.
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "meta" => TagKind::Meta,
            "class" => TagKind::Class,
            "field" => TagKind::Field,
            "param" => TagKind::Param,
            "return" => TagKind::Return,
            "type" => TagKind::Type,
            "alias" => TagKind::Alias,
            "enum" => TagKind::Enum,
            "nodiscard" => TagKind::Nodiscard,
            "vararg" => TagKind::Vararg,
            "generic" => TagKind::Generic,
            "overload" => TagKind::Overload,
            "deprecated" => TagKind::Deprecated,
            "see" => TagKind::See,
            "async" => TagKind::Async,
            _ => return None,
        })
    }

    /// Tags that describe a function signature.
    pub fn is_signature(&self) -> bool {
        matches!(
            self,
            TagKind::Param
                | TagKind::Return
                | TagKind::Vararg
                | TagKind::Overload
                | TagKind::Generic
                | TagKind::Nodiscard
        )
    }
}

/// Where a tag sits: block index in the file, line offset within the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Position {
    pub block: usize,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub kind: TagKind,
    /// Literal word after `@`
    pub word: String,
    /// Payload text after the word
    pub raw: String,
    pub name: Option<String>,
    pub ty: Option<String>,
    pub optional: bool,
    /// Field visibility, `exact` on classes, key name on enums
    pub modifier: Option<String>,
    pub description: Option<String>,
    pub variants: Vec<AliasVariant>,
    /// Type parameters of a generic class
    pub generics: Vec<String>,
    pub position: Position,
}

impl Tag {
    fn new(kind: TagKind, word: &str, raw: &str, position: Position) -> Self {
        Self {
            kind,
            word: word.to_string(),
            raw: raw.to_string(),
            name: None,
            ty: None,
            optional: false,
            modifier: None,
            description: None,
            variants: Vec::new(),
            generics: Vec::new(),
            position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CommentBlock {
    /// Block index within its file
    pub index: usize,
    /// 1-based line of the first comment line
    pub line: usize,
    pub description: Option<String>,
    pub tags: Vec<Tag>,
}

impl CommentBlock {
    /// Block for a declaration that carries no comment.
    pub fn empty(index: usize, line: usize) -> Self {
        Self {
            index,
            line,
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty() && self.description.is_none()
    }

    pub fn has(&self, kind: TagKind) -> bool {
        self.tags.iter().any(|t| t.kind == kind)
    }

    pub fn find(&self, kind: TagKind) -> Option<&Tag> {
        self.tags.iter().find(|t| t.kind == kind)
    }

    /// Whether every tag in the block describes a function signature.
    pub fn is_signature_only(&self) -> bool {
        !self.tags.is_empty() && self.tags.iter().all(|t| t.kind.is_signature())
    }

    /// Aliases and `@meta` document no code, so the line below them is
    /// scanned as a declaration of its own.
    pub fn takes_declaration(&self) -> bool {
        !(self.has(TagKind::Alias) || self.has(TagKind::Meta))
            || self.has(TagKind::Class)
            || self.has(TagKind::Enum)
    }

    /// Prepend an earlier block, rebasing this block's tag offsets.
    pub fn absorb(&mut self, earlier: CommentBlock) {
        let shift = self.line.saturating_sub(earlier.line);
        for tag in &mut self.tags {
            tag.position.line += shift;
        }
        let mut tags = earlier.tags;
        tags.append(&mut self.tags);
        self.tags = tags;
        self.description = join_paragraphs(earlier.description, self.description.take());
        self.line = earlier.line;
    }

    /// Absolute 1-based source line of a tag in this block.
    pub fn tag_line(&self, tag: &Tag) -> usize {
        self.line + tag.position.line
    }
}

/// Join two optional paragraphs with a blank line.
pub fn join_paragraphs(a: Option<String>, b: Option<String>) -> Option<String> {
    match (a, b) {
        (Some(a), Some(b)) => Some(format!("{}\n\n{}", a, b)),
        (a, b) => a.or(b),
    }
}

// -- Text accumulation --------------------------------------------------------

/// Continuation text: lines join with a space, two trailing spaces force
/// a newline, blank lines separate paragraphs.
#[derive(Debug, Default)]
struct Text {
    buf: String,
    hard_break: bool,
    paragraph: bool,
}

impl Text {
    fn push(&mut self, line: &str) {
        let content = line.trim_end();
        if content.is_empty() {
            self.paragraph = !self.buf.is_empty();
            return;
        }
        if !self.buf.is_empty() {
            if self.paragraph {
                self.buf.push_str("\n\n");
            } else if self.hard_break {
                self.buf.push('\n');
            } else {
                self.buf.push(' ');
            }
        }
        self.buf.push_str(content.trim_start());
        self.hard_break = line.ends_with("  ");
        if self.hard_break {
            self.buf.push_str("  ");
        }
        self.paragraph = false;
    }

    fn finish(self) -> Option<String> {
        let text = self.buf.trim_end();
        (!text.is_empty()).then(|| text.to_string())
    }
}

// -- Lexer --------------------------------------------------------------------

/// Strip indentation and the comment prefix from a doc line.
fn strip_prefix<'a>(line: &'a str, prefix: &str) -> &'a str {
    let line = line.trim_start();
    line.strip_prefix(prefix).unwrap_or(line)
}

/// Lex one comment block.
///
/// `first_line` is the 1-based line of `lines[0]`.
pub fn lex_block(index: usize, first_line: usize, lines: &[&str], prefix: &str) -> CommentBlock {
    let mut description = Text::default();
    let mut tags: Vec<Tag> = Vec::new();
    // Continuation of the last tag, closed by a blank line
    let mut continuation: Option<Text> = None;

    let close = |tags: &mut Vec<Tag>, text: Option<Text>| {
        if let (Some(tag), Some(text)) = (tags.last_mut(), text) {
            tag.description = text.finish();
        }
    };

    for (offset, raw_line) in lines.iter().enumerate() {
        let body = strip_prefix(raw_line, prefix);
        let trimmed = body.trim_start();

        if let Some(variant) = trimmed.strip_prefix('|') {
            if let Some(tag) = tags.last_mut().filter(|t| t.kind == TagKind::Alias) {
                tag.variants.push(parse_variant(variant));
                continue;
            }
        }

        if trimmed.starts_with('@') {
            close(&mut tags, continuation.take());
            let position = Position { block: index, line: offset };
            if let Some(mut tag) = lex_tag(trimmed.trim_end(), position) {
                // The payload's own description starts the continuation
                let mut text = Text::default();
                if let Some(first) = tag.description.take() {
                    let hard_break = if body.ends_with("  ") { "  " } else { "" };
                    text.push(&format!("{}{}", first, hard_break));
                }
                tags.push(tag);
                continuation = Some(text);
                continue;
            }
        }

        if trimmed.is_empty() {
            if continuation.is_some() {
                close(&mut tags, continuation.take());
            } else {
                description.push("");
            }
            continue;
        }

        match continuation.as_mut() {
            Some(text) => text.push(body),
            None => description.push(body),
        }
    }
    close(&mut tags, continuation.take());

    CommentBlock {
        index,
        line: first_line,
        description: description.finish(),
        tags,
    }
}

/// `---| "value" # description` (also `|+` and `|>`).
fn parse_variant(text: &str) -> AliasVariant {
    let text = text.trim_start_matches(['+', '>']).trim();
    let (value, description) = split_comment(text);
    AliasVariant {
        value: value.trim().to_string(),
        description: description.map(str::to_string),
    }
}

/// Parse one `@word payload` line. Returns `None` when the line is not a
/// tag at all (`@` followed by a non-identifier).
fn lex_tag(line: &str, position: Position) -> Option<Tag> {
    let caps = RE_TAG.captures(line)?;
    let word = caps.get(1)?.as_str();
    let raw = caps.get(2).map_or("", |m| m.as_str()).trim();

    let parsed = TagKind::from_word(word).and_then(|kind| {
        let mut tag = Tag::new(kind, word, raw, position);
        parse_payload(&mut tag, raw).map(|()| tag)
    });

    Some(parsed.unwrap_or_else(|| Tag::new(TagKind::Unknown, word, raw, position)))
}

/// Description remainder: optional leading `#`, trimmed, `None` if empty.
fn rest_description(rest: &str) -> Option<String> {
    let rest = rest.trim();
    let rest = rest.strip_prefix('#').unwrap_or(rest).trim();
    (!rest.is_empty()).then(|| rest.to_string())
}

/// Fill in the parsed sub-fields. `None` means the payload is malformed.
fn parse_payload(tag: &mut Tag, raw: &str) -> Option<()> {
    match tag.kind {
        TagKind::Meta => {
            tag.name = raw.split_whitespace().next().map(str::to_string);
        }
        TagKind::Class => {
            let rest = take_modifier(tag, raw);
            let caps = RE_CLASS_NAME.captures(rest)?;
            tag.name = Some(caps[1].to_string());
            if let Some(params) = caps.get(2) {
                tag.generics = generic_names(params.as_str());
                if tag.generics.is_empty() {
                    return None;
                }
            }
            let mut rest = caps.get(3).map_or("", |m| m.as_str());
            if rest.starts_with('<') {
                return None;
            }
            if let Some(parents) = RE_PARENTS.captures(rest) {
                tag.ty = Some(parents[1].to_string());
                rest = parents.get(2).map_or("", |m| m.as_str());
            } else if rest.starts_with(':') {
                return None;
            }
            tag.description = rest_description(rest);
        }
        TagKind::Field => {
            let mut rest = raw;
            if let Some(word) = rest.split_whitespace().next() {
                if VISIBILITY.contains(&word) {
                    tag.modifier = Some(word.to_string());
                    rest = rest[word.len()..].trim_start();
                }
            }
            let caps = RE_FIELD_NAME.captures(rest)?;
            tag.name = Some(caps[1].to_string());
            tag.optional = caps.get(2).is_some();
            let (ty, rest) = split_type(caps.get(3).map_or("", |m| m.as_str()))?;
            tag.ty = Some(ty);
            tag.description = rest_description(rest);
        }
        TagKind::Param => {
            let caps = RE_PARAM_NAME.captures(raw)?;
            tag.name = Some(caps[1].to_string());
            tag.optional = caps.get(2).is_some();
            let (ty, rest) = split_type(caps.get(3).map_or("", |m| m.as_str()))?;
            tag.ty = Some(ty);
            tag.description = rest_description(rest);
        }
        TagKind::Return => {
            let (ty, rest) = split_type(raw)?;
            tag.ty = Some(ty);
            let mut words = rest.splitn(2, char::is_whitespace);
            let first = words.next().unwrap_or_default();
            let after = words.next().unwrap_or_default().trim_start();
            if is_identifier(first) && (after.is_empty() || after.starts_with('#')) {
                tag.name = Some(first.to_string());
                tag.description = rest_description(after);
            } else {
                tag.description = rest_description(rest);
            }
        }
        TagKind::Type => {
            let (ty, rest) = split_type(raw)?;
            tag.ty = Some(ty);
            tag.description = rest_description(rest);
        }
        TagKind::Vararg => {
            let (ty, rest) = split_type(raw)?;
            tag.name = Some("...".to_string());
            tag.ty = Some(ty);
            tag.description = rest_description(rest);
        }
        TagKind::Alias => {
            let caps = RE_NAME.captures(raw)?;
            tag.name = Some(caps[1].to_string());
            let rest = caps.get(2).map_or("", |m| m.as_str());
            let rest = match split_type(rest) {
                Some((ty, rest)) => {
                    tag.ty = Some(ty);
                    rest
                }
                None if rest.trim().is_empty() || rest.trim_start().starts_with('#') => rest,
                None => return None,
            };
            tag.description = rest_description(rest);
        }
        TagKind::Enum => {
            let rest = take_modifier(tag, raw);
            let caps = RE_NAME.captures(rest)?;
            tag.name = Some(caps[1].to_string());
            tag.description = rest_description(caps.get(2).map_or("", |m| m.as_str()));
        }
        TagKind::Generic => {
            if raw.is_empty() {
                return None;
            }
            let (names, rest) = split_comment(raw);
            tag.ty = Some(names.to_string());
            tag.description = rest.map(str::to_string);
        }
        TagKind::Overload => {
            let (ty, rest) = split_type(raw)?;
            parse_fun(&ty)?;
            tag.ty = Some(ty);
            tag.description = rest_description(rest);
        }
        TagKind::See => {
            if raw.is_empty() {
                return None;
            }
            tag.description = Some(raw.to_string());
        }
        TagKind::Nodiscard | TagKind::Deprecated | TagKind::Async => {
            tag.description = rest_description(raw);
        }
        TagKind::Unknown => return None,
    }
    Some(())
}

/// Strip a leading `(word)` modifier into `tag.modifier`.
fn take_modifier<'a>(tag: &mut Tag, raw: &'a str) -> &'a str {
    match RE_MODIFIER.captures(raw) {
        Some(caps) => {
            tag.modifier = Some(caps[1].to_string());
            caps.get(2).map_or("", |m| m.as_str())
        }
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(lines: &[&str]) -> CommentBlock {
        lex_block(0, 1, lines, "---")
    }

    #[test]
    fn description_then_tags() {
        let block = lex(&[
            "--- Shows a message box.",
            "--- Blocks until closed.",
            "---@param message string The text to show",
            "---@return boolean ok",
        ]);
        assert_eq!(
            block.description.as_deref(),
            Some("Shows a message box. Blocks until closed.")
        );
        assert_eq!(block.tags.len(), 2);
        let param = &block.tags[0];
        assert_eq!(param.kind, TagKind::Param);
        assert_eq!(param.name.as_deref(), Some("message"));
        assert_eq!(param.ty.as_deref(), Some("string"));
        assert!(!param.optional);
        assert_eq!(param.description.as_deref(), Some("The text to show"));
        let ret = &block.tags[1];
        assert_eq!(ret.ty.as_deref(), Some("boolean"));
        assert_eq!(ret.name.as_deref(), Some("ok"));
        assert_eq!(ret.position, Position { block: 0, line: 3 });
    }

    #[test]
    fn optional_only_from_question_mark() {
        let block = lex(&["---@param index? integer", "---@param name string|nil"]);
        assert!(block.tags[0].optional);
        assert_eq!(block.tags[0].name.as_deref(), Some("index"));
        assert!(!block.tags[1].optional);
        assert_eq!(block.tags[1].ty.as_deref(), Some("string|nil"));
    }

    #[test]
    fn return_name_needs_end_or_comment() {
        let block = lex(&[
            "---@return integer count # number of items",
            "---@return string The name of it",
        ]);
        assert_eq!(block.tags[0].name.as_deref(), Some("count"));
        assert_eq!(block.tags[0].description.as_deref(), Some("number of items"));
        assert_eq!(block.tags[1].name, None);
        assert_eq!(block.tags[1].description.as_deref(), Some("The name of it"));
    }

    #[test]
    fn continuation_and_hard_break() {
        let block = lex(&[
            "---@field volume number The track volume",
            "--- in linear scale.  ",
            "--- Range 0 to 4.",
            "---",
            "--- Trailing block text.",
        ]);
        assert_eq!(
            block.tags[0].description.as_deref(),
            Some("The track volume in linear scale.  \nRange 0 to 4.")
        );
        assert_eq!(block.description.as_deref(), Some("Trailing block text."));
    }

    #[test]
    fn field_visibility_and_key() {
        let block = lex(&[
            "---@field private cache table<string, integer>",
            "---@field [integer] renoise.Track",
        ]);
        assert_eq!(block.tags[0].modifier.as_deref(), Some("private"));
        assert_eq!(block.tags[0].name.as_deref(), Some("cache"));
        assert_eq!(block.tags[0].ty.as_deref(), Some("table<string, integer>"));
        assert_eq!(block.tags[1].name.as_deref(), Some("[integer]"));
        assert_eq!(block.tags[1].ty.as_deref(), Some("renoise.Track"));
    }

    #[test]
    fn class_with_parents() {
        let block = lex(&["---@class (exact) renoise.Song : renoise.Document, Observable"]);
        let tag = &block.tags[0];
        assert_eq!(tag.name.as_deref(), Some("renoise.Song"));
        assert_eq!(tag.modifier.as_deref(), Some("exact"));
        assert_eq!(tag.ty.as_deref(), Some("renoise.Document, Observable"));
    }

    #[test]
    fn generic_class_parameters() {
        let block = lex(&["---@class Map<K, V> : Container # Keyed storage"]);
        let tag = &block.tags[0];
        assert_eq!(tag.kind, TagKind::Class);
        assert_eq!(tag.name.as_deref(), Some("Map"));
        assert_eq!(tag.generics, vec!["K", "V"]);
        assert_eq!(tag.ty.as_deref(), Some("Container"));
        assert_eq!(tag.description.as_deref(), Some("Keyed storage"));

        let block = lex(&["---@class List<T>", "---@class Broken<T"]);
        assert_eq!(block.tags[0].name.as_deref(), Some("List"));
        assert_eq!(block.tags[0].description, None);
        assert_eq!(block.tags[1].kind, TagKind::Unknown);
    }

    #[test]
    fn alias_variants() {
        let block = lex(&[
            "---@alias Mode",
            "---| \"stereo\" # Two channels",
            "---| \"mono\"",
        ]);
        let tag = &block.tags[0];
        assert_eq!(tag.name.as_deref(), Some("Mode"));
        assert_eq!(tag.ty, None);
        assert_eq!(tag.variants.len(), 2);
        assert_eq!(tag.variants[0].value, "\"stereo\"");
        assert_eq!(tag.variants[0].description.as_deref(), Some("Two channels"));
        assert_eq!(tag.variants[1].description, None);
    }

    #[test]
    fn malformed_and_unknown_tags_are_kept() {
        let block = lex(&[
            "---@param",
            "---@overload string",
            "---@frobnicate all the things",
            "---@param ok boolean",
        ]);
        let kinds: Vec<_> = block.tags.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![TagKind::Unknown, TagKind::Unknown, TagKind::Unknown, TagKind::Param]
        );
        assert_eq!(block.tags[0].word, "param");
        assert_eq!(block.tags[2].word, "frobnicate");
        assert_eq!(block.tags[2].raw, "all the things");
    }

    #[test]
    fn overload_keeps_signature() {
        let block = lex(&["---@overload fun(name: string): renoise.Track"]);
        assert_eq!(block.tags[0].kind, TagKind::Overload);
        assert_eq!(block.tags[0].ty.as_deref(), Some("fun(name: string): renoise.Track"));
    }

    #[test]
    fn absorb_rebases_positions() {
        let earlier = lex_block(0, 10, &["---@param a integer"], "---");
        let mut later = lex_block(1, 12, &["--- Adds.", "---@param b integer"], "---");
        assert!(earlier.is_signature_only());
        later.absorb(earlier);
        assert_eq!(later.line, 10);
        assert_eq!(later.tags.len(), 2);
        assert_eq!(later.tag_line(&later.tags[0]), 10);
        assert_eq!(later.tag_line(&later.tags[1]), 13);
        assert_eq!(later.description.as_deref(), Some("Adds."));
    }
}
