//! Lua declaration scanner — comment blocks and the code that follows them.
//!
//! This is not a Lua parser. It recognises the handful of declaration
//! shapes that definition files use (tables, functions, assignments) and
//! reads table literals far enough to list their entries.

use super::tags::{lex_block, CommentBlock, TagKind};
use super::Item;
use regex::Regex;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

// function a.b.c(x, y) / function a.b:c(x) / local function f()
static RE_FUNCTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(local\s+)?function\s+([A-Za-z_][A-Za-z0-9_.]*)(?::([A-Za-z_][A-Za-z0-9_]*))?\s*\(([^)]*)\)")
        .unwrap()
});

// a.b = function(x, y)
static RE_FUNCTION_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(local\s+)?([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*function\s*\(([^)]*)\)").unwrap()
});

// a.b = { ...
static RE_TABLE_ASSIGN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(local\s+)?([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*\{").unwrap()
});

static RE_LOCAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^local\s+([A-Za-z_][A-Za-z0-9_]*)(?:\s*<\s*[a-z]+\s*>)?\s*(?:=\s*(.*))?$").unwrap()
});

static RE_ASSIGN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_.]*)\s*=\s*([^=].*)$").unwrap());

static RE_LONG_COMMENT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^--\[(=*)\[").unwrap());

// -- Types --------------------------------------------------------------------

/// One entry of a table literal.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// Key with brackets and quotes stripped; positional entries count from 1
    pub key: String,
    /// Value text as written
    pub value: String,
    /// `---` comment lines right above the entry
    pub description: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    /// `[local] a.b = { ... }`
    ModuleTable {
        path: String,
        local: bool,
        entries: Vec<TableEntry>,
    },
    /// `a.b.c = value` with a non-table value
    FieldAssignment {
        owner: String,
        name: String,
        value: String,
    },
    FunctionDef {
        owner: Option<String>,
        name: String,
        /// Declared with `:`
        method: bool,
        local: bool,
        params: Vec<String>,
    },
    LocalVar {
        name: String,
        value: Option<String>,
    },
    GlobalVar {
        name: String,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    /// 1-based line of the declaration
    pub line: usize,
    pub kind: DeclarationKind,
}

impl Declaration {
    /// Full dotted path the declaration assigns to.
    pub fn path(&self) -> String {
        match &self.kind {
            DeclarationKind::ModuleTable { path, .. } => path.clone(),
            DeclarationKind::FieldAssignment { owner, name, .. } => format!("{}.{}", owner, name),
            DeclarationKind::FunctionDef {
                owner: Some(owner),
                name,
                method,
                ..
            } => format!("{}{}{}", owner, if *method { ":" } else { "." }, name),
            DeclarationKind::FunctionDef { name, .. } => name.clone(),
            DeclarationKind::LocalVar { name, .. } | DeclarationKind::GlobalVar { name, .. } => {
                name.clone()
            }
        }
    }

    /// Whether the declaration is only visible inside its file.
    pub fn is_local(&self) -> bool {
        matches!(
            self.kind,
            DeclarationKind::ModuleTable { local: true, .. }
                | DeclarationKind::FunctionDef { local: true, .. }
                | DeclarationKind::LocalVar { .. }
        )
    }
}

// -- Scanner ------------------------------------------------------------------

fn is_doc_line(line: &str, prefix: &str) -> bool {
    let line = line.trim_start();
    match line.strip_prefix(prefix) {
        Some(rest) => !rest.starts_with('-'),
        None => false,
    }
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Split a file into comment blocks and the declarations they document.
pub fn scan(content: &str, prefix: &str) -> Vec<Item> {
    let lines: Vec<&str> = content.lines().collect();
    let mut items = Vec::new();
    let mut block_index = 0;
    // Signature-only block waiting for the block below it
    let mut stacked: Option<CommentBlock> = None;
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];

        if is_doc_line(line, prefix) {
            let start = i;
            while i < lines.len() && is_doc_line(lines[i], prefix) {
                i += 1;
            }
            let mut block = lex_block(block_index, start + 1, &lines[start..i], prefix);
            block_index += 1;
            if let Some(earlier) = stacked.take() {
                block.absorb(earlier);
            }

            let mut next = i;
            while next < lines.len() && is_blank(lines[next]) {
                next += 1;
            }

            if next < lines.len() && is_doc_line(lines[next], prefix) {
                if block.is_signature_only() {
                    stacked = Some(block);
                } else {
                    items.push(Item { block, declaration: None });
                }
                i = next;
                continue;
            }

            let paired = match lines.get(next) {
                Some(_) if block.takes_declaration() => {
                    declaration(&lines, next).filter(|(d, _)| documents(&block, d))
                }
                _ => None,
            };
            match paired {
                Some((declaration, end)) => {
                    items.push(Item {
                        block,
                        declaration: Some(declaration),
                    });
                    i = end;
                }
                None => {
                    items.push(Item { block, declaration: None });
                    i = next;
                }
            }
            continue;
        }

        if let Some(end) = long_comment_end(&lines, i) {
            i = end;
            continue;
        }

        if !line.starts_with(char::is_whitespace) {
            if let Some((declaration, end)) = declaration(&lines, i) {
                items.push(Item {
                    block: CommentBlock::empty(block_index, i + 1),
                    declaration: Some(declaration),
                });
                block_index += 1;
                i = end;
                continue;
            }
        }
        i += 1;
    }

    if let Some(block) = stacked {
        items.push(Item { block, declaration: None });
    }
    items
}

/// Class and enum blocks describe a table; a function below them is
/// scanned as a declaration of its own.
fn documents(block: &CommentBlock, declaration: &Declaration) -> bool {
    let types_table = block.has(TagKind::Class) || block.has(TagKind::Enum);
    !(types_table && matches!(declaration.kind, DeclarationKind::FunctionDef { .. }))
}

/// Index of the line after a `--[[ ... ]]` comment starting at `i`.
fn long_comment_end(lines: &[&str], i: usize) -> Option<usize> {
    let trimmed = lines[i].trim_start();
    let caps = RE_LONG_COMMENT_OPEN.captures(trimmed)?;
    let close = format!("]{}]", &caps[1]);
    let opened = caps.get(0).map_or(0, |m| m.end());
    if trimmed[opened..].contains(&close) {
        return Some(i + 1);
    }
    let rest = lines[i + 1..].iter().position(|l| l.contains(&close));
    Some(rest.map_or(lines.len(), |n| i + n + 2))
}

/// Recognise a declaration at line `i`, returning it and the index of the
/// first line after it.
fn declaration(lines: &[&str], i: usize) -> Option<(Declaration, usize)> {
    let text = lines[i].trim();
    let line = i + 1;
    let decl = |kind| Declaration { line, kind };
    let (header, header_end) = function_header(lines, i);
    let header = header.as_str();

    if let Some(caps) = RE_FUNCTION.captures(header) {
        let local = caps.get(1).is_some();
        let path = &caps[2];
        let params = split_params(&caps[4]);
        let kind = match caps.get(3) {
            Some(method) => DeclarationKind::FunctionDef {
                owner: Some(path.to_string()),
                name: method.as_str().to_string(),
                method: true,
                local,
                params,
            },
            None => {
                let (owner, name) = split_path(path);
                DeclarationKind::FunctionDef {
                    owner,
                    name,
                    method: false,
                    local,
                    params,
                }
            }
        };
        return Some((decl(kind), header_end));
    }

    if let Some(caps) = RE_FUNCTION_ASSIGN.captures(header) {
        let (owner, name) = split_path(&caps[2]);
        let kind = DeclarationKind::FunctionDef {
            owner,
            name,
            method: false,
            local: caps.get(1).is_some(),
            params: split_params(&caps[3]),
        };
        return Some((decl(kind), header_end));
    }

    if let Some(caps) = RE_TABLE_ASSIGN.captures(text) {
        let open = caps.get(0).map_or(0, |m| m.end());
        let (entries, end) = read_table(lines, i, &text[open..]);
        let kind = DeclarationKind::ModuleTable {
            path: caps[2].to_string(),
            local: caps.get(1).is_some(),
            entries,
        };
        return Some((decl(kind), end));
    }

    if let Some(caps) = RE_LOCAL.captures(text) {
        let value = caps
            .get(2)
            .map(|m| strip_comment(m.as_str()))
            .filter(|v| !v.is_empty());
        let kind = DeclarationKind::LocalVar {
            name: caps[1].to_string(),
            value,
        };
        return Some((decl(kind), i + 1));
    }

    if let Some(caps) = RE_ASSIGN.captures(text) {
        let value = strip_comment(&caps[2]);
        let kind = match split_path(&caps[1]) {
            (Some(owner), name) => DeclarationKind::FieldAssignment { owner, name, value },
            (None, name) => DeclarationKind::GlobalVar { name, value },
        };
        return Some((decl(kind), i + 1));
    }

    None
}

/// The function header at line `i` with a wrapped parameter list joined
/// onto one line, and the index of the line after it.
fn function_header(lines: &[&str], i: usize) -> (String, usize) {
    let first = strip_comment(lines[i]);
    if !first.contains("function") || paren_depth(&first) <= 0 {
        return (first, i + 1);
    }

    let mut header = first.clone();
    for (n, line) in lines.iter().enumerate().skip(i + 1) {
        header.push(' ');
        header.push_str(&strip_comment(line));
        if paren_depth(&header) <= 0 {
            return (header, n + 1);
        }
    }
    (first, i + 1)
}

fn paren_depth(text: &str) -> isize {
    text.chars().fold(0, |depth, c| match c {
        '(' => depth + 1,
        ')' => depth - 1,
        _ => depth,
    })
}

/// `a.b.c` → (`a.b`, `c`)
fn split_path(path: &str) -> (Option<String>, String) {
    match path.rsplit_once('.') {
        Some((owner, name)) => (Some(owner.to_string()), name.to_string()),
        None => (None, path.to_string()),
    }
}

fn split_params(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drop a trailing `-- comment` and `;` from a value, honouring strings.
fn strip_comment(value: &str) -> String {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev = '\0';
    for (pos, c) in value.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
        } else if c == '"' || c == '\'' {
            quote = Some(c);
        } else if c == '-' && prev == '-' {
            return clean_value(&value[..pos - 1]);
        }
        prev = c;
    }
    clean_value(value)
}

fn clean_value(value: &str) -> String {
    value.trim().trim_end_matches(';').trim_end().to_string()
}

// -- Table literals -----------------------------------------------------------

/// Accumulates one table literal's entries.
#[derive(Default)]
struct TableReader {
    entries: Vec<TableEntry>,
    current: String,
    current_line: usize,
    docs: Vec<String>,
    positional: usize,
}

impl TableReader {
    fn push_char(&mut self, c: char, line: usize) {
        if self.current.trim().is_empty() {
            if c.is_whitespace() {
                return;
            }
            self.current.clear();
            self.current_line = line;
        }
        self.current.push(c);
    }

    fn finish_entry(&mut self) {
        let text = self.current.trim().to_string();
        self.current.clear();
        if text.is_empty() {
            return;
        }

        let (key, value) = match split_key(&text) {
            Some((key, value)) => (key, value),
            None => {
                self.positional += 1;
                (self.positional.to_string(), text)
            }
        };
        let description = (!self.docs.is_empty()).then(|| self.docs.join(" "));
        self.docs.clear();
        self.entries.push(TableEntry {
            key,
            value,
            description,
            line: self.current_line,
        });
    }
}

/// Read a table literal whose body starts at `rest` on line `start`.
fn read_table(lines: &[&str], start: usize, rest: &str) -> (Vec<TableEntry>, usize) {
    let mut reader = TableReader::default();
    let mut depth = 1usize;
    let mut quote: Option<char> = None;

    for (n, full) in lines.iter().enumerate().skip(start) {
        let line_no = n + 1;
        let text = if n == start { rest } else { full };

        if n != start && depth == 1 && reader.current.trim().is_empty() {
            let trimmed = text.trim_start();
            if let Some(doc) = trimmed.strip_prefix("---") {
                if !doc.starts_with('-') {
                    let doc = doc.trim();
                    if !doc.is_empty() && !doc.starts_with('@') {
                        reader.docs.push(doc.to_string());
                    }
                    continue;
                }
            }
        }

        let mut chars = text.chars().peekable();
        let mut escaped = false;
        while let Some(c) = chars.next() {
            if let Some(q) = quote {
                reader.push_char(c, line_no);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
                continue;
            }
            match c {
                '"' | '\'' => {
                    quote = Some(c);
                    reader.push_char(c, line_no);
                }
                '-' if chars.peek() == Some(&'-') => break,
                '{' | '(' | '[' => {
                    depth += 1;
                    reader.push_char(c, line_no);
                }
                '}' | ')' | ']' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        reader.finish_entry();
                        return (reader.entries, n + 1);
                    }
                    reader.push_char(c, line_no);
                }
                ',' | ';' if depth == 1 => reader.finish_entry(),
                _ => reader.push_char(c, line_no),
            }
        }
        quote = None;
        if !reader.current.is_empty() {
            reader.current.push(' ');
        }
    }

    reader.finish_entry();
    (reader.entries, lines.len())
}

/// Split `key = value` at the first top-level `=`.
fn split_key(entry: &str) -> Option<(String, String)> {
    let bytes = entry.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    for (i, &b) in bytes.iter().enumerate() {
        if let Some(q) = quote {
            if b == q {
                quote = None;
            }
            continue;
        }
        match b {
            b'"' | b'\'' => quote = Some(b),
            b'[' | b'{' | b'(' => depth += 1,
            b']' | b'}' | b')' => depth = depth.saturating_sub(1),
            b'=' if depth == 0 => {
                let next_eq = bytes.get(i + 1) == Some(&b'=');
                let prev_op = i > 0 && matches!(bytes[i - 1], b'=' | b'~' | b'<' | b'>');
                if next_eq || prev_op {
                    return None;
                }
                let key = entry[..i].trim();
                let key = key
                    .strip_prefix('[')
                    .and_then(|k| k.strip_suffix(']'))
                    .unwrap_or(key)
                    .trim();
                let key = key.trim_matches(|c| c == '"' || c == '\'');
                return Some((key.to_string(), entry[i + 1..].trim().to_string()));
            }
            _ => {}
        }
    }
    None
}
