//! Groovy build-script reader.
//!
//! Extracts every `dependencies { ... }` block of a build script into a
//! [`ScriptTree`]. The rest of the script is only lexed, which is enough to
//! find the blocks, collect string variables, and validate string and
//! bracket structure.
//!
//! # Supported statements
//!
//! - `compile 'g:n:v'` and `compile('g:n:v')`
//! - `runtime 'a:b:1', 'c:d:2'`, one list entry per argument
//! - `compile group: 'g', name: 'n'`, one map node
//! - `runtime([group: 'g', name: 'n'], [...])`
//! - `implementation platform('g:n:v')`, nested calls
//! - `implementation libs.guava`, references
//! - `compile "g:n:$version"`, templates kept as written
//!
//! Configuration closures (`compile('g:n:v') { transitive = false }`) are
//! kept as raw source on the declaration they configure. Statements the
//! reader does not understand are skipped, so unusual scripts degrade to
//! fewer declarations rather than errors. Map statements without any
//! artifact key, such as `apply plugin: 'x'`, are skipped too.
//!
//! String variables come from `ext { name = '...' }`, `ext.name = '...'`
//! and `def name = '...'` anywhere in the script.

use std::path::Path;

use deps_core::{MapEntry, NodeId, ScriptDocument, ScriptTree, Slot};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{GradleError, Result};
use crate::resolve;
use crate::types::ArtifactField;

static IDENT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*(?:\.[A-Za-z_$][A-Za-z0-9_$]*)*").unwrap()
});
static NUMBER_PATTERN: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9][0-9A-Za-z_.]*").unwrap());

/// Statement heads that are never configuration names.
const KEYWORDS: &[&str] = &[
    "def", "if", "else", "for", "while", "return", "switch", "case", "try", "catch", "finally",
    "final", "throw", "new", "import", "var",
];

/// Parses a build script and returns the declarations of its dependency blocks.
///
/// # Errors
///
/// Returns [`GradleError::ScriptParse`] for unterminated strings or comments
/// and for unbalanced brackets anywhere in the script.
///
/// # Examples
///
/// ```
/// use deps_core::ScriptDocument;
/// use deps_gradle::parse_build_script;
///
/// let tree = parse_build_script(
///     "apply plugin: 'java'\n\
///      dependencies {\n\
///          compile 'com.google.guava:guava:18.0'\n\
///      }\n",
/// )
/// .unwrap();
///
/// let compile = tree.list("compile");
/// assert_eq!(tree.literal(compile[0]), Some("com.google.guava:guava:18.0"));
/// ```
pub fn parse_build_script(content: &str) -> Result<ScriptTree> {
    let tokens = Lexer::new(content).run()?;
    let mut tree = ScriptTree::new();
    Parser::new(&tokens, content).parse_script(&mut tree)?;

    tracing::debug!(
        configurations = tree.list_names().len(),
        nodes = tree.len(),
        "parsed build script"
    );
    Ok(tree)
}

/// Reads and parses a build script file.
pub fn load_build_script(path: impl AsRef<Path>) -> Result<ScriptTree> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading build script");
    let content = std::fs::read_to_string(path)?;
    parse_build_script(&content)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Ident(String),
    Str(String),
    /// Double-quoted string with `$` placeholders
    Template(String),
    Number(String),
    Open(char),
    Close(char),
    Comma,
    Colon,
    Semi,
    Assign,
    Newline,
    Other(char),
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    line: usize,
    /// Byte span in the source
    start: usize,
    end: usize,
}

struct Lexer<'a> {
    content: &'a str,
    pos: usize,
    line: usize,
    tokens: Vec<Token>,
    /// Open brackets with the line they were opened on
    open: Vec<(char, usize)>,
}

impl<'a> Lexer<'a> {
    fn new(content: &'a str) -> Self {
        Self {
            content,
            pos: 0,
            line: 1,
            tokens: Vec::new(),
            open: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.content[self.pos..]
    }

    fn push(&mut self, kind: TokenKind, width: usize) {
        let start = self.pos;
        self.pos += width;
        self.tokens.push(Token {
            kind,
            line: self.line,
            start,
            end: self.pos,
        });
    }

    fn run(mut self) -> Result<Vec<Token>> {
        while let Some(c) = self.rest().chars().next() {
            match c {
                '\n' => {
                    self.push(TokenKind::Newline, 1);
                    self.line += 1;
                }
                '\\' if self.rest()[1..].starts_with('\n') => {
                    self.pos += 2;
                    self.line += 1;
                }
                '/' if self.rest().starts_with("//") => {
                    let rest = self.rest();
                    self.pos += rest.find('\n').unwrap_or(rest.len());
                }
                '/' if self.rest().starts_with("/*") => self.block_comment()?,
                '\'' | '"' => self.string(c)?,
                '(' | '[' | '{' => {
                    self.open.push((c, self.line));
                    self.push(TokenKind::Open(c), 1);
                }
                ')' | ']' | '}' => self.close(c)?,
                ',' => self.push(TokenKind::Comma, 1),
                ':' => self.push(TokenKind::Colon, 1),
                ';' => self.push(TokenKind::Semi, 1),
                '=' => self.push(TokenKind::Assign, 1),
                c if c.is_whitespace() => self.pos += c.len_utf8(),
                _ => self.word(c),
            }
        }

        if let Some((bracket, line)) = self.open.last() {
            return Err(GradleError::script_parse(
                *line,
                format!("unclosed '{bracket}'"),
            ));
        }
        Ok(self.tokens)
    }

    fn close(&mut self, c: char) -> Result<()> {
        let expected = match c {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.open.pop() {
            Some((open, _)) if open == expected => {
                self.push(TokenKind::Close(c), 1);
                Ok(())
            }
            Some((open, line)) => Err(GradleError::script_parse(
                self.line,
                format!("unexpected '{c}', '{open}' from line {line} is still open"),
            )),
            None => Err(GradleError::script_parse(
                self.line,
                format!("unexpected '{c}'"),
            )),
        }
    }

    fn block_comment(&mut self) -> Result<()> {
        let rest = self.rest();
        let end = rest[2..]
            .find("*/")
            .ok_or_else(|| GradleError::script_parse(self.line, "unterminated block comment"))?;
        let comment = &rest[..end + 4];
        self.line += comment.matches('\n').count();
        self.pos += comment.len();
        Ok(())
    }

    fn string(&mut self, quote: char) -> Result<()> {
        let rest = self.rest();
        let start_line = self.line;
        let unterminated = || GradleError::script_parse(start_line, "unterminated string literal");
        let token = |text: String, placeholders: bool| {
            if quote == '"' && placeholders {
                TokenKind::Template(text)
            } else {
                TokenKind::Str(text)
            }
        };

        let triple: String = std::iter::repeat_n(quote, 3).collect();
        if rest.starts_with(&triple) {
            let body = &rest[3..];
            let end = body.find(&triple).ok_or_else(unterminated)?;
            let text = &body[..end];
            self.push(token(text.to_string(), text.contains('$')), end + 6);
            self.line += text.matches('\n').count();
            return Ok(());
        }

        let mut value = String::new();
        let mut placeholders = false;
        let mut chars = rest.char_indices().skip(1);
        while let Some((i, c)) = chars.next() {
            match c {
                c if c == quote => {
                    self.push(token(value, placeholders), i + 1);
                    return Ok(());
                }
                '\n' => break,
                '\\' => match chars.next() {
                    Some((_, 'n')) => value.push('\n'),
                    Some((_, 't')) => value.push('\t'),
                    Some((_, '\n')) | None => break,
                    Some((_, escaped)) => value.push(escaped),
                },
                '$' => {
                    placeholders = true;
                    value.push(c);
                }
                _ => value.push(c),
            }
        }
        Err(unterminated())
    }

    fn word(&mut self, c: char) {
        let rest = self.rest();
        if let Some(m) = IDENT_PATTERN.find(rest) {
            self.push(TokenKind::Ident(m.as_str().to_string()), m.end());
        } else if let Some(m) = NUMBER_PATTERN.find(rest) {
            self.push(TokenKind::Number(m.as_str().to_string()), m.end());
        } else {
            self.push(TokenKind::Other(c), c.len_utf8());
        }
    }
}

/// Parsed argument, before it is placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Value {
    Literal(String),
    Template(String),
    Reference(String),
    Map(Vec<MapEntry>),
    Call {
        callee: String,
        arguments: Vec<Value>,
        closure: Option<String>,
    },
}

/// Argument list of a statement or call.
#[derive(Debug, Default)]
struct Arguments {
    values: Vec<Value>,
    /// Raw source of a closure passed among the arguments or trailing them
    closure: Option<String>,
}

enum Arg {
    Values(Vec<Value>),
    Entry(MapEntry),
    Closure(String),
}

/// Recursive descent over a bracket-balanced token stream.
struct Parser<'t> {
    tokens: &'t [Token],
    source: &'t str,
    pos: usize,
}

impl<'t> Parser<'t> {
    fn new(tokens: &'t [Token], source: &'t str) -> Self {
        Self {
            tokens,
            source,
            pos: 0,
        }
    }

    fn peek(&self) -> Option<&'t TokenKind> {
        self.peek_at(0)
    }

    fn peek_at(&self, offset: usize) -> Option<&'t TokenKind> {
        self.tokens.get(self.pos + offset).map(|token| &token.kind)
    }

    fn at(&self, kind: &TokenKind) -> bool {
        self.peek() == Some(kind)
    }

    fn line(&self) -> usize {
        self.tokens.get(self.pos).map_or(0, |token| token.line)
    }

    fn at_statement_end(&self) -> bool {
        is_statement_end(self.peek())
    }

    fn skip_newlines(&mut self) {
        while self.at(&TokenKind::Newline) {
            self.pos += 1;
        }
    }

    /// Skips from an opening bracket past its matching close.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        while let Some(kind) = self.peek() {
            self.pos += 1;
            match kind {
                TokenKind::Open(_) => depth += 1,
                TokenKind::Close(_) => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return;
                    }
                }
                _ => {}
            }
        }
    }

    /// Skips past the close of the group the parser is currently inside.
    fn skip_to_close(&mut self) {
        while let Some(kind) = self.peek() {
            match kind {
                TokenKind::Open(_) => self.skip_group(),
                TokenKind::Close(_) => {
                    self.pos += 1;
                    return;
                }
                _ => self.pos += 1,
            }
        }
    }

    fn skip_statement(&mut self) {
        while !self.at_statement_end() {
            if matches!(self.peek(), Some(TokenKind::Open(_))) {
                self.skip_group();
            } else {
                self.pos += 1;
            }
        }
    }

    /// Consumes a `{ ... }` group and returns its source, braces included.
    fn take_closure(&mut self) -> Option<String> {
        let start = match self.tokens.get(self.pos) {
            Some(Token {
                kind: TokenKind::Open('{'),
                start,
                ..
            }) => *start,
            _ => return None,
        };
        self.skip_group();
        let end = self.tokens.get(self.pos.checked_sub(1)?)?.end;
        self.source.get(start..end).map(str::to_string)
    }

    fn parse_script(&mut self, tree: &mut ScriptTree) -> Result<()> {
        while let Some(kind) = self.peek() {
            self.pos += 1;
            let TokenKind::Ident(name) = kind else {
                continue;
            };
            match name.as_str() {
                "dependencies" if self.at(&TokenKind::Open('{')) => {
                    self.pos += 1;
                    self.parse_block(tree)?;
                }
                "ext" if self.at(&TokenKind::Open('{')) => {
                    self.pos += 1;
                    self.parse_ext_block(tree);
                }
                "def" => self.parse_definition(tree),
                qualified if self.at(&TokenKind::Assign) => {
                    if let Some(short) = resolve::strip_ext_prefix(qualified) {
                        self.pos += 1;
                        self.define(tree, short);
                    }
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn parse_block(&mut self, tree: &mut ScriptTree) -> Result<()> {
        loop {
            match self.peek() {
                None => return Ok(()),
                Some(TokenKind::Close('}')) => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(TokenKind::Newline | TokenKind::Semi) => self.pos += 1,
                Some(TokenKind::Ident(head)) if head == "def" => {
                    self.pos += 1;
                    self.parse_definition(tree);
                    self.skip_statement();
                }
                Some(TokenKind::Ident(head)) if is_configuration_name(head) => {
                    self.parse_statement(tree, head)?;
                }
                Some(_) => self.skip_statement(),
            }
        }
    }

    /// Body of `ext { ... }`: one `name = 'value'` per statement.
    fn parse_ext_block(&mut self, tree: &mut ScriptTree) {
        loop {
            match self.peek() {
                None => return,
                Some(TokenKind::Close('}')) => {
                    self.pos += 1;
                    return;
                }
                Some(TokenKind::Newline | TokenKind::Semi) => self.pos += 1,
                Some(TokenKind::Ident(name)) if self.peek_at(1) == Some(&TokenKind::Assign) => {
                    self.pos += 2;
                    self.define(tree, name);
                    self.skip_statement();
                }
                Some(_) => self.skip_statement(),
            }
        }
    }

    /// `name = 'value'` after `def`.
    fn parse_definition(&mut self, tree: &mut ScriptTree) {
        if let Some(TokenKind::Ident(name)) = self.peek()
            && self.peek_at(1) == Some(&TokenKind::Assign)
        {
            self.pos += 2;
            self.define(tree, name);
        }
    }

    /// Records a string variable if the statement is exactly one string
    /// value. Leaves the parser on the value.
    fn define(&mut self, tree: &mut ScriptTree, name: &str) {
        if !is_statement_end(self.peek_at(1)) {
            return;
        }
        let value = match self.peek() {
            Some(TokenKind::Str(text)) => Some(text.clone()),
            Some(TokenKind::Template(text)) => resolve::interpolate(&*tree, text),
            _ => None,
        };
        if let Some(value) = value {
            tracing::trace!(name, %value, "script variable");
            tree.define_variable(name, value);
        }
    }

    fn parse_statement(&mut self, tree: &mut ScriptTree, configuration: &str) -> Result<()> {
        let line = self.line();
        self.pos += 1;

        let arguments = match self.peek() {
            Some(TokenKind::Open('(')) => {
                self.pos += 1;
                let arguments = self.parse_args(Some(')'));
                let trailing = self.take_closure();
                arguments.map(|Arguments { values, closure }| Arguments {
                    values,
                    closure: trailing.or(closure),
                })
            }
            Some(
                TokenKind::Str(_)
                | TokenKind::Template(_)
                | TokenKind::Ident(_)
                | TokenKind::Number(_)
                | TokenKind::Open('['),
            ) => self.parse_args(None),
            _ => None,
        };

        match arguments {
            Some(arguments) if self.at_statement_end() => {
                if declares_no_artifact(&arguments.values) {
                    tracing::debug!(line, configuration, "skipping non-artifact statement");
                    return Ok(());
                }
                for value in arguments.values {
                    let node = insert_value(tree, Slot::list(configuration), value)?;
                    if let Some(closure) = &arguments.closure {
                        tree.set_closure(node, closure.clone())?;
                    }
                }
            }
            _ => {
                tracing::debug!(line, configuration, "skipping unrecognized statement");
                self.skip_statement();
            }
        }
        Ok(())
    }

    /// Parses a comma-separated argument list.
    ///
    /// With a `close` bracket, newlines are insignificant and the close is
    /// consumed. Without one (command syntax), the list ends at the first
    /// argument not followed by a comma. Named arguments are gathered into a
    /// single map at the position of the first one.
    fn parse_args(&mut self, close: Option<char>) -> Option<Arguments> {
        let mut arguments = Arguments::default();
        let mut map_index = None;

        loop {
            if let Some(close) = close {
                self.skip_newlines();
                if self.at(&TokenKind::Close(close)) {
                    self.pos += 1;
                    return Some(arguments);
                }
            }

            match self.parse_arg() {
                Some(Arg::Values(parsed)) => arguments.values.extend(parsed),
                Some(Arg::Entry(entry)) => match map_index {
                    Some(index) => {
                        if let Some(Value::Map(entries)) = arguments.values.get_mut(index) {
                            entries.push(entry);
                        }
                    }
                    None => {
                        map_index = Some(arguments.values.len());
                        arguments.values.push(Value::Map(vec![entry]));
                    }
                },
                Some(Arg::Closure(source)) => arguments.closure = Some(source),
                None => {
                    if close.is_some() {
                        self.skip_to_close();
                    }
                    return None;
                }
            }

            if close.is_some() {
                self.skip_newlines();
            }
            if self.at(&TokenKind::Comma) {
                self.pos += 1;
                self.skip_newlines();
            } else if let Some(close) = close {
                if !self.at(&TokenKind::Close(close)) {
                    self.skip_to_close();
                    return None;
                }
            } else {
                return Some(arguments);
            }
        }
    }

    fn parse_arg(&mut self) -> Option<Arg> {
        let arg = match self.peek()? {
            TokenKind::Str(key) | TokenKind::Ident(key)
                if self.peek_at(1) == Some(&TokenKind::Colon) =>
            {
                self.pos += 2;
                Arg::Entry(self.parse_entry(key)?)
            }
            TokenKind::Str(text) => {
                self.pos += 1;
                Arg::Values(vec![Value::Literal(text.clone())])
            }
            TokenKind::Template(text) => {
                self.pos += 1;
                Arg::Values(vec![Value::Template(text.clone())])
            }
            TokenKind::Ident(callee) if self.peek_at(1) == Some(&TokenKind::Open('(')) => {
                self.pos += 2;
                let arguments = self.parse_args(Some(')'))?;
                let closure = self.take_closure().or(arguments.closure);
                Arg::Values(vec![Value::Call {
                    callee: callee.clone(),
                    arguments: arguments.values,
                    closure,
                }])
            }
            TokenKind::Ident(text) | TokenKind::Number(text) => {
                self.pos += 1;
                Arg::Values(vec![Value::Reference(text.clone())])
            }
            TokenKind::Open('[') => {
                self.pos += 1;
                self.parse_bracket()?
            }
            TokenKind::Open('{') => Arg::Closure(self.take_closure()?),
            _ => return None,
        };
        Some(arg)
    }

    fn parse_entry(&mut self, key: &str) -> Option<MapEntry> {
        let entry = match self.peek()? {
            TokenKind::Str(value) => MapEntry::literal(key, value.clone()),
            TokenKind::Template(value) => MapEntry::template(key, value.clone()),
            TokenKind::Ident(value) | TokenKind::Number(value) => {
                MapEntry::reference(key, value.clone())
            }
            _ => return None,
        };
        self.pos += 1;
        Some(entry)
    }

    /// `[k: 'v', ...]` is a map, `[:]` an empty map, `['a', 'b']` a list whose
    /// elements are flattened into the enclosing argument list.
    fn parse_bracket(&mut self) -> Option<Arg> {
        self.skip_newlines();
        if self.at(&TokenKind::Colon) && self.peek_at(1) == Some(&TokenKind::Close(']')) {
            self.pos += 2;
            return Some(Arg::Values(vec![Value::Map(Vec::new())]));
        }
        self.parse_args(Some(']'))
            .map(|arguments| Arg::Values(arguments.values))
    }
}

fn is_statement_end(kind: Option<&TokenKind>) -> bool {
    matches!(
        kind,
        None | Some(TokenKind::Newline | TokenKind::Semi | TokenKind::Close('}'))
    )
}

fn is_configuration_name(head: &str) -> bool {
    !head.contains('.') && !KEYWORDS.contains(&head)
}

/// Whether a statement's values are all maps without artifact keys, as in
/// `apply plugin: 'java'`.
fn declares_no_artifact(values: &[Value]) -> bool {
    let is_artifact_key = |key: &str| ArtifactField::ALL.iter().any(|field| field.map_key() == key);
    !values.is_empty()
        && values.iter().all(|value| {
            matches!(value, Value::Map(entries)
                if !entries.iter().any(|entry| is_artifact_key(&entry.key)))
        })
}

fn insert_value(tree: &mut ScriptTree, slot: Slot, value: Value) -> Result<NodeId> {
    let node = match value {
        Value::Literal(text) => tree.insert_literal(slot, text)?,
        Value::Template(text) => tree.insert_template(slot, text)?,
        Value::Reference(text) => tree.insert_reference(slot, text)?,
        Value::Map(entries) => tree.insert_map(slot, entries)?,
        Value::Call {
            callee,
            arguments,
            closure,
        } => {
            let call = tree.insert_call(slot, callee)?;
            for argument in arguments {
                insert_value(tree, Slot::Argument(call), argument)?;
            }
            if let Some(closure) = closure {
                tree.set_closure(call, closure)?;
            }
            call
        }
    };
    Ok(node)
}
