//! Filename templates with `{token}` placeholders.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A placeholder recognised in filename templates.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum Token {
    #[strum(serialize = "YYYY")]
    Year,
    #[strum(serialize = "MM")]
    Month,
    #[strum(serialize = "DD")]
    Day,
    #[strum(serialize = "hh")]
    Hour,
    #[strum(serialize = "mm")]
    Minute,
    #[strum(serialize = "ss")]
    Second,
    Artist,
    Make,
    Model,
    Folder,
    Seq,
    #[strum(serialize = "ext")]
    Ext,
}

/// One piece of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(Token),
}

/// A parsed filename template.
///
/// `{{` and `}}` stand for literal braces. Everything else between braces
/// must be a [`Token`] name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl NameTemplate {
    /// Parse a template, rejecting unknown tokens and unbalanced braces.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) => name.push(ch),
                            None => {
                                return Err(ConfigError::UnterminatedPlaceholder {
                                    template: source.to_string(),
                                });
                            }
                        }
                    }
                    if name.contains([':', '!']) {
                        return Err(ConfigError::FormatSpec { spec: name });
                    }
                    let token = name
                        .parse::<Token>()
                        .map_err(|_| ConfigError::UnknownToken { name })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Token(token));
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => {
                    return Err(ConfigError::StrayBrace {
                        template: source.to_string(),
                    });
                }
                _ => literal.push(c),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Parse a user template and append the `.{ext}` suffix.
    pub fn with_extension(source: &str) -> Result<Self, ConfigError> {
        Self::parse(source)?;
        Self::parse(&format!("{source}.{{ext}}"))
    }

    /// Tokens used by this template, in order of appearance.
    pub fn tokens(&self) -> impl Iterator<Item = Token> + '_ {
        self.segments.iter().filter_map(|s| match s {
            Segment::Token(t) => Some(*t),
            Segment::Literal(_) => None,
        })
    }

    /// Substitute every placeholder. Missing values render empty.
    pub fn render(&self, values: &Substitutions) -> String {
        let mut out = String::with_capacity(self.source.len() + 16);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(token) => out.push_str(values.get(*token)),
            }
        }
        out
    }
}

impl std::fmt::Display for NameTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

/// Values substituted into a template, keyed by token.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitutions(IndexMap<Token, String>);

impl Substitutions {
    /// Create an empty substitution map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the value for a token, replacing any previous one.
    pub fn insert(&mut self, token: Token, value: impl Into<String>) -> &mut Self {
        self.0.insert(token, value.into());
        self
    }

    /// Value for a token, or `""` when unset.
    pub fn get(&self, token: Token) -> &str {
        self.0.get(&token).map(String::as_str).unwrap_or("")
    }
}
