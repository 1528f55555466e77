//! The token value type.

use super::types::{
    TokenDirectiveType, TokenType, BRACKET_CLOSE, BRACKET_OPEN, GETTER_DELIMITER,
    VALUE_DELIMITER,
};
use crate::error::{AspectError, Result};
use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

/// Opaque object bound to a token after parsing, such as a pre-resolved
/// class or field handle supplied by the evaluating runtime.
pub type AlternativeValue = Arc<dyn Any + Send + Sync>;

/// One lexical unit of an expression: literal text or a typed reference.
///
/// Value fields are fixed once the token is built. The only slot that can be
/// written afterwards is the alternative value, and only once.
///
/// # Examples
///
/// ```rust
/// use aspect_engine::expr::{Token, TokenType};
///
/// let token = Token::new(TokenType::Bean, "clock")
///     .unwrap()
///     .with_getter_name("now")
///     .with_default_value("never");
/// assert_eq!(token.stringify(), "#{clock^now:never}");
/// ```
#[derive(Debug, Clone)]
pub struct Token {
    token_type: TokenType,
    directive_type: Option<TokenDirectiveType>,
    name: Option<String>,
    value: Option<String>,
    getter_name: Option<String>,
    default_value: Option<String>,
    alternative_value: OnceLock<AlternativeValue>,
}

impl Token {
    /// Create a literal text token.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            token_type: TokenType::Text,
            directive_type: None,
            name: None,
            value: None,
            getter_name: None,
            default_value: Some(text.into()),
            alternative_value: OnceLock::new(),
        }
    }

    /// Create a reference token. Fails for [`TokenType::Text`].
    pub fn new(token_type: TokenType, name: impl Into<String>) -> Result<Self> {
        if token_type == TokenType::Text {
            return Err(AspectError::InvalidToken(
                "a reference token cannot have the text type".to_string(),
            ));
        }
        Ok(Self::reference(token_type, name.into()))
    }

    /// Reference constructor for callers that already hold a reference type.
    pub(crate) fn reference(token_type: TokenType, name: String) -> Self {
        debug_assert!(token_type != TokenType::Text);
        Self {
            token_type,
            directive_type: None,
            name: Some(name),
            value: None,
            getter_name: None,
            default_value: None,
            alternative_value: OnceLock::new(),
        }
    }

    /// Create a directive token; its name is the directive keyword.
    pub fn with_directive(directive_type: TokenDirectiveType, value: Option<String>) -> Self {
        Self {
            token_type: directive_type.token_type(),
            directive_type: Some(directive_type),
            name: Some(directive_type.as_str().to_string()),
            value,
            getter_name: None,
            default_value: None,
            alternative_value: OnceLock::new(),
        }
    }

    pub fn with_getter_name(mut self, getter_name: impl Into<String>) -> Self {
        self.getter_name = Some(getter_name.into());
        self
    }

    pub fn with_default_value(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub(crate) fn with_optional_parts(
        mut self,
        getter_name: Option<String>,
        default_value: Option<String>,
    ) -> Self {
        self.getter_name = getter_name;
        self.default_value = default_value;
        self
    }

    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    pub fn directive_type(&self) -> Option<TokenDirectiveType> {
        self.directive_type
    }

    /// Reference key; `None` only for text tokens.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Directive operand such as a class name or resource path.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn getter_name(&self) -> Option<&str> {
        self.getter_name.as_deref()
    }

    /// Fallback used when the reference resolves to nothing.
    /// For text tokens this is the literal text itself.
    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn is_text(&self) -> bool {
        self.token_type == TokenType::Text
    }

    pub fn alternative_value(&self) -> Option<&AlternativeValue> {
        self.alternative_value.get()
    }

    /// Bind the alternative value. It can be bound only once.
    pub fn set_alternative_value(&self, value: AlternativeValue) -> Result<()> {
        self.alternative_value.set(value).map_err(|_| {
            AspectError::InvalidToken(format!(
                "alternative value already bound for {}",
                self.stringify()
            ))
        })
    }

    /// Render the token back to expression syntax.
    pub fn stringify(&self) -> String {
        let symbol = match self.token_type.symbol() {
            Some(symbol) => symbol,
            None => return self.default_value.clone().unwrap_or_default(),
        };

        let mut sb = String::new();
        sb.push(symbol);
        sb.push(BRACKET_OPEN);
        if let Some(name) = &self.name {
            sb.push_str(name);
        }
        if let Some(value) = &self.value {
            sb.push(VALUE_DELIMITER);
            sb.push_str(value);
        }
        if let Some(getter_name) = &self.getter_name {
            sb.push(GETTER_DELIMITER);
            sb.push_str(getter_name);
        }
        if let Some(default_value) = &self.default_value {
            sb.push(VALUE_DELIMITER);
            sb.push_str(default_value);
        }
        sb.push(BRACKET_CLOSE);
        sb
    }

    /// Copy for reuse in another execution. Directive tokens keep their
    /// bound alternative value; other tokens start unbound.
    pub fn replicate(&self) -> Self {
        let alternative_value = OnceLock::new();
        if self.directive_type.is_some() {
            if let Some(value) = self.alternative_value.get() {
                let _ = alternative_value.set(Arc::clone(value));
            }
        }
        Self {
            token_type: self.token_type,
            directive_type: self.directive_type,
            name: self.name.clone(),
            value: self.value.clone(),
            getter_name: self.getter_name.clone(),
            default_value: self.default_value.clone(),
            alternative_value,
        }
    }

    pub fn replicate_all(tokens: &[Token]) -> Vec<Token> {
        tokens.iter().map(Token::replicate).collect()
    }

    /// Returns true if `expression` contains at least one `symbol{...}` form
    /// with a non-empty body.
    pub fn has_token(expression: &str) -> bool {
        let mut prev: Option<char> = None;
        let mut body_len: Option<usize> = None;
        for c in expression.chars() {
            match body_len {
                Some(len) if c == BRACKET_CLOSE => {
                    if len > 0 {
                        return true;
                    }
                    body_len = None;
                }
                Some(len) => body_len = Some(len + 1),
                None => {
                    if c == BRACKET_OPEN && prev.is_some_and(super::types::is_token_symbol) {
                        body_len = Some(0);
                    }
                }
            }
            prev = Some(c);
        }
        false
    }

    /// Wrap raw expression text with the symbol of `token_type`.
    pub fn format(token_type: TokenType, expression: &str) -> String {
        match token_type.symbol() {
            None => expression.to_string(),
            Some(symbol) => {
                let mut sb = String::with_capacity(expression.len() + 3);
                sb.push(symbol);
                sb.push(BRACKET_OPEN);
                sb.push_str(expression);
                sb.push(BRACKET_CLOSE);
                sb
            }
        }
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        self.token_type == other.token_type
            && self.name == other.name
            && self.value == other.value
            && self.getter_name == other.getter_name
            && self.default_value == other.default_value
    }
}

impl Eq for Token {}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.token_type.hash(state);
        self.name.hash(state);
        self.value.hash(state);
        self.getter_name.hash(state);
        self.default_value.hash(state);
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stringify())
    }
}
