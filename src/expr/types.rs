//! Token kinds and directive keywords.

use std::fmt;

/// The character that identifies a bean token.
pub const BEAN_SYMBOL: char = '#';
/// The character that identifies a template token.
pub const TEMPLATE_SYMBOL: char = '~';
/// The character that identifies a parameter token.
pub const PARAMETER_SYMBOL: char = '$';
/// The character that identifies an attribute token.
pub const ATTRIBUTE_SYMBOL: char = '@';
/// The character that identifies a property token.
pub const PROPERTY_SYMBOL: char = '%';

pub const BRACKET_OPEN: char = '{';
pub const BRACKET_CLOSE: char = '}';
/// Separates a token name from its value or default value.
pub const VALUE_DELIMITER: char = ':';
/// Separates a token name or value from its getter name.
pub const GETTER_DELIMITER: char = '^';

/// Kind of a lexical unit produced by the tokenizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    /// Literal text, carried in the token's default value.
    Text,
    /// `#{...}` bean reference.
    Bean,
    /// `~{...}` template reference.
    Template,
    /// `${...}` request parameter reference.
    Parameter,
    /// `@{...}` request attribute reference.
    Attribute,
    /// `%{...}` environment property reference.
    Property,
}

impl TokenType {
    /// Resolve a trigger symbol to its token type.
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            BEAN_SYMBOL => Some(Self::Bean),
            TEMPLATE_SYMBOL => Some(Self::Template),
            PARAMETER_SYMBOL => Some(Self::Parameter),
            ATTRIBUTE_SYMBOL => Some(Self::Attribute),
            PROPERTY_SYMBOL => Some(Self::Property),
            _ => None,
        }
    }

    /// The trigger symbol of a reference type; `None` for text.
    pub fn symbol(self) -> Option<char> {
        match self {
            Self::Text => None,
            Self::Bean => Some(BEAN_SYMBOL),
            Self::Template => Some(TEMPLATE_SYMBOL),
            Self::Parameter => Some(PARAMETER_SYMBOL),
            Self::Attribute => Some(ATTRIBUTE_SYMBOL),
            Self::Property => Some(PROPERTY_SYMBOL),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Bean => "bean",
            Self::Template => "template",
            Self::Parameter => "parameter",
            Self::Attribute => "attribute",
            Self::Property => "property",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true if `c` introduces a token expression.
#[inline]
pub fn is_token_symbol(c: char) -> bool {
    matches!(
        c,
        BEAN_SYMBOL | TEMPLATE_SYMBOL | PARAMETER_SYMBOL | ATTRIBUTE_SYMBOL | PROPERTY_SYMBOL
    )
}

/// Reserved names that change how a reference token's body is read.
///
/// A directive token has the form `symbol{directive:value^getter:default}`,
/// e.g. `#{class:com.example.Clock^now}` or `%{classpath:app.properties^db.url}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenDirectiveType {
    /// Static field of a class: `#{field:className^fieldName}`.
    Field,
    /// Static method of a class: `#{method:className^methodName}`.
    Method,
    /// A class used as a bean: `#{class:className^property}`.
    Class,
    /// Property loaded from a classpath resource.
    Classpath,
    /// System property.
    System,
}

impl TokenDirectiveType {
    const ALL: [TokenDirectiveType; 5] = [
        Self::Field,
        Self::Method,
        Self::Class,
        Self::Classpath,
        Self::System,
    ];

    /// The token type this directive applies to.
    pub fn token_type(self) -> TokenType {
        match self {
            Self::Field | Self::Method | Self::Class => TokenType::Bean,
            Self::Classpath | Self::System => TokenType::Property,
        }
    }

    /// Canonical keyword, also used as the directive token's name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Field => "field",
            Self::Method => "method",
            Self::Class => "class",
            Self::Classpath => "classpath",
            Self::System => "system",
        }
    }

    /// Resolve `name` as a directive valid for tokens of `token_type`.
    pub fn resolve(token_type: TokenType, name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|d| d.token_type() == token_type && d.as_str() == name)
    }
}

impl fmt::Display for TokenDirectiveType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
