//! Higher-level parsing entry points over the tokenizer.

use super::token::Token;
use super::tokenizer::{optimize, tokenize};
use super::types::TokenType;
use indexmap::IndexMap;

/// Parse an expression into tokens.
///
/// With `optimize_tokens` set, incidental whitespace at the start of the first token
/// and the end of the last token is trimmed (a trimmed line break is kept as
/// one `\n`).
pub fn parse(expression: &str, optimize_tokens: bool) -> Vec<Token> {
    let tokens = tokenize(expression, false);
    if optimize_tokens {
        optimize(tokens)
    } else {
        tokens
    }
}

/// Parse an expression into individually addressable tokens.
///
/// Text tokens with no visible characters are dropped; every remaining token
/// becomes its own single-element group.
pub fn parse_as_list(expression: &str) -> Vec<Vec<Token>> {
    tokenize(expression, true)
        .into_iter()
        .filter(|t| !t.is_text() || has_text(t.default_value()))
        .map(|t| vec![t])
        .collect()
}

/// Parse an expression into reference tokens keyed by name.
///
/// Only reference tokens carrying both a name and a default value are kept.
/// A repeated name keeps its first position and takes the last token.
pub fn parse_as_map(expression: &str) -> IndexMap<String, Vec<Token>> {
    let mut map = IndexMap::new();
    for token in tokenize(expression, true) {
        if token.is_text() {
            continue;
        }
        let name = match token.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };
        if token.default_value().map_or(true, str::is_empty) {
            continue;
        }
        map.insert(name, vec![token]);
    }
    map
}

/// Either parse `expression` or wrap it whole as one literal token.
pub fn make_tokens(expression: &str, tokenize_expression: bool) -> Vec<Token> {
    if tokenize_expression {
        parse(expression, false)
    } else {
        vec![Token::text(expression)]
    }
}

/// Render tokens back to expression syntax.
pub fn to_string(tokens: &[Token]) -> String {
    tokens.iter().map(Token::stringify).collect()
}

/// Parse a request path that may embed parameter or attribute references.
///
/// Returns `None` when the path holds no parameter or attribute reference.
/// Any other reference is turned back into literal text so it is never
/// resolved while building a path.
pub fn parse_path_safely(path: &str) -> Option<Vec<Token>> {
    if !has_text(Some(path)) {
        return None;
    }
    let tokens = tokenize(path, true);
    if tokens.len() == 1 && tokens[0].is_text() {
        return None;
    }
    let is_path_variable = |t: &Token| {
        matches!(
            t.token_type(),
            TokenType::Parameter | TokenType::Attribute
        )
    };
    if !tokens.iter().any(is_path_variable) {
        return None;
    }
    Some(
        tokens
            .into_iter()
            .map(|t| {
                if is_path_variable(&t) || t.is_text() {
                    t
                } else {
                    Token::text(t.stringify())
                }
            })
            .collect(),
    )
}

fn has_text(s: Option<&str>) -> bool {
    s.is_some_and(|s| s.chars().any(|c| !c.is_whitespace()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::tokenizer::tokenize;

    #[test]
    fn test_parse_empty() {
        let tokens = parse("", false);
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_text());
        assert_eq!(tokens[0].default_value(), Some(""));
    }

    #[test]
    fn test_parse_optimize() {
        let tokens = parse("  \n  ${a} and ${b}   ", true);
        assert_eq!(tokens[0], Token::text("\n"));
        assert_eq!(tokens[4], Token::text(""));

        let tokens = parse("  ${a}  ", false);
        assert_eq!(tokens[0], Token::text("  "));
        assert_eq!(tokens[2], Token::text("  "));
    }

    #[test]
    fn test_parse_as_list_drops_blank_text() {
        let list = parse_as_list("${a} ${b}\n  literal  ");
        assert_eq!(list.len(), 3);
        assert_eq!(list[0][0].name(), Some("a"));
        assert_eq!(list[1][0].name(), Some("b"));
        assert_eq!(list[2][0].default_value(), Some("\n  literal"));
        assert!(list.iter().all(|group| group.len() == 1));
    }

    #[test]
    fn test_parse_as_map_keeps_named_defaults() {
        let map = parse_as_map("${a:1} ${b} @{c:3} text ${a:9}");
        assert_eq!(map.len(), 2);
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["a", "c"]);
        assert_eq!(map["a"][0].default_value(), Some("9"));
        assert_eq!(map["c"][0].token_type(), TokenType::Attribute);
    }

    #[test]
    fn test_to_string_round_trip() {
        let expressions = [
            "Hello ${name}, you are @{user^age:unknown} years old",
            "#{bean^getter:default} ~{tpl} %{prop:x:y}",
            "$$ ${ not closed",
            "plain",
        ];
        for expression in expressions {
            let tokens = parse(expression, false);
            let rendered = to_string(&tokens);
            assert_eq!(tokenize(&rendered, false), tokens, "{expression}");
        }
    }

    #[test]
    fn test_make_tokens() {
        let literal = make_tokens("${a}", false);
        assert_eq!(literal, vec![Token::text("${a}")]);
        let parsed = make_tokens("${a}", true);
        assert_eq!(parsed[0].token_type(), TokenType::Parameter);
    }

    #[test]
    fn test_parse_path_safely() {
        assert!(parse_path_safely("/static/index.html").is_none());
        assert!(parse_path_safely("   ").is_none());
        assert!(parse_path_safely("/beans/#{clock}").is_none());

        let tokens = parse_path_safely("/users/${id}/#{clock}").unwrap();
        assert_eq!(tokens.len(), 4);
        assert_eq!(tokens[0], Token::text("/users/"));
        assert_eq!(tokens[1].token_type(), TokenType::Parameter);
        assert_eq!(tokens[2], Token::text("/"));
        assert_eq!(tokens[3], Token::text("#{clock}"));
    }
}
