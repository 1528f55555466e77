//! Character-level state machine that splits an expression into tokens.
//!
//! The scanner recognises five trigger symbols (`#`, `~`, `$`, `@`, `%`),
//! each introducing a `{...}` body. Everything else is literal text. Malformed
//! bodies never fail; the scanned characters simply stay literal.

use super::token::Token;
use super::types::{
    TokenDirectiveType, TokenType, BRACKET_CLOSE, BRACKET_OPEN, GETTER_DELIMITER,
    VALUE_DELIMITER,
};
use tracing::trace;

/// Reference names longer than this revert to literal text.
pub const MAX_TOKEN_NAME_LENGTH: usize = 256;

const CR: char = '\r';
const LF: char = '\n';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Text,
    SawSymbol,
    InName,
    InValue,
}

/// Split `input` into an ordered sequence of tokens.
///
/// With `trim` set, the leading whitespace of the first token and the trailing
/// whitespace of the last token are removed when those tokens are text; a
/// removed run that held a line break is kept as a single `\n`. Text left
/// empty by trimming is dropped.
///
/// Empty input, or input trimmed down to nothing, yields one empty text token.
pub fn tokenize(input: &str, trim: bool) -> Vec<Token> {
    if input.is_empty() {
        return vec![Token::text("")];
    }

    let mut tokens: Vec<Token> = Vec::new();
    let mut name_buf = String::new();
    let mut name_len = 0usize;
    let mut value_buf = String::new();
    // byte offset where pending literal text begins
    let mut start = 0usize;
    let mut symbol_start = 0usize;
    let mut symbol_type = TokenType::Parameter;
    let mut state = ScanState::Text;

    for (i, c) in input.char_indices() {
        let end = i + c.len_utf8();
        match state {
            ScanState::Text => {
                if let Some(token_type) = TokenType::from_symbol(c) {
                    symbol_type = token_type;
                    symbol_start = i;
                    state = ScanState::SawSymbol;
                }
            }
            ScanState::SawSymbol => {
                if c == BRACKET_OPEN {
                    name_buf.clear();
                    name_len = 0;
                    state = ScanState::InName;
                } else if let Some(token_type) = TokenType::from_symbol(c) {
                    symbol_type = token_type;
                    symbol_start = i;
                } else {
                    state = ScanState::Text;
                }
            }
            ScanState::InName => {
                if c == VALUE_DELIMITER {
                    value_buf.clear();
                    state = ScanState::InValue;
                } else if c == BRACKET_CLOSE {
                    if !name_buf.is_empty() {
                        flush_text(&mut tokens, input, start, symbol_start, trim);
                        tokens.push(create_token(symbol_type, &name_buf, None));
                        start = end;
                    }
                    state = ScanState::Text;
                } else {
                    name_buf.push(c);
                    name_len += 1;
                    if name_len > MAX_TOKEN_NAME_LENGTH {
                        trace!(offset = symbol_start, "token name too long, keeping as text");
                        name_buf.clear();
                        name_len = 0;
                        state = ScanState::Text;
                    }
                }
            }
            ScanState::InValue => {
                if c == BRACKET_CLOSE {
                    if !value_buf.is_empty() {
                        flush_text(&mut tokens, input, start, symbol_start, trim);
                        tokens.push(create_token(symbol_type, &name_buf, Some(value_buf.as_str())));
                        start = end;
                    }
                    state = ScanState::Text;
                } else {
                    value_buf.push(c);
                }
            }
        }
    }

    if start < input.len() {
        let mut text = input[start..].to_string();
        if trim {
            if tokens.is_empty() {
                text = trim_leading(&text);
            }
            text = trim_trailing(&text);
        }
        if !text.is_empty() {
            tokens.push(Token::text(text));
        }
    }
    if tokens.is_empty() {
        tokens.push(Token::text(""));
    }
    tokens
}

/// Trim the boundaries of an already built token sequence.
///
/// The first token loses its leading whitespace and the last its trailing
/// whitespace, when they are text; a removed run that held a line break
/// is kept as a single `\n`.
pub fn optimize(mut tokens: Vec<Token>) -> Vec<Token> {
    if let Some(first) = tokens.first_mut() {
        if first.is_text() {
            let text = first.default_value().unwrap_or_default();
            let trimmed = trim_leading(text);
            if trimmed != text {
                *first = Token::text(trimmed);
            }
        }
    }
    if let Some(last) = tokens.last_mut() {
        if last.is_text() {
            let text = last.default_value().unwrap_or_default();
            let trimmed = trim_trailing(text);
            if trimmed != text {
                *last = Token::text(trimmed);
            }
        }
    }
    tokens
}

fn flush_text(tokens: &mut Vec<Token>, input: &str, start: usize, end: usize, trim: bool) {
    if end <= start {
        return;
    }
    let text = &input[start..end];
    let text = if trim && tokens.is_empty() {
        trim_leading(text)
    } else {
        text.to_string()
    };
    if !text.is_empty() {
        tokens.push(Token::text(text));
    }
}

fn create_token(token_type: TokenType, name: &str, value: Option<&str>) -> Token {
    let value = value.filter(|v| !v.is_empty()).map(str::to_string);

    if let Some((name, getter)) = name.split_once(GETTER_DELIMITER) {
        let getter = non_empty(getter);
        return Token::reference(token_type, name.to_string())
            .with_optional_parts(getter, value);
    }

    match value {
        Some(value) => match TokenDirectiveType::resolve(token_type, name) {
            Some(directive_type) => {
                let (operand, getter, default_value) = split_directive_value(&value);
                Token::with_directive(directive_type, Some(operand.to_string()))
                    .with_optional_parts(getter, default_value)
            }
            None => Token::reference(token_type, name.to_string())
                .with_optional_parts(None, Some(value)),
        },
        None => Token::reference(token_type, name.to_string()),
    }
}

/// Split `operand^getter:default` (both suffixes optional).
fn split_directive_value(value: &str) -> (&str, Option<String>, Option<String>) {
    if let Some((operand, rest)) = value.split_once(GETTER_DELIMITER) {
        match rest.split_once(VALUE_DELIMITER) {
            Some((getter, default_value)) => {
                (operand, non_empty(getter), non_empty(default_value))
            }
            None => (operand, non_empty(rest), None),
        }
    } else if let Some((operand, default_value)) = value.split_once(VALUE_DELIMITER) {
        (operand, None, non_empty(default_value))
    } else {
        (value, None, None)
    }
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(|c: char| c == CR || c == LF)
}

/// `"  \r\n  aaa"` becomes `"\naaa"`; `"  aaa"` becomes `"aaa"`.
pub(crate) fn trim_leading(text: &str) -> String {
    let trimmed = text.trim_start();
    let run = &text[..text.len() - trimmed.len()];
    if has_line_break(run) {
        let mut s = String::with_capacity(trimmed.len() + 1);
        s.push(LF);
        s.push_str(trimmed);
        s
    } else {
        trimmed.to_string()
    }
}

/// `"aaa  \r\n  "` becomes `"aaa\n"`; `"aaa  "` becomes `"aaa"`.
pub(crate) fn trim_trailing(text: &str) -> String {
    let trimmed = text.trim_end();
    let run = &text[trimmed.len()..];
    if has_line_break(run) {
        let mut s = String::with_capacity(trimmed.len() + 1);
        s.push_str(trimmed);
        s.push(LF);
        s
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(token_type: TokenType, name: &str) -> Token {
        Token::new(token_type, name).unwrap()
    }

    #[test]
    fn test_empty_input_yields_one_empty_text_token() {
        let tokens = tokenize("", false);
        assert_eq!(tokens, vec![Token::text("")]);
    }

    #[test]
    fn test_plain_text() {
        let tokens = tokenize("no references here", false);
        assert_eq!(tokens, vec![Token::text("no references here")]);
    }

    #[test]
    fn test_each_symbol_maps_to_its_type() {
        let tokens = tokenize("#{a}~{b}${c}@{d}%{e}", false);
        assert_eq!(
            tokens,
            vec![
                reference(TokenType::Bean, "a"),
                reference(TokenType::Template, "b"),
                reference(TokenType::Parameter, "c"),
                reference(TokenType::Attribute, "d"),
                reference(TokenType::Property, "e"),
            ]
        );
    }

    #[test]
    fn test_text_around_references_is_flushed() {
        let tokens = tokenize("Hello ${name}, welcome to @{site}!", false);
        assert_eq!(
            tokens,
            vec![
                Token::text("Hello "),
                reference(TokenType::Parameter, "name"),
                Token::text(", welcome to "),
                reference(TokenType::Attribute, "site"),
                Token::text("!"),
            ]
        );
    }

    #[test]
    fn test_getter_and_default() {
        let tokens = tokenize("#{bean^getter:default}", false);
        assert_eq!(tokens.len(), 1);
        let token = &tokens[0];
        assert_eq!(token.token_type(), TokenType::Bean);
        assert_eq!(token.name(), Some("bean"));
        assert_eq!(token.getter_name(), Some("getter"));
        assert_eq!(token.default_value(), Some("default"));
        assert_eq!(token.directive_type(), None);
    }

    #[test]
    fn test_default_value_may_contain_delimiters() {
        let tokens = tokenize("${name:a:b^c}", false);
        assert_eq!(tokens[0].name(), Some("name"));
        assert_eq!(tokens[0].default_value(), Some("a:b^c"));
        assert_eq!(tokens[0].getter_name(), None);
    }

    #[test]
    fn test_directive_token_split() {
        let tokens = tokenize("%{classpath:a/b.properties^getProp:fallback}", false);
        assert_eq!(tokens.len(), 1);
        let token = &tokens[0];
        assert_eq!(token.token_type(), TokenType::Property);
        assert_eq!(token.directive_type(), Some(TokenDirectiveType::Classpath));
        assert_eq!(token.name(), Some("classpath"));
        assert_eq!(token.value(), Some("a/b.properties"));
        assert_eq!(token.getter_name(), Some("getProp"));
        assert_eq!(token.default_value(), Some("fallback"));
    }

    #[test]
    fn test_directive_without_getter() {
        let tokens = tokenize("#{class:com.example.Clock}", false);
        assert_eq!(tokens[0].directive_type(), Some(TokenDirectiveType::Class));
        assert_eq!(tokens[0].value(), Some("com.example.Clock"));
        assert_eq!(tokens[0].getter_name(), None);

        let tokens = tokenize("%{system:user.home:/tmp}", false);
        assert_eq!(tokens[0].directive_type(), Some(TokenDirectiveType::System));
        assert_eq!(tokens[0].value(), Some("user.home"));
        assert_eq!(tokens[0].default_value(), Some("/tmp"));
    }

    #[test]
    fn test_directive_keyword_of_other_type_is_plain_name() {
        let tokens = tokenize("${class:fallback}", false);
        assert_eq!(tokens[0].directive_type(), None);
        assert_eq!(tokens[0].name(), Some("class"));
        assert_eq!(tokens[0].default_value(), Some("fallback"));
    }

    #[test]
    fn test_unclosed_and_empty_bodies_stay_text() {
        assert_eq!(tokenize("${name", false), vec![Token::text("${name")]);
        assert_eq!(tokenize("a ${} b", false), vec![Token::text("a ${} b")]);
        assert_eq!(tokenize("${name:}", false), vec![Token::text("${name:}")]);
        assert_eq!(tokenize("$ {x}", false), vec![Token::text("$ {x}")]);
    }

    #[test]
    fn test_consecutive_symbols_last_wins() {
        let tokens = tokenize("#${name}", false);
        assert_eq!(
            tokens,
            vec![Token::text("#"), reference(TokenType::Parameter, "name")]
        );

        let tokens = tokenize("$$", false);
        assert_eq!(tokens, vec![Token::text("$$")]);
    }

    #[test]
    fn test_overlong_name_reverts_to_text() {
        let long_name = "x".repeat(MAX_TOKEN_NAME_LENGTH + 1);
        let input = format!("${{{long_name}}}");
        let tokens = tokenize(&input, false);
        assert_eq!(tokens, vec![Token::text(input.clone())]);

        let max_name = "y".repeat(MAX_TOKEN_NAME_LENGTH);
        let input = format!("${{{max_name}}}");
        let tokens = tokenize(&input, false);
        assert_eq!(tokens, vec![reference(TokenType::Parameter, &max_name)]);
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        let tokens = tokenize("안녕 ${이름} 님", false);
        assert_eq!(
            tokens,
            vec![
                Token::text("안녕 "),
                reference(TokenType::Parameter, "이름"),
                Token::text(" 님"),
            ]
        );
    }

    #[test]
    fn test_trim_keeps_one_leading_newline() {
        let tokens = tokenize("  \r\n  aaa", true);
        assert_eq!(tokens, vec![Token::text("\naaa")]);

        let tokens = tokenize("   aaa   ", true);
        assert_eq!(tokens, vec![Token::text("aaa")]);

        let tokens = tokenize("aaa  \r\n  ", true);
        assert_eq!(tokens, vec![Token::text("aaa\n")]);
    }

    #[test]
    fn test_trim_only_touches_boundaries() {
        let tokens = tokenize("\n  ${a}  middle  ${b}  \n", true);
        assert_eq!(
            tokens,
            vec![
                Token::text("\n"),
                reference(TokenType::Parameter, "a"),
                Token::text("  middle  "),
                reference(TokenType::Parameter, "b"),
                Token::text("\n"),
            ]
        );
    }

    #[test]
    fn test_trim_drops_emptied_boundary_text() {
        let tokens = tokenize("   ${a}", true);
        assert_eq!(tokens, vec![reference(TokenType::Parameter, "a")]);

        let tokens = tokenize("${a}  \t ", true);
        assert_eq!(tokens, vec![reference(TokenType::Parameter, "a")]);

        let rendered = crate::expr::to_string(&tokenize("  ${a} x ${b}  ", true));
        assert_eq!(tokenize(&rendered, true), tokenize("  ${a} x ${b}  ", true));

        assert_eq!(tokenize(" \t ", true), vec![Token::text("")]);
    }

    #[test]
    fn test_optimize_trims_first_and_last() {
        let tokens = tokenize("  x ${a} y  ", false);
        let tokens = optimize(tokens);
        assert_eq!(
            tokens,
            vec![
                Token::text("x "),
                reference(TokenType::Parameter, "a"),
                Token::text(" y"),
            ]
        );
    }

    #[test]
    fn test_trim_helpers() {
        assert_eq!(trim_leading(""), "");
        assert_eq!(trim_leading("   "), "");
        assert_eq!(trim_leading(" \n "), "\n");
        assert_eq!(trim_trailing("a \r\n"), "a\n");
        assert_eq!(trim_trailing("a"), "a");
    }
}
