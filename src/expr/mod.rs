//! Expression token engine.
//!
//! Configuration values may embed references that are resolved at runtime:
//!
//! | Form | Meaning |
//! |------|---------|
//! | `#{beanId}` | bean lookup |
//! | `~{templateId}` | template rendering |
//! | `${name}` | request parameter |
//! | `@{name}` | request attribute |
//! | `%{name}` | environment property |
//!
//! A body reads `name[^getter][:default]`, or for directive keywords
//! `directive:value[^getter][:default]`. This module only lexes expressions;
//! resolving tokens against a runtime context is left to the caller.
//!
//! ```rust
//! use aspect_engine::expr::{parse, TokenType};
//!
//! let tokens = parse("Hello ${name:guest}!", false);
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].token_type(), TokenType::Parameter);
//! assert_eq!(tokens[1].default_value(), Some("guest"));
//! ```

pub mod parser;
pub mod token;
pub mod tokenizer;
pub mod types;

pub use parser::{make_tokens, parse, parse_as_list, parse_as_map, parse_path_safely, to_string};
pub use token::{AlternativeValue, Token};
pub use tokenizer::{optimize, tokenize, MAX_TOKEN_NAME_LENGTH};
pub use types::{is_token_symbol, TokenDirectiveType, TokenType};
