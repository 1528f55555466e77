//! # Aspect Engine
//!
//! Expression tokenizing and pointcut matching for aspect-oriented request
//! processing.
//!
//! The crate has two halves:
//!
//! - [`expr`] turns template expressions such as `Hello ${name}` or
//!   `%{classpath:app.properties^db.url}` into typed [`Token`]s and back.
//! - [`pointcut`] decides whether a join point (translet name, bean id, class
//!   name, method name) is selected by an aspect's include and exclude
//!   patterns, using either wildcard globs or regular expressions.
//!
//! [`PointcutEngine`] ties the pointcuts of many aspects together behind one
//! configuration.
//!
//! ## Quick Start
//!
//! ### Parsing Expressions
//!
//! ```rust
//! use aspect_engine::expr::{parse, to_string, TokenType};
//!
//! let tokens = parse("Hello ${name:guest}!", false);
//! assert_eq!(tokens.len(), 3);
//! assert_eq!(tokens[1].token_type(), TokenType::Parameter);
//! assert_eq!(tokens[1].default_value(), Some("guest"));
//! assert_eq!(to_string(&tokens), "Hello ${name:guest}!");
//! ```
//!
//! ### Matching Join Points
//!
//! ```rust
//! use aspect_engine::PointcutEngine;
//! use aspect_engine::pointcut::JoinPoint;
//!
//! let engine = PointcutEngine::from_yaml_str(r#"
//! aspects:
//!   - id: transactionAspect
//!     pointcut:
//!       patterns:
//!         - pattern: "/orders/**@*Service^save*"
//!           exclude:
//!             - pattern: "/orders/readonly/**"
//! "#)?;
//!
//! let jp = JoinPoint::translet("/orders/42")
//!     .with_bean_id("orderService")
//!     .with_method_name("saveOrder");
//! assert_eq!(engine.matching_aspects(&jp)?, vec!["transactionAspect"]);
//! assert!(engine.needs_method_weaving());
//! # Ok::<(), aspect_engine::AspectError>(())
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (strategy selection, pattern compiles,
//! cache eviction) and never installs a subscriber.

pub mod config;
pub mod engine;
pub mod error;
pub mod expr;
pub mod pointcut;
pub mod wildcard;

// Primary engine interface
pub use engine::{AspectDefinition, AspectDocument, PointcutEngine};

// Configuration
pub use config::{EngineConfig, ParallelConfig, TokenizerConfig};

// Core types and errors
pub use error::{AspectError, Result};
pub use expr::{Token, TokenDirectiveType, TokenType};

// Pointcut matching
pub use pointcut::{
    AnyPointcut, CacheConfig, CacheStats, JoinPoint, Pointcut, PointcutFactory, PointcutKind,
    PointcutPattern, PointcutPatternRule, PointcutRule, RegexpPointcut, WildcardPointcut,
};
pub use wildcard::WildcardPattern;
