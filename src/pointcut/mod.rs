//! Pointcut matching: deciding whether a join point is selected by an aspect.
//!
//! A pointcut is an ordered list of include rules, each with its own exclude
//! list. Every rule carries a [`PointcutPattern`] over four axes of a
//! [`JoinPoint`]:
//!
//! | Axis | Separator |
//! |------|-----------|
//! | translet name | `/` |
//! | bean id | `.` |
//! | class name | `.` |
//! | method name | none |
//!
//! [`Pointcut::matches`] requires a join point value on every axis the rule
//! has a pattern for. [`Pointcut::exists`] is looser: an axis takes part only
//! when both its pattern and the join point value are present.
//!
//! How a single sub-pattern is compared with a candidate is left to the
//! strategy: [`WildcardPointcut`] for glob patterns and [`RegexpPointcut`] for
//! regular expressions. [`PointcutFactory`] picks one from a [`PointcutRule`].
//!
//! # Examples
//!
//! ```rust
//! use aspect_engine::pointcut::{JoinPoint, Pointcut, PointcutFactory, PointcutKind};
//! use aspect_engine::pointcut::{PointcutPatternRule, PointcutRule};
//!
//! let rule = PointcutRule::new(
//!     PointcutKind::Wildcard,
//!     vec![PointcutPatternRule::parse("/api/**")
//!         .with_exclude(PointcutPatternRule::parse("/api/admin/**"))],
//! );
//! let pointcut = PointcutFactory::create(&rule);
//!
//! let public = JoinPoint::translet("/api/users");
//! let admin = JoinPoint::translet("/api/admin/x");
//! assert!(pointcut.matches(&public).unwrap());
//! assert!(!pointcut.matches(&admin).unwrap());
//! assert!(pointcut.exists(&admin).unwrap());
//! ```

pub mod cache;
pub mod factory;
pub mod pattern;
pub mod regexp;
pub mod rule;
pub mod wildcard;

pub use cache::{CacheConfig, CacheStats, PatternCache};
pub use factory::{AnyPointcut, PointcutFactory};
pub use pattern::{combine_pattern, parse_pattern, PointcutPattern};
pub use regexp::RegexpPointcut;
pub use rule::{PointcutPatternRule, PointcutRule};
pub use wildcard::WildcardPointcut;

use crate::error::{AspectError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TRANSLET_NAME_SEPARATOR: char = '/';
pub const ID_SEPARATOR: char = '.';
pub const CLASS_NAME_SEPARATOR: char = '.';

/// Matching strategy of a pointcut.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointcutKind {
    #[default]
    Wildcard,
    Regexp,
}

impl PointcutKind {
    /// Resolve a strategy name, ignoring case.
    pub fn resolve(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("wildcard") {
            Some(Self::Wildcard)
        } else if name.eq_ignore_ascii_case("regexp") {
            Some(Self::Regexp)
        } else {
            None
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Wildcard => "wildcard",
            Self::Regexp => "regexp",
        }
    }
}

impl fmt::Display for PointcutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A candidate execution point. Absent values skip their axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct JoinPoint<'a> {
    pub translet_name: Option<&'a str>,
    pub bean_id: Option<&'a str>,
    pub class_name: Option<&'a str>,
    pub method_name: Option<&'a str>,
}

impl<'a> JoinPoint<'a> {
    pub fn new(
        translet_name: Option<&'a str>,
        bean_id: Option<&'a str>,
        class_name: Option<&'a str>,
        method_name: Option<&'a str>,
    ) -> Self {
        Self {
            translet_name,
            bean_id,
            class_name,
            method_name,
        }
    }

    /// A join point known only by its translet name.
    pub fn translet(translet_name: &'a str) -> Self {
        Self {
            translet_name: Some(translet_name),
            ..Default::default()
        }
    }

    /// A join point known only by its bean id.
    pub fn bean(bean_id: &'a str) -> Self {
        Self {
            bean_id: Some(bean_id),
            ..Default::default()
        }
    }

    pub fn with_translet_name(mut self, translet_name: &'a str) -> Self {
        self.translet_name = Some(translet_name);
        self
    }

    pub fn with_bean_id(mut self, bean_id: &'a str) -> Self {
        self.bean_id = Some(bean_id);
        self
    }

    pub fn with_class_name(mut self, class_name: &'a str) -> Self {
        self.class_name = Some(class_name);
        self
    }

    pub fn with_method_name(mut self, method_name: &'a str) -> Self {
        self.method_name = Some(method_name);
        self
    }
}

/// The include rules of a pointcut.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointcutRules {
    pattern_rules: Vec<PointcutPatternRule>,
    has_method_name_pattern: bool,
}

impl PointcutRules {
    pub fn new(pattern_rules: Vec<PointcutPatternRule>) -> Self {
        let has_method_name_pattern = pattern_rules.iter().any(|rule| {
            rule.pointcut_pattern()
                .is_some_and(|p| p.method_name_pattern().is_some())
        });
        Self {
            pattern_rules,
            has_method_name_pattern,
        }
    }

    pub fn pattern_rules(&self) -> &[PointcutPatternRule] {
        &self.pattern_rules
    }

    /// Returns true if any include rule targets method names, in which case
    /// method-level interception is needed.
    pub fn has_method_name_pattern(&self) -> bool {
        self.has_method_name_pattern
    }

    pub fn len(&self) -> usize {
        self.pattern_rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pattern_rules.is_empty()
    }
}

/// A predicate over join points.
///
/// Strategies implement the pattern hooks; rule evaluation is shared.
pub trait Pointcut: Send + Sync {
    fn rules(&self) -> &PointcutRules;

    /// Match `candidate` against one sub-pattern.
    fn pattern_matches(&self, pattern: &str, candidate: &str) -> Result<bool>;

    /// Match `candidate` against one sub-pattern whose segments are split by
    /// `separator`.
    fn pattern_matches_with_separator(
        &self,
        pattern: &str,
        candidate: &str,
        separator: char,
    ) -> Result<bool>;

    /// Drop compiled patterns.
    fn clear(&self);

    fn pattern_rules(&self) -> &[PointcutPatternRule] {
        self.rules().pattern_rules()
    }

    fn has_method_name_pattern(&self) -> bool {
        self.rules().has_method_name_pattern()
    }

    /// Returns true if the first include rule that selects `join_point` is not
    /// overridden by one of its excludes.
    ///
    /// A rule with a pattern on an axis the join point leaves empty does not
    /// select it.
    fn matches(&self, join_point: &JoinPoint<'_>) -> Result<bool> {
        for rule in self.pattern_rules() {
            if self.matches_rule(rule, join_point)? {
                for exclude in rule.exclude_pattern_rules() {
                    if self.matches_rule(exclude, join_point)? {
                        return Ok(false);
                    }
                }
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns true if any include rule selects `join_point`, ignoring excludes.
    fn exists(&self, join_point: &JoinPoint<'_>) -> Result<bool> {
        for rule in self.pattern_rules() {
            if self.exists_rule(rule, join_point)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn matches_rule(&self, rule: &PointcutPatternRule, join_point: &JoinPoint<'_>) -> Result<bool> {
        let pattern = rule.pointcut_pattern().ok_or_else(|| {
            AspectError::InvalidArgument("pointcut pattern rule has no pointcut pattern".to_string())
        })?;
        self.matches_pattern(pattern, join_point)
    }

    /// Like [`exists_pattern`](Self::exists_pattern), except that a pattern
    /// axis with no join point value fails the match.
    fn matches_pattern(&self, pattern: &PointcutPattern, join_point: &JoinPoint<'_>) -> Result<bool> {
        if pattern.translet_name_pattern().is_some() && join_point.translet_name.is_none()
            || pattern.bean_id_pattern().is_some() && join_point.bean_id.is_none()
            || pattern.class_name_pattern().is_some() && join_point.class_name.is_none()
            || pattern.method_name_pattern().is_some() && join_point.method_name.is_none()
        {
            return Ok(false);
        }
        self.exists_pattern(pattern, join_point)
    }

    fn exists_rule(&self, rule: &PointcutPatternRule, join_point: &JoinPoint<'_>) -> Result<bool> {
        let pattern = rule.pointcut_pattern().ok_or_else(|| {
            AspectError::InvalidArgument("pointcut pattern rule has no pointcut pattern".to_string())
        })?;
        self.exists_pattern(pattern, join_point)
    }

    fn exists_pattern(&self, pattern: &PointcutPattern, join_point: &JoinPoint<'_>) -> Result<bool> {
        if let (Some(p), Some(name)) = (pattern.translet_name_pattern(), join_point.translet_name) {
            if !self.pattern_matches_with_separator(p, name, TRANSLET_NAME_SEPARATOR)? {
                return Ok(false);
            }
        }
        if let (Some(p), Some(id)) = (pattern.bean_id_pattern(), join_point.bean_id) {
            if !self.pattern_matches_with_separator(p, id, ID_SEPARATOR)? {
                return Ok(false);
            }
        }
        if let (Some(p), Some(name)) = (pattern.class_name_pattern(), join_point.class_name) {
            if !self.pattern_matches_with_separator(p, name, CLASS_NAME_SEPARATOR)? {
                return Ok(false);
            }
        }
        if let (Some(p), Some(name)) = (pattern.method_name_pattern(), join_point.method_name) {
            if !self.pattern_matches(p, name)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Returns true if some include rule selects the bean and at least one of
    /// `method_names`. Translet patterns and excludes are not considered.
    fn exists_any_method(
        &self,
        bean_id: Option<&str>,
        class_name: Option<&str>,
        method_names: &[&str],
    ) -> Result<bool> {
        let bean = JoinPoint {
            bean_id,
            class_name,
            ..Default::default()
        };
        for rule in self.pattern_rules() {
            let pattern = rule.pointcut_pattern().ok_or_else(|| {
                AspectError::InvalidArgument(
                    "pointcut pattern rule has no pointcut pattern".to_string(),
                )
            })?;
            if !self.exists_pattern(pattern, &bean)? {
                continue;
            }
            let method_pattern = match pattern.method_name_pattern() {
                None => return Ok(true),
                Some(p) => p,
            };
            for method_name in method_names {
                if self.pattern_matches(method_pattern, method_name)? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Evaluate [`matches`](Self::matches) for every join point, in order.
    /// With `parallel` set the batch is split across the rayon pool.
    fn matches_batch(&self, join_points: &[JoinPoint<'_>], parallel: bool) -> Result<Vec<bool>> {
        if parallel {
            join_points
                .par_iter()
                .map(|join_point| self.matches(join_point))
                .collect()
        } else {
            join_points
                .iter()
                .map(|join_point| self.matches(join_point))
                .collect()
        }
    }
}
