//! Glob pattern strategy.

use super::cache::{CacheConfig, PatternCache};
use super::{Pointcut, PointcutPatternRule, PointcutRules};
use crate::error::Result;
use crate::wildcard::WildcardPattern;
use std::sync::Arc;
use tracing::trace;

pub const ALTERNATIVE_DELIMITER: char = '|';

/// Cache key: the glob text and the separator it was compiled for.
pub type WildcardKey = (String, Option<char>);

/// Pointcut whose sub-patterns are wildcard globs, optionally with
/// `|`-separated alternatives.
#[derive(Debug)]
pub struct WildcardPointcut {
    rules: PointcutRules,
    cache: PatternCache<WildcardKey, Arc<WildcardPattern>>,
}

impl WildcardPointcut {
    pub fn new(pattern_rules: Vec<PointcutPatternRule>) -> Self {
        Self::with_cache_config(pattern_rules, CacheConfig::default())
    }

    pub fn with_cache_config(pattern_rules: Vec<PointcutPatternRule>, config: CacheConfig) -> Self {
        Self {
            rules: PointcutRules::new(pattern_rules),
            cache: PatternCache::with_config(config),
        }
    }

    /// Number of compiled globs currently cached.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn cache(&self) -> &PatternCache<WildcardKey, Arc<WildcardPattern>> {
        &self.cache
    }

    fn matches_alternatives(&self, pattern: &str, candidate: &str, separator: Option<char>) -> bool {
        if pattern.contains(ALTERNATIVE_DELIMITER) {
            pattern
                .split(ALTERNATIVE_DELIMITER)
                .filter(|alternative| !alternative.is_empty())
                .any(|alternative| self.matches_one(alternative, candidate, separator))
        } else {
            self.matches_one(pattern, candidate, separator)
        }
    }

    fn matches_one(&self, pattern: &str, candidate: &str, separator: Option<char>) -> bool {
        if !WildcardPattern::has_wildcards(pattern) {
            return pattern == candidate;
        }
        let key = (pattern.to_string(), separator);
        let compiled = self.cache.get_or_insert_with(&key, || {
            trace!(pattern, ?separator, "compiling wildcard pattern");
            Arc::new(match separator {
                Some(separator) => WildcardPattern::compile_with_separator(pattern, separator),
                None => WildcardPattern::compile(pattern),
            })
        });
        compiled.matches(candidate)
    }
}

impl Pointcut for WildcardPointcut {
    fn rules(&self) -> &PointcutRules {
        &self.rules
    }

    fn pattern_matches(&self, pattern: &str, candidate: &str) -> Result<bool> {
        Ok(self.matches_alternatives(pattern, candidate, None))
    }

    fn pattern_matches_with_separator(
        &self,
        pattern: &str,
        candidate: &str,
        separator: char,
    ) -> Result<bool> {
        Ok(self.matches_alternatives(pattern, candidate, Some(separator)))
    }

    fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcut::JoinPoint;

    fn pointcut(patterns: &[&str]) -> WildcardPointcut {
        WildcardPointcut::new(patterns.iter().map(|p| PointcutPatternRule::parse(p)).collect())
    }

    #[test]
    fn test_alternatives() {
        let pc = pointcut(&[]);
        assert!(pc.pattern_matches_with_separator("/a/*|/b/*", "/a/x", '/').unwrap());
        assert!(pc.pattern_matches_with_separator("/a/*|/b/*", "/b/y", '/').unwrap());
        assert!(!pc.pattern_matches_with_separator("/a/*|/b/*", "/c/z", '/').unwrap());
    }

    #[test]
    fn test_empty_alternatives_are_ignored() {
        let pc = pointcut(&[]);
        assert!(pc.pattern_matches("|save||load|", "load").unwrap());
        assert!(!pc.pattern_matches("||", "").unwrap());
    }

    #[test]
    fn test_literal_fast_path_skips_cache() {
        let pc = pointcut(&[]);
        assert!(pc.pattern_matches_with_separator("/exact", "/exact", '/').unwrap());
        assert!(!pc.pattern_matches_with_separator("/exact", "/exact/more", '/').unwrap());
        assert_eq!(pc.cache_size(), 0);
    }

    #[test]
    fn test_escaped_literal_matches_unescaped_candidate() {
        let pc = pointcut(&[]);
        assert!(pc.pattern_matches_with_separator("a\\.b", "a.b", '.').unwrap());
        assert!(!pc.pattern_matches_with_separator("a\\.b", "a\\.b", '.').unwrap());
        assert!(pc.pattern_matches_with_separator("a\\.b*", "a.bc", '.').unwrap());
        assert!(pc.pattern_matches("save\\*", "save*").unwrap());
        assert!(!pc.pattern_matches("save\\*", "saveAll").unwrap());
    }

    #[test]
    fn test_cache_key_includes_separator() {
        let pc = pointcut(&[]);
        assert!(!pc.pattern_matches_with_separator("a.*", "a.b.c", '.').unwrap());
        assert!(pc.pattern_matches("a.*", "a.b.c").unwrap());
        assert_eq!(pc.cache_size(), 2);

        assert!(pc.pattern_matches("a.*", "a.x").unwrap());
        assert_eq!(pc.cache_size(), 2);
        assert_eq!(pc.cache().stats().hits, 1);

        pc.clear();
        assert_eq!(pc.cache_size(), 0);
    }

    #[test]
    fn test_join_point_matching() {
        let pc = pointcut(&["/orders/**@order*Service^save*"]);
        let jp = JoinPoint::translet("/orders/2024/01")
            .with_bean_id("orderPaymentService")
            .with_method_name("saveAll");
        assert!(pc.matches(&jp).unwrap());

        let nested_bean = jp.with_bean_id("order.sub.Service");
        assert!(!pc.matches(&nested_bean).unwrap());
    }
}
