//! Regular expression strategy.

use super::cache::{CacheConfig, PatternCache};
use super::{Pointcut, PointcutPatternRule, PointcutRules};
use crate::error::{AspectError, Result};
use regex::Regex;
use std::sync::Arc;
use tracing::{trace, warn};

/// Pointcut whose sub-patterns are regular expressions matched against the
/// whole candidate. Separators carry no meaning here.
#[derive(Debug)]
pub struct RegexpPointcut {
    rules: PointcutRules,
    cache: PatternCache<String, Arc<Regex>>,
}

impl RegexpPointcut {
    pub fn new(pattern_rules: Vec<PointcutPatternRule>) -> Self {
        Self::with_cache_config(pattern_rules, CacheConfig::default())
    }

    pub fn with_cache_config(pattern_rules: Vec<PointcutPatternRule>, config: CacheConfig) -> Self {
        Self {
            rules: PointcutRules::new(pattern_rules),
            cache: PatternCache::with_config(config),
        }
    }

    /// Number of compiled expressions currently cached.
    pub fn cache_size(&self) -> usize {
        self.cache.len()
    }

    pub fn cache(&self) -> &PatternCache<String, Arc<Regex>> {
        &self.cache
    }

    fn compiled(&self, pattern: &str) -> Result<Arc<Regex>> {
        self.cache.get_or_try_insert_with(pattern, || {
            trace!(pattern, "compiling regexp pattern");
            // anchored so that only a full match counts
            Regex::new(&format!("^(?:{pattern})$"))
                .map(Arc::new)
                .map_err(|e| {
                    warn!(pattern, error = %e, "invalid regexp pattern");
                    AspectError::InvalidRegex(format!("Pattern '{}': {}", pattern, e))
                })
        })
    }
}

impl Pointcut for RegexpPointcut {
    fn rules(&self) -> &PointcutRules {
        &self.rules
    }

    fn pattern_matches(&self, pattern: &str, candidate: &str) -> Result<bool> {
        Ok(self.compiled(pattern)?.is_match(candidate))
    }

    fn pattern_matches_with_separator(
        &self,
        pattern: &str,
        candidate: &str,
        _separator: char,
    ) -> Result<bool> {
        self.pattern_matches(pattern, candidate)
    }

    fn clear(&self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcut::JoinPoint;

    #[test]
    fn test_full_match_only() {
        let pc = RegexpPointcut::new(Vec::new());
        assert!(pc.pattern_matches("ab.*", "abc").unwrap());
        assert!(!pc.pattern_matches("ab.*", "xabc").unwrap());
        assert!(!pc.pattern_matches("a|b", "ab").unwrap());
        assert!(pc.pattern_matches("a|b", "b").unwrap());
    }

    #[test]
    fn test_separator_is_ignored() {
        let pc = RegexpPointcut::new(Vec::new());
        assert!(pc.pattern_matches_with_separator("/a/.*", "/a/b/c", '/').unwrap());
        assert_eq!(pc.cache_size(), 1);
    }

    #[test]
    fn test_invalid_regex() {
        let pc = RegexpPointcut::new(Vec::new());
        let result = pc.pattern_matches("(unclosed", "x");
        assert!(matches!(result, Err(AspectError::InvalidRegex(_))));
        assert_eq!(pc.cache_size(), 0);
    }

    #[test]
    fn test_compiled_patterns_are_cached() {
        let pc = RegexpPointcut::new(Vec::new());
        pc.pattern_matches("get[A-Z].*", "getName").unwrap();
        pc.pattern_matches("get[A-Z].*", "getAge").unwrap();
        assert_eq!(pc.cache_size(), 1);
        assert_eq!(pc.cache().stats().compilations, 1);

        pc.clear();
        assert_eq!(pc.cache_size(), 0);
    }

    #[test]
    fn test_join_point_matching() {
        let pc = RegexpPointcut::new(vec![PointcutPatternRule::parse(
            "/orders/.*@class:com\\.shop\\..*Service^(save|update).*",
        )]);
        let jp = JoinPoint::translet("/orders/1")
            .with_class_name("com.shop.OrderService")
            .with_method_name("updateStatus");
        assert!(pc.matches(&jp).unwrap());
        assert!(!pc.matches(&jp.with_method_name("delete")).unwrap());
    }
}
