//! Strategy selection for pointcut rules.

use super::cache::CacheConfig;
use super::regexp::RegexpPointcut;
use super::wildcard::WildcardPointcut;
use super::{Pointcut, PointcutKind, PointcutRule, PointcutRules};
use crate::error::Result;
use tracing::debug;

/// A pointcut of either strategy.
#[derive(Debug)]
pub enum AnyPointcut {
    Wildcard(WildcardPointcut),
    Regexp(RegexpPointcut),
}

impl AnyPointcut {
    pub fn kind(&self) -> PointcutKind {
        match self {
            Self::Wildcard(_) => PointcutKind::Wildcard,
            Self::Regexp(_) => PointcutKind::Regexp,
        }
    }

    pub fn cache_size(&self) -> usize {
        match self {
            Self::Wildcard(pointcut) => pointcut.cache_size(),
            Self::Regexp(pointcut) => pointcut.cache_size(),
        }
    }
}

impl Pointcut for AnyPointcut {
    fn rules(&self) -> &PointcutRules {
        match self {
            Self::Wildcard(pointcut) => pointcut.rules(),
            Self::Regexp(pointcut) => pointcut.rules(),
        }
    }

    fn pattern_matches(&self, pattern: &str, candidate: &str) -> Result<bool> {
        match self {
            Self::Wildcard(pointcut) => pointcut.pattern_matches(pattern, candidate),
            Self::Regexp(pointcut) => pointcut.pattern_matches(pattern, candidate),
        }
    }

    fn pattern_matches_with_separator(
        &self,
        pattern: &str,
        candidate: &str,
        separator: char,
    ) -> Result<bool> {
        match self {
            Self::Wildcard(pointcut) => {
                pointcut.pattern_matches_with_separator(pattern, candidate, separator)
            }
            Self::Regexp(pointcut) => {
                pointcut.pattern_matches_with_separator(pattern, candidate, separator)
            }
        }
    }

    fn clear(&self) {
        match self {
            Self::Wildcard(pointcut) => pointcut.clear(),
            Self::Regexp(pointcut) => pointcut.clear(),
        }
    }
}

pub struct PointcutFactory;

impl PointcutFactory {
    /// Build the strategy named by `rule`. Anything but regexp is a wildcard
    /// pointcut.
    pub fn create(rule: &PointcutRule) -> AnyPointcut {
        Self::create_with_config(rule, PointcutKind::default(), &CacheConfig::default())
    }

    /// Like [`create`](Self::create); `default_kind` applies when the rule
    /// names no strategy.
    pub fn create_with_config(
        rule: &PointcutRule,
        default_kind: PointcutKind,
        cache_config: &CacheConfig,
    ) -> AnyPointcut {
        let kind = rule.kind.unwrap_or(default_kind);
        debug!(
            %kind,
            rules = rule.pattern_rules.len(),
            "creating pointcut"
        );
        let pattern_rules = rule.pattern_rules.clone();
        match kind {
            PointcutKind::Regexp => AnyPointcut::Regexp(RegexpPointcut::with_cache_config(
                pattern_rules,
                cache_config.clone(),
            )),
            PointcutKind::Wildcard => AnyPointcut::Wildcard(WildcardPointcut::with_cache_config(
                pattern_rules,
                cache_config.clone(),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pointcut::{JoinPoint, PointcutPatternRule};

    #[test]
    fn test_create_selects_strategy() {
        let regexp = PointcutRule::from_patterns(PointcutKind::Regexp, ["/a/.*"]);
        let pointcut = PointcutFactory::create(&regexp);
        assert_eq!(pointcut.kind(), PointcutKind::Regexp);
        assert!(pointcut.matches(&JoinPoint::translet("/a/b/c")).unwrap());

        let wildcard = PointcutRule::from_patterns(PointcutKind::Wildcard, ["/a/*"]);
        let pointcut = PointcutFactory::create(&wildcard);
        assert_eq!(pointcut.kind(), PointcutKind::Wildcard);
        assert!(!pointcut.matches(&JoinPoint::translet("/a/b/c")).unwrap());
    }

    #[test]
    fn test_unnamed_kind_uses_default() {
        let rule = PointcutRule {
            kind: None,
            pattern_rules: vec![PointcutPatternRule::parse("/a")],
        };
        assert_eq!(PointcutFactory::create(&rule).kind(), PointcutKind::Wildcard);

        let pointcut =
            PointcutFactory::create_with_config(&rule, PointcutKind::Regexp, &CacheConfig::default());
        assert_eq!(pointcut.kind(), PointcutKind::Regexp);
    }

    #[test]
    fn test_any_pointcut_delegates_cache() {
        let rule = PointcutRule::from_patterns(PointcutKind::Wildcard, ["/a/*"]);
        let pointcut = PointcutFactory::create(&rule);
        pointcut.matches(&JoinPoint::translet("/a/b")).unwrap();
        assert_eq!(pointcut.cache_size(), 1);
        pointcut.clear();
        assert_eq!(pointcut.cache_size(), 0);
        assert!(!pointcut.has_method_name_pattern());
    }
}
