//! Pointcut rule objects: include patterns with their own exclude lists.

use super::pattern::{parse_pattern, present, PointcutPattern, CLASS_DIRECTIVE_PREFIX};
use super::PointcutKind;
use crate::error::AspectError;
use serde::Deserialize;

/// One include (or exclude) entry of a pointcut.
///
/// Deserializes from either form:
///
/// ```yaml
/// - pattern: "/orders/**@orderService^save*"
///   exclude:
///     - pattern: "/orders/internal/**"
/// - translet: /api/**
///   bean: "class:com.example.*Service"
///   method: get*
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "RawPatternRule")]
pub struct PointcutPatternRule {
    pattern_string: Option<String>,
    pointcut_pattern: Option<PointcutPattern>,
    exclude_pattern_rules: Vec<PointcutPatternRule>,
}

impl PointcutPatternRule {
    /// Parse a pattern string into a rule with no excludes.
    pub fn parse(pattern: &str) -> Self {
        Self {
            pattern_string: Some(pattern.to_string()),
            pointcut_pattern: Some(parse_pattern(pattern)),
            exclude_pattern_rules: Vec::new(),
        }
    }

    pub fn from_pattern(pattern: PointcutPattern) -> Self {
        Self {
            pattern_string: None,
            pointcut_pattern: Some(pattern),
            exclude_pattern_rules: Vec::new(),
        }
    }

    /// Build a rule from separate parts. `bean` may carry the `class:` prefix
    /// to target a class name instead of a bean id.
    pub fn new_instance(translet: Option<&str>, bean: Option<&str>, method: Option<&str>) -> Self {
        let (bean_id, class_name) = match present(bean) {
            None => (None, None),
            Some(bean) => match bean.strip_prefix(CLASS_DIRECTIVE_PREFIX) {
                Some(class_name) => (None, present(Some(class_name))),
                None => (Some(bean), None),
            },
        };
        Self::from_pattern(PointcutPattern::new(
            present(translet),
            bean_id,
            class_name,
            present(method),
        ))
    }

    pub fn with_exclude(mut self, exclude: PointcutPatternRule) -> Self {
        self.exclude_pattern_rules.push(exclude);
        self
    }

    /// The source pattern string, when the rule was parsed from one.
    pub fn pattern_string(&self) -> Option<&str> {
        self.pattern_string.as_deref()
    }

    pub fn pointcut_pattern(&self) -> Option<&PointcutPattern> {
        self.pointcut_pattern.as_ref()
    }

    pub fn exclude_pattern_rules(&self) -> &[PointcutPatternRule] {
        &self.exclude_pattern_rules
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPatternRule {
    pattern: Option<String>,
    translet: Option<String>,
    bean: Option<String>,
    method: Option<String>,
    #[serde(default)]
    exclude: Vec<PointcutPatternRule>,
}

impl TryFrom<RawPatternRule> for PointcutPatternRule {
    type Error = AspectError;

    fn try_from(raw: RawPatternRule) -> Result<Self, Self::Error> {
        let rule = match (raw.pattern, raw.translet, raw.bean, raw.method) {
            (Some(pattern), None, None, None) => Self::parse(&pattern),
            (None, None, None, None) => {
                return Err(AspectError::InvalidArgument(
                    "pattern rule needs `pattern` or one of `translet`, `bean`, `method`"
                        .to_string(),
                ))
            }
            (None, translet, bean, method) => {
                Self::new_instance(translet.as_deref(), bean.as_deref(), method.as_deref())
            }
            (Some(_), _, _, _) => {
                return Err(AspectError::InvalidArgument(
                    "`pattern` cannot be combined with `translet`, `bean` or `method`".to_string(),
                ))
            }
        };
        Ok(Self {
            exclude_pattern_rules: raw.exclude,
            ..rule
        })
    }
}

/// A pointcut declaration: the matching strategy plus its include rules.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PointcutRule {
    /// Strategy name; `None` defers to the engine default.
    #[serde(rename = "type", default)]
    pub kind: Option<PointcutKind>,
    #[serde(rename = "patterns", default)]
    pub pattern_rules: Vec<PointcutPatternRule>,
}

impl PointcutRule {
    pub fn new(kind: PointcutKind, pattern_rules: Vec<PointcutPatternRule>) -> Self {
        Self {
            kind: Some(kind),
            pattern_rules,
        }
    }

    /// Parse each string as an include rule.
    pub fn from_patterns<I, S>(kind: PointcutKind, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::new(
            kind,
            patterns
                .into_iter()
                .map(|p| PointcutPatternRule::parse(p.as_ref()))
                .collect(),
        )
    }
}
