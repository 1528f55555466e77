//! Pointcut pattern strings: `[translet][@(beanId|class:className)][^method]`.

use std::collections::hash_map::DefaultHasher;
use std::convert::Infallible;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

pub const POINTCUT_BEAN_CLASS_DELIMITER: char = '@';
pub const POINTCUT_METHOD_NAME_DELIMITER: char = '^';
pub const CLASS_DIRECTIVE_PREFIX: &str = "class:";

/// Four independent sub-patterns over a join point. A `None` axis matches
/// anything.
#[derive(Debug, Clone)]
pub struct PointcutPattern {
    translet_name_pattern: Option<String>,
    bean_id_pattern: Option<String>,
    class_name_pattern: Option<String>,
    method_name_pattern: Option<String>,
    hash: u64,
}

impl PointcutPattern {
    pub fn new(
        translet_name_pattern: Option<&str>,
        bean_id_pattern: Option<&str>,
        class_name_pattern: Option<&str>,
        method_name_pattern: Option<&str>,
    ) -> Self {
        Self::from_parts(
            translet_name_pattern.map(str::to_string),
            bean_id_pattern.map(str::to_string),
            class_name_pattern.map(str::to_string),
            method_name_pattern.map(str::to_string),
        )
    }

    fn from_parts(
        translet_name_pattern: Option<String>,
        bean_id_pattern: Option<String>,
        class_name_pattern: Option<String>,
        method_name_pattern: Option<String>,
    ) -> Self {
        let mut hasher = DefaultHasher::new();
        translet_name_pattern.hash(&mut hasher);
        bean_id_pattern.hash(&mut hasher);
        class_name_pattern.hash(&mut hasher);
        method_name_pattern.hash(&mut hasher);
        Self {
            translet_name_pattern,
            bean_id_pattern,
            class_name_pattern,
            method_name_pattern,
            hash: hasher.finish(),
        }
    }

    pub fn translet_name_pattern(&self) -> Option<&str> {
        self.translet_name_pattern.as_deref()
    }

    pub fn bean_id_pattern(&self) -> Option<&str> {
        self.bean_id_pattern.as_deref()
    }

    pub fn class_name_pattern(&self) -> Option<&str> {
        self.class_name_pattern.as_deref()
    }

    pub fn method_name_pattern(&self) -> Option<&str> {
        self.method_name_pattern.as_deref()
    }

    /// Render this pattern back to its string form.
    pub fn combine(&self) -> String {
        combine_pattern(
            self.translet_name_pattern(),
            self.bean_id_pattern(),
            self.class_name_pattern(),
            self.method_name_pattern(),
        )
    }
}

impl PartialEq for PointcutPattern {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
            && self.translet_name_pattern == other.translet_name_pattern
            && self.bean_id_pattern == other.bean_id_pattern
            && self.class_name_pattern == other.class_name_pattern
            && self.method_name_pattern == other.method_name_pattern
    }
}

impl Eq for PointcutPattern {}

impl Hash for PointcutPattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.hash);
    }
}

impl fmt::Display for PointcutPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.combine())
    }
}

impl FromStr for PointcutPattern {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_pattern(s))
    }
}

/// Build a pattern string from its parts.
///
/// Empty parts are treated as absent. A bean id wins over a class name.
/// A method pattern without a bean or class segment is written as `@^method`
/// so that it parses back as a method pattern.
pub fn combine_pattern(
    translet_name: Option<&str>,
    bean_id: Option<&str>,
    class_name: Option<&str>,
    method_name: Option<&str>,
) -> String {
    let translet_name = present(translet_name);
    let bean_id = present(bean_id);
    let class_name = present(class_name);
    let method_name = present(method_name);

    let mut sb = String::new();
    if let Some(translet_name) = translet_name {
        sb.push_str(translet_name);
    }
    if let Some(bean_id) = bean_id {
        sb.push(POINTCUT_BEAN_CLASS_DELIMITER);
        sb.push_str(bean_id);
    } else if let Some(class_name) = class_name {
        sb.push(POINTCUT_BEAN_CLASS_DELIMITER);
        sb.push_str(CLASS_DIRECTIVE_PREFIX);
        sb.push_str(class_name);
    } else if method_name.is_some() {
        sb.push(POINTCUT_BEAN_CLASS_DELIMITER);
    }
    if let Some(method_name) = method_name {
        sb.push(POINTCUT_METHOD_NAME_DELIMITER);
        sb.push_str(method_name);
    }
    sb
}

/// Treat an empty part as absent.
pub(crate) fn present(part: Option<&str>) -> Option<&str> {
    part.filter(|s| !s.is_empty())
}

/// Parse a pattern string. Never fails; the first `@` and the first `^`
/// after it are the delimiters, and empty segments become `None`.
pub fn parse_pattern(pattern: &str) -> PointcutPattern {
    let (translet, bean_class) = match pattern.find(POINTCUT_BEAN_CLASS_DELIMITER) {
        None => (pattern, None),
        Some(index) => (&pattern[..index], Some(&pattern[index + 1..])),
    };

    let (bean_class, method) = match bean_class {
        None => (None, None),
        Some(segment) => match segment.find(POINTCUT_METHOD_NAME_DELIMITER) {
            None => (Some(segment), None),
            Some(0) => (None, Some(&segment[1..])),
            Some(index) => (Some(&segment[..index]), Some(&segment[index + 1..])),
        },
    };

    let non_empty = |s: &str| (!s.is_empty()).then(|| s.to_string());

    let (bean_id, class_name) = match bean_class {
        None => (None, None),
        Some(segment) => match segment.strip_prefix(CLASS_DIRECTIVE_PREFIX) {
            Some(class_name) => (None, non_empty(class_name)),
            None => (non_empty(segment), None),
        },
    };

    PointcutPattern::from_parts(
        non_empty(translet),
        bean_id,
        class_name,
        method.and_then(non_empty),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_pattern() {
        let p = parse_pattern("/orders/**@myService^save");
        assert_eq!(p.translet_name_pattern(), Some("/orders/**"));
        assert_eq!(p.bean_id_pattern(), Some("myService"));
        assert_eq!(p.class_name_pattern(), None);
        assert_eq!(p.method_name_pattern(), Some("save"));
    }

    #[test]
    fn test_parse_class_pattern() {
        let p = parse_pattern("@class:com.x.Y^run");
        assert_eq!(p.translet_name_pattern(), None);
        assert_eq!(p.bean_id_pattern(), None);
        assert_eq!(p.class_name_pattern(), Some("com.x.Y"));
        assert_eq!(p.method_name_pattern(), Some("run"));
    }

    #[test]
    fn test_parse_method_only() {
        let p = parse_pattern("@^get*");
        assert_eq!(p, PointcutPattern::new(None, None, None, Some("get*")));
    }

    #[test]
    fn test_parse_without_bean_delimiter() {
        // no '@' means the whole string is a translet pattern
        let p = parse_pattern("/a^b");
        assert_eq!(p.translet_name_pattern(), Some("/a^b"));
        assert_eq!(p.method_name_pattern(), None);
    }

    #[test]
    fn test_parse_first_delimiter_wins() {
        let p = parse_pattern("/a@b@c^d^e");
        assert_eq!(p.translet_name_pattern(), Some("/a"));
        assert_eq!(p.bean_id_pattern(), Some("b@c"));
        assert_eq!(p.method_name_pattern(), Some("d^e"));
    }

    #[test]
    fn test_parse_empty() {
        let p = parse_pattern("");
        assert_eq!(p, PointcutPattern::new(None, None, None, None));
        assert_eq!(parse_pattern("@class:"), p);
    }

    #[test]
    fn test_combine() {
        assert_eq!(
            combine_pattern(Some("/a"), Some("bean"), Some("ignored"), Some("m")),
            "/a@bean^m"
        );
        assert_eq!(
            combine_pattern(None, None, Some("com.x.Y"), None),
            "@class:com.x.Y"
        );
        assert_eq!(combine_pattern(None, None, None, Some("save")), "@^save");
        assert_eq!(combine_pattern(Some(""), None, Some(""), None), "");
    }

    #[test]
    fn test_canonical_round_trip() {
        for s in [
            "/orders/**@myService^save",
            "@class:com.x.Y^run",
            "@^run",
            "/a/*",
            "@bean",
        ] {
            assert_eq!(parse_pattern(s).combine(), s);
        }
    }

    #[test]
    fn test_equality_and_hash() {
        use std::collections::HashSet;

        let a: PointcutPattern = "/a@b".parse().unwrap();
        let b = PointcutPattern::new(Some("/a"), Some("b"), None, None);
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
        assert!(!set.contains(&parse_pattern("/a@c")));
    }

    #[test]
    fn test_display() {
        let p = PointcutPattern::new(Some("/x"), None, None, Some("run"));
        assert_eq!(p.to_string(), "/x@^run");
    }
}
