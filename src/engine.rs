//! Primary aspect engine interface.
//!
//! This module provides the `PointcutEngine` struct that holds the pointcuts
//! of every registered aspect and answers which aspects advise a join point.

use crate::config::EngineConfig;
use crate::error::{AspectError, Result};
use crate::expr::{parse, Token};
use crate::pointcut::{AnyPointcut, JoinPoint, Pointcut, PointcutFactory, PointcutRule};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

/// One aspect declaration of an aspect document.
#[derive(Debug, Clone, Deserialize)]
pub struct AspectDefinition {
    pub id: String,
    #[serde(default)]
    pub pointcut: PointcutRule,
}

/// A YAML or JSON document declaring aspects and, optionally, the engine
/// configuration.
///
/// ```yaml
/// config:
///   cache:
///     max_size: 500
/// aspects:
///   - id: transactionAspect
///     pointcut:
///       type: wildcard
///       patterns:
///         - pattern: "/orders/**@*Service^save*"
///           exclude:
///             - pattern: "/orders/readonly/**"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct AspectDocument {
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub aspects: Vec<AspectDefinition>,
}

/// Aspect engine over a fixed set of named pointcuts.
///
/// Aspects are evaluated in declaration order, so results list aspect ids in
/// the order the aspects were added.
///
/// # Examples
///
/// ## Building from rules
/// ```rust,ignore
/// use aspect_engine::{EngineConfig, PointcutEngine};
/// use aspect_engine::pointcut::{JoinPoint, PointcutKind, PointcutRule};
///
/// let mut engine = PointcutEngine::new(EngineConfig::default())?;
/// engine.add_aspect(
///     "auditAspect",
///     &PointcutRule::from_patterns(PointcutKind::Wildcard, ["/admin/**"]),
/// )?;
///
/// let advised = engine.matching_aspects(&JoinPoint::translet("/admin/users"))?;
/// assert_eq!(advised, vec!["auditAspect"]);
/// ```
///
/// ## Loading an aspect document
/// ```rust,ignore
/// let engine = PointcutEngine::from_file("aspects.yaml")?;
/// if engine.needs_method_weaving() {
///     // install method interception
/// }
/// ```
#[derive(Debug)]
pub struct PointcutEngine {
    config: EngineConfig,
    aspects: IndexMap<String, AnyPointcut>,
}

impl PointcutEngine {
    /// Create an engine with no aspects.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            aspects: IndexMap::new(),
        })
    }

    /// Create an engine and register `aspects` in order.
    pub fn with_aspects<I, S>(config: EngineConfig, aspects: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, PointcutRule)>,
        S: Into<String>,
    {
        let mut engine = Self::new(config)?;
        for (id, rule) in aspects {
            engine.add_aspect(id, &rule)?;
        }
        debug!(
            aspects = engine.aspect_count(),
            method_weaving = engine.needs_method_weaving(),
            "pointcut engine ready"
        );
        Ok(engine)
    }

    pub fn from_document(document: AspectDocument) -> Result<Self> {
        let config = document.config.unwrap_or_default();
        Self::with_aspects(
            config,
            document
                .aspects
                .into_iter()
                .map(|aspect| (aspect.id, aspect.pointcut)),
        )
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::from_document(serde_yaml::from_str(yaml)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_document(serde_json::from_str(json)?)
    }

    /// Load an aspect document; the format follows the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(AspectError::ConfigError(format!(
                "unsupported aspect document: {}",
                path.display()
            ))),
        }
    }

    /// Register an aspect. Ids must be unique.
    pub fn add_aspect(&mut self, id: impl Into<String>, rule: &PointcutRule) -> Result<()> {
        let id = id.into();
        if self.aspects.contains_key(&id) {
            return Err(AspectError::ConfigError(format!(
                "duplicate aspect id '{id}'"
            )));
        }
        let pointcut = PointcutFactory::create_with_config(
            rule,
            self.config.default_pointcut_kind,
            &self.config.cache,
        );
        debug!(aspect = %id, kind = %pointcut.kind(), "registered aspect");
        self.aspects.insert(id, pointcut);
        Ok(())
    }

    /// Ids of the aspects whose pointcut matches `join_point`, in declaration
    /// order.
    pub fn matching_aspects(&self, join_point: &JoinPoint<'_>) -> Result<Vec<&str>> {
        let mut matched = Vec::new();
        for (id, pointcut) in &self.aspects {
            if pointcut.matches(join_point)? {
                matched.push(id.as_str());
            }
        }
        Ok(matched)
    }

    /// [`matching_aspects`](Self::matching_aspects) for many join points.
    pub fn matching_aspects_batch(
        &self,
        join_points: &[JoinPoint<'_>],
    ) -> Result<Vec<Vec<&str>>> {
        let parallel = self.config.parallel.should_parallelize(join_points.len());

        let mut results = vec![Vec::new(); join_points.len()];
        for (id, pointcut) in &self.aspects {
            let matches = pointcut.matches_batch(join_points, parallel)?;
            for (result, matched) in results.iter_mut().zip(matches) {
                if matched {
                    result.push(id.as_str());
                }
            }
        }
        Ok(results)
    }

    /// Returns true if any aspect matches `join_point`.
    pub fn is_advised(&self, join_point: &JoinPoint<'_>) -> Result<bool> {
        for pointcut in self.aspects.values() {
            if pointcut.matches(join_point)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns true if any aspect could match `join_point` once excludes are
    /// ignored.
    pub fn may_be_advised(&self, join_point: &JoinPoint<'_>) -> Result<bool> {
        for pointcut in self.aspects.values() {
            if pointcut.exists(join_point)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns true if some aspect selects at least one of the bean's methods,
    /// meaning the bean needs an interception proxy.
    pub fn needs_proxy(
        &self,
        bean_id: Option<&str>,
        class_name: Option<&str>,
        method_names: &[&str],
    ) -> Result<bool> {
        for pointcut in self.aspects.values() {
            if pointcut.exists_any_method(bean_id, class_name, method_names)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Returns true if any aspect targets method names.
    pub fn needs_method_weaving(&self) -> bool {
        self.aspects
            .values()
            .any(|pointcut| pointcut.has_method_name_pattern())
    }

    pub fn clear_caches(&self) {
        for pointcut in self.aspects.values() {
            pointcut.clear();
        }
    }

    pub fn aspect_count(&self) -> usize {
        self.aspects.len()
    }

    pub fn aspect(&self, id: &str) -> Option<&AnyPointcut> {
        self.aspects.get(id)
    }

    pub fn aspect_ids(&self) -> impl Iterator<Item = &str> {
        self.aspects.keys().map(String::as_str)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parse an expression with the configured tokenizer settings.
    pub fn parse_expression(&self, expression: &str) -> Vec<Token> {
        parse(expression, self.config.tokenizer.optimize_tokens)
    }
}
