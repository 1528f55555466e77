//! Unified configuration for the aspect engine.
//!
//! Every section is serde-deserializable with all fields defaulted, so a
//! configuration file only needs to name what it changes:
//!
//! ```yaml
//! cache:
//!   max_size: 5000
//! parallel:
//!   min_batch_size_for_parallelism: 64
//! default_pointcut_kind: regexp
//! ```
//!
//! Presets cover the common deployments and `with_*` builders adjust single
//! knobs.
//!
//! # Example
//! ```rust,ignore
//! use aspect_engine::config::EngineConfig;
//! use aspect_engine::pointcut::PointcutKind;
//!
//! let config = EngineConfig::new()
//!     .with_cache_size(2000)
//!     .with_parallel_processing(true)
//!     .with_default_pointcut_kind(PointcutKind::Regexp);
//! config.validate()?;
//! ```

use crate::error::{AspectError, Result};
use crate::pointcut::cache::CacheConfig;
use crate::pointcut::PointcutKind;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Expression parsing defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Trim boundary whitespace of parsed expressions.
    pub optimize_tokens: bool,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            optimize_tokens: true,
        }
    }
}

/// Configuration for batch matching of join points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Evaluate large batches on the rayon thread pool.
    pub enable_batch_parallelism: bool,
    /// Minimum batch size before work is split across threads.
    pub min_batch_size_for_parallelism: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enable_batch_parallelism: false,
            min_batch_size_for_parallelism: 256,
        }
    }
}

impl ParallelConfig {
    /// Returns true if a batch of `len` join points should run in parallel.
    pub fn should_parallelize(&self, len: usize) -> bool {
        self.enable_batch_parallelism && len >= self.min_batch_size_for_parallelism
    }
}

/// Aspect engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Compiled pattern cache configuration
    pub cache: CacheConfig,
    /// Expression parsing configuration
    pub tokenizer: TokenizerConfig,
    /// Batch matching configuration
    pub parallel: ParallelConfig,
    /// Strategy used when a pointcut rule does not name one
    pub default_pointcut_kind: PointcutKind,
}

impl EngineConfig {
    /// Create a new engine configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration for servers matching many join points per second.
    pub fn high_throughput() -> Self {
        Self {
            cache: CacheConfig {
                max_size: 10_000,
                eviction_fraction: 0.05,
            },
            parallel: ParallelConfig {
                enable_batch_parallelism: true,
                min_batch_size_for_parallelism: 64,
            },
            ..Default::default()
        }
    }

    /// Create a configuration for development and debugging.
    ///
    /// Small caches surface eviction early and batches stay on one thread.
    pub fn development() -> Self {
        Self {
            cache: CacheConfig {
                max_size: 64,
                eviction_fraction: 0.25,
            },
            tokenizer: TokenizerConfig {
                optimize_tokens: false,
            },
            parallel: ParallelConfig {
                enable_batch_parallelism: false,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration file; the format follows the file extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content),
            Some("json") => Self::from_json_str(&content),
            _ => Err(AspectError::ConfigError(format!(
                "unsupported configuration file: {}",
                path.display()
            ))),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.cache.max_size == 0 {
            return Err(AspectError::ConfigError(
                "cache.max_size must be positive".to_string(),
            ));
        }
        let fraction = self.cache.eviction_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(AspectError::ConfigError(format!(
                "cache.eviction_fraction must be in (0, 1], got {fraction}"
            )));
        }
        Ok(())
    }

    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache.max_size = size;
        self
    }

    pub fn with_eviction_fraction(mut self, fraction: f64) -> Self {
        self.cache.eviction_fraction = fraction;
        self
    }

    pub fn with_optimize_tokens(mut self, enable: bool) -> Self {
        self.tokenizer.optimize_tokens = enable;
        self
    }

    pub fn with_parallel_processing(mut self, enable: bool) -> Self {
        self.parallel.enable_batch_parallelism = enable;
        self
    }

    pub fn with_min_batch_size_for_parallelism(mut self, min_size: usize) -> Self {
        self.parallel.min_batch_size_for_parallelism = min_size;
        self
    }

    pub fn with_default_pointcut_kind(mut self, kind: PointcutKind) -> Self {
        self.default_pointcut_kind = kind;
        self
    }
}
