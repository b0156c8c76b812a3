use crate::error::Result;
use serde::Deserialize;

/// Chunk sizing knobs. Changing them affects chunk granularity only.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ChunkingConfig {
    /// Preferred maximum buffer size, in characters.
    #[serde(default = "default_soft_limit")]
    pub chunk_soft_limit: usize,
    /// Absolute maximum buffer size, in characters.
    #[serde(default = "default_hard_limit")]
    pub chunk_hard_limit: usize,
    /// A narrative paragraph at least this long closes its own chunk.
    #[serde(default = "default_min_paragraph_length")]
    pub min_paragraph_length: usize,
}

fn default_soft_limit() -> usize {
    500
}

fn default_hard_limit() -> usize {
    900
}

fn default_min_paragraph_length() -> usize {
    120
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_soft_limit: default_soft_limit(),
            chunk_hard_limit: default_hard_limit(),
            min_paragraph_length: default_min_paragraph_length(),
        }
    }
}

impl ChunkingConfig {
    /// Read `DOOMREADER_CHUNK_SOFT_LIMIT`, `DOOMREADER_CHUNK_HARD_LIMIT` and
    /// `DOOMREADER_MIN_PARAGRAPH_LENGTH`, falling back to the defaults.
    pub fn from_env() -> Result<Self> {
        let config: Self = config::Config::builder()
            .add_source(config::Environment::with_prefix("DOOMREADER").try_parsing(true))
            .build()?
            .try_deserialize()?;
        Ok(config.normalized())
    }

    /// Apply command-line overrides on top of this configuration.
    pub fn with_overrides(
        mut self,
        soft: Option<usize>,
        hard: Option<usize>,
        min_paragraph: Option<usize>,
    ) -> Self {
        if let Some(soft) = soft {
            self.chunk_soft_limit = soft;
        }
        if let Some(hard) = hard {
            self.chunk_hard_limit = hard;
        }
        if let Some(min) = min_paragraph {
            self.min_paragraph_length = min;
        }
        self.normalized()
    }

    /// The hard limit may never sit below the soft limit.
    pub fn normalized(mut self) -> Self {
        if self.chunk_hard_limit < self.chunk_soft_limit {
            tracing::warn!(
                soft = self.chunk_soft_limit,
                hard = self.chunk_hard_limit,
                "Hard chunk limit below soft limit, raising it"
            );
            self.chunk_hard_limit = self.chunk_soft_limit;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ChunkingConfig::default();
        assert_eq!(config.chunk_soft_limit, 500);
        assert_eq!(config.chunk_hard_limit, 900);
        assert_eq!(config.min_paragraph_length, 120);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: ChunkingConfig = serde_json::from_str(r#"{"chunk_soft_limit": 300}"#).unwrap();
        assert_eq!(config.chunk_soft_limit, 300);
        assert_eq!(config.chunk_hard_limit, 900);
    }

    #[test]
    fn test_hard_limit_raised_to_soft() {
        let config = ChunkingConfig::default().with_overrides(Some(1000), None, None);
        assert_eq!(config.chunk_hard_limit, 1000);
    }

    #[test]
    fn test_overrides_keep_unset_values() {
        let config = ChunkingConfig::default().with_overrides(None, Some(1200), Some(80));
        assert_eq!(config.chunk_soft_limit, 500);
        assert_eq!(config.chunk_hard_limit, 1200);
        assert_eq!(config.min_paragraph_length, 80);
    }
}
