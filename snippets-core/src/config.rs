//! Configuration for the snippet engine

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::context::PAGE_BINDING;
use crate::error::{Result, SnippetError};

/// Main engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Tag markers used in snippet content
    #[serde(default)]
    pub tags: TagOptions,

    /// Binding the current page is exposed under
    #[serde(default = "default_root_binding")]
    pub root_binding: String,

    /// Separator between tag alternatives (`{{a|b}}`)
    #[serde(default = "default_alternative_separator")]
    pub alternative_separator: String,
}

fn default_root_binding() -> String {
    PAGE_BINDING.to_string()
}

fn default_alternative_separator() -> String {
    "|".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tags: TagOptions::default(),
            root_binding: default_root_binding(),
            alternative_separator: default_alternative_separator(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: EngineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Check that tags can be found unambiguously
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: &str| {
            Err(SnippetError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.tags.open.is_empty() || self.tags.close.is_empty() {
            return invalid("tag markers must not be empty");
        }
        if self.tags.open == self.tags.close {
            return invalid("open and close tag markers must differ");
        }
        if self.root_binding.trim().is_empty() {
            return invalid("root_binding must not be empty");
        }
        if self.root_binding.contains('.') {
            return invalid("root_binding must be a single path segment");
        }
        Ok(())
    }
}

/// Tag marker configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagOptions {
    /// Opening marker
    #[serde(default = "default_tag_open")]
    pub open: String,

    /// Closing marker
    #[serde(default = "default_tag_close")]
    pub close: String,
}

fn default_tag_open() -> String {
    "{{".to_string()
}

fn default_tag_close() -> String {
    "}}".to_string()
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            open: default_tag_open(),
            close: default_tag_close(),
        }
    }
}

impl TagOptions {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }
}
