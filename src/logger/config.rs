/// Logger configuration derived from command-line flags
use super::levels::LogLevel;
use super::tags::LogTag;
use crate::arguments;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Highest level that may be printed
    pub min_level: LogLevel,
    /// Tags whose debug output is unlocked
    pub debug_tags: HashSet<String>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
        }
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

/// Build the configuration from `--debug-<module>` and `--verbose` flags
pub fn init_from_args() {
    let debug_tags: HashSet<String> = arguments::get_enabled_debug_modes()
        .into_iter()
        .map(str::to_string)
        .collect();

    let min_level = if arguments::is_verbose_enabled() {
        LogLevel::Verbose
    } else if !debug_tags.is_empty() {
        LogLevel::Debug
    } else {
        LogLevel::Info
    };

    set_logger_config(LoggerConfig {
        min_level,
        debug_tags,
    });
}

pub fn is_debug_enabled_for_tag(config: &LoggerConfig, tag: &LogTag) -> bool {
    config.min_level == LogLevel::Verbose || config.debug_tags.contains(tag.to_debug_key())
}
