/// Log tags identifying the subsystem a message comes from
///
/// Each tag maps to a `--debug-<key>` flag that enables its debug output.

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LogTag {
    System,
    Config,
    Metrics,
    Registry,
    Batch,
    Other(String),
}

impl LogTag {
    /// Key used in --debug-<key> / --verbose-<key> flags
    pub fn to_debug_key(&self) -> String {
        match self {
            LogTag::System => "system".to_string(),
            LogTag::Config => "config".to_string(),
            LogTag::Metrics => "metrics".to_string(),
            LogTag::Registry => "registry".to_string(),
            LogTag::Batch => "batch".to_string(),
            LogTag::Other(s) => s.to_lowercase(),
        }
    }

    /// Uncolored label used in plain output
    pub fn to_plain_string(&self) -> String {
        match self {
            LogTag::Other(s) => s.to_uppercase(),
            tag => tag.to_debug_key().to_uppercase(),
        }
    }

    /// Every built-in tag (used when scanning for debug flags)
    pub fn all() -> [LogTag; 5] {
        [
            LogTag::System,
            LogTag::Config,
            LogTag::Metrics,
            LogTag::Registry,
            LogTag::Batch,
        ]
    }
}

impl std::fmt::Display for LogTag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_plain_string())
    }
}
