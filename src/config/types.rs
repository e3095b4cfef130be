use segcat_parser::{ParserConfig, SafeMode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub concat: ConcatConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ConcatConfig {
    /// Safe-filename enforcement: auto, on or off
    #[serde(default)]
    pub safe: SafeMode,

    /// Socket timeout in milliseconds for segment opens (`ConcatDemuxerBuilder::timeout`)
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ConcatConfig {
    /// Parser settings for a descriptor located at `base`.
    pub fn parser_config(&self, base: Option<&str>) -> ParserConfig {
        let builder = ParserConfig::builder().safe(self.safe);
        match base {
            Some(base) => builder.base(base).build(),
            None => builder.build(),
        }
    }
}
