use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum TagError {
    #[error("Tag value is empty")]
    Empty,
    #[error("Unexpected character {0:?} at position {1} in tag value")]
    UnexpectedCharacter(char, usize),
    #[error("Unterminated string literal starting at position {0}")]
    UnterminatedString(usize),
    #[error("List is missing its closing bracket (opened at position {0})")]
    UnterminatedList(usize),
    #[error("Trailing data after literal at position {0}")]
    TrailingData(usize),
    #[error("Expected an integer, found {0:?}")]
    NotAnInteger(String),
    #[error("Expected a string, found {0:?}")]
    NotAString(String),
    #[error("Expected a list, found {0:?}")]
    NotAList(String),
}

#[derive(Debug, Error)]
pub enum RunSettingsError {
    #[error("BORE is missing the tag {0:?}")]
    MissingTag(String),
    #[error("Failed to parse tag {0:?}: {1}")]
    BadTag(String, #[source] TagError),
    #[error("Tag {0:?} value {1} is outside the accepted range 1..={2}")]
    OutOfRange(String, usize, usize),
    #[error("Channel matrix of DUT {0:?} is ragged; all rows must have the same length")]
    RaggedMatrix(String),
    #[error("Channel matrix of DUT {0:?} is empty")]
    EmptyMatrix(String),
    #[error("DUT {0:?} declares {1} channels but its matrix holds {2}")]
    ChannelCountMismatch(String, usize, usize),
}

#[derive(Debug, Error)]
pub enum ChannelMapError {
    #[error("Channel {0} of DUT {1:?} not present in the list of channels that were recorded")]
    ChannelNotRecorded(String, String),
    #[error("Channel {0} appears more than once in channels_names_list")]
    DuplicateChannel(String),
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("Received a data event before any beginning-of-run event")]
    NotInitialized,
    #[error("Converter failed to parse the BORE: {0}")]
    SettingsError(#[from] RunSettingsError),
    #[error("Converter failed to build the channel map: {0}")]
    MapError(#[from] ChannelMapError),
    #[error("Raw block {0} has size {1} bytes; expected {2}")]
    BadBlockSize(u32, usize, usize),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration as file {0:?} does not exist")]
    BadFilePath(PathBuf),
    #[error("Config failed due to IO error: {0}")]
    IOError(#[from] std::io::Error),
    #[error("Config failed to parse YAML: {0}")]
    ParsingError(#[from] serde_yaml::Error),
}
