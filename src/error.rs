// Error type shared by the container, the resolver and the command line tool
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptionalError {
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("The value {value} is unsupported by {variant}")]
    Unsupported { variant: &'static str, value: String },
    #[error("No value present for {0}, use or_else instead")]
    NoValuePresent(&'static str),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Input error: {0}")]
    Input(String),
}

pub type Result<T> = std::result::Result<T, OptionalError>;

// Helper conversions
impl From<config::ConfigError> for OptionalError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl From<serde_json::Error> for OptionalError {
    fn from(e: serde_json::Error) -> Self { Self::Input(e.to_string()) }
}
impl From<std::io::Error> for OptionalError {
    fn from(e: std::io::Error) -> Self { Self::Input(e.to_string()) }
}
