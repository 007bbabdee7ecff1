use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("TOML serialization error: {0}")]
    #[diagnostic(
        code(querist_config::toml_serialize),
        help("Check your configuration structure for invalid values")
    )]
    TomlSerError(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    #[diagnostic(
        code(querist_config::toml_deserialize),
        help("Check your querist.toml syntax and structure")
    )]
    TomlDeError(#[from] toml::de::Error),

    #[error("Configuration file already exists")]
    #[diagnostic(
        code(querist_config::already_exists),
        help("Remove the existing config file or use a different location")
    )]
    ConfigAlreadyExists,

    #[error("Invalid access mode: {0}")]
    #[diagnostic(
        code(querist_config::invalid_mode),
        help("Use a combination of `r`, `rw` and `c`, e.g. `rwc` or `r`")
    )]
    InvalidMode(String),

    #[error("Database path must not be empty")]
    #[diagnostic(
        code(querist_config::empty_path),
        help("Set `path` to a database file or `:memory:`")
    )]
    EmptyPath,

    #[error("IO error: {0}")]
    #[diagnostic(code(querist_config::io))]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;
