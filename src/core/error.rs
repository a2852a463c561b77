use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Archetype not found: {0}")]
    ArchetypeNotFound(String),

    #[error("Invalid archetype '{name}': {reason}")]
    InvalidArchetype { name: String, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
