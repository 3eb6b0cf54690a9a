use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReticleError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: f32, height: f32 },

    #[error("Frame source error: {0}")]
    Source(String),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Overlay sink error: {0}")]
    Sink(String),

    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialize error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

pub type ReticleResult<T> = Result<T, ReticleError>;
