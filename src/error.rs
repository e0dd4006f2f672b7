use thiserror::Error;

/// Caller-facing failures. All of them surface before any encounter runs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("unknown monster '{0}'")]
    UnknownMonster(String),

    #[error("unknown party composition '{0}'")]
    UnknownComposition(String),

    #[error("sample count must be positive, got {0}")]
    InvalidSampleCount(usize),

    #[error("weapon damage die must be between d2 and d1000, got d{0}")]
    InvalidDamageDie(u32),

    #[error("round cap must be positive, got {0}")]
    InvalidRoundCap(u32),

    #[error("invalid monster '{name}': {problems}")]
    InvalidMonster { name: String, problems: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
