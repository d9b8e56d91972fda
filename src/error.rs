use thiserror::Error;

#[derive(Error, Debug)]
pub enum BidError {
    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("path does not exist: {0}")]
    PathNotFound(String),

    #[error("formula document error: {0}")]
    FormulaDocument(String),

    #[error("candidate file error: {0}")]
    CandidateFile(String),

    #[error("unknown agency: {0}")]
    UnknownAgency(String),

    #[error("no agency selected: pass --agency or set evaluation.default_agency")]
    MissingAgency,

    #[error("logging setup failed: {0}")]
    Telemetry(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, BidError>;
