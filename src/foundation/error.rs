pub type StageResult<T> = Result<T, StageError>;

#[derive(thiserror::Error, Debug)]
pub enum StageError {
    /// User-supplied input was rejected before any state changed
    /// (unsupported upload type, oversized file, malformed catalog data).
    #[error("validation error: {0}")]
    Validation(String),

    /// A referenced entity does not exist (unknown frame id, missing
    /// selection). Callers reaching these through constrained UI affordances
    /// treat them as silent no-ops.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// Reading or decoding an uploaded image failed. Construction is
    /// all-or-nothing: no partially-built content node stays attached.
    #[error("acquisition error: {0}")]
    Acquisition(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl StageError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    pub fn acquisition(msg: impl Into<String>) -> Self {
        Self::Acquisition(msg.into())
    }
}
