use thiserror::Error;

/// Conditions under which the engine declines to render an update
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunnelError {
    #[error("Missing data: {0}")]
    MissingData(String),

    #[error("Invalid viewport {width}x{height}")]
    InvalidViewport { width: f32, height: f32 },

    #[error("Stage '{stage}' has a zero total")]
    DegenerateStage { stage: String },
}

impl FunnelError {
    pub fn missing(reason: impl Into<String>) -> Self {
        FunnelError::MissingData(reason.into())
    }
}
