use crate::month::YearMonth;

#[derive(Debug, thiserror::Error)]
pub enum IpcError {
    #[error("Dataset is empty")]
    EmptyDataset,
    #[error("Missing required column `{name}` (expected at position {position})")]
    MissingColumn { name: &'static str, position: usize },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Previous index value is zero, cannot compute variation for {month}")]
    DivisionByZero { month: YearMonth },
    #[error("Arithmetic overflow while computing {month}")]
    Overflow { month: YearMonth },
    #[error("Insufficient data: {required} monthly variations required, {available} available")]
    InsufficientData { required: usize, available: usize },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl IpcError {
    /// Errors caused by the caller's parameters rather than by the dataset.
    pub const fn is_user_error(&self) -> bool {
        matches!(self, Self::InsufficientData { .. } | Self::InvalidInput(_))
    }
}
