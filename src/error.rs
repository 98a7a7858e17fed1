use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvQuantError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),

    #[error("Invalid currency pair: {0}")]
    InvalidPair(String),

    #[error("Invalid indicator name: {0}")]
    InvalidIndicatorName(String),

    #[error("Invalid event value: {0}")]
    InvalidEventValue(String),

    #[error("Indicator validation failed: {0}")]
    IndicatorValidation(String),

    #[error("Event has already been processed")]
    AlreadyProcessed,

    #[error("No price available for {0}")]
    MissingPrice(String),

    #[error("Portfolio already registered: {0}")]
    DuplicatePortfolio(String),
}

pub type Result<T> = std::result::Result<T, EvQuantError>;
