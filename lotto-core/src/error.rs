use thiserror::Error;

pub type Result<T> = std::result::Result<T, LottoError>;

#[derive(Error, Debug)]
pub enum LottoError {
    #[error("Amount must be greater than 0")]
    InvalidAmount,

    #[error("Insufficient balance: need {need}, have {available}")]
    InsufficientBalance { need: u64, available: u64 },

    #[error("Lottery already ended")]
    LotteryAlreadyEnded,

    #[error("Lottery not yet ended")]
    LotteryNotYetEnded,

    #[error("Ticket balance overflow: requested {requested}, remaining {remaining}")]
    TicketBalanceOverflow { requested: u64, remaining: u64 },

    #[error("Wrong funding medium: {0}")]
    WrongFundingMedium(String),

    #[error("Lottery not found: {name}")]
    LotteryNotFound { name: String },

    #[error("Token ledger not found: {name}")]
    TokenNotFound { name: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl LottoError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn wrong_funding(msg: impl Into<String>) -> Self {
        Self::WrongFundingMedium(msg.into())
    }
}
