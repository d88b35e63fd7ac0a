use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid price range: v_min {v_min} must be below v_max {v_max}")]
    PriceRange { v_min: i32, v_max: i32 },

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("Buffer of {buffer_ms}ms leaves no trading time in a {auction_ms}ms repetition")]
    NoTradingWindow { buffer_ms: i64, auction_ms: i64 },

    #[error("Private value {value} outside [{v_min}, {v_max}]")]
    ValueOutOfRange { value: i32, v_min: i32, v_max: i32 },
}

pub type Result<T> = std::result::Result<T, ConfigError>;
