use thiserror::Error;

pub type Result<T> = std::result::Result<T, StrategyError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum StrategyError {
    #[error("No items selected for dispute")]
    EmptySelection,
}
