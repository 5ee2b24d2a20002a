use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("restoration tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f32),
}
