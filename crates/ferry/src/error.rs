#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Relay(#[from] ferry_relay::RelayError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
