#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error when performing I/O: {0}")]
    Io(#[from] std::io::Error),
    #[error("Error when parsing program at line {line}: {msg}")]
    Parse { line: usize, msg: String },
    #[error("Error when configuring logger: {0}")]
    Logger(String),
}

pub type Result<T> = std::result::Result<T, Error>;
