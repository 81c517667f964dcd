use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum RedigestError {
    InvalidInput(String),
    Io(std::io::Error),
    Serde(serde_json::Error),
}

impl Error for RedigestError {}

impl fmt::Display for RedigestError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RedigestError::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            RedigestError::Io(err) => write!(f, "{err}"),
            RedigestError::Serde(err) => write!(f, "{err}"),
        }
    }
}

impl From<String> for RedigestError {
    fn from(err: String) -> Self {
        RedigestError::InvalidInput(err)
    }
}

impl From<std::io::Error> for RedigestError {
    fn from(err: std::io::Error) -> Self {
        RedigestError::Io(err)
    }
}

impl From<serde_json::Error> for RedigestError {
    fn from(err: serde_json::Error) -> Self {
        RedigestError::Serde(err)
    }
}
