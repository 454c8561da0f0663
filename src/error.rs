use std::{error, fmt};

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Error {
    InvalidFormat { input: String },
    InvalidResolution,
}

impl error::Error for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidFormat { input } => {
                write!(f, "Invalid time string {:?}, accepted format is '00:00:00'", input)
            }
            Error::InvalidResolution => write!(f, "Tick resolution must be greater than zero"),
        }
    }
}
