// Copyright 2023 Simo Sorce
// See LICENSE.txt file for terms

use std::error;
use std::fmt;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    origin: Option<Box<dyn error::Error + Send + Sync>>,
    errmsg: Option<String>,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[non_exhaustive]
pub enum ErrorKind {
    /* The backend failed to allocate or to perform an operation */
    ProviderFailure,
    /* The backend refused a parameter combination */
    ConfigurationRejected,
    /* The output buffer cannot hold the result, see errmsg */
    BufferTooSmall,
    /* Malformed caller input, see errmsg */
    InvalidInput,
    /* The signature did not verify */
    VerifyFailed,
    /* The requested backend is not compiled in or cannot be loaded */
    BackendUnavailable,
    /* The backend selection was already made */
    AlreadyInitialized,
    /* Invalid configuration file */
    Config,
    /* Other error, see origin */
    Nested,
}

impl Error {
    pub fn new(kind: ErrorKind) -> Error {
        Error {
            kind: kind,
            origin: None,
            errmsg: None,
        }
    }

    pub fn with_errmsg(kind: ErrorKind, errmsg: String) -> Error {
        Error {
            kind: kind,
            origin: None,
            errmsg: Some(errmsg),
        }
    }

    pub fn from_error<E>(kind: ErrorKind, error: E) -> Error
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Error {
            kind: kind,
            origin: Some(error.into()),
            errmsg: None,
        }
    }

    pub fn other_error<E>(error: E) -> Error
    where
        E: Into<Box<dyn error::Error + Send + Sync>>,
    {
        Self::from_error(ErrorKind::Nested, error)
    }

    pub fn buffer_too_small(needed: usize) -> Error {
        Self::with_errmsg(
            ErrorKind::BufferTooSmall,
            format!("output buffer too small, {} bytes needed", needed),
        )
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if let Some(ref e) = self.errmsg {
            return write!(f, "{}", e);
        }
        match self.kind {
            ErrorKind::Nested => match self.origin {
                Some(ref e) => e.fmt(f),
                None => write!(f, "nested error"),
            },
            ErrorKind::ProviderFailure => write!(f, "backend failure"),
            ErrorKind::ConfigurationRejected => {
                write!(f, "parameters rejected by the backend")
            }
            ErrorKind::BufferTooSmall => write!(f, "output buffer too small"),
            ErrorKind::InvalidInput => write!(f, "invalid input"),
            ErrorKind::VerifyFailed => write!(f, "signature verification failed"),
            ErrorKind::BackendUnavailable => write!(f, "backend unavailable"),
            ErrorKind::AlreadyInitialized => {
                write!(f, "backend already initialized")
            }
            ErrorKind::Config => match self.origin {
                Some(ref e) => write!(f, "invalid configuration: {}", e),
                None => write!(f, "invalid configuration"),
            },
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.origin {
            Some(ref e) => Some(e.as_ref()),
            None => None,
        }
    }
}

#[cfg(feature = "openssl")]
impl From<ossl::Error> for Error {
    fn from(error: ossl::Error) -> Error {
        let kind = match error.kind() {
            ossl::ErrorKind::BufferSize => ErrorKind::BufferTooSmall,
            ossl::ErrorKind::BadArg => ErrorKind::InvalidInput,
            _ => ErrorKind::ProviderFailure,
        };
        Error::from_error(kind, error)
    }
}

#[cfg(feature = "native")]
impl From<rsa::Error> for Error {
    fn from(error: rsa::Error) -> Error {
        Error::from_error(ErrorKind::ProviderFailure, error)
    }
}

impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Error {
        Error::other_error(error)
    }
}

impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Error {
        Error::from_error(ErrorKind::Config, error)
    }
}

impl From<std::num::TryFromIntError> for Error {
    fn from(error: std::num::TryFromIntError) -> Error {
        Error::from_error(ErrorKind::InvalidInput, error)
    }
}
