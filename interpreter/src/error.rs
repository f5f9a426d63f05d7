use tarn_core::Token;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("[line {line}] scanner error: {msg}")]
    ScannerError { line: usize, msg: String },

    #[error("[line {line}] parser error: {msg}")]
    ParserError {
        token: Token,

        // line is copied from token, this is required because thiserror doesn't
        // support field access, e.g {token.line}, in error strings
        line: usize,
        msg: String,
    },

    #[error("{msg}")]
    RuntimeError { token: Token, msg: String },
}

impl Error {
    pub(crate) fn parser_error(token: &Token, msg: &str) -> Self {
        Error::ParserError {
            token: token.clone(),
            line: token.line,
            msg: String::from(msg),
        }
    }

    pub(crate) fn runtime_error(token: &Token, msg: &str) -> Self {
        Error::RuntimeError {
            token: token.clone(),
            msg: String::from(msg),
        }
    }
}

impl From<tarn_core::Error> for Error {
    fn from(err: tarn_core::Error) -> Self {
        Error::ScannerError {
            line: err.line(),
            msg: err.to_string(),
        }
    }
}
