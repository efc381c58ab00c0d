use std::error::Error;

use reqwest::StatusCode;
use rusoto_core::RusotoError;
use rusoto_workspaces::{DescribeTagsError, DescribeWorkspacesError};
use std::fmt;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum AnnotatorError {
    NoneValue,
    MissingEnvVar(&'static str),
    InvalidFlag { name: &'static str, value: String },
    InvalidRegion(String),
    MissingAttribute(String),
    Signature,
    UnexpectedStatus { status: StatusCode, body: String },
    DescribeWorkspacesError(RusotoError<DescribeWorkspacesError>),
    DescribeTagsError(RusotoError<DescribeTagsError>),
    HttpError(reqwest::Error),
    JsonError(serde_json::Error),
    CsvError(csv::Error),
}

impl Display for AnnotatorError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match *self {
            AnnotatorError::NoneValue => write!(f, "Value is None"),
            AnnotatorError::MissingEnvVar(name) => {
                write!(f, "Required environment variable {} is not set", name)
            }
            AnnotatorError::InvalidFlag { name, ref value } => {
                write!(f, "{} must be \"true\" or \"false\", got {:?}", name, value)
            }
            AnnotatorError::InvalidRegion(ref name) => {
                write!(f, "Unrecognized AWS region {:?}", name)
            }
            AnnotatorError::MissingAttribute(ref name) => {
                write!(f, "Workspace has no attribute named {:?}", name)
            }
            AnnotatorError::Signature => write!(f, "Failed to compute request signature"),
            AnnotatorError::UnexpectedStatus { status, ref body } => {
                write!(f, "Unexpected response status {}: {}", status, body)
            }
            AnnotatorError::DescribeWorkspacesError(ref error) => Display::fmt(error, f),
            AnnotatorError::DescribeTagsError(ref error) => Display::fmt(error, f),
            AnnotatorError::HttpError(ref error) => Display::fmt(error, f),
            AnnotatorError::JsonError(ref error) => Display::fmt(error, f),
            AnnotatorError::CsvError(ref error) => Display::fmt(error, f),
        }
    }
}

impl Error for AnnotatorError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match *self {
            AnnotatorError::DescribeWorkspacesError(ref error) => Some(error),
            AnnotatorError::DescribeTagsError(ref error) => Some(error),
            AnnotatorError::HttpError(ref error) => Some(error),
            AnnotatorError::JsonError(ref error) => Some(error),
            AnnotatorError::CsvError(ref error) => Some(error),
            _ => None,
        }
    }
}

impl From<RusotoError<DescribeWorkspacesError>> for AnnotatorError {
    fn from(e: RusotoError<DescribeWorkspacesError>) -> AnnotatorError {
        AnnotatorError::DescribeWorkspacesError(e)
    }
}

impl From<RusotoError<DescribeTagsError>> for AnnotatorError {
    fn from(e: RusotoError<DescribeTagsError>) -> AnnotatorError {
        AnnotatorError::DescribeTagsError(e)
    }
}

impl From<reqwest::Error> for AnnotatorError {
    fn from(e: reqwest::Error) -> AnnotatorError {
        AnnotatorError::HttpError(e)
    }
}

impl From<serde_json::Error> for AnnotatorError {
    fn from(e: serde_json::Error) -> AnnotatorError {
        AnnotatorError::JsonError(e)
    }
}

impl From<csv::Error> for AnnotatorError {
    fn from(e: csv::Error) -> AnnotatorError {
        AnnotatorError::CsvError(e)
    }
}
