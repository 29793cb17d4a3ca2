// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::fmt;
use std::result;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoError,      // will never be produced
    DoesNotExist, // the named entity doesn't exist
    DuplicateNode,
    DuplicateEdge,
    DuplicateLoop,
    JsonDeserialization,
    JsonSerialization,
    BadTarget,
    Generic,
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use ErrorCode::*;
        let name = match self {
            NoError => "no_error",
            DoesNotExist => "does_not_exist",
            DuplicateNode => "duplicate_node",
            DuplicateEdge => "duplicate_edge",
            DuplicateLoop => "duplicate_loop",
            JsonDeserialization => "json_deserialization",
            JsonSerialization => "json_serialization",
            BadTarget => "bad_target",
            Generic => "generic",
        };

        write!(f, "{name}")
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Import,
    Model,
    Query,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let kind = match self {
            ErrorKind::Import => "ImportError",
            ErrorKind::Model => "ModelError",
            ErrorKind::Query => "QueryError",
        };
        write!(f, "{kind}")
    }
}

/// The single error type of the engine. Only dataset construction and
/// parsing can fail; the layout and pathway algorithms are total.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}{{{code}{}}}", .details.as_ref().map(|d| format!(": {d}")).unwrap_or_default())]
pub struct Error {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub details: Option<String>,
}

impl Error {
    pub fn new(kind: ErrorKind, code: ErrorCode, details: Option<String>) -> Self {
        Error {
            kind,
            code,
            details,
        }
    }

    pub fn get_details(&self) -> Option<String> {
        self.details.clone()
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        let code = if err.is_io() {
            ErrorCode::Generic
        } else {
            ErrorCode::JsonDeserialization
        };
        Error::new(ErrorKind::Import, code, Some(err.to_string()))
    }
}

pub type Result<T> = result::Result<T, Error>;

#[macro_export]
macro_rules! model_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Model,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[macro_export]
macro_rules! query_err(
    ($code:tt, $str:expr) => {{
        use $crate::common::{Error, ErrorCode, ErrorKind};
        Err(Error::new(
            ErrorKind::Query,
            ErrorCode::$code,
            Some($str),
        ))
    }}
);

#[test]
fn test_error_display() {
    let err = Error::new(
        ErrorKind::Model,
        ErrorCode::DuplicateNode,
        Some("amyloid_beta".to_owned()),
    );
    assert_eq!("ModelError{duplicate_node: amyloid_beta}", format!("{err}"));

    let err = Error::new(ErrorKind::Query, ErrorCode::BadTarget, None);
    assert_eq!("QueryError{bad_target}", format!("{err}"));
}

#[test]
fn test_error_from_json() {
    let err: Error = serde_json::from_str::<Vec<u32>>("[1, 2")
        .unwrap_err()
        .into();
    assert_eq!(err.kind, ErrorKind::Import);
    assert_eq!(err.code, ErrorCode::JsonDeserialization);
    assert!(err.get_details().is_some());
}
