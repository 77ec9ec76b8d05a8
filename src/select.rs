//! Output selection
//!
//! What `invoke` prints for a fetch:
//!
//! - default: every item on every page
//! - `*`: each whole response document
//! - `^Name`: the value of bound parameter `Name`, once, after the fetch
//! - a dotted path: that member of each response document

use crate::error::{Error, Result};
use crate::operation::{JsonOperation, JsonResponse};
use crate::pagination::PageResponse;
use crate::types::{lookup_path, JsonValue};
use std::fmt;
use std::str::FromStr;

/// Projection applied to fetched pages
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    /// Page items
    #[default]
    Items,
    /// Whole response per page
    Response,
    /// One member of each response, by dotted path
    Field(String),
    /// A bound request parameter, echoed once
    Parameter(String),
}

impl FromStr for Selection {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        match s {
            "" => Err(Error::misuse("--select cannot be empty")),
            "*" => Ok(Self::Response),
            _ => match s.strip_prefix('^') {
                Some("") => Err(Error::misuse("--select '^' needs a parameter name")),
                Some(name) => Ok(Self::Parameter(name.to_string())),
                None => Ok(Self::Field(s.to_string())),
            },
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Items => write!(f, "items"),
            Self::Response => write!(f, "*"),
            Self::Field(path) => write!(f, "{path}"),
            Self::Parameter(name) => write!(f, "^{name}"),
        }
    }
}

impl Selection {
    /// Check the selection against the bound operation
    pub fn validate(&self, operation: &JsonOperation) -> Result<()> {
        if let Self::Parameter(name) = self {
            if operation.param(name).is_none() {
                return Err(Error::misuse(format!(
                    "--select '^{name}' names a parameter that is not set"
                )));
            }
        }
        Ok(())
    }

    /// Values to print for one page
    pub fn select_page(&self, response: JsonResponse) -> Vec<JsonValue> {
        match self {
            Self::Items => response.into_items(),
            Self::Response => vec![response.into_body()],
            Self::Field(path) => lookup_path(response.body(), path)
                .cloned()
                .into_iter()
                .collect(),
            Self::Parameter(_) => Vec::new(),
        }
    }

    /// Value printed once the fetch is over
    pub fn final_value(&self, operation: &JsonOperation) -> Option<JsonValue> {
        match self {
            Self::Parameter(name) => operation.param(name).cloned(),
            _ => None,
        }
    }
}
