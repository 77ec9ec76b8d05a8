//! Operation module
//!
//! Turns a catalog operation into a [`PageSource`](crate::pagination::PageSource):
//! request bodies carry the caller's parameters plus the token and page-size
//! members, responses expose the items found at the operation's items path.

mod params;
mod source;
mod types;

pub use params::{parse_param, parse_params};
pub use source::JsonOperation;
pub use types::{JsonRequest, JsonResponse};
