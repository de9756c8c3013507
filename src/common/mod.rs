//! Common traits and helpers used across the reqinspect library

pub mod test_utils;
pub mod traits;

pub use test_utils::{FailingSerializer, RawResponse, fetch, read_response, spawn_test_server};
pub use traits::InspectServerTrait;
