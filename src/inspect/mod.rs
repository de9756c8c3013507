//! Request inspection
//!
//! This module extracts a fixed set of fields from an inbound request and
//! assembles them into a [`RequestDetails`] value. It performs no I/O and has
//! no failure conditions: missing values such as an absent `User-Agent` are
//! carried as `None`.

pub mod details;
pub mod view;

pub use details::{BasicDetails, ExtendedDetails, RequestDetails, basic_details, extended_details};
pub use view::RequestView;
