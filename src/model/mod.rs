//! Data-transfer structs for the three survey tables
//!
//! Rows from either store backend are converted into these types before any
//! component sees them.

mod location;
mod response;

pub use location::{Location, LocationInput, LocationUpdate};
pub use response::{
    category_for, Category, ItemLabel, NewLineItem, NewResponseHeader, ResponseHeader,
    ResponseLineItem, Role,
};
