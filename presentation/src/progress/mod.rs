//! Progress reporting during a council run

pub mod reporter;
