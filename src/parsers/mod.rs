//! Parsers for delimited input

pub mod delimited;
pub mod inference;
