//! CLI command implementations (pack, inspect, unpack).

pub mod pack;
pub mod inspect;
pub mod unpack;
