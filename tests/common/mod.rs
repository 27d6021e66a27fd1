#![allow(dead_code)]

pub mod strategies;
pub mod test_utils;

pub use strategies::*;
pub use test_utils::*;
