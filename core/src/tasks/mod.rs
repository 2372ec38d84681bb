pub mod builder;
pub mod controller;
pub mod decode;
pub mod encode;
pub mod error;
pub mod merge;
pub mod validate;

pub(crate) mod schemas;
pub(crate) mod values;
