pub mod filesystem;
pub mod schtasks;
pub mod tasks;

pub(crate) mod utils;
