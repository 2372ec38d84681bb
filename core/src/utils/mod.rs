pub(crate) mod time;
pub(crate) mod uuid;
