mod client;
pub(crate) mod common;
