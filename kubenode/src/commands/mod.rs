pub mod install;
pub mod query;
pub mod resolve;
