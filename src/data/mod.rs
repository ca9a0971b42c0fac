pub mod cache;
pub mod loader;
pub mod merge;
pub mod observation;
pub mod source;
