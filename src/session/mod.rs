pub mod report;
pub mod selection;
