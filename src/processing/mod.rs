pub mod extract;
pub mod grouping;
pub mod report;
pub mod statistics;
