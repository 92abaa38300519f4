pub mod scan;
pub mod sources;
