pub mod batch;
pub mod reduce;
