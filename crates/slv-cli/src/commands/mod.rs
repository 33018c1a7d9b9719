pub mod audit;
pub mod reserves;
