pub mod regression;
pub mod series;
