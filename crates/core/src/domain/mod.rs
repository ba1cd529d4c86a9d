pub mod bid;
pub mod bom;
pub mod extraction;
pub mod matching;
pub mod strategy;
