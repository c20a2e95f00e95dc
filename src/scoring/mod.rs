pub mod enrichment;
pub mod recommend;
pub mod scores;
