pub mod analyzer;
pub mod louvain;
pub mod tree;
