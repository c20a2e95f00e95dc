pub mod corpus;
pub mod network;
pub mod tables;
