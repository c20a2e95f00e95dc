pub mod builder;
pub mod citation;
pub mod dyadic;
