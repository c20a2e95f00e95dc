pub mod alt_names;
pub mod geography;
pub mod matcher;
pub mod surface_forms;
