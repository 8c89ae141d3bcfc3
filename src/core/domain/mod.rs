pub mod error;
pub mod fleet_api;
pub mod model;
pub mod value_object;
