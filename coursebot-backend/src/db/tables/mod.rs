pub mod chunks;
pub mod courses;
