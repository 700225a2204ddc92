pub mod access;
pub mod attendance;
pub mod profile;
pub mod task;
