pub mod attendance;
pub mod role;
pub mod task;
pub mod user;
