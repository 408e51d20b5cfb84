pub mod cookie;
pub mod forms;
pub mod middleware;
