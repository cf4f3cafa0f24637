pub mod gate;
pub mod message;
pub mod monitor;
pub mod pool;
pub mod scheduler;
