pub mod now;
pub mod timestamp;
