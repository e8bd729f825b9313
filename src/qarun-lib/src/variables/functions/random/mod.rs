pub mod guid;
pub mod int;
