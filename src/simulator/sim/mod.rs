pub mod mode;
pub mod shell;
pub mod trace;
