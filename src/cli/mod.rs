pub mod classify;
pub mod enhance;
pub mod validate;
