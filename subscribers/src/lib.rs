pub mod contracts;
mod file_access;
pub mod recipient;
mod resolver;
