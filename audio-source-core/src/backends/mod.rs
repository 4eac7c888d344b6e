pub mod memory;
pub mod stream;
