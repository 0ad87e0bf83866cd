mod harness_struct;
mod init;

pub use harness_struct::Harness;
