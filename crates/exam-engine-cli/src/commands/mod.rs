pub mod extract;
pub mod init;
pub mod stats;
pub mod sync;
pub mod take;
pub mod validate;
