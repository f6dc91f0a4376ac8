mod backend;
mod file;
mod memory;

pub use backend::{AccountMap, AdminAccount, CredentialBackend};
pub use file::FileBackend;
pub use memory::MemoryBackend;
