//! Local persistence and host environment collaborators.

pub mod ambient;
pub mod file;
pub mod memory;

pub use ambient::EnvThemeSignal;
pub use file::FilePreferenceStore;
pub use memory::MemoryPreferenceStore;
