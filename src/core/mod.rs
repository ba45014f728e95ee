use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Entry {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub is_dir: bool,
    pub children: Vec<Entry>,
}

impl Entry {
    #[must_use]
    pub fn size_kb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0
    }
}

mod error;
mod fs;
mod ingest;
mod policy;
mod run;
mod selection;
mod stage;
mod workspace;

pub use error::*;
pub use fs::*;
pub use ingest::*;
pub use policy::*;
pub use run::*;
pub use selection::*;
pub use stage::*;
pub use workspace::*;
