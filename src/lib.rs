pub mod backend;
pub mod config;
pub mod error;
pub mod finder;
pub mod folding;
pub mod maker;
pub mod markup;
pub mod memory;
pub mod request;
pub mod tracing;

pub use backend::{Backend, DictionaryBackend, Features, WordMatch};
pub use config::{GroupConfig, LookupConfig};
pub use error::{BackendError, ConfigError, LoadError};
pub use maker::{ArticleMaker, Group, MakerSettings};
pub use memory::MemoryDictionary;
pub use request::{ArticleRequest, InputPhrase, LookupRequest, Outcome, Progress};
