mod assets;
mod auth;
mod config;
mod error;
mod extract;
mod fetch;
mod resolve;
mod run;
mod search;
mod table;

pub use config::{parse_keywords, Credentials, FetchConfig, RunConfig, SiteConfig};
pub use error::{Error, Result};
pub use run::crawl;
pub use search::ItemRef;
pub use table::{Accumulator, MetadataRow, COLUMNS};
