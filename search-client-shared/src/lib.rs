//! # Search Client Shared
//!
//! Plain data types exchanged with the remote search service: documents,
//! bulk import/export parameters, search queries and responses, and the
//! delete/update request shapes.

pub mod delete;
pub mod document;
pub mod export;
pub mod import;
pub mod params;
pub mod search;
pub mod write;

pub use delete::{DeleteOutcome, DeleteQuery, DeleteResponse, DeleteTarget};
pub use document::Document;
pub use export::ExportOptions;
pub use import::{
    DirtyValues, ImportAction, ImportInput, ImportOptions, ImportOutcome, ImportResult,
};
pub use params::{QueryParams, ToQueryParams};
pub use search::{
    FacetCount, FacetCounts, GroupedHits, SearchHit, SearchHits, SearchQuery, SearchResponse,
};
pub use write::{UpdateByFilterOptions, UpdateByFilterResponse, WriteAction, WriteOptions};
