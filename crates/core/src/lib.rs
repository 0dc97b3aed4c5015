// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! jlx-core: random line access and resumable processing for large
//! line-delimited JSON files.
//!
//! The [`JsonlIndex`] keeps a sparse line-number to byte-offset table in a
//! sidecar next to the data file, detects when the file has changed, and
//! extends itself incrementally when lines are appended. The
//! [`BatchProcessor`] layers a durable per-job cursor on top so long-running
//! jobs resume after a crash.
//!
//! ```rust,ignore
//! use jlx_core::{json, DecodePolicy, IndexOptions, JsonlIndex};
//!
//! let index = JsonlIndex::open("events.jsonl", IndexOptions::default())?;
//! let record: Option<_> = index.read_parsed(1000, json::<serde_json::Value>, DecodePolicy::Raise)?;
//! for line in index.iterate_from(5000, Some(10))? {
//!     println!("{}", String::from_utf8_lossy(line?.content()));
//! }
//! ```

pub mod batch;
pub mod checkpoint;
pub mod clock;
pub mod codec;
pub mod decode;
pub mod error;
pub mod index;
pub mod iter;
pub mod line;
pub mod meta;
pub mod progress;
mod reader;
pub mod registry;
mod scan;
pub mod session;
pub mod stream;

pub use batch::{
    BatchOptions, BatchProcessor, BatchState, BatchSummary, CheckpointPolicy, CompletionMode,
};
pub use checkpoint::{Checkpoint, CheckpointTable};
pub use clock::{ClockSource, SystemClock};
pub use decode::{json, DecodePolicy, Decoded};
pub use error::{BoxError, Error, Result};
pub use index::{default_index_path, file_identity, IndexInfo, IndexOptions, JsonlIndex};
pub use iter::{Lines, ParsedLines};
pub use line::{FileIdentity, LineRecord, RawLine};
pub use meta::{IndexMetadata, DEFAULT_CHECKPOINT_INTERVAL};
pub use progress::{JobInfo, JobProgress, JobStatus, ProgressStore};
pub use registry::IndexRegistry;
pub use session::ReadSession;
pub use stream::{read_many_async, AsyncLines, StreamOptions};

#[cfg(test)]
mod test_support;
