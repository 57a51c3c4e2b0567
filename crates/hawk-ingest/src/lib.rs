// SPDX-License-Identifier: MIT OR Apache-2.0
#![doc = include_str!("../README.md")]
//! hawk-ingest
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod reply;
pub mod router;
pub mod run;

pub use reply::ReplyWriter;
pub use router::Router;
pub use run::{IngestError, IngestOptions, run_ingest};
