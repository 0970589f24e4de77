//! Wire-facing streaming layer for the Weft chat client
//!
//! Turns an HTTP response body of newline-delimited JSON chunks into an
//! ordered stream of normalized [`Mutation`](weft_core::Mutation)
//! instructions: bytes are line-buffered (reassembling lines and multi-byte
//! characters split across reads), each line is classified into a closed set
//! of recognized chunk shapes, and each shape is lowered into mutations.

#![warn(missing_docs)]

pub mod error;
pub mod http;
pub mod lines;
pub mod parser;
pub mod stream;

pub use http::{create_headers, HttpClient, ReqwestClient, ResponseStream};
pub use lines::LineBuffer;
pub use parser::{Chunk, ChunkParser};
pub use stream::MutationStream;
