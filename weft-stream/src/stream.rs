//! The mutation stream: one read loop from bytes to ordered mutations

use std::collections::VecDeque;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tracing::debug;
use weft_core::{Error, Mutation};

use crate::http::ResponseStream;
use crate::lines::LineBuffer;
use crate::parser::ChunkParser;

/// Streams normalized mutation instructions decoded from a response body.
///
/// Exactly one of these exists per in-flight turn. All classification
/// happens synchronously between reads, so mutations come out in strict
/// arrival order. A transport failure is surfaced once as
/// [`Error::Transport`] and ends the stream; everything classified before
/// the failure has already been yielded.
pub struct MutationStream {
    inner: ResponseStream,
    lines: LineBuffer,
    parser: ChunkParser,
    pending: VecDeque<Mutation>,
    done: bool,
}

impl MutationStream {
    /// Wrap a response byte stream
    pub fn new(inner: ResponseStream) -> Self {
        Self {
            inner,
            lines: LineBuffer::new(),
            parser: ChunkParser::new(),
            pending: VecDeque::new(),
            done: false,
        }
    }

    fn classify_line(&mut self, line: &str) {
        match self.parser.parse_line(line) {
            Some(mutations) => self.pending.extend(mutations),
            None => debug!(len = line.len(), "dropped malformed line"),
        }
    }
}

impl Stream for MutationStream {
    type Item = Result<Mutation, Error>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            if let Some(mutation) = self.pending.pop_front() {
                return Poll::Ready(Some(Ok(mutation)));
            }
            if self.done {
                return Poll::Ready(None);
            }

            match self.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(Ok(chunk))) => {
                    let lines = self.lines.push(&chunk);
                    for line in lines {
                        self.classify_line(&line);
                    }
                }
                Poll::Ready(Some(Err(err))) => {
                    self.done = true;
                    return Poll::Ready(Some(Err(crate::error::transport_error(err))));
                }
                Poll::Ready(None) => {
                    self.done = true;
                    if let Some(line) = self.lines.flush() {
                        self.classify_line(&line);
                    }
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
