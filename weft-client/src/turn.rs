//! One conversational turn: mutations in, snapshots and a final message out

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use weft_core::{Error, Message, Mutation, Snapshot, TurnAccumulator};
use weft_stream::MutationStream;

/// A progressive update from an in-flight turn
#[derive(Debug)]
pub enum TurnUpdate {
    /// State after one applied mutation, for progressive rendering
    Snapshot(Snapshot),
    /// The finalized message; emitted exactly once, then the stream ends
    Completed(Message),
    /// A transport failure ended the stream early.
    ///
    /// `partial` is the finalized form of everything aggregated before the
    /// failure; callers should surface the error in place of the streaming
    /// indicator without retracting content already shown.
    Failed {
        /// Finalized partial message
        partial: Message,
        /// The terminal transport error
        error: Error,
    },
}

/// Drives one stream into one accumulator.
///
/// Owns the turn's accumulator exclusively; a new request always gets a
/// fresh `TurnStream`. Dropping it cancels the turn: the transport is
/// released and no message is ever finalized for it.
pub struct TurnStream {
    mutations: MutationStream,
    accumulator: TurnAccumulator,
    finished: bool,
}

impl TurnStream {
    /// Wrap a mutation stream with a fresh accumulator
    pub fn new(mutations: MutationStream) -> Self {
        Self {
            mutations,
            accumulator: TurnAccumulator::new(),
            finished: false,
        }
    }

    /// The last response identifier seen, for threading a follow-up turn
    pub fn response_id(&self) -> Option<&str> {
        self.accumulator.response_id()
    }
}

impl Stream for TurnStream {
    type Item = TurnUpdate;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }
        match Pin::new(&mut self.mutations).poll_next(cx) {
            Poll::Ready(Some(Ok(mutation))) => {
                let terminal = matches!(mutation, Mutation::Finish);
                self.accumulator.apply(mutation);
                if terminal {
                    self.finished = true;
                    let message = self.accumulator.finalize();
                    Poll::Ready(Some(TurnUpdate::Completed(message)))
                } else {
                    Poll::Ready(Some(TurnUpdate::Snapshot(self.accumulator.snapshot())))
                }
            }
            Poll::Ready(Some(Err(error))) => {
                self.finished = true;
                let partial = self.accumulator.finalize();
                Poll::Ready(Some(TurnUpdate::Failed { partial, error }))
            }
            Poll::Ready(None) => {
                self.finished = true;
                let message = self.accumulator.finalize();
                Poll::Ready(Some(TurnUpdate::Completed(message)))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}
