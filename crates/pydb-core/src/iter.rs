//! # Remote List Iterators
//!
//! Cursor walks over the runtime's singly linked lists:
//!
//! - interpreters, linked by `PyInterpreterState.next`
//! - threads of an interpreter, linked by `PyThreadState.next`
//! - frames of a thread, innermost first, linked by `PyFrameObject.f_back`
//!
//! Iterators yield addresses only. Each step re-reads the record at the
//! cursor to find the next link, so nothing learned on an earlier step is
//! trusted on a later one.
//!
//! ## End of Iteration
//!
//! A null link and a failed read both end the walk. A list that was torn
//! down while we walked it looks the same as one that ended cleanly, and
//! both should just stop. A record that links to itself also ends the walk
//! after it is yielded. Once exhausted, an iterator stays exhausted.

use std::iter::FusedIterator;

use tracing::trace;

use crate::reader::Reader;
use crate::remote::RemoteProcess;
use crate::types::Address;

/// Which list an iterator walks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterKind
{
    /// Interpreter states
    Interpreter,
    /// Thread states of one interpreter
    Thread,
    /// Frames of one thread
    Frame,
}

/// Cursor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IterState
{
    /// Next element to yield (null means the list is empty from here)
    Active(Address),
    /// Nothing more will be yielded
    Exhausted,
}

/// Iterator over one remote linked list
///
/// Holds only a borrowed process handle and the cursor; dropping it at any
/// point is safe.
pub struct RemoteIter<'p, P: ?Sized>
{
    reader: Reader<'p, P>,
    kind: IterKind,
    state: IterState,
}

impl<'p, P: RemoteProcess + ?Sized> RemoteIter<'p, P>
{
    pub(crate) fn new(reader: Reader<'p, P>, kind: IterKind, start: Address) -> Self
    {
        trace!(?kind, %start, "iterator created");
        Self {
            reader,
            kind,
            state: IterState::Active(start),
        }
    }

    pub fn kind(&self) -> IterKind
    {
        self.kind
    }

    pub fn state(&self) -> IterState
    {
        self.state
    }

    /// Yield the current element and move the cursor to its successor.
    ///
    /// Returns `None` at the end of the list, after a failed read, and on
    /// every call after that.
    pub fn advance(&mut self) -> Option<Address>
    {
        let current = match self.state {
            IterState::Active(current) if !current.is_null() => current,
            _ => {
                self.state = IterState::Exhausted;
                return None;
            }
        };

        let layout = self.reader.layout();
        let (size, link) = match self.kind {
            IterKind::Interpreter => (layout.interpreter.size, layout.interpreter.next),
            IterKind::Thread => (layout.thread.size, layout.thread.next),
            IterKind::Frame => (layout.frame.size, layout.frame.f_back),
        };

        match self.reader.read_record(current, size) {
            Ok(record) => {
                let next = record.pointer(link);
                trace!(kind = ?self.kind, %current, %next, "iterator step");
                self.state = if next == current {
                    IterState::Exhausted
                } else {
                    IterState::Active(next)
                };
                Some(current)
            }
            Err(err) => {
                trace!(kind = ?self.kind, %current, %err, "iterator stopped on read failure");
                self.state = IterState::Exhausted;
                None
            }
        }
    }

    /// Release the iterator. Equivalent to dropping it.
    pub fn fini(self) {}
}

impl<P: RemoteProcess + ?Sized> Iterator for RemoteIter<'_, P>
{
    type Item = Address;

    fn next(&mut self) -> Option<Self::Item>
    {
        self.advance()
    }
}

impl<P: RemoteProcess + ?Sized> FusedIterator for RemoteIter<'_, P> {}
