//! Pull-based record cursor over a `quick_xml` event stream.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use tc_core::TcResult;

use crate::attrs::{Attrs, malformed};

// ── RecordShape ───────────────────────────────────────────────────────────────

/// How one repeated element of a document is assembled into a record.
///
/// The stream calls [`open`](Self::open) on the start tag of a `TAG` element,
/// [`child`](Self::child) and [`close_child`](Self::close_child) for every
/// element nested inside it (with its depth below the record, `1` for direct
/// children), and [`finish`](Self::finish) on its end tag.  Self-closing
/// children get a `child` immediately followed by `close_child`.
/// Elements a shape does not recognise should be ignored.
pub trait RecordShape {
    type Partial;
    type Record;

    /// Name of the repeated element.
    const TAG: &'static [u8];

    fn open(&self, attrs: &Attrs) -> TcResult<Self::Partial>;

    fn child(&self, _partial: &mut Self::Partial, _depth: usize, _tag: &[u8], _attrs: &Attrs) -> TcResult<()> {
        Ok(())
    }

    fn close_child(&self, _partial: &mut Self::Partial, _depth: usize, _tag: &[u8]) -> TcResult<()> {
        Ok(())
    }

    fn finish(&self, partial: Self::Partial) -> TcResult<Self::Record>;
}

// ── RecordStream ──────────────────────────────────────────────────────────────

/// Lazy iterator of records.  Fused: after an error or the end of the
/// document, `next` keeps returning `None`.
pub struct RecordStream<R: BufRead, S: RecordShape> {
    reader:  Reader<R>,
    shape:   S,
    buf:     Vec<u8>,
    /// Current element depth in the document.
    depth:   usize,
    /// Depth of the open record element and its partial state.
    open:    Option<(usize, S::Partial)>,
    yielded: usize,
    done:    bool,
}

impl<R: BufRead, S: RecordShape> RecordStream<R, S> {
    pub fn new(source: R, shape: S) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.trim_text(true);
        Self {
            reader,
            shape,
            buf: Vec::new(),
            depth: 0,
            open: None,
            yielded: 0,
            done: false,
        }
    }

    /// Records yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    fn advance(&mut self) -> TcResult<Option<S::Record>> {
        // The buffer is taken out for the duration of one event so the event
        // can borrow it while `self` is mutated.
        let mut buf = std::mem::take(&mut self.buf);
        loop {
            let event = self.reader.read_event_into(&mut buf).map_err(|e| {
                malformed(format!("at byte {}: {e}", self.reader.buffer_position()))
            })?;
            let record = match event {
                Event::Start(e) => {
                    self.depth += 1;
                    self.enter(&e, self.depth, false)?
                }
                Event::Empty(e) => self.enter(&e, self.depth + 1, true)?,
                Event::End(e) => {
                    let record = self.leave(e.name().as_ref())?;
                    self.depth = self.depth.saturating_sub(1);
                    record
                }
                Event::Eof => {
                    if self.depth != 0 || self.open.is_some() {
                        return Err(malformed(format!(
                            "document ends inside an open element (depth {})",
                            self.depth
                        )));
                    }
                    debug!(records = self.yielded, "end of document");
                    return Ok(None);
                }
                _ => None,
            };
            buf.clear();
            if let Some(record) = record {
                self.buf = buf;
                self.yielded += 1;
                return Ok(Some(record));
            }
        }
    }

    fn enter(&mut self, e: &BytesStart<'_>, depth: usize, self_closing: bool) -> TcResult<Option<S::Record>> {
        let name = e.name();
        let tag = name.as_ref();
        if let Some((root, partial)) = self.open.as_mut() {
            let rel = depth - *root;
            let attrs = Attrs::from_start(e)?;
            self.shape.child(partial, rel, tag, &attrs)?;
            if self_closing {
                self.shape.close_child(partial, rel, tag)?;
            }
            return Ok(None);
        }
        if tag != S::TAG {
            return Ok(None);
        }
        let partial = self.shape.open(&Attrs::from_start(e)?)?;
        if self_closing {
            return self.shape.finish(partial).map(Some);
        }
        self.open = Some((depth, partial));
        Ok(None)
    }

    fn leave(&mut self, tag: &[u8]) -> TcResult<Option<S::Record>> {
        match self.open.take() {
            Some((root, partial)) if root == self.depth => self.shape.finish(partial).map(Some),
            Some((root, mut partial)) => {
                self.shape.close_child(&mut partial, self.depth - root, tag)?;
                self.open = Some((root, partial));
                Ok(None)
            }
            None => Ok(None),
        }
    }
}

impl<S: RecordShape> RecordStream<BufReader<File>, S> {
    pub fn from_file(path: &Path, shape: S) -> TcResult<Self> {
        debug!(path = %path.display(), "opening result document");
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file), shape))
    }
}

impl<R: BufRead, S: RecordShape> Iterator for RecordStream<R, S> {
    type Item = TcResult<S::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.advance() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: BufRead, S: RecordShape> std::iter::FusedIterator for RecordStream<R, S> {}
