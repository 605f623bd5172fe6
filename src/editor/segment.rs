use super::{byte_offset, session::Session};
use crate::IssueKind;

pub const EMPTY_PLACEHOLDER: &str = "No preview available for this file.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Plain,
    Issue(IssueKind),
    Placeholder,
}

/// One display segment: a run of buffer text, either plain or covered by a
/// pending issue of the given kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub kind: SegmentKind,
}

/// Lazy walk of the buffer in ascending issue order: a plain segment for the
/// gap before each pending span, a tagged segment for the span itself, and a
/// plain tail after the last one. Concatenating the texts reproduces the
/// buffer exactly once. Restartable by calling [`Session::segments`] again.
#[derive(Debug, Clone)]
pub struct Segments<'a> {
    buffer: &'a str,
    spans: Vec<(usize, usize, IssueKind)>,
    next_span: usize,
    cursor: usize,
    placeholder_emitted: bool,
}

impl Session {
    pub fn segments(&self) -> Segments<'_> {
        let buffer = self.buffer();
        let mut spans = Vec::new();
        let mut cursor = 0;

        let mut pending: Vec<_> = self.pending().collect();
        pending.sort_by_key(|i| i.position.start);

        for issue in pending {
            // Clamp into the buffer and behind the previous span; session
            // ranges are disjoint so the second clamp only bites on
            // out-of-range anchors.
            let start = byte_offset(buffer, issue.position.start).max(cursor);
            let end = byte_offset(buffer, issue.position.end).max(start);
            spans.push((start, end, issue.kind));
            cursor = end;
        }

        Segments {
            buffer,
            spans,
            next_span: 0,
            cursor: 0,
            placeholder_emitted: false,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if self.buffer.is_empty() {
            if self.placeholder_emitted {
                return None;
            }
            self.placeholder_emitted = true;
            return Some(Segment {
                text: EMPTY_PLACEHOLDER,
                kind: SegmentKind::Placeholder,
            });
        }

        if let Some(&(start, end, kind)) = self.spans.get(self.next_span) {
            if self.cursor < start {
                let text = &self.buffer[self.cursor..start];
                self.cursor = start;
                return Some(Segment {
                    text,
                    kind: SegmentKind::Plain,
                });
            }
            self.cursor = end;
            self.next_span += 1;
            return Some(Segment {
                text: &self.buffer[start..end],
                kind: SegmentKind::Issue(kind),
            });
        }

        if self.cursor < self.buffer.len() {
            let text = &self.buffer[self.cursor..];
            self.cursor = self.buffer.len();
            return Some(Segment {
                text,
                kind: SegmentKind::Plain,
            });
        }

        None
    }
}
