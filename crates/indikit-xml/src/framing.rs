//! Wire-message framing for raw byte streams.
//!
//! INDI connections carry no length prefix. A receiver accumulates
//! bytes and cuts messages out of its buffer by pattern: find a known
//! opening tag, then find that tag's terminator. The scan is a plain
//! substring search, not a tokenizer, so tag text hidden inside an
//! attribute value or a base64 payload can fool it. That fragility is
//! part of the wire contract with deployed peers and is kept as is.

/// Known top-level tags and their terminators, tried in table order.
/// The first table entry found anywhere in the buffer wins, even when
/// another tag starts earlier in the buffer.
const TAGS: &[(&[u8], &[u8])] = &[
    (b"<getProperties", b"/>"),
    (b"<delProperty", b"/>"),
    (b"<message", b"/>"),
    (b"<enableBLOB", b"</enableBLOB>"),
    (b"<newTextVector", b"</newTextVector>"),
    (b"<newNumberVector", b"</newNumberVector>"),
    (b"<newSwitchVector", b"</newSwitchVector>"),
    (b"<newLightVector", b"</newLightVector>"),
    (b"<newBLOBVector", b"</newBLOBVector>"),
];

/// Outcome of one scan over the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    /// No known opening tag in the buffer yet.
    NotFound,
    /// An opening tag starts at `start` but its terminator has not
    /// arrived. Keep the buffer and scan again after the next read.
    Partial { start: usize },
    /// One complete message spans `start..end`. The caller should hand
    /// that span to the parser and drain the buffer through `end`,
    /// discarding any bytes before `start`.
    Message { start: usize, end: usize },
}

/// Incremental message detector for one connection.
///
/// Once an opening tag is matched the scanner commits to it and only
/// looks for that tag's terminator on later scans, even if bytes
/// arriving in the meantime contain some other known tag. The buffer
/// passed to [`MessageScanner::scan`] must only grow between scans;
/// after a [`Detection::Message`] the caller drains it and the scanner
/// starts over.
#[derive(Debug, Default)]
pub struct MessageScanner {
    pending: Option<Pending>,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    tag: usize,
    start: usize,
}

impl MessageScanner {
    pub fn new() -> MessageScanner {
        MessageScanner::default()
    }

    pub fn scan(&mut self, buffer: &[u8]) -> Detection {
        let pending = match self.pending {
            Some(pending) => pending,
            None => match detect_opening(buffer) {
                Some(pending) => {
                    self.pending = Some(pending);
                    pending
                }
                None => return Detection::NotFound,
            },
        };
        let closer = TAGS[pending.tag].1;
        match find(&buffer[pending.start..], closer) {
            Some(i) => {
                self.pending = None;
                Detection::Message {
                    start: pending.start,
                    end: pending.start + i + closer.len(),
                }
            }
            None => Detection::Partial {
                start: pending.start,
            },
        }
    }
}

fn detect_opening(buffer: &[u8]) -> Option<Pending> {
    for (tag, (opener, _)) in TAGS.iter().enumerate() {
        if let Some(start) = find(buffer, opener) {
            return Some(Pending { tag, start });
        }
    }
    None
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
