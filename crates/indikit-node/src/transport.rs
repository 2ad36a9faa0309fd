//! Transport seams between the node and the outside world.
//!
//! The node never owns a socket. An embedding wires it to concrete
//! stacks through these traits: [`Transport`] carries protocol frames
//! (raw client connections plus a broker), [`StreamSink`] carries
//! streaming-telemetry commands to a Redis-compatible endpoint. Tests
//! substitute recorders.

/// Identifies one protocol client connection, for broadcast exclusion.
pub type ConnId = u64;

/// Outbound fan-out for protocol frames.
pub trait Transport {
    /// Sends a frame to every connected protocol client except the
    /// excluded connection.
    fn broadcast(&self, frame: &[u8], exclude: Option<ConnId>);

    /// Publishes a frame on a broker topic.
    fn publish(&self, topic: &str, frame: &[u8]);

    /// Subscribes to a broker topic.
    fn subscribe(&self, topic: &str);
}

/// Outbound sink for streaming-telemetry commands.
pub trait StreamSink {
    /// Hands one encoded command to the endpoint.
    fn send(&self, frame: &[u8]);
}

/// Encodes an `AUTH` command in RESP.
pub fn encode_auth(password: &str) -> Vec<u8> {
    let mut frame = Vec::with_capacity(32 + password.len());
    frame.extend_from_slice(b"*2\r\n$4\r\nAUTH\r\n");
    push_bulk(&mut frame, password.as_bytes());
    frame
}

/// Encodes an `XADD <stream> MAXLEN ~ <max_len> * <name> <value> ...`
/// command in RESP, with approximate trimming and an auto-generated
/// entry id. Returns an empty frame when there are no fields.
pub fn encode_xadd(stream: &str, max_len: usize, fields: &[(&str, &[u8])]) -> Vec<u8> {
    if fields.is_empty() {
        return Vec::new();
    }
    let mut frame = Vec::new();
    frame.extend_from_slice(format!("*{}\r\n", 6 + 2 * fields.len()).as_bytes());
    frame.extend_from_slice(b"$4\r\nXADD\r\n");
    push_bulk(&mut frame, stream.as_bytes());
    frame.extend_from_slice(b"$6\r\nMAXLEN\r\n");
    frame.extend_from_slice(b"$1\r\n~\r\n");
    push_bulk(&mut frame, max_len.to_string().as_bytes());
    frame.extend_from_slice(b"$1\r\n*\r\n");
    for &(name, value) in fields {
        push_bulk(&mut frame, name.as_bytes());
        push_bulk(&mut frame, value);
    }
    frame
}

fn push_bulk(frame: &mut Vec<u8>, bytes: &[u8]) {
    frame.extend_from_slice(format!("${}\r\n", bytes.len()).as_bytes());
    frame.extend_from_slice(bytes);
    frame.extend_from_slice(b"\r\n");
}
