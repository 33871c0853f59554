//! Length-prefixed message framing over any async byte stream.
//!
//! Every frame is a fixed 10-byte header followed by a bincode payload.
//! The header is the payload length in ASCII decimal, left-justified and
//! space-padded (`"137       "`), so a frame is readable in a packet dump.
//! Payloads may be arbitrarily large (up to a sanity cap) and span as many
//! underlying reads as needed.
//!
//! Receiving collapses every failure mode to `None`: the peer is gone or
//! the stream can no longer be trusted, and the caller tears the
//! connection down either way. Nothing in this module panics.

use crate::protocol::Message;
use bincode::Options;
use log::{debug, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

///Fixed size of the ASCII length header.
pub const HEADER_SIZE: usize = 10;

///Upper bound on a declared payload length. A header past this is a
///protocol violation, not a big snapshot.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

///Bincode configuration for payloads: fixed-int little-endian (the same
///bytes `bincode::serialize` produces) plus trailing-byte rejection, so a
///payload that decodes short of its declared length is an error instead
///of a silent truncation.
fn wire_options() -> impl Options {
    bincode::options()
        .with_fixint_encoding()
        .with_limit(MAX_FRAME_LEN as u64)
}

///Serializes a message into a complete frame (header + payload).
pub fn encode_message(msg: &Message) -> Result<Vec<u8>, bincode::Error> {
    let payload = wire_options().serialize(msg)?;
    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.extend_from_slice(format!("{:<width$}", payload.len(), width = HEADER_SIZE).as_bytes());
    frame.extend_from_slice(&payload);
    Ok(frame)
}

///Decodes one payload. Fails on trailing bytes.
pub fn decode_message(payload: &[u8]) -> Result<Message, bincode::Error> {
    wire_options().deserialize(payload)
}

///Writes one message as a single frame. Any failure means the peer should
///be treated as gone.
pub async fn send_message<W>(writer: &mut W, msg: &Message) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let frame = encode_message(msg)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

///Reads one message. Returns `None` when the connection is closed or the
///stream is desynced: closed before or inside the header, a non-numeric
///header, a declared length over [`MAX_FRAME_LEN`], a short payload read,
///or a payload that does not decode to exactly one message.
pub async fn recv_message<R>(reader: &mut R) -> Option<Message>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_SIZE];
    if let Err(e) = reader.read_exact(&mut header).await {
        debug!("Connection closed while reading frame header: {}", e);
        return None;
    }

    let header_text = match std::str::from_utf8(&header) {
        Ok(text) => text,
        Err(_) => {
            warn!("Frame header is not ASCII: {:?}", header);
            return None;
        }
    };
    let declared_len: usize = match header_text.trim().parse() {
        Ok(len) => len,
        Err(_) => {
            warn!("Frame header is not a decimal length: {:?}", header_text);
            return None;
        }
    };
    if declared_len > MAX_FRAME_LEN {
        warn!(
            "Declared frame length {} exceeds the {} byte cap",
            declared_len, MAX_FRAME_LEN
        );
        return None;
    }

    let mut payload = vec![0u8; declared_len];
    if let Err(e) = reader.read_exact(&mut payload).await {
        warn!("Connection closed mid-payload ({} bytes declared): {}", declared_len, e);
        return None;
    }

    match decode_message(&payload) {
        Ok(msg) => Some(msg),
        Err(e) => {
            warn!("Discarding undecodable {} byte frame: {}", declared_len, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Vec2;
    use tokio::io::AsyncWriteExt;

    fn sample_input() -> Message {
        Message::PlayerInput {
            move_vector: Vec2::new(1.0, 0.0),
            attack: true,
            interact: false,
        }
    }

    fn assert_is_sample_input(msg: Message) {
        match msg {
            Message::PlayerInput {
                move_vector,
                attack,
                interact,
            } => {
                assert_eq!(move_vector, Vec2::new(1.0, 0.0));
                assert!(attack);
                assert!(!interact);
            }
            _ => panic!("Wrong message type after framing roundtrip"),
        }
    }

    #[test]
    fn test_header_format() {
        let frame = encode_message(&sample_input()).unwrap();
        let header = std::str::from_utf8(&frame[..HEADER_SIZE]).unwrap();
        let declared: usize = header.trim().parse().unwrap();
        assert_eq!(declared, frame.len() - HEADER_SIZE);
        // Left-justified: digits first, spaces after.
        assert!(!header.starts_with(' '));
        assert!(header.ends_with(' '));
    }

    #[test]
    fn test_payload_matches_plain_bincode() {
        let msg = sample_input();
        let frame = encode_message(&msg).unwrap();
        let plain = bincode::serialize(&msg).unwrap();
        assert_eq!(&frame[HEADER_SIZE..], &plain[..]);
    }

    #[tokio::test]
    async fn test_roundtrip() {
        let (mut a, mut b) = tokio::io::duplex(1024);
        send_message(&mut a, &sample_input()).await.unwrap();
        let msg = recv_message(&mut b).await.unwrap();
        assert_is_sample_input(msg);
    }

    #[tokio::test]
    async fn test_large_payload_spans_many_reads() {
        // An 8 KiB message through a 64 byte pipe exercises chunked reads
        // and writes on both sides.
        let big = Message::Error {
            message: "x".repeat(8192),
        };
        let (mut a, mut b) = tokio::io::duplex(64);
        let writer = tokio::spawn(async move {
            send_message(&mut a, &big).await.unwrap();
        });
        let msg = recv_message(&mut b).await.unwrap();
        match msg {
            Message::Error { message } => assert_eq!(message.len(), 8192),
            _ => panic!("Wrong message type after framing roundtrip"),
        }
        writer.await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_before_header_is_sentinel() {
        let (a, mut b) = tokio::io::duplex(64);
        drop(a);
        assert!(recv_message(&mut b).await.is_none());
    }

    #[tokio::test]
    async fn test_closed_inside_header_is_sentinel() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(b"42").await.unwrap();
        drop(a);
        assert!(recv_message(&mut b).await.is_none());
    }

    #[tokio::test]
    async fn test_non_numeric_header_is_sentinel() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(b"meat??????").await.unwrap();
        drop(a);
        assert!(recv_message(&mut b).await.is_none());
    }

    #[tokio::test]
    async fn test_oversize_declaration_is_sentinel() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(b"999999999 ").await.unwrap();
        drop(a);
        assert!(recv_message(&mut b).await.is_none());
    }

    #[tokio::test]
    async fn test_short_payload_is_sentinel() {
        let (mut a, mut b) = tokio::io::duplex(64);
        a.write_all(b"100       ").await.unwrap();
        a.write_all(&[0u8; 10]).await.unwrap();
        drop(a);
        assert!(recv_message(&mut b).await.is_none());
    }

    #[tokio::test]
    async fn test_payload_longer_than_message_fails_closed() {
        // Declared length covers the message plus trailing garbage. The
        // frame must be rejected, never truncated to the valid prefix.
        let mut payload = bincode::serialize(&sample_input()).unwrap();
        payload.extend_from_slice(&[0xFF; 5]);
        let (mut a, mut b) = tokio::io::duplex(256);
        a.write_all(format!("{:<width$}", payload.len(), width = HEADER_SIZE).as_bytes())
            .await
            .unwrap();
        a.write_all(&payload).await.unwrap();
        drop(a);
        assert!(recv_message(&mut b).await.is_none());
    }

    #[tokio::test]
    async fn test_declared_shorter_than_message_fails_closed() {
        let payload = bincode::serialize(&sample_input()).unwrap();
        let (mut a, mut b) = tokio::io::duplex(256);
        a.write_all(b"4         ").await.unwrap();
        a.write_all(&payload).await.unwrap();
        drop(a);
        // Four bytes of a real message do not decode.
        assert!(recv_message(&mut b).await.is_none());
    }

    #[tokio::test]
    async fn test_send_to_closed_peer_errors() {
        let (mut a, b) = tokio::io::duplex(64);
        drop(b);
        assert!(send_message(&mut a, &sample_input()).await.is_err());
    }

    #[tokio::test]
    async fn test_back_to_back_frames() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        send_message(&mut a, &sample_input()).await.unwrap();
        send_message(&mut a, &Message::PlayerDisconnect { id: 9 }).await.unwrap();
        assert_is_sample_input(recv_message(&mut b).await.unwrap());
        match recv_message(&mut b).await.unwrap() {
            Message::PlayerDisconnect { id } => assert_eq!(id, 9),
            _ => panic!("Wrong message type after framing roundtrip"),
        }
    }
}
