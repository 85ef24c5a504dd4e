//! The packet codec: reads and writes the fixed big-endian frame layout.
//!
//! ```text
//! offset  size  field
//! 0       4     header (i32, be)
//! 4       4     body_length (i32, be, nonnegative)
//! 8       L     body (body_length bytes)
//! 8+L     2     footer (u16, be)
//! ```
//!
//! The codec does not interpret the header or body; it only moves bytes.

use std::time::Duration;

use bytes::{BufMut, Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::trace;

use crate::{ProtocolError, packet::Packet};

/// Encodes `packet` onto `writer` and flushes it.
///
/// The write and flush are a single logical unit: callers that share the
/// writer across logical packets (the multiplexer's routing discipline)
/// must not interleave another packet's bytes between this call and the
/// next.
pub async fn encode_packet<W: AsyncWrite + Unpin>(
    writer: &mut W,
    packet: &Packet,
) -> Result<(), ProtocolError> {
    let body = packet.body();
    let mut frame = BytesMut::with_capacity(10 + body.len());
    frame.put_i32(packet.header());
    frame.put_i32(i32::try_from(body.len()).unwrap_or(i32::MAX));
    frame.put_slice(body);
    frame.put_u16(packet.footer());

    writer.write_all(&frame).await?;
    writer.flush().await?;
    Ok(())
}

/// Reads one packet from `reader`.
///
/// `poll_window` bounds only the wait for the very first byte of the frame:
/// if nothing arrives within that window, [`ProtocolError::PollTimeout`] is
/// returned and no bytes have been consumed from a new frame. Once the
/// first byte has arrived, the remainder of the frame is read without a
/// deadline, since the peer is obligated to finish what it started.
pub async fn decode_packet<R: AsyncRead + Unpin>(
    reader: &mut R,
    poll_window: Duration,
) -> Result<Packet, ProtocolError> {
    let mut header_buf = [0u8; 4];
    match tokio::time::timeout(poll_window, reader.read(&mut header_buf[..1])).await {
        Err(_elapsed) => {
            trace!("no byte arrived within the poll window");
            return Err(ProtocolError::PollTimeout);
        },
        Ok(Ok(0)) => {
            trace!("peer closed the stream at a frame boundary");
            return Err(ProtocolError::EndOfStream);
        },
        Ok(Ok(_)) => {},
        Ok(Err(e)) => return Err(ProtocolError::Io(e)),
    }
    decode_packet_tail(reader, header_buf).await
}

/// Reads one packet from `reader` with no deadline on the first byte.
///
/// Used once a routing frame has announced that a payload frame is
/// immediately forthcoming: the peer is obligated to finish what it
/// started, so there is no polling window to honor.
pub async fn decode_packet_blocking<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Packet, ProtocolError> {
    let mut header_buf = [0u8; 4];
    let n = reader.read(&mut header_buf[..1]).await?;
    if n == 0 {
        return Err(ProtocolError::EndOfStream);
    }
    decode_packet_tail(reader, header_buf).await
}

async fn decode_packet_tail<R: AsyncRead + Unpin>(
    reader: &mut R,
    mut header_buf: [u8; 4],
) -> Result<Packet, ProtocolError> {
    read_full(reader, &mut header_buf[1..]).await?;
    let header = i32::from_be_bytes(header_buf);

    let mut len_buf = [0u8; 4];
    read_full(reader, &mut len_buf).await?;
    let body_len = i32::from_be_bytes(len_buf);
    if body_len < 0 {
        trace!(body_len, "rejecting negative body length");
        return Err(ProtocolError::NegativeLength(body_len));
    }
    let body_len = body_len as u32;

    let mut body = vec![0u8; body_len as usize];
    read_full(reader, &mut body).await?;

    let mut footer_buf = [0u8; 2];
    read_full(reader, &mut footer_buf).await?;
    let footer = u16::from_be_bytes(footer_buf);

    Ok(Packet::raw(header, Bytes::from(body), footer))
}

/// Reads until `buf` is completely filled, or returns [`ProtocolError::Truncated`]
/// reporting exactly how much of `buf` was still missing when the stream
/// ended.
async fn read_full<R: AsyncRead + Unpin>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<(), ProtocolError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..]).await?;
        if n == 0 {
            trace!(expected = buf.len() - filled, actual = filled, "frame truncated mid-read");
            return Err(ProtocolError::Truncated {
                expected: buf.len() - filled,
                actual: filled,
            });
        }
        filled += n;
    }
    Ok(())
}
