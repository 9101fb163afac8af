//! HTTP/1.1 response serializer.
//!
//! Renders exactly one response per connection: status line, headers,
//! blank line, body. The write half is flushed and shut down afterwards.

use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::response::Response;

/// Render a response into raw HTTP/1.1 bytes.
pub fn encode(response: &Response) -> Vec<u8> {
    let mut head = format!("HTTP/1.1 {} {}\r\n", response.status(), response.reason());
    for (name, value) in response.headers() {
        head.push_str(name);
        head.push_str(": ");
        head.push_str(value);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    let mut out = head.into_bytes();
    out.extend_from_slice(response.body());
    out
}

/// Write `response`, flush, and close the write side.
pub async fn write_response<W>(writer: &mut W, response: &Response) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&encode(response)).await?;
    writer.flush().await?;
    writer.shutdown().await
}
