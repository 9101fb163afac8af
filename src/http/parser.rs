//! HTTP/1.1 wire parser.
//!
//! # Responsibilities
//! - Read the request line, header block and fixed-length body
//! - Enforce line, header-count and body-size limits before buffering
//! - Classify every failure so the server can answer 400
//!
//! # Design Decisions
//! - Reads through `AsyncBufRead` so tests can feed byte slices
//! - Oversized bodies are rejected from the declared length alone; no body
//!   byte is consumed
//! - Only `content-length` bodies; no chunked transfer-encoding

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};

use crate::config::LimitsConfig;
use crate::http::request::Request;

/// Reasons a request could not be parsed.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed request line")]
    MalformedRequestLine,

    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),

    #[error("line exceeds {max} bytes")]
    LineTooLong { max: usize },

    #[error("more than {max} headers")]
    TooManyHeaders { max: usize },

    #[error("declared body of {declared} bytes exceeds limit of {max}")]
    BodyTooLarge { declared: usize, max: usize },

    #[error("body truncated: expected {expected} bytes, received {received}")]
    TruncatedBody { expected: usize, received: usize },

    #[error("I/O error while reading request: {0}")]
    Io(#[from] std::io::Error),
}

/// Reads one request from a buffered stream.
#[derive(Debug, Clone)]
pub struct RequestParser {
    limits: LimitsConfig,
}

impl RequestParser {
    pub fn new(limits: LimitsConfig) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &LimitsConfig {
        &self.limits
    }

    /// Parse a single request from `reader`.
    pub async fn parse<R>(&self, reader: &mut R) -> Result<Request, ParseError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut line = Vec::new();

        // Request line
        let terminated = self.read_line(reader, &mut line).await?;
        if !terminated {
            return Err(ParseError::MalformedRequestLine);
        }
        let request_line =
            std::str::from_utf8(trim_eol(&line)).map_err(|_| ParseError::MalformedRequestLine)?;
        let (method, target, version) = split_request_line(request_line)?;
        let mut builder = Request::builder(method, target).http_version(version);

        // Headers
        let mut content_length = None;
        let mut count = 0;
        loop {
            let terminated = self.read_line(reader, &mut line).await?;
            if !terminated {
                return Err(ParseError::MalformedHeader("missing blank line after headers"));
            }
            let raw = trim_eol(&line);
            if raw.is_empty() {
                break;
            }

            count += 1;
            if count > self.limits.max_headers {
                return Err(ParseError::TooManyHeaders {
                    max: self.limits.max_headers,
                });
            }

            let text = std::str::from_utf8(raw)
                .map_err(|_| ParseError::MalformedHeader("header is not valid UTF-8"))?;
            let (name, value) = split_header(text)?;
            if name.eq_ignore_ascii_case("content-length") {
                if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(ParseError::MalformedHeader("invalid content-length"));
                }
                let len = value
                    .parse::<usize>()
                    .map_err(|_| ParseError::MalformedHeader("invalid content-length"))?;
                content_length = Some(len);
            }
            builder = builder.header(name, value);
        }

        // Body
        if let Some(expected) = content_length {
            if expected > self.limits.max_body_size {
                return Err(ParseError::BodyTooLarge {
                    declared: expected,
                    max: self.limits.max_body_size,
                });
            }

            let mut body = Vec::with_capacity(expected);
            (&mut *reader)
                .take(expected as u64)
                .read_to_end(&mut body)
                .await?;
            if body.len() < expected {
                return Err(ParseError::TruncatedBody {
                    expected,
                    received: body.len(),
                });
            }
            builder = builder.body(body);
        }

        Ok(builder.build())
    }

    /// Read one line into `buf`. Returns whether it ended with `\n`.
    async fn read_line<R>(&self, reader: &mut R, buf: &mut Vec<u8>) -> Result<bool, ParseError>
    where
        R: AsyncBufRead + Unpin,
    {
        buf.clear();
        let max = self.limits.max_line_bytes;
        let n = (&mut *reader)
            .take(max as u64)
            .read_until(b'\n', buf)
            .await?;

        let terminated = buf.last() == Some(&b'\n');
        if n == max && !terminated {
            return Err(ParseError::LineTooLong { max });
        }
        Ok(terminated)
    }
}

fn trim_eol(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}

fn split_request_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let mut parts = line.split(' ');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(target), Some(version), None)
            if !method.is_empty() && !target.is_empty() && !version.is_empty() =>
        {
            Ok((method, target, version))
        }
        _ => Err(ParseError::MalformedRequestLine),
    }
}

fn split_header(line: &str) -> Result<(&str, &str), ParseError> {
    let (name, value) = line
        .split_once(':')
        .ok_or(ParseError::MalformedHeader("missing colon"))?;
    let name = name.trim();
    if name.is_empty() || name.contains(char::is_whitespace) {
        return Err(ParseError::MalformedHeader("invalid header name"));
    }
    Ok((name, value.trim()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parser(max_body_size: usize) -> RequestParser {
        RequestParser::new(LimitsConfig {
            max_body_size,
            ..LimitsConfig::default()
        })
    }

    async fn parse(input: &[u8]) -> Result<Request, ParseError> {
        let mut reader = input;
        parser(1024).parse(&mut reader).await
    }

    #[tokio::test]
    async fn parses_simple_get() {
        let req = parse(b"GET /users?name=ann HTTP/1.1\r\nHost: localhost\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(req.method(), "GET");
        assert_eq!(req.path(), "/users");
        assert_eq!(req.http_version(), "HTTP/1.1");
        assert_eq!(req.query_params()["name"], vec!["ann"]);
        assert_eq!(req.header("host"), Some("localhost"));
        assert!(req.body().is_empty());
    }

    #[tokio::test]
    async fn parses_json_post() {
        let req = parse(
            b"POST /users HTTP/1.1\r\nContent-Type: application/json\r\nContent-Length: 12\r\n\r\n{\"name\":\"x\"}",
        )
        .await
        .unwrap();
        assert_eq!(req.body(), br#"{"name":"x"}"#);
        assert_eq!(req.json(), Some(&json!({"name": "x"})));
    }

    #[tokio::test]
    async fn non_json_body_is_kept_raw() {
        let req = parse(
            b"POST /users HTTP/1.1\r\ncontent-type: application/json\r\ncontent-length: 8\r\n\r\nnot json",
        )
        .await
        .unwrap();
        assert!(req.json().is_none());
        assert_eq!(req.body(), b"not json");
    }

    #[tokio::test]
    async fn header_value_may_contain_colons() {
        let req = parse(b"GET / HTTP/1.1\r\nReferer: http://a.b:8080/x\r\n\r\n")
            .await
            .unwrap();
        assert_eq!(req.header("referer"), Some("http://a.b:8080/x"));
    }

    #[tokio::test]
    async fn accepts_bare_lf_line_endings() {
        let req = parse(b"GET /a HTTP/1.1\nX-A: 1\n\n").await.unwrap();
        assert_eq!(req.header("x-a"), Some("1"));
    }

    #[tokio::test]
    async fn empty_stream_is_malformed_request_line() {
        assert!(matches!(parse(b"").await, Err(ParseError::MalformedRequestLine)));
    }

    #[tokio::test]
    async fn request_line_needs_three_parts() {
        for line in [
            &b"GET /missing\r\n\r\n"[..],
            b"GET  /double-space HTTP/1.1\r\n\r\n",
            b"GET / HTTP/1.1 extra\r\n\r\n",
            b"GET / HTTP/1.1",
        ] {
            assert!(
                matches!(parse(line).await, Err(ParseError::MalformedRequestLine)),
                "accepted {:?}",
                String::from_utf8_lossy(line)
            );
        }
    }

    #[tokio::test]
    async fn header_without_colon_is_rejected() {
        let result = parse(b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n").await;
        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
    }

    #[tokio::test]
    async fn missing_header_terminator_is_rejected() {
        let result = parse(b"GET / HTTP/1.1\r\nHost: x\r\n").await;
        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
    }

    #[tokio::test]
    async fn invalid_content_length_is_rejected() {
        let result = parse(b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n").await;
        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
    }

    #[tokio::test]
    async fn content_length_must_be_plain_digits() {
        for value in ["+5", " ", "5 5", "0x5", "5.0"] {
            let input = format!("POST / HTTP/1.1\r\nContent-Length: {value}\r\n\r\nhello");
            let result = parse(input.as_bytes()).await;
            assert!(
                matches!(result, Err(ParseError::MalformedHeader(_))),
                "accepted {value:?}"
            );
        }
    }

    #[tokio::test]
    async fn non_utf8_request_line_is_rejected() {
        let result = parse(b"GET /\xff HTTP/1.1\r\n\r\n").await;
        assert!(matches!(result, Err(ParseError::MalformedRequestLine)));
    }

    #[tokio::test]
    async fn non_utf8_header_is_rejected() {
        let result = parse(b"GET / HTTP/1.1\r\nX-A: \xff\r\n\r\n").await;
        assert!(matches!(result, Err(ParseError::MalformedHeader(_))));
    }

    #[tokio::test]
    async fn body_at_limit_is_accepted() {
        let mut input = b"POST /up HTTP/1.1\r\nContent-Length: 8\r\n\r\n".to_vec();
        input.extend_from_slice(b"12345678");
        let mut reader = &input[..];
        let req = parser(8).parse(&mut reader).await.unwrap();
        assert_eq!(req.body(), b"12345678");
    }

    #[tokio::test]
    async fn body_over_limit_is_rejected_without_reading_it() {
        let mut input = b"POST /up HTTP/1.1\r\nContent-Length: 9\r\n\r\n".to_vec();
        input.extend_from_slice(b"123456789");
        let mut reader = &input[..];

        let result = parser(8).parse(&mut reader).await;
        assert!(matches!(
            result,
            Err(ParseError::BodyTooLarge { declared: 9, max: 8 })
        ));
        assert_eq!(reader, b"123456789");
    }

    #[tokio::test]
    async fn truncated_body_is_rejected() {
        let result = parse(b"POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await;
        assert!(matches!(
            result,
            Err(ParseError::TruncatedBody { expected: 10, received: 3 })
        ));
    }

    #[tokio::test]
    async fn body_stops_at_declared_length() {
        let mut reader = &b"POST / HTTP/1.1\r\nContent-Length: 3\r\n\r\nabcdef"[..];
        let req = parser(1024).parse(&mut reader).await.unwrap();
        assert_eq!(req.body(), b"abc");
        assert_eq!(reader, b"def");
    }

    #[tokio::test]
    async fn overlong_line_is_rejected() {
        let parser = RequestParser::new(LimitsConfig {
            max_line_bytes: 16,
            ..LimitsConfig::default()
        });
        let mut reader = &b"GET /a-very-long-path-indeed HTTP/1.1\r\n\r\n"[..];
        let result = parser.parse(&mut reader).await;
        assert!(matches!(result, Err(ParseError::LineTooLong { max: 16 })));
    }

    #[tokio::test]
    async fn too_many_headers_is_rejected() {
        let parser = RequestParser::new(LimitsConfig {
            max_headers: 2,
            ..LimitsConfig::default()
        });
        let mut reader = &b"GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n"[..];
        let result = parser.parse(&mut reader).await;
        assert!(matches!(result, Err(ParseError::TooManyHeaders { max: 2 })));
    }
}
