// src/core/net.rs
// HTTP/1.0 over plain TCP (no TLS). The server closes the connection at the end,
// so there is no chunked transfer to deal with.

use std::{io::{Read, Write}, net::{SocketAddr, TcpStream}, time::Duration};

use url::Url;

use crate::error::{Error, Result};

const TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!("colvis/", env!("CARGO_PKG_VERSION"));

/// Status code + body of a completed exchange.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub body: String,
}

impl Response {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// GET `url`; any status is returned (callers decide what is a failure).
pub fn http_get(url: &Url) -> Result<Response> {
    exchange(url, "GET", None)
}

/// POST a urlencoded body to `url`.
pub fn http_post_form(url: &Url, body: &str) -> Result<Response> {
    exchange(url, "POST", Some(body))
}

fn exchange(url: &Url, method: &str, body: Option<&str>) -> Result<Response> {
    if url.scheme() != "http" {
        return Err(Error::Unsupported(format!("scheme '{}' ({})", url.scheme(), url)));
    }
    let host = url.host_str().ok_or_else(|| Error::Unsupported(format!("no host in {url}")))?;
    let addrs = socket_addrs(url)?;

    let mut target = s!(url.path());
    if let Some(q) = url.query() {
        target.push('?');
        target.push_str(q);
    }

    let mut s = TcpStream::connect(addrs.as_slice())?;
    s.set_read_timeout(Some(TIMEOUT))?;
    s.set_write_timeout(Some(TIMEOUT))?;

    let mut req = format!(
        "{method} {target} HTTP/1.0\r\nHost: {host}\r\nUser-Agent: {USER_AGENT}\r\nAccept: application/json, text/html\r\nConnection: close\r\n"
    );
    if let Some(b) = body {
        req.push_str("Content-Type: application/x-www-form-urlencoded\r\n");
        req.push_str(&format!("Content-Length: {}\r\n", b.len()));
    }
    req.push_str("\r\n");
    if let Some(b) = body {
        req.push_str(b);
    }
    logd!("HTTP: {} {}", method, url);
    s.write_all(req.as_bytes())?;
    s.flush()?;

    let mut buf = Vec::new();
    s.read_to_end(&mut buf)?;
    parse_response(&String::from_utf8_lossy(&buf))
}

/// Resolved addresses for `url`. IPv6 literals lose their brackets here; `host_str` keeps them.
pub fn socket_addrs(url: &Url) -> Result<Vec<SocketAddr>> {
    Ok(url.socket_addrs(|| Some(80))?)
}

/// Split a raw HTTP/1.x response into status + body.
pub fn parse_response(raw: &str) -> Result<Response> {
    let status_line = raw.split("\r\n").next().unwrap_or("");
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or_else(|| Error::http(0, format!("Malformed status line: {status_line:?}")))?;
    let body_idx = raw
        .find("\r\n\r\n")
        .ok_or_else(|| Error::http(status, "Malformed HTTP response"))?
        + 4;
    Ok(Response { status, body: raw[body_idx..].to_string() })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_status_and_body() {
        let r = parse_response("HTTP/1.0 404 Not Found\r\nX: y\r\n\r\n{\"ok\":false}").unwrap();
        assert_eq!(r.status, 404);
        assert!(!r.is_success());
        assert_eq!(r.body, "{\"ok\":false}");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_response("hello").is_err());
        assert!(parse_response("HTTP/1.1 200 OK\r\nno-body-separator").is_err());
    }

    #[test]
    fn https_is_unsupported() {
        let url = Url::parse("https://example.org/x").unwrap();
        assert!(matches!(http_get(&url), Err(Error::Unsupported(_))));
    }

    #[test]
    fn ipv6_literals_resolve_without_brackets() {
        let url = Url::parse("http://[::1]:8001/output/luogo/4.json").unwrap();
        assert_eq!(url.host_str(), Some("[::1]"));
        let addrs = socket_addrs(&url).unwrap();
        assert_eq!(addrs, vec!["[::1]:8001".parse::<SocketAddr>().unwrap()]);

        let plain = Url::parse("http://127.0.0.1/x").unwrap();
        assert_eq!(socket_addrs(&plain).unwrap()[0].port(), 80);
    }
}
