use std::{
    io::{Read, Write},
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use anyhow::{anyhow, Context};
use base64::{engine::general_purpose::STANDARD, Engine};
use thiserror::Error;

use crate::config::CasterConfig;

pub const USER_AGENT: &str = "NTRIPBasestationMapper/1.0";

#[derive(Debug, Error)]
pub enum SourceTableError {
    #[error("Failed to retrieve source table from NTRIP caster. Response start: {0}")]
    NotASourceTable(String),
    #[error("Malformed chunked response body")]
    MalformedChunk,
}

/// Request for the source table, which casters serve at the root mountpoint.
pub fn build_request(host: &str, port: u16, username: &str, password: &str) -> String {
    let credentials = STANDARD.encode(format!("{}:{}", username, password));
    format!(
        "GET / HTTP/1.1\r\n\
         Host: {}:{}\r\n\
         User-Agent: {}\r\n\
         Authorization: Basic {}\r\n\
         Accept: */*\r\n\
         Connection: close\r\n\
         \r\n",
        host, port, USER_AGENT, credentials
    )
}

fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Decode a `Transfer-Encoding: chunked` body.
fn dechunk(mut body: &[u8]) -> Result<Vec<u8>, SourceTableError> {
    let mut decoded = Vec::with_capacity(body.len());
    loop {
        let line_end = find_subsequence(body, b"\r\n").ok_or(SourceTableError::MalformedChunk)?;
        let size_line = String::from_utf8_lossy(&body[..line_end]);
        // Chunk extensions follow the size after a semicolon.
        let size_field = size_line.split(';').next().unwrap_or_default().trim();
        let size = usize::from_str_radix(size_field, 16)
            .map_err(|_| SourceTableError::MalformedChunk)?;
        body = &body[line_end + 2..];
        if size == 0 {
            return Ok(decoded);
        }
        if body.len() < size {
            return Err(SourceTableError::MalformedChunk);
        }
        decoded.extend_from_slice(&body[..size]);
        body = body[size..].strip_prefix(b"\r\n").unwrap_or(&body[size..]);
    }
}

/// Split a raw caster response into headers and body and return the source table body.
///
/// Both NTRIP 1 (`SOURCETABLE 200 OK`) and NTRIP 2 (`Content-Type: gnss/sourcetable`)
/// responses are accepted.
pub fn parse_response(raw: &[u8]) -> Result<String, SourceTableError> {
    let (headers, body) = match find_subsequence(raw, b"\r\n\r\n") {
        Some(header_end) => (
            String::from_utf8_lossy(&raw[..header_end]).into_owned(),
            &raw[header_end + 4..],
        ),
        None => (String::new(), raw),
    };
    log::debug!("Headers:\n{}", headers);

    let lowercase_headers = headers.to_ascii_lowercase();
    if !headers.contains("SOURCETABLE 200 OK") && !lowercase_headers.contains("gnss/sourcetable") {
        let start: String = String::from_utf8_lossy(raw).chars().take(100).collect();
        return Err(SourceTableError::NotASourceTable(start));
    }

    let body = if lowercase_headers.contains("transfer-encoding: chunked") {
        dechunk(body)?
    } else {
        body.to_vec()
    };
    Ok(String::from_utf8_lossy(&body).into_owned())
}

/// Download the source table of a caster.
pub fn fetch_source_table(caster: &CasterConfig) -> anyhow::Result<String> {
    let username = caster
        .username
        .as_deref()
        .ok_or_else(|| anyhow!("Username not set for caster {}", caster.host))?;
    let password = caster.password.as_deref().unwrap_or_default();
    let timeout = Duration::from_secs(caster.timeout_secs);

    log::info!("Retrieving source table from {}:{}", caster.host, caster.port);
    let address = (caster.host.as_str(), caster.port)
        .to_socket_addrs()
        .with_context(|| format!("Resolving {}", caster.host))?
        .next()
        .ok_or_else(|| anyhow!("No address found for {}", caster.host))?;
    let mut stream = TcpStream::connect_timeout(&address, timeout)
        .with_context(|| format!("Connecting to {}", address))?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    stream.write_all(build_request(&caster.host, caster.port, username, password).as_bytes())?;
    let mut response = Vec::new();
    stream.read_to_end(&mut response)?;
    log::info!("Received {} bytes", response.len());

    Ok(parse_response(&response)?)
}
