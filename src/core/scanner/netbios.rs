// src/core/scanner/netbios.rs

use std::net::{Ipv4Addr, SocketAddrV4};
use std::time::Duration;
use tokio::net::UdpSocket;
use tracing::debug;

const NETBIOS_NAME_PORT: u16 = 137;
/// Offset of the name count in a node status response to the wildcard query.
const NAME_COUNT_OFFSET: usize = 56;
const NAME_ENTRY_LEN: usize = 18;
const GROUP_NAME_FLAG: u16 = 0x8000;
const WORKSTATION_SUFFIX: u8 = 0x00;

/// Node status request for the wildcard name `*`.
fn node_status_query() -> Vec<u8> {
    let mut packet = vec![
        0xAB, 0xCD, // transaction id
        0x00, 0x00, // flags
        0x00, 0x01, // one question
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // no answer, authority or additional records
        0x20, // encoded name length
    ];
    // '*' followed by 15 NUL bytes, half-ASCII encoded.
    packet.extend_from_slice(b"CK");
    packet.extend(std::iter::repeat_n(b'A', 30));
    packet.extend_from_slice(&[
        0x00, // name terminator
        0x00, 0x21, // NBSTAT
        0x00, 0x01, // IN
    ]);
    packet
}

/// Asks `ip` for its NetBIOS workstation name. Silent hosts yield `None`.
pub async fn query_name(ip: Ipv4Addr, timeout: Duration) -> Option<String> {
    let socket = UdpSocket::bind("0.0.0.0:0").await.ok()?;
    let peer = SocketAddrV4::new(ip, NETBIOS_NAME_PORT);
    socket.send_to(&node_status_query(), peer).await.ok()?;

    let mut buf = [0u8; 1024];
    let received = tokio::time::timeout(timeout, async {
        loop {
            let (len, from) = socket.recv_from(&mut buf).await?;
            if from.ip() == ip {
                return Ok::<usize, std::io::Error>(len);
            }
        }
    })
    .await;

    match received {
        Ok(Ok(len)) => parse_node_status(&buf[..len]),
        Ok(Err(e)) => {
            debug!(%ip, error = %e, "NetBIOS receive failed.");
            None
        }
        Err(_) => None,
    }
}

/// Picks the first unique workstation name from a node status response.
pub fn parse_node_status(response: &[u8]) -> Option<String> {
    let count = *response.get(NAME_COUNT_OFFSET)? as usize;
    response
        .get(NAME_COUNT_OFFSET + 1..)?
        .chunks_exact(NAME_ENTRY_LEN)
        .take(count)
        .find_map(|entry| {
            let flags = u16::from_be_bytes([entry[16], entry[17]]);
            if entry[15] != WORKSTATION_SUFFIX || flags & GROUP_NAME_FLAG != 0 {
                return None;
            }
            let name = String::from_utf8_lossy(&entry[..15]).trim().to_string();
            (!name.is_empty()).then_some(name)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_with(entries: &[(&str, u8, u16)]) -> Vec<u8> {
        let mut response = vec![0u8; NAME_COUNT_OFFSET];
        response.push(entries.len() as u8);
        for (name, suffix, flags) in entries {
            let mut padded = format!("{:<15}", name).into_bytes();
            padded.truncate(15);
            response.extend_from_slice(&padded);
            response.push(*suffix);
            response.extend_from_slice(&flags.to_be_bytes());
        }
        response
    }

    #[test]
    fn query_carries_the_wildcard_name() {
        let query = node_status_query();
        assert_eq!(query.len(), 50);
        assert_eq!(&query[13..15], b"CK");
        assert_eq!(&query[query.len() - 4..], &[0x00, 0x21, 0x00, 0x01]);
    }

    #[test]
    fn group_names_are_skipped() {
        let response = response_with(&[
            ("WORKGROUP", 0x00, GROUP_NAME_FLAG),
            ("OFFICE-PC", 0x20, 0x0400),
            ("OFFICE-PC", 0x00, 0x0400),
        ]);
        assert_eq!(parse_node_status(&response).as_deref(), Some("OFFICE-PC"));
    }

    #[test]
    fn truncated_responses_yield_nothing() {
        assert!(parse_node_status(&[0u8; 20]).is_none());
        let mut response = response_with(&[("NAS", 0x00, 0)]);
        response.truncate(NAME_COUNT_OFFSET + 5);
        assert!(parse_node_status(&response).is_none());
    }
}
