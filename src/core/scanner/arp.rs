// src/core/scanner/arp.rs

use crate::core::error::ScanError;
use crate::core::models::Target;
use ipnetwork::{IpNetwork, Ipv4Network};
use pnet::datalink::{self, Channel, NetworkInterface};
use pnet::packet::arp::{ArpHardwareTypes, ArpOperations, ArpPacket, MutableArpPacket};
use pnet::packet::ethernet::{EtherTypes, EthernetPacket, MutableEthernetPacket};
use pnet::packet::{MutablePacket, Packet};
use pnet::util::MacAddr;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::net::Ipv4Addr;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const ETHERNET_HEADER_LEN: usize = 14;
const ARP_PACKET_LEN: usize = 28;
/// How long a single receive may block before the deadline is re-checked.
const READ_POLL: Duration = Duration::from_millis(100);

/// The platform capability that broadcasts address-resolution requests over a
/// subnet and reports every host that answered before `timeout`.
///
/// Implementations block; callers run them on the blocking pool.
pub trait ArpSweep: Send + Sync {
    fn sweep(&self, subnet: Ipv4Network, timeout: Duration) -> Result<Vec<Target>, ScanError>;
}

/// Link-layer sweep over the interface attached to the subnet. Needs raw
/// socket privileges.
#[derive(Debug, Default, Clone, Copy)]
pub struct PnetArpSweep;

impl ArpSweep for PnetArpSweep {
    fn sweep(&self, subnet: Ipv4Network, timeout: Duration) -> Result<Vec<Target>, ScanError> {
        let (interface, source_ip) = interface_for(subnet)?;
        let source_mac = interface
            .mac
            .ok_or_else(|| ScanError::Sweep(format!("interface {} has no MAC address", interface.name)))?;

        let config = datalink::Config {
            read_timeout: Some(READ_POLL),
            ..Default::default()
        };
        let (mut tx, mut rx) = match datalink::channel(&interface, config) {
            Ok(Channel::Ethernet(tx, rx)) => (tx, rx),
            Ok(_) => return Err(ScanError::Sweep(format!("unsupported channel type on {}", interface.name))),
            Err(e) => return Err(ScanError::Sweep(format!("cannot open {}: {}", interface.name, e))),
        };

        info!(interface = %interface.name, %subnet, "Broadcasting ARP requests.");
        let mut sent = 0usize;
        for target_ip in sweep_targets(subnet).filter(|ip| *ip != source_ip) {
            let Some(frame) = forge_arp_request(source_mac, source_ip, target_ip) else {
                continue;
            };
            match tx.send_to(&frame, None) {
                Some(Ok(())) => sent += 1,
                Some(Err(e)) => debug!(%target_ip, error = %e, "ARP request not sent."),
                None => debug!(%target_ip, "ARP request dropped by the channel."),
            }
        }
        debug!(sent, "ARP requests sent, collecting replies.");

        let deadline = Instant::now() + timeout;
        let mut replies: BTreeMap<Ipv4Addr, Target> = BTreeMap::new();
        while Instant::now() < deadline {
            match rx.next() {
                Ok(frame) => {
                    if let Some(target) = parse_arp_reply(frame, subnet) {
                        replies.entry(target.ip).or_insert(target);
                    }
                }
                Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock | ErrorKind::Interrupted) => {}
                Err(e) => {
                    warn!(error = %e, "Receive failed, ending sweep early.");
                    break;
                }
            }
        }

        info!(found = replies.len(), "ARP sweep finished.");
        Ok(replies.into_values().collect())
    }
}

fn interface_for(subnet: Ipv4Network) -> Result<(NetworkInterface, Ipv4Addr), ScanError> {
    datalink::interfaces()
        .into_iter()
        .filter(|iface| iface.is_up() && !iface.is_loopback())
        .find_map(|iface| {
            let source = iface.ips.iter().find_map(|ip| match ip {
                IpNetwork::V4(net) if subnet.contains(net.ip()) => Some(net.ip()),
                _ => None,
            })?;
            Some((iface, source))
        })
        .ok_or_else(|| ScanError::Sweep(format!("no local interface is attached to {}", subnet)))
}

/// Host addresses of the subnet; network and broadcast addresses are skipped
/// when the prefix leaves room for them.
pub fn sweep_targets(subnet: Ipv4Network) -> impl Iterator<Item = Ipv4Addr> {
    let has_edges = subnet.prefix() < 31;
    let network = subnet.network();
    let broadcast = subnet.broadcast();
    subnet
        .iter()
        .filter(move |ip| !has_edges || (*ip != network && *ip != broadcast))
}

/// Builds a broadcast who-has frame for `target_ip`.
pub fn forge_arp_request(source_mac: MacAddr, source_ip: Ipv4Addr, target_ip: Ipv4Addr) -> Option<Vec<u8>> {
    let mut buffer = [0u8; ETHERNET_HEADER_LEN + ARP_PACKET_LEN];
    {
        let mut ethernet = MutableEthernetPacket::new(&mut buffer)?;
        ethernet.set_destination(MacAddr::broadcast());
        ethernet.set_source(source_mac);
        ethernet.set_ethertype(EtherTypes::Arp);

        let mut arp = MutableArpPacket::new(ethernet.payload_mut())?;
        arp.set_hardware_type(ArpHardwareTypes::Ethernet);
        arp.set_protocol_type(EtherTypes::Ipv4);
        arp.set_hw_addr_len(6);
        arp.set_proto_addr_len(4);
        arp.set_operation(ArpOperations::Request);
        arp.set_sender_hw_addr(source_mac);
        arp.set_sender_proto_addr(source_ip);
        arp.set_target_hw_addr(MacAddr::zero());
        arp.set_target_proto_addr(target_ip);
    }
    Some(buffer.to_vec())
}

/// Extracts the responder of an ARP reply whose sender sits inside `subnet`.
pub fn parse_arp_reply(frame: &[u8], subnet: Ipv4Network) -> Option<Target> {
    let ethernet = EthernetPacket::new(frame)?;
    if ethernet.get_ethertype() != EtherTypes::Arp {
        return None;
    }
    let arp = ArpPacket::new(ethernet.payload())?;
    if arp.get_operation() != ArpOperations::Reply {
        return None;
    }
    let ip = arp.get_sender_proto_addr();
    if !subnet.contains(ip) {
        return None;
    }
    Some(Target { ip, mac: arp.get_sender_hw_addr().to_string() })
}
