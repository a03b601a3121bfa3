use std::collections::HashMap;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use super::{OwnerInfo, PlatformSockets};
use crate::system::error::ProbeError;
use crate::system::snapshot::{ConnectionRecord, ProbeBatch, Protocol};

const SOCKET_TABLES: [(&str, Protocol); 4] = [
    ("tcp", Protocol::Tcp),
    ("udp", Protocol::Udp),
    ("tcp6", Protocol::Tcp6),
    ("udp6", Protocol::Udp6),
];

pub struct Platform;

impl PlatformSockets for Platform {
    fn connections(owners: &HashMap<u32, OwnerInfo>) -> ProbeBatch<ConnectionRecord> {
        let mut sockets = Vec::new();
        for (file, protocol) in SOCKET_TABLES {
            // tcp6/udp6 are absent when IPv6 is disabled
            if let Ok(contents) = fs::read_to_string(format!("/proc/net/{file}")) {
                sockets.extend(parse_socket_table(&contents, protocol));
            }
        }

        let mut pids: Vec<u32> = owners.keys().copied().collect();
        pids.sort_unstable();

        let mut inode_owner: HashMap<u64, u32> = HashMap::new();
        let mut errors = Vec::new();
        for pid in pids {
            match socket_inodes(pid) {
                Ok(inodes) => {
                    for inode in inodes {
                        inode_owner.entry(inode).or_insert(pid);
                    }
                }
                Err(err) => errors.push(ProbeError::from_io(pid, &err)),
            }
        }

        let mut items: Vec<ConnectionRecord> = sockets
            .into_iter()
            .filter_map(|socket| {
                let pid = *inode_owner.get(&socket.inode)?;
                let owner = owners.get(&pid)?;
                Some(ConnectionRecord {
                    pid,
                    process_name: owner.name.clone(),
                    status: owner.status.clone(),
                    protocol: socket.protocol,
                    local_address: socket.local,
                    remote_address: socket.remote,
                })
            })
            .collect();
        items.sort_by_key(|c| c.pid);

        ProbeBatch::with_errors(items, errors)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SocketEntry {
    pub protocol: Protocol,
    pub local: SocketAddr,
    pub remote: Option<SocketAddr>,
    pub inode: u64,
}

/// Parses one of `/proc/net/{tcp,udp,tcp6,udp6}`. The header line is skipped,
/// as are sockets with no owning inode (e.g. TIME_WAIT).
pub fn parse_socket_table(contents: &str, protocol: Protocol) -> Vec<SocketEntry> {
    contents
        .lines()
        .skip(1)
        .filter_map(|line| parse_socket_line(line, protocol))
        .collect()
}

fn parse_socket_line(line: &str, protocol: Protocol) -> Option<SocketEntry> {
    // sl local_address rem_address st tx:rx tr:when retrnsmt uid timeout inode ...
    let fields: Vec<&str> = line.split_whitespace().collect();
    let local = parse_endpoint(fields.get(1)?)?;
    let remote = parse_endpoint(fields.get(2)?)?;
    let inode: u64 = fields.get(9)?.parse().ok()?;
    if inode == 0 {
        return None;
    }
    let remote = (!remote.ip().is_unspecified() || remote.port() != 0).then_some(remote);
    Some(SocketEntry {
        protocol,
        local,
        remote,
        inode,
    })
}

/// Decodes `ADDR:PORT` where ADDR is one (IPv4) or four (IPv6) native-endian
/// 32-bit words in hex and PORT is big hex.
fn parse_endpoint(raw: &str) -> Option<SocketAddr> {
    let (addr, port) = raw.split_once(':')?;
    let port = u16::from_str_radix(port, 16).ok()?;
    let ip = match addr.len() {
        8 => {
            let word = u32::from_str_radix(addr, 16).ok()?;
            IpAddr::V4(Ipv4Addr::from(word.to_ne_bytes()))
        }
        32 => {
            let mut bytes = [0u8; 16];
            for (i, chunk) in bytes.chunks_exact_mut(4).enumerate() {
                let word = u32::from_str_radix(addr.get(i * 8..i * 8 + 8)?, 16).ok()?;
                chunk.copy_from_slice(&word.to_ne_bytes());
            }
            IpAddr::V6(Ipv6Addr::from(bytes))
        }
        _ => return None,
    };
    Some(SocketAddr::new(ip, port))
}

fn socket_inodes(pid: u32) -> std::io::Result<Vec<u64>> {
    let mut inodes = Vec::new();
    for entry in fs::read_dir(format!("/proc/{pid}/fd"))? {
        let Ok(entry) = entry else { continue };
        // fds can close between listing and readlink
        let Ok(target) = fs::read_link(entry.path()) else {
            continue;
        };
        if let Some(inode) = parse_socket_link(&target.to_string_lossy()) {
            inodes.push(inode);
        }
    }
    Ok(inodes)
}

fn parse_socket_link(link: &str) -> Option<u64> {
    link.strip_prefix("socket:[")?
        .strip_suffix(']')?
        .parse()
        .ok()
}
