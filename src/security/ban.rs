//! Address ban entries and mask matching.

use anonirc_proto::wildcard_match;
use ipnet::IpNet;
use std::net::IpAddr;
use std::time::Duration;

/// One address ban (D-line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BanEntry {
    /// Exact address, CIDR block (`10.0.0.0/8`) or glob (`192.168.*`).
    pub mask: String,
    pub reason: Option<String>,
    /// Operator name that set the ban.
    pub set_by: String,
    /// Unix seconds.
    pub set_at: i64,
    /// Unix seconds; `None` is permanent.
    pub expires_at: Option<i64>,
}

impl BanEntry {
    /// A ban starting now, optionally lasting `duration`.
    ///
    /// A duration reaching past the last representable timestamp is permanent.
    pub fn new(
        mask: impl Into<String>,
        reason: Option<String>,
        set_by: impl Into<String>,
        duration: Option<Duration>,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            mask: mask.into(),
            reason,
            set_by: set_by.into(),
            set_at: now,
            expires_at: duration.and_then(|d| {
                i64::try_from(d.as_secs())
                    .ok()
                    .and_then(|secs| now.checked_add(secs))
            }),
        }
    }

    /// Reason text shown to the refused client.
    pub fn reason(&self) -> &str {
        self.reason.as_deref().unwrap_or("Banned")
    }

    pub fn is_active_at(&self, now: i64) -> bool {
        self.expires_at.is_none_or(|exp| exp > now)
    }

    pub fn is_active(&self) -> bool {
        self.is_active_at(chrono::Utc::now().timestamp())
    }

    /// Whether `ip` falls under this ban's mask.
    pub fn matches(&self, ip: IpAddr) -> bool {
        let ip = canonical(ip);
        if let Ok(net) = self.mask.parse::<IpNet>() {
            return net.contains(&ip);
        }
        if let Ok(addr) = self.mask.parse::<IpAddr>() {
            return canonical(addr) == ip;
        }
        wildcard_match(&self.mask, &ip.to_string())
    }
}

/// IPv4-mapped IPv6 addresses (dual-stack sockets) compare as plain IPv4.
fn canonical(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6
            .to_ipv4_mapped()
            .map(IpAddr::V4)
            .unwrap_or(IpAddr::V6(v6)),
        v4 => v4,
    }
}

/// Accepts exact addresses, CIDR blocks and globs over address characters.
pub fn is_valid_mask(mask: &str) -> bool {
    if mask.parse::<IpNet>().is_ok() || mask.parse::<IpAddr>().is_ok() {
        return true;
    }
    mask.contains(['*', '?'])
        && mask
            .chars()
            .all(|c| c.is_ascii_hexdigit() || matches!(c, '.' | ':' | '*' | '?'))
}
