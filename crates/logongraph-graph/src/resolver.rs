use logongraph_core::LogonRecord;
use std::collections::HashMap;

/// Keep only the host part of a fully qualified name.
pub fn strip_domain(hostname: &str) -> &str {
    hostname.split('.').next().unwrap_or(hostname)
}

/// Reverse-lookup table from source IP to short hostname, built from the
/// `IpResolved` column of the same export.
#[derive(Debug, Clone, Default)]
pub struct IdentityResolver {
    ip_to_host: HashMap<String, String>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows missing either the IP or the resolved name are ignored. When an
    /// IP appears with different names, the later row wins.
    pub fn from_records(records: &[LogonRecord]) -> Self {
        let mut resolver = Self::new();
        for record in records {
            resolver.insert(&record.ip_address, &record.ip_resolved);
        }
        resolver
    }

    pub fn insert(&mut self, ip: &str, resolved: &str) {
        if ip.is_empty() || resolved.is_empty() {
            return;
        }
        let host = strip_domain(resolved).to_string();
        if let Some(previous) = self.ip_to_host.insert(ip.to_string(), host.clone())
            && previous != host
        {
            tracing::debug!(%ip, %previous, current = %host, "IP resolved to a different host");
        }
    }

    pub fn resolve(&self, ip: &str) -> Option<&str> {
        self.ip_to_host.get(ip).map(String::as_str)
    }

    pub fn contains(&self, ip: &str) -> bool {
        self.ip_to_host.contains_key(ip)
    }

    pub fn len(&self) -> usize {
        self.ip_to_host.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ip_to_host.is_empty()
    }
}
