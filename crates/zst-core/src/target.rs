//! Probe targets
//!
//! A target is either a literal IPv4 address or anything else, which is
//! treated as a hostname. The distinction matters because IP targets have no
//! virtual host to present a certificate for, so only ping is meaningful.

use crate::error::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::path::Path;

/// How a target is probed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// Strict dotted-quad IPv4 literal
    Ipv4(Ipv4Addr),
    /// Hostname, IPv6 literal or anything else
    Hostname,
}

/// A single host or IPv4 address from the target list
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainTarget {
    host: String,
    kind: TargetKind,
}

impl DomainTarget {
    /// Classify a trimmed target string
    pub fn new(host: impl Into<String>) -> Self {
        let host = host.into();
        let kind = match host.parse::<Ipv4Addr>() {
            Ok(addr) => TargetKind::Ipv4(addr),
            Err(_) => TargetKind::Hostname,
        };
        Self { host, kind }
    }

    /// The target as written in the list
    pub fn as_str(&self) -> &str {
        &self.host
    }

    /// Target classification
    pub fn kind(&self) -> TargetKind {
        self.kind
    }

    /// Whether this is an IPv4 literal
    pub fn is_ip(&self) -> bool {
        matches!(self.kind, TargetKind::Ipv4(_))
    }
}

impl fmt::Display for DomainTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.host)
    }
}

/// Ordered list of targets probed for every strategy
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetList {
    targets: Vec<DomainTarget>,
}

impl TargetList {
    /// Parse a newline-delimited list, skipping blank lines and `#` comments
    pub fn parse(content: &str) -> Self {
        let targets = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(DomainTarget::new)
            .collect();
        Self { targets }
    }

    /// Load a target list file. Unreadable or empty lists are fatal.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::fatal_input(path, e.to_string()))?;

        let list = Self::parse(&content);
        if list.is_empty() {
            return Err(Error::fatal_input(path, "target list contains no targets"));
        }
        Ok(list)
    }

    /// Number of targets (duplicates included)
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Check if the list is empty
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Target at `index`
    pub fn get(&self, index: usize) -> Option<&DomainTarget> {
        self.targets.get(index)
    }

    /// Iterate in list order
    pub fn iter(&self) -> std::slice::Iter<'_, DomainTarget> {
        self.targets.iter()
    }
}

impl FromIterator<DomainTarget> for TargetList {
    fn from_iter<I: IntoIterator<Item = DomainTarget>>(iter: I) -> Self {
        Self {
            targets: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TargetList {
    type Item = &'a DomainTarget;
    type IntoIter = std::slice::Iter<'a, DomainTarget>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify_ipv4() {
        let target = DomainTarget::new("1.2.3.4");
        assert!(target.is_ip());
        assert_eq!(target.kind(), TargetKind::Ipv4(Ipv4Addr::new(1, 2, 3, 4)));
    }

    #[test]
    fn test_classify_hostnames() {
        for host in ["example.com", "localhost", "::1", "1.2.3", "1.2.3.4.5", "300.1.1.1"] {
            assert!(!DomainTarget::new(host).is_ip(), "{host} should be a hostname");
        }
    }

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let list = TargetList::parse("1.2.3.4\n#comment\n\nexample.com\n");
        let hosts: Vec<_> = list.iter().map(DomainTarget::as_str).collect();
        assert_eq!(hosts, vec!["1.2.3.4", "example.com"]);
    }

    #[test]
    fn test_parse_trims_and_keeps_duplicates() {
        let list = TargetList::parse("  a.com  \r\n   # indented comment\na.com\n\t\n");
        assert_eq!(list.len(), 2);
        assert!(list.iter().all(|t| t.as_str() == "a.com"));
    }

    #[test]
    fn test_load_empty_is_fatal() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# only comments").unwrap();

        let err = TargetList::load(file.path()).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_load_missing_is_fatal() {
        let err = TargetList::load("/nonexistent/hosts.txt").unwrap_err();
        assert!(matches!(err, Error::FatalInput { .. }));
    }
}
