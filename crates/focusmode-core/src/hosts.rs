use regex::Regex;
use std::{
    fs::OpenOptions,
    io::{Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
    sync::OnceLock,
};

use crate::error::HostsError;

pub const DEFAULT_REDIRECT_IP: &str = "127.0.0.1";

/// System hosts file for the running platform
#[must_use]
pub fn default_hosts_path() -> PathBuf {
    if cfg!(target_os = "windows") {
        PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts")
    } else {
        PathBuf::from("/etc/hosts")
    }
}

/// Whether `domain` can be written into a hosts line without corrupting it
#[must_use]
pub fn is_valid_domain(domain: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    let pattern = PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_-]+(\.[A-Za-z0-9_-]+)*$").expect("static regex")
    });
    domain.len() <= 253 && pattern.is_match(domain)
}

/// Keep only domains that are safe to write, warning about the rest
fn usable_domains(domains: &[String]) -> Vec<&str> {
    domains
        .iter()
        .map(|d| d.trim())
        .filter(|d| {
            let ok = is_valid_domain(d);
            if !ok {
                log::warn!("Ignoring invalid website entry: {d:?}");
            }
            ok
        })
        .collect()
}

/// Loopback redirects in a hosts file
pub struct HostsFile {
    path: PathBuf,
    redirect_ip: String,
}

impl HostsFile {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, redirect_ip: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            redirect_ip: redirect_ip.into(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a redirect line for every domain not already redirected.
    ///
    /// Returns the domains that were added. Nothing is written when the file
    /// cannot be opened for writing.
    ///
    /// # Errors
    ///
    /// Returns [`HostsError::PermissionDenied`] without write access, or
    /// [`HostsError::Io`] on any other I/O failure
    pub fn block_websites(&self, domains: &[String]) -> Result<Vec<String>, HostsError> {
        let domains = usable_domains(domains);
        let io_err = |e| HostsError::from_io(&self.path, e);

        let mut file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&self.path)
            .map_err(io_err)?;

        let mut content = String::new();
        file.read_to_string(&mut content).map_err(io_err)?;

        let (updated, added) = add_redirects(&content, &domains, &self.redirect_ip);
        if added.is_empty() {
            log::debug!("All websites already redirected in {}", self.path.display());
            return Ok(added);
        }

        // blocking only appends, existing bytes are never rewritten
        file.seek(SeekFrom::End(0)).map_err(io_err)?;
        file.write_all(&updated.as_bytes()[content.len()..])
            .map_err(io_err)?;
        file.flush().map_err(io_err)?;

        log::info!("Blocked websites: {}", added.join(", "));
        Ok(added)
    }

    /// Drop every line that mentions one of the domains.
    ///
    /// Matching is by substring, so an unrelated entry containing a target
    /// domain goes too. Returns the number of removed lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or rewritten
    pub fn unblock_websites(&self, domains: &[String]) -> Result<usize, HostsError> {
        let domains = usable_domains(domains);
        let io_err = |e| HostsError::from_io(&self.path, e);

        let content = std::fs::read_to_string(&self.path).map_err(io_err)?;
        let (updated, removed) = remove_redirects(&content, &domains);
        if removed > 0 {
            std::fs::write(&self.path, updated).map_err(io_err)?;
            log::info!("Unblocked websites: {}", domains.join(", "));
        }
        Ok(removed)
    }
}

fn add_redirects(content: &str, domains: &[&str], redirect_ip: &str) -> (String, Vec<String>) {
    let mut existing: Vec<String> = content.lines().map(|l| l.trim_end().to_string()).collect();
    let mut updated = content.to_string();
    let mut added = Vec::new();

    for domain in domains {
        let entry = format!("{redirect_ip} {domain}");
        if existing.contains(&entry) {
            continue;
        }
        if !updated.is_empty() && !updated.ends_with('\n') {
            updated.push('\n');
        }
        updated.push_str(&entry);
        updated.push('\n');
        added.push((*domain).to_string());
        existing.push(entry);
    }

    (updated, added)
}

fn remove_redirects(content: &str, domains: &[&str]) -> (String, usize) {
    if domains.is_empty() {
        return (content.to_string(), 0);
    }
    let mut removed = 0;
    let updated = content
        .split_inclusive('\n')
        .filter(|line| {
            let hit = domains.iter().any(|d| line.contains(d));
            if hit {
                removed += 1;
            }
            !hit
        })
        .collect();
    (updated, removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGINAL: &str = "127.0.0.1 localhost\n::1 localhost\n# comment line\n";

    fn hosts_with(content: &str) -> (tempfile::TempDir, HostsFile) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hosts");
        std::fs::write(&path, content).unwrap();
        (dir, HostsFile::new(path, DEFAULT_REDIRECT_IP))
    }

    fn domains(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    fn read(hosts: &HostsFile) -> String {
        std::fs::read_to_string(hosts.path()).unwrap()
    }

    #[test]
    fn test_block_appends_after_existing_lines() {
        let (_dir, hosts) = hosts_with(ORIGINAL);

        let added = hosts
            .block_websites(&domains(&["youtube.com", "reddit.com"]))
            .unwrap();

        assert_eq!(added, vec!["youtube.com", "reddit.com"]);
        assert_eq!(
            read(&hosts),
            format!("{ORIGINAL}127.0.0.1 youtube.com\n127.0.0.1 reddit.com\n")
        );
    }

    #[test]
    fn test_block_twice_is_idempotent() {
        let (_dir, hosts) = hosts_with(ORIGINAL);
        let list = domains(&["youtube.com", "reddit.com"]);

        hosts.block_websites(&list).unwrap();
        let second = hosts.block_websites(&list).unwrap();

        assert!(second.is_empty());
        let content = read(&hosts);
        assert_eq!(content.matches("127.0.0.1 youtube.com").count(), 1);
        assert_eq!(content.matches("127.0.0.1 reddit.com").count(), 1);
    }

    #[test]
    fn test_duplicate_domains_in_one_call_collapse() {
        let (_dir, hosts) = hosts_with(ORIGINAL);

        let added = hosts
            .block_websites(&domains(&["x.com", "x.com"]))
            .unwrap();

        assert_eq!(added, vec!["x.com"]);
        assert_eq!(read(&hosts).matches("127.0.0.1 x.com").count(), 1);
    }

    #[test]
    fn test_block_then_unblock_restores_lines() {
        let (_dir, hosts) = hosts_with(ORIGINAL);
        let list = domains(&["youtube.com", "reddit.com"]);

        hosts.block_websites(&list).unwrap();
        let removed = hosts.unblock_websites(&list).unwrap();

        assert_eq!(removed, 2);
        assert_eq!(read(&hosts), ORIGINAL);
    }

    #[test]
    fn test_block_keeps_original_bytes_as_prefix() {
        let original = "127.0.0.1 localhost\r\n# no final newline";
        let (_dir, hosts) = hosts_with(original);

        hosts
            .block_websites(&domains(&["youtube.com", "reddit.com"]))
            .unwrap();

        let content = read(&hosts);
        assert!(content.starts_with(original));
        assert_eq!(
            &content[original.len()..],
            "\n127.0.0.1 youtube.com\n127.0.0.1 reddit.com\n"
        );
    }

    #[test]
    fn test_missing_trailing_newline_is_repaired() {
        let (_dir, hosts) = hosts_with("127.0.0.1 localhost");

        hosts.block_websites(&domains(&["x.com"])).unwrap();

        assert_eq!(read(&hosts), "127.0.0.1 localhost\n127.0.0.1 x.com\n");
    }

    #[test]
    fn test_unblock_matches_by_substring() {
        let (_dir, hosts) = hosts_with("10.0.0.5 mail.example.com\n127.0.0.1 localhost\n");

        let removed = hosts.unblock_websites(&domains(&["example.com"])).unwrap();

        assert_eq!(removed, 1);
        assert_eq!(read(&hosts), "127.0.0.1 localhost\n");
    }

    #[test]
    fn test_invalid_domains_never_touch_the_file() {
        let (_dir, hosts) = hosts_with(ORIGINAL);
        let list = domains(&["", "bad domain", "#evil"]);

        assert!(hosts.block_websites(&list).unwrap().is_empty());
        assert_eq!(hosts.unblock_websites(&list).unwrap(), 0);
        assert_eq!(read(&hosts), ORIGINAL);
    }

    #[test]
    fn test_missing_file_is_an_error_and_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let hosts = HostsFile::new(dir.path().join("absent"), DEFAULT_REDIRECT_IP);

        let err = hosts.block_websites(&domains(&["x.com"])).unwrap_err();

        assert!(matches!(err, HostsError::Io { .. }));
        assert!(!hosts.path().exists());
    }

    #[test]
    fn test_custom_redirect_ip() {
        let (_dir, hosts) = hosts_with(ORIGINAL);
        let hosts = HostsFile::new(hosts.path().to_path_buf(), "0.0.0.0");

        hosts.block_websites(&domains(&["x.com"])).unwrap();

        assert!(read(&hosts).ends_with("0.0.0.0 x.com\n"));
    }

    #[test]
    fn test_domain_validation() {
        assert!(is_valid_domain("youtube.com"));
        assert!(is_valid_domain("www.news-site.co.uk"));
        assert!(!is_valid_domain(""));
        assert!(!is_valid_domain("two words.com"));
        assert!(!is_valid_domain("a.com # note"));
        assert!(!is_valid_domain("trailing."));
    }
}
