//! Which processes own the interfaces attached to a bridge.
//!
//! Each port of the bridge that is one end of a veth pair names its peer
//! by interface index. Every process whose network namespace holds a
//! device with one of those indexes is reported, with the matching device
//! names.

mod netns;

pub use netns::{NetDevice, NetnsInspector, SysfsNetns};

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::procfs::ParseError;

/// Error resolving bridge processes.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("bridge {0:?} not found")]
    BridgeNotFound(String),
    #[error("I/O error reading {}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
    #[error("{}: {source}", path.display())]
    Parse { path: PathBuf, source: ParseError },
}

impl ResolveError {
    pub(crate) fn io(path: &Path, source: io::Error) -> Self {
        ResolveError::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn parse(path: &Path, source: ParseError) -> Self {
        ResolveError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// One report line: a process and its devices attached to the bridge.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessDevices {
    pub pid: u32,
    /// Sorted device names.
    pub devices: Vec<String>,
}

impl fmt::Display for ProcessDevices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pid)?;
        for dev in &self.devices {
            write!(f, " {}", dev)?;
        }
        Ok(())
    }
}

pub struct BridgeProcessResolver<N: NetnsInspector> {
    inspector: N,
}

impl<N: NetnsInspector> BridgeProcessResolver<N> {
    pub fn new(inspector: N) -> Self {
        Self { inspector }
    }

    /// Lists the processes with at least one device attached to `bridge`,
    /// by ascending pid. Processes in the host network namespace (that of
    /// pid 1) are never reported.
    ///
    /// A missing bridge yields an empty report. Any enumeration failure
    /// aborts the whole operation: a partial process list is not reported.
    pub fn resolve(&self, bridge: &str) -> Result<Vec<ProcessDevices>, ResolveError> {
        let peers = match self.inspector.bridge_veth_peer_ids(bridge) {
            Ok(peers) => peers,
            Err(ResolveError::BridgeNotFound(_)) => {
                debug!(bridge, "bridge does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        // Enumerated even with no peers, so an unreadable /proc is reported
        let host_netns = self.inspector.host_netns()?;
        let mut report = Vec::new();
        for pid in self.inspector.pids()? {
            let Some(devices) = self.inspector.devices(pid, &host_netns)? else {
                continue;
            };

            let mut matching: Vec<String> = devices
                .into_iter()
                .filter(|d| peers.contains(&d.index))
                .map(|d| d.name)
                .collect();
            if matching.is_empty() {
                continue;
            }
            matching.sort();
            report.push(ProcessDevices {
                pid,
                devices: matching,
            });
        }

        debug!(bridge, processes = report.len(), "resolved bridge processes");
        Ok(report)
    }
}

/// Writes one `<pid> <device> [<device> ...]` line per entry.
pub fn write_report(report: &[ProcessDevices], out: &mut impl Write) -> io::Result<()> {
    for line in report {
        writeln!(out, "{}", line)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::procfs::MockFs;
    use crate::procfs::mock::{HOST_NETNS, MockDevice};
    use std::collections::{BTreeSet, HashMap};

    fn resolver(fs: MockFs) -> BridgeProcessResolver<SysfsNetns<MockFs>> {
        BridgeProcessResolver::new(SysfsNetns::new(fs, "/proc", "/sys"))
    }

    fn render(report: &[ProcessDevices]) -> String {
        let mut out = Vec::new();
        write_report(report, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_resolve_weave_bridge() {
        let report = resolver(MockFs::weave_host()).resolve("weave").unwrap();
        assert_eq!(render(&report), "1000 ethwe\n1001 ethwe\n2000 ethwe\n");
    }

    #[test]
    fn test_resolve_docker_bridge() {
        let report = resolver(MockFs::weave_host()).resolve("docker0").unwrap();
        assert_eq!(render(&report), "2000 eth0\n3000 eth0\n");
    }

    #[test]
    fn test_missing_bridge_is_empty() {
        let report = resolver(MockFs::weave_host()).resolve("br0").unwrap();
        assert!(report.is_empty());

        let report = resolver(MockFs::bare_host()).resolve("weave").unwrap();
        assert!(report.is_empty());
    }

    #[test]
    fn test_multiple_devices_sorted() {
        let mut fs = MockFs::weave_host();
        fs.add_process(
            4000,
            "router",
            "net:[4026532600]",
            &[
                MockDevice {
                    name: "ethwe1",
                    ifindex: 9,
                    iflink: 10,
                },
                MockDevice {
                    name: "ethwe0",
                    ifindex: 11,
                    iflink: 12,
                },
            ],
        );

        let report = resolver(fs).resolve("weave").unwrap();
        assert_eq!(
            report.last().unwrap(),
            &ProcessDevices {
                pid: 4000,
                devices: vec!["ethwe0".to_string(), "ethwe1".to_string()],
            }
        );
        assert_eq!(report.last().unwrap().to_string(), "4000 ethwe0 ethwe1");
    }

    #[test]
    fn test_enumeration_failure_propagates() {
        let mut fs = MockFs::weave_host();
        fs.add_file("/proc/2000/net/dev", "h1\nh2\nbroken line\n");

        let result = resolver(fs).resolve("weave");
        assert!(matches!(result, Err(ResolveError::Parse { .. })));
    }

    #[test]
    fn test_process_without_namespace_link_is_skipped() {
        let mut fs = MockFs::weave_host();
        // Exited between listing and inspection
        fs.add_dir("/proc/2");
        let report = resolver(fs).resolve("weave").unwrap();
        assert_eq!(report.len(), 3);
    }

    /// Inspector with canned answers, for failures the mock tree can't express.
    struct FakeInspector {
        peers: Result<BTreeSet<u32>, fn() -> ResolveError>,
        devices: HashMap<u32, Vec<NetDevice>>,
        fail_pids: bool,
    }

    impl NetnsInspector for FakeInspector {
        fn bridge_veth_peer_ids(&self, _bridge: &str) -> Result<BTreeSet<u32>, ResolveError> {
            self.peers.clone().map_err(|f| f())
        }

        fn pids(&self) -> Result<Vec<u32>, ResolveError> {
            if self.fail_pids {
                return Err(ResolveError::io(
                    Path::new("/proc"),
                    io::Error::from(io::ErrorKind::PermissionDenied),
                ));
            }
            let mut pids: Vec<u32> = self.devices.keys().copied().collect();
            pids.sort_unstable();
            Ok(pids)
        }

        fn host_netns(&self) -> Result<PathBuf, ResolveError> {
            Ok(PathBuf::from(HOST_NETNS))
        }

        fn devices(
            &self,
            pid: u32,
            _host_netns: &Path,
        ) -> Result<Option<Vec<NetDevice>>, ResolveError> {
            Ok(self.devices.get(&pid).cloned())
        }
    }

    #[test]
    fn test_pid_listing_failure_propagates() {
        let inspector = FakeInspector {
            peers: Ok(BTreeSet::from([9])),
            devices: HashMap::new(),
            fail_pids: true,
        };
        let result = BridgeProcessResolver::new(inspector).resolve("weave");
        assert!(matches!(result, Err(ResolveError::Io { .. })));
    }

    #[test]
    fn test_bridge_without_veth_ports_still_lists_processes() {
        let inspector = FakeInspector {
            peers: Ok(BTreeSet::new()),
            devices: HashMap::new(),
            fail_pids: true,
        };
        let result = BridgeProcessResolver::new(inspector).resolve("weave");
        assert!(matches!(result, Err(ResolveError::Io { .. })));
    }

    fn brif_denied() -> ResolveError {
        ResolveError::io(
            Path::new("/sys/class/net/weave/brif"),
            io::Error::from(io::ErrorKind::PermissionDenied),
        )
    }

    #[test]
    fn test_bridge_error_propagates() {
        let inspector = FakeInspector {
            peers: Err(brif_denied),
            devices: HashMap::new(),
            fail_pids: false,
        };
        assert!(BridgeProcessResolver::new(inspector).resolve("weave").is_err());
    }

    #[test]
    fn test_matches_on_device_index() {
        let device = |name: &str, index, peer_index| NetDevice {
            name: name.to_string(),
            index,
            peer_index,
        };
        let inspector = FakeInspector {
            peers: Ok(BTreeSet::from([9])),
            devices: HashMap::from([
                (10, vec![device("ethwe", 9, 10)]),
                (20, vec![device("eth0", 10, 9)]),
            ]),
            fail_pids: false,
        };
        let report = BridgeProcessResolver::new(inspector).resolve("weave").unwrap();
        assert_eq!(render(&report), "10 ethwe\n");
    }

    #[test]
    fn test_host_namespace_never_reported() {
        let mut fs = MockFs::new();
        fs.add_host_device("vethwepl1", 10, 9);
        fs.add_bridge("weave", 5, &["vethwepl1"]);
        // Host index 9 collides with the peer id, but lives in our namespace
        fs.add_process(
            1,
            "systemd",
            HOST_NETNS,
            &[MockDevice {
                name: "eth1",
                ifindex: 9,
                iflink: 9,
            }],
        );

        assert!(resolver(fs).resolve("weave").unwrap().is_empty());
    }

    #[test]
    fn test_host_namespace_taken_from_init() {
        let mut fs = MockFs::weave_host();
        // Host process holding a device whose index is a weave peer id
        fs.add_process(
            1,
            "systemd",
            HOST_NETNS,
            &[MockDevice {
                name: "vethwe-datapath",
                ifindex: 6,
                iflink: 7,
            }],
        );
        // The inspecting process sits in a namespace of its own
        fs.add_link("/proc/self/ns/net", "net:[4026532999]");

        let report = resolver(fs).resolve("weave").unwrap();
        assert!(report.iter().all(|line| line.pid != 1));
        assert_eq!(render(&report), "1000 ethwe\n1001 ethwe\n2000 ethwe\n");
    }

    #[test]
    fn test_missing_init_namespace_is_an_error() {
        let mut fs = MockFs::weave_host();
        fs.remove_tree("/proc/1/ns");
        let result = resolver(fs).resolve("weave");
        assert!(matches!(result, Err(ResolveError::Io { .. })));
    }
}
