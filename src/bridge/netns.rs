//! Bridge port and per-namespace device enumeration from `/sys` and `/proc`.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use super::ResolveError;
use crate::procfs::FileSystem;
use crate::procfs::parser::{parse_index, parse_net_dev_names, parse_uevent_devtype};

/// A network interface as seen from inside one namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NetDevice {
    pub name: String,
    pub index: u32,
    /// Index of the link this device is paired with (`iflink`); equal to
    /// `index` for devices that are not one end of a pair.
    pub peer_index: u32,
}

/// OS services the resolver needs.
pub trait NetnsInspector {
    /// Identifiers of the veth peers attached to `bridge`'s ports.
    ///
    /// Fails with `ResolveError::BridgeNotFound` if there is no such bridge.
    fn bridge_veth_peer_ids(&self, bridge: &str) -> Result<BTreeSet<u32>, ResolveError>;

    /// Every running process id, ascending.
    fn pids(&self) -> Result<Vec<u32>, ResolveError>;

    /// Handle of the host network namespace, the one pid 1 lives in.
    ///
    /// Bridge port indexes belong to this namespace.
    fn host_netns(&self) -> Result<PathBuf, ResolveError>;

    /// Devices in the network namespace of `pid`.
    ///
    /// `None` when the process lives in `host_netns` or has exited since
    /// `pids` was called.
    fn devices(&self, pid: u32, host_netns: &Path) -> Result<Option<Vec<NetDevice>>, ResolveError>;
}

/// `NetnsInspector` backed by sysfs and procfs.
pub struct SysfsNetns<F: FileSystem> {
    fs: F,
    proc_path: PathBuf,
    sys_path: PathBuf,
}

impl<F: FileSystem> SysfsNetns<F> {
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    /// * `sys_path` - Base path to sysfs (usually "/sys")
    pub fn new(fs: F, proc_path: impl Into<PathBuf>, sys_path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
            sys_path: sys_path.into(),
        }
    }

    fn read(&self, path: &Path) -> Result<Option<String>, ResolveError> {
        match self.fs.read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ResolveError::io(path, source)),
        }
    }

    fn read_index(&self, path: &Path) -> Result<Option<u32>, ResolveError> {
        match self.read(path)? {
            Some(content) => parse_index(&content)
                .map(Some)
                .map_err(|source| ResolveError::parse(path, source)),
            None => Ok(None),
        }
    }

    fn read_netns(&self, path: &Path) -> Result<Option<PathBuf>, ResolveError> {
        match self.fs.read_link(path) {
            Ok(target) => Ok(Some(target)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ResolveError::io(path, source)),
        }
    }

    /// Reads `ifindex` and `iflink` under a `class/net/<name>` directory.
    fn read_device(&self, dir: &Path, name: &str) -> Result<Option<NetDevice>, ResolveError> {
        let Some(index) = self.read_index(&dir.join("ifindex"))? else {
            return Ok(None);
        };
        let Some(peer_index) = self.read_index(&dir.join("iflink"))? else {
            return Ok(None);
        };
        Ok(Some(NetDevice {
            name: name.to_string(),
            index,
            peer_index,
        }))
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

impl<F: FileSystem> NetnsInspector for SysfsNetns<F> {
    fn bridge_veth_peer_ids(&self, bridge: &str) -> Result<BTreeSet<u32>, ResolveError> {
        let class_net = self.sys_path.join("class/net");
        let bridge_dir = class_net.join(bridge);
        if !self.fs.exists(&bridge_dir.join("bridge")) {
            return Err(ResolveError::BridgeNotFound(bridge.to_string()));
        }

        let brif = bridge_dir.join("brif");
        let ports = match self.fs.read_dir(&brif) {
            Ok(ports) => ports,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(ResolveError::io(&brif, source)),
        };

        let mut peers = BTreeSet::new();
        for port in &ports {
            let Some(name) = file_name(port) else {
                continue;
            };
            let port_dir = class_net.join(name);
            match self.read_device(&port_dir, name)? {
                Some(dev) if dev.peer_index != dev.index => {
                    // Stacked devices also point iflink at another index
                    let uevent = self.read(&port_dir.join("uevent"))?;
                    match uevent.as_deref().and_then(parse_uevent_devtype) {
                        Some(devtype) => {
                            trace!(port = name, devtype, "bridge port is not a veth")
                        }
                        None => {
                            peers.insert(dev.peer_index);
                        }
                    }
                }
                Some(_) => trace!(port = name, "bridge port is not a veth"),
                None => debug!(port = name, "bridge port detached during enumeration"),
            }
        }

        debug!(bridge, ports = ports.len(), peers = peers.len(), "bridge veth peers");
        Ok(peers)
    }

    fn pids(&self) -> Result<Vec<u32>, ResolveError> {
        let entries = self
            .fs
            .read_dir(&self.proc_path)
            .map_err(|source| ResolveError::io(&self.proc_path, source))?;

        let mut pids: Vec<u32> = entries
            .iter()
            .filter_map(|entry| file_name(entry)?.parse().ok())
            .collect();
        pids.sort_unstable();
        Ok(pids)
    }

    fn host_netns(&self) -> Result<PathBuf, ResolveError> {
        let path = self.proc_path.join("1/ns/net");
        self.fs
            .read_link(&path)
            .map_err(|source| ResolveError::io(&path, source))
    }

    fn devices(
        &self,
        pid: u32,
        host_netns: &Path,
    ) -> Result<Option<Vec<NetDevice>>, ResolveError> {
        let proc_dir = self.proc_path.join(pid.to_string());

        let Some(netns) = self.read_netns(&proc_dir.join("ns/net"))? else {
            debug!(pid, "process exited during enumeration");
            return Ok(None);
        };
        if netns.as_path() == host_netns {
            trace!(pid, "process lives in the host network namespace");
            return Ok(None);
        }

        let net_dev = proc_dir.join("net/dev");
        let Some(content) = self.read(&net_dev)? else {
            debug!(pid, "process exited during enumeration");
            return Ok(None);
        };
        let names =
            parse_net_dev_names(&content).map_err(|source| ResolveError::parse(&net_dev, source))?;

        let class_net = proc_dir.join("root/sys/class/net");
        let mut devices = Vec::with_capacity(names.len());
        for name in &names {
            match self.read_device(&class_net.join(name), name)? {
                Some(dev) => devices.push(dev),
                None => trace!(pid, device = %name, "no sysfs attributes for device"),
            }
        }
        Ok(Some(devices))
    }
}
