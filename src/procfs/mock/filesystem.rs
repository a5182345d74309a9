//! In-memory mock filesystem for testing without real `/proc` and `/sys`.
//!
//! `MockFs` simulates files, directories and symbolic links in memory, so
//! bridge and namespace enumeration can be tested on any host.

use crate::procfs::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// Namespace handle of pid 1, the host namespace, in every mock tree.
pub const HOST_NETNS: &str = "net:[4026531992]";

/// In-memory filesystem for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from link path to link target.
    links: HashMap<PathBuf, PathBuf>,
}

/// One interface as seen from inside a network namespace.
#[derive(Debug, Clone, Copy)]
pub struct MockDevice<'a> {
    pub name: &'a str,
    pub ifindex: u32,
    pub iflink: u32,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    pub fn add_link(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.links.insert(path, target.as_ref().to_path_buf());
    }

    /// Removes a path and everything below it, as when a process exits.
    pub fn remove_tree(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.files.retain(|p, _| !p.starts_with(path));
        self.directories.retain(|p| !p.starts_with(path));
        self.links.retain(|p, _| !p.starts_with(path));
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }

    /// Adds a host interface under `/sys/class/net/<name>`.
    pub fn add_host_device(&mut self, name: &str, ifindex: u32, iflink: u32) {
        let base = PathBuf::from(format!("/sys/class/net/{}", name));
        self.add_file(base.join("ifindex"), format!("{}\n", ifindex));
        self.add_file(base.join("iflink"), format!("{}\n", iflink));
        self.add_file(
            base.join("uevent"),
            format!("INTERFACE={}\nIFINDEX={}\n", name, ifindex),
        );
    }

    /// Adds a host interface stacked on another device, such as a `vlan`,
    /// `macvlan` or `vxlan`. `iflink` is the index of the lower device.
    pub fn add_stacked_device(&mut self, name: &str, ifindex: u32, iflink: u32, devtype: &str) {
        self.add_host_device(name, ifindex, iflink);
        self.add_file(
            PathBuf::from(format!("/sys/class/net/{}/uevent", name)),
            format!("DEVTYPE={}\nINTERFACE={}\nIFINDEX={}\n", devtype, name, ifindex),
        );
    }

    /// Adds a bridge device with the given port names enslaved to it.
    ///
    /// The ports themselves must be added with `add_host_device`.
    pub fn add_bridge(&mut self, name: &str, ifindex: u32, ports: &[&str]) {
        self.add_host_device(name, ifindex, ifindex);
        let base = PathBuf::from(format!("/sys/class/net/{}", name));
        self.add_file(base.join("bridge/bridge_id"), "8000.000000000000\n");
        self.add_dir(base.join("brif"));
        for port in ports {
            self.add_link(
                base.join("brif").join(port),
                format!("../../{}/brport", port),
            );
        }
    }

    /// Adds a process whose network namespace is identified by `netns`
    /// and contains `devices`.
    ///
    /// Writes `/proc/[pid]/ns/net`, `/proc/[pid]/net/dev` and the
    /// per-device `ifindex`/`iflink` files under `/proc/[pid]/root/sys`.
    pub fn add_process(&mut self, pid: u32, comm: &str, netns: &str, devices: &[MockDevice<'_>]) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_file(base.join("comm"), format!("{}\n", comm));
        self.add_link(base.join("ns/net"), netns);

        let mut net_dev = String::from(
            "Inter-|   Receive                                                |  Transmit\n \
             face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed\n",
        );
        for dev in devices {
            net_dev.push_str(&format!(
                "{:>6}:    1296      16    0    0    0     0          0         0     1296      16    0    0    0     0       0          0\n",
                dev.name
            ));
            let sys = base.join("root/sys/class/net").join(dev.name);
            self.add_file(sys.join("ifindex"), format!("{}\n", dev.ifindex));
            self.add_file(sys.join("iflink"), format!("{}\n", dev.iflink));
        }
        self.add_file(base.join("net/dev"), net_dev);
    }
}

fn not_found(kind: &str, path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found: {:?}", kind, path),
    )
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("file", path))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.links.contains_key(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(not_found("directory", path));
        }

        let mut entries = HashSet::new();

        // Direct children only
        let children = self
            .files
            .keys()
            .chain(self.links.keys())
            .chain(self.directories.iter());
        for child in children {
            if child.parent().is_some_and(|parent| parent == path) && child != path {
                entries.insert(child.clone());
            }
        }

        Ok(entries.into_iter().collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        self.links
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("link", path))
    }
}
