//! Pre-built mock filesystem scenarios for testing.
//!
//! These scenarios provide realistic `/proc` and `/sys` states for a host
//! running containers attached to a bridge.

use super::filesystem::{HOST_NETNS, MockDevice, MockFs};

const LO: MockDevice<'static> = MockDevice {
    name: "lo",
    ifindex: 1,
    iflink: 1,
};

impl MockFs {
    /// Creates a host with a `weave` bridge and three containers.
    ///
    /// Bridge ports: `vethwe-bridge` (peer 6, host side), `vxlan-6784`
    /// (not a veth), `vethwepl1000` (peer 9) and `vethwepl2000` (peer 11).
    ///
    /// Processes:
    /// - 1: init, host namespace
    /// - 1000, 1001: nginx master and worker sharing a namespace with `ethwe` (9)
    /// - 2000: redis with `ethwe` (11) and a docker `eth0` (13)
    /// - 3000: postgres attached only to the docker bridge
    pub fn weave_host() -> Self {
        let mut fs = Self::new();

        // Host side
        fs.add_host_device("lo", 1, 1);
        fs.add_host_device("eth0", 2, 2);
        fs.add_host_device("docker0", 3, 3);
        fs.add_host_device("vethwe-datapath", 6, 7);
        fs.add_host_device("vethwe-bridge", 7, 6);
        fs.add_stacked_device("vxlan-6784", 8, 8, "vxlan");
        fs.add_host_device("vethwepl1000", 10, 9);
        fs.add_host_device("vethwepl2000", 12, 11);
        fs.add_host_device("veth3a1b2c", 14, 13);
        fs.add_host_device("veth9f8e7d", 22, 21);
        fs.add_bridge(
            "weave",
            5,
            &["vethwe-bridge", "vxlan-6784", "vethwepl1000", "vethwepl2000"],
        );
        fs.add_bridge("docker0", 3, &["veth3a1b2c", "veth9f8e7d"]);

        fs.add_process(
            1,
            "systemd",
            HOST_NETNS,
            &[
                LO,
                MockDevice {
                    name: "eth0",
                    ifindex: 2,
                    iflink: 2,
                },
                MockDevice {
                    name: "vethwe-bridge",
                    ifindex: 7,
                    iflink: 6,
                },
            ],
        );

        let nginx_devices = [
            LO,
            MockDevice {
                name: "ethwe",
                ifindex: 9,
                iflink: 10,
            },
        ];
        fs.add_process(1000, "nginx", "net:[4026532301]", &nginx_devices);
        fs.add_process(1001, "nginx", "net:[4026532301]", &nginx_devices);

        fs.add_process(
            2000,
            "redis-server",
            "net:[4026532402]",
            &[
                LO,
                MockDevice {
                    name: "ethwe",
                    ifindex: 11,
                    iflink: 12,
                },
                MockDevice {
                    name: "eth0",
                    ifindex: 13,
                    iflink: 14,
                },
            ],
        );

        fs.add_process(
            3000,
            "postgres",
            "net:[4026532503]",
            &[
                LO,
                MockDevice {
                    name: "eth0",
                    ifindex: 21,
                    iflink: 22,
                },
            ],
        );

        fs
    }

    /// Creates a host with processes but no bridges at all.
    pub fn bare_host() -> Self {
        let mut fs = Self::new();
        fs.add_host_device("lo", 1, 1);
        fs.add_host_device("eth0", 2, 2);
        fs.add_process(1, "systemd", HOST_NETNS, &[LO]);
        fs
    }
}
