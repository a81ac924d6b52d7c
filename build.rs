//! Build script for netprobe
//! Surfaces the privilege requirement for ICMP traceroute at build time.

fn main() {
    // Only run the capability messaging on Unix like systems
    #[cfg(target_family = "unix")]
    {
        println!("cargo:rerun-if-changed=build.rs");

        println!(
            "cargo:warning=netprobe needs CAP_NET_RAW (or root) for ICMP traceroute"
        );
        println!(
            "cargo:warning=Grant it with: sudo setcap cap_net_raw+ep $(command -v netprobe)"
        );
    }
}
