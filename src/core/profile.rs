use std::path::Path;

use bytesize::ByteSize;
use serde::Serialize;
use sysinfo::{Disks, Networks, System};

use crate::core::outcome::Category;

const GIB: f64 = 1_073_741_824.0;

/// Ordered key/value facts about the executing host. No fixed schema;
/// consumers tolerate missing keys.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HostProfile {
    facts: Vec<(String, String)>,
}

impl HostProfile {
    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.facts.push((key.into(), value.to_string()));
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.facts
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn facts(&self) -> &[(String, String)] {
        &self.facts
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }
}

/// Gathers host facts for one category. Every fact source is best-effort:
/// an unavailable source yields the "Not Available" sentinel instead of
/// aborting collection.
pub fn snapshot(category: Category) -> HostProfile {
    let sys = System::new_all();
    let mut profile = base_facts(&sys);

    match category {
        Category::Cpu | Category::Ml => {}
        Category::Memory => memory_facts(&sys, &mut profile),
        Category::Storage => storage_facts(&mut profile),
        Category::Network => network_facts(&mut profile),
        Category::Accelerator => accelerator_facts(&mut profile),
    }

    profile
}

/// Combined snapshot with every category extension, for `hostbench host`.
pub fn snapshot_full() -> HostProfile {
    let sys = System::new_all();
    let mut profile = base_facts(&sys);
    memory_facts(&sys, &mut profile);
    storage_facts(&mut profile);
    network_facts(&mut profile);
    accelerator_facts(&mut profile);
    profile
}

fn base_facts(sys: &System) -> HostProfile {
    let mut profile = HostProfile::default();

    let brand = sys.global_cpu_info().brand().trim().to_string();
    profile.push(
        "CPU",
        if brand.is_empty() {
            "Not Available".to_string()
        } else {
            brand
        },
    );
    profile.push("Architecture", std::env::consts::ARCH);
    profile.push("Cores", num_cpus::get());
    profile.push("Physical Cores", num_cpus::get_physical());
    profile.push(
        "OS",
        format!(
            "{} {}",
            System::name().unwrap_or_else(|| "unknown".to_string()),
            System::os_version().unwrap_or_default()
        ),
    );
    profile.push(
        "Kernel",
        System::kernel_version().unwrap_or_else(|| "Not Available".to_string()),
    );
    profile.push(
        "Total Memory (GB)",
        format!("{:.2}", sys.total_memory() as f64 / GIB),
    );
    profile.push("Harness Version", env!("CARGO_PKG_VERSION"));

    profile
}

fn memory_facts(sys: &System, profile: &mut HostProfile) {
    profile.push(
        "Available Memory (GB)",
        format!("{:.2}", sys.available_memory() as f64 / GIB),
    );
    profile.push(
        "Used Memory (GB)",
        format!("{:.2}", sys.used_memory() as f64 / GIB),
    );
    if sys.total_memory() > 0 {
        profile.push(
            "Memory Usage (%)",
            format!(
                "{:.1}",
                sys.used_memory() as f64 / sys.total_memory() as f64 * 100.0
            ),
        );
    }
    profile.push(
        "Swap Total (GB)",
        format!("{:.2}", sys.total_swap() as f64 / GIB),
    );
    profile.push(
        "Swap Used (GB)",
        format!("{:.2}", sys.used_swap() as f64 / GIB),
    );
}

fn storage_facts(profile: &mut HostProfile) {
    let disks = Disks::new_with_refreshed_list();
    match disks.list().first() {
        Some(disk) => {
            profile.push("Disk Type", format!("{:?}", disk.kind()));
            profile.push("Filesystem", disk.file_system().to_string_lossy());
            profile.push("Total Disk Space", ByteSize(disk.total_space()));
        }
        None => {
            profile.push("Disk Type", "Not Available");
        }
    }
}

fn network_facts(profile: &mut HostProfile) {
    match default_interface() {
        Some(name) => profile.push("Primary Interface", name),
        None => profile.push("Primary Interface", "Not Available"),
    }
}

fn accelerator_facts(profile: &mut HostProfile) {
    profile.push(
        "Accelerator",
        if render_node_present() {
            "Render node present"
        } else {
            "Not Available"
        },
    );
}

/// Picks the interface a network run should use when none is configured:
/// eth0, then wlan0, then the alphabetically first non-loopback interface.
pub fn default_interface() -> Option<String> {
    let networks = Networks::new_with_refreshed_list();
    let mut names: Vec<&String> = networks.iter().map(|(name, _)| name).collect();

    if names.iter().any(|n| n.as_str() == "eth0") {
        return Some("eth0".to_string());
    }
    if names.iter().any(|n| n.as_str() == "wlan0") {
        return Some("wlan0".to_string());
    }

    names.sort();
    names
        .into_iter()
        .find(|n| n.as_str() != "lo")
        .cloned()
}

/// Whether a DRM render node is exposed; stands in for accelerator presence.
pub fn render_node_present() -> bool {
    Path::new("/dev/dri")
        .read_dir()
        .map(|mut entries| entries.next().is_some())
        .unwrap_or(false)
}
