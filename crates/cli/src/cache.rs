use clap::Subcommand;
use descache_api::DescriptorCacheManager;
use descache_core::freshness::is_fresh;
use descache_core::util::unix_now;
use descache_core::{DescriptorStore, ProxyConfig};
use tabled::{Table, Tabled};

#[derive(Subcommand)]
pub enum CacheCommands {
    /// Show cache statistics
    Stats,
    /// List cached host entries
    Hosts {
        /// Sort by size or age
        #[arg(long, value_parser = ["size", "age"])]
        sort: Option<String>,
        /// Only show addresses containing this pattern
        #[arg(long)]
        filter: Option<String>,
    },
    /// Inspect the entry for a host address
    Inspect {
        /// Host address
        address: String,
    },
    /// Delete the cache file
    Clear,
}

#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Services")]
    services: usize,
    #[tabled(rename = "Files")]
    files: usize,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Age")]
    age: String,
    #[tabled(rename = "Fingerprint")]
    fingerprint: String,
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / 1024.0 / 1024.0)
    }
}

fn format_age(last_update: i64, now: i64) -> String {
    let Some(age) = now.checked_sub(last_update) else {
        return "unknown".to_string();
    };
    if age < 0 {
        "in future".to_string()
    } else if age < 60 {
        format!("{}s ago", age)
    } else if age < 3600 {
        format!("{}m ago", age / 60)
    } else if age < 86400 {
        format!("{}h ago", age / 3600)
    } else {
        format!("{}d ago", age / 86400)
    }
}

pub fn run(config: &ProxyConfig, cmd: CacheCommands) -> Result<(), Box<dyn std::error::Error>> {
    let store = DescriptorStore::new(config.cache_path());

    match cmd {
        CacheCommands::Stats => {
            let stats = store.stats();
            println!("Cache File:        {}", stats.cache_path.display());
            println!("Size:              {}", format_size(stats.size_bytes));
            println!("Format Version:    {}", stats.version);
            println!("Hosts:             {}", stats.total_hosts);
            println!("Descriptor Files:  {}", stats.total_descriptors);
            println!("TTL:               {}s", config.ttl.as_secs());
        }
        CacheCommands::Hosts { sort, filter } => {
            let mut hosts = store.scan_hosts();

            if let Some(pattern) = filter {
                hosts.retain(|h| h.address.contains(&pattern));
            }

            if let Some(key) = sort {
                match key.as_str() {
                    "size" => hosts.sort_by(|a, b| b.payload_bytes.cmp(&a.payload_bytes)),
                    "age" => hosts.sort_by(|a, b| b.last_update.cmp(&a.last_update)),
                    _ => {}
                }
            }

            let now = unix_now();
            let rows: Vec<HostRow> = hosts
                .into_iter()
                .map(|h| HostRow {
                    age: format_age(h.last_update, now),
                    size: format_size(h.payload_bytes as u64),
                    address: h.address,
                    services: h.service_count,
                    files: h.descriptor_count,
                    fingerprint: h.fingerprint,
                })
                .collect();

            if rows.is_empty() {
                println!("No cached hosts found.");
            } else {
                println!("{}", Table::new(rows));
            }
        }
        CacheCommands::Inspect { address } => {
            if let Some(result) = store.inspect_host(&address) {
                let now = unix_now();
                let fresh = is_fresh(result.summary.last_update, now, config.ttl);
                println!("Host Summary:");
                println!("  Address:     {}", result.summary.address);
                println!(
                    "  Updated:     {} ({})",
                    format_age(result.summary.last_update, now),
                    if fresh { "fresh" } else { "stale" }
                );
                println!("  Payload:     {}", format_size(result.summary.payload_bytes as u64));
                println!("  Fingerprint: {}", result.summary.fingerprint);

                println!("\nServices:");
                for service in &result.services {
                    println!("  {}", service);
                }

                println!("\nDescriptor Files:");
                for (i, file) in result.files.iter().enumerate() {
                    println!("  {}. {}", i + 1, file);
                }
                if result.corrupt_blobs > 0 {
                    println!("\n{} blobs could not be decoded.", result.corrupt_blobs);
                }
            } else {
                println!("No cached entry for host: {}", address);
            }
        }
        CacheCommands::Clear => {
            store.clear()?;
            println!("Cache cleared successfully.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age_buckets() {
        assert_eq!(format_age(100, 130), "30s ago");
        assert_eq!(format_age(0, 7200), "2h ago");
        assert_eq!(format_age(10, 0), "in future");
        assert_eq!(format_age(i64::MIN, 1_700_000_000), "unknown");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }
}
