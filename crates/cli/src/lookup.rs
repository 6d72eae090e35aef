use clap::{ArgGroup, Args};
use descache_api::DescriptorSource;
use descache_core::{DescriptorIndex, DescriptorProxy, ProxyConfig, Resolution, SnapshotReflection, store};
use std::path::PathBuf;

#[derive(Args)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["file", "symbol", "extension", "services"])
))]
pub struct LookupArgs {
    /// Host address used as cache key
    #[arg(long)]
    host: String,
    /// Find a descriptor file by name
    #[arg(long)]
    file: Option<String>,
    /// Find the file declaring a fully-qualified symbol
    #[arg(long)]
    symbol: Option<String>,
    /// Find the file declaring an extension, as TYPE:FIELD_NUMBER
    #[arg(long, value_name = "TYPE:NUMBER")]
    extension: Option<String>,
    /// List the host's services
    #[arg(long)]
    services: bool,
    /// Refresh from this reflection snapshot when the entry is stale.
    /// Without it only the cache file is consulted.
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,
}

fn parse_extension(raw: &str) -> Result<(&str, i32), String> {
    let (containing_type, number) = raw
        .rsplit_once(':')
        .ok_or_else(|| format!("expected TYPE:NUMBER, got {:?}", raw))?;
    let number = number
        .parse::<i32>()
        .map_err(|e| format!("invalid field number {:?}: {}", number, e))?;
    Ok((containing_type, number))
}

/// Proxy over whatever the cache file holds for `host`, without refreshing.
fn cached_only(config: &ProxyConfig, host: &str) -> DescriptorProxy {
    let db = store::load(config.cache_path());
    let mut index = DescriptorIndex::new();
    if let Some(entry) = db.first_host(host) {
        index.merge_host(entry);
    }
    let services = db
        .hosts_for(host)
        .flat_map(|h| h.service_names.iter().cloned())
        .collect();
    DescriptorProxy::from_resolution(
        host,
        Resolution {
            index,
            services,
            refreshed: false,
        },
    )
}

pub fn run(config: &ProxyConfig, args: LookupArgs) -> Result<(), Box<dyn std::error::Error>> {
    let proxy = match &args.snapshot {
        Some(path) => {
            let reflection = SnapshotReflection::load(path)?;
            DescriptorProxy::with_reflection(config, &args.host, &reflection)
        }
        None => cached_only(config, &args.host),
    };

    if args.services {
        for service in proxy.services() {
            println!("{}", service);
        }
        return Ok(());
    }

    let found = if let Some(name) = &args.file {
        proxy.find_file_by_name(name)
    } else if let Some(symbol) = &args.symbol {
        proxy.find_file_containing_symbol(symbol)
    } else if let Some(raw) = &args.extension {
        let (containing_type, number) = parse_extension(raw)?;
        proxy.find_file_containing_extension(containing_type, number)
    } else {
        None
    };

    match found {
        Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
        None => println!("Not found in descriptors for {}", args.host),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_extension() {
        assert_eq!(
            parse_extension("google.protobuf.FieldOptions:50001").unwrap(),
            ("google.protobuf.FieldOptions", 50001)
        );
        assert!(parse_extension("no-number").is_err());
        assert!(parse_extension("Type:abc").is_err());
    }
}
