//! Tests for the descriptor cache file

use descache_api::{DescriptorCacheManager, DescriptorDb, FileDescriptorRecord, Host};
use descache_core::DescriptorStore;
use descache_core::codec::encode_record;
use serde_bytes::ByteBuf;
use tempfile::TempDir;

fn create_test_host(address: &str, files: &[&str]) -> Host {
    let mut host = Host::new(address, 1_700_000_000);
    host.service_names = vec![format!("{}.Service", address.replace(':', "_"))];
    host.descriptor_blobs = files
        .iter()
        .map(|name| ByteBuf::from(encode_record(&FileDescriptorRecord::new(*name, "pkg")).unwrap()))
        .collect();
    host
}

#[test]
fn test_store_persists_across_instances() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("cache").join("descriptors.db");

    let mut db = DescriptorDb::new();
    db.hosts.push(create_test_host("a:1", &["a.proto", "dep.proto"]));
    db.hosts.push(create_test_host("b:1", &["b.proto"]));

    {
        let store = DescriptorStore::new(&path);
        store.persist(&db).unwrap();
    }

    {
        let store = DescriptorStore::new(&path);
        assert_eq!(store.load().hosts, db.hosts);
    }
}

#[test]
fn test_store_stats() {
    let temp = TempDir::new().unwrap();
    let store = DescriptorStore::new(temp.path().join("descriptors.db"));

    let mut db = DescriptorDb::new();
    for i in 0..3 {
        let files: Vec<String> = (0..4).map(|j| format!("f{}_{}.proto", i, j)).collect();
        let refs: Vec<&str> = files.iter().map(String::as_str).collect();
        db.hosts.push(create_test_host(&format!("host{}:1", i), &refs));
    }
    store.persist(&db).unwrap();

    let stats = store.stats();
    assert_eq!(stats.total_hosts, 3);
    assert_eq!(stats.total_descriptors, 12);
    assert_eq!(stats.version, descache_api::models::CURRENT_VERSION);
}

#[test]
fn test_inspect_lists_decoded_files() {
    let temp = TempDir::new().unwrap();
    let store = DescriptorStore::new(temp.path().join("descriptors.db"));

    let mut db = DescriptorDb::new();
    db.hosts.push(create_test_host("a:1", &["z.proto", "a.proto"]));
    store.persist(&db).unwrap();

    let result = store.inspect_host("a:1").expect("host should be cached");
    assert_eq!(result.files, vec!["a.proto", "z.proto"]);
    assert_eq!(result.summary.descriptor_count, 2);
    assert_eq!(result.corrupt_blobs, 0);
    assert_eq!(result.services, vec!["a_1.Service"]);
}

#[test]
fn test_fingerprint_tracks_blob_content() {
    let temp = TempDir::new().unwrap();
    let store = DescriptorStore::new(temp.path().join("descriptors.db"));

    let mut db = DescriptorDb::new();
    db.hosts.push(create_test_host("a:1", &["a.proto"]));
    db.hosts.push(create_test_host("b:1", &["a.proto"]));
    db.hosts.push(create_test_host("c:1", &["c.proto"]));
    store.persist(&db).unwrap();

    let hosts = store.scan_hosts();
    assert_eq!(hosts[0].fingerprint, hosts[1].fingerprint);
    assert_ne!(hosts[0].fingerprint, hosts[2].fingerprint);
}

#[test]
fn test_store_clear() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("descriptors.db");
    let store = DescriptorStore::new(&path);

    let mut db = DescriptorDb::new();
    db.hosts.push(create_test_host("a:1", &["a.proto"]));
    store.persist(&db).unwrap();
    assert!(store.inspect_host("a:1").is_some());

    store.clear().unwrap();

    let store2 = DescriptorStore::new(&path);
    assert!(store2.inspect_host("a:1").is_none());
    assert!(store2.scan_hosts().is_empty());
}
