#[path = "../src/backup.rs"]
mod backup;

use std::fs::File;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_dir(prefix: &str) -> PathBuf {
    let p = std::env::temp_dir().join(format!(
        "{}-{}",
        prefix,
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos()
    ));
    std::fs::create_dir_all(&p).expect("create temp dir");
    p
}

#[test]
fn zip_export_and_import_roundtrip() {
    let workspace = temp_dir("schooldesk-backup-src");
    let workspace2 = temp_dir("schooldesk-backup-dst");
    let out_dir = temp_dir("schooldesk-backup-out");

    let db_src = workspace.join("schooldesk.sqlite3");
    let bytes = b"sqlite-test-payload";
    std::fs::write(&db_src, bytes).expect("write source db");

    let bundle_path = out_dir.join("workspace.zip");
    let export = backup::export_workspace_bundle(&workspace, &bundle_path).expect("export bundle");
    assert_eq!(export.bundle_format, backup::BUNDLE_FORMAT);
    assert_eq!(export.entry_count, 2);
    assert_eq!(export.db_sha256.len(), 64);

    let f = File::open(&bundle_path).expect("open bundle");
    let mut archive = zip::ZipArchive::new(f).expect("open zip archive");
    let mut manifest = String::new();
    archive
        .by_name("manifest.json")
        .expect("manifest entry")
        .read_to_string(&mut manifest)
        .expect("read manifest");
    assert!(manifest.contains(backup::BUNDLE_FORMAT));
    assert!(manifest.contains(&export.db_sha256));
    archive
        .by_name("db/schooldesk.sqlite3")
        .expect("database entry in bundle");

    let import = backup::import_workspace_bundle(&bundle_path, &workspace2).expect("import bundle");
    assert_eq!(import.bundle_format_detected, backup::BUNDLE_FORMAT);

    let restored = std::fs::read(workspace2.join("schooldesk.sqlite3")).expect("read restored db");
    assert_eq!(restored, bytes);
    assert!(!workspace2.join("schooldesk.sqlite3.importing").exists());

    let _ = std::fs::remove_dir_all(workspace);
    let _ = std::fs::remove_dir_all(workspace2);
    let _ = std::fs::remove_dir_all(out_dir);
}

#[test]
fn import_rejects_checksum_mismatch_and_keeps_existing_db() {
    let out_dir = temp_dir("schooldesk-backup-tampered");
    let workspace = temp_dir("schooldesk-backup-tampered-dst");
    std::fs::write(workspace.join("schooldesk.sqlite3"), b"current").expect("write current db");

    let bundle_path = out_dir.join("tampered.zip");
    {
        let file = File::create(&bundle_path).expect("create bundle");
        let mut zip = zip::ZipWriter::new(file);
        let opts = zip::write::FileOptions::default();
        zip.start_file("manifest.json", opts).expect("manifest entry");
        let manifest = serde_json::json!({
            "format": backup::BUNDLE_FORMAT,
            "version": 1,
            "dbSha256": "00".repeat(32),
        });
        zip.write_all(manifest.to_string().as_bytes())
            .expect("write manifest");
        zip.start_file("db/schooldesk.sqlite3", opts).expect("db entry");
        zip.write_all(b"swapped payload").expect("write db");
        zip.finish().expect("finish zip");
    }

    let err = backup::import_workspace_bundle(&bundle_path, &workspace)
        .expect_err("checksum mismatch must fail");
    assert!(err.to_string().contains("checksum mismatch"));

    let kept = std::fs::read(workspace.join("schooldesk.sqlite3")).expect("read kept db");
    assert_eq!(kept, b"current");

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn import_requires_manifest_checksum() {
    let out_dir = temp_dir("schooldesk-backup-nosum");
    let workspace = temp_dir("schooldesk-backup-nosum-dst");
    std::fs::write(workspace.join("schooldesk.sqlite3"), b"current").expect("write current db");

    for (name, manifest) in [
        (
            "missing.zip",
            serde_json::json!({ "format": backup::BUNDLE_FORMAT, "version": 1 }),
        ),
        (
            "numeric.zip",
            serde_json::json!({ "format": backup::BUNDLE_FORMAT, "version": 1, "dbSha256": 42 }),
        ),
    ] {
        let bundle_path = out_dir.join(name);
        {
            let file = File::create(&bundle_path).expect("create bundle");
            let mut zip = zip::ZipWriter::new(file);
            let opts = zip::write::FileOptions::default();
            zip.start_file("manifest.json", opts).expect("manifest entry");
            zip.write_all(manifest.to_string().as_bytes())
                .expect("write manifest");
            zip.start_file("db/schooldesk.sqlite3", opts).expect("db entry");
            zip.write_all(b"unverified payload").expect("write db");
            zip.finish().expect("finish zip");
        }

        let err = backup::import_workspace_bundle(&bundle_path, &workspace)
            .expect_err("bundle without checksum must fail");
        assert!(err.to_string().contains("dbSha256"), "{name}: {err}");
    }

    let kept = std::fs::read(workspace.join("schooldesk.sqlite3")).expect("read kept db");
    assert_eq!(kept, b"current");
    assert!(!workspace.join("schooldesk.sqlite3.importing").exists());

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn raw_sqlite_import_is_supported() {
    let out_dir = temp_dir("schooldesk-backup-raw");
    let workspace = temp_dir("schooldesk-backup-raw-dst");

    let raw_file = out_dir.join("copy.sqlite3");
    let bytes = b"raw-sqlite-copy";
    std::fs::write(&raw_file, bytes).expect("write raw sqlite file");

    let import = backup::import_workspace_bundle(&raw_file, &workspace).expect("import raw sqlite");
    assert_eq!(import.bundle_format_detected, backup::RAW_SQLITE_FORMAT);

    let restored = std::fs::read(workspace.join("schooldesk.sqlite3")).expect("read restored sqlite");
    assert_eq!(restored, bytes);

    let _ = std::fs::remove_dir_all(out_dir);
    let _ = std::fs::remove_dir_all(workspace);
}

#[test]
fn export_without_database_fails() {
    let workspace = temp_dir("schooldesk-backup-empty");
    let err = backup::export_workspace_bundle(&workspace, &workspace.join("out.zip"))
        .expect_err("missing database");
    assert!(err.to_string().contains("workspace database not found"));
    let _ = std::fs::remove_dir_all(workspace);
}
