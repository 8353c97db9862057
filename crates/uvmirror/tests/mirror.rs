//! Full reconciliation runs against an in-memory upstream and bucket.

use serde_json::json;
use uvmirror::{Mirror, MirrorError, TransferError, TransferResult};
use uvmirror_fetch::{Fetcher, MockHttpClient};
use uvmirror_source::{GithubRelease, PythonConfig, PythonDownloads, ReleaseConfig};
use uvmirror_store::MemoryStore;

const PBS: &str = "https://github.com/astral-sh/python-build-standalone/releases/download/";
const PYPY: &str = "https://downloads.python.org/pypy/";
const UV: &str = "https://github.com/astral-sh/uv/releases/download/0.4.24/";

fn sha256_hex(data: &[u8]) -> String {
    use sha2::Digest;
    hex::encode(sha2::Sha256::digest(data))
}

fn python() -> PythonDownloads { PythonDownloads::new(&PythonConfig::default()).unwrap() }

fn uv() -> GithubRelease { GithubRelease::new(ReleaseConfig::default()).unwrap().with_token(None) }

fn cpython_url(name: &str) -> String { format!("{PBS}20241016/{name}") }

/// Upstream with two interpreter builds, one debug build, and one build on
/// an unrecognized host.
fn python_upstream() -> MockHttpClient {
    let linux = cpython_url("cpython-3.13.0%2B20241016-x86_64-unknown-linux-gnu-install_only.tar.gz");
    let pypy = format!("{PYPY}pypy3.10-v7.3.17-linux64.tar.bz2");
    let debug = cpython_url("cpython-3.13.0%2B20241016-x86_64-unknown-linux-gnu-debug-full.tar.zst");
    let document = json!({
        "cpython-3.13.0-linux-x86_64-gnu": { "url": linux, "sha256": sha256_hex(b"linux build") },
        "pypy-3.10.14-linux-x86_64-gnu": { "url": pypy, "sha256": null },
        "cpython-3.13.0-linux-x86_64-gnu-debug": { "url": debug, "sha256": sha256_hex(b"debug build") },
        "graalpy-24.1.0-linux-x86_64-gnu": { "url": "https://example.com/graalpy.tar.gz", "sha256": null },
    });

    MockHttpClient::new()
        .route(PythonConfig::default().metadata_url, 200, document.to_string())
        .route(linux, 200, "linux build")
        .route(pypy, 200, "pypy build")
        .route(debug, 200, "debug build")
}

const LINUX_KEY: &str = "20241016/cpython-3.13.0+20241016-x86_64-unknown-linux-gnu-install_only.tar.gz";
const PYPY_KEY: &str = "pypy3.10-v7.3.17-linux64.tar.bz2";

#[tokio::test]
async fn first_run_uploads_in_scope_builds_only() {
    let mirror = Mirror::new(Fetcher::new(python_upstream()), MemoryStore::new());

    let report = mirror.run(&python()).await.unwrap();

    assert!(report.is_clean());
    assert_eq!(report.manifest_entries, 4);
    assert_eq!(report.in_scope, 2);
    assert_eq!(report.uploaded(), 2);
    assert_eq!(mirror.store().keys(), [LINUX_KEY, PYPY_KEY]);
    assert_eq!(mirror.store().get(LINUX_KEY).unwrap().as_ref(), b"linux build");
    assert!(mirror.store().delete_calls().is_empty());
    assert_eq!(mirror.fetcher().client().request_count("https://example.com/graalpy.tar.gz"), 0);
}

#[tokio::test]
async fn second_run_is_a_no_op() {
    let mirror = Mirror::new(Fetcher::new(python_upstream()), MemoryStore::new());

    mirror.run(&python()).await.unwrap();
    let puts = mirror.store().put_calls().len();
    let report = mirror.run(&python()).await.unwrap();

    assert_eq!(report.missing, 0);
    assert_eq!(report.stale, 0);
    assert!(report.transfers.is_empty());
    assert_eq!(mirror.store().put_calls().len(), puts);
    assert!(mirror.store().delete_calls().is_empty());
}

#[tokio::test]
async fn stale_owned_keys_are_pruned_and_foreign_keys_kept() {
    let store = MemoryStore::new().with_keys([
        LINUX_KEY,
        PYPY_KEY,
        "20240107/cpython-3.12.1+20240107-x86_64-unknown-linux-gnu-install_only.tar.gz",
        "pypy3.9-v7.3.15-linux64.tar.bz2",
        "uv-x86_64-unknown-linux-gnu.tar.gz",
        "index.html",
    ]);
    let mirror = Mirror::new(Fetcher::new(python_upstream()), store);

    let report = mirror.run(&python()).await.unwrap();

    assert_eq!(report.uploaded(), 0);
    assert!(matches!(report.pruned, Ok(2)));
    assert_eq!(mirror.store().delete_calls(), vec![vec![
        "20240107/cpython-3.12.1+20240107-x86_64-unknown-linux-gnu-install_only.tar.gz".to_string(),
        "pypy3.9-v7.3.15-linux64.tar.bz2".to_string(),
    ]]);
    assert!(mirror.store().contains("uv-x86_64-unknown-linux-gnu.tar.gz"));
    assert!(mirror.store().contains("index.html"));
}

#[tokio::test]
async fn checksum_mismatch_fails_one_artifact_only() {
    let linux = cpython_url("cpython-3.13.0%2B20241016-x86_64-unknown-linux-gnu-install_only.tar.gz");
    let client = python_upstream().route(linux, 200, "tampered build");
    let store = MemoryStore::new().with_keys(["pypy3.9-v7.3.15-linux64.tar.bz2"]);
    let mirror = Mirror::new(Fetcher::new(client), store);

    let report = mirror.run(&python()).await.unwrap();

    assert_eq!(report.uploaded(), 1);
    let failed: Vec<_> = report.failed().collect();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].0, LINUX_KEY);
    assert!(matches!(failed[0].1, TransferError::ChecksumMismatch { .. }));
    assert!(!mirror.store().contains(LINUX_KEY));
    assert!(!mirror.store().put_calls().contains(&LINUX_KEY.to_string()));
    assert!(matches!(report.pruned, Ok(1)));
    assert!(!report.is_clean());
}

#[tokio::test]
async fn unavailable_manifest_writes_nothing() {
    let client = MockHttpClient::new().route(PythonConfig::default().metadata_url, 503, "");
    let store = MemoryStore::new().with_keys([PYPY_KEY]);
    let mirror = Mirror::new(Fetcher::new(client), store);

    assert!(matches!(mirror.run(&python()).await, Err(MirrorError::Manifest(_))));
    assert!(mirror.store().put_calls().is_empty());
    assert!(mirror.store().delete_calls().is_empty());
    assert!(mirror.store().contains(PYPY_KEY));
}

#[tokio::test]
async fn unavailable_inventory_writes_nothing() {
    let mirror = Mirror::new(Fetcher::new(python_upstream()), MemoryStore::new().fail_list());

    assert!(matches!(mirror.run(&python()).await, Err(MirrorError::Inventory(_))));
    assert!(mirror.store().put_calls().is_empty());
}

#[tokio::test]
async fn failed_prune_is_reported_after_uploads() {
    let store = MemoryStore::new()
        .with_keys(["pypy3.9-v7.3.15-linux64.tar.bz2"])
        .fail_deletes();
    let mirror = Mirror::new(Fetcher::new(python_upstream()), store);

    let report = mirror.run(&python()).await.unwrap();

    assert_eq!(report.uploaded(), 2);
    assert!(report.pruned.is_err());
    assert!(mirror.store().contains("pypy3.9-v7.3.15-linux64.tar.bz2"));
    assert!(report.to_string().contains("prune failed"));
}

#[tokio::test]
async fn plan_reports_without_writing() {
    let store = MemoryStore::new().with_keys(["pypy3.9-v7.3.15-linux64.tar.bz2"]);
    let mirror = Mirror::new(Fetcher::new(python_upstream()), store);

    let plan = mirror.plan(&python()).await.unwrap();

    let missing: Vec<_> = plan.missing.iter().map(|a| a.key.as_str()).collect();
    assert_eq!(missing, [LINUX_KEY, PYPY_KEY]);
    assert_eq!(plan.stale, ["pypy3.9-v7.3.15-linux64.tar.bz2"]);
    assert!(mirror.store().put_calls().is_empty());
    assert!(mirror.store().delete_calls().is_empty());
}

fn uv_upstream(assets: &[(&str, Option<&[u8]>)]) -> MockHttpClient {
    let listed: Vec<_> = assets
        .iter()
        .flat_map(|(name, _)| {
            [name.to_string(), format!("{name}.sha256")]
                .map(|n| json!({ "name": n, "browser_download_url": format!("{UV}{n}") }))
        })
        .collect();
    let mut client = MockHttpClient::new().route(
        ReleaseConfig::default().releases_url,
        200,
        json!({ "tag_name": "0.4.24", "assets": listed }).to_string(),
    );
    for (name, sidecar) in assets {
        let body = format!("{name} body");
        client = client.route(format!("{UV}{name}"), 200, body.clone());
        if let Some(digest_of) = sidecar {
            let line = format!("{} *{name}\n", sha256_hex(digest_of));
            client = client.route(format!("{UV}{name}.sha256"), 200, line);
        }
    }
    client
}

#[tokio::test]
async fn release_assets_verify_against_sidecars() {
    let good = b"uv-x86_64-unknown-linux-gnu.tar.gz body".as_slice();
    let client = uv_upstream(&[
        ("uv-x86_64-unknown-linux-gnu.tar.gz", Some(good)),
        ("uv-aarch64-apple-darwin.tar.gz", Some(b"something else".as_slice())),
        ("uv-x86_64-pc-windows-msvc.zip", None),
    ]);
    let store = MemoryStore::new().with_keys([LINUX_KEY, "uv-i686-unknown-linux-gnu.tar.gz"]);
    let mirror = Mirror::new(Fetcher::new(client), store).with_concurrency(2);

    let report = mirror.run(&uv()).await.unwrap();

    assert_eq!(report.in_scope, 3);
    assert_eq!(report.uploaded(), 2);
    let failed: Vec<_> = report.failed().map(|(key, _)| key).collect();
    assert_eq!(failed, ["uv-aarch64-apple-darwin.tar.gz"]);

    assert!(mirror.store().contains("uv-x86_64-unknown-linux-gnu.tar.gz"));
    assert!(mirror.store().contains("uv-x86_64-pc-windows-msvc.zip"));
    assert!(!mirror.store().keys().iter().any(|k| k.ends_with(".sha256")));

    assert!(matches!(report.pruned, Ok(1)));
    assert!(!mirror.store().contains("uv-i686-unknown-linux-gnu.tar.gz"));
    assert!(mirror.store().contains(LINUX_KEY));
}

#[tokio::test]
async fn transfers_report_every_artifact_once() {
    let mirror = Mirror::new(Fetcher::new(python_upstream()), MemoryStore::new()).with_concurrency(1);

    let report = mirror.run(&python()).await.unwrap();

    let mut keys: Vec<_> = report.transfers.iter().map(TransferResult::key).collect();
    keys.sort_unstable();
    assert_eq!(keys, [LINUX_KEY, PYPY_KEY]);
}
