//! Integration tests against a mock object store.

use std::collections::HashMap;
use std::io::Write;
use std::time::Duration;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use ostmeta_repo::{
    decode_summary, Checksum, ClientConfig, ObjectKind, ObjectStoreClient, RepoError, TreeWalker,
    COMPRESSED_FILE_SUFFIX,
};
use ostmeta_variant::{encode, Endian, Value};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// An in-memory repository: object paths to bytes, plus summary bytes.
#[derive(Default)]
struct FixtureRepo {
    objects: HashMap<String, Vec<u8>>,
    refs: Vec<(String, Checksum)>,
}

impl FixtureRepo {
    fn store(&mut self, bytes: Vec<u8>, suffix: &str) -> Checksum {
        let checksum = Checksum::digest(&bytes);
        self.objects
            .insert(ostmeta_repo::relative_path(&checksum, suffix), bytes);
        checksum
    }

    fn add_file(&mut self, content: &[u8]) -> Checksum {
        self.store(content.to_vec(), ObjectKind::File.suffix())
    }

    fn add_file_compressed(&mut self, content: &[u8]) -> Checksum {
        let checksum = Checksum::digest(content);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(content).unwrap();
        self.objects.insert(
            ostmeta_repo::relative_path(&checksum, COMPRESSED_FILE_SUFFIX),
            encoder.finish().unwrap(),
        );
        checksum
    }

    fn add_dirtree(
        &mut self,
        files: &[(&str, Checksum)],
        dirs: &[(&str, Checksum, Checksum)],
    ) -> Checksum {
        let value = Value::Tuple(vec![
            Value::Array(
                files
                    .iter()
                    .map(|(name, csum)| {
                        Value::Tuple(vec![
                            Value::Str((*name).into()),
                            Value::Bytes(csum.as_bytes().to_vec()),
                        ])
                    })
                    .collect(),
            ),
            Value::Array(
                dirs.iter()
                    .map(|(name, tree, meta)| {
                        Value::Tuple(vec![
                            Value::Str((*name).into()),
                            Value::Bytes(tree.as_bytes().to_vec()),
                            Value::Bytes(meta.as_bytes().to_vec()),
                        ])
                    })
                    .collect(),
            ),
        ]);
        self.store(encode(&value, Endian::Little), ObjectKind::DirTree.suffix())
    }

    fn add_dirmeta(&mut self) -> Checksum {
        let value = Value::Tuple(vec![
            Value::U32(0),
            Value::U32(0),
            Value::U32(0o40755),
            Value::Array(vec![]),
        ]);
        self.store(encode(&value, Endian::Little), ObjectKind::DirMeta.suffix())
    }

    fn add_commit(&mut self, ref_name: &str, root_tree: Checksum, root_meta: Checksum) -> Checksum {
        let value = Value::Tuple(vec![
            Value::Dict(vec![]),
            Value::Bytes(vec![]),
            Value::Array(vec![]),
            Value::Str("snapshot".into()),
            Value::Str(String::new()),
            Value::U64(1_700_000_000),
            Value::Bytes(root_tree.as_bytes().to_vec()),
            Value::Bytes(root_meta.as_bytes().to_vec()),
        ]);
        let checksum = self.store(encode(&value, Endian::Little), ObjectKind::Commit.suffix());
        self.refs.push((ref_name.to_string(), checksum));
        checksum
    }

    fn summary_bytes(&self) -> Vec<u8> {
        let refs = self
            .refs
            .iter()
            .map(|(name, checksum)| {
                Value::Tuple(vec![
                    Value::Str(name.clone()),
                    Value::Tuple(vec![
                        Value::Bytes(checksum.as_bytes().to_vec()),
                        Value::Variant {
                            signature: "t".into(),
                            value: Box::new(Value::U64(0)),
                        },
                    ]),
                ])
            })
            .collect();
        encode(
            &Value::Tuple(vec![Value::Array(refs), Value::Dict(vec![])]),
            Endian::Little,
        )
    }

    async fn mount(&self, server: &MockServer) {
        Mock::given(method("GET"))
            .and(path("/summary"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(self.summary_bytes()))
            .mount(server)
            .await;
        for (object_path, bytes) in &self.objects {
            Mock::given(method("GET"))
                .and(path(format!("/{object_path}")))
                .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.clone()))
                .mount(server)
                .await;
        }
    }
}

fn fast_client(server: &MockServer) -> ObjectStoreClient {
    let mut config = ClientConfig::new(Url::parse(&server.uri()).unwrap());
    config.backoff_base = Duration::from_millis(1);
    ObjectStoreClient::new(config).unwrap()
}

#[tokio::test]
async fn summary_enumerates_refs_in_order() {
    let mut repo = FixtureRepo::default();
    let tree = repo.add_dirtree(&[], &[]);
    let meta = repo.add_dirmeta();
    repo.add_commit("app/z.App/x86_64/stable", tree, meta);
    repo.add_commit("app/a.App/x86_64/stable", tree, meta);

    let server = MockServer::start().await;
    repo.mount(&server).await;
    let client = fast_client(&server);

    let bytes = client.fetch_summary().await.unwrap();
    let entries = decode_summary(&bytes).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "app/z.App/x86_64/stable");
    assert_eq!(entries[1].name, "app/a.App/x86_64/stable");
}

#[tokio::test]
async fn walker_resolves_nested_path_to_exact_checksum() {
    let mut repo = FixtureRepo::default();
    let manifest = repo.add_file(b"{\"id\": \"org.example.App\"}");
    let metadata = repo.add_file(b"[Application]\nname=org.example.App\n");
    let meta = repo.add_dirmeta();
    let app_tree = repo.add_dirtree(&[("manifest.json", manifest)], &[]);
    let root_tree = repo.add_dirtree(&[("metadata", metadata)], &[("app", app_tree, meta)]);
    let commit = repo.add_commit("app/org.example.App/x86_64/stable", root_tree, meta);

    let server = MockServer::start().await;
    repo.mount(&server).await;
    let client = fast_client(&server);
    let walker = TreeWalker::new(&client);

    let info = walker.load_commit(&commit).await.unwrap();
    assert_eq!(info.root_tree, root_tree);

    let resolved = walker
        .resolve_path(&info.root_tree, "app/manifest.json")
        .await
        .unwrap();
    assert_eq!(resolved, Some(manifest));

    let content = walker
        .read_file(&info.root_tree, "metadata")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&content[..], b"[Application]\nname=org.example.App\n");
}

#[tokio::test]
async fn walker_reports_absent_paths_as_none() {
    let mut repo = FixtureRepo::default();
    let metadata = repo.add_file(b"[Application]\n");
    let meta = repo.add_dirmeta();
    let root_tree = repo.add_dirtree(&[("metadata", metadata)], &[]);
    repo.add_commit("app/x/y/z", root_tree, meta);

    let server = MockServer::start().await;
    repo.mount(&server).await;
    let client = fast_client(&server);
    let walker = TreeWalker::new(&client);

    assert_eq!(
        walker
            .resolve_path(&root_tree, "app/manifest.json")
            .await
            .unwrap(),
        None
    );
    assert_eq!(walker.resolve_path(&root_tree, "missing").await.unwrap(), None);
    assert_eq!(walker.read_file(&root_tree, "missing").await.unwrap(), None);
}

#[tokio::test]
async fn compressed_file_content_is_inflated_and_verified() {
    let mut repo = FixtureRepo::default();
    let content = b"compressed metadata body";
    let checksum = repo.add_file_compressed(content);

    let server = MockServer::start().await;
    repo.mount(&server).await;
    let client = fast_client(&server);

    let fetched = client
        .fetch(&checksum, ObjectKind::File)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&fetched[..], content);
}

#[tokio::test]
async fn transient_failures_are_retried_until_success() {
    let server = MockServer::start().await;
    let content = b"eventually available";
    let checksum = Checksum::digest(content);
    let object_path = format!("/{}", ostmeta_repo::relative_path(&checksum, "file"));

    Mock::given(method("GET"))
        .and(path(object_path.clone()))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(object_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.to_vec()))
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let fetched = client
        .fetch(&checksum, ObjectKind::File)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&fetched[..], content);
}

#[tokio::test]
async fn retry_budget_exhaustion_is_an_error() {
    let server = MockServer::start().await;
    let checksum = Checksum::digest(b"never there");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client
        .fetch(&checksum, ObjectKind::Commit)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Fetch { .. }));
    assert!(err.to_string().contains("retry budget exhausted"));
}

#[tokio::test]
async fn not_found_is_not_retried() {
    let server = MockServer::start().await;
    let checksum = Checksum::digest(b"absent");

    // One request per representation, no retries on 404.
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let fetched = client.fetch(&checksum, ObjectKind::Commit).await.unwrap();
    assert_eq!(fetched, None);
}

#[tokio::test]
async fn permanent_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    let checksum = Checksum::digest(b"forbidden");

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client
        .fetch(&checksum, ObjectKind::Commit)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Fetch { .. }));
}

#[tokio::test]
async fn corrupt_content_is_rejected() {
    let server = MockServer::start().await;
    let checksum = Checksum::digest(b"expected content");

    Mock::given(method("GET"))
        .and(path(format!(
            "/{}",
            ostmeta_repo::relative_path(&checksum, "commit")
        )))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"tampered content".to_vec()))
        .mount(&server)
        .await;

    let client = fast_client(&server);
    let err = client
        .fetch(&checksum, ObjectKind::Commit)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Corruption { .. }));
}

#[tokio::test]
async fn missing_commit_is_a_missing_object() {
    let server = MockServer::start().await;
    let client = fast_client(&server);
    let walker = TreeWalker::new(&client);

    let err = walker
        .load_commit(&Checksum::digest(b"ghost"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::MissingObject {
            kind: ObjectKind::Commit,
            ..
        }
    ));
}

#[tokio::test]
async fn unreachable_summary_is_fatal() {
    let server = MockServer::start().await;
    let client = fast_client(&server);

    let err = client.fetch_summary().await.unwrap_err();
    assert!(matches!(err, RepoError::SummaryUnavailable(_)));
}
