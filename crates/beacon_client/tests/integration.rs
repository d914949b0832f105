//! End-to-end sync cycles against a mock transport.

use beacon_client::{
    Client, ManifestVerifier, MockTransport, NoopVerifier, SyncError, SyncPhase, VerificationError,
};
use beacon_protocol::{sha256_hex, ConfigPath, ConfigResponse, RootMetadata, TargetsManifest};
use beacon_repository::{Repository, RepositoryError};
use beacon_testkit::ResponseFixture;
use std::sync::Arc;

const BLOCKED_IPS: &str = "datadog/603646/ASM_DATA/blocked_ips/config";
const EXCLUSIONS: &str = "datadog/603646/ASM/exclusion_filters/config";

const BLOCKED_IPS_CONTENT: &[u8] = br#"{"rules_data":[{"data":[{"value":"42.42.42.1"}]}]}"#;
const EXCLUSIONS_CONTENT: &[u8] = br#"{"exclusions":[{"conditions":[]}]}"#;

fn path(raw: &str) -> ConfigPath {
    ConfigPath::parse(raw).unwrap()
}

fn full_fixture(version: u64, state: &str) -> ResponseFixture {
    ResponseFixture::new(version)
        .with_opaque_backend_state(state)
        .with_config(EXCLUSIONS, EXCLUSIONS_CONTENT, 21)
        .with_config(BLOCKED_IPS, BLOCKED_IPS_CONTENT, 51)
}

fn client() -> (Client<Arc<MockTransport>, NoopVerifier>, Arc<MockTransport>, Arc<Repository>) {
    let transport = Arc::new(MockTransport::new());
    let repository = Arc::new(Repository::new());
    let client = Client::new(
        Arc::clone(&transport),
        NoopVerifier,
        Arc::clone(&repository),
    );
    (client, transport, repository)
}

#[test]
fn sync_stores_all_changes() {
    let (client, transport, repository) = client();
    transport.set_response(full_fixture(46_915_439, "cursor-a").response());

    assert_eq!(repository.version(), 0);
    assert!(repository.opaque_backend_state().is_none());
    assert!(repository.contents().is_empty());

    let outcome = client.sync().unwrap();

    assert_eq!(outcome.inserted.len(), 2);
    assert!(outcome.updated.is_empty());
    assert!(outcome.removed.is_empty());
    assert_eq!(outcome.version, 46_915_439);

    assert_eq!(repository.version(), 46_915_439);
    assert_eq!(repository.opaque_backend_state().unwrap().as_ref(), b"cursor-a");
    assert_eq!(repository.contents().len(), 2);
    assert_eq!(client.phase(), SyncPhase::Idle);

    let entry = repository.snapshot().get(&path(BLOCKED_IPS)).unwrap().clone();
    assert_eq!(entry.content().as_ref(), BLOCKED_IPS_CONTENT);
    assert_eq!(entry.sha256(), sha256_hex(BLOCKED_IPS_CONTENT));
    assert_eq!(entry.declared_version(), Some(51));
}

#[test]
fn resync_with_unchanged_manifest_is_noop() {
    let (client, transport, repository) = client();
    transport.set_response(full_fixture(10, "cursor-a").response());

    client.sync().unwrap();
    let before = repository.snapshot();

    let outcome = client.sync().unwrap();
    assert!(outcome.is_noop());
    assert_eq!(outcome.change_count(), 0);

    // Contents are byte-identical; the no-op sync still re-installed the
    // declared version and backend state.
    let after = repository.snapshot();
    assert_eq!(after.version(), 10);
    for (p, entry) in before.contents() {
        assert_eq!(after.get(p).unwrap().content(), entry.content());
    }
}

#[test]
fn fetch_echoes_repository_cursor() {
    let (client, transport, _repository) = client();
    transport.set_response(full_fixture(10, "cursor-a").response());

    client.sync().unwrap();
    client.sync().unwrap();

    let requests = transport.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].targets_version, 0);
    assert!(requests[0].opaque_backend_state.is_none());
    assert_eq!(requests[1].targets_version, 10);
    assert_eq!(
        requests[1].opaque_backend_state.as_ref().unwrap().as_ref(),
        b"cursor-a"
    );
}

#[test]
fn changed_content_stages_exactly_one_update() {
    let (client, transport, repository) = client();
    transport.set_response(full_fixture(10, "cursor-a").response());
    client.sync().unwrap();

    let new_blocked_ips = br#"{"rules_data":[{"data":["fresh"]}]}"#;
    let second = ResponseFixture::new(11)
        .with_opaque_backend_state("cursor-b")
        .with_config(EXCLUSIONS, EXCLUSIONS_CONTENT, 21)
        .with_config(BLOCKED_IPS, new_blocked_ips, 52)
        .response();
    transport.set_response(second);

    let outcome = client.sync().unwrap();
    assert!(outcome.inserted.is_empty());
    assert_eq!(outcome.updated, vec![path(BLOCKED_IPS)]);
    assert!(outcome.removed.is_empty());

    let snapshot = repository.snapshot();
    assert_eq!(snapshot.get(&path(BLOCKED_IPS)).unwrap().content().as_ref(), new_blocked_ips);
    assert_eq!(snapshot.get(&path(EXCLUSIONS)).unwrap().content().as_ref(), EXCLUSIONS_CONTENT);
    assert_eq!(repository.opaque_backend_state().unwrap().as_ref(), b"cursor-b");
}

#[test]
fn diff_shape_for_changed_active_set() {
    // Prior state {A, B}; new active set {B, C} with B unchanged: exactly
    // one insert and one remove, zero updates.
    let path_a = "datadog/2/ASM/alpha/config";
    let path_b = "datadog/2/ASM/bravo/config";
    let path_c = "datadog/2/ASM/charlie/config";

    let (client, transport, repository) = client();
    transport.set_response(
        ResponseFixture::new(1)
            .with_opaque_backend_state("s1")
            .with_config(path_a, b"alpha", 1)
            .with_config(path_b, b"bravo", 1)
            .response(),
    );
    client.sync().unwrap();

    transport.set_response(
        ResponseFixture::new(2)
            .with_opaque_backend_state("s2")
            .with_config(path_b, b"bravo", 1)
            .with_config(path_c, b"charlie", 1)
            .response(),
    );
    let outcome = client.sync().unwrap();

    assert_eq!(outcome.inserted, vec![path(path_c)]);
    assert!(outcome.updated.is_empty());
    assert_eq!(outcome.removed, vec![path(path_a)]);

    let snapshot = repository.snapshot();
    assert!(!snapshot.contains(&path(path_a)));
    assert!(snapshot.contains(&path(path_b)));
    assert!(snapshot.contains(&path(path_c)));
}

#[test]
fn version_is_monotonic_across_syncs() {
    let (client, transport, repository) = client();

    let mut observed = Vec::new();
    for version in [5u64, 5, 9, 12] {
        transport.set_response(full_fixture(version, "s").response());
        client.sync().unwrap();
        observed.push(repository.version());
    }

    assert_eq!(observed, vec![5, 5, 9, 12]);
    assert!(observed.windows(2).all(|w| w[0] <= w[1]));
}

#[test]
fn version_regression_fails_the_cycle() {
    let (client, transport, repository) = client();
    transport.set_response(full_fixture(10, "s").response());
    client.sync().unwrap();

    transport.set_response(full_fixture(4, "s").response());
    let err = client.sync().unwrap_err();
    assert!(matches!(
        err,
        SyncError::Repository(RepositoryError::VersionRegression { current: 10, proposed: 4 })
    ));
    assert_eq!(repository.version(), 10);
}

#[test]
fn non_success_status_fails_without_mutation() {
    let (client, transport, repository) = client();
    transport.set_response(full_fixture(10, "s").response());
    client.sync().unwrap();
    let before = repository.snapshot();

    transport.set_response(ConfigResponse::error(401));
    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::Status { status: 401 }));
    assert_eq!(client.phase(), SyncPhase::Failed);

    let after = repository.snapshot();
    assert_eq!(after.version(), before.version());
    assert_eq!(after.len(), before.len());
}

#[test]
fn missing_content_fails_naming_the_path() {
    let (client, transport, repository) = client();
    transport.set_response(
        full_fixture(10, "s")
            .without_target_file(BLOCKED_IPS)
            .response(),
    );

    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::MissingContent { .. }));
    assert_eq!(
        err.to_string(),
        format!("no valid content for target at path '{BLOCKED_IPS}'")
    );
    assert_eq!(repository.version(), 0);
    assert!(repository.contents().is_empty());
}

#[test]
fn missing_target_fails_naming_the_path() {
    let (client, transport, repository) = client();
    transport.set_response(full_fixture(10, "s").without_target(BLOCKED_IPS).response());

    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::MissingTarget { .. }));
    assert_eq!(err.to_string(), format!("no target for path '{BLOCKED_IPS}'"));
    assert!(repository.contents().is_empty());
}

#[test]
fn corrupted_delivery_counts_as_missing_content() {
    // A target file whose bytes do not match the declared digest is treated
    // as never delivered, which the active-set check then rejects.
    let fixture = full_fixture(10, "s");
    let mut payload = fixture.payload();
    payload.target_files[1].raw = base64_of(b"tampered bytes");
    let (client, transport, repository) = client();
    transport.set_response(ConfigResponse::ok(payload));

    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::MissingContent { .. }));
    assert!(repository.contents().is_empty());
}

#[test]
fn invalid_path_in_active_set_is_a_parse_error() {
    let (client, transport, _repository) = client();
    transport.set_response(
        full_fixture(10, "s")
            .with_active_path("invalid path")
            .response(),
    );

    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::Path(_)));
}

#[test]
fn invalid_path_in_targets_manifest_is_a_parse_error() {
    // Distinct from SyncError: callers can branch on path-level failures.
    let (client, transport, _repository) = client();
    transport.set_response(
        ResponseFixture::new(10)
            .with_config("not a valid path", b"content", 1)
            .response(),
    );

    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::Path(_)));
    assert!(!matches!(err, SyncError::Decode(_)));
}

#[test]
fn rejected_verification_fails_closed() {
    struct RejectVerifier;
    impl ManifestVerifier for RejectVerifier {
        fn verify(
            &self,
            _roots: &[RootMetadata],
            _targets: &TargetsManifest,
        ) -> Result<(), VerificationError> {
            Err(VerificationError::new("untrusted root"))
        }
    }

    let transport = Arc::new(MockTransport::new());
    let repository = Arc::new(Repository::new());
    let client = Client::new(
        Arc::clone(&transport),
        RejectVerifier,
        Arc::clone(&repository),
    );
    transport.set_response(full_fixture(10, "s").response());

    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::Verification(_)));
    assert_eq!(repository.version(), 0);
    assert!(repository.contents().is_empty());
}

#[test]
fn transport_failure_surfaces_as_transport_error() {
    let (client, _transport, repository) = client();
    // No response configured: the mock reports a transport failure.
    let err = client.sync().unwrap_err();
    assert!(matches!(err, SyncError::Transport(_)));
    assert_eq!(repository.version(), 0);
}

fn base64_of(bytes: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine as _;
    STANDARD.encode(bytes)
}
