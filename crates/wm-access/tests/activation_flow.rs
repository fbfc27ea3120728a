use tempfile::TempDir;
use wm_access::{GuardOutcome, LicenseRegistry, RouteGuard, Session, SessionState};
use wm_model::keys;
use wm_store::{FsBackend, StoreAdapter};

fn open_session(dir: &TempDir) -> Session {
    let backend = FsBackend::open(dir.path()).expect("open store");
    Session::new(StoreAdapter::from_backend(backend), LicenseRegistry::builtin())
}

#[test]
fn activate_onboard_then_lose_license_on_reload() {
    let dir = TempDir::new().expect("tmp");
    let session = open_session(&dir);
    assert_eq!(session.state(), SessionState::NeedsActivation);

    let state = session.activate("WHP-TEST-KEY-12345").expect("activate");
    assert_eq!(state, SessionState::NeedsOnboarding);

    let state = session.onboard("Ana").expect("onboard");
    assert_eq!(state, SessionState::Authorized);

    let store = session.store();
    assert_eq!(
        store.read_opt::<String>(keys::LICENSE_KEY).as_deref(),
        Some("WHP-TEST-KEY-12345")
    );
    assert_eq!(store.read_opt::<String>(keys::USERNAME).as_deref(), Some("Ana"));

    // A fresh process over the same directory sees the same session.
    let reloaded = open_session(&dir);
    assert_eq!(reloaded.state(), SessionState::Authorized);

    // Clearing only the license sends the next load back to activation.
    reloaded.store().remove(keys::LICENSE_KEY);
    let reloaded = open_session(&dir);
    assert_eq!(reloaded.state(), SessionState::NeedsActivation);
    assert_eq!(
        reloaded.store().read_opt::<String>(keys::USERNAME).as_deref(),
        Some("Ana")
    );
}

#[test]
fn guard_follows_manual_storage_edits() {
    let dir = TempDir::new().expect("tmp");
    let session = open_session(&dir);
    session.activate("WHP-TEST-KEY-12345").expect("activate");
    session.onboard("Ana").expect("onboard");

    let guard = RouteGuard::mount(session.clone());
    assert!(guard.evaluate(|| ()).is_render());

    // Hand-edit the document on disk, as a user poking at storage would.
    let path = dir.path().join(".wealthmap/store/license_key.json");
    std::fs::write(&path, "\"WHP-REVOKED\"").expect("edit");
    assert_eq!(guard.evaluate(|| ()), GuardOutcome::Redirect { to: "/" });
}

#[test]
fn proxy_and_client_share_one_allowlist_file() {
    let dir = TempDir::new().expect("tmp");
    let path = dir.path().join("licenses.txt");
    std::fs::write(&path, "WHP-CUSTOM-0001\n").expect("write");
    let registry = LicenseRegistry::from_file(&path).expect("load");

    let session = Session::new(
        StoreAdapter::from_backend(FsBackend::open(dir.path()).expect("open")),
        registry.clone(),
    );
    assert!(session.activate("WHP-TEST-KEY-12345").is_err());
    assert_eq!(
        session.activate("WHP-CUSTOM-0001"),
        Ok(SessionState::NeedsOnboarding)
    );
    assert!(registry.is_valid("WHP-CUSTOM-0001"));
}
