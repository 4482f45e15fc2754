//! Environment overrides for the bootstrap credential.
//!
//! Kept in its own test binary: the variables are process-wide and would
//! leak into the seeding assertions in `login_flow.rs`.

use safe_mobile::bootstrap::SeedOutcome;
use safe_mobile::config::schema::{ADMIN_EMAIL_ENV, ADMIN_PASSWORD_ENV};
use safe_mobile::config::Config;
use safe_mobile::session::{Destination, SessionRouter};
use tempfile::TempDir;

#[test]
fn env_credential_replaces_configured_admin() {
    let tmp = TempDir::new().unwrap();
    let config = Config::from_toml(&format!(
        "data_dir = {:?}\n[bootstrap]\nadmin_email = \"config@safe.test\"\nadmin_password = \"config-pass\"\n[hashing]\niterations = 1000\n",
        tmp.path().display().to_string()
    ))
    .unwrap();

    std::env::set_var(ADMIN_EMAIL_ENV, "env@safe.test");
    std::env::set_var(ADMIN_PASSWORD_ENV, "env-pass");
    let started = safe_mobile::start(&config);
    std::env::remove_var(ADMIN_EMAIL_ENV);
    std::env::remove_var(ADMIN_PASSWORD_ENV);

    let (store, seeded) = started.unwrap();
    let SeedOutcome::Seeded {
        email,
        generated_password,
        ..
    } = seeded
    else {
        panic!("expected a seed");
    };
    assert_eq!(email, "env@safe.test");
    assert!(generated_password.is_none());

    let router = SessionRouter::new(&store);
    assert_eq!(
        router.login("env@safe.test", "env-pass").unwrap().destination(),
        Some(Destination::Admin)
    );
    assert!(router.login("config@safe.test", "config-pass").unwrap().destination().is_none());
    assert_eq!(store.user_count().unwrap(), 1);
}
