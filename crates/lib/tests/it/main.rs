/*! Integration tests for identidoc.
 *
 * This test suite is organized as a single integration test binary
 * following the pattern described by matklad in
 * https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html
 *
 * The module structure mirrors the main library structure:
 * - account: account lifecycle (create/find/update/delete)
 * - logins: external-login association and the two-phase commit contract
 * - claims: claim association
 * - credentials: password hash, security stamp, two-factor flag
 * - email: email index, confirmation records, and the preserved index gaps
 */

use tracing_subscriber::EnvFilter;

#[ctor::ctor]
fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("identidoc=info".parse().unwrap()),
        )
        .with_test_writer()
        .try_init();
}

mod account;
mod claims;
mod email;
