//! The `SecretStore` persists the retail [`SessionToken`] in each platform's
//! standard secrets keychain.
//!
//! Uses [`hwchen/keychain-rs`](https://github.com/hwchen/keyring-rs) for all
//! platforms except Android.
//!
//! * **Linux:** uses the desktop secret-service via dbus. If you're on
//!   Ubuntu/Pop!_OS/some Gnome distro, then you can inspect the stored token
//!   with `seahorse`.
//! * **macOS+iOS:** uses Keychain.app
//! * **Windows:** uses wincreds
//! * **Android:** stores it in a file in the app data directory (accessing the
//!   JVM-only [`Android Keystore`](https://developer.android.com/training/articles/keystore)
//!   is a huge pain). Fortunately, this isn't too awful, since app data is
//!   sandboxed and inaccessible to other apps.
//!
//! [`SessionToken`]: cuisineberg_api::auth::SessionToken

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
    thread,
};

use anyhow::Context;
use cfg_if::cfg_if;
use cuisineberg_api::{auth::SessionToken, env::DeployEnv};
use keyring::credential::{CredentialApi, CredentialBuilderApi};

/// Persists the retail session token in each platform's standard secrets
/// keychain. See module-level docs for platform-specific details.
pub struct SecretStore {
    token_cred: Box<dyn CredentialApi + Send + Sync>,
}

impl SecretStore {
    #[cfg_attr(target_os = "android", allow(dead_code))]
    fn service_name(deploy_env: DeployEnv) -> String {
        format!("in.hirearrive.cuisineberg.{deploy_env}")
    }

    /// Create a new `SecretStore`.
    ///
    /// For all platforms except Android, this will use the user's OS-provided
    /// keychain. Android will just store the token in the deploy env app data
    /// directory. See module comments for more details.
    pub fn new(
        use_mock_secret_store: bool,
        deploy_env: DeployEnv,
        env_data_dir: &Path,
    ) -> Self {
        if use_mock_secret_store {
            // Some tests rely on a persistent (tempdir) mock secret store
            return Self::file(env_data_dir);
        }

        cfg_if! {
            if #[cfg(target_os = "android")] {
                let _ = deploy_env;
                Self::file(env_data_dir)
            } else {
                Self::keychain(deploy_env)
            }
        }
    }

    /// A secret store that uses the system keychain.
    #[cfg(not(target_os = "android"))]
    fn keychain(deploy_env: DeployEnv) -> Self {
        let service = Self::service_name(deploy_env);

        Self::keychain_inner(&service)
    }

    #[cfg(not(target_os = "android"))]
    fn keychain_inner(service: &str) -> Self {
        let target = None;
        let user = "retailtoken";

        cfg_if! {
            if #[cfg(target_os = "ios")] {
                use keyring::ios::IosCredential;
                let cred =
                    IosCredential::new_with_target(target, service, user);
                Self { token_cred: Box::new(cred.unwrap()) }
            } else if #[cfg(target_os = "macos")] {
                use keyring::macos::MacCredential;
                let cred =
                    MacCredential::new_with_target(target, service, user);
                Self { token_cred: Box::new(cred.unwrap()) }
            } else if #[cfg(target_os = "linux")] {
                use keyring::secret_service::SsCredential;
                let cred =
                    SsCredential::new_with_target(target, service, user);
                let cred = ThreadKeyringCredential(Box::new(cred.unwrap()));
                Self { token_cred: Box::new(cred) }
            } else {
                compile_error!("Configure a keychain backend for this OS")
            }
        }
    }

    /// A secret store that just dumps the token into the deploy env app data
    /// directory. Currently only used on Android.
    fn file(env_data_dir: &Path) -> Self {
        Self {
            token_cred: Box::new(FileCredential::new(
                env_data_dir.join("retailtoken"),
            )),
        }
    }

    /// Create a mock SecretStore. Tokens written to this mock store live only
    /// in memory.
    #[cfg_attr(not(test), allow(dead_code))]
    pub(crate) fn mock() -> Self {
        Self {
            token_cred: keyring::mock::MockCredentialBuilder {}
                .build(None, "mock", "retailtoken")
                .unwrap(),
        }
    }

    /// Read the stored session token, if one exists. A missing token is not
    /// an error; it just means the user has to sign in.
    pub fn read_token(&self) -> anyhow::Result<Option<SessionToken>> {
        let res = self.token_cred.get_password();
        match res {
            Ok(s) => Ok(Some(SessionToken::new(s))),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(err) => Err(anyhow::Error::new(err)
                .context("Failed to read session token from keyring")),
        }
    }

    /// Write the session token to the secret store.
    pub fn write_token(&self, token: &SessionToken) -> anyhow::Result<()> {
        self.token_cred
            .set_password(token.expose())
            .context("Failed to write session token into keyring")
    }

    /// Delete the stored session token. Deleting an already-absent token is
    /// fine, so signing out twice (or clearing after a rejected request and
    /// then signing out) always succeeds.
    pub fn delete_token(&self) -> anyhow::Result<()> {
        match self.token_cred.delete_password() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(err) => Err(anyhow::Error::new(err)
                .context("Failed to delete session token from keyring")),
        }
    }
}

/// A small shim that dumps a credential (here, the session token) into a
/// file.
struct FileCredential {
    path: PathBuf,
}

impl FileCredential {
    fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn io_err_to_keyring_err(err: io::Error) -> keyring::Error {
    match err.kind() {
        io::ErrorKind::NotFound => keyring::Error::NoEntry,
        io::ErrorKind::PermissionDenied =>
            keyring::Error::NoStorageAccess(err.into()),
        _ => keyring::Error::PlatformFailure(err.into()),
    }
}

impl CredentialApi for FileCredential {
    fn set_password(&self, password: &str) -> keyring::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err_to_keyring_err)?;
        }

        let mut opts = std::fs::OpenOptions::new();
        opts.write(true).create(true).truncate(true);

        // Set the file permissions to rw------- (owner r/w only)
        #[cfg(unix)]
        opts.mode(0o600);

        opts.open(self.path.as_path())
            .and_then(|mut file| file.write_all(password.as_bytes()))
            .map_err(io_err_to_keyring_err)
    }

    fn get_password(&self) -> keyring::Result<String> {
        let bytes = std::fs::read(&self.path).map_err(io_err_to_keyring_err)?;
        String::from_utf8(bytes)
            .map_err(|err| keyring::Error::BadEncoding(err.into_bytes()))
    }

    fn delete_password(&self) -> keyring::Result<()> {
        std::fs::remove_file(&self.path).map_err(io_err_to_keyring_err)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

/// A small shim around a [`keyring::Credential`] that does each operation
/// inside a newly spawned thread.
///
/// This exists just to support Linux, whose `keyring::secret_store` impl uses
/// a tokio `block_on` somewhere inside. Since we normally call the
/// `SecretStore` from async code, this will panic without this. Running all
/// keyring ops from inside their own temporary thread solves the issue.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
struct ThreadKeyringCredential(Box<dyn CredentialApi + Send + Sync>);

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
impl ThreadKeyringCredential {
    fn thread_op<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
        F: Send,
        R: Send,
    {
        thread::scope(|s| s.spawn(f).join().expect("Thread panicked"))
    }
}

#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
impl CredentialApi for ThreadKeyringCredential {
    fn set_password(&self, password: &str) -> keyring::Result<()> {
        Self::thread_op(|| self.0.set_password(password))
    }

    fn get_password(&self) -> keyring::Result<String> {
        Self::thread_op(|| self.0.get_password())
    }

    fn delete_password(&self) -> keyring::Result<()> {
        Self::thread_op(|| self.0.delete_password())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn test_secret_store(secret_store: &SecretStore) {
        assert!(secret_store.read_token().unwrap().is_none());

        let token = SessionToken::new("eyJhbGciOiJIUzI1NiJ9.test".to_owned());
        secret_store.write_token(&token).unwrap();

        let token2 = secret_store.read_token().unwrap().unwrap();
        assert_eq!(token.expose(), token2.expose());

        secret_store.delete_token().unwrap();
        assert!(secret_store.read_token().unwrap().is_none());

        // deleting an already-deleted token is ok
        secret_store.delete_token().unwrap();
    }

    // ignore android: android only supports file_store
    // ignore linux: keyring_store only works with GUI and not headless,
    // e.g. our dev server
    #[cfg(not(any(target_os = "android", target_os = "linux")))]
    #[test]
    fn test_keyring_store() {
        // SKIP this test in CI, since the CI instance is headless and/or
        // doesn't give us access to the OS keychain.
        if std::env::var_os("CI").is_some() {
            return;
        }

        test_keyring_secret_store_inner();
    }

    // `cargo test -p app-rs -- test_keyring_store_linux --ignored`
    //
    // NOTE: don't remove this async. The linux keyring-rs backend does a
    // `block_on` "under-the-hood" and running this test in an async block
    // ensures we can call it like we normally do (that is, inside an outer
    // `block_on`).
    #[cfg(not(target_os = "android"))]
    #[tokio::test]
    #[ignore]
    async fn test_keyring_store_linux() {
        test_keyring_secret_store_inner();
    }

    #[cfg(not(target_os = "android"))]
    fn test_keyring_secret_store_inner() {
        use std::time::{SystemTime, UNIX_EPOCH};

        // use a dummy service name to be absolutely sure we don't clobber any
        // existing keyring entry.
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .subsec_nanos();
        let dummy_service = format!("cuisineberg.dummy.{nanos:08x}");
        let secret_store = SecretStore::keychain_inner(&dummy_service);
        test_secret_store(&secret_store);
    }

    #[test]
    fn test_file_store() {
        let tempdir = tempfile::tempdir().unwrap();

        let secret_store = SecretStore::file(tempdir.path());
        test_secret_store(&secret_store);
    }

    #[test]
    fn test_mock_store() {
        test_secret_store(&SecretStore::mock());
    }
}
