//! Remote transport helpers

use git2::{Cred, CredentialType, Direction, Remote, RemoteCallbacks};

use crate::{Error, Result};

/// libgit2 re-invokes the credential callback after each rejected attempt.
const MAX_CREDENTIAL_ATTEMPTS: u32 = 3;

/// Remote callbacks that try ssh-agent, then the configured credential
/// helper, then libgit2's default credentials.
pub(crate) fn callbacks<'a>() -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;

    callbacks.credentials(move |url, username, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str("no credential source was accepted"));
        }

        let user = username.unwrap_or("git");
        if allowed.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(user);
        }
        if allowed.contains(CredentialType::USER_PASS_PLAINTEXT) {
            let config = git2::Config::open_default()?;
            return Cred::credential_helper(&config, url, username);
        }
        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(user);
        }
        Cred::default()
    });

    callbacks
}

/// Connect to `url` and list its references (`git ls-remote`).
///
/// Returns the number of advertised references. Any failure to reach or
/// read the remote is reported as [`Error::Unreachable`].
pub fn list_remote(url: &str) -> Result<usize> {
    let unreachable = |e: git2::Error| Error::Unreachable {
        url: url.to_string(),
        message: e.message().to_string(),
    };

    let mut remote = Remote::create_detached(url).map_err(unreachable)?;
    let connection = remote
        .connect_auth(Direction::Fetch, Some(callbacks()), None)
        .map_err(unreachable)?;
    let heads = connection.list().map_err(unreachable)?.len();

    tracing::debug!(url, heads, "Listed remote references");
    Ok(heads)
}
