//! Remote branch deletion over ssh-agent authenticated connections

use git2::{Cred, CredentialType, PushOptions, RemoteCallbacks};

use super::access::{RemoteDeletion, RemoteTarget};
use super::repo::GitRepo;
use crate::{Error, Result};

/// Callbacks that authenticate through the running ssh-agent
///
/// libgit2 keeps invoking the credential callback while authentication
/// fails, so only one agent attempt is made per connection.
pub fn ssh_agent_callbacks<'a>(user: &'a str) -> RemoteCallbacks<'a> {
    let mut attempted = false;
    let mut callbacks = RemoteCallbacks::new();

    callbacks.credentials(move |_url, username_from_url, allowed| {
        let username = username_from_url.unwrap_or(user);

        if allowed.contains(CredentialType::USERNAME) {
            return Cred::username(username);
        }
        if !allowed.contains(CredentialType::SSH_KEY) {
            return Err(git2::Error::from_str(
                "remote does not accept ssh key authentication",
            ));
        }
        if attempted {
            return Err(git2::Error::from_str(
                "failed to get public key from ssh-agent",
            ));
        }
        attempted = true;

        Cred::ssh_key_from_agent(username)
    });

    callbacks
}

impl GitRepo {
    /// Delete `refs/heads/<branch>` on the named remote
    ///
    /// The remote's current value for the ref is checked during push
    /// negotiation; a branch the remote does not have counts as already
    /// deleted and nothing is sent.
    pub fn push_branch_deletion(
        &self,
        target: &RemoteTarget,
        branch: &str,
    ) -> Result<RemoteDeletion> {
        let refname = format!("refs/heads/{}", branch);

        let mut remote = self.inner().find_remote(&target.name).map_err(|e| {
            Error::Other(format!("Remote '{}' not found: {}", target.name, e))
        })?;

        let mut absent = false;
        let mut rejection: Option<String> = None;
        let pushed = {
            let mut callbacks = ssh_agent_callbacks(&target.ssh_user);
            callbacks.push_negotiation(|updates| {
                if updates.iter().all(|update| update.src().is_zero()) {
                    absent = true;
                    return Err(git2::Error::from_str("remote branch already absent"));
                }
                Ok(())
            });
            callbacks.push_update_reference(|name, status| {
                if let Some(message) = status {
                    rejection = Some(format!("{} rejected: {}", name, message));
                }
                Ok(())
            });

            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);

            remote.push(&[format!(":{}", refname)], Some(&mut options))
        };

        if absent {
            tracing::debug!(
                remote = %target.name,
                branch,
                "Remote branch already absent"
            );
            return Ok(RemoteDeletion::AlreadyAbsent);
        }
        pushed?;

        match rejection {
            Some(message) => Err(Error::Other(message)),
            None => Ok(RemoteDeletion::Deleted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::BranchStore;
    use crate::test_support::TestRepo;

    #[test]
    fn test_missing_remote_is_an_error() {
        let fixture = TestRepo::new("repo");
        fixture.branch_with_commit("gone", 1);

        let repo = GitRepo::open(fixture.path()).unwrap();
        let result = repo.delete_remote_branch(&RemoteTarget::new("nowhere"), "gone");

        let err = result.unwrap_err();
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_deletes_branch_on_local_remote() {
        let fixture = TestRepo::new("repo");
        fixture.branch_with_commit("shipped", 50);
        let origin = fixture.add_bare_remote("origin");
        fixture.push_to_remote("origin", "shipped");
        assert!(origin.find_reference("refs/heads/shipped").is_ok());

        let repo = GitRepo::open(fixture.path()).unwrap();
        let outcome = repo
            .delete_remote_branch(&RemoteTarget::new("origin"), "shipped")
            .unwrap();

        assert_eq!(outcome, RemoteDeletion::Deleted);
        assert!(origin.find_reference("refs/heads/shipped").is_err());
    }

    #[test]
    fn test_branch_absent_on_empty_remote_is_success() {
        let fixture = TestRepo::new("repo");
        fixture.branch_with_commit("local-only", 50);
        fixture.add_bare_remote("origin");

        let repo = GitRepo::open(fixture.path()).unwrap();
        let outcome = repo
            .delete_remote_branch(&RemoteTarget::new("origin"), "local-only")
            .unwrap();

        assert_eq!(outcome, RemoteDeletion::AlreadyAbsent);
    }

    #[test]
    fn test_branch_absent_on_populated_remote_is_success() {
        let fixture = TestRepo::new("repo");
        fixture.branch_with_commit("local-only", 50);
        let origin = fixture.add_bare_remote("origin");
        fixture.push_to_remote("origin", "main");

        let repo = GitRepo::open(fixture.path()).unwrap();
        let outcome = repo
            .delete_remote_branch(&RemoteTarget::new("origin"), "local-only")
            .unwrap();

        assert_eq!(outcome, RemoteDeletion::AlreadyAbsent);
        assert!(origin.find_reference("refs/heads/main").is_ok());
    }
}
