//! Repository authentication.
//!
//! Credentials come from the manifest's `[repositories]` table or from
//! `[credentials.<repository>]` in the global configuration:
//!
//! ```toml
//! [repositories]
//! internal = { url = "https://nexus.example.com/maven", username = "deploy", password = "secret" }
//! ```

use reqwest::RequestBuilder;

use crate::layout::RepositorySpec;

/// Apply credentials to a request: a token wins, then basic auth.
pub fn apply_auth(request: RequestBuilder, repo: &RepositorySpec) -> RequestBuilder {
    if let Some(token) = &repo.token {
        return request.bearer_auth(token);
    }
    match (&repo.username, &repo.password) {
        (Some(user), password) => request.basic_auth(user, password.as_deref()),
        (None, Some(token)) => request.bearer_auth(token),
        (None, None) => request,
    }
}
