//! Configuration for the remote document store.

/// Where the backing file lives and how to authenticate.
///
/// Credentials are a single static bearer token and account identifier;
/// there is no refresh or scoping.
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Account that owns the data repository.
    pub owner: String,
    /// Data repository name.
    pub repo: String,
    /// Path of the JSON file inside the repository.
    pub path: String,
    /// Branch the file lives on.
    pub branch: String,
    /// Static bearer token.
    pub token: String,
    /// Base URL of the contents API.
    pub api_base: String,
}

impl RemoteConfig {
    /// Creates a configuration with the default file path and branch.
    pub fn new(
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            path: "data/inventory.json".into(),
            branch: "main".into(),
            token: token.into(),
            api_base: "https://api.github.com".into(),
        }
    }

    /// Sets the file path inside the repository.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Sets the branch.
    #[must_use]
    pub fn with_branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = branch.into();
        self
    }

    /// Sets the API base URL (useful against a self-hosted instance).
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Full URL of the contents endpoint for the configured file.
    #[must_use]
    pub fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base, self.owner, self.repo, self.path
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = RemoteConfig::new("acme", "inventory-data", "t0k3n")
            .with_path("stock.json")
            .with_branch("master");

        assert_eq!(config.path, "stock.json");
        assert_eq!(config.branch, "master");
        assert_eq!(
            config.contents_url(),
            "https://api.github.com/repos/acme/inventory-data/contents/stock.json"
        );
    }

    #[test]
    fn defaults() {
        let config = RemoteConfig::new("acme", "inventory-data", "t0k3n");
        assert_eq!(config.path, "data/inventory.json");
        assert_eq!(config.branch, "main");
    }
}
