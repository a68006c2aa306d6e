pub const DEFAULT_ENDPOINT: &str = "https://hub.snapshot.org/graphql";

/// Where and what to query. Passed in explicitly so that no ambient
/// global decides which voting space a claim set is built from.
#[derive(Debug, Clone)]
pub struct Config {
    /// GraphQL endpoint of the voting hub.
    pub endpoint: String,
    /// Voting space (namespace) proposals are fetched from.
    pub space: String,
    /// Only proposals created at or after this unix timestamp (seconds)
    /// are considered.
    pub created_gte: i64,
}

impl Config {
    pub fn new(space: impl Into<String>, created_gte: i64) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            space: space.into(),
            created_gte,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }
}
