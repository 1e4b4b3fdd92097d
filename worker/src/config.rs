use minesweeper_protocol::SubmitPolicy;

/// Per-request settings read from the Worker environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Name of the KV namespace binding holding the lists.
    pub kv_binding: String,
    pub policy: SubmitPolicy,
}

impl ServiceConfig {
    pub const DEFAULT_KV_BINDING: &'static str = "LEADERBOARD";
    pub const KV_BINDING_VAR: &'static str = "LEADERBOARD_KV";
    pub const POLICY_VAR: &'static str = "LEADERBOARD_POLICY";

    pub fn from_env(env: &worker::Env) -> Self {
        Self::from_lookup(|name| env.var(name).ok().map(|value| value.to_string()))
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let kv_binding = lookup(Self::KV_BINDING_VAR)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| Self::DEFAULT_KV_BINDING.to_string());

        let policy = match lookup(Self::POLICY_VAR) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!("Unknown {} {:?}, using {}", Self::POLICY_VAR, raw, SubmitPolicy::default());
                SubmitPolicy::default()
            }),
            None => SubmitPolicy::default(),
        };

        Self { kv_binding, policy }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
