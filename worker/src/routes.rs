use minesweeper_protocol::API_PREFIX;
use worker::Method;

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const ALLOW_ORIGIN: (&str, &str) = ("Access-Control-Allow-Origin", "*");
pub const PREFLIGHT_HEADERS: [(&str, &str); 3] = [
    ALLOW_ORIGIN,
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type"),
];

/// Tier key of a leaderboard path, unvalidated. `None` for paths the service does not serve.
pub fn leaderboard_tier(path: &str) -> Option<&str> {
    let rest = path.strip_prefix(API_PREFIX)?;
    // last segment, as with `/api/leaderboard/expert`
    rest.rsplit('/').next()
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    List,
    Submit,
    Preflight,
    NotAllowed,
}

impl From<Method> for Action {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::List,
            Method::Post => Self::Submit,
            Method::Options => Self::Preflight,
            _ => Self::NotAllowed,
        }
    }
}
