use std::env;

/// Default browser identity presented to upstream servers.
///
/// Upstreams frequently reject requests with missing or non-browser
/// User-Agent/Referer headers; the proxy presents a plain Chrome-on-Windows
/// identity unless the deployment overrides it.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
const DEFAULT_ACCEPT: &str = "*/*";
const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";
const DEFAULT_ORIGIN: &str = "https://www.google.com";
const DEFAULT_REFERER: &str = "https://www.google.com/";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    pub port: u16,
    pub is_dev: bool,
    /// Prefix prepended to rewritten proxy URLs (e.g. "/api" when the proxy
    /// is mounted behind a path-prefixing load balancer). Empty by default,
    /// producing rewritten references like `/hls?url=...`.
    pub public_base_path: String,
    /// Spoofed browser identity sent on every upstream request
    pub user_agent: String,
    pub accept: String,
    pub accept_language: String,
    pub origin_header: String,
    pub referer: String,
    /// Permit upstream URLs pointing at private/reserved addresses.
    /// Defaults to the DEV_MODE value; production deployments keep this off
    /// so user-supplied `url` parameters cannot reach internal services.
    pub allow_private_upstreams: bool,
}

impl Config {
    /// Load configuration from environment variables
    /// In DEV mode, provides sensible defaults. In PROD mode, PORT is required.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let is_dev = env::var("DEV_MODE")
            .unwrap_or_else(|_| "false".to_string())
            .parse()
            .unwrap_or(false);

        // Port: required in prod, defaults to 3000 in dev
        let port = if is_dev {
            env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?
        } else {
            env::var("PORT")
                .map_err(|_| "PORT is required in production")?
                .parse()?
        };

        let public_base_path = env::var("PUBLIC_BASE_PATH").unwrap_or_default();

        let user_agent =
            env::var("UPSTREAM_USER_AGENT").unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string());
        let accept = env::var("UPSTREAM_ACCEPT").unwrap_or_else(|_| DEFAULT_ACCEPT.to_string());
        let accept_language = env::var("UPSTREAM_ACCEPT_LANGUAGE")
            .unwrap_or_else(|_| DEFAULT_ACCEPT_LANGUAGE.to_string());
        let origin_header =
            env::var("UPSTREAM_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_string());
        let referer = env::var("UPSTREAM_REFERER").unwrap_or_else(|_| DEFAULT_REFERER.to_string());

        let allow_private_upstreams = env::var("ALLOW_PRIVATE_UPSTREAMS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(is_dev);

        Ok(Config {
            port,
            is_dev,
            public_base_path,
            user_agent,
            accept,
            accept_language,
            origin_header,
            referer,
            allow_private_upstreams,
        })
    }
}
