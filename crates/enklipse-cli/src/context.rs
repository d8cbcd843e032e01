//! Shared command context built from global flags and the environment.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;

use enklipse_client::{ClientConfig, ClipApiClient, Identity, StaticCredentials};

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Clip API base URL
    #[arg(long, env = "ENKLIPSE_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Bearer token for authenticated calls
    #[arg(long, env = "ENKLIPSE_API_TOKEN", global = true, hide_env_values = true)]
    pub token: Option<String>,

    /// Viewer identity sealed into status stream URLs
    #[arg(long = "user", env = "ENKLIPSE_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Shared key used to seal the viewer identity
    #[arg(long, env = "ENKLIPSE_AUTH_SECRET_KEY", global = true, hide_env_values = true)]
    pub secret: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

pub struct AppContext {
    pub client: Arc<ClipApiClient>,
    pub identity: Identity,
}

impl AppContext {
    pub fn from_args(args: &GlobalArgs) -> Result<Self> {
        let mut config = ClientConfig::from_env();
        if let Some(url) = &args.api_url {
            config = config.with_base_url(url);
        }
        if let Some(token) = args.token.as_deref().filter(|t| !t.is_empty()) {
            config = config.with_api_token(token);
        }
        if let Some(secret) = args.secret.as_deref().filter(|s| !s.is_empty()) {
            config = config.with_auth_secret(secret);
        }

        let credentials = Arc::new(StaticCredentials::new(config.api_token.clone()));
        let client = ClipApiClient::new(config, credentials).context("Failed to create API client")?;

        Ok(Self {
            client: Arc::new(client),
            identity: Identity::from_option(args.user_id.clone()),
        })
    }
}
