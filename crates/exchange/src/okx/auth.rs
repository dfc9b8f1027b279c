use clap::Parser;

/// OKX API credentials and connection settings.
#[derive(Parser, Clone)]
pub struct OkxAuthEnv {
    #[clap(long, env = "OKX_API_KEY")]
    pub api_key: String,

    #[clap(long, env = "OKX_SECRET_KEY")]
    pub secret_key: String,

    #[clap(long, env = "OKX_PASSPHRASE")]
    pub passphrase: String,

    /// Regional host; `https://www.okx.com` for global accounts
    #[clap(long, env = "OKX_BASE_URL", default_value = "https://my.okx.com")]
    pub base_url: String,

    /// Route orders to the OKX demo-trading environment
    #[clap(long, env = "OKX_SIMULATED_TRADING", default_value = "false")]
    pub simulated_trading: bool,

    /// Transport timeout applied to every HTTP call
    #[clap(long, env = "OKX_REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for OkxAuthEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OkxAuthEnv")
            .field("api_key", &"[REDACTED]")
            .field("secret_key", &"[REDACTED]")
            .field("passphrase", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("simulated_trading", &self.simulated_trading)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}
