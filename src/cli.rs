use clap::Parser;
use std::path::PathBuf;

pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:3001";

#[derive(Parser, Clone)]
#[command(version = env!("CARGO_PKG_VERSION"), about, long_about = None)]
pub struct Cli {
    #[arg(short, long, value_name = "FILE", env = "GITLAB_MCP_CONFIG_FILE")]
    pub config_file: Option<PathBuf>,

    #[arg(
        long = "transport",
        value_name = "TRANSPORT",
        env = "GITLAB_MCP_TRANSPORT",
        default_value = "stdio",
        value_parser = ["stdio", "sse", "streamable-http"]
    )]
    pub transport: String,

    #[arg(
        long = "bind-address",
        value_name = "ADDRESS",
        env = "GITLAB_MCP_BIND_ADDRESS",
        default_value = DEFAULT_BIND_ADDRESS
    )]
    pub bind_address: String,

    #[arg(
        long = "gitlab-url",
        value_name = "URL",
        help = "Base URL of the GitLab instance. Will override the value in your config file if set.",
        env = "GITLAB_URL"
    )]
    pub gitlab_url: Option<String>,

    #[arg(
        long = "gitlab-token",
        value_name = "TOKEN",
        help = "Personal, project or group access token. Will override the value in your config file if set.",
        env = "GITLAB_TOKEN",
        hide_env_values = true
    )]
    pub gitlab_token: Option<String>,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config_file: None,
            transport: "stdio".to_string(),
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            gitlab_url: None,
            gitlab_token: None,
        }
    }
}
