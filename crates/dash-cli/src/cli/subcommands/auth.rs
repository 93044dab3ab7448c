use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in with email and password.
    Login(AuthLoginArgs),
    /// Revoke the session and clear stored credentials.
    Logout,
    /// Show current auth status.
    Status,
    /// Force a token refresh.
    Refresh,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    #[arg(long)]
    pub email: String,
    #[arg(long, env = "DASH_PASSWORD", hide_env_values = true)]
    pub password: String,
}
