//! CLI entry point for the tado client.

pub mod auth;
pub mod home;

use clap::{Parser, Subcommand};

/// tado° command line client
#[derive(Parser, Debug)]
#[command(name = "tado", version, about = "tado° cloud API client")]
pub struct Cli {
    /// Credential profile (overrides TADO_PROFILE)
    #[arg(long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication management
    Auth(AuthArgs),
    /// List zones with their current temperature
    Zones,
    /// Show the weather at the home
    Weather,
}

/// Arguments for the `auth` subcommand group.
#[derive(Parser, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub command: AuthCommands,
}

/// Auth subcommands for login, status, and logout.
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Link this device to a tado account
    Login(LoginArgs),
    /// Show authentication status
    Status,
    /// Forget the stored credential
    Logout,
}

/// Arguments for `tado auth login`.
#[derive(Parser, Debug)]
pub struct LoginArgs {
    /// Start a new device flow even when a credential is stored
    #[arg(long)]
    pub force: bool,
}

impl Cli {
    /// Parse CLI arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn parse_auth_login() {
        let cli = Cli::try_parse_from(["tado", "auth", "login"]).unwrap();
        match cli.command {
            Commands::Auth(auth) => match auth.command {
                AuthCommands::Login(args) => assert!(!args.force),
                other => panic!("expected Login, got {other:?}"),
            },
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn parse_auth_login_force() {
        let cli = Cli::try_parse_from(["tado", "auth", "login", "--force"]).unwrap();
        match cli.command {
            Commands::Auth(auth) => match auth.command {
                AuthCommands::Login(args) => assert!(args.force),
                other => panic!("expected Login, got {other:?}"),
            },
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn parse_auth_status() {
        let cli = Cli::try_parse_from(["tado", "auth", "status"]).unwrap();
        match cli.command {
            Commands::Auth(auth) => {
                assert!(matches!(auth.command, AuthCommands::Status));
            }
            other => panic!("expected Auth, got {other:?}"),
        }
    }

    #[test]
    fn parse_global_profile_after_subcommand() {
        let cli = Cli::try_parse_from(["tado", "zones", "--profile", "holiday"]).unwrap();
        assert_eq!(cli.profile.as_deref(), Some("holiday"));
        assert!(matches!(cli.command, Commands::Zones));
    }

    #[test]
    fn parse_weather() {
        let cli = Cli::try_parse_from(["tado", "weather"]).unwrap();
        assert!(cli.profile.is_none());
        assert!(matches!(cli.command, Commands::Weather));
    }

    #[test]
    fn parse_missing_subcommand_is_error() {
        assert!(Cli::try_parse_from(["tado"]).is_err());
    }

    #[test]
    fn parse_auth_logout_rejects_positional() {
        assert!(Cli::try_parse_from(["tado", "auth", "logout", "extra"]).is_err());
    }
}
