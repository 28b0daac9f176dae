use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, builder::BoolishValueParser};

use crate::domain::types::UserRole;

/// Command-line arguments for the coursehub server binary.
#[derive(Debug, Parser)]
#[command(name = "coursehub", version, about = "Coursehub e-learning API server")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "COURSEHUB_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the HTTP API.
    Serve(Box<ServeArgs>),
    /// Create an account directly in the database.
    #[command(name = "create-user")]
    CreateUser(CreateUserArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct DatabaseOverride {
    /// Override the database connection URL.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeArgs {
    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Override the database connection URL; without one the in-memory store is used.
    #[arg(long = "database-url", value_name = "URL")]
    pub database_url: Option<String>,

    /// Override the database pool size.
    #[arg(long = "database-max-connections", value_name = "COUNT")]
    pub database_max_connections: Option<u32>,

    /// Override the session cookie name.
    #[arg(long = "auth-cookie-name", value_name = "NAME")]
    pub auth_cookie_name: Option<String>,

    /// Mark the session cookie as Secure.
    #[arg(
        long = "auth-cookie-secure",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub auth_cookie_secure: Option<bool>,

    /// Override the session lifetime.
    #[arg(long = "auth-session-ttl-hours", value_name = "HOURS")]
    pub auth_session_ttl_hours: Option<u64>,

    /// Seed the default categories when the store has none.
    #[arg(
        long = "store-seed-categories",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub store_seed_categories: Option<bool>,
}

#[derive(Debug, Args, Clone)]
pub struct CreateUserArgs {
    #[command(flatten)]
    pub database: DatabaseOverride,

    /// Login name of the new account.
    #[arg(long, value_name = "NAME")]
    pub username: String,

    /// Email address of the new account.
    #[arg(long, value_name = "EMAIL")]
    pub email: String,

    /// Initial password.
    #[arg(long, env = "COURSEHUB_NEW_USER_PASSWORD", value_name = "PASSWORD")]
    pub password: String,

    /// Role of the new account.
    #[arg(long, value_enum, default_value = "student")]
    pub role: RoleArg,

    #[arg(long = "first-name", value_name = "NAME")]
    pub first_name: Option<String>,

    #[arg(long = "last-name", value_name = "NAME")]
    pub last_name: Option<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    Student,
    Instructor,
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Student => UserRole::Student,
            RoleArg::Instructor => UserRole::Instructor,
            RoleArg::Admin => UserRole::Admin,
        }
    }
}
