use std::{process, sync::Arc, time::Duration};

use coursehub::{
    application::{
        auth::{AuthService, RegisterCommand},
        error::AppError,
        sessions::SessionStore,
    },
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiState, AuthCookieSettings},
        memory::MemoryRepositories,
        telemetry,
    },
};
use tokio::sync::Notify;
use tracing::{Dispatch, Level, dispatcher, error, info, warn};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()
        .map_err(|err| AppError::unexpected(format!("failed to load configuration: {err}")))?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::CreateUser(args) => run_create_user(settings, args).await,
    }
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let sessions = Arc::new(SessionStore::new(settings.auth.session_ttl));
    let cookies = AuthCookieSettings {
        name: settings.auth.cookie_name.clone(),
        secure: settings.auth.cookie_secure,
    };

    let state = match settings.database.url.as_deref() {
        Some(url) => {
            let repositories =
                connect_postgres(url, settings.database.max_connections.get()).await?;
            info!(
                target = "coursehub::startup",
                backend = "postgres",
                "entity store ready"
            );
            ApiState::from_repositories(Arc::new(repositories), sessions, cookies)
        }
        None => {
            info!(
                target = "coursehub::startup",
                backend = "memory",
                "entity store ready; data is lost on exit"
            );
            ApiState::from_repositories(Arc::new(MemoryRepositories::new()), sessions, cookies)
        }
    };

    bootstrap(&settings, &state).await?;
    serve_http(&settings, state).await
}

async fn connect_postgres(url: &str, max_connections: u32) -> Result<PostgresRepositories, AppError> {
    let pool = PostgresRepositories::connect(url, max_connections)
        .await
        .map_err(InfraError::from)?;
    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(InfraError::from)?;
    Ok(PostgresRepositories::new(pool))
}

async fn bootstrap(settings: &config::Settings, state: &ApiState) -> Result<(), AppError> {
    if settings.store.seed_categories {
        state
            .categories
            .seed_defaults()
            .await
            .map_err(|err| AppError::unexpected(format!("failed to seed categories: {err}")))?;
    }

    if let Some(admin) = settings.bootstrap.admin.as_ref() {
        let created = state
            .auth
            .ensure_admin(&admin.username, &admin.email, &admin.password)
            .await
            .map_err(|err| AppError::unexpected(format!("failed to create admin: {err}")))?;
        if created.is_none() {
            info!(
                target = "coursehub::startup",
                username = %admin.username,
                "bootstrap admin already exists"
            );
        }
    }

    Ok(())
}

async fn serve_http(settings: &config::Settings, state: ApiState) -> Result<(), AppError> {
    let router = http::build_router(state);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "coursehub::startup",
        addr = %settings.server.addr,
        "listening"
    );

    let shutdown = Arc::new(Notify::new());
    let trigger = shutdown.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, router.into_make_service())
            .with_graceful_shutdown(async move { trigger.notified().await })
            .await
    });

    tokio::select! {
        joined = &mut server => return server_outcome(joined),
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|err| AppError::from(InfraError::from(err)))?;
        }
    }

    info!(target = "coursehub::shutdown", "shutdown requested");
    shutdown.notify_one();

    match tokio::time::timeout(settings.server.graceful_shutdown, &mut server).await {
        Ok(joined) => server_outcome(joined),
        Err(_) => {
            warn!(
                target = "coursehub::shutdown",
                timeout_secs = settings.server.graceful_shutdown.as_secs(),
                "in-flight requests did not drain in time"
            );
            server.abort();
            Ok(())
        }
    }
}

fn server_outcome(
    joined: Result<std::io::Result<()>, tokio::task::JoinError>,
) -> Result<(), AppError> {
    joined
        .map_err(|err| AppError::unexpected(format!("server task failed: {err}")))?
        .map_err(|err| AppError::from(InfraError::from(err)))
}

async fn run_create_user(
    settings: config::Settings,
    args: config::CreateUserArgs,
) -> Result<(), AppError> {
    let url = settings
        .database
        .url
        .as_deref()
        .ok_or_else(|| InfraError::configuration("create-user requires a database url"))?;
    let repositories = connect_postgres(url, 1).await?;

    // Sessions are not issued here; the store only satisfies the service.
    let sessions = Arc::new(SessionStore::new(Duration::from_secs(60)));
    let auth = AuthService::new(Arc::new(repositories), sessions);

    let user = auth
        .create_user(RegisterCommand {
            username: args.username,
            email: args.email,
            password: args.password,
            first_name: args.first_name,
            last_name: args.last_name,
            role: Some(args.role.into()),
        })
        .await
        .map_err(|err| AppError::validation(err.to_string()))?;

    info!(
        target = "coursehub::create_user",
        user_id = %user.id,
        username = %user.username,
        role = user.role.as_str(),
        "user created"
    );

    Ok(())
}
