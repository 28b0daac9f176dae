use clap::Parser;

use super::*;

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.server.port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        server_port: Some(4321),
        log_level: Some("debug".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
}

#[test]
fn defaults_select_memory_store_and_session_cookie() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.database.url.is_none());
    assert_eq!(settings.server.addr.port(), DEFAULT_PORT);
    assert_eq!(settings.auth.cookie_name, "coursehub_session");
    assert!(!settings.auth.cookie_secure);
    assert_eq!(settings.auth.session_ttl, Duration::from_secs(7 * 24 * 3600));
    assert!(settings.store.seed_categories);
    assert!(settings.bootstrap.admin.is_none());
}

#[test]
fn blank_database_url_means_memory_store() {
    let mut raw = RawSettings::default();
    raw.database.url = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.database.url.is_none());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = RawSettings::default();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn zero_values_are_rejected() {
    let mut raw = RawSettings::default();
    raw.database.max_connections = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero pool");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "database.max_connections",
            ..
        }
    ));

    let mut raw = RawSettings::default();
    raw.auth.session_ttl_hours = Some(0);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn partial_bootstrap_admin_is_rejected() {
    let mut raw = RawSettings::default();
    raw.bootstrap.admin_username = Some("admin".to_string());
    let err = Settings::from_raw(raw).expect_err("incomplete bootstrap");
    assert!(matches!(err, LoadError::Invalid { key: "bootstrap", .. }));

    let mut raw = RawSettings::default();
    raw.bootstrap.admin_username = Some("admin".to_string());
    raw.bootstrap.admin_email = Some("admin@example.com".to_string());
    raw.bootstrap.admin_password = Some("secret-password".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert_eq!(
        settings.bootstrap.admin.map(|admin| admin.username),
        Some("admin".to_string())
    );
}

#[test]
fn cookie_names_are_restricted() {
    let mut raw = RawSettings::default();
    raw.auth.cookie_name = Some("bad name;".to_string());
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["coursehub"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "coursehub",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--database-url",
        "postgres://override",
        "--auth-cookie-secure",
        "true",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.database_url.as_deref(),
                Some("postgres://override")
            );
            assert_eq!(serve.overrides.auth_cookie_secure, Some(true));
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_create_user_arguments() {
    let args = CliArgs::parse_from([
        "coursehub",
        "create-user",
        "--database-url",
        "postgres://example",
        "--username",
        "instructor",
        "--email",
        "instructor@example.com",
        "--password",
        "correct-horse",
        "--role",
        "instructor",
    ]);

    match args.command.expect("create-user command") {
        Command::CreateUser(create) => {
            assert_eq!(
                create.database.database_url.as_deref(),
                Some("postgres://example")
            );
            assert_eq!(create.username, "instructor");
            assert!(matches!(create.role, RoleArg::Instructor));
        }
        _ => panic!("wrong command parsed"),
    }
}
