use std::path::Path;

use super::*;

fn publish_args(extra: &[&str]) -> CliArgs {
    let mut argv = vec![
        "inkpost",
        "publish",
        "--title",
        "Hello",
        "--document",
        "/tmp/doc.json",
    ];
    argv.extend_from_slice(extra);
    CliArgs::parse_from(argv)
}

#[test]
fn defaults_follow_the_question_api() {
    let settings = Settings::from_raw(RawSettings::default()).expect("valid settings");

    assert!(settings.api.base_url.is_none());
    assert_eq!(settings.api.upload_path, "image/");
    assert_eq!(settings.api.documents_path, "question/");
    assert_eq!(settings.api.media_prefix, "/media/");
    assert_eq!(settings.api.upload_field, "images");
    assert_eq!(settings.api.auth_scheme, "JWT");
    assert_eq!(settings.api.timeout, Duration::from_secs(30));
    assert_eq!(settings.publish.decode_concurrency.get(), 4);
    assert_eq!(settings.logging.level, LevelFilter::INFO);
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.credentials.token.is_none());
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("https://config.example/api/".to_string());
    raw.logging.level = Some("info".to_string());

    let overrides = PublishOverrides {
        api_base_url: Some("https://cli.example/api".to_string()),
        logging: LoggingOverrides {
            log_level: Some("debug".to_string()),
            log_json: Some(true),
        },
        ..Default::default()
    };

    raw.apply_publish_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(
        settings.api.base_url.map(String::from).as_deref(),
        Some("https://cli.example/api/")
    );
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn base_url_gains_trailing_slash() {
    let url = parse_base_url("http://localhost:8000/api").expect("valid url");
    assert_eq!(url.as_str(), "http://localhost:8000/api/");
    assert_eq!(
        url.join("image/").expect("join").as_str(),
        "http://localhost:8000/api/image/"
    );
}

#[test]
fn base_url_rejects_non_http_schemes() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("ftp://example.com/".to_string());
    let err = Settings::from_raw(raw).expect_err("ftp is not allowed");
    assert!(matches!(err, LoadError::Invalid { key: "api.base_url", .. }));
}

#[test]
fn zero_timeout_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.timeout_seconds = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero timeout");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "api.timeout_seconds",
            ..
        }
    ));
}

#[test]
fn zero_decode_concurrency_is_rejected() {
    let mut raw = RawSettings::default();
    raw.publish.decode_concurrency = Some(0);
    let err = Settings::from_raw(raw).expect_err("zero concurrency");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "publish.decode_concurrency",
            ..
        }
    ));
}

#[test]
fn blank_upload_field_is_rejected() {
    let mut raw = RawSettings::default();
    raw.api.upload_field = Some("  ".to_string());
    let err = Settings::from_raw(raw).expect_err("blank field");
    assert!(matches!(
        err,
        LoadError::Invalid {
            key: "api.upload_field",
            ..
        }
    ));
}

#[test]
fn invalid_log_level_is_reported() {
    let mut raw = RawSettings::default();
    raw.logging.level = Some("loud".to_string());
    let err = Settings::from_raw(raw).expect_err("bad level");
    assert!(matches!(err, LoadError::Invalid { key: "logging.level", .. }));
}

#[test]
fn blank_token_counts_as_absent() {
    let mut raw = RawSettings::default();
    raw.credentials.token = Some("   ".to_string());
    let settings = Settings::from_raw(raw).expect("valid settings");
    assert!(settings.credentials.token.is_none());
}

#[test]
fn parse_publish_arguments() {
    let args = publish_args(&[
        "--tag",
        "rust",
        "--tag",
        "web",
        "--initial",
        "/tmp/initial.json",
        "--api-base-url",
        "http://localhost:8000/",
        "--token-file",
        "/tmp/token",
    ]);

    match args.command {
        Command::Publish(publish) => {
            assert_eq!(publish.title, "Hello");
            assert_eq!(publish.tags, ["rust", "web"]);
            assert_eq!(publish.document, Path::new("/tmp/doc.json"));
            assert_eq!(publish.initial.as_deref(), Some(Path::new("/tmp/initial.json")));
            assert_eq!(
                publish.overrides.api_base_url.as_deref(),
                Some("http://localhost:8000/")
            );
            assert_eq!(
                publish.overrides.token_file.as_deref(),
                Some(Path::new("/tmp/token"))
            );
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_embed_arguments() {
    let args = CliArgs::parse_from([
        "inkpost",
        "embed",
        "--document",
        "/tmp/doc.json",
        "--image",
        "/tmp/cat.png",
        "--at",
        "2",
    ]);

    match args.command {
        Command::Embed(embed) => {
            assert_eq!(embed.image, Path::new("/tmp/cat.png"));
            assert_eq!(embed.at, Some(2));
            assert!(embed.output.is_none());
        }
        _ => panic!("wrong command parsed"),
    }
}

#[test]
fn parse_render_arguments() {
    let args = CliArgs::parse_from([
        "inkpost",
        "render",
        "--document",
        "/tmp/doc.json",
        "--log-json",
        "yes",
    ]);

    match args.command {
        Command::Render(render) => {
            assert_eq!(render.document, Path::new("/tmp/doc.json"));
            assert_eq!(render.logging.log_json, Some(true));
        }
        _ => panic!("wrong command parsed"),
    }
}
