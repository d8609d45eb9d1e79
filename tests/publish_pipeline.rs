#![deny(clippy::all, clippy::pedantic)]

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use httpmock::MockServer;
use inkpost::{
    application::{
        draft::Draft,
        error::{PublishError, Stage},
        publish::{PublishSettings, PublishState, Publisher},
    },
    config::ApiSettings,
    domain::{
        document::{Document, ImageSource, Operation},
        payload::Payload,
    },
    infra::{
        credentials::StaticCredentials,
        http::{ApiClient, HttpDocumentGateway, HttpUploadGateway},
    },
};
use reqwest::Url;
use serde_json::json;

fn api_settings() -> ApiSettings {
    ApiSettings {
        base_url: None,
        upload_path: "image/".into(),
        documents_path: "question/".into(),
        media_prefix: "/media/".into(),
        upload_field: "images".into(),
        auth_scheme: "JWT".into(),
        timeout: Duration::from_secs(5),
    }
}

fn publisher(server: &MockServer) -> Publisher {
    let base = Url::parse(&server.base_url()).expect("base url");
    let credentials = Arc::new(StaticCredentials::new(Some("token".into())));
    let api = ApiClient::new(base, &api_settings(), credentials).expect("client");
    Publisher::new(
        Arc::new(HttpUploadGateway::new(api.clone(), "image/")),
        Arc::new(HttpDocumentGateway::new(api, "question/")),
        PublishSettings {
            media_prefix: "/media/".into(),
            upload_field: "images".into(),
            decode_concurrency: NonZeroUsize::new(4).expect("non-zero"),
        },
    )
}

fn draft(ops: Vec<Operation>) -> Draft {
    let mut draft = Draft::new();
    draft.set_title("How do I hoist images?");
    draft.add_tag("rust");
    draft.set_document(Document::new(ops));
    draft
}

#[tokio::test]
async fn two_images_are_uploaded_once_and_rewritten_in_order() {
    let server = MockServer::start();
    let uploads = server.mock(|when, then| {
        when.method("POST")
            .path("/image/")
            .header("authorization", "JWT token")
            .body_includes("AAAA")
            .body_includes("BBBB");
        then.status(201)
            .header("content-type", "application/json")
            .json_body(json!({"images": [
                {"file_url": "img/aaa.png"},
                {"file_url": "img/bbb.png"}
            ]}));
    });
    let documents = server.mock(|when, then| {
        when.method("POST").path("/question/").json_body(json!({
            "title": "How do I hoist images?",
            "body": "<p>hi<img src=\"/media/img/aaa.png\">bye<img src=\"/media/img/bbb.png\"></p>",
            "tags": ["rust"]
        }));
        then.status(201)
            .header("content-type", "application/json")
            .json_body(json!({
                "id": 9,
                "title": "How do I hoist images?",
                "tags": ["rust"],
                "registered_date": "2026-10-18 12:00:00"
            }));
    });

    let mut draft = draft(vec![
        Operation::text("hi"),
        Operation::inline_image(Payload::encode("image/png", b"AAAA")),
        Operation::text("bye"),
        Operation::inline_image(Payload::encode("image/png", b"BBBB")),
        Operation::text("\n"),
    ]);

    let publisher = publisher(&server);
    let attempt = publisher.attempt();
    let state = attempt.subscribe();
    let outcome = attempt.run(draft.snapshot()).await.expect("publish");

    uploads.assert();
    documents.assert();
    assert_eq!(outcome.created.id, 9);
    assert!(matches!(*state.borrow(), PublishState::Succeeded(_)));

    assert!(draft.apply_published(&outcome));
    let hosted: Vec<&str> = draft
        .document()
        .operations()
        .iter()
        .filter_map(|op| match op {
            Operation::ImageEmbed {
                source: ImageSource::Hosted(reference),
                ..
            } => Some(reference.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(hosted, ["/media/img/aaa.png", "/media/img/bbb.png"]);
}

#[tokio::test]
async fn text_only_document_goes_straight_to_submission() {
    let server = MockServer::start();
    let documents = server.mock(|when, then| {
        when.method("POST").path("/question/").json_body(json!({
            "title": "How do I hoist images?",
            "body": "<p>plain</p>",
            "tags": ["rust"]
        }));
        then.status(201).json_body(json!({"id": 3}));
    });

    let draft = draft(vec![Operation::text("plain\n")]);
    let outcome = publisher(&server)
        .publish(draft.snapshot())
        .await
        .expect("publish");

    documents.assert();
    assert_eq!(outcome.body(), "<p>plain</p>");
}

#[tokio::test]
async fn upload_failure_stops_before_submission() {
    let server = MockServer::start();
    let uploads = server.mock(|when, then| {
        when.method("POST").path("/image/");
        then.status(500).body("storage offline");
    });

    let draft = draft(vec![Operation::inline_image(Payload::encode(
        "image/png",
        b"AAAA",
    ))]);
    let err = publisher(&server)
        .publish(draft.snapshot())
        .await
        .expect_err("upload fails");

    uploads.assert();
    assert_eq!(
        err,
        PublishError::Server {
            stage: Stage::Upload,
            status: 500,
            body: "storage offline".into()
        }
    );
}

#[tokio::test]
async fn short_reference_list_is_rejected() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/image/");
        then.status(201)
            .json_body(json!({"images": [{"file_url": "img/aaa.png"}]}));
    });

    let draft = draft(vec![
        Operation::inline_image(Payload::encode("image/png", b"AAAA")),
        Operation::inline_image(Payload::encode("image/png", b"BBBB")),
    ]);
    let err = publisher(&server)
        .publish(draft.snapshot())
        .await
        .expect_err("count mismatch");

    assert!(matches!(
        err,
        PublishError::Protocol {
            stage: Stage::Upload,
            ..
        }
    ));
}
