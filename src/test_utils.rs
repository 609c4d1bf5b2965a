#![allow(missing_docs)]
//! Helpers shared by the endpoint tests.

use axum::{body::Body, response::Response};
use scraper::Html;

pub(crate) async fn response_text(response: Response<Body>) -> String {
    let body = response.into_body();
    let body = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Could not get response body");

    String::from_utf8_lossy(&body).to_string()
}

pub(crate) async fn parse_html_document(response: Response<Body>) -> Html {
    let text = response_text(response).await;

    Html::parse_document(&text)
}

#[track_caller]
pub(crate) fn assert_valid_html(html: &Html) {
    assert!(
        html.errors.is_empty(),
        "Got HTML parsing errors: {:?}",
        html.errors
    );
}

pub(crate) async fn assert_contains_text(response: Response<Body>, text: &str) {
    let body = response_text(response).await;

    assert!(
        body.contains(text),
        "Expected response body to contain {text:?}"
    );
}

#[track_caller]
pub(crate) fn get_header(response: &Response<Body>, header_name: &str) -> String {
    let header_error_message = format!("Headers missing {header_name}");

    response
        .headers()
        .get(header_name)
        .expect(&header_error_message)
        .to_str()
        .expect("Could not convert to str")
        .to_string()
}

#[track_caller]
pub(crate) fn assert_content_type(response: &Response<Body>, content_type: &str) {
    let content_type_header = get_header(response, "content-type");

    assert!(
        content_type_header.starts_with(content_type),
        "Expected content type {content_type:?}, got {content_type_header:?}"
    );
}
