//! `/FetchCredentials` behaviour.

use accessgate_auth::oidc::IDENTITY_CENTER_CONTEXT_PROVIDER;
use accessgate_auth::test_util::{TEST_SUBJECT, TokenBuilder};
use accessgate_api::ACCESS_DENIED;
use accessgate_tests::doubles::{
    IDENTITY_CONTEXT, SCOPED_ACCESS_KEY, SIGNIN_TOKEN, StalledSignin, TRANSIENT_ACCESS_KEY,
};
use accessgate_tests::{
    DIRECTORY_USER_ID, IDENTITY_STORE_ID, TestBroker, TestResponse, bearer, init_test_logging,
};
use axum::http::StatusCode;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use url::Url;

fn broker() -> TestBroker {
    init_test_logging();
    TestBroker::builder()
        .user(TEST_SUBJECT, DIRECTORY_USER_ID)
        .build()
}

fn query(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

/// The console destination embedded in a federation login URL.
fn destination(response: &TestResponse) -> Url {
    let console_url = response.payload()["ConsoleUrl"].as_str().unwrap();
    let login = Url::parse(console_url).unwrap();
    Url::parse(&query(&login)["Destination"]).unwrap()
}

#[tokio::test]
async fn test_fetches_scoped_credentials() {
    let broker = broker();
    let token = TokenBuilder::new().sign();

    let response = broker
        .get(
            "/FetchCredentials?Permission=READ&Scope=s3://bucket/team-a/*",
            Some(&bearer(&token)),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));

    let payload = response.payload();
    assert_eq!(payload["MatchedGrantTarget"], "s3://bucket/team-a/*");
    assert_eq!(payload["Permission"], "READ");
    assert_eq!(payload["Credentials"]["AccessKeyId"], SCOPED_ACCESS_KEY);
    assert!(payload["Credentials"]["SecretAccessKey"].is_string());
    assert!(payload["Credentials"]["SessionToken"].is_string());
    assert!(payload["Credentials"]["Expiration"].is_string());

    let console_url = payload["ConsoleUrl"].as_str().unwrap();
    assert!(!console_url.is_empty());
    let login = Url::parse(console_url).unwrap();
    let params = query(&login);
    assert_eq!(params["Action"], "login");
    assert_eq!(params["SigninToken"], SIGNIN_TOKEN);
    assert_eq!(params["Issuer"], "https://s3ag-workshop.local");

    let destination = destination(&response);
    assert_eq!(destination.path(), "/s3/buckets/bucket");
    assert_eq!(query(&destination)["prefix"], "team-a/");

    assert_eq!(broker.token_exchange.calls.load(Ordering::SeqCst), 1);
    assert_eq!(broker.roles.calls.load(Ordering::SeqCst), 1);
    assert_eq!(broker.access_grants.data_access_calls.load(Ordering::SeqCst), 1);
    assert_eq!(broker.signin.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_data_access_signed_with_transient_role() {
    let broker = broker();
    let token = TokenBuilder::new().sign();

    broker
        .get(
            "/FetchCredentials?Permission=READWRITE&Scope=s3://bucket/team-b/*",
            Some(&token),
        )
        .await;

    let requests = broker.roles.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].session_name,
        format!("transient-s3ag-{IDENTITY_STORE_ID}")
    );
    assert_eq!(requests[0].role_arn, broker.config.transient_role_arn);
    assert_eq!(requests[0].context_provider_arn, IDENTITY_CENTER_CONTEXT_PROVIDER);
    assert_eq!(requests[0].context_assertion, IDENTITY_CONTEXT);

    let signed_with = broker.access_grants.signed_with.lock().unwrap();
    assert_eq!(signed_with.as_slice(), [TRANSIENT_ACCESS_KEY.to_string()]);
}

#[tokio::test]
async fn test_missing_or_empty_parameters_denied_before_exchange() {
    let broker = broker();
    let token = TokenBuilder::new().sign();

    for path in [
        "/FetchCredentials",
        "/FetchCredentials?Permission=READ",
        "/FetchCredentials?Scope=s3://bucket/*",
        "/FetchCredentials?Permission=&Scope=s3://bucket/*",
        "/FetchCredentials?Permission=READ&Scope=",
    ] {
        let response = broker.get(path, Some(&token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{path}");
    }
    assert_eq!(broker.exchange_calls(), 0);
}

#[tokio::test]
async fn test_unknown_permission_denied_before_exchange() {
    let broker = broker();
    let token = TokenBuilder::new().sign();

    for permission in ["ADMIN", "read"] {
        let response = broker
            .get(
                &format!("/FetchCredentials?Permission={permission}&Scope=s3://bucket/*"),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::FORBIDDEN);
    }
    assert_eq!(broker.exchange_calls(), 0);
}

#[tokio::test]
async fn test_role_assumption_failure_returns_nothing() {
    let broker = TestBroker::builder()
        .user(TEST_SUBJECT, DIRECTORY_USER_ID)
        .failing_role_assumption()
        .build();
    let token = TokenBuilder::new().sign();

    let response = broker
        .get(
            "/FetchCredentials?Permission=READ&Scope=s3://bucket/team-a/*",
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert!(response.payload().get("Credentials").is_none());
    assert_eq!(broker.access_grants.data_access_calls.load(Ordering::SeqCst), 0);
    assert_eq!(broker.signin.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_token_exchange_rejection_denied() {
    let broker = TestBroker::builder().rejecting_token_exchange().build();
    let token = TokenBuilder::new().sign();

    let response = broker
        .get("/FetchCredentials?Permission=READ&Scope=s3://bucket/*", Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(broker.roles.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_bucket_wide_grant_has_no_prefix() {
    let broker = broker();
    let token = TokenBuilder::new().sign();

    let response = broker
        .get("/FetchCredentials?Permission=READ&Scope=s3://bucket/*", Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let destination = destination(&response);
    assert_eq!(destination.path(), "/s3/buckets/bucket");
    assert!(!query(&destination).contains_key("prefix"));
}

#[tokio::test]
async fn test_object_grant_keeps_full_key() {
    let broker = TestBroker::builder()
        .matched_target("s3://bucket/reports/file.csv")
        .build();
    let token = TokenBuilder::new().sign();

    let response = broker
        .get(
            "/FetchCredentials?Permission=READ&Scope=s3://bucket/reports/file.csv",
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.payload()["MatchedGrantTarget"],
        "s3://bucket/reports/file.csv"
    );
    assert_eq!(query(&destination(&response))["prefix"], "reports/file.csv");
}

#[tokio::test]
async fn test_unparsable_matched_target_denied() {
    let broker = TestBroker::builder().matched_target("not-a-target").build();
    let token = TokenBuilder::new().sign();

    let response = broker
        .get("/FetchCredentials?Permission=READ&Scope=s3://bucket/*", Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(broker.signin.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_stalled_upstream_denied_after_timeout() {
    let signin = Arc::new(StalledSignin::default());
    let broker = TestBroker::builder()
        .config(|config| config.request_timeout_secs = 1)
        .user(TEST_SUBJECT, DIRECTORY_USER_ID)
        .signin(signin.clone())
        .build();
    let token = TokenBuilder::new().sign();

    let response = broker
        .get(
            "/FetchCredentials?Permission=READ&Scope=s3://bucket/team-a/*",
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.payload(), ACCESS_DENIED);
    assert_eq!(response.header("access-control-allow-origin"), Some("*"));
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert!(response.header("x-request-id").is_some());
    assert_eq!(signin.calls.load(Ordering::SeqCst), 1);
}
