//! Integration tests for `FaviconResolver`.
//!
//! Each test stands up a `wiremock` server and points the fake hosts
//! `site.test` and `proxy.test` at it through reqwest's DNS override, so
//! queries look like ordinary public domains and no real network traffic is
//! made.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use favicon_core::{OverrideEntry, OverrideTable};
use favicon_resolver::{
    FaviconResolver, FetchTimeouts, IconImage, Resolution, ResolveOptions, ResolverSettings,
    Sentinel, TouchIconPolicy,
};

const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

fn settings(port: u16) -> ResolverSettings {
    ResolverSettings {
        timeouts: FetchTimeouts {
            page: Duration::from_secs(2),
            manifest: Duration::from_secs(2),
            icon: Duration::from_secs(2),
        },
        proxy_template: Some(format!("http://proxy.test:{port}/ip3/{{host}}.ico")),
        ..ResolverSettings::default()
    }
}

fn resolver_with(
    server: &MockServer,
    settings: ResolverSettings,
    overrides: OverrideTable,
) -> FaviconResolver {
    let client = reqwest::Client::builder()
        .no_proxy()
        .resolve("site.test", *server.address())
        .resolve("proxy.test", *server.address())
        .build()
        .expect("failed to build test reqwest client");
    FaviconResolver::with_http_client(client, settings, overrides)
}

fn test_resolver(server: &MockServer) -> FaviconResolver {
    resolver_with(server, settings(server.address().port()), OverrideTable::empty())
}

fn site(server: &MockServer, p: &str) -> String {
    format!("http://site.test:{}{p}", server.address().port())
}

fn proxy(server: &MockServer) -> String {
    format!("http://proxy.test:{}/ip3/site.test.ico", server.address().port())
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8")
}

fn image(mime: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(PNG.to_vec(), mime)
}

async fn mount(server: &MockServer, p: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(response)
        .mount(server)
        .await;
}

async fn requested_paths(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|r| r.url.path().to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Page-declared icons
// ---------------------------------------------------------------------------

#[tokio::test]
async fn link_icon_resolves_against_origin() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(r#"<html><head><link rel="icon" href="/favicon.ico" sizes="32x32"></head></html>"#),
    )
    .await;
    mount(&server, "/favicon.ico", image("image/x-icon")).await;

    let resolver = test_resolver(&server);
    let text = resolver.resolve_as_text(&site(&server, "/")).await;

    assert_eq!(text, site(&server, "/favicon.ico"));
}

#[tokio::test]
async fn manifest_icon_closest_to_target_wins() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(r#"<head><link rel="manifest" href="/site.webmanifest"></head>"#),
    )
    .await;
    mount(
        &server,
        "/site.webmanifest",
        ResponseTemplate::new(200).set_body_json(json!({
            "icons": [
                { "src": "/icon-48.png", "sizes": "48x48" },
                { "src": "/icon-192.png", "sizes": "192x192" }
            ]
        })),
    )
    .await;
    mount(&server, "/icon-48.png", image("image/png")).await;
    mount(&server, "/icon-192.png", image("image/png")).await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");

    assert_eq!(
        resolver.list_candidates(&query).await,
        vec![site(&server, "/icon-192.png"), site(&server, "/icon-48.png")]
    );
    assert_eq!(
        resolver.resolve_as_text(&query).await,
        site(&server, "/icon-192.png")
    );
}

#[tokio::test]
async fn malformed_manifest_keeps_page_candidates() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<head><link rel="manifest" href="manifest.json"><link rel="icon" href="/icon.png"></head>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/manifest.json",
        ResponseTemplate::new(200).set_body_raw("not json", "application/json"),
    )
    .await;
    mount(&server, "/icon.png", image("image/png")).await;

    let resolver = test_resolver(&server);
    let diagnostics = resolver.debug(&site(&server, "/")).await;

    assert_eq!(diagnostics.manifest, Some(site(&server, "/manifest.json")));
    assert!(diagnostics.manifest_icons.is_empty());
    assert_eq!(diagnostics.paths, vec![site(&server, "/icon.png")]);
    assert!(diagnostics.failures.iter().any(|f| f.contains("manifest")));
}

#[tokio::test]
async fn non_image_content_type_is_skipped() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<head>
                <link rel="icon" href="/soft-404.png" sizes="144x144">
                <link rel="icon" href="/real.png" sizes="32x32">
            </head>"#,
        ),
    )
    .await;
    mount(&server, "/soft-404.png", html("<h1>Not found</h1>")).await;
    mount(&server, "/real.png", image("image/png")).await;

    let resolver = test_resolver(&server);
    let resolution = resolver
        .resolve(&site(&server, "/"), ResolveOptions::default())
        .await;

    assert_eq!(
        resolution,
        Resolution::Icon {
            url: site(&server, "/real.png")
        }
    );
}

#[tokio::test]
async fn data_uri_candidates_validate_without_a_request() {
    let server = MockServer::start().await;
    let data_uri = "data:image/png;base64,iVBORw0KGgo=";
    mount(
        &server,
        "/",
        html(&format!(r#"<head><link rel="icon" href="{data_uri}"></head>"#)),
    )
    .await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");

    assert_eq!(resolver.resolve_as_text(&query).await, data_uri);
    let image = resolver.resolve_as_image(&query).await;
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(image.bytes, b"\x89PNG\r\n\x1a\n");
    assert_eq!(requested_paths(&server).await, vec!["/", "/"]);
}

#[tokio::test]
async fn redirected_page_rebases_relative_hrefs() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        ResponseTemplate::new(301).insert_header("location", site(&server, "/app/").as_str()),
    )
    .await;
    mount(
        &server,
        "/app/",
        html(r#"<head><link rel="icon" href="icon.png"></head>"#),
    )
    .await;
    mount(&server, "/app/icon.png", image("image/png")).await;

    let resolver = test_resolver(&server);
    let diagnostics = resolver.debug(&site(&server, "/")).await;

    assert!(diagnostics.redirected);
    assert_eq!(diagnostics.base_url, Some(site(&server, "/app/")));
    assert_eq!(diagnostics.outcome, Some(site(&server, "/app/icon.png")));
}

// ---------------------------------------------------------------------------
// Fallback chain
// ---------------------------------------------------------------------------

#[tokio::test]
async fn page_without_icons_falls_back_to_root_favicon_then_proxy() {
    let server = MockServer::start().await;
    mount(&server, "/", html("<html><head><title>bare</title></head></html>")).await;
    mount(&server, "/favicon.ico", image("image/x-icon")).await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");

    assert_eq!(
        resolver.list_candidates(&query).await,
        vec![site(&server, "/favicon.ico"), proxy(&server)]
    );
    assert_eq!(
        resolver.resolve_as_text(&query).await,
        site(&server, "/favicon.ico")
    );
}

#[tokio::test]
async fn timed_out_page_uses_proxy() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html("<head></head>").set_delay(Duration::from_millis(800)),
    )
    .await;
    mount(&server, "/ip3/site.test.ico", image("image/x-icon")).await;

    let mut settings = settings(server.address().port());
    settings.timeouts.page = Duration::from_millis(100);
    let resolver = resolver_with(&server, settings, OverrideTable::empty());

    let diagnostics = resolver.debug(&site(&server, "/")).await;
    assert!(diagnostics.failures[0].starts_with("timed out fetching"));

    assert_eq!(
        resolver.resolve_as_text(&site(&server, "/")).await,
        proxy(&server)
    );
}

#[tokio::test]
async fn unreachable_site_with_no_working_fallback_is_notfound() {
    let server = MockServer::start().await;
    mount(&server, "/", ResponseTemplate::new(503)).await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");

    assert_eq!(
        resolver.resolve(&query, ResolveOptions::default()).await,
        Resolution::NotFound
    );
    assert_eq!(
        resolver.resolve_as_text(&query).await,
        Sentinel::NotFound.data_uri()
    );
    assert_eq!(
        resolver.resolve_as_image(&query).await,
        IconImage::sentinel(Sentinel::NotFound)
    );
}

#[tokio::test]
async fn disabled_proxy_leaves_only_root_favicon() {
    let server = MockServer::start().await;
    mount(&server, "/", ResponseTemplate::new(404)).await;

    let mut settings = settings(server.address().port());
    settings.proxy_template = None;
    let resolver = resolver_with(&server, settings, OverrideTable::empty());

    assert_eq!(
        resolver.list_candidates(&site(&server, "/")).await,
        vec![site(&server, "/favicon.ico")]
    );
}

#[tokio::test]
async fn unresolvable_hrefs_still_fall_back_to_root_favicon() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(r#"<html><head><link rel="icon" href="data:text/plain,hello"></head></html>"#),
    )
    .await;
    mount(&server, "/favicon.ico", image("image/x-icon")).await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");
    let root_favicon = site(&server, "/favicon.ico");

    assert_eq!(
        resolver.list_candidates(&query).await,
        vec![root_favicon.clone(), proxy(&server)]
    );
    assert_eq!(
        resolver.resolve(&query, ResolveOptions::default()).await,
        Resolution::Icon {
            url: root_favicon.clone()
        }
    );
    assert_eq!(
        resolver.resolve(&query, ResolveOptions::fast()).await,
        Resolution::Icon {
            url: root_favicon.clone()
        }
    );
    assert_eq!(
        resolver.resolve_image(&query, ResolveOptions::fast()).await,
        IconImage {
            bytes: PNG.to_vec(),
            mime_type: "image/x-icon".to_string(),
        }
    );

    let diagnostics = resolver.debug(&query).await;
    assert_eq!(diagnostics.tags.len(), 1);
    assert_eq!(diagnostics.paths, vec![root_favicon.clone(), proxy(&server)]);
    assert_eq!(diagnostics.outcome, Some(root_favicon));
}

#[tokio::test]
async fn cookie_notice_page_keeps_its_icons() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<html><head><title>Sign in</title>
            <link rel="icon" href="/brand.png" sizes="48x48"></head>
            <body><noscript>Please enable cookies to continue.</noscript></body></html>"#,
        ),
    )
    .await;
    mount(&server, "/brand.png", image("image/png")).await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");

    let diagnostics = resolver.debug(&query).await;
    assert!(!diagnostics.bot_challenge);
    assert_eq!(diagnostics.paths, vec![site(&server, "/brand.png")]);

    assert_eq!(
        resolver.resolve_as_text(&query).await,
        site(&server, "/brand.png")
    );
}

#[tokio::test]
async fn bot_challenge_ignores_page_icons_and_uses_proxy() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<html><head><title>Just a moment...</title>
            <link rel="icon" href="/challenge-logo.png"></head>
            <body><script src="/cdn-cgi/challenge-platform/h/b/orchestrate/jsch/v1"></script></body></html>"#,
        ),
    )
    .await;
    mount(&server, "/ip3/site.test.ico", image("image/x-icon")).await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");

    let diagnostics = resolver.debug(&query).await;
    assert!(diagnostics.bot_challenge);
    assert!(diagnostics.tags.is_empty());
    assert_eq!(
        diagnostics.paths,
        vec![site(&server, "/favicon.ico"), proxy(&server)]
    );

    assert_eq!(resolver.resolve_as_text(&query).await, proxy(&server));
}

// ---------------------------------------------------------------------------
// Static overrides
// ---------------------------------------------------------------------------

fn overrides(icon: &str) -> OverrideTable {
    OverrideTable::new(
        vec![OverrideEntry {
            match_tokens: vec!["site.test".to_string()],
            icon: icon.to_string(),
        }],
        None,
    )
}

#[tokio::test]
async fn static_override_returns_icon_without_network() {
    let server = MockServer::start().await;
    let port = server.address().port();
    let resolver = resolver_with(
        &server,
        settings(port),
        overrides("https://static.example/icons/site.png"),
    );

    let text = resolver.resolve_as_text(&site(&server, "/")).await;

    assert_eq!(text, "https://static.example/icons/site.png");
    assert!(requested_paths(&server).await.is_empty());
}

#[tokio::test]
async fn static_override_file_names_join_static_host() {
    let server = MockServer::start().await;
    let port = server.address().port();
    let table = overrides("site.png").with_static_host(Some("https://static.example/".into()));
    let resolver = resolver_with(&server, settings(port), table);

    assert_eq!(
        resolver.list_candidates(&site(&server, "/")).await,
        vec!["https://static.example/site.png".to_string()]
    );
    assert!(requested_paths(&server).await.is_empty());
}

#[tokio::test]
async fn static_override_in_image_mode_downloads_the_icon() {
    let server = MockServer::start().await;
    let port = server.address().port();
    mount(&server, "/static/site.png", image("image/png; charset=binary")).await;

    let resolver = resolver_with(
        &server,
        settings(port),
        overrides(&site(&server, "/static/site.png")),
    );
    let image = resolver.resolve_as_image(&site(&server, "/")).await;

    assert_eq!(image.bytes, PNG);
    assert_eq!(image.mime_type, "image/png");
    assert_eq!(requested_paths(&server).await, vec!["/static/site.png"]);
}

#[tokio::test]
async fn broken_static_override_in_image_mode_is_notfound() {
    let server = MockServer::start().await;
    let port = server.address().port();
    let resolver = resolver_with(
        &server,
        settings(port),
        overrides(&site(&server, "/static/missing.png")),
    );

    assert_eq!(
        resolver.resolve_as_image(&site(&server, "/")).await,
        IconImage::sentinel(Sentinel::NotFound)
    );
}

// ---------------------------------------------------------------------------
// Modes and policies
// ---------------------------------------------------------------------------

#[tokio::test]
async fn image_mode_returns_bytes_and_mime() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(r#"<head><link rel="icon" type="image/svg+xml" href="/icon.svg"></head>"#),
    )
    .await;
    mount(
        &server,
        "/icon.svg",
        ResponseTemplate::new(200).set_body_raw("<svg/>", "image/svg+xml"),
    )
    .await;

    let resolver = test_resolver(&server);
    let image = resolver.resolve_as_image(&site(&server, "/")).await;

    assert_eq!(image.bytes, b"<svg/>");
    assert_eq!(image.mime_type, "image/svg+xml");
}

#[tokio::test]
async fn fast_mode_skips_validation() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<head>
                <link rel="icon" href="/broken.png" sizes="144x144">
                <link rel="icon" href="/working.png" sizes="16x16">
            </head>"#,
        ),
    )
    .await;
    mount(&server, "/working.png", image("image/png")).await;

    let resolver = test_resolver(&server);
    let query = site(&server, "/");

    let fast = resolver.resolve(&query, ResolveOptions::fast()).await;
    assert_eq!(
        fast,
        Resolution::Icon {
            url: site(&server, "/broken.png")
        }
    );
    assert_eq!(requested_paths(&server).await, vec!["/"]);

    let fast_image = resolver.resolve_image(&query, ResolveOptions::fast()).await;
    assert_eq!(fast_image, IconImage::sentinel(Sentinel::NotFound));

    let validated = resolver.resolve(&query, ResolveOptions::default()).await;
    assert_eq!(
        validated,
        Resolution::Icon {
            url: site(&server, "/working.png")
        }
    );
}

#[tokio::test]
async fn touch_icon_policy_controls_ordering() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<head>
                <link rel="apple-touch-icon" href="/touch-57.png" sizes="57x57">
                <link rel="icon" href="/icon-144.png" sizes="144x144">
            </head>"#,
        ),
    )
    .await;

    let port = server.address().port();
    let query = site(&server, "/");

    let ranked = test_resolver(&server).list_candidates(&query).await;
    assert_eq!(
        ranked,
        vec![site(&server, "/icon-144.png"), site(&server, "/touch-57.png")]
    );

    let preferred_settings = ResolverSettings {
        touch_icon_policy: TouchIconPolicy::Preferred,
        ..settings(port)
    };
    let preferred = resolver_with(&server, preferred_settings, OverrideTable::empty())
        .list_candidates(&query)
        .await;
    assert_eq!(
        preferred,
        vec![site(&server, "/touch-57.png"), site(&server, "/icon-144.png")]
    );
}

#[tokio::test]
async fn duplicate_hrefs_are_tried_once() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<head>
                <link rel="icon" href="/favicon.ico">
                <link rel="shortcut icon" href="favicon.ico">
            </head>"#,
        ),
    )
    .await;

    let resolver = test_resolver(&server);

    assert_eq!(
        resolver.list_candidates(&site(&server, "/")).await,
        vec![site(&server, "/favicon.ico")]
    );
}

#[tokio::test]
async fn debug_reports_every_stage() {
    let server = MockServer::start().await;
    mount(
        &server,
        "/",
        html(
            r#"<html><head>
                <meta name="apple-touch-icon" content="/meta-touch.png">
                <link rel="icon" href="/favicon-32.png" sizes="32x32">
                <link rel="manifest" href="/manifest.json">
            </head><body>ignored</body></html>"#,
        ),
    )
    .await;
    mount(
        &server,
        "/manifest.json",
        ResponseTemplate::new(200)
            .set_body_json(json!({ "icons": [{ "src": "/pwa-512.png", "sizes": "512x512" }] })),
    )
    .await;

    let resolver = test_resolver(&server);
    let diagnostics = resolver.debug(&site(&server, "/")).await;
    let json = serde_json::to_value(&diagnostics).expect("diagnostics serialize");

    assert_eq!(json["classification"], "remote");
    assert_eq!(json["redirected"], false);
    assert_eq!(json["tags"].as_array().map(Vec::len), Some(3));
    assert_eq!(json["manifest_icons"], json!(["/pwa-512.png"]));
    assert_eq!(
        diagnostics.paths,
        vec![
            site(&server, "/meta-touch.png"),
            site(&server, "/favicon-32.png"),
            site(&server, "/pwa-512.png"),
        ]
    );
    // Debug runs in fast mode: the top candidate is reported unvalidated.
    assert_eq!(diagnostics.outcome, Some(site(&server, "/meta-touch.png")));
}
