//! Property-based tests for outbound request construction.
//!
//! These tests use proptest to check the URL rewrite, header and body rules
//! for arbitrary paths, queries and JSON documents.

use axum::http::{HeaderMap, HeaderValue, Method};
use gemini_openai_proxy::api::upstream::{
    build_upstream_headers, build_upstream_request, build_upstream_url, is_streaming_request,
    normalize_path, parse_inbound_body, rewrite_path, OPENAI_COMPAT_PREFIX,
};
use gemini_openai_proxy::core::config::DEFAULT_UPSTREAM_BASE_URL;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Generate a URL path starting with `/`, free of dot segments
fn path_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-zA-Z0-9_-][a-zA-Z0-9_.-]{0,11}", 0..5)
        .prop_map(|segments| format!("/{}", segments.join("/")))
}

/// Generate a raw query string (possibly absent)
fn query_strategy() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[a-z]{1,6}=[a-zA-Z0-9%]{0,8}(&[a-z]{1,6}=[a-zA-Z0-9%]{0,8}){0,3}")
}

/// Generate arbitrary JSON documents
fn json_strategy() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,16}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Array),
            prop::collection::hash_map("[a-z]{1,8}", inner, 0..6)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    /// Property: prefixed paths lose exactly one prefix, query kept verbatim
    #[test]
    fn prop_prefixed_paths_are_rewritten(rest in path_strategy(), query in query_strategy()) {
        let inbound = format!("{}{}", OPENAI_COMPAT_PREFIX, rest);
        let url = build_upstream_url(DEFAULT_UPSTREAM_BASE_URL, &inbound, query.as_deref());

        let expected = match &query {
            Some(q) => format!("{}{}?{}", DEFAULT_UPSTREAM_BASE_URL, rest, q),
            None => format!("{}{}", DEFAULT_UPSTREAM_BASE_URL, rest),
        };
        prop_assert_eq!(url, expected);
    }

    /// Property: paths without the prefix are appended unchanged
    #[test]
    fn prop_other_paths_are_unchanged(path in path_strategy(), query in query_strategy()) {
        prop_assume!(!path.starts_with(OPENAI_COMPAT_PREFIX));

        prop_assert_eq!(rewrite_path(&path), path.as_str());

        let url = build_upstream_url(DEFAULT_UPSTREAM_BASE_URL, &path, query.as_deref());
        let expected_prefix = format!("{}{}", DEFAULT_UPSTREAM_BASE_URL, path);
        prop_assert!(url.starts_with(&expected_prefix));
    }

    /// Property: the outbound header set never carries other inbound headers
    #[test]
    fn prop_headers_are_minimal(
        extra in prop::collection::hash_map("x-[a-z]{1,10}", "[a-zA-Z0-9]{1,10}", 0..8),
        auth in prop::option::of("Bearer [a-zA-Z0-9]{1,20}"),
    ) {
        let mut inbound = HeaderMap::new();
        for (name, value) in &extra {
            inbound.insert(
                axum::http::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        if let Some(auth) = &auth {
            inbound.insert("authorization", HeaderValue::from_str(auth).unwrap());
        }

        let headers = build_upstream_headers(&inbound).unwrap();
        let expected_len = if auth.is_some() { 3 } else { 2 };
        prop_assert_eq!(headers.len(), expected_len);
        prop_assert_eq!(headers.get("content-type").unwrap(), "application/json");
        prop_assert_eq!(headers.get("accept").unwrap(), "application/json");
        for name in extra.keys() {
            prop_assert!(headers.get(name.as_str()).is_none());
        }
    }

    /// Property: a forwarded body re-serializes to the same document
    #[test]
    fn prop_body_round_trips(body in json_strategy()) {
        let raw = serde_json::to_vec(&body).unwrap();
        let parsed = parse_inbound_body(&raw).unwrap();
        let forwarded: Value = serde_json::from_slice(&serde_json::to_vec(&parsed).unwrap()).unwrap();
        prop_assert_eq!(forwarded, body);
    }

    /// Property: GET parses its body but never sends one
    #[test]
    fn prop_get_has_no_outbound_body(body in json_strategy()) {
        let raw = serde_json::to_vec(&body).unwrap();
        let parsed = parse_inbound_body(&raw).unwrap();
        prop_assert_eq!(&parsed, &body);

        let client = reqwest::Client::new();
        let request = build_upstream_request(
            &client,
            &Method::GET,
            "https://example.com/models",
            reqwest::header::HeaderMap::new(),
            &parsed,
        )
        .unwrap()
        .build()
        .unwrap();
        prop_assert!(request.body().is_none());
    }

    /// Property: paths without dot segments are left alone by normalization
    #[test]
    fn prop_normalization_keeps_plain_paths(path in path_strategy()) {
        prop_assert_eq!(normalize_path(&path), path.as_str());
    }

    /// Property: a `..` after the prefix always cancels its last segment
    #[test]
    fn prop_parent_segment_is_resolved(rest in path_strategy(), segment in "[a-z]{1,8}") {
        let inbound = format!("{}/{}/..{}", OPENAI_COMPAT_PREFIX, segment, rest);
        let expected = format!("{}{}", DEFAULT_UPSTREAM_BASE_URL, rest);
        prop_assert_eq!(build_upstream_url(DEFAULT_UPSTREAM_BASE_URL, &inbound, None), expected);
    }

    /// Property: only a boolean `true` under `stream` selects streaming
    #[test]
    fn prop_streaming_requires_boolean_true(value in json_strategy()) {
        let body = json!({"model": "m", "stream": value.clone()});
        prop_assert_eq!(is_streaming_request(&body), value == Value::Bool(true));
    }
}
