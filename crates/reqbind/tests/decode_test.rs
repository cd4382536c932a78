//! Integration tests for request decoding.
//!
//! These tests derive records with `#[derive(Bind)]` and run whole requests
//! through a binder, covering every source and body format.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode, Uri};
use reqbind::{
    Bind, Bindable, BindError, Binder, BinderConfig, FormValues, NoPathParams, Params, PathParams,
    Request, RequestHead, TextCodec,
};
use serde::Deserialize;
use std::collections::HashMap;

// ============================================================================
// Records
// ============================================================================

#[derive(Bind, Debug, Default)]
struct Search {
    #[json = "q"]
    pub query: String,
    #[json = "page"]
    pub page: u32,
    #[json = "active"]
    pub active: bool,
}

#[derive(Bind, Debug, Default)]
struct HeaderOnly {
    #[json = "-"]
    #[form = "X-Token,header"]
    pub token: String,
}

#[derive(Bind, Debug, Default)]
struct Tracing {
    #[json = "-"]
    #[form = "X-Request-Id,header,optional"]
    pub request_id: String,
    #[json = "-"]
    #[form = "X-Retries,header,optional"]
    pub retries: Option<u8>,
    note: String,
}

#[derive(Bind, Debug, Default)]
struct Member {
    #[json = "-"]
    #[form = "org,path"]
    pub org: String,
    #[json = "-"]
    #[form = "id,path"]
    pub id: u64,
    #[json = "-"]
    #[form = "tab,path,optional"]
    pub tab: String,
}

#[derive(Bind, Debug, Default)]
struct Session {
    #[json = "-"]
    #[form = "session,cookie"]
    pub session: String,
    #[json = "-"]
    #[form = "theme,cookie"]
    pub theme: String,
}

#[derive(Bind, Debug, Default)]
struct FormLogin {
    #[form = "user"]
    pub user: String,
    #[form = "remember"]
    pub remember: bool,
}

#[derive(Bind, Debug, Default)]
struct Filter {
    #[json = "tag"]
    pub tags: Vec<String>,
    #[json = "ids"]
    #[form = ",sep=comma"]
    pub ids: Vec<u32>,
}

#[derive(Bind, Debug, Default)]
struct Envelope {
    #[json = "-"]
    #[form = ",method"]
    pub method: String,
    #[json = "-"]
    #[form = ",issave"]
    pub is_save: bool,
    #[json = "-"]
    pub uri: Uri,
    #[json = "-"]
    pub headers: HeaderMap,
    #[json = "-"]
    pub query: FormValues,
    #[json = "-"]
    pub head: RequestHead,
}

#[derive(Bind, Debug, Default)]
struct Signed {
    #[json = "name"]
    pub name: String,
    #[json = "-"]
    #[form = ",rawbody"]
    pub raw: Bytes,
}

#[derive(Bind, Debug, Default)]
struct RawText {
    #[json = "-"]
    #[form = ",rawbody"]
    pub text: String,
    #[json = "-"]
    #[form = ",rawbody"]
    pub bytes: Vec<u8>,
}

#[derive(Bind, Debug, Default)]
struct Document {
    #[json = "kind"]
    pub kind: String,
    #[json = "-"]
    #[form = ",fullbody"]
    pub document: serde_json::Value,
}

#[derive(Bind, Debug, Default)]
struct Paging {
    #[json = "page"]
    pub page: u32,
    #[json = "per_page"]
    pub per_page: u32,
}

#[derive(Bind, Debug, Default)]
struct ListUsers {
    #[json = "role"]
    pub role: String,
    #[bind(flatten)]
    pub paging: Paging,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Meta {
    owner: String,
}

#[derive(Bind, Debug, Default)]
struct Tagged {
    #[json = "title"]
    pub title: String,
    #[json = "meta"]
    #[form = ",jsononly"]
    pub meta: Meta,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
struct Celsius(i32);

impl TextCodec for Celsius {
    type Error = String;

    fn parse_text(text: &str) -> Result<Self, Self::Error> {
        text.strip_suffix('C')
            .and_then(|degrees| degrees.parse().ok())
            .map(Celsius)
            .ok_or_else(|| format!("{text:?} is not a temperature"))
    }

    fn write_text(&self) -> Result<String, Self::Error> {
        Ok(format!("{}C", self.0))
    }
}

reqbind::text_field!(Celsius);

#[derive(Bind, Debug, Default)]
struct Reading {
    #[json = "temp"]
    pub temp: Celsius,
}

#[derive(Bind, Debug, Default)]
struct Login {
    #[json = "user"]
    #[form = "user"]
    pub user: String,
}

#[derive(Bind, Debug, Default)]
struct Numbers {
    #[json = "i8"]
    pub int8: i8,
    #[json = "i16"]
    pub int16: i16,
    #[json = "i32"]
    pub int32: i32,
    #[json = "i64"]
    pub int64: i64,
    #[json = "isize"]
    pub int_size: isize,
    #[json = "u8"]
    pub uint8: u8,
    #[json = "u16"]
    pub uint16: u16,
    #[json = "u32"]
    pub uint32: u32,
    #[json = "u64"]
    pub uint64: u64,
    #[json = "usize"]
    pub uint_size: usize,
    #[json = "f32"]
    pub float32: f32,
    #[json = "f64"]
    pub float64: f64,
}

impl Numbers {
    const KEYS: [&'static str; 12] = [
        "i8", "i16", "i32", "i64", "isize", "u8", "u16", "u32", "u64", "usize", "f32", "f64",
    ];

    fn sevens() -> Self {
        Self {
            int8: 7,
            int16: 7,
            int32: 7,
            int64: 7,
            int_size: 7,
            uint8: 7,
            uint16: 7,
            uint32: 7,
            uint64: 7,
            uint_size: 7,
            float32: 7.0,
            float64: 7.0,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn get(&self, key: &str) -> f64 {
        match key {
            "i8" => f64::from(self.int8),
            "i16" => f64::from(self.int16),
            "i32" => f64::from(self.int32),
            "i64" => self.int64 as f64,
            "isize" => self.int_size as f64,
            "u8" => f64::from(self.uint8),
            "u16" => f64::from(self.uint16),
            "u32" => f64::from(self.uint32),
            "u64" => self.uint64 as f64,
            "usize" => self.uint_size as f64,
            "f32" => f64::from(self.float32),
            "f64" => self.float64,
            other => panic!("unknown numeric key {other}"),
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn bind<T: Bindable + Default>(binder: &Binder, request: Request) -> Result<T, BindError> {
    bind_with(binder, request, &NoPathParams).await
}

async fn bind_with<T, P>(binder: &Binder, mut request: Request, params: &P) -> Result<T, BindError>
where
    T: Bindable + Default,
    P: PathParams + ?Sized,
{
    let mut dest = T::default();
    binder.decode(&mut request, params, &mut dest).await?;
    Ok(dest)
}

fn get(uri: &str) -> Request {
    Request::builder().uri(uri).build().unwrap()
}

fn post_json(uri: &str, body: &'static str) -> Request {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body)
        .build()
        .unwrap()
}

fn post_form(uri: &str, body: &'static str) -> Request {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body)
        .build()
        .unwrap()
}

fn post_multipart(uri: &str, parts: &[(&str, Option<&str>, &str)]) -> Request {
    let boundary = "reqbind-boundary";
    let mut body = String::new();
    for (name, filename, data) in parts {
        body.push_str(&format!("--{boundary}\r\n"));
        match filename {
            Some(file) => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file}\"\r\n\r\n"
            )),
            None => body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{name}\"\r\n\r\n"
            )),
        }
        body.push_str(data);
        body.push_str("\r\n");
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            &format!("multipart/form-data; boundary={boundary}"),
        )
        .body(body)
        .build()
        .unwrap()
}

// ============================================================================
// Query and form sources
// ============================================================================

#[tokio::test]
async fn test_query_string() {
    let search: Search = bind(&Binder::default(), get("/search?q=rust&page=42&active=true"))
        .await
        .unwrap();
    assert_eq!(search.query, "rust");
    assert_eq!(search.page, 42);
    assert!(search.active);
}

#[tokio::test]
async fn test_empty_value_yields_zero() {
    let binder = Binder::default();
    let mut request = get("/search?page=&active=");
    let mut search = Search {
        query: "kept".into(),
        page: 5,
        active: true,
    };
    binder
        .decode(&mut request, &NoPathParams, &mut search)
        .await
        .unwrap();
    assert_eq!(search.page, 0);
    assert!(!search.active);
    // Absent keys leave fields untouched.
    assert_eq!(search.query, "kept");
}

#[tokio::test]
async fn test_every_numeric_kind() {
    let binder = Binder::default();
    for key in Numbers::KEYS {
        let numbers: Numbers = bind(&binder, get(&format!("/n?{key}=42")))
            .await
            .unwrap();
        assert_eq!(numbers.get(key), 42.0, "{key}=42");

        let mut request = get(&format!("/n?{key}="));
        let mut numbers = Numbers::sevens();
        binder
            .decode(&mut request, &NoPathParams, &mut numbers)
            .await
            .unwrap();
        for other in Numbers::KEYS {
            let expected = if other == key { 0.0 } else { 7.0 };
            assert_eq!(numbers.get(other), expected, "{key}= then {other}");
        }
    }
}

#[tokio::test]
async fn test_numeric_kind_out_of_range() {
    let binder = Binder::default();
    for (query, name) in [("i8=128", "i8"), ("u16=-1", "u16"), ("u8=256", "u8")] {
        let err = bind::<Numbers>(&binder, get(&format!("/n?{query}")))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert!(err.to_string().contains(&format!("invalid {name}")), "{query}");
    }
}

#[tokio::test]
async fn test_repeated_scalar_keeps_last() {
    let search: Search = bind(&Binder::default(), get("/search?page=1&page=2"))
        .await
        .unwrap();
    assert_eq!(search.page, 2);
}

#[tokio::test]
async fn test_invalid_query_value() {
    let err = bind::<Search>(&Binder::default(), get("/search?page=abc"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.error_code(), "INVALID_PARAMETER");
    assert_eq!(
        err.to_string(),
        "HTTP 400: invalid page: invalid digit found in string"
    );
}

#[tokio::test]
async fn test_sequences_collect_every_value() {
    let filter: Filter = bind(&Binder::default(), get("/items?tag=a&tag=b+c&ids=1,2&ids=3"))
        .await
        .unwrap();
    assert_eq!(filter.tags, ["a", "b", "c"]);
    assert_eq!(filter.ids, [1, 2, 3]);
}

#[tokio::test]
async fn test_urlencoded_body() {
    let binder = Binder::new(BinderConfig::default().with_json(false));
    let login: FormLogin = bind(&binder, post_form("/login", "user=alice&remember=on"))
        .await
        .unwrap();
    assert_eq!(login.user, "alice");
    assert!(login.remember);
}

#[tokio::test]
async fn test_urlencoded_body_and_query_merge() {
    let search: Search = bind(
        &Binder::default(),
        post_form("/search?page=3", "q=body&active=yes"),
    )
    .await
    .unwrap();
    assert_eq!(search.query, "body");
    assert_eq!(search.page, 3);
    assert!(search.active);
}

#[tokio::test]
async fn test_multipart_body() {
    let request = post_multipart(
        "/search?active=1",
        &[
            ("q", None, "rust"),
            ("page", None, "5"),
            ("upload", Some("notes.txt"), "ignored"),
        ],
    );
    let search: Search = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(search.query, "rust");
    assert_eq!(search.page, 5);
    assert!(search.active);
}

#[tokio::test]
async fn test_multipart_memory_limit() {
    let binder = Binder::new(BinderConfig::default().with_max_multipart_memory(3));
    let request = post_multipart("/search", &[("q", None, "too long")]);
    let err = bind::<Search>(&binder, request).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

// ============================================================================
// JSON bodies
// ============================================================================

#[tokio::test]
async fn test_json_body_with_query() {
    let search: Search = bind(
        &Binder::default(),
        post_json("/search?active=1", r#"{"q":"rust","page":3}"#),
    )
    .await
    .unwrap();
    assert_eq!(search.query, "rust");
    assert_eq!(search.page, 3);
    assert!(search.active);
}

#[tokio::test]
async fn test_json_keys_match_case_insensitively() {
    let search: Search = bind(&Binder::default(), post_json("/search", r#"{"Q":"rust"}"#))
        .await
        .unwrap();
    assert_eq!(search.query, "rust");
}

#[tokio::test]
async fn test_invalid_json_body() {
    let err = bind::<Search>(&Binder::default(), post_json("/search", "{"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.error_code(), "MALFORMED_REQUEST");
    assert!(err.to_string().starts_with("HTTP 400 JSON input: "));
}

#[tokio::test]
async fn test_json_reads_first_value_only() {
    let search: Search = bind(
        &Binder::default(),
        post_json("/search", "{\"q\":\"x\"}\n{}"),
    )
    .await
    .unwrap();
    assert_eq!(search.query, "x");
}

#[tokio::test]
async fn test_empty_json_body() {
    let err = bind::<Search>(&Binder::default(), post_json("/search", " "))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.to_string().starts_with("HTTP 400 JSON input: EOF"));
}

#[tokio::test]
async fn test_json_non_object_body() {
    let err = bind::<Search>(&Binder::default(), post_json("/search", "[1]"))
        .await
        .unwrap_err();
    assert!(err.to_string().contains("cannot decode array"));
}

#[tokio::test]
async fn test_json_field_type_mismatch() {
    let err = bind::<Search>(&Binder::default(), post_json("/search", r#"{"page":"x"}"#))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.to_string().contains("field \"page\""));
}

#[tokio::test]
async fn test_json_ignored_without_body_fields() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header("content-type", "application/json")
        .header("x-token", "abc")
        .body("not json")
        .build()
        .unwrap();
    let record: HeaderOnly = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(record.token, "abc");
}

#[tokio::test]
async fn test_get_ignores_body() {
    let request = Request::builder()
        .uri("/search?q=query")
        .header("content-type", "application/json")
        .body(r#"{"q":"body"}"#)
        .build()
        .unwrap();
    let search: Search = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(search.query, "query");
}

#[tokio::test]
async fn test_json_only_field() {
    let binder = Binder::default();
    let tagged: Tagged = bind(
        &binder,
        post_json("/posts", r#"{"title":"hi","meta":{"owner":"ann"}}"#),
    )
    .await
    .unwrap();
    assert_eq!(tagged.title, "hi");
    assert_eq!(tagged.meta.owner, "ann");

    // Never bound from the query.
    let tagged: Tagged = bind(&binder, get("/posts?meta=x&title=t")).await.unwrap();
    assert_eq!(tagged.meta, Meta::default());
    assert_eq!(tagged.title, "t");
}

#[tokio::test]
async fn test_unknown_fields_allowed_by_default() {
    let search: Search = bind(
        &Binder::default(),
        post_json("/search", r#"{"q":"rust","extra":1}"#),
    )
    .await
    .unwrap();
    assert_eq!(search.query, "rust");
}

#[tokio::test]
async fn test_strict_rejects_unknown_fields() {
    let binder = Binder::default().strict();
    let err = bind::<Search>(&binder, post_json("/search", r#"{"q":"rust","extra":1}"#))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.to_string().contains("unknown field \"extra\""));
}

#[tokio::test]
async fn test_unknown_fields_header_override() {
    let binder = Binder::new(
        BinderConfig::default()
            .with_disallow_unknown_fields(true)
            .with_allow_unknown_fields_header(Some("X-Allow-Unknown")),
    );

    let mut request = post_json("/search", r#"{"q":"rust","extra":1}"#);
    request
        .headers_mut()
        .insert("x-allow-unknown", "true".parse().unwrap());
    let search: Search = bind(&binder, request).await.unwrap();
    assert_eq!(search.query, "rust");

    let mut request = post_json("/search", r#"{"q":"rust","extra":1}"#);
    request
        .headers_mut()
        .insert("x-allow-unknown", "off".parse().unwrap());
    assert!(bind::<Search>(&binder, request).await.is_err());
}

// ============================================================================
// JSON fallback parameter
// ============================================================================

#[tokio::test]
async fn test_fallback_param_decoded_as_json() {
    let search: Search = bind(
        &Binder::default(),
        get("/search?_body=%7B%22q%22%3A%22rust%22%7D&page=2"),
    )
    .await
    .unwrap();
    assert_eq!(search.query, "rust");
    assert_eq!(search.page, 2);
}

#[tokio::test]
async fn test_fallback_applies_after_form_values() {
    let search: Search = bind(
        &Binder::default(),
        get("/search?q=query&_body=%7B%22q%22%3A%22json%22%7D"),
    )
    .await
    .unwrap();
    assert_eq!(search.query, "json");
}

#[tokio::test]
async fn test_fallback_skipped_after_json_body() {
    let search: Search = bind(
        &Binder::default(),
        post_json("/search?_body=%7B%22q%22%3A%22x%22%7D", r#"{"page":1}"#),
    )
    .await
    .unwrap();
    assert_eq!(search.query, "");
    assert_eq!(search.page, 1);
}

#[tokio::test]
async fn test_fallback_empty_is_ignored() {
    let search: Search = bind(&Binder::default(), get("/search?_body=&q=x"))
        .await
        .unwrap();
    assert_eq!(search.query, "x");
}

#[tokio::test]
async fn test_fallback_invalid_json() {
    let err = bind::<Search>(&Binder::default(), get("/search?_body=nope"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_fallback_param_without_json_bodies() {
    let binder = Binder::new(BinderConfig::default().with_json(false));
    let login: Login = bind(&binder, get("/login?_body=%7B%22user%22%3A%22alice%22%7D"))
        .await
        .unwrap();
    assert_eq!(login.user, "alice");

    let request = post_form("/login", "user=bob&_body=%7B%22user%22%3A%22carol%22%7D");
    let login: Login = bind(&binder, request).await.unwrap();
    assert_eq!(login.user, "carol");
}

#[tokio::test]
async fn test_fallback_param_disabled() {
    let binder = Binder::new(BinderConfig::default().with_json_body_fallback_param(None));
    let search: Search = bind(&binder, get("/search?_body=%7B%22q%22%3A%22rust%22%7D"))
        .await
        .unwrap();
    assert_eq!(search.query, "");
}

// ============================================================================
// Media type gating
// ============================================================================

#[tokio::test]
async fn test_disallowed_form_body() {
    let binder = Binder::new(BinderConfig::default().with_form(false));
    let err = bind::<Search>(&binder, post_form("/search", "q=x"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(err.error_code(), "UNSUPPORTED_MEDIA_TYPE");
    assert_eq!(err.message(), "form input not allowed");
}

#[tokio::test]
async fn test_disallowed_json_body() {
    let binder = Binder::new(BinderConfig::default().with_json(false));
    let err = bind::<FormLogin>(&binder, post_json("/login", r#"{"user":"x"}"#))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(err.message(), "JSON input not allowed");
}

#[tokio::test]
async fn test_disallowed_multipart_body() {
    let binder = Binder::new(BinderConfig::default().with_multipart(false));
    let request = post_multipart("/search", &[("q", None, "x")]);
    let err = bind::<Search>(&binder, request).await.unwrap_err();
    assert_eq!(err.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(err.message(), "multipart input not allowed");
}

#[tokio::test]
async fn test_other_content_type_uses_no_values() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/search?q=query")
        .header("content-type", "text/plain")
        .body("q=body")
        .build()
        .unwrap();
    let search: Search = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(search.query, "");
}

// ============================================================================
// Headers, path parameters and cookies
// ============================================================================

#[tokio::test]
async fn test_required_header() {
    let request = Request::builder().header("X-Token", "abc").build().unwrap();
    let record: HeaderOnly = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(record.token, "abc");
}

#[tokio::test]
async fn test_missing_header() {
    let err = bind::<HeaderOnly>(&Binder::default(), get("/"))
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(err.error_code(), "MISSING_HEADER");
    assert_eq!(err.to_string(), "HTTP 400 missing header X-Token");

    // An empty value counts as missing.
    let request = Request::builder().header("x-token", "").build().unwrap();
    let err = bind::<HeaderOnly>(&Binder::default(), request)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "MISSING_HEADER");
}

#[tokio::test]
async fn test_optional_headers() {
    let binder = Binder::default();
    let record: Tracing = bind(&binder, get("/")).await.unwrap();
    assert_eq!(record.request_id, "");
    assert_eq!(record.retries, None);
    assert_eq!(record.note, "");

    let request = Request::builder()
        .header("x-request-id", "req-1")
        .header("x-retries", "3")
        .build()
        .unwrap();
    let record: Tracing = bind(&binder, request).await.unwrap();
    assert_eq!(record.request_id, "req-1");
    assert_eq!(record.retries, Some(3));
}

#[tokio::test]
async fn test_invalid_header_value() {
    let request = Request::builder().header("x-retries", "many").build().unwrap();
    let err = bind::<Tracing>(&Binder::default(), request)
        .await
        .unwrap_err();
    assert_eq!(err.error_code(), "INVALID_PARAMETER");
    assert!(err.to_string().contains("invalid X-Retries"));
}

#[tokio::test]
async fn test_non_text_header_value() {
    let request = Request::builder()
        .header_bytes("x-token", b"\xff\xfe")
        .build()
        .unwrap();
    let err = bind::<HeaderOnly>(&Binder::default(), request)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.to_string().contains("invalid header X-Token"));
}

#[tokio::test]
async fn test_path_params() {
    let params: Params = [("org", "acme"), ("id", "7")].into_iter().collect();
    let member: Member = bind_with(&Binder::default(), get("/orgs/acme/members/7"), &params)
        .await
        .unwrap();
    assert_eq!(member.org, "acme");
    assert_eq!(member.id, 7);
    assert_eq!(member.tab, "");
}

#[tokio::test]
async fn test_path_params_from_hash_map() {
    let params: HashMap<String, String> = [
        ("org".to_owned(), "acme".to_owned()),
        ("id".to_owned(), "9".to_owned()),
        ("tab".to_owned(), "roles".to_owned()),
    ]
    .into_iter()
    .collect();
    let member: Member = bind_with(&Binder::default(), get("/"), &params)
        .await
        .unwrap();
    assert_eq!(member.id, 9);
    assert_eq!(member.tab, "roles");
}

#[tokio::test]
async fn test_invalid_path_param() {
    let params: Params = [("org", "acme"), ("id", "seven")].into_iter().collect();
    let err = bind_with::<Member, _>(&Binder::default(), get("/"), &params)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.to_string().contains("invalid id"));
}

#[tokio::test]
#[should_panic(expected = "missing path parameter \"id\" (got 1 path params: org)")]
async fn test_missing_path_param_is_contract_violation() {
    let params: Params = [("org", "acme")].into_iter().collect();
    let _ = bind_with::<Member, _>(&Binder::default(), get("/"), &params).await;
}

#[tokio::test]
async fn test_repeated_cookie_last_wins() {
    let request = Request::builder()
        .header("cookie", "session=abc; theme=dark")
        .header("cookie", "session=other")
        .build()
        .unwrap();
    let session: Session = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(session.session, "other");
    assert_eq!(session.theme, "dark");

    let request = Request::builder()
        .header("cookie", "session=1; session=2")
        .build()
        .unwrap();
    let session: Session = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(session.session, "2");
}

#[tokio::test]
async fn test_absent_cookie_keeps_value() {
    let binder = Binder::default();
    let mut request = Request::builder().header("cookie", "session=abc").build().unwrap();
    let mut session = Session {
        session: String::new(),
        theme: "light".into(),
    };
    binder
        .decode(&mut request, &NoPathParams, &mut session)
        .await
        .unwrap();
    assert_eq!(session.session, "abc");
    assert_eq!(session.theme, "light");
}

// ============================================================================
// Request-derived values
// ============================================================================

#[tokio::test]
async fn test_request_derived_values() {
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/items?x=1")
        .header("x-a", "b")
        .build()
        .unwrap();
    let envelope: Envelope = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(envelope.method, "PUT");
    assert!(envelope.is_save);
    assert_eq!(envelope.uri.path(), "/items");
    assert_eq!(envelope.headers.get("x-a").unwrap(), "b");
    assert_eq!(envelope.query.get("x"), Some("1"));
    assert_eq!(envelope.head.method(), Method::PUT);
}

#[tokio::test]
async fn test_issave_false_for_reads() {
    let envelope: Envelope = bind(&Binder::default(), get("/items"))
        .await
        .unwrap();
    assert_eq!(envelope.method, "GET");
    assert!(!envelope.is_save);
    assert!(envelope.query.is_empty());
}

#[tokio::test]
async fn test_raw_body_alongside_json() {
    let body = r#"{"name":"x"}"#;
    let signed: Signed = bind(&Binder::default(), post_json("/sign", body))
        .await
        .unwrap();
    assert_eq!(signed.name, "x");
    assert_eq!(signed.raw, Bytes::from_static(body.as_bytes()));
}

#[tokio::test]
async fn test_buffered_body_stays_readable() {
    let body = r#"{"name":"x"}"#;
    let mut request = post_json("/sign", body);
    let mut signed = Signed::default();
    Binder::default()
        .decode(&mut request, &NoPathParams, &mut signed)
        .await
        .unwrap();
    assert_eq!(signed.name, "x");

    let rest = request.take_body().collect().await.unwrap();
    assert_eq!(rest, body);
}

#[tokio::test]
async fn test_raw_body_text_and_bytes() {
    let request = Request::builder()
        .method(Method::POST)
        .header("content-type", "text/plain")
        .body("hello")
        .build()
        .unwrap();
    let raw: RawText = bind(&Binder::default(), request).await.unwrap();
    assert_eq!(raw.text, "hello");
    assert_eq!(raw.bytes, b"hello");
}

#[tokio::test]
async fn test_raw_body_text_must_be_utf8() {
    let request = Request::builder()
        .method(Method::POST)
        .body(vec![0xff, 0xfe])
        .build()
        .unwrap();
    let err = bind::<RawText>(&Binder::default(), request)
        .await
        .unwrap_err();
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    assert!(err.to_string().contains("raw body"));
}

#[tokio::test]
async fn test_full_body_with_sibling_field() {
    let document: Document = bind(
        &Binder::default(),
        post_json("/docs", r#"{"kind":"note","text":"hi"}"#),
    )
    .await
    .unwrap();
    assert_eq!(document.kind, "note");
    assert_eq!(
        document.document,
        serde_json::json!({"kind": "note", "text": "hi"})
    );
}

#[tokio::test]
async fn test_full_body_absent_is_null() {
    let document: Document = bind(&Binder::default(), get("/docs?kind=memo"))
        .await
        .unwrap();
    assert_eq!(document.kind, "memo");
    assert!(document.document.is_null());
}

// ============================================================================
// Embedded records and custom types
// ============================================================================

#[tokio::test]
async fn test_flattened_fields() {
    let binder = Binder::default();
    let list: ListUsers = bind(&binder, get("/users?role=admin&page=2&per_page=50"))
        .await
        .unwrap();
    assert_eq!(list.role, "admin");
    assert_eq!(list.paging.page, 2);
    assert_eq!(list.paging.per_page, 50);

    let list: ListUsers = bind(&binder, post_json("/users", r#"{"page":3}"#))
        .await
        .unwrap();
    assert_eq!(list.paging.page, 3);
}

#[tokio::test]
async fn test_text_codec_field() {
    let binder = Binder::default();
    let reading: Reading = bind(&binder, get("/readings?temp=21C")).await.unwrap();
    assert_eq!(reading.temp, Celsius(21));
    assert_eq!(binder.to_query(&reading).get("temp"), Some("21C"));

    let err = bind::<Reading>(&binder, get("/readings?temp=hot"))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "HTTP 400: invalid temp: \"hot\" is not a temperature"
    );
}

#[tokio::test]
async fn test_from_http_request() {
    let request = http::Request::builder()
        .method(Method::POST)
        .uri("/search?page=4")
        .header("content-type", "application/json")
        .body(Bytes::from_static(br#"{"q":"rust"}"#))
        .unwrap();
    let search: Search = bind(Binder::global(), Request::from(request))
        .await
        .unwrap();
    assert_eq!(search.query, "rust");
    assert_eq!(search.page, 4);
}

#[tokio::test]
async fn test_error_response() {
    let err = bind::<HeaderOnly>(&Binder::default(), get("/"))
        .await
        .unwrap_err();
    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = serde_json::from_slice(response.body()).unwrap();
    assert_eq!(body["error"]["code"], "MISSING_HEADER");
}
