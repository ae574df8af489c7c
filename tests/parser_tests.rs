use std::net::IpAddr;

use axum::http::{HeaderMap, HeaderValue};
use ipnet::IpNet;

use formdesk::forms::RawFields;
use formdesk::models::FieldValue;
use formdesk::submission::honeypot::is_spam;
use formdesk::submission::metadata::extract;
use formdesk::submission::parser::{parse_body, parse_multipart};

// ── Body parsing ────────────────────────────────────────────────

#[test]
fn urlencoded_is_the_default() {
    let raw = parse_body(None, b"first_name=Ada&message=a%26b+c").unwrap();
    assert_eq!(raw.len(), 2);
    assert_eq!(raw.text("first_name"), Some("Ada"));
    assert_eq!(raw.text("message"), Some("a&b c"));
}

#[test]
fn urlencoded_bracket_keys_become_lists() {
    let raw = parse_body(
        Some("application/x-www-form-urlencoded; charset=UTF-8"),
        b"services_needed%5B%5D=Respite&services_needed%5B%5D=Meals&reason=x",
    )
    .unwrap();

    assert_eq!(
        raw.get("services_needed"),
        Some(&FieldValue::List(vec!["Respite".to_string(), "Meals".to_string()]))
    );
    assert_eq!(raw.list("reason"), vec!["x"]);
}

#[test]
fn repeated_plain_key_keeps_last_value() {
    let raw = parse_body(None, b"email=a%40example.com&email=b%40example.com").unwrap();
    assert_eq!(raw.text("email"), Some("b@example.com"));
}

#[test]
fn json_objects_are_accepted() {
    let body = br#"{
        "form_type": "referral",
        "math_answer": 5,
        "consent": true,
        "services_needed": ["Respite", 3, null],
        "ignored": null
    }"#;
    let raw = parse_body(Some("application/json"), body).unwrap();

    assert_eq!(raw.text("form_type"), Some("referral"));
    assert_eq!(raw.text("math_answer"), Some("5"));
    assert_eq!(raw.text("consent"), Some("true"));
    assert_eq!(raw.list("services_needed"), vec!["Respite", "3"]);
    assert!(raw.get("ignored").is_none());
}

#[test]
fn json_must_be_an_object() {
    assert!(parse_body(Some("application/json"), b"[1,2]").is_err());
    assert!(parse_body(Some("application/json"), b"{not json").is_err());
}

#[test]
fn invalid_utf8_is_rejected() {
    assert!(parse_body(None, &[b'a', b'=', 0xff, 0xfe]).is_err());
}

#[test]
fn empty_body_has_no_fields() {
    let raw = parse_body(None, b"").unwrap();
    assert!(raw.is_empty());
    assert_eq!(raw, RawFields::new());
}

#[tokio::test]
async fn multipart_skips_files() {
    let boundary = "XyZboundary";
    let body = format!(
        "--{boundary}\r\n\
         Content-Disposition: form-data; name=\"first_name\"\r\n\r\n\
         Ada\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"services_needed[]\"\r\n\r\n\
         Respite\r\n\
         --{boundary}\r\n\
         Content-Disposition: form-data; name=\"upload\"; filename=\"a.txt\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         secret\r\n\
         --{boundary}--\r\n"
    );

    let mut headers = HeaderMap::new();
    headers.insert(
        "content-type",
        HeaderValue::from_str(&format!("multipart/form-data; boundary={boundary}")).unwrap(),
    );

    let raw = parse_multipart(&headers, body.into()).await.unwrap();
    assert_eq!(raw.text("first_name"), Some("Ada"));
    assert_eq!(raw.list("services_needed"), vec!["Respite"]);
    assert!(raw.get("upload").is_none());
}

#[tokio::test]
async fn multipart_without_boundary_fails() {
    let mut headers = HeaderMap::new();
    headers.insert("content-type", HeaderValue::from_static("multipart/form-data"));
    assert!(parse_multipart(&headers, "".into()).await.is_err());
}

// ── Client metadata ─────────────────────────────────────────────

fn forwarded(xff: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-forwarded-for", HeaderValue::from_str(xff).unwrap());
    headers.insert("user-agent", HeaderValue::from_static("Mozilla/5.0"));
    headers
}

fn proxies() -> Vec<IpNet> {
    vec!["10.0.0.0/8".parse().unwrap()]
}

#[test]
fn peer_address_without_trusted_proxies() {
    let peer: IpAddr = "203.0.113.7".parse().unwrap();
    let meta = extract(&forwarded("198.51.100.1"), Some(peer), &[]);
    assert_eq!(meta.ip, "203.0.113.7");
    assert_eq!(meta.user_agent, "Mozilla/5.0");
}

#[test]
fn forwarded_header_ignored_from_untrusted_peer() {
    let peer: IpAddr = "203.0.113.7".parse().unwrap();
    let meta = extract(&forwarded("198.51.100.1"), Some(peer), &proxies());
    assert_eq!(meta.ip, "203.0.113.7");
}

#[test]
fn first_untrusted_hop_from_the_right() {
    let peer: IpAddr = "10.0.0.2".parse().unwrap();
    let meta = extract(
        &forwarded("1.2.3.4, 198.51.100.1, 10.0.0.5"),
        Some(peer),
        &proxies(),
    );
    assert_eq!(meta.ip, "198.51.100.1");
}

#[test]
fn all_hops_trusted_falls_back_to_peer() {
    let peer: IpAddr = "10.0.0.2".parse().unwrap();
    let meta = extract(&forwarded("10.1.1.1, garbage"), Some(peer), &proxies());
    assert_eq!(meta.ip, "10.0.0.2");
}

#[test]
fn missing_user_agent_is_empty() {
    let meta = extract(&HeaderMap::new(), None, &[]);
    assert_eq!(meta.ip, "127.0.0.1");
    assert_eq!(meta.user_agent, "");
}

// ── Honeypot ────────────────────────────────────────────────────

#[test]
fn honeypot_only_when_configured_and_filled() {
    let filled: RawFields = [("website", "http://spam.example")].into_iter().collect();
    let blank: RawFields = [("website", "")].into_iter().collect();

    assert!(is_spam(&filled, Some("website")));
    assert!(!is_spam(&blank, Some("website")));
    assert!(!is_spam(&RawFields::new(), Some("website")));
    assert!(!is_spam(&filled, None));
    assert!(!is_spam(&filled, Some("")));
}
