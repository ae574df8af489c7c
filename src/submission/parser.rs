use axum::http::HeaderMap;
use serde_json::Value;

use crate::forms::RawFields;

/// Parse a request body based on Content-Type header.
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<RawFields, String> {
    let ct = content_type.unwrap_or("application/x-www-form-urlencoded");

    if ct.contains("application/json") {
        parse_json(body)
    } else if ct.contains("application/x-www-form-urlencoded") {
        parse_form_urlencoded(body)
    } else if ct.contains("multipart/form-data") {
        Err("multipart".to_string())
    } else {
        // Try form-urlencoded first, then JSON
        parse_form_urlencoded(body)
            .or_else(|_| parse_json(body))
            .map_err(|e| format!("Unable to parse body: {e}"))
    }
}

fn parse_form_urlencoded(body: &[u8]) -> Result<RawFields, String> {
    std::str::from_utf8(body).map_err(|e| format!("Invalid UTF-8: {e}"))?;

    Ok(form_urlencoded::parse(body)
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

fn parse_json(body: &[u8]) -> Result<RawFields, String> {
    let value: Value = serde_json::from_slice(body).map_err(|e| format!("Invalid JSON: {e}"))?;
    let Value::Object(obj) = value else {
        return Err("Expected a JSON object".to_string());
    };

    let mut raw = RawFields::new();
    for (key, value) in obj {
        let name = key.strip_suffix("[]").unwrap_or(key.as_str()).to_string();
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(s) = scalar_to_string(item) {
                        raw.push(name.clone(), s);
                    }
                }
            }
            other => {
                if let Some(s) = scalar_to_string(other) {
                    raw.set(name, s);
                }
            }
        }
    }
    Ok(raw)
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse multipart form data using multer. File parts are skipped.
pub async fn parse_multipart(headers: &HeaderMap, body: bytes::Bytes) -> Result<RawFields, String> {
    let boundary = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .and_then(|ct| multer::parse_boundary(ct).ok())
        .ok_or_else(|| "Missing multipart boundary".to_string())?;

    let stream = futures_util::stream::once(async { Ok::<_, std::io::Error>(body) });
    let mut multipart = multer::Multipart::new(stream, boundary);

    let mut raw = RawFields::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Multipart error: {e}"))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        let value = field
            .text()
            .await
            .map_err(|e| format!("Field read error: {e}"))?;
        raw.insert_pair(&name, value);
    }

    Ok(raw)
}
