use serde_json::Value;

/// Return true when a parsed response body is the platform's
/// authentication-expired error document.
///
/// The platform emits two shapes, both independent of the HTTP status:
/// a `ResponseError` whose cause message is exactly "JWT expired", and a
/// `ResponseError` whose top-level message mentions "JWTExpired".
pub fn is_jwt_expired(body: &Value) -> bool {
    let Some(error) = body.get("error") else {
        return false;
    };
    if error.get("name").and_then(Value::as_str) != Some("ResponseError") {
        return false;
    }
    let cause_expired = error
        .get("cause")
        .and_then(|cause| cause.get("message"))
        .and_then(Value::as_str)
        == Some("JWT expired");
    let message_expired = error
        .get("message")
        .and_then(Value::as_str)
        .map(|message| message.contains("JWTExpired"))
        .unwrap_or(false);
    cause_expired || message_expired
}
