use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
};
use schoolhub_core::AppError;
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

fn format_errors(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{} is invalid", field))
            })
        })
        .collect();
    // field_errors() is a HashMap; sort for a stable message
    messages.sort();
    messages.join(", ")
}

fn rejection_to_error(rejection: JsonRejection) -> AppError {
    if matches!(rejection, JsonRejection::MissingJsonContentType(_)) {
        return AppError::bad_request(anyhow!(
            "Missing 'Content-Type: application/json' header"
        ));
    }

    let error_msg = rejection.body_text();

    if error_msg.contains("missing field") {
        let field = error_msg
            .split("missing field `")
            .nth(1)
            .and_then(|s| s.split('`').next())
            .unwrap_or("unknown");
        return AppError::bad_request(anyhow!("{} is required", field));
    }

    if error_msg.contains("invalid type") {
        return AppError::bad_request(anyhow!("Invalid field type in request"));
    }

    AppError::bad_request(anyhow!("Invalid request body"))
}

/// JSON body extractor that runs `validator` rules after deserializing.
///
/// Shape problems are 400, rule violations are 422.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate().map_err(|errors| {
            AppError::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                anyhow!("{}", format_errors(&errors)),
            )
        })?;

        Ok(ValidatedJson(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, Validate)]
    struct Payload {
        #[validate(length(min = 3, message = "name must be at least 3 characters"))]
        name: String,
        #[validate(range(min = 1))]
        copies: i32,
    }

    fn json_request(body: &str) -> Request {
        http::Request::builder()
            .method("POST")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn extract(req: Request) -> Result<ValidatedJson<Payload>, AppError> {
        ValidatedJson::<Payload>::from_request(req, &()).await
    }

    #[tokio::test]
    async fn test_valid_payload() {
        let ValidatedJson(payload) = extract(json_request(r#"{"name":"Hobbit","copies":2}"#))
            .await
            .unwrap();
        assert_eq!(payload.name, "Hobbit");
        assert_eq!(payload.copies, 2);
    }

    #[tokio::test]
    async fn test_missing_field() {
        let err = extract(json_request(r#"{"name":"Hobbit"}"#)).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "copies is required");
    }

    #[tokio::test]
    async fn test_invalid_type() {
        let err = extract(json_request(r#"{"name":"Hobbit","copies":"two"}"#))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error.to_string(), "Invalid field type in request");
    }

    #[tokio::test]
    async fn test_missing_content_type() {
        let req = http::Request::builder()
            .method("POST")
            .body(Body::from(r#"{"name":"Hobbit","copies":2}"#))
            .unwrap();
        let err = extract(req).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert!(err.error.to_string().contains("Content-Type"));
    }

    #[tokio::test]
    async fn test_validation_failures_are_unprocessable() {
        let err = extract(json_request(r#"{"name":"Ab","copies":0}"#))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
        let message = err.error.to_string();
        assert!(message.contains("name must be at least 3 characters"));
        assert!(message.contains("copies is invalid"));
    }
}
