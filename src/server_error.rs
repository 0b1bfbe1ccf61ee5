use actix_web::{HttpResponse, error, http::StatusCode};
use derive_more::derive::{Display, Error};

#[derive(Debug, Display, Error)]
#[display("Error: **{code}** {message} (details: {additional_information})")]
pub struct ServerError {
    pub code: StatusCode,
    pub message: String,
    /// Kept for the server log only, never sent to the client.
    pub additional_information: String,
}

impl ServerError {
    /// The one client-visible failure of `POST /temp`, whatever went wrong.
    pub fn bad_request(additional_information: impl Into<String>) -> Self {
        Self {
            code: StatusCode::BAD_REQUEST,
            message: String::from("bad request"),
            additional_information: additional_information.into(),
        }
    }
}

impl error::ResponseError for ServerError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": self.message }))
    }

    fn status_code(&self) -> StatusCode {
        self.code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{ResponseError, body::to_bytes};

    #[actix_web::test]
    async fn bad_request_hides_details() {
        let err = ServerError::bad_request("device id \"x\" is not an integer");

        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

        let body = to_bytes(err.error_response().into_body()).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, serde_json::json!({ "error": "bad request" }));
    }

    #[test]
    fn display_keeps_details_for_logs() {
        let err = ServerError::bad_request("expected 4 ':'-separated fields, got 1");

        assert!(err.to_string().contains("got 1"));
    }
}
