use crate::ops::service::{DeployError, DeployService};
use crate::server::api;

pub struct HttpResponse {
    pub status_code: u16,
    pub status_text: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

impl HttpResponse {
    pub fn to_http_string(&self) -> String {
        format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            self.status_code,
            self.status_text,
            self.content_type,
            self.body.len(),
            self.body
        )
    }
}

pub fn route_request(
    service: &DeployService,
    method: &str,
    path: &str,
    body: &str,
) -> HttpResponse {
    match (method, path) {
        ("GET", "/api/health") => match api::health_payload() {
            Ok(payload) => ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", "internal", &err.to_string()),
        },
        ("GET", "/api/missions") => match api::missions_payload(service) {
            Ok(payload) => ok_json(payload),
            Err(err) => error_response(500, "Internal Server Error", "internal", &err.to_string()),
        },
        ("GET", "/api/operatives") => match api::operatives_payload(service) {
            Ok(payload) => ok_json(payload),
            Err(err) => deploy_error_response(err),
        },
        ("GET", "/api/deployments") => match api::deployments_payload(service) {
            Ok(payload) => ok_json(payload),
            Err(err) => deploy_error_response(err),
        },
        ("POST", "/api/deploy") => match api::deploy_payload(service, body) {
            Ok(payload) => ok_json(payload),
            Err(err) => deploy_error_response(err),
        },
        ("POST", "/api/assess") => match api::assess_payload(service, body) {
            Ok(payload) => ok_json(payload),
            Err(err) => deploy_error_response(err),
        },
        (method, path) if path.starts_with("/api/deployments/") => {
            let rest = path.trim_start_matches("/api/deployments/");
            let mut segments = rest.split('/');
            let id = segments.next().unwrap_or("");
            let action = segments.next();
            match (method, action) {
                ("GET", None) => match api::status_payload(service, id) {
                    Ok(payload) => ok_json(payload),
                    Err(err) => status_error_response(err),
                },
                ("POST", Some("abandon")) => match api::abandon_payload(service, id) {
                    Ok(payload) => ok_json(payload),
                    Err(err) => status_error_response(err),
                },
                ("POST", Some("complete")) => match api::complete_payload(service, id) {
                    Ok(payload) => ok_json(payload),
                    Err(err) => status_error_response(err),
                },
                _ => error_response(404, "Not Found", "not_found", "Route not found"),
            }
        }
        _ => error_response(404, "Not Found", "not_found", "Route not found"),
    }
}

fn ok_json(body: String) -> HttpResponse {
    HttpResponse {
        status_code: 200,
        status_text: "OK",
        content_type: "application/json",
        body,
    }
}

fn deploy_error_response(err: api::DeployPayloadError) -> HttpResponse {
    match err {
        api::DeployPayloadError::Parse(err) => error_response(
            400,
            "Bad Request",
            "invalid_body",
            &format!("Invalid request body: {err}"),
        ),
        api::DeployPayloadError::Validation(validation) => {
            validation_error_response(400, "Bad Request", validation)
        }
        api::DeployPayloadError::Deploy(err) => {
            let (status_code, status_text) = match &err {
                DeployError::MissionNotFound(_) | DeployError::OperativeNotFound(_) => {
                    (404, "Not Found")
                }
                DeployError::InvalidApproach(_) => (400, "Bad Request"),
                DeployError::ResourceBusy
                | DeployError::AlreadyInProgress
                | DeployError::PrerequisiteNotMet { .. } => (409, "Conflict"),
                DeployError::Store(_) => (500, "Internal Server Error"),
            };
            error_response(status_code, status_text, err.kind(), &err.to_string())
        }
        api::DeployPayloadError::Serialize(err) => {
            error_response(500, "Internal Server Error", "internal", &err.to_string())
        }
    }
}

fn status_error_response(err: api::StatusPayloadError) -> HttpResponse {
    match err {
        api::StatusPayloadError::InvalidId(raw) => error_response(
            400,
            "Bad Request",
            "invalid_id",
            &format!("'{raw}' is not a deployment id"),
        ),
        api::StatusPayloadError::Status(err) => {
            let (status_code, status_text) = match &err {
                crate::ops::service::StatusError::DeploymentNotFound(_) => (404, "Not Found"),
                crate::ops::service::StatusError::Store(_) => (500, "Internal Server Error"),
            };
            error_response(status_code, status_text, err.kind(), &err.to_string())
        }
        api::StatusPayloadError::Serialize(err) => {
            error_response(500, "Internal Server Error", "internal", &err.to_string())
        }
    }
}

fn validation_error_response(
    status_code: u16,
    status_text: &'static str,
    payload: api::ValidationErrorResponse,
) -> HttpResponse {
    let fallback =
        "{\n  \"status\": \"error\",\n  \"message\": \"Validation failed\"\n}".to_string();

    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&payload).unwrap_or(fallback),
    }
}

fn error_response(
    status_code: u16,
    status_text: &'static str,
    kind: &str,
    message: &str,
) -> HttpResponse {
    let body = serde_json::json!({
        "status": "error",
        "error": kind,
        "message": message,
    });
    HttpResponse {
        status_code,
        status_text,
        content_type: "application/json",
        body: serde_json::to_string_pretty(&body).unwrap_or_else(|_| {
            "{\n  \"status\": \"error\",\n  \"message\": \"Unknown error\"\n}".to_string()
        }),
    }
}
