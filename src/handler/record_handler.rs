use std::sync::Arc;

use serde_json::{Map, Value, json};

use crate::service::{RecordService, ServiceError};

use super::response::Response;

const MISSING_KEY: &str = "Missing 'key' parameter";

/// Maps record service results onto response envelopes.
#[derive(Clone)]
pub struct Handler {
    service: Arc<RecordService>,
}

impl Handler {
    pub fn new(service: Arc<RecordService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<RecordService> {
        &self.service
    }

    /// Merge a JSON object body into the document.
    pub async fn add(&self, body: Option<&str>) -> Response {
        let Some(body) = body else {
            return Response::error(400, "Invalid JSON format", None);
        };

        match self.service.add(body).await {
            Ok(()) => Response::message(201, "Data saved successfully"),
            Err(e @ ServiceError::InvalidInput(_)) => {
                Response::error(e.status_code(), "Invalid JSON format", None)
            }
            Err(e @ ServiceError::WriteAborted(_)) => {
                Response::error(e.status_code(), "Failed to fetch existing data", e.details())
            }
            Err(e) => Response::error(e.status_code(), "Failed to save data", e.details()),
        }
    }

    /// Read the value at a dotted key. The body is `{key: value}`.
    pub async fn read(&self, key: Option<&str>) -> Response {
        let Some(key) = present_key(key) else {
            return Response::error(400, MISSING_KEY, None);
        };

        match self.service.read(key).await {
            Ok(value) => {
                let mut body = Map::new();
                body.insert(key.to_string(), value);
                Response::new(200, Value::Object(body))
            }
            Err(ref e @ ServiceError::InvalidInput(ref reason)) => {
                Response::error(e.status_code(), "Invalid 'key' parameter", Some(reason.clone()))
            }
            Err(e @ ServiceError::NotFound(_)) => not_found(&e, key),
            Err(e) => Response::error(e.status_code(), "Failed to retrieve data", e.details()),
        }
    }

    /// Remove a top-level field.
    pub async fn delete(&self, key: Option<&str>) -> Response {
        let Some(key) = present_key(key) else {
            return Response::error(400, MISSING_KEY, None);
        };

        match self.service.delete(key).await {
            Ok(()) => Response::message(200, format!("Key \"{}\" deleted successfully", key)),
            Err(e @ ServiceError::InvalidInput(_)) => {
                Response::error(e.status_code(), MISSING_KEY, None)
            }
            Err(e @ ServiceError::NotFound(_)) => not_found(&e, key),
            Err(e) => Response::error(e.status_code(), "Failed to delete key", e.details()),
        }
    }

    /// Remove every cache entry in the namespace.
    pub async fn clear_cache(&self) -> Response {
        match self.service.flush().await {
            Ok(cleared) => Response::new(
                200,
                json!({
                    "message": "All service_data cache cleared successfully",
                    "cleared": cleared,
                }),
            ),
            Err(e) => Response::error(e.status_code(), "Failed to clear cache", e.details()),
        }
    }

    /// The whole document.
    pub async fn dump(&self) -> Response {
        match self.service.snapshot().await {
            Ok(doc) => Response::new(200, Value::Object(doc)),
            Err(e) => Response::error(e.status_code(), "Failed to retrieve data", e.details()),
        }
    }
}

fn present_key(key: Option<&str>) -> Option<&str> {
    key.filter(|k| !k.trim().is_empty())
}

fn not_found(e: &ServiceError, key: &str) -> Response {
    Response::error(e.status_code(), format!("Key \"{}\" not found in data", key), None)
}
