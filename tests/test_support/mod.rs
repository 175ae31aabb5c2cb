// Copyright 2025 The Drasi Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shared helpers for HTTP-level tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use device_registry::{build_app, DeviceService, DeviceStore, MemoryDeviceStore, NewApiUser};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

/// Router over a memory store seeded with one location and one API user.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryDeviceStore>,
    pub location_id: i64,
    pub api_user_id: i64,
}

impl TestApp {
    pub async fn new() -> Self {
        let store = Arc::new(MemoryDeviceStore::new());
        let location = store.insert_location("HQ".to_string()).await.unwrap();
        let api_user = store
            .insert_api_user(NewApiUser {
                name: "ops".to_string(),
                email: "ops@example.com".to_string(),
                password: "secret".to_string(),
            })
            .await
            .unwrap();

        let router = build_app(Arc::new(DeviceService::new(store.clone())));
        Self {
            router,
            store,
            location_id: location.id,
            api_user_id: api_user.id,
        }
    }

    /// A complete device body referencing the seeded rows.
    pub fn device_body(&self, name: &str) -> Value {
        json!({
            "name": name,
            "device_type": "camera",
            "login": "admin",
            "password": "p",
            "location_id": self.location_id,
            "api_user_id": self.api_user_id,
        })
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };
        self.send_request(request).await
    }

    pub async fn send_request(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()));
        (status, body)
    }

    pub async fn create_device(&self, name: &str) -> Value {
        let (status, body) = self
            .send("POST", "/devices/", Some(self.device_body(name)))
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {body}");
        body
    }
}
