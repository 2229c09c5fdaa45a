//! In-memory stand-in for the Scalr API, served through wiremock
//!
//! Records live in a shared store keyed by collection and keep creation
//! order. Lists honour `page[number]`, `page[size]`, `filter[...]` and
//! `include`; create/update/delete behave like the real service closely
//! enough to check round trips, partial updates and not-found handling.

#![allow(dead_code)]

use scalr_core::{ClientConfig, ScalrClient};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN: &str = "test-token";
pub const BASE_PATH: &str = "/api/iacp/v3/";
const MEDIA_TYPE: &str = "application/vnd.api+json";
const CREATED_AT: &str = "2024-01-01T00:00:00Z";

/// Reference to another record, in relationship form
pub fn one(kind: &str, id: &str) -> Value {
    json!({"data": {"type": kind, "id": id}})
}

pub fn many(kind: &str, ids: &[&str]) -> Value {
    let data: Vec<Value> = ids.iter().map(|id| json!({"type": kind, "id": id})).collect();
    json!({ "data": data })
}

#[derive(Default)]
struct Store {
    counter: u64,
    records: BTreeMap<String, Vec<Value>>,
}

fn id_prefix(collection: &str) -> &'static str {
    match collection {
        "workspaces" => "ws",
        "environments" => "env",
        "teams" => "team",
        "users" => "user",
        "policy-groups" => "pgrp",
        "account-users" => "au",
        "accounts" => "acc",
        "vcs-providers" => "vcs",
        _ => "res",
    }
}

fn respond(status: u16, body: Value) -> ResponseTemplate {
    let bytes = serde_json::to_vec(&body).expect("fake response serializes");
    ResponseTemplate::new(status).set_body_raw(bytes, MEDIA_TYPE)
}

fn error(status: u16, title: &str, detail: &str) -> ResponseTemplate {
    respond(
        status,
        json!({"errors": [{"status": status.to_string(), "title": title, "detail": detail}]}),
    )
}

fn param<'a>(query: &'a [(String, String)], key: &str) -> Option<&'a str> {
    query
        .iter()
        .find(|(k, _)| k == key)
        .map(|(_, v)| v.as_str())
}

fn related_ids(record: &Value, name: &str) -> Vec<(String, String)> {
    let identifier = |v: &Value| {
        Some((
            v.get("type")?.as_str()?.to_string(),
            v.get("id")?.as_str()?.to_string(),
        ))
    };
    match record.pointer(&format!("/relationships/{name}/data")) {
        Some(Value::Array(items)) => items.iter().filter_map(identifier).collect(),
        Some(value @ Value::Object(_)) => identifier(value).into_iter().collect(),
        _ => Vec::new(),
    }
}

fn matches_filters(record: &Value, query: &[(String, String)]) -> bool {
    query.iter().all(|(key, expected)| {
        let Some(name) = key
            .strip_prefix("filter[")
            .and_then(|rest| rest.strip_suffix(']'))
        else {
            return true;
        };
        if let Some(value) = record.pointer(&format!("/attributes/{name}")) {
            return match value {
                Value::String(s) => s == expected,
                other => other.to_string() == *expected,
            };
        }
        related_ids(record, name).iter().any(|(_, id)| id == expected)
    })
}

impl Store {
    fn collection(&self, collection: &str) -> &[Value] {
        self.records
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn find(&self, collection: &str, id: &str) -> Option<&Value> {
        self.collection(collection)
            .iter()
            .find(|r| r["id"] == id)
    }

    fn insert(&mut self, collection: &str, mut record: Value) -> String {
        self.counter += 1;
        let id = format!("{}-{:06x}", id_prefix(collection), self.counter);
        record["id"] = json!(id);
        record["type"] = json!(collection);
        self.records
            .entry(collection.to_string())
            .or_default()
            .push(record);
        id
    }

    fn included(&self, data: &[Value], query: &[(String, String)]) -> Vec<Value> {
        let Some(include) = param(query, "include") else {
            return Vec::new();
        };
        let mut included: Vec<Value> = Vec::new();
        for record in data {
            for name in include.split(',') {
                for (kind, id) in related_ids(record, name) {
                    if let Some(found) = self.find(&kind, &id)
                        && !included.contains(found)
                    {
                        included.push(found.clone());
                    }
                }
            }
        }
        included
    }

    fn list(&self, collection: &str, query: &[(String, String)]) -> ResponseTemplate {
        let number = param(query, "page[number]")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(1)
            .max(1);
        let size = param(query, "page[size]")
            .and_then(|v| v.parse::<usize>().ok())
            .unwrap_or(10)
            .clamp(1, 100);

        let matching: Vec<&Value> = self
            .collection(collection)
            .iter()
            .filter(|r| matches_filters(r, query))
            .collect();
        let total = matching.len();
        let total_pages = total.div_ceil(size);
        let data: Vec<Value> = matching
            .into_iter()
            .skip((number - 1) * size)
            .take(size)
            .cloned()
            .collect();
        let included = self.included(&data, query);
        let next = if number < total_pages {
            json!(number + 1)
        } else {
            Value::Null
        };
        let prev = if number > 1 {
            json!(number - 1)
        } else {
            Value::Null
        };

        respond(
            200,
            json!({
                "data": data,
                "included": included,
                "meta": {"pagination": {
                    "current-page": number,
                    "prev-page": prev,
                    "next-page": next,
                    "total-pages": total_pages,
                    "total-count": total
                }}
            }),
        )
    }

    fn read(&self, collection: &str, id: &str, query: &[(String, String)]) -> ResponseTemplate {
        match self.find(collection, id) {
            Some(record) => {
                let included = self.included(std::slice::from_ref(record), query);
                respond(200, json!({"data": record, "included": included}))
            }
            None => error(404, "Not Found", &format!("{collection} with ID '{id}' not found")),
        }
    }

    fn validate_name(&self, collection: &str, attributes: &Map<String, Value>, skip_id: Option<&str>) -> Option<ResponseTemplate> {
        let named = matches!(
            collection,
            "workspaces" | "environments" | "teams" | "policy-groups"
        );
        let name = match attributes.get("name") {
            Some(Value::String(name)) => name,
            Some(_) => return Some(error(422, "Invalid Attribute", "Name must be a string")),
            None if named && skip_id.is_none() => {
                return Some(error(422, "Invalid Attribute", "Name can't be blank"));
            }
            None => return None,
        };
        if name.trim().is_empty() {
            return Some(error(422, "Invalid Attribute", "Name can't be blank"));
        }
        let taken = self
            .collection(collection)
            .iter()
            .any(|r| r["attributes"]["name"] == name.as_str() && Some(r["id"].as_str().unwrap_or("")) != skip_id);
        taken.then(|| error(422, "Invalid Attribute", "Name has already been taken"))
    }

    fn create(&mut self, collection: &str, body: &[u8]) -> ResponseTemplate {
        let Ok(document) = serde_json::from_slice::<Value>(body) else {
            return error(400, "Bad Request", "Body is not valid JSON");
        };
        let mut record = document["data"].clone();
        if record["type"] != collection {
            return error(409, "Conflict", "Resource type does not match the collection");
        }
        let mut attributes = record["attributes"].as_object().cloned().unwrap_or_default();
        if let Some(rejection) = self.validate_name(collection, &attributes, None) {
            return rejection;
        }
        if collection == "users"
            && attributes
                .get("email")
                .and_then(Value::as_str)
                .is_none_or(|e| !e.contains('@'))
        {
            return error(422, "Invalid Attribute", "Email is invalid");
        }
        if collection == "workspaces" {
            let environments = related_ids(&record, "environment");
            let Some((_, environment)) = environments.first() else {
                return error(422, "Invalid Relationship", "Environment is required");
            };
            if self.find("environments", environment).is_none() {
                return error(404, "Not Found", &format!("Environment '{environment}' not found"));
            }
        }

        let defaults: &[(&str, Value)] = match collection {
            "workspaces" => &[
                ("auto-apply", json!(false)),
                ("operations", json!(true)),
                ("execution-mode", json!("remote")),
                ("terraform-version", json!("1.5.7")),
                ("working-directory", Value::Null),
            ],
            "environments" => &[
                ("status", json!("Active")),
                ("cost-estimation-enabled", json!(true)),
            ],
            "policy-groups" => &[
                ("status", json!("active")),
                ("opa-version", json!("0.41.0")),
                ("error-message", Value::Null),
            ],
            "users" | "account-users" => &[("status", json!("Active"))],
            _ => &[],
        };
        for (key, value) in defaults {
            attributes.entry(key.to_string()).or_insert(value.clone());
        }
        attributes.insert("created-at".to_string(), json!(CREATED_AT));
        record["attributes"] = Value::Object(attributes);
        if !record["relationships"].is_object() {
            record["relationships"] = json!({});
        }

        let id = self.insert(collection, record);
        let stored = self.find(collection, &id).cloned().unwrap_or_default();
        respond(201, json!({ "data": stored }))
    }

    fn update(&mut self, collection: &str, id: &str, body: &[u8]) -> ResponseTemplate {
        let Ok(document) = serde_json::from_slice::<Value>(body) else {
            return error(400, "Bad Request", "Body is not valid JSON");
        };
        let patch = &document["data"];
        if patch["id"] != id {
            return error(409, "Conflict", "Body id does not match the URL");
        }
        if self.find(collection, id).is_none() {
            return error(404, "Not Found", &format!("{collection} with ID '{id}' not found"));
        }
        let attributes = patch["attributes"].as_object().cloned().unwrap_or_default();
        if let Some(rejection) = self.validate_name(collection, &attributes, Some(id)) {
            return rejection;
        }

        let Some(record) = self
            .records
            .get_mut(collection)
            .and_then(|records| records.iter_mut().find(|r| r["id"] == id))
        else {
            return error(404, "Not Found", "record vanished");
        };
        for (key, value) in attributes {
            record["attributes"][key] = value;
        }
        if let Some(relationships) = patch["relationships"].as_object() {
            for (key, value) in relationships {
                record["relationships"][key] = value.clone();
            }
        }
        respond(200, json!({ "data": record.clone() }))
    }

    fn delete(&mut self, collection: &str, id: &str) -> ResponseTemplate {
        let Some(records) = self.records.get_mut(collection) else {
            return error(404, "Not Found", &format!("{collection} with ID '{id}' not found"));
        };
        let before = records.len();
        records.retain(|r| r["id"] != id);
        if records.len() == before {
            error(404, "Not Found", &format!("{collection} with ID '{id}' not found"))
        } else {
            ResponseTemplate::new(204)
        }
    }
}

#[derive(Clone)]
struct FakeScalrResponder {
    store: Arc<Mutex<Store>>,
}

impl Respond for FakeScalrResponder {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let expected = format!("Bearer {TOKEN}");
        let authorization = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok());
        if authorization != Some(expected.as_str()) {
            return error(401, "Unauthorized", "Invalid or missing API token");
        }

        let Some(path) = request.url.path().strip_prefix(BASE_PATH) else {
            return error(404, "Not Found", "Unknown API root");
        };
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let query: Vec<(String, String)> = request.url.query_pairs().into_owned().collect();

        let mut store = self.store.lock().expect("store lock");
        match (request.method.as_str(), segments.as_slice()) {
            ("GET", [collection]) => store.list(collection, &query),
            ("GET", [collection, id]) => store.read(collection, id, &query),
            ("POST", [collection]) => store.create(collection, &request.body),
            ("PATCH", [collection, id]) => store.update(collection, id, &request.body),
            ("DELETE", [collection, id]) => store.delete(collection, id),
            _ => error(405, "Method Not Allowed", "Unsupported route"),
        }
    }
}

/// A running fake service plus handles to its store
pub struct FakeScalr {
    pub server: MockServer,
    store: Arc<Mutex<Store>>,
}

impl FakeScalr {
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        let store = Arc::new(Mutex::new(Store::default()));
        Mock::given(path_regex(r"^/api/iacp/v3/.*"))
            .respond_with(FakeScalrResponder {
                store: store.clone(),
            })
            .mount(&server)
            .await;
        Self { server, store }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::default()
            .with_address(self.server.uri())
            .with_token(TOKEN)
    }

    pub fn client(&self) -> ScalrClient {
        ScalrClient::new(self.config()).expect("client for fake service")
    }

    /// Insert a record directly, bypassing validation; returns its id
    pub fn seed(&self, collection: &str, attributes: Value, relationships: Value) -> String {
        let mut attributes = attributes;
        if let Some(map) = attributes.as_object_mut() {
            map.entry("created-at").or_insert(json!(CREATED_AT));
        }
        let record = json!({
            "attributes": attributes,
            "relationships": relationships,
        });
        self.store.lock().expect("store lock").insert(collection, record)
    }

    pub fn record(&self, collection: &str, id: &str) -> Option<Value> {
        self.store
            .lock()
            .expect("store lock")
            .find(collection, id)
            .cloned()
    }

    pub fn count(&self, collection: &str) -> usize {
        self.store.lock().expect("store lock").collection(collection).len()
    }

    pub async fn requests(&self) -> Vec<Request> {
        self.server.received_requests().await.unwrap_or_default()
    }

    /// Decoded query pairs of every request made so far
    pub async fn queries(&self) -> Vec<Vec<(String, String)>> {
        self.requests()
            .await
            .iter()
            .map(|r| r.url.query_pairs().into_owned().collect())
            .collect()
    }
}
