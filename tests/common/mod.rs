//! In-memory stand-in for the player API, served through wiremock.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use player_api_suite::{
    PlayerCreateRequest, PlayerLookupRequest,
    client::{CREATE_PATH, GET_ALL_PATH, GET_ONE_PATH, LOGIN_PATH},
};
use serde::Serialize;
use serde_json::json;
use wiremock::{
    Match, Mock, MockServer, Request, Respond, ResponseTemplate,
    matchers::{header, method, path, path_regex},
};

pub const TOKEN: &str = "test-token";
pub const TESTER_EMAIL: &str = "tester@example.com";
pub const TESTER_PASSWORD: &str = "tester-secret";

/// Matches requests that carry no `Authorization` header.
pub struct NoAuthorization;

impl Match for NoAuthorization {
    fn matches(&self, request: &Request) -> bool {
        !request.headers.contains_key("authorization")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StoredPlayer {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub name: String,
    pub surname: String,
}

impl StoredPlayer {
    /// What the API sends back: the player plus fields the suite does not model.
    fn to_response(&self) -> serde_json::Value {
        json!({
            "id": self.id,
            "username": self.username,
            "email": self.email,
            "name": self.name,
            "surname": self.surname,
            "currency_code": "EUR",
            "balance": 0,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    ByName,
    ReverseByName,
}

/// Ways the fake can misbehave while still answering with a success status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Quirks {
    /// Create answers with a surname other than the one sent.
    pub wrong_create_surname: bool,
    /// Create answers with `"name": null`, which does not decode.
    pub null_create_name: bool,
    /// Every created player gets the same id.
    pub duplicate_ids: bool,
    /// Get-one answers with a surname other than the stored one.
    pub wrong_lookup_surname: bool,
    /// Delete answers with an id one higher than the deleted one.
    pub wrong_delete_id: bool,
}

const WRONG_SURNAME: &str = "Mismatch";

#[derive(Debug)]
struct State {
    next_id: i64,
    players: Vec<StoredPlayer>,
    order: ListOrder,
    failing_deletes: usize,
    delete_calls: usize,
    quirks: Quirks,
}

#[derive(Debug, Clone)]
pub struct FakeApi {
    state: Arc<Mutex<State>>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            state: Arc::new(Mutex::new(State {
                next_id: 1000,
                players: Vec::new(),
                order: ListOrder::ByName,
                failing_deletes: 0,
                delete_calls: 0,
                quirks: Quirks::default(),
            })),
        }
    }
}

impl FakeApi {
    pub fn with_order(self, order: ListOrder) -> Self {
        self.state.lock().unwrap().order = order;
        self
    }

    /// The first `n` delete calls answer 500 and leave the player in place.
    pub fn failing_deletes(self, n: usize) -> Self {
        self.state.lock().unwrap().failing_deletes = n;
        self
    }

    pub fn with_quirks(self, quirks: Quirks) -> Self {
        self.state.lock().unwrap().quirks = quirks;
        self
    }

    pub fn insert(&self, username: &str, email: &str, name: &str, surname: &str) -> StoredPlayer {
        let mut state = self.state.lock().unwrap();
        if !(state.quirks.duplicate_ids && !state.players.is_empty()) {
            state.next_id += 1;
        }
        let player = StoredPlayer {
            id: state.next_id,
            username: username.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            surname: surname.to_string(),
        };
        state.players.push(player.clone());
        player
    }

    pub fn players(&self) -> Vec<StoredPlayer> {
        self.state.lock().unwrap().players.clone()
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    /// Starts a server with login and all four player endpoints mounted.
    /// Player endpoints only answer requests bearing [`TOKEN`].
    pub async fn start(&self) -> MockServer {
        let server = MockServer::start().await;
        mount_login(&server, ResponseTemplate::new(200).set_body_json(json!({"accessToken": TOKEN}))).await;
        self.mount_players(&server).await;
        server
    }

    pub async fn mount_players(&self, server: &MockServer) {
        let bearer = format!("Bearer {TOKEN}");
        Mock::given(method("POST"))
            .and(path(CREATE_PATH))
            .and(header("Authorization", bearer.as_str()))
            .and(header("Content-Type", "application/json"))
            .respond_with(Create(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("POST"))
            .and(path(GET_ONE_PATH))
            .and(header("Authorization", bearer.as_str()))
            .respond_with(GetOne(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(GET_ALL_PATH))
            .and(header("Authorization", bearer.as_str()))
            .respond_with(GetAll(self.clone()))
            .mount(server)
            .await;
        Mock::given(method("DELETE"))
            .and(path_regex(r"^/api/automationTask/deleteOne/-?\d+$"))
            .and(header("Authorization", bearer.as_str()))
            .respond_with(DeleteOne(self.clone()))
            .mount(server)
            .await;
    }
}

pub async fn mount_login(server: &MockServer, response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path(LOGIN_PATH))
        .and(NoAuthorization)
        .and(wiremock::matchers::body_json(
            json!({"email": TESTER_EMAIL, "password": TESTER_PASSWORD}),
        ))
        .respond_with(response)
        .mount(server)
        .await;
}

fn error_body(status: u16, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).set_body_json(json!({ "error": message }))
}

struct Create(FakeApi);

impl Respond for Create {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        match serde_json::from_slice::<PlayerCreateRequest>(&request.body) {
            Ok(body) if body.password_change == body.password_repeat => {
                let player = self.0.insert(&body.username, &body.email, &body.name, &body.surname);
                let quirks = self.0.state.lock().unwrap().quirks;
                let mut response = player.to_response();
                if quirks.wrong_create_surname {
                    response["surname"] = json!(WRONG_SURNAME);
                }
                if quirks.null_create_name {
                    response["name"] = serde_json::Value::Null;
                }
                ResponseTemplate::new(201).set_body_json(response)
            }
            Ok(_) => error_body(400, "passwords do not match"),
            Err(_) => error_body(400, "malformed body"),
        }
    }
}

struct GetOne(FakeApi);

impl Respond for GetOne {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let Ok(lookup) = serde_json::from_slice::<PlayerLookupRequest>(&request.body) else {
            return error_body(400, "malformed body");
        };
        let state = self.0.state.lock().unwrap();
        match state.players.iter().find(|p| p.email == lookup.email) {
            Some(player) => {
                let mut response = player.to_response();
                if state.quirks.wrong_lookup_surname {
                    response["surname"] = json!(WRONG_SURNAME);
                }
                ResponseTemplate::new(200).set_body_json(response)
            }
            None => error_body(404, "player not found"),
        }
    }
}

struct GetAll(FakeApi);

impl Respond for GetAll {
    fn respond(&self, _request: &Request) -> ResponseTemplate {
        let state = self.0.state.lock().unwrap();
        let mut players = state.players.clone();
        players.sort_by(|a, b| a.name.cmp(&b.name));
        if state.order == ListOrder::ReverseByName {
            players.reverse();
        }
        let body: Vec<_> = players.iter().map(StoredPlayer::to_response).collect();
        ResponseTemplate::new(200).set_body_json(body)
    }
}

struct DeleteOne(FakeApi);

impl Respond for DeleteOne {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let id: Option<i64> = request
            .url
            .path_segments()
            .and_then(|mut segments| segments.next_back())
            .and_then(|segment| segment.parse().ok());
        let mut state = self.0.state.lock().unwrap();
        state.delete_calls += 1;
        if state.failing_deletes > 0 {
            state.failing_deletes -= 1;
            return error_body(500, "internal error");
        }
        let Some(position) = id.and_then(|id| state.players.iter().position(|p| p.id == id)) else {
            return error_body(404, "player not found");
        };
        let player = state.players.remove(position);
        let mut response = player.to_response();
        if state.quirks.wrong_delete_id {
            response["id"] = json!(player.id + 1);
        }
        ResponseTemplate::new(200).set_body_json(response)
    }
}
