//! Shared fixtures for the HTTP tests: an app state over the in-memory store,
//! signed tokens and hand-built multipart bodies.
#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use jsonwebtoken::{EncodingKey, Header, encode};
use tempfile::TempDir;
use uuid::Uuid;

use feed_be::AppState;
use feed_be::middleware::TokenVerifier;
use feed_be::models::user::{JwtClaims, User};
use feed_be::repositories::{MemoryStore, UserRepository};
use feed_be::services::notifier::socket_transport;
use feed_be::services::{DiskImageStorage, Notifier};

pub const SECRET: &str = "test-secret";
pub const BOUNDARY: &str = "----feedtestboundary";

pub struct TestEnv {
    pub state: web::Data<AppState>,
    pub store: MemoryStore,
    pub image_dir: TempDir,
    pub alice: User,
    pub bob: User,
}

impl TestEnv {
    pub async fn new() -> Self {
        let image_dir = tempfile::tempdir().unwrap();
        let store = MemoryStore::new();
        let alice = User::new(Uuid::new_v4(), "Alice");
        let bob = User::new(Uuid::new_v4(), "Bob");
        store.save(&alice).await.unwrap();
        store.save(&bob).await.unwrap();

        let notifier = Arc::new(Notifier::new());
        notifier.initialize(socket_transport(32)).unwrap();

        let state = AppState::new(
            Arc::new(store.clone()),
            Arc::new(DiskImageStorage::new(image_dir.path().join("images"))),
            notifier,
            TokenVerifier::new(SECRET),
            2,
            1024 * 1024,
        );

        Self {
            state: web::Data::new(state),
            store,
            image_dir,
            alice,
            bob,
        }
    }

    pub async fn user(&self, id: Uuid) -> User {
        self.store.find_by_id(id).await.unwrap().unwrap()
    }

    /// Files currently in the image directory.
    pub fn stored_images(&self) -> usize {
        std::fs::read_dir(self.image_dir.path().join("images"))
            .map(|dir| dir.count())
            .unwrap_or(0)
    }
}

pub fn bearer(user_id: Uuid) -> (String, String) {
    bearer_named(user_id, None)
}

/// Token carrying a `name` claim, as the auth service issues them.
pub fn bearer_named(user_id: Uuid, name: Option<&str>) -> (String, String) {
    let claims = JwtClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now().timestamp() + 3600) as usize,
        iat: None,
        email: None,
        name: name.map(String::from),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET.as_bytes())).unwrap();
    ("Authorization".to_string(), format!("Bearer {}", token))
}

pub enum Part<'a> {
    Text(&'a str, &'a str),
    File {
        name: &'a str,
        file_name: &'a str,
        content_type: &'a str,
        bytes: &'a [u8],
    },
}

/// Returns the content-type header value and the encoded body.
pub fn multipart(parts: &[Part<'_>]) -> (String, Vec<u8>) {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                );
                body.extend_from_slice(value.as_bytes());
            }
            Part::File { name, file_name, content_type, bytes } => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: {}\r\n\r\n",
                        name, file_name, content_type
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
            }
        }
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    (format!("multipart/form-data; boundary={}", BOUNDARY), body)
}

pub fn png<'a>() -> Part<'a> {
    Part::File {
        name: "image",
        file_name: "photo.png",
        content_type: "image/png",
        bytes: b"\x89PNG fake image bytes",
    }
}
