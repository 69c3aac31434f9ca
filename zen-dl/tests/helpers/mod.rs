//! Shared test helpers: scripted extractor and app construction

#![allow(dead_code)]

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use zen_common::JobId;
use zen_dl::services::extractor::find_output_template;
use zen_dl::services::{
    ArtifactStore, DownloadService, ExtractorConfig, MemoryArtifactStore, RunError,
    StderrClassifier, ToolInvocation, ToolOutput, ToolRunner,
};
use zen_dl::{build_router, AppState};

/// What the scripted extractor does when invoked
#[derive(Debug, Clone)]
pub enum Behavior {
    /// Write `{job_id}_{title}.mp3` for each title, exit 0
    Produce(Vec<String>),
    /// Exit 0 without writing anything
    ProduceNothing,
    /// Exit non-zero with this stderr
    Fail(String),
    /// Exceed the timeout
    Timeout,
    /// Program could not be started
    SpawnError,
}

/// Extractor double that records every invocation
pub struct ScriptedRunner {
    store: Arc<MemoryArtifactStore>,
    behavior: Behavior,
    invocations: Mutex<Vec<ToolInvocation>>,
}

impl ScriptedRunner {
    pub fn new(store: Arc<MemoryArtifactStore>, behavior: Behavior) -> Self {
        Self {
            store,
            behavior,
            invocations: Mutex::new(Vec::new()),
        }
    }

    pub fn invocations(&self) -> Vec<ToolInvocation> {
        self.invocations.lock().unwrap().clone()
    }
}

/// Job id embedded in an invocation's `--output` template
pub fn job_id_of(invocation: &ToolInvocation) -> JobId {
    let template = find_output_template(&invocation.args).expect("--output present");
    let file = std::path::Path::new(template)
        .file_name()
        .and_then(|f| f.to_str())
        .expect("template has a file name");
    let (id, rest) = file.split_once('_').expect("template has job prefix");
    assert_eq!(rest, "%(title)s.%(ext)s");
    JobId::parse(id).expect("job id is hex")
}

#[async_trait]
impl ToolRunner for ScriptedRunner {
    async fn run(
        &self,
        invocation: &ToolInvocation,
        _cancel: CancellationToken,
    ) -> Result<ToolOutput, RunError> {
        self.invocations.lock().unwrap().push(invocation.clone());

        match &self.behavior {
            Behavior::Produce(titles) => {
                let job_id = job_id_of(invocation);
                for title in titles {
                    let name = format!("{}_{}.mp3", job_id, title);
                    self.store.write(&name, b"ID3fake-mp3").await.unwrap();
                }
                Ok(ToolOutput {
                    success: true,
                    exit_code: Some(0),
                    ..Default::default()
                })
            }
            Behavior::ProduceNothing => Ok(ToolOutput {
                success: true,
                exit_code: Some(0),
                ..Default::default()
            }),
            Behavior::Fail(stderr) => Ok(ToolOutput {
                success: false,
                exit_code: Some(1),
                stdout: String::new(),
                stderr: stderr.clone(),
            }),
            Behavior::Timeout => Err(RunError::Timeout(invocation.timeout)),
            Behavior::SpawnError => Err(RunError::Spawn {
                program: invocation.program.clone(),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
            }),
        }
    }
}

/// Everything a test needs to drive the router and inspect side effects
pub struct TestApp {
    pub router: axum::Router,
    pub store: Arc<MemoryArtifactStore>,
    pub runner: Arc<ScriptedRunner>,
}

pub fn test_app(behavior: Behavior) -> TestApp {
    let store = Arc::new(MemoryArtifactStore::new());
    let runner = Arc::new(ScriptedRunner::new(store.clone(), behavior));
    let service = DownloadService::new(
        store.clone(),
        runner.clone(),
        ExtractorConfig {
            program: "yt-dlp".to_string(),
            timeout: Duration::from_secs(300),
        },
        StderrClassifier::default(),
        CancellationToken::new(),
    );

    TestApp {
        router: build_router(AppState::new(service)),
        store,
        runner,
    }
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .expect("Should read body")
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Should parse JSON")
}
