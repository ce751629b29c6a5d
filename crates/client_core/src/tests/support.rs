//! In-process audit backends for tests.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicI64, Ordering},
        Arc,
    },
    time::Duration,
};

use async_trait::async_trait;
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use shared::domain::{DocumentId, DocumentRecord};
use tokio::{net::TcpListener, sync::Mutex};

use crate::{
    error::UploadError,
    transport::{AuditBackend, DocumentUpload},
};

#[derive(Debug, Clone)]
pub struct ReceivedUpload {
    pub field_name: String,
    pub filename: String,
    pub content_type: Option<String>,
    pub size_bytes: usize,
}

#[derive(Debug, Clone)]
pub enum MockReply {
    Processed { delay: Duration },
    Error { status: StatusCode, body: Option<Value> },
    SuccessWithoutData,
}

#[derive(Clone)]
struct MockState {
    replies: Arc<HashMap<String, MockReply>>,
    received: Arc<Mutex<Vec<ReceivedUpload>>>,
    next_id: Arc<AtomicI64>,
}

pub struct MockBackend {
    pub url: String,
    pub received: Arc<Mutex<Vec<ReceivedUpload>>>,
}

pub fn document_json(id: i64, filename: &str) -> Value {
    json!({
        "id": id,
        "file_hash": format!("hash-{id}"),
        "file_type": "image",
        "original_filename": filename,
        "cloudinary_url": format!("https://cdn.example/{filename}"),
        "groq_response": "## Invoice\n**Invoice Number:** INV-001\n\n\n**Total:** $100",
        "audit_result": {
            "is_compliant": true,
            "total_violations": 1,
            "violations": [{
                "rule_name": "Alcohol Content Warning",
                "rule_type": "content_warning",
                "field_name": "content",
                "severity": "warning",
                "message": "Content contains flagged items: beer",
                "flagged_items": ["beer"]
            }],
            "compliance_score": 95.0,
            "summary": "Document passed with 1 warning"
        },
        "created_at": "2024-05-01T10:15:30.123456",
        "is_duplicate": false
    })
}

async fn handle_upload(State(state): State<MockState>, mut multipart: Multipart) -> Response {
    let mut received = None;
    while let Ok(Some(field)) = multipart.next_field().await {
        let field_name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.unwrap_or_default();
        received = Some(ReceivedUpload {
            field_name,
            filename,
            content_type,
            size_bytes: bytes.len(),
        });
    }

    let Some(upload) = received else {
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(json!({"detail": [{"loc": ["body", "file"], "msg": "field required"}]})),
        )
            .into_response();
    };
    state.received.lock().await.push(upload.clone());

    let reply = state
        .replies
        .get(&upload.filename)
        .cloned()
        .unwrap_or(MockReply::Processed {
            delay: Duration::ZERO,
        });
    match reply {
        MockReply::Processed { delay } => {
            tokio::time::sleep(delay).await;
            let id = state.next_id.fetch_add(1, Ordering::SeqCst);
            Json(json!({
                "success": true,
                "message": "Document processed and audited successfully",
                "data": document_json(id, &upload.filename),
            }))
            .into_response()
        }
        MockReply::Error { status, body } => match body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        },
        MockReply::SuccessWithoutData => {
            Json(json!({"success": true, "message": "nothing to report"})).into_response()
        }
    }
}

async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "message": "Document processing API is running"}))
}

async fn handle_document(Path(id): Path<i64>) -> Response {
    if id == 404 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": "Document not found"})),
        )
            .into_response();
    }
    Json(document_json(id, "stored.png")).into_response()
}

async fn handle_policies() -> Json<Value> {
    Json(json!([
        {
            "id": 1,
            "rule_name": "Invoice Number Required",
            "rule_type": "required_field",
            "field_name": "invoice_number",
            "condition": "exists",
            "expected_value": null,
            "severity": "medium",
            "is_active": true,
            "created_at": "2024-05-01T10:15:30+00:00"
        },
        {
            "id": 2,
            "rule_name": "High-Risk Vendor Warning",
            "rule_type": "content_warning",
            "field_name": "vendor_name",
            "condition": "contains_keywords",
            "expected_value": "casino,lottery",
            "severity": "high",
            "is_active": true
        },
        {
            "id": 3,
            "rule_name": "Amount Must Be Positive",
            "rule_type": "value_check",
            "field_name": "amount",
            "condition": "greater_than",
            "expected_value": "0",
            "severity": "high",
            "is_active": false,
            "created_at": "2024-05-02T08:00:00.654321"
        }
    ]))
}

pub async fn spawn_mock_backend(replies: Vec<(&str, MockReply)>) -> MockBackend {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    let received = Arc::new(Mutex::new(Vec::new()));
    let state = MockState {
        replies: Arc::new(
            replies
                .into_iter()
                .map(|(name, reply)| (name.to_string(), reply))
                .collect(),
        ),
        received: Arc::clone(&received),
        next_id: Arc::new(AtomicI64::new(1)),
    };
    let app = Router::new()
        .route("/upload", post(handle_upload))
        .route("/health", get(handle_health))
        .route("/document/:id", get(handle_document))
        .route("/audit-policies", get(handle_policies))
        .with_state(state);
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    MockBackend {
        url: format!("http://{addr}"),
        received,
    }
}

pub fn sample_record(id: i64, filename: &str) -> DocumentRecord {
    DocumentRecord {
        id: DocumentId(id),
        original_filename: filename.to_string(),
        file_type: "image".to_string(),
        created_at: Utc::now(),
        is_duplicate: false,
        extracted_text: Some("**Total:** $100".to_string()),
        audit_result: None,
        file_hash: None,
        file_url: None,
    }
}

/// Backend that answers from memory, optionally after a per-file delay.
pub struct ScriptedBackend {
    delays: HashMap<String, Duration>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicI64,
}

impl ScriptedBackend {
    pub fn with_delays(delays: Vec<(&str, Duration)>) -> Arc<Self> {
        Arc::new(Self {
            delays: delays
                .into_iter()
                .map(|(name, delay)| (name.to_string(), delay))
                .collect(),
            calls: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        })
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl AuditBackend for ScriptedBackend {
    async fn submit_document(
        &self,
        upload: DocumentUpload,
    ) -> Result<DocumentRecord, UploadError> {
        self.calls.lock().await.push(upload.filename.clone());
        if let Some(delay) = self.delays.get(&upload.filename) {
            tokio::time::sleep(*delay).await;
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        Ok(sample_record(id, &upload.filename))
    }
}

pub fn upload(filename: &str) -> DocumentUpload {
    DocumentUpload::from_bytes(filename, b"%PDF-1.4 fake".to_vec())
}
