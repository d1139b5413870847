//! StaffSync Test Utilities
//!
//! Centralized test infrastructure for the StaffSync workspace:
//! - A scripted in-memory [`Transport`] that records every request
//! - JSON fixtures for every backend payload
//! - Proptest generators for records and drafts

pub use staffsync_core::{
    ApiRequest, CalendarDate, EmployeeDraft, EmployeeId, Envelope, HttpMethod, MutableSource,
    RawResponse, Source, SourceEmployee, Transport, TransportError, UnifiedEmployee,
};

use async_trait::async_trait;
use proptest::prelude::*;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

// ============================================================================
// SCRIPTED TRANSPORT
// ============================================================================

type Scripted = Result<RawResponse, TransportError>;

#[derive(Default)]
struct Route {
    once: VecDeque<Scripted>,
    fallback: Option<Scripted>,
}

/// In-memory transport answering from a script keyed by method and path.
///
/// One-shot responses are consumed in order before the persistent response
/// for the route is used. Unscripted routes answer `404` with a failed
/// envelope. Every request is recorded, in order, for later assertions.
#[derive(Default)]
pub struct ScriptedTransport {
    routes: Mutex<HashMap<(HttpMethod, String), Route>>,
    log: Mutex<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_route<F: FnOnce(&mut Route)>(&self, method: HttpMethod, path: &str, f: F) {
        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        f(routes.entry((method, path.to_string())).or_default());
    }

    /// Persistent raw response for a route.
    pub fn respond(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        let response = Ok(RawResponse::new(status, body.to_string()));
        self.with_route(method, path, |route| route.fallback = Some(response));
    }

    /// One-shot raw response, consumed before the persistent one.
    pub fn respond_once(&self, method: HttpMethod, path: &str, status: u16, body: Value) {
        let response = Ok(RawResponse::new(status, body.to_string()));
        self.with_route(method, path, |route| route.once.push_back(response));
    }

    /// Persistent raw body that is not JSON.
    pub fn respond_raw(&self, method: HttpMethod, path: &str, status: u16, body: &str) {
        let response = Ok(RawResponse::new(status, body));
        self.with_route(method, path, |route| route.fallback = Some(response));
    }

    /// Persistent `200 {"success": true, "data": ...}`.
    pub fn ok(&self, method: HttpMethod, path: &str, data: Value) {
        self.respond(method, path, 200, success_body(data));
    }

    /// One-shot `200 {"success": true, "data": ...}`.
    pub fn ok_once(&self, method: HttpMethod, path: &str, data: Value) {
        self.respond_once(method, path, 200, success_body(data));
    }

    /// Persistent `200 {"success": false, "message": ...}`.
    pub fn reject(&self, method: HttpMethod, path: &str, message: &str) {
        self.respond(method, path, 200, failure_body(message));
    }

    /// Persistent transport failure (no response at all).
    pub fn fail(&self, method: HttpMethod, path: &str, reason: &str) {
        let failure = Err(TransportError::new(reason));
        self.with_route(method, path, |route| route.fallback = Some(failure));
    }

    /// One-shot transport failure.
    pub fn fail_once(&self, method: HttpMethod, path: &str, reason: &str) {
        let failure = Err(TransportError::new(reason));
        self.with_route(method, path, |route| route.once.push_back(failure));
    }

    /// All recorded requests, in send order.
    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// `"METHOD /path"` for every recorded request, in send order.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|r| format!("{} {}", r.method, r.path))
            .collect()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests()
            .iter()
            .filter(|r| r.method == method && r.path == path)
            .count()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse, TransportError> {
        let key = (request.method, request.path.clone());
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request);

        let mut routes = self.routes.lock().unwrap_or_else(|e| e.into_inner());
        match routes.get_mut(&key) {
            Some(route) => {
                if let Some(next) = route.once.pop_front() {
                    return next;
                }
                match &route.fallback {
                    Some(response) => response.clone(),
                    None => Ok(not_found(&key.1)),
                }
            }
            None => Ok(not_found(&key.1)),
        }
    }
}

fn not_found(path: &str) -> RawResponse {
    RawResponse::new(404, failure_body(&format!("no route for {}", path)).to_string())
        .with_reason("Not Found")
}

// ============================================================================
// FIXTURES
// ============================================================================

pub fn success_body(data: Value) -> Value {
    json!({ "success": true, "data": data })
}

pub fn failure_body(message: &str) -> Value {
    json!({ "success": false, "data": null, "message": message })
}

/// A unified record as the backend serializes it.
pub fn unified_employee_json(id: i64, source: &str) -> Value {
    json!({
        "id": id,
        "source": source,
        "source_id": id,
        "nom": format!("Employe {}", id),
        "email": format!("employe{}@example.com", id),
        "departement": "Informatique",
        "salaire": 350000.0 + id as f64,
        "date_embauche": "2021-03-15",
        "created_at": "2024-01-01 08:00:00",
        "updated_at": "2024-06-01 12:30:00"
    })
}

/// `count` unified records spread across the three sources.
pub fn unified_employees_json(count: usize) -> Value {
    let sources = ["CSV", "MySQL", "PostgreSQL"];
    Value::Array(
        (0..count)
            .map(|i| unified_employee_json(i as i64 + 1, sources[i % sources.len()]))
            .collect(),
    )
}

/// Unified records with a distinguishing name prefix, to tell pre- and
/// post-sync collections apart.
pub fn tagged_unified_employees_json(count: usize, tag: &str) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                let mut record = unified_employee_json(i as i64 + 1, "MySQL");
                record["nom"] = json!(format!("{} {}", tag, i + 1));
                record
            })
            .collect(),
    )
}

pub fn source_employee_json(id: i64) -> Value {
    json!({
        "id": id,
        "nom": format!("Agent {}", id),
        "email": format!("agent{}@example.com", id),
        "departement": "Finance",
        "salaire": 275000,
        "date_embauche": "2019-11-04"
    })
}

pub fn source_employees_json(count: usize) -> Value {
    Value::Array((0..count).map(|i| source_employee_json(i as i64 + 1)).collect())
}

pub fn global_stats_json(total: u64) -> Value {
    json!({
        "total_employes": total,
        "nb_sources": 3,
        "nb_departements": 5,
        "salaire_moyen": "412500.00",
        "salaire_min": 150000,
        "salaire_max": 900000
    })
}

pub fn per_source_array_json(csv: u64, mysql: u64, postgresql: u64) -> Value {
    json!([
        { "source": "CSV", "count": csv, "salaire_moyen": 300000 },
        { "source": "MySQL", "count": mysql, "salaire_moyen": 400000 },
        { "source": "PostgreSQL", "count": postgresql, "salaire_moyen": 500000 }
    ])
}

pub fn per_source_map_json(csv: u64, mysql: u64, postgresql: u64) -> Value {
    json!({ "csv": csv, "mysql": mysql, "postgresql": postgresql })
}

pub fn last_sync_json(timestamp: &str, total: u64) -> Value {
    json!({ "derniere_maj": timestamp, "total": total })
}

pub fn sample_draft() -> EmployeeDraft {
    EmployeeDraft {
        name: "Mariam Traore".to_string(),
        email: "mariam.traore@example.com".to_string(),
        department: Some("Comptabilite".to_string()),
        salary: Some(420000.0),
        hire_date: CalendarDate::from_ymd_opt(2023, 1, 9),
    }
}

/// Script every read endpoint with a consistent, healthy backend.
pub fn seed_backend(transport: &ScriptedTransport, unified: usize) {
    let third = unified as u64 / 3;
    let rest = unified as u64 - 2 * third;
    transport.ok(HttpMethod::Get, "/stats", global_stats_json(unified as u64));
    transport.ok(
        HttpMethod::Get,
        "/stats/sources",
        per_source_array_json(third, third, rest),
    );
    transport.ok(
        HttpMethod::Get,
        "/sources/stats",
        per_source_map_json(third, third, rest),
    );
    transport.ok(
        HttpMethod::Get,
        "/etl/last-sync",
        last_sync_json("2024-06-01 12:30:00", unified as u64),
    );
    transport.respond(
        HttpMethod::Get,
        "/employes",
        200,
        json!({
            "success": true,
            "data": unified_employees_json(unified),
            "count": unified
        }),
    );
    for source in ["csv", "mysql", "postgresql"] {
        transport.respond(
            HttpMethod::Get,
            &format!("/sources/{}/employes", source),
            200,
            json!({
                "success": true,
                "data": source_employees_json(12),
                "count": 12,
                "total": 12
            }),
        );
    }
}

// ============================================================================
// GENERATORS
// ============================================================================

pub fn arb_source() -> impl Strategy<Value = Source> {
    prop_oneof![
        Just(Source::Csv),
        Just(Source::Mysql),
        Just(Source::Postgresql),
    ]
}

pub fn arb_mutable_source() -> impl Strategy<Value = MutableSource> {
    prop_oneof![Just(MutableSource::Mysql), Just(MutableSource::Postgresql)]
}

/// Random casing of a source label, as the backend may send it.
pub fn arb_source_name() -> impl Strategy<Value = (Source, String)> {
    (arb_source(), any::<u64>()).prop_map(|(source, mask)| {
        let name: String = source
            .label()
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if mask & (1 << (i % 64)) != 0 {
                    c.to_ascii_uppercase()
                } else {
                    c.to_ascii_lowercase()
                }
            })
            .collect();
        (source, name)
    })
}

pub fn arb_draft() -> impl Strategy<Value = EmployeeDraft> {
    (
        "[A-Z][a-z]{2,12} [A-Z][a-z]{2,12}",
        "[a-z]{3,10}",
        proptest::option::of("[A-Z][a-z]{3,12}"),
        proptest::option::of(0u32..5_000_000),
        proptest::option::of((2000i32..2025, 1u32..13, 1u32..29)),
    )
        .prop_map(|(name, user, department, salary, date)| EmployeeDraft {
            name,
            email: format!("{}@example.com", user),
            department,
            salary: salary.map(f64::from),
            hire_date: date.and_then(|(y, m, d)| CalendarDate::from_ymd_opt(y, m, d)),
        })
}

pub fn arb_unified_employee() -> impl Strategy<Value = UnifiedEmployee> {
    (1i64..100_000, arb_source(), arb_draft()).prop_map(|(id, source, draft)| UnifiedEmployee {
        id: EmployeeId(id),
        source,
        source_id: Some(id.to_string()),
        name: draft.name,
        email: draft.email,
        department: draft.department,
        salary: draft.salary,
        hire_date: draft.hire_date,
        updated_at: chrono::Utc::now(),
    })
}
