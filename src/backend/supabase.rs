//! Supabase（PostgREST）ストア実装

use super::{classify_reqwest_error, InspectionStore, StoredInspection};
use crate::error::TransportError;
use async_trait::async_trait;
use fleetcheck_common::{Driver, InspectionRow, RecordId, Vehicle};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

const VEHICLE_COLUMNS: &str = "vehicle_id,vehicles(id,van_code,plate_number,location,status)";

/// PostgREST: on_conflict に対応する一意制約がない
const NO_CONFLICT_TARGET: &str = "42P10";

pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

/// driver_vehicle_assignments の1行（vehicles を埋め込み）
#[derive(Debug, Deserialize)]
struct AssignmentRow {
    #[serde(default)]
    vehicles: Option<Vehicle>,
}

/// PostgRESTのエラーレスポンス
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    code: Option<String>,
    message: String,
    #[serde(default)]
    details: Option<String>,
}

impl SupabaseStore {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout,
        })
    }

    fn endpoint(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    /// inspections への書き込みリクエスト
    ///
    /// `upsert` の場合は inspection_code で upsert する。テーブル側に
    /// inspection_code の一意制約（UNIQUE）が必要。
    fn insert_request(&self, row: &InspectionRow, upsert: bool) -> RequestBuilder {
        let request = self.client.post(self.endpoint("inspections"));
        let request = if upsert {
            request
                .query(&[("on_conflict", "inspection_code")])
                .header("Prefer", "return=representation,resolution=merge-duplicates")
        } else {
            request.header("Prefer", "return=representation")
        };
        request.json(&[row])
    }

    async fn send(&self, request: RequestBuilder, phase: &'static str) -> Result<Response, TransportError> {
        self.authorized(request)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(e, phase, self.timeout))
    }
}

async fn read_body(response: Response) -> Result<(StatusCode, String), TransportError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Network(e.to_string()))?;
    Ok((status, body))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, TransportError> {
    let (status, body) = read_body(response).await?;
    parse_body(status, &body)
}

fn parse_body<T: DeserializeOwned>(status: StatusCode, body: &str) -> Result<T, TransportError> {
    if !status.is_success() {
        return Err(TransportError::Store(postgrest_message(status, &body)));
    }

    serde_json::from_str(body).map_err(|e| TransportError::InvalidResponse(e.to_string()))
}

/// upsert 先の一意制約がないことを示すエラーか
fn missing_conflict_target(body: &str) -> bool {
    serde_json::from_str::<PostgrestError>(body)
        .ok()
        .and_then(|err| err.code)
        .is_some_and(|code| code == NO_CONFLICT_TARGET)
}

fn first_stored(rows: Vec<StoredInspection>) -> Result<StoredInspection, TransportError> {
    rows.into_iter()
        .next()
        .ok_or_else(|| TransportError::InvalidResponse("insert returned no rows".into()))
}

/// エラーレスポンスからユーザー向けメッセージを取り出す
fn postgrest_message(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<PostgrestError>(body) {
        Ok(err) => match err.details.filter(|d| !d.is_empty()) {
            Some(details) => format!("{} ({})", err.message, details),
            None => err.message,
        },
        Err(_) if body.trim().is_empty() => format!("HTTP {}", status.as_u16()),
        Err(_) => format!("HTTP {}: {}", status.as_u16(), body.trim()),
    }
}

/// 割当行から車両を取り出す（車両が参照できない行は除外）
fn vehicles_from_assignments(rows: Vec<AssignmentRow>) -> Vec<Vehicle> {
    rows.into_iter().filter_map(|row| row.vehicles).collect()
}

#[async_trait]
impl InspectionStore for SupabaseStore {
    async fn list_active_drivers(&self) -> Result<Vec<Driver>, TransportError> {
        let request = self
            .client
            .get(self.endpoint("drivers"))
            .query(&[("select", "*"), ("is_active", "eq.true"), ("order", "full_name")]);

        let drivers: Vec<Driver> = read_json(self.send(request, "loading drivers").await?).await?;
        tracing::info!(count = drivers.len(), "drivers loaded");
        Ok(drivers)
    }

    async fn list_assigned_vehicles(&self, driver_id: &RecordId) -> Result<Vec<Vehicle>, TransportError> {
        let driver_filter = format!("eq.{}", driver_id);
        let request = self.client.get(self.endpoint("driver_vehicle_assignments")).query(&[
            ("select", VEHICLE_COLUMNS),
            ("driver_id", driver_filter.as_str()),
            ("is_current", "eq.true"),
        ]);

        let rows: Vec<AssignmentRow> = read_json(self.send(request, "loading vehicles").await?).await?;
        let vehicles = vehicles_from_assignments(rows);
        tracing::info!(driver = %driver_id, count = vehicles.len(), "assigned vehicles loaded");
        Ok(vehicles)
    }

    /// inspection_code で upsert する
    ///
    /// inspection_code に一意制約のないスキーマでは PostgREST が 42P10 を返すため、
    /// 通常の insert で書き直す。この場合、再送信で行が重複しうる。
    async fn insert_inspection(&self, row: &InspectionRow) -> Result<StoredInspection, TransportError> {
        let response = self.send(self.insert_request(row, true), "saving inspection").await?;
        let (status, body) = read_body(response).await?;

        if !status.is_success() && missing_conflict_target(&body) {
            tracing::warn!(
                code = %row.inspection_code,
                "inspections.inspection_code has no unique constraint, falling back to plain insert"
            );
            let response = self.send(self.insert_request(row, false), "saving inspection").await?;
            return first_stored(read_json(response).await?);
        }

        first_stored(parse_body(status, &body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let store = SupabaseStore::new("https://demo.supabase.co/", "key", Duration::from_secs(5)).unwrap();
        assert_eq!(store.endpoint("drivers"), "https://demo.supabase.co/rest/v1/drivers");
    }

    #[test]
    fn test_postgrest_message_with_details() {
        let body = r#"{"code":"23503","message":"insert violates foreign key","details":"Key (vehicle_id) is not present"}"#;
        assert_eq!(
            postgrest_message(StatusCode::CONFLICT, body),
            "insert violates foreign key (Key (vehicle_id) is not present)"
        );
    }

    #[test]
    fn test_missing_conflict_target_detected() {
        let body = r#"{"code":"42P10","details":null,"hint":null,"message":"there is no unique or exclusion constraint matching the ON CONFLICT specification"}"#;
        assert!(missing_conflict_target(body));

        let other = r#"{"code":"23505","message":"duplicate key value violates unique constraint"}"#;
        assert!(!missing_conflict_target(other));
        assert!(!missing_conflict_target("Bad Gateway"));
    }

    #[test]
    fn test_insert_request_modes() {
        let store = SupabaseStore::new("https://demo.supabase.co", "key", Duration::from_secs(5)).unwrap();
        let row = InspectionRow {
            inspection_code: "INS-1".into(),
            driver_id: RecordId::new("d1"),
            vehicle_id: RecordId::new("v1"),
            timestamp: "2026-01-06T10:26:53.123Z".into(),
            location: "Riyadh".into(),
            notes: String::new(),
            declaration_accepted: true,
        };

        let upsert = store.insert_request(&row, true).build().unwrap();
        assert_eq!(upsert.url().query(), Some("on_conflict=inspection_code"));
        assert_eq!(
            upsert.headers()["Prefer"],
            "return=representation,resolution=merge-duplicates"
        );

        let plain = store.insert_request(&row, false).build().unwrap();
        assert_eq!(plain.url().query(), None);
        assert_eq!(plain.headers()["Prefer"], "return=representation");
    }

    #[test]
    fn test_postgrest_message_plain_body() {
        assert_eq!(postgrest_message(StatusCode::BAD_GATEWAY, ""), "HTTP 502");
        assert_eq!(
            postgrest_message(StatusCode::UNAUTHORIZED, "Invalid API key"),
            "HTTP 401: Invalid API key"
        );
    }

    #[test]
    fn test_vehicles_from_assignments_skips_missing() {
        let json = r#"[
            {"vehicle_id": 1, "vehicles": {"id": 1, "van_code": "VAN-1", "plate_number": "A 1", "location": "Dammam", "status": "active"}},
            {"vehicle_id": 2, "vehicles": null}
        ]"#;
        let rows: Vec<AssignmentRow> = serde_json::from_str(json).unwrap();
        let vehicles = vehicles_from_assignments(rows);

        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].id, RecordId::new("1"));
        assert_eq!(vehicles[0].location, "Dammam");
    }

    #[test]
    fn test_stored_inspection_deserialize() {
        let json = r#"[{"id": 501, "inspection_code": "INS-1", "notes": ""}]"#;
        let stored: Vec<StoredInspection> = serde_json::from_str(json).unwrap();
        assert_eq!(stored[0].id, RecordId::new("501"));
        assert_eq!(stored[0].inspection_code, "INS-1");
    }
}
