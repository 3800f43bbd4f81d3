//! Data models.
//!
//! Every entity carries a store-assigned identifier and creation/update
//! timestamps. Optional columns are `Option`s. Columns with a store default
//! (status, category, currency, ...) are plain strings: an empty string on
//! create means "not supplied" and the store default is written back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Back-office user, referenced as the creator of charters
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Unique, compared case-insensitively
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub full_name: String,
    /// Defaults to `user`
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Vessel particulars
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Vessel {
    pub id: Uuid,
    pub name: String,
    /// International Maritime Organization number, unique when present
    pub imo_number: Option<String>,
    pub flag_state: Option<String>,
    pub vessel_type: Option<String>,
    pub call_sign: Option<String>,
    pub deadweight_tonnage: Option<f64>,
    pub gross_tonnage: Option<f64>,
    pub net_tonnage: Option<f64>,
    /// Holds, tanks and other capacity figures as a JSON document
    pub capacity: Option<Value>,
    pub build_year: Option<i16>,
    pub class_society: Option<String>,
    pub owner: Option<String>,
    pub manager: Option<String>,
    pub documentation_uri: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Charter party terms
///
/// Status moves informally draft -> active -> completed/cancelled. No
/// transition is enforced here.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CharterDetail {
    pub id: Uuid,
    pub created_by_user_id: Option<Uuid>,
    pub title: String,
    pub charter_reference_code: Option<String>,
    pub vessel_name: Option<String>,
    pub counterparty_name: Option<String>,
    /// Defaults to `draft`
    pub status: String,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub laytime_allowance_hours: Option<f64>,
    pub demurrage_rate: Option<f64>,
    pub demurrage_currency: Option<String>,
    pub fuel_clause: Option<String>,
    pub payment_terms: Option<String>,
    /// Document extraction state, defaults to `pending`
    pub ai_status: String,
    pub ai_document_path: Option<String>,
    pub ai_extracted_terms: Option<Value>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Narrow status change for a charter. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CharterStatusUpdate {
    pub status: Option<String>,
    pub ai_status: Option<String>,
    pub last_reviewed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Voyage {
    pub id: Uuid,
    pub charter_detail_id: Uuid,
    pub voyage_number: Option<String>,
    pub vessel_name: Option<String>,
    pub departure_port: Option<String>,
    pub arrival_port: Option<String>,
    pub planned_departure_at: Option<DateTime<Utc>>,
    pub planned_arrival_at: Option<DateTime<Utc>>,
    pub actual_departure_at: Option<DateTime<Utc>>,
    pub actual_arrival_at: Option<DateTime<Utc>>,
    /// Nautical miles
    pub distance_nm: Option<f64>,
    pub time_at_sea_hours: Option<f64>,
    /// Metric tonnes
    pub fuel_consumed_mt: Option<f64>,
    pub fuel_type: Option<String>,
    pub weather_summary: Option<String>,
    /// Defaults to `planned`
    pub status: String,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Port call within a voyage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VoyagePort {
    pub id: Uuid,
    pub voyage_id: Uuid,
    pub port_name: String,
    pub port_country: Option<String>,
    /// UN/LOCODE of the port, e.g. `NLRTM`
    pub port_unlocode: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub arrived_at: Option<DateTime<Utc>>,
    pub departed_at: Option<DateTime<Utc>>,
    pub laytime_hours: Option<f64>,
    pub cargo_operations: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Position report logged for a voyage
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ShipPosition {
    pub id: Uuid,
    pub voyage_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    /// WGS84 decimal degrees
    pub latitude: f64,
    /// WGS84 decimal degrees
    pub longitude: f64,
    pub speed_knots: Option<f64>,
    pub heading: Option<f64>,
    pub distance_logged_nm: Option<f64>,
    pub fuel_remaining_mt: Option<f64>,
    /// Defaults to `manual`
    pub source: String,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Time counted against the charter's laytime allowance
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaytimeEntry {
    pub id: Uuid,
    pub charter_detail_id: Uuid,
    /// Cleared when the voyage is deleted
    pub voyage_id: Option<Uuid>,
    pub port_name: String,
    pub activity: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub hours_counted: Option<f64>,
    pub remarks: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Payment {
    pub id: Uuid,
    pub charter_detail_id: Uuid,
    pub voyage_id: Option<Uuid>,
    /// Defaults to `general`
    pub category: String,
    pub due_date: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub amount: f64,
    /// Defaults to `USD`
    pub currency: String,
    /// Defaults to `pending`
    pub status: String,
    pub payment_method: Option<String>,
    pub reference: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Narrow status change for a payment. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PaymentStatusUpdate {
    pub status: String,
    pub paid_at: Option<DateTime<Utc>>,
    pub reference: Option<String>,
}

/// Claim raised by one party against a charter
///
/// Status moves informally open -> under_review -> resolved/closed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Dispute {
    pub id: Uuid,
    pub charter_detail_id: Uuid,
    pub voyage_id: Option<Uuid>,
    pub payment_id: Option<Uuid>,
    pub laytime_entry_id: Option<Uuid>,
    pub raised_by_org_id: Uuid,
    pub assigned_to_org_id: Option<Uuid>,
    pub subject: String,
    pub description: Option<String>,
    pub claimed_amount: Option<f64>,
    pub currency: Option<String>,
    /// Defaults to `open`
    pub status: String,
    pub resolution_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Narrow status change for a dispute. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisputeStatusUpdate {
    pub status: String,
    pub assigned_to_org_id: Option<Uuid>,
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CargoLoad {
    pub id: Uuid,
    pub voyage_id: Uuid,
    pub load_port: Option<String>,
    pub discharge_port: Option<String>,
    pub commodity: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub stowage_plan: Option<Value>,
    pub hazardous: Option<bool>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Bill of lading document reference
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BillOfLading {
    pub id: Uuid,
    pub charter_detail_id: Uuid,
    pub voyage_id: Option<Uuid>,
    pub document_number: String,
    pub issue_date: Option<DateTime<Utc>>,
    pub issuer: Option<String>,
    pub consignee: Option<String>,
    pub notify_party: Option<String>,
    pub cargo_description: Option<String>,
    pub quantity: Option<f64>,
    pub quantity_unit: Option<String>,
    /// Location of the scanned document
    pub storage_uri: Option<String>,
    /// Integrity checksum of the stored document
    pub checksum: Option<String>,
    /// Opaque wrapped key; never serialized
    #[serde(skip_serializing, default)]
    pub encrypted_key: Option<Vec<u8>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Demurrage claim
///
/// Status moves informally draft -> submitted -> settled/disputed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DemurrageRecord {
    pub id: Uuid,
    pub charter_detail_id: Uuid,
    pub voyage_id: Option<Uuid>,
    pub laytime_entry_id: Option<Uuid>,
    pub claimed_hours: Option<f64>,
    pub claimed_amount: Option<f64>,
    /// Defaults to `USD`
    pub currency: String,
    /// Defaults to `draft`
    pub status: String,
    pub reference: Option<String>,
    pub supporting_doc_uri: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Narrow status change for a demurrage claim. `None` keeps the stored value.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DemurrageStatusUpdate {
    pub status: String,
    pub reference: Option<String>,
    pub supporting_doc_uri: Option<String>,
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_password_hash_is_not_serialized() {
        let user = User {
            email: "ops@example.com".to_string(),
            password_hash: "$argon2id$v=19$...".to_string(),
            full_name: "Ops Desk".to_string(),
            role: "user".to_string(),
            ..Default::default()
        };

        let value = serde_json::to_value(&user).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["email"], "ops@example.com");
    }

    #[test]
    fn bill_of_lading_key_is_not_serialized() {
        let bill = BillOfLading {
            document_number: "BL-2024-001".to_string(),
            encrypted_key: Some(vec![1, 2, 3]),
            ..Default::default()
        };

        let value = serde_json::to_value(&bill).unwrap();
        assert!(value.get("encrypted_key").is_none());
        assert_eq!(value["document_number"], "BL-2024-001");
    }

    #[test]
    fn parse_vessel() {
        let s = r#"{
            "id": "6f1c1c2e-8a42-4d6b-9a55-2f0f7a0b6a10",
            "name": "NORDIC STAR",
            "imo_number": "9267560",
            "flag_state": "FI",
            "vessel_type": null,
            "call_sign": null,
            "deadweight_tonnage": 52000.0,
            "gross_tonnage": null,
            "net_tonnage": null,
            "capacity": {"holds": 5, "grain_cbm": 64000},
            "build_year": 2011,
            "class_society": null,
            "owner": null,
            "manager": null,
            "documentation_uri": null,
            "notes": null,
            "created_at": "2024-12-16T14:58:36Z",
            "updated_at": "2024-12-16T14:58:36Z"
        }"#;
        let vessel: Vessel = serde_json::from_str(s).unwrap();

        assert_eq!(vessel.name, "NORDIC STAR");
        assert_eq!(vessel.imo_number.as_deref(), Some("9267560"));
        assert_eq!(vessel.deadweight_tonnage, Some(52000.0));
        assert_eq!(vessel.capacity, Some(json!({"holds": 5, "grain_cbm": 64000})));
        assert_eq!(vessel.build_year, Some(2011));
        assert_eq!(vessel.vessel_type, None);
    }
}
