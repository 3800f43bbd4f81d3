//! Raw rows as read from the store, and their mapping into domain entities.

use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use super::codec::{decode_bytes, decode_document, decode_optional, decode_with_default};
use crate::models::{
    BillOfLading, CargoLoad, CharterDetail, DemurrageRecord, Dispute, LaytimeEntry, Payment,
    ShipPosition, User, Vessel, Voyage, VoyagePort,
};

/// Store-side defaults, mirrored by the migrations
pub(crate) mod defaults {
    pub const USER_ROLE: &str = "user";
    pub const CHARTER_STATUS: &str = "draft";
    pub const CHARTER_AI_STATUS: &str = "pending";
    pub const VOYAGE_STATUS: &str = "planned";
    pub const POSITION_SOURCE: &str = "manual";
    pub const PAYMENT_CATEGORY: &str = "general";
    pub const PAYMENT_STATUS: &str = "pending";
    pub const CURRENCY: &str = "USD";
    pub const DISPUTE_STATUS: &str = "open";
    pub const DEMURRAGE_STATUS: &str = "draft";
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    full_name: String,
    role: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            role: decode_with_default(row.role, defaults::USER_ROLE),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VesselRow {
    id: Uuid,
    name: String,
    imo_number: Option<String>,
    flag_state: Option<String>,
    vessel_type: Option<String>,
    call_sign: Option<String>,
    deadweight_tonnage: Option<f64>,
    gross_tonnage: Option<f64>,
    net_tonnage: Option<f64>,
    capacity: Option<Value>,
    build_year: Option<i16>,
    class_society: Option<String>,
    owner: Option<String>,
    manager: Option<String>,
    documentation_uri: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VesselRow> for Vessel {
    fn from(row: VesselRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            imo_number: decode_optional(row.imo_number),
            flag_state: decode_optional(row.flag_state),
            vessel_type: decode_optional(row.vessel_type),
            call_sign: decode_optional(row.call_sign),
            deadweight_tonnage: decode_optional(row.deadweight_tonnage),
            gross_tonnage: decode_optional(row.gross_tonnage),
            net_tonnage: decode_optional(row.net_tonnage),
            capacity: decode_document(row.capacity),
            build_year: decode_optional(row.build_year),
            class_society: decode_optional(row.class_society),
            owner: decode_optional(row.owner),
            manager: decode_optional(row.manager),
            documentation_uri: decode_optional(row.documentation_uri),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CharterDetailRow {
    id: Uuid,
    created_by_user_id: Option<Uuid>,
    title: String,
    charter_reference_code: Option<String>,
    vessel_name: Option<String>,
    counterparty_name: Option<String>,
    status: Option<String>,
    start_date: Option<DateTime<Utc>>,
    end_date: Option<DateTime<Utc>>,
    laytime_allowance_hours: Option<f64>,
    demurrage_rate: Option<f64>,
    demurrage_currency: Option<String>,
    fuel_clause: Option<String>,
    payment_terms: Option<String>,
    ai_status: Option<String>,
    ai_document_path: Option<String>,
    ai_extracted_terms: Option<Value>,
    last_reviewed_at: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CharterDetailRow> for CharterDetail {
    fn from(row: CharterDetailRow) -> Self {
        Self {
            id: row.id,
            created_by_user_id: decode_optional(row.created_by_user_id),
            title: row.title,
            charter_reference_code: decode_optional(row.charter_reference_code),
            vessel_name: decode_optional(row.vessel_name),
            counterparty_name: decode_optional(row.counterparty_name),
            status: decode_with_default(row.status, defaults::CHARTER_STATUS),
            start_date: decode_optional(row.start_date),
            end_date: decode_optional(row.end_date),
            laytime_allowance_hours: decode_optional(row.laytime_allowance_hours),
            demurrage_rate: decode_optional(row.demurrage_rate),
            demurrage_currency: decode_optional(row.demurrage_currency),
            fuel_clause: decode_optional(row.fuel_clause),
            payment_terms: decode_optional(row.payment_terms),
            ai_status: decode_with_default(row.ai_status, defaults::CHARTER_AI_STATUS),
            ai_document_path: decode_optional(row.ai_document_path),
            ai_extracted_terms: decode_document(row.ai_extracted_terms),
            last_reviewed_at: decode_optional(row.last_reviewed_at),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VoyageRow {
    id: Uuid,
    charter_detail_id: Uuid,
    voyage_number: Option<String>,
    vessel_name: Option<String>,
    departure_port: Option<String>,
    arrival_port: Option<String>,
    planned_departure_at: Option<DateTime<Utc>>,
    planned_arrival_at: Option<DateTime<Utc>>,
    actual_departure_at: Option<DateTime<Utc>>,
    actual_arrival_at: Option<DateTime<Utc>>,
    distance_nm: Option<f64>,
    time_at_sea_hours: Option<f64>,
    fuel_consumed_mt: Option<f64>,
    fuel_type: Option<String>,
    weather_summary: Option<String>,
    status: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VoyageRow> for Voyage {
    fn from(row: VoyageRow) -> Self {
        Self {
            id: row.id,
            charter_detail_id: row.charter_detail_id,
            voyage_number: decode_optional(row.voyage_number),
            vessel_name: decode_optional(row.vessel_name),
            departure_port: decode_optional(row.departure_port),
            arrival_port: decode_optional(row.arrival_port),
            planned_departure_at: decode_optional(row.planned_departure_at),
            planned_arrival_at: decode_optional(row.planned_arrival_at),
            actual_departure_at: decode_optional(row.actual_departure_at),
            actual_arrival_at: decode_optional(row.actual_arrival_at),
            distance_nm: decode_optional(row.distance_nm),
            time_at_sea_hours: decode_optional(row.time_at_sea_hours),
            fuel_consumed_mt: decode_optional(row.fuel_consumed_mt),
            fuel_type: decode_optional(row.fuel_type),
            weather_summary: decode_optional(row.weather_summary),
            status: decode_with_default(row.status, defaults::VOYAGE_STATUS),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct VoyagePortRow {
    id: Uuid,
    voyage_id: Uuid,
    port_name: String,
    port_country: Option<String>,
    port_unlocode: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    arrived_at: Option<DateTime<Utc>>,
    departed_at: Option<DateTime<Utc>>,
    laytime_hours: Option<f64>,
    cargo_operations: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<VoyagePortRow> for VoyagePort {
    fn from(row: VoyagePortRow) -> Self {
        Self {
            id: row.id,
            voyage_id: row.voyage_id,
            port_name: row.port_name,
            port_country: decode_optional(row.port_country),
            port_unlocode: decode_optional(row.port_unlocode),
            latitude: decode_optional(row.latitude),
            longitude: decode_optional(row.longitude),
            arrived_at: decode_optional(row.arrived_at),
            departed_at: decode_optional(row.departed_at),
            laytime_hours: decode_optional(row.laytime_hours),
            cargo_operations: decode_optional(row.cargo_operations),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ShipPositionRow {
    id: Uuid,
    voyage_id: Uuid,
    recorded_at: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    speed_knots: Option<f64>,
    heading: Option<f64>,
    distance_logged_nm: Option<f64>,
    fuel_remaining_mt: Option<f64>,
    source: Option<String>,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShipPositionRow> for ShipPosition {
    fn from(row: ShipPositionRow) -> Self {
        Self {
            id: row.id,
            voyage_id: row.voyage_id,
            recorded_at: row.recorded_at,
            latitude: row.latitude,
            longitude: row.longitude,
            speed_knots: decode_optional(row.speed_knots),
            heading: decode_optional(row.heading),
            distance_logged_nm: decode_optional(row.distance_logged_nm),
            fuel_remaining_mt: decode_optional(row.fuel_remaining_mt),
            source: decode_with_default(row.source, defaults::POSITION_SOURCE),
            remarks: decode_optional(row.remarks),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LaytimeEntryRow {
    id: Uuid,
    charter_detail_id: Uuid,
    voyage_id: Option<Uuid>,
    port_name: String,
    activity: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    hours_counted: Option<f64>,
    remarks: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LaytimeEntryRow> for LaytimeEntry {
    fn from(row: LaytimeEntryRow) -> Self {
        Self {
            id: row.id,
            charter_detail_id: row.charter_detail_id,
            voyage_id: decode_optional(row.voyage_id),
            port_name: row.port_name,
            activity: row.activity,
            started_at: row.started_at,
            ended_at: decode_optional(row.ended_at),
            hours_counted: decode_optional(row.hours_counted),
            remarks: decode_optional(row.remarks),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PaymentRow {
    id: Uuid,
    charter_detail_id: Uuid,
    voyage_id: Option<Uuid>,
    category: Option<String>,
    due_date: Option<DateTime<Utc>>,
    paid_at: Option<DateTime<Utc>>,
    amount: f64,
    currency: Option<String>,
    status: Option<String>,
    payment_method: Option<String>,
    reference: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: row.id,
            charter_detail_id: row.charter_detail_id,
            voyage_id: decode_optional(row.voyage_id),
            category: decode_with_default(row.category, defaults::PAYMENT_CATEGORY),
            due_date: decode_optional(row.due_date),
            paid_at: decode_optional(row.paid_at),
            amount: row.amount,
            currency: decode_with_default(row.currency, defaults::CURRENCY),
            status: decode_with_default(row.status, defaults::PAYMENT_STATUS),
            payment_method: decode_optional(row.payment_method),
            reference: decode_optional(row.reference),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DisputeRow {
    id: Uuid,
    charter_detail_id: Uuid,
    voyage_id: Option<Uuid>,
    payment_id: Option<Uuid>,
    laytime_entry_id: Option<Uuid>,
    raised_by_org_id: Uuid,
    assigned_to_org_id: Option<Uuid>,
    subject: String,
    description: Option<String>,
    claimed_amount: Option<f64>,
    currency: Option<String>,
    status: Option<String>,
    resolution_notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DisputeRow> for Dispute {
    fn from(row: DisputeRow) -> Self {
        Self {
            id: row.id,
            charter_detail_id: row.charter_detail_id,
            voyage_id: decode_optional(row.voyage_id),
            payment_id: decode_optional(row.payment_id),
            laytime_entry_id: decode_optional(row.laytime_entry_id),
            raised_by_org_id: row.raised_by_org_id,
            assigned_to_org_id: decode_optional(row.assigned_to_org_id),
            subject: row.subject,
            description: decode_optional(row.description),
            claimed_amount: decode_optional(row.claimed_amount),
            currency: decode_optional(row.currency),
            status: decode_with_default(row.status, defaults::DISPUTE_STATUS),
            resolution_notes: decode_optional(row.resolution_notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct CargoLoadRow {
    id: Uuid,
    voyage_id: Uuid,
    load_port: Option<String>,
    discharge_port: Option<String>,
    commodity: Option<String>,
    quantity: Option<f64>,
    unit: Option<String>,
    stowage_plan: Option<Value>,
    hazardous: Option<bool>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CargoLoadRow> for CargoLoad {
    fn from(row: CargoLoadRow) -> Self {
        Self {
            id: row.id,
            voyage_id: row.voyage_id,
            load_port: decode_optional(row.load_port),
            discharge_port: decode_optional(row.discharge_port),
            commodity: decode_optional(row.commodity),
            quantity: decode_optional(row.quantity),
            unit: decode_optional(row.unit),
            stowage_plan: decode_document(row.stowage_plan),
            hazardous: decode_optional(row.hazardous),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct BillOfLadingRow {
    id: Uuid,
    charter_detail_id: Uuid,
    voyage_id: Option<Uuid>,
    document_number: String,
    issue_date: Option<DateTime<Utc>>,
    issuer: Option<String>,
    consignee: Option<String>,
    notify_party: Option<String>,
    cargo_description: Option<String>,
    quantity: Option<f64>,
    quantity_unit: Option<String>,
    storage_uri: Option<String>,
    checksum: Option<String>,
    encrypted_key: Option<Vec<u8>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<BillOfLadingRow> for BillOfLading {
    fn from(row: BillOfLadingRow) -> Self {
        Self {
            id: row.id,
            charter_detail_id: row.charter_detail_id,
            voyage_id: decode_optional(row.voyage_id),
            document_number: row.document_number,
            issue_date: decode_optional(row.issue_date),
            issuer: decode_optional(row.issuer),
            consignee: decode_optional(row.consignee),
            notify_party: decode_optional(row.notify_party),
            cargo_description: decode_optional(row.cargo_description),
            quantity: decode_optional(row.quantity),
            quantity_unit: decode_optional(row.quantity_unit),
            storage_uri: decode_optional(row.storage_uri),
            checksum: decode_optional(row.checksum),
            encrypted_key: decode_bytes(row.encrypted_key),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct DemurrageRecordRow {
    id: Uuid,
    charter_detail_id: Uuid,
    voyage_id: Option<Uuid>,
    laytime_entry_id: Option<Uuid>,
    claimed_hours: Option<f64>,
    claimed_amount: Option<f64>,
    currency: Option<String>,
    status: Option<String>,
    reference: Option<String>,
    supporting_doc_uri: Option<String>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<DemurrageRecordRow> for DemurrageRecord {
    fn from(row: DemurrageRecordRow) -> Self {
        Self {
            id: row.id,
            charter_detail_id: row.charter_detail_id,
            voyage_id: decode_optional(row.voyage_id),
            laytime_entry_id: decode_optional(row.laytime_entry_id),
            claimed_hours: decode_optional(row.claimed_hours),
            claimed_amount: decode_optional(row.claimed_amount),
            currency: decode_with_default(row.currency, defaults::CURRENCY),
            status: decode_with_default(row.status, defaults::DEMURRAGE_STATUS),
            reference: decode_optional(row.reference),
            supporting_doc_uri: decode_optional(row.supporting_doc_uri),
            notes: decode_optional(row.notes),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
