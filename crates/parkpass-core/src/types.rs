use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

pub type VehicleId = i64;

// ---------------------------------------------------------------------------
// Vehicle
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    /// Always lowercase; unique across the registry.
    pub name: String,
    pub plate: String,
    pub model: String,
}

impl std::fmt::Display for Vehicle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} ({})", self.name, self.plate, self.model)
    }
}

// ---------------------------------------------------------------------------
// Parser output
// ---------------------------------------------------------------------------

/// Raw result of parsing one message. Either half may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedMessage {
    pub vehicle: Option<String>,
    pub entry_time: Option<DateTime<FixedOffset>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VehicleRef {
    Resolved(Vehicle),
    Unresolved,
}

impl VehicleRef {
    pub fn as_vehicle(&self) -> Option<&Vehicle> {
        match self {
            VehicleRef::Resolved(v) => Some(v),
            VehicleRef::Unresolved => None,
        }
    }
}

/// A message whose time was understood, ready for submission once the
/// vehicle is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub vehicle: VehicleRef,
    pub entry_time: DateTime<FixedOffset>,
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: i64,
    pub vehicle_name: String,
    pub plate: String,
    pub model: String,
    pub entry_time: DateTime<FixedOffset>,
    pub created_at: DateTime<FixedOffset>,
    pub response_text: String,
}

impl OrderRecord {
    pub fn is_active(&self, now: DateTime<FixedOffset>) -> bool {
        self.entry_time >= now
    }
}

// ---------------------------------------------------------------------------
// SubmissionResult
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResult {
    pub success: bool,
    pub message: String,
}

impl SubmissionResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}
