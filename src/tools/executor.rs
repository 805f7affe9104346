//! Mock domain executor
//!
//! Stands in for the hospital backends. Every call produces a confirmation
//! string that echoes the arguments and embeds a fresh synthetic reference,
//! so identical inputs may yield different outputs.

use chrono::{SecondsFormat, Utc};
use log::{debug, warn};
use rand::Rng;
use serde_json::Value;

use crate::domain::Agent;

/// Returned when the tool name is outside the catalog
pub const UNKNOWN_TOOL_RESULT: &str = "Unknown tool execution.";

/// Trait for executing a domain action requested by the model
pub trait DomainExecutor: Send + Sync {
    /// Run the named action. Never fails; unknown names yield a sentinel string.
    fn execute(&self, tool_name: &str, args: &Value) -> String;
}

/// Executor producing synthetic confirmations without side effects
#[derive(Debug, Clone, Copy, Default)]
pub struct MockDomainExecutor;

impl MockDomainExecutor {
    pub fn new() -> Self {
        Self
    }

    fn patient_management(&self, args: &Value) -> String {
        let patient_no = rand::rng().random_range(0..1000);
        format!(
            "SUCCESS: Patient Management System processed: {}. Patient ID: P-{}",
            serialize_args(args),
            patient_no
        )
    }

    fn appointment_scheduler(&self, args: &Value) -> String {
        let reference = rand::rng().random_range(0..9999);
        let slot = args
            .get("date")
            .and_then(|d| d.as_str())
            .filter(|d| !d.is_empty())
            .unwrap_or("Requested Date");
        format!(
            "SUCCESS: Appointment System confirmed: {}. Slot confirmed for {}. Reference: APT-{}",
            serialize_args(args),
            slot,
            reference
        )
    }

    fn medical_records(&self, args: &Value) -> String {
        let now = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        format!(
            "SUCCESS: Medical Records Retrieved for {}. Data: [Diagnosis: Healthy, Last Visit: {}]",
            serialize_args(args),
            now
        )
    }

    fn billing(&self, args: &Value) -> String {
        let invoice = rand::rng().random_range(0..100000);
        format!(
            "SUCCESS: Billing System processed: {}. Invoice generated #{} amount: IDR 500,000.",
            serialize_args(args),
            invoice
        )
    }
}

impl DomainExecutor for MockDomainExecutor {
    fn execute(&self, tool_name: &str, args: &Value) -> String {
        let Some(agent) = Agent::from_wire_name(tool_name) else {
            warn!("Executor received unknown tool '{}'", tool_name);
            return UNKNOWN_TOOL_RESULT.to_string();
        };

        debug!("Executing {} with {}", agent, args);
        match agent {
            Agent::PatientManagement => self.patient_management(args),
            Agent::AppointmentScheduler => self.appointment_scheduler(args),
            Agent::MedicalRecords => self.medical_records(args),
            Agent::BillingAndPayments => self.billing(args),
        }
    }
}

/// Compact JSON, as embedded in every confirmation
pub fn serialize_args(args: &Value) -> String {
    args.to_string()
}
