//! Domain agents and the activity state shown while a request is routed
//!
//! The four hospital subsystems form a closed set. Their wire names double as
//! tool names in the model catalog and as tags on assistant messages.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoordinatorError;

/// One of the four mocked hospital subsystems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Agent {
    PatientManagement,
    AppointmentScheduler,
    MedicalRecords,
    BillingAndPayments,
}

impl Agent {
    /// All agents in catalog order
    pub const ALL: [Agent; 4] = [
        Agent::PatientManagement,
        Agent::AppointmentScheduler,
        Agent::MedicalRecords,
        Agent::BillingAndPayments,
    ];

    /// Name used on the wire and in the tool catalog
    pub fn wire_name(&self) -> &'static str {
        match self {
            Agent::PatientManagement => "PatientManagement",
            Agent::AppointmentScheduler => "AppointmentScheduler",
            Agent::MedicalRecords => "MedicalRecords",
            Agent::BillingAndPayments => "BillingAndPayments",
        }
    }

    /// Short human label for display
    pub fn label(&self) -> &'static str {
        match self {
            Agent::PatientManagement => "Patient Management",
            Agent::AppointmentScheduler => "Appointment Scheduler",
            Agent::MedicalRecords => "Medical Records",
            Agent::BillingAndPayments => "Billing & Payments",
        }
    }

    /// Look up an agent by wire name, exact match only
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.wire_name() == name)
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Agent {
    type Err = CoordinatorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire_name(s).ok_or_else(|| CoordinatorError::UnknownTool(s.to_string()))
    }
}

/// What the coordinator is doing right now, as seen by an observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Activity {
    /// Nothing in flight
    #[default]
    Idle,
    /// Request received, waiting on the model to decide
    Coordinating,
    /// A domain agent was selected for this cycle
    Tool(Agent),
}

impl Activity {
    /// The active domain agent, if any
    pub fn agent(&self) -> Option<Agent> {
        match self {
            Activity::Tool(agent) => Some(*agent),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Activity::Idle)
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Activity::Idle => f.write_str("idle"),
            Activity::Coordinating => f.write_str("coordinator"),
            Activity::Tool(agent) => write!(f, "{}", agent),
        }
    }
}
