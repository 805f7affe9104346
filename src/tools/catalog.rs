//! Tool catalog for the hospital coordinator
//!
//! Four fixed descriptors, one per domain agent. Parameter schemas are
//! advisory: they are handed to the model and never checked locally.

use serde_json::{Map, Value, json};

use crate::domain::Agent;
use crate::llm::ToolDefinition;

/// One declared parameter of a tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    /// Schema type name as understood by the model API
    pub param_type: &'static str,
    pub description: &'static str,
    pub required: bool,
}

impl ParamSpec {
    const fn required(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: "STRING",
            description,
            required: true,
        }
    }

    const fn optional(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            param_type: "STRING",
            description,
            required: false,
        }
    }
}

/// Declarative description of a callable domain action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolDescriptor {
    pub agent: Agent,
    pub description: &'static str,
    pub params: Vec<ParamSpec>,
}

impl ToolDescriptor {
    pub fn name(&self) -> &'static str {
        self.agent.wire_name()
    }

    /// Names of required parameters, in declaration order
    pub fn required_params(&self) -> Vec<&'static str> {
        self.params.iter().filter(|p| p.required).map(|p| p.name).collect()
    }

    /// OBJECT schema for the model's function declaration
    pub fn parameter_schema(&self) -> Value {
        let mut properties = Map::new();
        for param in &self.params {
            properties.insert(
                param.name.to_string(),
                json!({ "type": param.param_type, "description": param.description }),
            );
        }

        json!({
            "type": "OBJECT",
            "properties": properties,
            "required": self.required_params()
        })
    }

    /// Convert to LLM ToolDefinition for API calls
    pub fn to_llm_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description, self.parameter_schema())
    }
}

/// Ordered, immutable list of tool descriptors
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    tools: Vec<ToolDescriptor>,
}

impl ToolCatalog {
    /// The four hospital subsystems, in fixed order
    pub fn hospital() -> Self {
        let tools = Agent::ALL.into_iter().map(describe).collect();
        Self { tools }
    }

    /// Get the descriptor for an agent
    pub fn get(&self, agent: Agent) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.agent == agent)
    }

    /// Find a descriptor by wire name
    pub fn find(&self, name: &str) -> Option<&ToolDescriptor> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.tools.iter()
    }

    /// List all tool names in catalog order
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    /// Model-facing definitions in catalog order
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.iter().map(|t| t.to_llm_definition()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolCatalog {
    fn default() -> Self {
        Self::hospital()
    }
}

fn describe(agent: Agent) -> ToolDescriptor {
    match agent {
        Agent::PatientManagement => ToolDescriptor {
            agent,
            description: "Manages patient registration, demographics updates, and patient status (admitted, discharged).",
            params: vec![
                ParamSpec::required("action", "The action to perform (e.g., register, update_status, get_info)"),
                ParamSpec::required("details", "Details of the patient or change required"),
            ],
        },
        Agent::AppointmentScheduler => ToolDescriptor {
            agent,
            description: "Handles booking, modifying, canceling appointments, and checking schedule availability.",
            params: vec![
                ParamSpec::required("action", "book, cancel, reschedule, check_availability"),
                ParamSpec::optional("date", "Date and time of appointment"),
                ParamSpec::optional("doctor", "Name of the doctor or department"),
                ParamSpec::optional("patientId", "Patient identifier"),
            ],
        },
        Agent::MedicalRecords => ToolDescriptor {
            agent,
            description: "Retrieves, summarizes, or updates patient medical history, diagnosis, and prescriptions.",
            params: vec![
                ParamSpec::required("patientId", "Patient identifier"),
                ParamSpec::required("requestType", "summary, diagnosis, prescription, lab_result"),
            ],
        },
        Agent::BillingAndPayments => ToolDescriptor {
            agent,
            description: "Manages financial transactions, billing details, insurance claims, and invoices.",
            params: vec![
                ParamSpec::required("patientId", "Patient identifier"),
                ParamSpec::required("action", "generate_invoice, check_balance, process_payment"),
            ],
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hospital_catalog_order() {
        let catalog = ToolCatalog::hospital();
        assert_eq!(catalog.len(), 4);
        assert_eq!(
            catalog.names(),
            vec!["PatientManagement", "AppointmentScheduler", "MedicalRecords", "BillingAndPayments"]
        );
    }

    #[test]
    fn test_get_and_find_agree() {
        let catalog = ToolCatalog::hospital();
        for agent in Agent::ALL {
            let by_agent = catalog.get(agent).unwrap();
            let by_name = catalog.find(agent.wire_name()).unwrap();
            assert_eq!(by_agent, by_name);
        }
        assert!(catalog.find("Pharmacy").is_none());
    }

    #[test]
    fn test_scheduler_required_params() {
        let catalog = ToolCatalog::hospital();
        let scheduler = catalog.get(Agent::AppointmentScheduler).unwrap();
        assert_eq!(scheduler.required_params(), vec!["action"]);
        assert_eq!(scheduler.params.len(), 4);
    }

    #[test]
    fn test_parameter_schema_shape() {
        let catalog = ToolCatalog::hospital();
        let schema = catalog.get(Agent::MedicalRecords).unwrap().parameter_schema();

        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(schema["properties"]["patientId"]["type"], "STRING");
        assert_eq!(schema["properties"]["requestType"]["description"], "summary, diagnosis, prescription, lab_result");
        assert_eq!(schema["required"], json!(["patientId", "requestType"]));
    }

    #[test]
    fn test_definitions_match_descriptors() {
        let catalog = ToolCatalog::hospital();
        let defs = catalog.definitions();
        assert_eq!(defs.len(), 4);
        assert_eq!(defs[3].name, "BillingAndPayments");
        assert!(defs[3].description.contains("invoices"));
        assert_eq!(defs[3].parameters["required"], json!(["patientId", "action"]));
    }

    #[test]
    fn test_every_descriptor_has_required_param() {
        for tool in ToolCatalog::hospital().iter() {
            assert!(!tool.required_params().is_empty(), "{} has no required params", tool.name());
        }
    }
}
