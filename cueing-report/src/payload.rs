use crate::error::ReportError;
use cueing_core::{LayoutId, LayoutType, ResultRecord, Subject, TEST_TYPE};
use serde::Serialize;

/// One trial as the collecting server stores it. Trial number and response
/// time travel as decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRecord {
    pub participant: String,
    pub condition: String,
    pub test_type: String,
    pub trial_number: String,
    pub layout_id: LayoutId,
    pub layout_type: LayoutType,
    pub result: &'static str,
    pub response_time: String,
}

/// Request body for the results endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub participant: String,
    pub condition: String,
    pub test_type: String,
    pub results: Vec<WireRecord>,
}

impl Submission {
    /// Stamps every record with the subject entered on the end screen; the
    /// identity is only known after the trials have run.
    pub fn new(subject: &Subject, records: &[ResultRecord]) -> Self {
        let results = records
            .iter()
            .map(|r| WireRecord {
                participant: subject.participant().to_string(),
                condition: subject.condition().to_string(),
                test_type: TEST_TYPE.to_string(),
                trial_number: r.trial_number.to_string(),
                layout_id: r.layout_id.clone(),
                layout_type: r.layout_type,
                result: r.result.as_str(),
                response_time: r.response_time_ms.to_string(),
            })
            .collect();

        Self {
            participant: subject.participant().to_string(),
            condition: subject.condition().to_string(),
            test_type: TEST_TYPE.to_string(),
            results,
        }
    }

    /// Validates the end-screen form before building the payload.
    pub fn from_form(
        participant: &str,
        condition: Option<&str>,
        records: &[ResultRecord],
    ) -> Result<Self, ReportError> {
        let subject = Subject::new(participant, condition)?;
        Ok(Self::new(&subject, records))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
