//! Batch creation. Calls are issued one after another and nothing is rolled
//! back when one of them fails.

use serde::Serialize;
use tracing::{info, warn};

use crate::models::{Beehive, NewBeehive, Session};
use crate::services::beehive_service::{BeehiveError, BeehiveService};
use crate::services::validation;

#[derive(Debug, Clone, Serialize)]
pub struct BulkFailure {
    /// Position of the failed input, starting at 0.
    pub index: usize,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkReport {
    pub requested: usize,
    pub created: Vec<Beehive>,
    pub failures: Vec<BulkFailure>,

    /// The backend rejected the session partway; later inputs were not sent.
    pub session_rejected: bool,
}

impl BulkReport {
    #[must_use]
    pub fn succeeded(&self) -> usize {
        self.created.len()
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.failures.len()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    #[must_use]
    pub fn summary(&self) -> String {
        format!("{} of {} succeeded", self.succeeded(), self.requested)
    }
}

/// Creates `quantity` hives from the same template.
///
/// # Errors
///
/// Returns [`BeehiveError::Validation`] before any write when `quantity`
/// is outside `1..=100`.
pub async fn create_batch(
    service: &dyn BeehiveService,
    session: &Session,
    template: &NewBeehive,
    quantity: usize,
) -> Result<BulkReport, BeehiveError> {
    validation::validate_quantity(quantity)?;
    let inputs = vec![template.clone(); quantity];
    create_many(service, session, inputs).await
}

/// Creates each input in order, awaiting every call before the next.
///
/// An auth failure stops the batch, since every later call would fail too;
/// the report then has `session_rejected` set.
pub async fn create_many(
    service: &dyn BeehiveService,
    session: &Session,
    inputs: Vec<NewBeehive>,
) -> Result<BulkReport, BeehiveError> {
    validation::validate_quantity(inputs.len())?;

    let requested = inputs.len();
    let mut report = BulkReport {
        requested,
        created: Vec::with_capacity(requested),
        failures: Vec::new(),
        session_rejected: false,
    };

    for (index, input) in inputs.into_iter().enumerate() {
        match service.create(session, input).await {
            Ok(hive) => report.created.push(hive),
            Err(err) if err.is_auth_failure() => {
                warn!(index, "Bulk create stopped: session rejected");
                report.failures.push(BulkFailure {
                    index,
                    error: err.to_string(),
                });
                report.session_rejected = true;
                break;
            }
            Err(err) => {
                warn!(index, error = %err, "Bulk create item failed");
                report.failures.push(BulkFailure {
                    index,
                    error: err.to_string(),
                });
            }
        }
    }

    info!(
        requested,
        succeeded = report.succeeded(),
        failed = report.failed(),
        "Bulk create finished"
    );
    Ok(report)
}
