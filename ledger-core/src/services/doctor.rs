//! Doctor service - ledger integrity checks

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::json;

use crate::adapters::DuckDbStore;
use crate::domain::result::Result;

pub struct DoctorService {
    store: Arc<DuckDbStore>,
}

impl DoctorService {
    pub fn new(store: Arc<DuckDbStore>) -> Self {
        Self { store }
    }

    /// Run all health checks
    pub fn run_checks(&self) -> Result<DoctorResult> {
        let mut checks = BTreeMap::new();

        let negative = self.store.find_negative_balances()?;
        checks.insert(
            "negative_balances".to_string(),
            CheckResult::from_findings(
                &negative,
                "error",
                "No account has a negative balance".to_string(),
                format!("{} account(s) have a negative balance", negative.len()),
                |(account_id, _)| json!({ "account_id": account_id }),
            ),
        );

        let orphaned = self.store.find_orphaned_accounts()?;
        checks.insert(
            "orphaned_accounts".to_string(),
            CheckResult::from_findings(
                &orphaned,
                "error",
                "Every account belongs to an existing user".to_string(),
                format!("{} account(s) reference missing users", orphaned.len()),
                |(account_id, user_id)| json!({ "account_id": account_id, "user_id": user_id }),
            ),
        );

        let duplicates = self.store.find_duplicate_account_numbers()?;
        checks.insert(
            "duplicate_account_numbers".to_string(),
            CheckResult::from_findings(
                &duplicates,
                "error",
                "All account numbers are unique".to_string(),
                format!("{} account number(s) are shared", duplicates.len()),
                |(number, count)| json!({ "account_number": number, "count": count }),
            ),
        );

        let passed = checks.values().filter(|c| c.status == "pass").count();
        let errors = checks.values().filter(|c| c.status == "error").count();
        let warnings = checks.values().filter(|c| c.status == "warning").count();

        Ok(DoctorResult {
            checks,
            summary: DoctorSummary {
                total_checks: passed + errors + warnings,
                passed,
                warnings,
                errors,
            },
        })
    }
}

#[derive(Debug, Serialize)]
pub struct DoctorResult {
    pub checks: BTreeMap<String, CheckResult>,
    pub summary: DoctorSummary,
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub total_checks: usize,
    pub passed: usize,
    pub warnings: usize,
    pub errors: usize,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
    pub status: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<serde_json::Value>>,
}

impl CheckResult {
    fn from_findings<T>(
        findings: &[T],
        failing_status: &str,
        pass_message: String,
        fail_message: String,
        detail: impl Fn(&T) -> serde_json::Value,
    ) -> Self {
        if findings.is_empty() {
            Self {
                status: "pass".to_string(),
                message: pass_message,
                details: None,
            }
        } else {
            Self {
                status: failing_status.to_string(),
                message: fail_message,
                details: Some(findings.iter().map(detail).collect()),
            }
        }
    }
}
