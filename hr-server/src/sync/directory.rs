use super::{IntegrationSync, PullReport, RemotePerson};
use crate::gateways::Degrade;
use crate::store::StoreResult;

impl IntegrationSync {
    /// Upsert employees by email from directory entries
    pub async fn pull_directory_users(&self, actor: &str) -> StoreResult<PullReport> {
        let users = self.gateways.directory.search_users().await.degrade("directory_search");
        let mut report = PullReport::default();
        for user in &users {
            self.upsert_person(
                RemotePerson {
                    email: &user.email,
                    full_name: Some(&user.full_name),
                    phone: Some(&user.phone),
                },
                &mut report,
            )?;
        }
        self.audit(
            actor,
            "sync",
            "employee",
            format!(
                "from directory: created={}, updated={}, skipped={}",
                report.created, report.updated, report.skipped
            ),
        )?;
        Ok(report)
    }
}
