use std::collections::HashSet;

use async_trait::async_trait;
use domain_approval::service::UserPrivilegeService;
use uuid::Uuid;

/// Administrators are listed in configuration.
pub struct ConfigPrivilegeService {
    admins: HashSet<Uuid>,
}

impl ConfigPrivilegeService {
    pub fn new(admins: &[Uuid]) -> Self {
        Self {
            admins: admins.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl UserPrivilegeService for ConfigPrivilegeService {
    async fn is_admin(&self, user: Uuid) -> anyhow::Result<bool> {
        Ok(self.admins.contains(&user))
    }
}
