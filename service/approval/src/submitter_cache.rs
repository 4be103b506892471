use dashmap::DashMap;
use domain_approval::service::SubmitterCacheService;
use uuid::Uuid;

/// In-process submitter cache. Entries live until evicted.
#[derive(Default)]
pub struct SubmitterCacheServiceImpl {
    entries: DashMap<(Uuid, Uuid), Uuid>,
}

impl SubmitterCacheServiceImpl {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SubmitterCacheService for SubmitterCacheServiceImpl {
    fn get(&self, record_id: Uuid, approval_id: Uuid) -> Option<Uuid> {
        self.entries.get(&(record_id, approval_id)).map(|e| *e.value())
    }

    fn put(&self, record_id: Uuid, approval_id: Uuid, submitter: Uuid) {
        self.entries.insert((record_id, approval_id), submitter);
    }

    fn evict(&self, record_id: Uuid, approval_id: Uuid) {
        self.entries.remove(&(record_id, approval_id));
    }
}
