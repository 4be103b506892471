use uuid::Uuid;

/// Remembers who submitted an instance, keyed by (record, approval).
pub trait SubmitterCacheService: Send + Sync {
    fn get(&self, record_id: Uuid, approval_id: Uuid) -> Option<Uuid>;
    fn put(&self, record_id: Uuid, approval_id: Uuid, submitter: Uuid);
    fn evict(&self, record_id: Uuid, approval_id: Uuid);
}
