// --- Default value functions ---

pub(super) fn default_service() -> String {
    "127.0.0.1:8080".to_string()
}
pub(super) fn default_true() -> bool {
    true
}
pub(super) fn default_retry_interval() -> u64 {
    1
}
pub(super) fn default_sqlite_db() -> String {
    "~/.signalbot/storage.db".to_string()
}
pub(super) fn default_redis_host() -> String {
    "127.0.0.1".to_string()
}
pub(super) fn default_redis_port() -> u16 {
    6379
}
pub(super) fn default_producers() -> usize {
    1
}
pub(super) fn default_consumers() -> usize {
    3
}
pub(super) fn default_initial_backoff() -> u64 {
    1
}
pub(super) fn default_max_backoff() -> u64 {
    300
}
pub(super) fn default_reset_after() -> u64 {
    180
}
pub(super) fn default_name() -> String {
    "signalbot".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
