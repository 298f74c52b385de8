pub const ACTION_LOGIN: &str = "LOGIN";
pub const ACTION_HEART_RATE: &str = "HEART_RATE";

pub const LOGIN_SUCCESS: &str = "success";
pub const LOGIN_FAILED: &str = "failed";

/// One parsed line of the event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub date: String,
    pub user: String,
    pub action: String,
    pub value: String,
}

impl LogRecord {
    pub fn is_login(&self) -> bool {
        self.action == ACTION_LOGIN
    }

    pub fn is_heart_rate(&self) -> bool {
        self.action == ACTION_HEART_RATE
    }

    /// Heart-rate reading carried by this record, if it is one and the value is an integer.
    pub fn heart_rate(&self) -> Option<i64> {
        if !self.is_heart_rate() {
            return None;
        }
        self.value.trim().parse().ok()
    }
}
