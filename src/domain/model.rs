use serde::{Deserialize, Serialize};
use std::fmt;

/// 登入憑證，只存在於單次呼叫期間
#[derive(Clone, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque user object returned by the login endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct User(pub serde_json::Value);

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    Authenticated(User),
    /// 伺服器回應成功但未通過驗證
    Rejected(String),
    /// 非 2xx 回應或傳輸失敗
    Failed(String),
    /// 較新的登入呼叫已經開始，這次的回應被丟棄
    Superseded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Prelim,
    Midterm,
    Final,
}

impl Period {
    pub const ALL: [Period; 3] = [Period::Prelim, Period::Midterm, Period::Final];

    pub fn label(&self) -> &'static str {
        match self {
            Period::Prelim => "Prelim",
            Period::Midterm => "Midterm",
            Period::Final => "Final",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Score {
    Missing,
    Value(f64),
}

impl Score {
    pub fn value(&self) -> Option<f64> {
        match self {
            Score::Missing => None,
            Score::Value(v) => Some(*v),
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Score::Missing)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodScores {
    pub prelim: Score,
    pub midterm: Score,
    pub finals: Score,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingScorePolicy {
    #[default]
    CountAsZero,
    Exclude,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradeAverage {
    /// `None` only when every period is missing under `Exclude`
    pub value: Option<f64>,
    pub counted: usize,
    pub missing: Vec<Period>,
}

impl GradeAverage {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentGrade {
    pub student: String,
    pub scores: PeriodScores,
}

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Clone)]
pub struct Blob {
    pub bytes: Vec<u8>,
    pub mime: &'static str,
}

impl Blob {
    pub fn spreadsheet(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            mime: XLSX_MIME,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectUrl(pub url::Url);

impl ObjectUrl {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ObjectUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrintOutcome {
    /// 沒有可用的匯出來源
    Skipped,
    Printed,
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_redacts_password() {
        let creds = Credentials::new("jdoe", "hunter2");
        let printed = format!("{:?}", creds);
        assert!(printed.contains("jdoe"));
        assert!(!printed.contains("hunter2"));
    }

    #[test]
    fn test_login_response_defaults() {
        let response: LoginResponse =
            serde_json::from_value(serde_json::json!({"message": "bad password"})).unwrap();
        assert!(!response.success);
        assert!(response.user.is_none());
        assert_eq!(response.message.as_deref(), Some("bad password"));

        let response: LoginResponse =
            serde_json::from_value(serde_json::json!({"success": true, "user": null})).unwrap();
        assert!(response.success);
        assert!(response.user.is_none());
    }
}
