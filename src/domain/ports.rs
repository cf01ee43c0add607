use crate::domain::model::{Blob, MissingScorePolicy, ObjectUrl, User};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Session-scoped token storage. The gateway reads it on every request.
pub trait SessionStore: Send + Sync {
    fn token(&self) -> Option<String>;
    fn set_token(&self, token: Option<String>);

    fn clear(&self) {
        self.set_token(None);
    }
}

/// 登入結果的回呼
pub trait LoginObserver: Send + Sync {
    fn on_success(&self);
    fn set_user(&self, user: User);
    fn set_error(&self, message: String);
}

#[async_trait]
pub trait Exporter: Send + Sync {
    async fn export(&self) -> Result<Vec<u8>>;
}

#[async_trait]
pub trait PrintWindow: Send {
    async fn wait_loaded(&mut self) -> Result<()>;
    async fn print(&mut self) -> Result<()>;
}

#[async_trait]
pub trait PrintHost: Send + Sync {
    async fn create_object_url(&self, blob: Blob) -> Result<ObjectUrl>;
    async fn open_window(&self, url: &ObjectUrl) -> Result<Box<dyn PrintWindow>>;
    fn revoke_object_url(&self, url: &ObjectUrl);
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn missing_score_policy(&self) -> MissingScorePolicy;
}
