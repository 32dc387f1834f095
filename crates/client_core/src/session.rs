use std::sync::Arc;

use shared::protocol::LoginForm;
use tracing::info;

use crate::{error::SyncResult, transport::RestTransport};

/// Cookie-session handling against the backend's `/auth` surface.
///
/// A successful login answers 303 with a session cookie; the transport's
/// cookie jar then carries it on every request, so nothing is stored here.
pub struct Session {
    transport: Arc<RestTransport>,
}

impl Session {
    pub fn new(transport: Arc<RestTransport>) -> Self {
        Self { transport }
    }

    pub async fn login(&self, email: &str, password: &str) -> SyncResult<()> {
        let url = self.transport.auth_url("login");
        let form = LoginForm {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.transport.post_form(&url, &form).await?;
        info!(email, "session established");
        Ok(())
    }

    pub async fn logout(&self) -> SyncResult<()> {
        let url = self.transport.auth_url("logout");
        self.transport.get_ok(&url).await?;
        info!("session cleared");
        Ok(())
    }
}
