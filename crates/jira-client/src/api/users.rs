//! The authenticated user.

use crate::client::JiraClient;
use crate::domain::User;
use crate::domain::raw::RawUser;
use crate::error::Result;

impl JiraClient {
    /// The user the credentials belong to.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, typically
    /// [`ErrorKind::Authentication`](crate::ErrorKind::Authentication) for
    /// bad credentials.
    pub async fn myself(&self) -> Result<User> {
        let raw: RawUser = self.get(&["myself"], &[]).await?;
        Ok(raw.into())
    }
}
