// Active speaker endpoint

use crate::auth::SessionToken;
use crate::client::DeviceClient;
use crate::error::Error;
use crate::models::Speaker;

impl DeviceClient {
    /// List the microphones that currently have the floor.
    ///
    /// `GET /api/speakers`. Order is preserved as the device reports it.
    pub async fn list_speakers(&self, token: &SessionToken) -> Result<Vec<Speaker>, Error> {
        self.get_authenticated("speakers", token).await
    }
}
