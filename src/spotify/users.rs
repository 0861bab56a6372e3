use crate::{error::Error, spotify::SpotifyApi, types::UserProfile};

impl SpotifyApi {
    /// Fetches the authenticated user's id and display name.
    pub async fn current_user(&self, token: &str) -> Result<UserProfile, Error> {
        let api_url = format!("{uri}/me", uri = self.api_url);

        let response = self.client.get(&api_url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Fetch {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<UserProfile>().await?)
    }
}
