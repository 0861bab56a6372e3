use crate::{
    error::Error,
    spotify::SpotifyApi,
    types::{Token, TokenResponse},
};

impl SpotifyApi {
    /// Builds the authorization URL the user is redirected to for consent.
    ///
    /// Uses the plain authorization-code flow: the code returned to the
    /// callback route is exchanged server-side together with the client
    /// secret. `show_dialog=true` forces the consent screen so switching
    /// accounts stays possible.
    pub fn authorize_url(&self) -> String {
        format!(
            "{auth_url}?client_id={client_id}&response_type=code&scope={scope}&redirect_uri={redirect_uri}&show_dialog=true",
            auth_url = self.auth_url,
            client_id = self.client_id,
            scope = urlencoding::encode(&self.scope),
            redirect_uri = urlencoding::encode(&self.redirect_uri),
        )
    }

    /// Trades a one-time authorization code for an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the provider rejects the code (non-2xx),
    /// carrying the status and response body. The code is single-use; the
    /// caller must restart the login flow on failure.
    pub async fn exchange_code(&self, code: &str) -> Result<Token, Error> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &self.redirect_uri),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                status: status.as_u16(),
                body,
            });
        }

        let token_response = response.json::<TokenResponse>().await?;
        Ok(token_response.into_token())
    }

    /// Trades a refresh token for a new access token and expiry.
    ///
    /// The response may omit a rotated refresh token; the caller decides
    /// whether to retain the old one (see [`Token::apply_refresh`]).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Auth`] when the provider rejects the refresh token;
    /// the user must re-authenticate in that case.
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
                ("client_id", &self.client_id),
                ("client_secret", &self.client_secret),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<TokenResponse>().await?)
    }
}
