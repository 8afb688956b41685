use futures::future::BoxFuture;
use reqwest::Client;
use serde::Deserialize;

use crate::core::identity::UserIdentity;
use crate::sync::keyring;
use crate::{Error, Result};

/// Third-party sign-in.
pub trait IdentityProvider: Send + Sync {
    fn sign_in(&self) -> BoxFuture<'_, Result<UserIdentity>>;

    fn sign_out(&self) -> BoxFuture<'_, Result<()>>;
}

/// Profile returned by the provider's sign-in endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    uid: String,
    #[serde(default, rename = "photoURL")]
    photo_url: Option<String>,
    #[serde(default)]
    display_name: Option<String>,
}

impl From<SignInResponse> for UserIdentity {
    fn from(resp: SignInResponse) -> Self {
        Self {
            uid: resp.uid,
            image: resp.photo_url,
            name: resp.display_name,
        }
    }
}

pub fn parse_sign_in(body: &str) -> Result<UserIdentity> {
    let resp: SignInResponse = serde_json::from_str(body)?;
    Ok(resp.into())
}

/// Provider reached over HTTP with credentials kept in the system keyring.
pub struct HttpIdentityProvider {
    auth_url: String,
    http: Client,
}

impl HttpIdentityProvider {
    pub fn new(auth_url: &str) -> Result<Self> {
        let auth_url = auth_url.trim().trim_end_matches('/');
        if auth_url.is_empty() {
            return Err(Error::NotConfigured("identity provider URL"));
        }
        Ok(Self {
            auth_url: auth_url.to_string(),
            http: Client::builder().build()?,
        })
    }

    pub fn auth_url(&self) -> &str {
        &self.auth_url
    }

    async fn do_sign_in(&self) -> Result<UserIdentity> {
        let (username, password) = keyring::load_credentials(&self.auth_url)
            .await?
            .ok_or(Error::NotConfigured("sign-in credentials"))?;

        let url = format!("{}/signIn", self.auth_url);
        let resp = self
            .http
            .post(&url)
            .basic_auth(&username, Some(&password))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(Error::from_response(&url, resp).await);
        }
        let identity = parse_sign_in(&resp.text().await?)?;
        log::info!("Signed in as {}", identity.display_name());
        Ok(identity)
    }

    async fn do_sign_out(&self) -> Result<()> {
        let url = format!("{}/signOut", self.auth_url);
        let resp = self.http.post(&url).send().await?;
        if !resp.status().is_success() {
            return Err(Error::from_response(&url, resp).await);
        }
        Ok(())
    }
}

impl IdentityProvider for HttpIdentityProvider {
    fn sign_in(&self) -> BoxFuture<'_, Result<UserIdentity>> {
        Box::pin(self.do_sign_in())
    }

    fn sign_out(&self) -> BoxFuture<'_, Result<()>> {
        Box::pin(self.do_sign_out())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_profile_maps_to_identity() {
        let id = parse_sign_in(
            r#"{"uid":"u-1","photoURL":"https://img.test/a.png","displayName":"Ada"}"#,
        )
        .unwrap();
        assert_eq!(id.uid, "u-1");
        assert_eq!(id.image.as_deref(), Some("https://img.test/a.png"));
        assert_eq!(id.name.as_deref(), Some("Ada"));
        assert_eq!(id.display_name(), "Ada");
    }

    #[test]
    fn profile_fields_are_optional() {
        let id = parse_sign_in(r#"{"uid":"u-2"}"#).unwrap();
        assert_eq!(id.image, None);
        assert_eq!(id.display_name(), "u-2");
    }

    #[test]
    fn empty_url_is_not_configured() {
        assert!(matches!(
            HttpIdentityProvider::new("  "),
            Err(Error::NotConfigured(_))
        ));
    }
}
