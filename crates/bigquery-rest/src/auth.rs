//! Token acquisition and caching on top of [`gcp_auth`].

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use bytes::BytesMut;
use gcp_auth::{Token, TokenProvider};
use http::HeaderValue;

/// Cheaply clonable handle that turns credentials discovered in the
/// environment into `Authorization` header values.
#[derive(Clone)]
pub struct Auth {
    provider: Arc<dyn TokenProvider>,
    project_id: Arc<str>,
    scope: Scope,
    cached: Arc<RwLock<Option<CachedHeader>>>,
}

struct CachedHeader {
    header: HeaderValue,
    token: Arc<Token>,
}

impl Auth {
    pub async fn new(project_id: impl Into<Arc<str>>, scope: Scope) -> crate::Result<Self> {
        let provider = gcp_auth::provider().await?;
        Ok(Self::new_from_provider(provider, project_id.into(), scope))
    }

    /// Like [`Auth::new`], but asks the discovered credentials which project
    /// they belong to instead of being told.
    pub async fn new_detect_project(scope: Scope) -> crate::Result<Self> {
        let provider = gcp_auth::provider().await?;
        let project_id = provider.project_id().await?;
        Ok(Self::new_from_provider(provider, project_id, scope))
    }

    pub fn new_from_provider(
        provider: Arc<dyn TokenProvider>,
        project_id: Arc<str>,
        scope: Scope,
    ) -> Self {
        Self {
            provider,
            project_id,
            scope,
            cached: Arc::new(RwLock::new(None)),
        }
    }

    #[inline]
    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    #[inline]
    pub const fn scope(&self) -> Scope {
        self.scope
    }

    fn get_cached_header(&self) -> Option<HeaderValue> {
        let guard = self.cached.read().unwrap_or_else(PoisonError::into_inner);

        let cached = guard.as_ref()?;

        if cached.token.has_expired() {
            None
        } else {
            Some(cached.header.clone())
        }
    }

    /// Returns a ready to use `Authorization` header value, requesting a new
    /// token only when the cached one is missing or expired.
    pub async fn get_header(&self) -> crate::Result<HeaderValue> {
        if let Some(header) = self.get_cached_header() {
            tracing::trace!("re-using cached auth header");
            return Ok(header);
        }

        let token = self.provider.token(&[self.scope.scope_uri()]).await?;
        let header = build_header(token.as_str())?;

        let mut guard = self.cached.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(CachedHeader {
            header: header.clone(),
            token,
        });

        Ok(header)
    }
}

impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Auth")
            .field("project_id", &self.project_id)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

fn build_header(token: &str) -> crate::Result<HeaderValue> {
    const BEARER_PREFIX: &str = "Bearer ";

    let mut dst = BytesMut::with_capacity(BEARER_PREFIX.len() + token.len());
    dst.extend_from_slice(BEARER_PREFIX.as_bytes());
    dst.extend_from_slice(token.as_bytes());

    let mut header = HeaderValue::from_maybe_shared(dst.freeze())?;
    header.set_sensitive(true);
    Ok(header)
}

/// The OAuth2 scopes this crate can request tokens for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// Full create/read/delete access to datasets, tables and jobs.
    BigQueryAdmin,
    BigQueryReadWrite,
    BigQueryReadOnly,
}

impl Scope {
    pub const BIG_QUERY_ADMIN: &'static str = "https://www.googleapis.com/auth/bigquery";
    pub const BIG_QUERY_READ_WRITE: &'static str =
        "https://www.googleapis.com/auth/bigquery.insertdata";
    pub const BIG_QUERY_READ_ONLY: &'static str =
        "https://www.googleapis.com/auth/bigquery.readonly";

    #[inline]
    pub const fn scope_uri(&self) -> &'static str {
        match self {
            Self::BigQueryAdmin => Self::BIG_QUERY_ADMIN,
            Self::BigQueryReadWrite => Self::BIG_QUERY_READ_WRITE,
            Self::BigQueryReadOnly => Self::BIG_QUERY_READ_ONLY,
        }
    }

    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BigQueryAdmin => "BigQueryAdmin",
            Self::BigQueryReadWrite => "BigQueryReadWrite",
            Self::BigQueryReadOnly => "BigQueryReadOnly",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_headers_are_well_formed() {
        let header = build_header("ya29.fake-token").unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer ya29.fake-token");
        assert!(header.is_sensitive());
    }

    #[test]
    fn scope_uris_point_at_bigquery() {
        for scope in [
            Scope::BigQueryAdmin,
            Scope::BigQueryReadWrite,
            Scope::BigQueryReadOnly,
        ] {
            assert!(
                scope
                    .scope_uri()
                    .starts_with("https://www.googleapis.com/auth/bigquery")
            );
        }
    }
}
