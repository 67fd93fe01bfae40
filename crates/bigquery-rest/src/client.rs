use std::path::Path;
use std::sync::Arc;

use http::Method;
use http::header::AUTHORIZATION;
use reqwest::{RequestBuilder, Response, Url};

use crate::auth::{Auth, Scope};
use crate::dataset::DatasetClient;
use crate::error::validate_response;
use crate::job::ActiveJob;
use crate::resources::Job;

/// The base URL for the service, missing the project id (which is always the
/// next path component).
const BASE_URL: &str = "https://bigquery.googleapis.com/bigquery/v2/projects";

/// Like [`BASE_URL`], but for requests that carry file contents alongside
/// their JSON payload.
const UPLOAD_BASE_URL: &str = "https://bigquery.googleapis.com/upload/bigquery/v2/projects";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Cheaply clonable BigQuery v2 REST API client, scoped to a single project.
#[derive(Debug, Clone)]
pub struct BigQueryClient {
    pub(crate) inner: Arc<InnerClient>,
}

impl BigQueryClient {
    pub async fn new(project_id: impl Into<Arc<str>>, scope: Scope) -> crate::Result<Self> {
        let auth = Auth::new(project_id, scope).await?;
        Self::new_from_auth(auth)
    }

    /// Like [`BigQueryClient::new`], with the project id resolved from the
    /// discovered credentials.
    pub async fn new_detect_project(scope: Scope) -> crate::Result<Self> {
        let auth = Auth::new_detect_project(scope).await?;
        Self::new_from_auth(auth)
    }

    pub fn new_from_auth(auth: Auth) -> crate::Result<Self> {
        let client = reqwest::Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::new_from_parts(auth, client))
    }

    pub fn new_from_parts(auth: Auth, client: reqwest::Client) -> Self {
        let base_url = project_url(BASE_URL, auth.project_id());
        let upload_url = project_url(UPLOAD_BASE_URL, auth.project_id());

        Self {
            inner: Arc::new(InnerClient {
                client,
                auth,
                base_url,
                upload_url,
            }),
        }
    }

    #[inline]
    pub fn project_id(&self) -> &str {
        self.inner.auth.project_id()
    }

    pub fn dataset<D>(&self, dataset_id: D) -> DatasetClient<D> {
        DatasetClient::from_parts(dataset_id, Arc::clone(&self.inner))
    }

    /// Submits `job`, streaming the file at `path` along as its source data.
    /// The returned [`ActiveJob`] can then be polled to completion.
    pub async fn start_load_job(
        &self,
        job: Job,
        path: impl AsRef<Path>,
    ) -> crate::Result<ActiveJob> {
        ActiveJob::start(self, job, path.as_ref()).await
    }
}

fn project_url(base: &str, project_id: &str) -> Url {
    let mut url = Url::parse(base).expect("base url is valid");

    url.path_segments_mut()
        .expect("base url can be a base")
        .push(project_id);

    url
}

#[derive(Debug)]
pub(crate) struct InnerClient {
    client: reqwest::Client,
    auth: Auth,
    base_url: Url,
    upload_url: Url,
}

impl InnerClient {
    #[inline]
    pub(crate) fn project_id(&self) -> &str {
        self.auth.project_id()
    }

    /// Appends `path` onto the project scoped base URL.
    pub(crate) fn make_url<P>(&self, path: P) -> Url
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut url = self.base_url.clone();

        url.path_segments_mut()
            .expect("base url can be a base")
            .extend(path);

        url
    }

    /// [`InnerClient::make_url`], against the media upload endpoint.
    pub(crate) fn make_upload_url<P>(&self, path: P) -> Url
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
    {
        let mut url = self.upload_url.clone();

        url.path_segments_mut()
            .expect("base url can be a base")
            .extend(path);

        url
    }

    /// Builds a request with the `Authorization` header already attached.
    pub(crate) async fn request(&self, method: Method, url: Url) -> crate::Result<RequestBuilder> {
        let header = self.auth.get_header().await?;

        let builder = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, header);

        Ok(builder)
    }

    pub(crate) async fn get(&self, url: Url) -> crate::Result<Response> {
        let response = self.request(Method::GET, url).await?.send().await?;
        validate_response(response).await
    }

    pub(crate) async fn post<T: serde::Serialize>(
        &self,
        url: Url,
        payload: &T,
    ) -> crate::Result<Response> {
        let response = self
            .request(Method::POST, url)
            .await?
            .json(payload)
            .send()
            .await?;

        validate_response(response).await
    }

    pub(crate) async fn delete(&self, url: Url) -> crate::Result<Response> {
        let response = self.request(Method::DELETE, url).await?.send().await?;
        validate_response(response).await
    }
}

/// Reads the full response body, then deserializes it as JSON.
pub(crate) async fn deserialize_json<T>(response: Response) -> crate::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(crate::Error::from)
}
