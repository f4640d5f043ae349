//! reqwest implementation of the repository traits against the REST backend.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::domain::student::{NewStudent, Student, UpdateStudent};
use crate::domain::types::StudentId;
use crate::domain::user::{AccessToken, Credentials, NewUser, User};
use crate::dto::api::{ApiErrorBody, MessageResponse, StudentListResponse, TokenVerification};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AuthProvider, ListQuery, ListResult, StudentReader, StudentWriter};

/// HTTP-backed repository. Clones share the same session token.
#[derive(Clone)]
pub struct HttpRepository {
    http: Client,
    base_url: String,
    token: Arc<RwLock<Option<AccessToken>>>,
}

impl HttpRepository {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> RepositoryResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            http,
            base_url,
            token: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path));
        match self.token.read().as_ref() {
            Some(token) => builder.bearer_auth(&token.access_token),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> RepositoryResult<T> {
        let response = builder.send().await?;
        let response = self.check_status(response).await?;
        Ok(response.json::<T>().await?)
    }

    /// Maps non-success responses onto repository errors, surfacing the
    /// backend's `detail` message.
    async fn check_status(&self, response: Response) -> RepositoryResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let fallback = status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string();
        let detail = response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.message())
            .unwrap_or(fallback);

        Err(match status {
            StatusCode::UNAUTHORIZED => {
                if self.token.write().take().is_some() {
                    log::warn!("Session rejected by backend, signing out: {detail}");
                }
                RepositoryError::Unauthorized(detail)
            }
            StatusCode::NOT_FOUND => RepositoryError::NotFound(detail),
            StatusCode::UNPROCESSABLE_ENTITY => RepositoryError::ValidationError(detail),
            _ => RepositoryError::Api {
                status: status.as_u16(),
                detail,
            },
        })
    }
}

#[async_trait]
impl StudentReader for HttpRepository {
    async fn list_students(&self, query: &ListQuery) -> RepositoryResult<ListResult<Student>> {
        log::debug!("GET /students {query:?}");
        let response: StudentListResponse = self
            .send(self.request(Method::GET, "/students").query(query))
            .await?;
        Ok(response.into())
    }

    async fn list_all_students(&self) -> RepositoryResult<Vec<Student>> {
        self.send(self.request(Method::GET, "/students/all")).await
    }

    async fn get_student_by_id(&self, id: StudentId) -> RepositoryResult<Option<Student>> {
        match self
            .send(self.request(Method::GET, &format!("/students/{id}")))
            .await
        {
            Ok(student) => Ok(Some(student)),
            Err(RepositoryError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn list_courses(&self) -> RepositoryResult<Vec<String>> {
        self.send(self.request(Method::GET, "/students/courses"))
            .await
    }

    async fn list_cities(&self) -> RepositoryResult<Vec<String>> {
        self.send(self.request(Method::GET, "/students/cities"))
            .await
    }
}

#[async_trait]
impl StudentWriter for HttpRepository {
    async fn create_student(&self, new_student: &NewStudent) -> RepositoryResult<Student> {
        self.send(self.request(Method::POST, "/students").json(new_student))
            .await
    }

    async fn update_student(
        &self,
        id: StudentId,
        updates: &UpdateStudent,
    ) -> RepositoryResult<Student> {
        self.send(
            self.request(Method::PUT, &format!("/students/{id}"))
                .json(updates),
        )
        .await
    }

    async fn delete_student(&self, id: StudentId) -> RepositoryResult<()> {
        let response: MessageResponse = self
            .send(self.request(Method::DELETE, &format!("/students/{id}")))
            .await?;
        log::info!(
            "{}: {}",
            response.message,
            response.detail.unwrap_or_default()
        );
        Ok(())
    }
}

#[async_trait]
impl AuthProvider for HttpRepository {
    async fn login(&self, credentials: &Credentials) -> RepositoryResult<AccessToken> {
        self.send(self.request(Method::POST, "/auth/login").json(credentials))
            .await
    }

    async fn register(&self, new_user: &NewUser) -> RepositoryResult<User> {
        self.send(self.request(Method::POST, "/auth/register").json(new_user))
            .await
    }

    async fn current_user(&self) -> RepositoryResult<User> {
        self.send(self.request(Method::GET, "/auth/me")).await
    }

    async fn verify_token(&self) -> RepositoryResult<TokenVerification> {
        self.send(self.request(Method::GET, "/auth/verify")).await
    }

    fn set_token(&self, token: Option<AccessToken>) {
        *self.token.write() = token;
    }

    fn token(&self) -> Option<AccessToken> {
        self.token.read().clone()
    }
}
