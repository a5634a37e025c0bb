// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use super::mapper;
use super::models::*;
use crate::domain::cluster::observed::ClusterObserved;
use crate::domain::cluster::profile::CloudProfile;
use crate::domain::cluster::spec::{ClusterRef, ClusterSpec, ClusterUpdate, WorkerGroupSpec};
use crate::domain::config::ProviderConfig;
use crate::infrastructure::constants::{
    AUTH_TOKENS_PATH, GARDENER_API_PREFIX, HEADER_AUTH_LOGIN, HEADER_AUTH_TOKEN,
};
use crate::shared::error::{Result, ShootError};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use std::time::Duration;
use url::Url;

#[async_trait::async_trait]
pub trait ShootClusterClient: Send + Sync {
    async fn fetch_cluster(&self, cluster: &ClusterRef) -> Result<ClusterObserved>;

    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterObserved>;

    async fn update_cluster(
        &self,
        cluster: &ClusterRef,
        update: &ClusterUpdate,
    ) -> Result<ClusterObserved>;

    /// Returns the raw backend acknowledgement.
    async fn delete_cluster(&self, cluster: &ClusterRef) -> Result<String>;

    async fn create_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &WorkerGroupSpec,
    ) -> Result<ClusterObserved>;

    async fn update_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &WorkerGroupSpec,
    ) -> Result<ClusterObserved>;

    async fn delete_worker_group(&self, cluster: &ClusterRef, name: &str)
        -> Result<ClusterObserved>;

    async fn resolve_cloud_profile(&self, domain: &str) -> Result<CloudProfile>;

    async fn generate_kubeconfig(&self, cluster: &ClusterRef, duration: Duration)
        -> Result<String>;
}

pub struct ShootClusterClientImpl {
    http: reqwest::Client,
    base: Url,
}

impl ShootClusterClientImpl {
    /// Build a client from provider configuration, exchanging the password for
    /// a token when none is configured.
    pub async fn new(conf: &ProviderConfig) -> Result<Self> {
        let base = parse_base(&conf.host)?;

        let token = match conf.token.as_deref().filter(|t| !t.is_empty()) {
            Some(token) => token.to_string(),
            None => {
                let password = conf
                    .password
                    .as_deref()
                    .filter(|p| !p.is_empty())
                    .ok_or_else(|| {
                        ShootError::config_error("either a token or a password is required")
                    })?;
                authenticate(&base, &conf.username, password, conf.request_timeout()).await?
            }
        };

        Self::with_token(&conf.host, &conf.username, &token, conf.request_timeout())
    }

    pub fn with_token(host: &str, username: &str, token: &str, timeout: Duration) -> Result<Self> {
        let base = parse_base(host)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(header_name(HEADER_AUTH_LOGIN)?, header_value(username)?);
        let mut token_value = header_value(token)?;
        token_value.set_sensitive(true);
        headers.insert(header_name(HEADER_AUTH_TOKEN)?, token_value);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { http, base })
    }

    /// URL under the gardener API prefix.
    fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut all = split_path(GARDENER_API_PREFIX);
        all.extend_from_slice(segments);
        build_url(&self.base, &all)
    }

    fn shoot_url(&self, cluster: &ClusterRef, extra: &[&str]) -> Result<Url> {
        let mut segments = vec![
            cluster.domain.as_str(),
            "shoot",
            cluster.region.as_str(),
            cluster.project.as_str(),
            cluster.name.as_str(),
        ];
        segments.extend_from_slice(extra);
        self.url(&segments)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        tracing::debug!(%method, path = url.path(), "gardener request");
        self.http.request(method, url)
    }
}

#[async_trait::async_trait]
impl ShootClusterClient for ShootClusterClientImpl {
    async fn fetch_cluster(&self, cluster: &ClusterRef) -> Result<ClusterObserved> {
        let url = self.shoot_url(cluster, &[])?;
        let resp = self.request(Method::GET, url).send().await?;
        let resp = expect_shoot(resp, StatusCode::OK, cluster).await?;
        decode_shoot(cluster, resp).await
    }

    async fn create_cluster(&self, spec: &ClusterSpec) -> Result<ClusterObserved> {
        let cluster = spec.cluster_ref();
        let body = mapper::create_request(spec)?;
        let url = self.url(&[
            cluster.domain.as_str(),
            "shoot",
            cluster.region.as_str(),
            cluster.project.as_str(),
        ])?;

        let resp = self.request(Method::POST, url).json(&body).send().await?;
        let resp = expect_shoot(resp, StatusCode::CREATED, &cluster).await?;
        decode_shoot(&cluster, resp).await
    }

    async fn update_cluster(
        &self,
        cluster: &ClusterRef,
        update: &ClusterUpdate,
    ) -> Result<ClusterObserved> {
        let body = mapper::update_request(update);
        let url = self.shoot_url(cluster, &[])?;

        let resp = self.request(Method::PUT, url).json(&body).send().await?;
        let resp = expect_shoot(resp, StatusCode::ACCEPTED, cluster).await?;
        decode_shoot(cluster, resp).await
    }

    async fn delete_cluster(&self, cluster: &ClusterRef) -> Result<String> {
        let url = self.shoot_url(cluster, &[])?;
        let resp = self.request(Method::DELETE, url).send().await?;
        let resp = expect_shoot(resp, StatusCode::ACCEPTED, cluster).await?;
        Ok(resp.text().await?)
    }

    async fn create_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &WorkerGroupSpec,
    ) -> Result<ClusterObserved> {
        let body = mapper::worker_group_request(worker_group)?;
        let url = self.shoot_url(cluster, &["worker"])?;

        let resp = self.request(Method::POST, url).json(&body).send().await?;
        let resp = expect_shoot(resp, StatusCode::ACCEPTED, cluster).await?;
        decode_shoot(cluster, resp).await
    }

    async fn update_worker_group(
        &self,
        cluster: &ClusterRef,
        worker_group: &WorkerGroupSpec,
    ) -> Result<ClusterObserved> {
        let body = mapper::worker_group_request(worker_group)?;
        let url = self.shoot_url(cluster, &["worker", worker_group.name.as_str()])?;

        let resp = self.request(Method::PUT, url).json(&body).send().await?;
        let resp = expect_status(
            resp,
            StatusCode::ACCEPTED,
            "WorkerGroup",
            &worker_group.name,
            &cluster.project,
        )
        .await?;
        decode_shoot(cluster, resp).await
    }

    async fn delete_worker_group(
        &self,
        cluster: &ClusterRef,
        name: &str,
    ) -> Result<ClusterObserved> {
        let url = self.shoot_url(cluster, &["worker", name])?;

        let resp = self.request(Method::DELETE, url).send().await?;
        let resp =
            expect_status(resp, StatusCode::ACCEPTED, "WorkerGroup", name, &cluster.project)
                .await?;
        decode_shoot(cluster, resp).await
    }

    async fn resolve_cloud_profile(&self, domain: &str) -> Result<CloudProfile> {
        let url = self.url(&[domain, "cloudprofile"])?;
        let resp = self.request(Method::GET, url).send().await?;
        let resp = expect_status(resp, StatusCode::OK, "CloudProfile", domain, "-").await?;

        let text = resp.text().await?;
        let profile: CloudProfileResponse = serde_json::from_str(&text)?;
        Ok(mapper::profile_from_response(profile))
    }

    async fn generate_kubeconfig(
        &self,
        cluster: &ClusterRef,
        duration: Duration,
    ) -> Result<String> {
        let url = self.shoot_url(cluster, &["kubeconfig"])?;
        let body = KubeconfigRequest {
            duration: duration.as_secs(),
        };

        let resp = self.request(Method::POST, url).json(&body).send().await?;
        let resp = expect_shoot(resp, StatusCode::OK, cluster).await?;
        Ok(resp.text().await?)
    }
}

async fn authenticate(
    base: &Url,
    username: &str,
    password: &str,
    timeout: Duration,
) -> Result<String> {
    let url = build_url(base, &split_path(AUTH_TOKENS_PATH))?;
    tracing::debug!(path = url.path(), login = username, "requesting api token");

    let http = reqwest::Client::builder().timeout(timeout).build()?;
    let resp = http
        .post(url)
        .json(&AuthRequest {
            auth: AuthCredentials {
                login: username,
                password,
            },
        })
        .send()
        .await?;

    let status = resp.status();
    if status != StatusCode::OK {
        let body = resp.text().await.unwrap_or_default();
        return Err(ShootError::Api {
            status: status.as_u16(),
            body,
        });
    }

    let auth: AuthResponse = serde_json::from_str(&resp.text().await?)?;
    if auth.token.is_empty() {
        return Err(ShootError::config_error(format!(
            "authentication for '{}' returned no token (result: {})",
            username, auth.result
        )));
    }
    Ok(auth.token)
}

async fn expect_shoot(
    resp: Response,
    expected: StatusCode,
    cluster: &ClusterRef,
) -> Result<Response> {
    expect_status(resp, expected, "Shoot", &cluster.name, &cluster.project).await
}

async fn expect_status(
    resp: Response,
    expected: StatusCode,
    resource_type: &str,
    name: &str,
    project: &str,
) -> Result<Response> {
    let status = resp.status();
    if status == expected {
        return Ok(resp);
    }

    let body = resp.text().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), %body, "unexpected gardener response");
    if status == StatusCode::NOT_FOUND {
        return Err(ShootError::not_found(resource_type, name, project));
    }
    Err(ShootError::Api {
        status: status.as_u16(),
        body,
    })
}

async fn decode_shoot(cluster: &ClusterRef, resp: Response) -> Result<ClusterObserved> {
    let text = resp.text().await?;
    let body: ShootResponseBody = serde_json::from_str(&text)?;
    let mut observed = mapper::observed_from_response(cluster, body);
    observed.last_updated = Some(Utc::now());
    Ok(observed)
}

fn parse_base(host: &str) -> Result<Url> {
    Url::parse(host).map_err(|e| ShootError::config_error(format!("Invalid host '{}': {}", host, e)))
}

fn build_url(base: &Url, segments: &[&str]) -> Result<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| ShootError::config_error(format!("'{}' cannot be used as a base URL", base)))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

fn header_name(name: &str) -> Result<HeaderName> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| ShootError::config_error(format!("Invalid header name {}: {}", name, e)))
}

fn header_value(value: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| ShootError::config_error(format!("Invalid header value: {}", e)))
}
