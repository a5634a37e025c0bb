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

/// API endpoint
pub const DEFAULT_API_HOST: &str = "https://rest.cleura.cloud";
pub const AUTH_TOKENS_PATH: &str = "/auth/v1/tokens";
pub const GARDENER_API_PREFIX: &str = "/gardener/v1";

/// Authentication headers
pub const HEADER_AUTH_LOGIN: &str = "X-AUTH-LOGIN";
pub const HEADER_AUTH_TOKEN: &str = "X-AUTH-TOKEN";

/// Environment variables
pub const ENV_API_HOST: &str = "CLEURA_API_HOST";
pub const ENV_API_USERNAME: &str = "CLEURA_API_USERNAME";
pub const ENV_API_TOKEN: &str = "CLEURA_API_TOKEN";
pub const ENV_API_PASSWORD: &str = "CLEURA_API_PASSWORD";

/// Cluster defaults
pub const DEFAULT_GARDENER_DOMAIN: &str = "public";
pub const DEFAULT_FLOATING_POOL: &str = "ext-net";
pub const DEFAULT_MAINTENANCE_WINDOW_BEGIN: &str = "000000+0100";
pub const DEFAULT_MAINTENANCE_WINDOW_END: &str = "010000+0100";

/// Worker group defaults
pub const DEFAULT_IMAGE_NAME: &str = "gardenlinux";
pub const DEFAULT_VOLUME_SIZE: &str = "50Gi";
pub const MAX_WORKER_GROUP_NAME_LEN: usize = 6;

/// HTTP client
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Operation timeouts
pub const DEFAULT_OPERATION_TIMEOUT_SECS: u64 = 45 * 60;

/// Waiter backoff
pub const DEFAULT_INITIAL_INTERVAL_SECS: u64 = 15;
pub const DEFAULT_MAX_INTERVAL_SECS: u64 = 75;
pub const DEFAULT_BACKOFF_MULTIPLIER: f32 = 2.0;
pub const DEFAULT_TIGHTENED_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_READY_THRESHOLD_SECS: u64 = 400;
pub const DEFAULT_RECONCILE_THRESHOLD_SECS: u64 = 400;
pub const DEFAULT_DELETE_THRESHOLD_SECS: u64 = 500;
pub const DEFAULT_DEADLINE_HEADROOM_SECS: u64 = 60;

/// Kubeconfig
pub const DEFAULT_KUBECONFIG_DURATION_SECS: u64 = 24 * 60 * 60;

/// Local state
pub const DEFAULT_STATE_FILE: &str = "shootctl-state.json";
