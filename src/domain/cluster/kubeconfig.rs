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

use crate::domain::cluster::spec::ClusterRef;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::{Deserialize, Serialize};

/// A kubeconfig issued by the backend, valid for `duration_secs` after generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedKubeconfig {
    pub cluster: ClusterRef,
    pub config: String,
    pub duration_secs: u64,
    pub generated_at: DateTime<Utc>,
}

impl GeneratedKubeconfig {
    pub fn new(cluster: ClusterRef, config: String, duration_secs: u64) -> Self {
        Self {
            cluster,
            config,
            duration_secs,
            generated_at: Utc::now(),
        }
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        let secs = i64::try_from(self.duration_secs).unwrap_or(i64::MAX);
        ChronoDuration::try_seconds(secs)
            .and_then(|d| self.generated_at.checked_add_signed(d))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn kubeconfig(duration_secs: u64) -> GeneratedKubeconfig {
        GeneratedKubeconfig {
            cluster: ClusterRef::new("public", "demo", "sto2", "p1"),
            config: "apiVersion: v1".to_string(),
            duration_secs,
            generated_at: Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_expiry_boundary() {
        let kc = kubeconfig(3600);
        let expiry = Utc.with_ymd_and_hms(2025, 1, 1, 13, 0, 0).unwrap();
        assert_eq!(kc.expires_at(), expiry);
        assert!(!kc.is_expired_at(expiry));
        assert!(kc.is_expired_at(expiry + ChronoDuration::seconds(1)));
    }

    #[test]
    fn test_huge_duration_never_expires() {
        let kc = kubeconfig(u64::MAX);
        assert!(!kc.is_expired_at(Utc.with_ymd_and_hms(9000, 1, 1, 0, 0, 0).unwrap()));
    }
}
