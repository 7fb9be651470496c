//! rTorrent command facade over an RPC client.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::call::{EntityCall, SystemMulticall};
use crate::error::{RpcResult, RtorrentError, RtorrentResult};
use crate::model::{File, Peer, SystemFacts, Torrent, Tracker};
use crate::value::RpcValue;

/// Highest download priority accepted by `d.priority.set`.
pub const MAX_PRIORITY: i64 = 3;

/// Transport seam: performs one call-and-wait against the remote endpoint.
#[async_trait]
pub trait RpcClient: Send + Sync {
    /// Invoke `method` with positional `params` and return the raw result.
    async fn call(&self, method: &str, params: Vec<RpcValue>) -> RpcResult<RpcValue>;
}

/// Direction selector for the global throttle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDirection {
    /// Global upload limit.
    Up,
    /// Global download limit.
    Down,
}

impl ThrottleDirection {
    const fn method(self) -> &'static str {
        match self {
            Self::Up => "throttle.global_up.max_rate.set_kb",
            Self::Down => "throttle.global_down.max_rate.set_kb",
        }
    }

    /// Label used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

/// Typed rTorrent operations.
#[derive(Clone)]
pub struct Rtorrent {
    client: Arc<dyn RpcClient>,
}

impl fmt::Debug for Rtorrent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rtorrent").finish_non_exhaustive()
    }
}

impl Rtorrent {
    /// Wrap a transport.
    #[must_use]
    pub fn new(client: Arc<dyn RpcClient>) -> Self {
        Self { client }
    }

    async fn invoke(
        &self,
        operation: &'static str,
        method: &str,
        params: Vec<RpcValue>,
    ) -> RtorrentResult<RpcValue> {
        self.client
            .call(method, params)
            .await
            .map_err(|source| RtorrentError::call(operation, source))
    }

    async fn download_command(
        &self,
        operation: &'static str,
        method: &str,
        hash: &str,
    ) -> RtorrentResult<()> {
        self.invoke(operation, method, vec![RpcValue::from(hash)])
            .await
            .map(drop)
    }

    /// Names of every XML-RPC method the client exposes.
    ///
    /// # Errors
    ///
    /// Fails when the call fails or the result is not an array of strings.
    pub async fn list_methods(&self) -> RtorrentResult<Vec<String>> {
        let raw = self
            .invoke("list_methods", "system.listMethods", Vec::new())
            .await?;
        let items = raw.as_array().ok_or(RtorrentError::UnexpectedResult {
            operation: "list_methods",
            found: raw.kind_name(),
        })?;
        items
            .iter()
            .map(|item| {
                item.as_str()
                    .map(str::to_string)
                    .ok_or(RtorrentError::UnexpectedResult {
                        operation: "list_methods",
                        found: item.kind_name(),
                    })
            })
            .collect()
    }

    /// Load raw `.torrent` metainfo and start it.
    ///
    /// # Errors
    ///
    /// Rejects an empty payload; otherwise fails when the call fails.
    pub async fn load_raw_start(&self, metainfo: &[u8]) -> RtorrentResult<()> {
        if metainfo.is_empty() {
            return Err(RtorrentError::InvalidArgument {
                field: "file",
                reason: "empty",
                value: None,
            });
        }
        let params = vec![RpcValue::from(""), RpcValue::Base64(metainfo.to_vec())];
        self.invoke("load_raw_start", "load.raw_start_verbose", params)
            .await
            .map(drop)
    }

    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn start(&self, hash: &str) -> RtorrentResult<()> {
        self.download_command("start", "d.start", hash).await
    }

    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn stop(&self, hash: &str) -> RtorrentResult<()> {
        self.download_command("stop", "d.stop", hash).await
    }

    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn pause(&self, hash: &str) -> RtorrentResult<()> {
        self.download_command("pause", "d.pause", hash).await
    }

    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn resume(&self, hash: &str) -> RtorrentResult<()> {
        self.download_command("resume", "d.resume", hash).await
    }

    /// Queue a hash re-check.
    ///
    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn check_hash(&self, hash: &str) -> RtorrentResult<()> {
        self.download_command("check_hash", "d.check_hash", hash).await
    }

    /// Remove the download from the session (data stays on disk).
    ///
    /// # Errors
    ///
    /// Fails when the call fails.
    pub async fn erase(&self, hash: &str) -> RtorrentResult<()> {
        self.download_command("erase", "d.erase", hash).await
    }

    /// Set download priority (0 off, 1 low, 2 normal, 3 high).
    ///
    /// # Errors
    ///
    /// Rejects priorities outside `0..=3` before calling; otherwise fails when
    /// the call fails.
    pub async fn set_priority(&self, hash: &str, priority: i64) -> RtorrentResult<()> {
        if !(0..=MAX_PRIORITY).contains(&priority) {
            return Err(RtorrentError::InvalidArgument {
                field: "priority",
                reason: "out_of_range",
                value: Some(priority.to_string()),
            });
        }
        let params = vec![RpcValue::from(hash), RpcValue::from(priority)];
        self.invoke("set_priority", "d.priority.set", params)
            .await
            .map(drop)
    }

    /// Set the global upload or download cap in KiB/s (0 removes the cap).
    ///
    /// # Errors
    ///
    /// Rejects negative values; otherwise fails when the call fails.
    pub async fn set_global_throttle(
        &self,
        direction: ThrottleDirection,
        kilobytes: i64,
    ) -> RtorrentResult<()> {
        if kilobytes < 0 {
            return Err(RtorrentError::InvalidArgument {
                field: "kilobytes",
                reason: "negative",
                value: Some(kilobytes.to_string()),
            });
        }
        let params = vec![RpcValue::from(""), RpcValue::from(kilobytes.to_string())];
        self.invoke("set_global_throttle", direction.method(), params)
            .await
            .map(drop)
    }

    /// Downloads in `view`, all schema attributes populated.
    ///
    /// # Errors
    ///
    /// Fails when the call fails or the response cannot be decoded.
    pub async fn torrents(&self, view: &str) -> RtorrentResult<Vec<Torrent>> {
        let call = EntityCall::<Torrent>::view(view).with_default_selectors();
        self.entities("torrents", &call).await
    }

    /// # Errors
    ///
    /// Fails when the call fails or the response cannot be decoded.
    pub async fn files(&self, hash: &str) -> RtorrentResult<Vec<File>> {
        let call = EntityCall::<File>::for_torrent(hash).with_default_selectors();
        self.entities("files", &call).await
    }

    /// # Errors
    ///
    /// Fails when the call fails or the response cannot be decoded.
    pub async fn peers(&self, hash: &str) -> RtorrentResult<Vec<Peer>> {
        let call = EntityCall::<Peer>::for_torrent(hash).with_default_selectors();
        self.entities("peers", &call).await
    }

    /// # Errors
    ///
    /// Fails when the call fails or the response cannot be decoded.
    pub async fn trackers(&self, hash: &str) -> RtorrentResult<Vec<Tracker>> {
        let call = EntityCall::<Tracker>::for_torrent(hash).with_default_selectors();
        self.entities("trackers", &call).await
    }

    /// Run an arbitrary entity multicall built by the caller.
    ///
    /// # Errors
    ///
    /// Fails when the call fails or the response cannot be decoded.
    pub async fn entities<R>(
        &self,
        operation: &'static str,
        call: &EntityCall<R>,
    ) -> RtorrentResult<Vec<R>>
    where
        R: crate::schema::EntityRecord,
    {
        let raw = self.invoke(operation, call.method(), call.params()).await?;
        call.decode(&raw)
            .map_err(|source| RtorrentError::decode(operation, source))
    }

    /// Client-wide facts from the standard `system.multicall`.
    ///
    /// # Errors
    ///
    /// Fails when the call fails or the response cannot be decoded.
    pub async fn system(&self) -> RtorrentResult<SystemFacts> {
        self.system_with(&SystemMulticall::standard()).await
    }

    /// Run a caller-built `system.multicall`.
    ///
    /// # Errors
    ///
    /// Fails when the call fails or the response cannot be decoded.
    pub async fn system_with(&self, calls: &SystemMulticall) -> RtorrentResult<SystemFacts> {
        let raw = self
            .invoke("system", SystemMulticall::METHOD, calls.params())
            .await?;
        calls
            .decode(&raw)
            .map_err(|source| RtorrentError::decode("system", source))
    }
}
