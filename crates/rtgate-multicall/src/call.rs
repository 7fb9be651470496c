//! Builders for multicall argument lists.
//!
//! The same builder value produces the parameters for the remote call and the
//! selector list for the decoder, so the two cannot drift apart.

use std::marker::PhantomData;

use crate::decode::{decode_calls, decode_entities};
use crate::error::{MulticallError, MulticallResult};
use crate::model::{File, Peer, SystemFacts, Torrent, Tracker};
use crate::schema::{EntityRecord, Record};
use crate::value::RpcValue;

/// Entity records addressed through a download hash (`[hash, "", ...]`).
pub trait PerTorrent: EntityRecord {}

impl PerTorrent for File {}
impl PerTorrent for Peer {}
impl PerTorrent for Tracker {}

/// Argument list for one entity multicall: `[scope..., selectors...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityCall<R> {
    args: Vec<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R: EntityRecord> EntityCall<R> {
    /// Start a call with explicit call-scoped arguments.
    ///
    /// # Errors
    ///
    /// Returns [`MulticallError::ScopeArity`] when the number of scope arguments
    /// differs from the record schema's declared call-scoped count.
    pub fn with_scope<I, S>(scope: I) -> MulticallResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let args: Vec<String> = scope.into_iter().map(Into::into).collect();
        let expected = R::schema().call_scoped();
        if args.len() != expected {
            return Err(MulticallError::ScopeArity {
                expected,
                actual: args.len(),
            });
        }
        Ok(Self {
            args,
            _record: PhantomData,
        })
    }

    fn scoped(first: String, second: String) -> Self {
        Self {
            args: vec![first, second],
            _record: PhantomData,
        }
    }

    /// Append one selector.
    ///
    /// # Errors
    ///
    /// Returns [`MulticallError::DuplicateSelector`] if the selector was already requested.
    pub fn select(mut self, selector: impl Into<String>) -> MulticallResult<Self> {
        let selector = selector.into();
        if self.selectors().iter().any(|existing| *existing == selector) {
            return Err(MulticallError::DuplicateSelector { selector });
        }
        self.args.push(selector);
        Ok(self)
    }

    /// Append every schema selector not yet requested, in declaration order.
    #[must_use]
    pub fn with_default_selectors(mut self) -> Self {
        for selector in R::schema().selectors() {
            if !self.selectors().iter().any(|existing| existing == selector) {
                self.args.push(selector.to_string());
            }
        }
        self
    }

    /// Remote method for this call.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        R::MULTICALL_METHOD
    }

    /// Full argument list, call-scoped entries first. This is the list the
    /// decoder expects.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Requested selectors without the call-scoped prefix.
    #[must_use]
    pub fn selectors(&self) -> &[String] {
        let scoped = R::schema().call_scoped().min(self.args.len());
        &self.args[scoped..]
    }

    /// Parameters for the remote call.
    #[must_use]
    pub fn params(&self) -> Vec<RpcValue> {
        self.args.iter().map(|arg| RpcValue::from(arg.as_str())).collect()
    }

    /// Decode a raw response produced by this call.
    ///
    /// # Errors
    ///
    /// Propagates structural and coercion failures from [`decode_entities`].
    pub fn decode(&self, raw: &RpcValue) -> MulticallResult<Vec<R>> {
        decode_entities(R::schema(), &self.args, raw)
    }
}

impl EntityCall<Torrent> {
    /// `d.multicall2` over a view (`main`, `started`, ...).
    #[must_use]
    pub fn view(view: impl Into<String>) -> Self {
        Self::scoped(String::new(), view.into())
    }
}

impl<R: PerTorrent> EntityCall<R> {
    /// `f.`/`p.`/`t.multicall` over one download.
    #[must_use]
    pub fn for_torrent(hash: impl Into<String>) -> Self {
        Self::scoped(hash.into(), String::new())
    }
}

/// One `(methodName, params)` entry of a `system.multicall`.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemCall {
    /// Remote method, e.g. `system.hostname`.
    pub method_name: String,
    /// Positional parameters.
    pub params: Vec<RpcValue>,
}

impl SystemCall {
    /// A call taking rTorrent's customary empty target argument.
    #[must_use]
    pub fn targetless(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            params: vec![RpcValue::from("")],
        }
    }

    fn to_value(&self) -> RpcValue {
        RpcValue::structure([
            ("methodName", RpcValue::from(self.method_name.as_str())),
            ("params", RpcValue::Array(self.params.clone())),
        ])
    }
}

/// Call descriptors for `system.multicall`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SystemMulticall {
    calls: Vec<SystemCall>,
}

impl SystemMulticall {
    /// Remote method name.
    pub const METHOD: &'static str = "system.multicall";

    /// Empty batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { calls: Vec::new() }
    }

    /// Every fact known to the [`SystemFacts`] schema.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            calls: SystemFacts::schema()
                .selectors()
                .map(SystemCall::targetless)
                .collect(),
        }
    }

    /// Append one call descriptor.
    #[must_use]
    pub fn call(mut self, call: SystemCall) -> Self {
        self.calls.push(call);
        self
    }

    /// Call descriptors in response order.
    #[must_use]
    pub fn calls(&self) -> &[SystemCall] {
        &self.calls
    }

    /// Parameters for the remote call: a single array of call structs.
    #[must_use]
    pub fn params(&self) -> Vec<RpcValue> {
        vec![RpcValue::Array(
            self.calls.iter().map(SystemCall::to_value).collect(),
        )]
    }

    /// Decode a raw response produced by this call.
    ///
    /// # Errors
    ///
    /// Propagates structural and coercion failures from [`decode_calls`].
    pub fn decode(&self, raw: &RpcValue) -> MulticallResult<SystemFacts> {
        decode_calls(SystemFacts::schema(), &self.calls, raw)
    }
}
