//! `/api` route handlers.
//!
//! Each handler performs at most one facade call. Failures are counted on
//! [`ApiState`] and rendered through [`ApiError`]; the status for a failed
//! call depends on the route.

use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rtgate_multicall::{RtorrentError, ThrottleDirection};
use rtgate_telemetry::{current_request_id, current_route};
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::http::constants::{STATUS_OK, UPLOAD_FIELD};
use crate::http::errors::ApiError;
use crate::http::models::{
    FilesResponse, MessageResponse, MethodsResponse, PeersResponse, PriorityRequest,
    SystemResponse, ThrottleRequest, TrackersResponse, ViewResponse,
};
use crate::state::ApiState;

fn failure(state: &ApiState, err: &RtorrentError, call_status: StatusCode) -> ApiError {
    state.record_failure(err);
    let api = ApiError::from_rtorrent(err, call_status);
    error!(
        request_id = %current_request_id().unwrap_or_default(),
        route = %current_route().unwrap_or_default(),
        operation = err.operation().unwrap_or("validate"),
        status = api.status().as_u16(),
        error = %api.message(),
        "rtorrent operation failed"
    );
    api
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|err| {
        warn!(error = %err, "request body rejected");
        ApiError::bad_request(err.to_string())
    })
}

fn acknowledged() -> Json<MessageResponse> {
    Json(MessageResponse::ok(""))
}

pub(crate) async fn ping() -> Json<MessageResponse> {
    Json(MessageResponse::ok("pong"))
}

pub(crate) async fn view(
    State(state): State<Arc<ApiState>>,
    Path(view): Path<String>,
) -> Result<Json<ViewResponse>, ApiError> {
    let torrents = state
        .rtorrent
        .torrents(&view)
        .await
        .map_err(|err| failure(&state, &err, StatusCode::BAD_REQUEST))?;
    state.record_records("torrent", torrents.len());
    Ok(Json(ViewResponse {
        status: STATUS_OK,
        torrents,
    }))
}

pub(crate) async fn system(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<SystemResponse>, ApiError> {
    let system = state
        .rtorrent
        .system()
        .await
        .map_err(|err| failure(&state, &err, StatusCode::INTERNAL_SERVER_ERROR))?;
    state.record_records("system", 1);
    Ok(Json(SystemResponse {
        status: STATUS_OK,
        system,
    }))
}

pub(crate) async fn methods(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<MethodsResponse>, ApiError> {
    let methods = state
        .rtorrent
        .list_methods()
        .await
        .map_err(|err| failure(&state, &err, StatusCode::INTERNAL_SERVER_ERROR))?;
    state.record_upstream_ok();
    Ok(Json(MethodsResponse {
        status: STATUS_OK,
        methods,
    }))
}

pub(crate) async fn throttle(
    State(state): State<Arc<ApiState>>,
    body: Bytes,
) -> Result<Json<MessageResponse>, ApiError> {
    let request: ThrottleRequest = parse_body(&body)?;
    let direction = match request.kind.as_str() {
        "up" => ThrottleDirection::Up,
        "down" => ThrottleDirection::Down,
        _ => return Err(ApiError::bad_request("type must be up or down")),
    };
    state
        .rtorrent
        .set_global_throttle(direction, request.kilobytes)
        .await
        .map_err(|err| failure(&state, &err, StatusCode::BAD_REQUEST))?;
    state.record_upstream_ok();
    info!(
        direction = direction.as_str(),
        kilobytes = request.kilobytes,
        "global throttle updated"
    );
    Ok(acknowledged())
}

pub(crate) async fn load(
    State(state): State<Arc<ApiState>>,
    mut multipart: Multipart,
) -> Result<Json<MessageResponse>, ApiError> {
    let mut metainfo = None;
    while let Some(field) = multipart.next_field().await.map_err(|err| {
        warn!(error = %err, "multipart body rejected");
        ApiError::bad_request(err.body_text())
    })? {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let data = field.bytes().await.map_err(|err| {
            warn!(error = %err, "multipart field could not be read");
            ApiError::bad_request(err.body_text())
        })?;
        metainfo = Some(data);
        break;
    }
    let Some(metainfo) = metainfo else {
        warn!("upload without a file field");
        return Err(ApiError::bad_request("missing multipart field `file`"));
    };

    state
        .rtorrent
        .load_raw_start(&metainfo)
        .await
        .map_err(|err| failure(&state, &err, StatusCode::INTERNAL_SERVER_ERROR))?;
    state.record_upstream_ok();
    info!(bytes = metainfo.len(), "metainfo loaded");
    Ok(acknowledged())
}

/// Dispatch `/api/torrent/{hash}/{action}`.
pub(crate) async fn torrent_action(
    State(state): State<Arc<ApiState>>,
    Path((hash, action)): Path<(String, String)>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let rt = &state.rtorrent;
    let response = match action.as_str() {
        "stop" | "pause" | "resume" => {
            let result = match action.as_str() {
                "stop" => rt.stop(&hash).await,
                "pause" => rt.pause(&hash).await,
                _ => rt.resume(&hash).await,
            };
            result.map_err(|err| failure(&state, &err, StatusCode::INTERNAL_SERVER_ERROR))?;
            state.record_upstream_ok();
            acknowledged().into_response()
        }
        "start" | "hash" | "erase" => {
            let result = match action.as_str() {
                "start" => rt.start(&hash).await,
                "hash" => rt.check_hash(&hash).await,
                _ => rt.erase(&hash).await,
            };
            result.map_err(|err| failure(&state, &err, StatusCode::BAD_REQUEST))?;
            state.record_upstream_ok();
            acknowledged().into_response()
        }
        "files" => {
            let files = rt
                .files(&hash)
                .await
                .map_err(|err| failure(&state, &err, StatusCode::BAD_REQUEST))?;
            state.record_records("file", files.len());
            Json(FilesResponse {
                status: STATUS_OK,
                files,
            })
            .into_response()
        }
        "peers" => {
            let peers = rt
                .peers(&hash)
                .await
                .map_err(|err| failure(&state, &err, StatusCode::BAD_REQUEST))?;
            state.record_records("peer", peers.len());
            Json(PeersResponse {
                status: STATUS_OK,
                peers,
            })
            .into_response()
        }
        "trackers" => {
            let trackers = rt
                .trackers(&hash)
                .await
                .map_err(|err| failure(&state, &err, StatusCode::BAD_REQUEST))?;
            state.record_records("tracker", trackers.len());
            Json(TrackersResponse {
                status: STATUS_OK,
                trackers,
            })
            .into_response()
        }
        "priority" => {
            let request: PriorityRequest = parse_body(&body)?;
            rt.set_priority(&hash, request.priority)
                .await
                .map_err(|err| failure(&state, &err, StatusCode::BAD_REQUEST))?;
            state.record_upstream_ok();
            acknowledged().into_response()
        }
        other => {
            return Err(ApiError::not_found(format!("unknown torrent action `{other}`")));
        }
    };
    info!(hash = %hash, action = %action, "torrent action completed");
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::constants::COMPONENT_RTORRENT;
    use crate::state::tests::{FakeClient, rendered_metrics, state_with};
    use axum::body::{Body, to_bytes};
    use axum::extract::FromRequest;
    use axum::http::Request;
    use rtgate_multicall::{EntityCall, RpcValue, Torrent};
    use serde_json::Value;

    async fn json_body(response: Response) -> anyhow::Result<Value> {
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn action(hash: &str, action: &str) -> Path<(String, String)> {
        Path((hash.to_string(), action.to_string()))
    }

    fn empty_rows() -> RpcValue {
        RpcValue::Array(Vec::new())
    }

    #[tokio::test]
    async fn ping_answers_pong() {
        let Json(body) = ping().await;
        assert_eq!(body, MessageResponse::ok("pong"));
    }

    #[tokio::test]
    async fn view_decodes_rows_and_counts_records() -> anyhow::Result<()> {
        let width = EntityCall::<Torrent>::view("main")
            .with_default_selectors()
            .selectors()
            .len();
        let position = EntityCall::<Torrent>::view("main")
            .with_default_selectors()
            .selectors()
            .iter()
            .position(|selector| selector == "d.hash=")
            .ok_or_else(|| anyhow::anyhow!("d.hash= missing from defaults"))?;
        let mut row = vec![RpcValue::Nil; width];
        row[position] = RpcValue::from("ABCDEF");
        let client = FakeClient::answering(RpcValue::Array(vec![RpcValue::Array(row)]));
        let state = state_with(client.clone());

        let Json(body) = view(State(state.clone()), Path("main".to_string()))
            .await
            .map_err(|err| anyhow::anyhow!(err.message().to_string()))?;
        assert_eq!(body.status, "ok");
        assert_eq!(body.torrents.len(), 1);
        assert_eq!(body.torrents[0].hash, "ABCDEF");
        assert!(rendered_metrics(&state).contains("multicall_records_total{kind=\"torrent\"} 1"));

        let calls = client.recorded();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "d.multicall2");
        assert_eq!(calls[0].1[1], RpcValue::from("main"));
        Ok(())
    }

    #[tokio::test]
    async fn view_failures_are_bad_requests_and_degrade_health() {
        let state = state_with(FakeClient::unreachable());
        let err = view(State(state.clone()), Path("main".to_string()))
            .await
            .expect_err("unreachable upstream");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(state.current_health_degraded(), vec![COMPONENT_RTORRENT.to_string()]);
        assert!(rendered_metrics(&state).contains("rpc_failures_total{operation=\"torrents\"} 1"));
    }

    #[tokio::test]
    async fn malformed_rows_are_internal_errors() {
        let client = FakeClient::answering(RpcValue::Array(vec![RpcValue::Array(vec![
            RpcValue::from("only-one-column"),
        ])]));
        let state = state_with(client);
        let err = view(State(state), Path("main".to_string()))
            .await
            .expect_err("short row");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn system_failures_are_internal_errors() {
        let state = state_with(FakeClient::faulting(-506, "Method not defined"));
        let err = system(State(state)).await.expect_err("fault");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(err.message().contains("Method not defined"));
    }

    #[tokio::test]
    async fn methods_are_listed() -> anyhow::Result<()> {
        let client = FakeClient::answering(RpcValue::Array(vec![
            RpcValue::from("d.hash"),
            RpcValue::from("system.pid"),
        ]));
        let state = state_with(client);
        let Json(body) = methods(State(state))
            .await
            .map_err(|err| anyhow::anyhow!(err.message().to_string()))?;
        assert_eq!(body.methods, vec!["d.hash".to_string(), "system.pid".to_string()]);
        Ok(())
    }

    #[tokio::test]
    async fn throttle_validates_body_and_type() {
        let client = FakeClient::answering(RpcValue::Int(0));
        let state = state_with(client.clone());

        let err = throttle(State(state.clone()), Bytes::from_static(b"{not json"))
            .await
            .expect_err("bad json");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = throttle(
            State(state.clone()),
            Bytes::from_static(br#"{"type":"sideways","kilobytes":10}"#),
        )
        .await
        .expect_err("bad type");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.message(), "type must be up or down");
        assert!(client.recorded().is_empty());
    }

    #[tokio::test]
    async fn throttle_sets_the_requested_direction() -> anyhow::Result<()> {
        let client = FakeClient::answering(RpcValue::Int(0));
        let state = state_with(client.clone());
        let Json(body) = throttle(
            State(state),
            Bytes::from_static(br#"{"type":"down","kilobytes":512}"#),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.message().to_string()))?;
        assert_eq!(body.status, "ok");

        let calls = client.recorded();
        assert_eq!(calls[0].0, "throttle.global_down.max_rate.set_kb");
        assert_eq!(calls[0].1, vec![RpcValue::from(""), RpcValue::from("512")]);
        Ok(())
    }

    #[tokio::test]
    async fn throttle_call_failures_are_bad_requests() {
        let state = state_with(FakeClient::faulting(-503, "denied"));
        let err = throttle(State(state), Bytes::from_static(br#"{"type":"up","kilobytes":1}"#))
            .await
            .expect_err("fault");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    async fn multipart(field: &str, content: &str) -> Multipart {
        let body = format!(
            "--XBOUNDARY\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"a.torrent\"\r\nContent-Type: application/x-bittorrent\r\n\r\n\
             {content}\r\n--XBOUNDARY--\r\n"
        );
        let request = Request::builder()
            .method("POST")
            .uri("/api/load")
            .header("content-type", "multipart/form-data; boundary=XBOUNDARY")
            .body(Body::from(body))
            .expect("request");
        Multipart::from_request(request, &()).await.expect("multipart")
    }

    #[tokio::test]
    async fn load_requires_the_file_field() {
        let client = FakeClient::answering(RpcValue::Int(0));
        let state = state_with(client.clone());
        let err = load(State(state), multipart("other", "d4:infoe").await)
            .await
            .expect_err("missing field");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(client.recorded().is_empty());
    }

    #[tokio::test]
    async fn load_sends_metainfo_as_base64() -> anyhow::Result<()> {
        let client = FakeClient::answering(RpcValue::Int(0));
        let state = state_with(client.clone());
        load(State(state), multipart(UPLOAD_FIELD, "d4:infoe").await)
            .await
            .map_err(|err| anyhow::anyhow!(err.message().to_string()))?;

        let calls = client.recorded();
        assert_eq!(calls[0].0, "load.raw_start_verbose");
        assert!(calls[0].1.contains(&RpcValue::Base64(b"d4:infoe".to_vec())));
        Ok(())
    }

    #[tokio::test]
    async fn load_failures_are_internal_errors() {
        let state = state_with(FakeClient::unreachable());
        let err = load(State(state), multipart(UPLOAD_FIELD, "d4:infoe").await)
            .await
            .expect_err("unreachable");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn action_failure_status_depends_on_action() {
        for (name, expected) in [
            ("stop", StatusCode::INTERNAL_SERVER_ERROR),
            ("pause", StatusCode::INTERNAL_SERVER_ERROR),
            ("resume", StatusCode::INTERNAL_SERVER_ERROR),
            ("start", StatusCode::BAD_REQUEST),
            ("hash", StatusCode::BAD_REQUEST),
            ("erase", StatusCode::BAD_REQUEST),
            ("files", StatusCode::BAD_REQUEST),
            ("peers", StatusCode::BAD_REQUEST),
            ("trackers", StatusCode::BAD_REQUEST),
        ] {
            let state = state_with(FakeClient::faulting(-501, "Could not find info-hash."));
            let err = torrent_action(State(state), action("HASH", name), Bytes::new())
                .await
                .expect_err("fault");
            assert_eq!(err.status(), expected, "action {name}");
        }
    }

    #[tokio::test]
    async fn actions_target_the_download() -> anyhow::Result<()> {
        let client = FakeClient::answering(RpcValue::Int(0));
        let state = state_with(client.clone());
        let response = torrent_action(State(state), action("HASH", "stop"), Bytes::new())
            .await
            .map_err(|err| anyhow::anyhow!(err.message().to_string()))?;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await?;
        assert_eq!(body["status"], "ok");

        let calls = client.recorded();
        assert_eq!(calls[0].0, "d.stop");
        assert_eq!(calls[0].1, vec![RpcValue::from("HASH")]);
        Ok(())
    }

    #[tokio::test]
    async fn entity_actions_return_their_collections() -> anyhow::Result<()> {
        for (name, key) in [("files", "files"), ("peers", "peers"), ("trackers", "trackers")] {
            let state = state_with(FakeClient::answering(empty_rows()));
            let response = torrent_action(State(state), action("HASH", name), Bytes::new())
                .await
                .map_err(|err| anyhow::anyhow!(err.message().to_string()))?;
            let body = json_body(response).await?;
            assert_eq!(body["status"], "ok");
            assert_eq!(body[key], Value::Array(Vec::new()), "action {name}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn priority_validates_body_and_range() -> anyhow::Result<()> {
        let client = FakeClient::answering(RpcValue::Int(0));
        let state = state_with(client.clone());

        let err = torrent_action(
            State(state.clone()),
            action("HASH", "priority"),
            Bytes::from_static(b"{}"),
        )
        .await
        .expect_err("missing priority");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = torrent_action(
            State(state.clone()),
            action("HASH", "priority"),
            Bytes::from_static(br#"{"priority":9}"#),
        )
        .await
        .expect_err("out of range");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(client.recorded().is_empty());

        torrent_action(
            State(state),
            action("HASH", "priority"),
            Bytes::from_static(br#"{"priority":2}"#),
        )
        .await
        .map_err(|err| anyhow::anyhow!(err.message().to_string()))?;
        assert_eq!(client.recorded()[0].0, "d.priority.set");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_actions_are_not_found() {
        let client = FakeClient::answering(RpcValue::Int(0));
        let state = state_with(client.clone());
        let err = torrent_action(State(state), action("HASH", "explode"), Bytes::new())
            .await
            .expect_err("unknown");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(client.recorded().is_empty());
    }
}
