// Keyrack — Unix Domain Socket Server
//
// Listens on a Unix domain socket for JSON-RPC 2.0 requests from local agents
// and scripts. Every connection runs in its own tokio task; all of them share
// the one in-memory credential store owned by the server.

use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

use crate::store::{export_all_masked, CredentialStore, FieldMap, InMemoryCredentialStore};

use super::protocol::{
    JsonRpcRequest, JsonRpcResponse, INTERNAL_ERROR, INVALID_PARAMS, INVALID_REQUEST,
    METHOD_NOT_FOUND,
};

/// Unix Domain Socket server for Keyrack.
pub struct UdsServer {
    store: Arc<InMemoryCredentialStore>,
    socket_path: PathBuf,
    /// Set once this server owns the socket file.
    bound: AtomicBool,
}

impl UdsServer {
    /// Create a new UDS server around a shared store.
    pub fn new(store: Arc<InMemoryCredentialStore>, socket_path: PathBuf) -> Self {
        Self {
            store,
            socket_path,
            bound: AtomicBool::new(false),
        }
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }

    /// Start the UDS server. This runs until the process is terminated or the
    /// future is dropped.
    pub async fn run(&self) -> io::Result<()> {
        // Ensure the socket directory exists
        if let Some(parent) = self.socket_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        clear_stale_socket(&self.socket_path).await?;

        let listener = UnixListener::bind(&self.socket_path)?;
        self.bound.store(true, Ordering::SeqCst);
        tracing::info!(
            socket = %self.socket_path.display(),
            "Keyrack UDS server listening"
        );

        // Owner-only access to the socket
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.socket_path, perms)?;
        }

        loop {
            let (stream, _addr) = listener.accept().await?;
            let store = Arc::clone(&self.store);

            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, store.as_ref()).await {
                    tracing::error!("Connection handler error: {}", e);
                }
            });
        }
    }

    /// Remove the socket file, but only if this server bound it.
    pub fn cleanup(&self) -> io::Result<()> {
        if !self.bound.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        match std::fs::remove_file(&self.socket_path) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
            _ => Ok(()),
        }
    }
}

/// Make `path` free for binding.
///
/// Only a socket nobody is listening on is removed. A live socket or any
/// other kind of file is left alone and reported as an error.
async fn clear_stale_socket(path: &Path) -> io::Result<()> {
    let metadata = match tokio::fs::symlink_metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
        Err(e) => return Err(e),
    };

    if !metadata.file_type().is_socket() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} exists and is not a socket", path.display()),
        ));
    }

    match UnixStream::connect(path).await {
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AddrInUse,
            format!("a Keyrack server is already running at {}", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::ConnectionRefused => {
            tracing::debug!(socket = %path.display(), "Removing stale socket");
            tokio::fs::remove_file(path).await
        }
        Err(e) => Err(e),
    }
}

/// Handle a single client connection.
/// Reads newline-delimited JSON-RPC requests and writes responses.
async fn handle_connection(stream: UnixStream, store: &InMemoryCredentialStore) -> io::Result<()> {
    match stream.peer_cred() {
        Ok(cred) => tracing::debug!(uid = cred.uid(), pid = ?cred.pid(), "Client connected"),
        Err(_) => tracing::debug!("Client connected"),
    }

    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let response = process_request(&line, store);
        let mut json = serde_json::to_string(&response)?;
        json.push('\n');
        writer.write_all(json.as_bytes()).await?;
        writer.flush().await?;
    }

    Ok(())
}

/// Parse and dispatch a single JSON-RPC request.
pub fn process_request(raw: &str, store: &dyn CredentialStore) -> JsonRpcResponse {
    let request: JsonRpcRequest = match serde_json::from_str(raw) {
        Ok(req) => req,
        Err(e) => return JsonRpcResponse::parse_error(format!("Parse error: {}", e)),
    };

    if let Err(e) = request.validate() {
        return JsonRpcResponse::error(request.id, INVALID_REQUEST, e);
    }

    let id = request.id;
    let params = &request.params;

    match request.method.as_str() {
        "list_schemas" => respond(id, store.registry().list()),
        "get_schema" => handle_get_schema(store, id, params),
        "upsert_credentials" => handle_upsert(store, id, params),
        "get_masked_view" => handle_masked_view(store, id, params),
        "list_configured_platforms" => respond(id, &store.list_configured()),
        "remove_credentials" => handle_remove(store, id, params),
        "export_all_masked" => respond(id, &export_all_masked(store)),
        _ => JsonRpcResponse::error(
            id,
            METHOD_NOT_FOUND,
            format!("Unknown method: {}", request.method),
        ),
    }
}

// ─── Method Handlers ─────────────────────────────────────────────────────────

fn handle_get_schema(store: &dyn CredentialStore, id: Value, params: &Value) -> JsonRpcResponse {
    let platform = match extract_platform(params) {
        Ok(p) => p,
        Err(resp) => return resp.with_id(id),
    };

    match store.registry().get(platform) {
        Ok(schema) => respond(id, schema),
        Err(e) => JsonRpcResponse::from_store_error(id, &e),
    }
}

fn handle_upsert(store: &dyn CredentialStore, id: Value, params: &Value) -> JsonRpcResponse {
    let platform = match extract_platform(params) {
        Ok(p) => p,
        Err(resp) => return resp.with_id(id),
    };
    let fields = match extract_fields(params) {
        Ok(f) => f,
        Err(resp) => return resp.with_id(id),
    };

    match store.upsert(platform, &fields) {
        Ok(()) => {
            tracing::info!(platform = %platform, "Credentials stored");
            let result = serde_json::json!({ "platform": platform, "configured": true });
            JsonRpcResponse::success(id, result)
        }
        Err(e) => {
            tracing::debug!(platform = %platform, error = %e, "Upsert rejected");
            JsonRpcResponse::from_store_error(id, &e)
        }
    }
}

fn handle_masked_view(store: &dyn CredentialStore, id: Value, params: &Value) -> JsonRpcResponse {
    let platform = match extract_platform(params) {
        Ok(p) => p,
        Err(resp) => return resp.with_id(id),
    };

    match store.masked_view(platform) {
        Ok(view) => respond(id, &view),
        Err(e) => JsonRpcResponse::from_store_error(id, &e),
    }
}

fn handle_remove(store: &dyn CredentialStore, id: Value, params: &Value) -> JsonRpcResponse {
    let platform = match extract_platform(params) {
        Ok(p) => p,
        Err(resp) => return resp.with_id(id),
    };

    let removed = store.remove(platform);
    if removed {
        tracing::info!(platform = %platform, "Credentials removed");
    }
    JsonRpcResponse::success(
        id,
        serde_json::json!({ "platform": platform, "removed": removed }),
    )
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

fn respond<T: Serialize + ?Sized>(id: Value, value: &T) -> JsonRpcResponse {
    match serde_json::to_value(value) {
        Ok(json) => JsonRpcResponse::success(id, json),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("{}", e)),
    }
}

fn extract_platform(params: &Value) -> Result<&str, JsonRpcResponse> {
    params
        .get("platform")
        .and_then(|v| v.as_str())
        .ok_or_else(|| {
            JsonRpcResponse::error(Value::Null, INVALID_PARAMS, "Missing 'platform' parameter")
        })
}

fn extract_fields(params: &Value) -> Result<FieldMap, JsonRpcResponse> {
    let object = params
        .get("fields")
        .and_then(|v| v.as_object())
        .ok_or_else(|| {
            JsonRpcResponse::error(
                Value::Null,
                INVALID_PARAMS,
                "Missing 'fields' object parameter",
            )
        })?;

    object
        .iter()
        .map(|(name, value)| match value.as_str() {
            Some(s) => Ok((name.clone(), s.to_string())),
            None => Err(JsonRpcResponse::error(
                Value::Null,
                INVALID_PARAMS,
                format!("Field '{}' must be a string", name),
            )),
        })
        .collect()
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::protocol::{
        INCOMPLETE_CREDENTIALS, NOT_CONFIGURED, PARSE_ERROR, UNKNOWN_PLATFORM,
    };

    fn call(store: &InMemoryCredentialStore, method: &str, params: Value) -> JsonRpcResponse {
        let req = serde_json::json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": 1,
        });
        process_request(&req.to_string(), store)
    }

    #[test]
    fn test_list_schemas() {
        let store = InMemoryCredentialStore::with_builtin_catalog();
        let resp = call(&store, "list_schemas", Value::Null);
        let result = resp.result.unwrap();
        assert_eq!(result[0]["id"], "telegram");
        assert_eq!(result[0]["fields"], serde_json::json!(["bot_token", "chat_id"]));
    }

    #[test]
    fn test_get_schema_unknown_platform() {
        let store = InMemoryCredentialStore::with_builtin_catalog();
        let resp = call(&store, "get_schema", serde_json::json!({ "platform": "myspace" }));
        assert_eq!(resp.error.unwrap().code, UNKNOWN_PLATFORM);
        assert_eq!(resp.id, Value::from(1));
    }

    #[test]
    fn test_crud_lifecycle() {
        let store = InMemoryCredentialStore::with_builtin_catalog();

        // Upsert
        let resp = call(
            &store,
            "upsert_credentials",
            serde_json::json!({
                "platform": "telegram",
                "fields": { "bot_token": "abc123", "chat_id": "-100" },
            }),
        );
        assert!(resp.error.is_none(), "Upsert should succeed: {:?}", resp.error);

        // List
        let resp = call(&store, "list_configured_platforms", Value::Null);
        assert_eq!(resp.result.unwrap(), serde_json::json!(["telegram"]));

        // Masked view
        let resp = call(&store, "get_masked_view", serde_json::json!({ "platform": "telegram" }));
        assert_eq!(
            resp.result.unwrap(),
            serde_json::json!([
                { "field": "bot_token", "value": "••••••••••••" },
                { "field": "chat_id", "value": "-100" },
            ])
        );

        // Export
        let resp = call(&store, "export_all_masked", Value::Null);
        let json = resp.result.unwrap().to_string();
        assert!(json.contains("Telegram"));
        assert!(!json.contains("abc123"));

        // Remove twice
        let resp = call(&store, "remove_credentials", serde_json::json!({ "platform": "telegram" }));
        assert_eq!(resp.result.unwrap()["removed"], true);
        let resp = call(&store, "remove_credentials", serde_json::json!({ "platform": "telegram" }));
        assert_eq!(resp.result.unwrap()["removed"], false);

        // Gone
        let resp = call(&store, "get_masked_view", serde_json::json!({ "platform": "telegram" }));
        assert_eq!(resp.error.unwrap().code, NOT_CONFIGURED);
    }

    #[test]
    fn test_incomplete_upsert_reports_missing_fields() {
        let store = InMemoryCredentialStore::with_builtin_catalog();
        let resp = call(
            &store,
            "upsert_credentials",
            serde_json::json!({ "platform": "telegram", "fields": { "bot_token": " " } }),
        );
        let error = resp.error.unwrap();
        assert_eq!(error.code, INCOMPLETE_CREDENTIALS);
        assert_eq!(
            error.data.unwrap()["missing_fields"],
            serde_json::json!(["bot_token", "chat_id"])
        );
        assert!(store.list_configured().is_empty());
    }

    #[test]
    fn test_non_string_field_rejected() {
        let store = InMemoryCredentialStore::with_builtin_catalog();
        let resp = call(
            &store,
            "upsert_credentials",
            serde_json::json!({ "platform": "telegram", "fields": { "bot_token": "t", "chat_id": -100 } }),
        );
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
        assert!(store.list_configured().is_empty());
    }

    #[test]
    fn test_missing_platform_param() {
        let store = InMemoryCredentialStore::with_builtin_catalog();
        let resp = call(&store, "get_masked_view", serde_json::json!({}));
        assert_eq!(resp.error.unwrap().code, INVALID_PARAMS);
    }

    #[test]
    fn test_unknown_method() {
        let store = InMemoryCredentialStore::with_builtin_catalog();
        let resp = call(&store, "get_secret", Value::Null);
        assert_eq!(resp.error.unwrap().code, METHOD_NOT_FOUND);
    }

    #[test]
    fn test_invalid_json() {
        let store = InMemoryCredentialStore::with_builtin_catalog();
        let resp = process_request("not json at all", &store);
        assert_eq!(resp.error.unwrap().code, PARSE_ERROR);
    }

    /// Start `server` in the background and wait until it accepts connections.
    async fn start(server: &Arc<UdsServer>) -> (tokio::task::JoinHandle<io::Result<()>>, UnixStream) {
        let handle = {
            let server = Arc::clone(server);
            tokio::spawn(async move { server.run().await })
        };

        for _ in 0..50 {
            if let Ok(stream) = UnixStream::connect(server.socket_path()).await {
                return (handle, stream);
            }
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        }
        panic!("server should accept connections");
    }

    async fn upsert_discord(stream: UnixStream) -> Value {
        let (reader, mut writer) = stream.into_split();
        let request = concat!(
            r#"{"jsonrpc":"2.0","method":"upsert_credentials","params":{"platform":"discord","fields":{"bot_token":"d","guild_id":"42"}},"id":1}"#,
            "\n"
        );
        writer.write_all(request.as_bytes()).await.unwrap();

        let mut lines = BufReader::new(reader).lines();
        let line = lines.next_line().await.unwrap().unwrap();
        serde_json::from_str(&line).unwrap()
    }

    #[tokio::test]
    async fn test_socket_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("keyrack.sock");
        let store = Arc::new(InMemoryCredentialStore::with_builtin_catalog());
        let server = Arc::new(UdsServer::new(Arc::clone(&store), socket_path.clone()));

        let (handle, stream) = start(&server).await;
        let response = upsert_discord(stream).await;
        assert_eq!(response["result"]["configured"], true);
        assert!(store.list_configured().contains("discord"));

        handle.abort();
        server.cleanup().unwrap();
        assert!(!socket_path.exists());
    }

    #[tokio::test]
    async fn test_run_refuses_to_replace_regular_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.json");
        std::fs::write(&path, "user data").unwrap();

        let server = UdsServer::new(
            Arc::new(InMemoryCredentialStore::with_builtin_catalog()),
            path.clone(),
        );
        let err = server.run().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);

        server.cleanup().unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "user data");
    }

    #[tokio::test]
    async fn test_stale_socket_is_replaced() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("keyrack.sock");

        // A bound socket whose listener is gone refuses connections.
        drop(std::os::unix::net::UnixListener::bind(&socket_path).unwrap());
        assert!(socket_path.exists());

        let store = Arc::new(InMemoryCredentialStore::with_builtin_catalog());
        let server = Arc::new(UdsServer::new(Arc::clone(&store), socket_path.clone()));
        let (handle, stream) = start(&server).await;
        assert_eq!(upsert_discord(stream).await["result"]["configured"], true);

        handle.abort();
        server.cleanup().unwrap();
    }

    #[tokio::test]
    async fn test_second_server_leaves_live_socket_alone() {
        let dir = tempfile::tempdir().unwrap();
        let socket_path = dir.path().join("keyrack.sock");

        let first_store = Arc::new(InMemoryCredentialStore::with_builtin_catalog());
        let first = Arc::new(UdsServer::new(Arc::clone(&first_store), socket_path.clone()));
        let (handle, ready_conn) = start(&first).await;
        drop(ready_conn);

        let second = UdsServer::new(
            Arc::new(InMemoryCredentialStore::with_builtin_catalog()),
            socket_path.clone(),
        );
        let err = second.run().await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AddrInUse);
        second.cleanup().unwrap();
        assert!(socket_path.exists(), "the running server keeps its socket");

        let stream = UnixStream::connect(&socket_path).await.unwrap();
        assert_eq!(upsert_discord(stream).await["result"]["configured"], true);
        assert!(first_store.list_configured().contains("discord"));

        handle.abort();
        first.cleanup().unwrap();
    }
}
