// Keyrack — Gateway Module
//
// Unix Domain Socket (UDS) server for direct IPC with local agents.
// Provides JSON-RPC 2.0 over Unix sockets on top of the credential store.

mod protocol;
mod uds;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse};
pub use uds::{process_request, UdsServer};
