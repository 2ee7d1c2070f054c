use rumqttc::{ClientError, ConnectReturnCode, ConnectionError};

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Broker rejected the connection: {0:?}")]
    AuthenticationRejected(ConnectReturnCode),

    #[error("Broker unreachable after {attempts} attempts: {source}")]
    InitialConnectExhausted {
        attempts: u32,
        #[source]
        source: ConnectionError,
    },

    #[error("Client request failed: {0}")]
    Client(#[from] ClientError),
}
