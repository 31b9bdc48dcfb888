use mdtgen_simulator::{DialoutStream, TransportError};
use std::time::Duration;

#[tokio::test]
async fn test_connect_refused_is_transport_error() {
    // Grab a free port, then release it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = DialoutStream::connect(&addr.to_string(), Duration::from_secs(2)).await;

    assert!(matches!(result, Err(TransportError::Connect(_))));
}

#[tokio::test]
async fn test_malformed_address_rejected() {
    let result = DialoutStream::connect("not a host", Duration::from_secs(1)).await;
    assert!(matches!(
        result,
        Err(TransportError::InvalidAddress { .. })
    ));
}
