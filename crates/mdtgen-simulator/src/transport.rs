//! gRPC dial-out transport.
//!
//! Payloads are already encoded `Telemetry` messages. The stream only wraps
//! them in a `MdtDialoutArgs` frame, so the codec below works on
//! [`DialoutArgs`] directly instead of a generated message type.

use async_trait::async_trait;
use bytes::{Buf, BufMut};
use mdtgen_wire::DialoutArgs;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tonic::codec::{Codec, DecodeBuf, Decoder, EncodeBuf, Encoder};
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, Endpoint};
use tonic::{Request, Status};
use tracing::{debug, info, warn};

/// Client-streaming method exposed by MDT collectors
pub const DIALOUT_PATH: &str = "/mdt_dialout.gRPCMdtDialout/MdtDialout";

/// Frames buffered ahead of the HTTP/2 stream. Kept at one so a stalled
/// collector blocks the tick loop on the next send.
const SEND_BUFFER: usize = 1;

/// How long `close` waits for the collector to finish the call
const CLOSE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid collector address '{address}': {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: tonic::transport::Error,
    },

    #[error("Failed to connect to collector: {0}")]
    Connect(#[from] tonic::transport::Error),

    #[error("Dial-out call failed: {0}")]
    Rpc(#[from] Status),

    #[error("Dial-out stream closed by collector")]
    StreamClosed,

    #[error("Dial-out task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// Destination for encoded telemetry payloads.
#[async_trait]
pub trait TelemetrySink: Send {
    /// Push one payload, tagged with the session correlation id.
    async fn send(&mut self, req_id: i64, payload: Vec<u8>) -> Result<()>;

    /// Finish the stream. Further sends fail.
    async fn close(&mut self) -> Result<()>;
}

/// One long-lived `MdtDialout` call.
///
/// The call runs on its own task and is fed through a one-frame channel.
/// Replies are read on that task, so a collector that only answers at end of
/// stream does not hold up sends.
pub struct DialoutStream {
    sender: Option<mpsc::Sender<DialoutArgs>>,
    call: Option<JoinHandle<Result<()>>>,
}

impl DialoutStream {
    /// Connect to `server` (`host:port` or a full URI) and open the stream.
    pub async fn connect(server: &str, connect_timeout: Duration) -> Result<Self> {
        let uri = if server.contains("://") {
            server.to_string()
        } else {
            format!("http://{}", server)
        };

        let endpoint = Endpoint::from_shared(uri)
            .map_err(|source| TransportError::InvalidAddress {
                address: server.to_string(),
                source,
            })?
            .connect_timeout(connect_timeout);

        let channel = endpoint.connect().await?;
        info!("Connected to MDT collector at {}", server);

        let mut grpc = tonic::client::Grpc::new(channel);
        grpc.ready().await?;

        let (sender, receiver) = mpsc::channel(SEND_BUFFER);
        let call = tokio::spawn(run_call(grpc, receiver));

        Ok(Self {
            sender: Some(sender),
            call: Some(call),
        })
    }

    /// Collects the call's outcome after the request stream has gone away.
    async fn failure(&mut self) -> TransportError {
        self.sender = None;
        match self.call.take() {
            Some(call) => match call.await {
                Ok(Err(e)) => e,
                Ok(Ok(())) => TransportError::StreamClosed,
                Err(e) => e.into(),
            },
            None => TransportError::StreamClosed,
        }
    }
}

async fn run_call(
    mut grpc: tonic::client::Grpc<Channel>,
    receiver: mpsc::Receiver<DialoutArgs>,
) -> Result<()> {
    let request = Request::new(ReceiverStream::new(receiver));
    let path = PathAndQuery::from_static(DIALOUT_PATH);
    let response = grpc.streaming(request, path, DialoutCodec).await?;

    let mut replies = response.into_inner();
    while let Some(reply) = replies.message().await? {
        if reply.errors.is_empty() {
            debug!(req_id = reply.req_id, "Collector reply");
        } else {
            warn!(req_id = reply.req_id, "Collector reported error: {}", reply.errors);
        }
    }

    Ok(())
}

#[async_trait]
impl TelemetrySink for DialoutStream {
    async fn send(&mut self, req_id: i64, payload: Vec<u8>) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(TransportError::StreamClosed);
        };

        if sender.send(DialoutArgs::new(req_id, payload)).await.is_err() {
            return Err(self.failure().await);
        }
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the sender ends the request stream.
        self.sender = None;

        let Some(mut call) = self.call.take() else {
            return Ok(());
        };

        match tokio::time::timeout(CLOSE_TIMEOUT, &mut call).await {
            Ok(outcome) => outcome?,
            Err(_) => {
                warn!("Collector did not finish the dial-out call, aborting");
                call.abort();
                Ok(())
            }
        }
    }
}

/// Codec moving [`DialoutArgs`] frames through tonic without prost.
#[derive(Debug, Clone, Copy, Default)]
pub struct DialoutCodec;

impl Codec for DialoutCodec {
    type Encode = DialoutArgs;
    type Decode = DialoutArgs;
    type Encoder = DialoutEncoder;
    type Decoder = DialoutDecoder;

    fn encoder(&mut self) -> Self::Encoder {
        DialoutEncoder
    }

    fn decoder(&mut self) -> Self::Decoder {
        DialoutDecoder
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DialoutEncoder;

impl Encoder for DialoutEncoder {
    type Item = DialoutArgs;
    type Error = Status;

    fn encode(&mut self, item: Self::Item, dst: &mut EncodeBuf<'_>) -> std::result::Result<(), Status> {
        dst.put_slice(&item.encode());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DialoutDecoder;

impl Decoder for DialoutDecoder {
    type Item = DialoutArgs;
    type Error = Status;

    fn decode(
        &mut self,
        src: &mut DecodeBuf<'_>,
    ) -> std::result::Result<Option<Self::Item>, Status> {
        let frame = src.copy_to_bytes(src.remaining());
        DialoutArgs::decode(&frame)
            .map(Some)
            .map_err(|e| Status::internal(format!("invalid MdtDialoutArgs: {}", e)))
    }
}
