use std::{
    fmt::Debug,
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use alloy::{
    providers::{Provider, ProviderBuilder},
    rpc::{
        client::ClientBuilder,
        json_rpc::{RequestPacket, ResponsePacket},
    },
    transports::{http::reqwest::Url, TransportError},
};
use prometheus::Histogram;
use tower::{Layer, Service};
use tracing::debug;

use crate::dispatch::RpcNode;

/// Connects to `url`. When `send_latency` is given, every
/// `eth_sendRawTransaction` round trip is recorded into it.
pub fn connect(url: Url, send_latency: Option<Histogram>) -> RpcNode {
    let provider = match send_latency {
        Some(histogram) => {
            let client = ClientBuilder::default()
                .layer(RpcLatencyLayer::new(histogram))
                .http(url);
            ProviderBuilder::new().connect_client(client).erased()
        }
        None => ProviderBuilder::new().connect_http(url).erased(),
    };
    RpcNode::new(provider)
}

/// A layer to be used with `ClientBuilder::layer` that measures how long the
/// node takes to answer `eth_sendRawTransaction`.
pub struct RpcLatencyLayer {
    histogram: Histogram,
}

impl RpcLatencyLayer {
    pub fn new(histogram: Histogram) -> Self {
        Self { histogram }
    }
}

impl<S> Layer<S> for RpcLatencyLayer {
    type Service = RpcLatencyService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RpcLatencyService {
            inner,
            histogram: self.histogram.clone(),
        }
    }
}

#[derive(Clone)]
pub struct RpcLatencyService<S> {
    inner: S,
    histogram: Histogram,
}

impl<S> Service<RequestPacket> for RpcLatencyService<S>
where
    S: Service<RequestPacket, Response = ResponsePacket, Error = TransportError>,
    S::Future: Send + 'static,
    S::Response: Send + 'static + Debug,
    S::Error: Send + 'static + Debug,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: RequestPacket) -> Self::Future {
        let is_send_raw = match &req {
            RequestPacket::Single(inner_req) => inner_req.method() == "eth_sendRawTransaction",
            RequestPacket::Batch(_) => false,
        };

        let start_time = tokio::time::Instant::now();
        let histogram = self.histogram.clone();
        let fut = self.inner.call(req);

        Box::pin(async move {
            let res = fut.await;
            if is_send_raw {
                let elapsed = start_time.elapsed().as_secs_f64() * 1000.0;
                histogram.observe(elapsed);
                debug!("eth_sendRawTransaction latency: {elapsed:.2}ms");
            }
            res
        })
    }
}
