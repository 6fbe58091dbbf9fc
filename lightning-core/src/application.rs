// HTTP server in front of the dispatcher

use crate::logging::{debug, error, info, warn};
use crate::{Container, Dispatcher, Error, HttpRequest, HttpResponse};
use http_body_util::{BodyExt, Full};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, body::Incoming as IncomingBody};
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use tokio::net::TcpListener;

/// The main application struct
#[derive(Debug, Clone)]
pub struct Application {
    dispatcher: Dispatcher,
}

impl Application {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self { dispatcher }
    }

    /// Get a reference to the DI container
    pub fn container(&self) -> &Container {
        self.dispatcher.container()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one request without going through a socket
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        dispatch_blocking(self.dispatcher.clone(), request).await
    }

    /// Start the HTTP server on the specified port
    pub async fn listen(self, port: u16) -> Result<(), Error> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await?;
        self.serve(listener).await
    }

    /// Serve connections accepted from `listener` until an accept fails
    pub async fn serve(self, listener: TcpListener) -> Result<(), Error> {
        info!(address = %listener.local_addr()?, "Server listening");

        loop {
            let (stream, peer) = listener.accept().await?;
            let io = TokioIo::new(stream);
            let dispatcher = self.dispatcher.clone();

            tokio::spawn(async move {
                let service = service_fn(move |req: Request<IncomingBody>| {
                    let dispatcher = dispatcher.clone();
                    async move { handle_request(req, dispatcher).await }
                });

                if let Err(err) = http1::Builder::new().serve_connection(io, service).await {
                    warn!(peer = %peer, error = %err, "Error serving connection");
                }
            });
        }
    }
}

/// Handle an incoming HTTP request
async fn handle_request(
    req: Request<IncomingBody>,
    dispatcher: Dispatcher,
) -> Result<Response<Full<bytes::Bytes>>, hyper::Error> {
    // Keep the query string; the route table strips it, controllers may read it
    let method = req.method().to_string();
    let path = req
        .uri()
        .path_and_query()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let mut request = HttpRequest::new(method, path);

    for (name, value) in req.headers() {
        if let Ok(value_str) = value.to_str() {
            request
                .headers
                .insert(name.to_string(), value_str.to_string());
        }
    }

    let body_bytes = req.collect().await?.to_bytes();
    request.body = body_bytes.to_vec();

    let response = dispatch_blocking(dispatcher, request).await;
    Ok(into_hyper_response(response))
}

/// Run the synchronous dispatch sequence on the blocking pool
async fn dispatch_blocking(dispatcher: Dispatcher, mut request: HttpRequest) -> HttpResponse {
    let outcome =
        tokio::task::spawn_blocking(move || dispatcher.dispatch(&mut request)).await;

    match outcome {
        Ok(Ok(dispatch)) => dispatch.into_response(),
        Ok(Err(err)) => {
            error!(error = %err, root_cause = %err.root_cause(), "Request failed");
            error_response(&err)
        }
        Err(join_error) => {
            error!(error = %join_error, "Dispatch task panicked");
            HttpResponse::internal_server_error()
        }
    }
}

fn error_response(err: &Error) -> HttpResponse {
    HttpResponse::new(err.status_code())
        .with_header(
            "Content-Type".to_string(),
            "text/plain; charset=utf-8".to_string(),
        )
        .with_body(err.to_string().into_bytes())
}

fn into_hyper_response(response: HttpResponse) -> Response<Full<bytes::Bytes>> {
    let mut builder = Response::builder().status(response.status);
    for (key, value) in &response.headers {
        builder = builder.header(key.as_str(), value.as_str());
    }

    let body = Full::new(bytes::Bytes::from(response.body));
    match builder.body(body) {
        Ok(response) => response,
        Err(err) => {
            debug!(error = %err, "Invalid response parts, sending bare 500");
            let mut fallback = Response::new(Full::new(bytes::Bytes::new()));
            *fallback.status_mut() = hyper::StatusCode::INTERNAL_SERVER_ERROR;
            fallback
        }
    }
}
