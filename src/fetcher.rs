//! Requests to the places search API.

use std::future::Future;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_util::ready;
use http::header::{HeaderValue, ACCEPT_ENCODING};
use http::{Request, Response};
use http_body::Body;
use pin_project_lite::pin_project;
use tower_service::Service;

use crate::cancel::CancelToken;
use crate::config::Config;
use crate::error::{ConfigError, Error};
use crate::gzip::{self, Gunzip};
use crate::place::{self, Place};
use crate::types::{BoundingBox, Category, StatusCode, Uri};
use crate::util::HttpBodyAsStream;

const DEFAULT_ENDPOINT: &str = "https://travel-advisor.p.rapidapi.com";
const DEFAULT_API_HOST: &str = "travel-advisor.p.rapidapi.com";

/// A client for the places search API.
///
/// ## Example
///
/// ```rust,no_run
/// use places_explorer::types::{BoundingBox, Category, Coordinate};
/// use places_explorer::{CancelToken, FetchOutcome, PlacesFetcher};
///
/// # #[tokio::main]
/// # async fn main() {
/// let fetcher = PlacesFetcher::new("api_key");
/// let bbox = BoundingBox::new(Coordinate::new(16.75, 96.1), Coordinate::new(16.86, 96.21));
///
/// match fetcher.fetch(Category::Hotels, bbox, CancelToken::new()).await {
///     FetchOutcome::Places(places) => {
///         for place in places {
///             println!("{}", place.name);
///         }
///     }
///     FetchOutcome::Failed(e) => eprintln!("error: {}", e),
///     FetchOutcome::Cancelled => {}
/// }
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PlacesFetcher {
    endpoint: Uri,
    api_host: String,
    api_key: String,
}

/// How a fetch ended.
#[derive(Debug)]
pub enum FetchOutcome<E> {
    /// The places within the requested bounds, in the order the API returned them.
    Places(Vec<Place>),
    /// The request or the decoding of its response failed.
    Failed(Error<E>),
    /// The fetch was cancelled through its `CancelToken` before it completed.
    Cancelled,
}

pin_project! {
    /// A future returned by `PlacesFetcher::fetch_with_client`
    /// which resolves to a `FetchOutcome`.
    pub struct FuturePlaces<F, B>
    where
        B: Body,
    {
        #[pin]
        state: State<F, B>,
        category: Category,
        token: CancelToken,
    }
}

pin_project! {
    #[project = StateProj]
    enum State<F, B>
    where
        B: Body,
    {
        Rejected {
            reason: Option<Rejection>,
        },
        Waiting {
            #[pin]
            response: F,
        },
        Reading {
            #[pin]
            body: HttpBodyAsStream<B>,
            buf: Vec<u8>,
            gzipped: bool,
        },
        Inflating {
            #[pin]
            body: Gunzip,
        },
        Done,
    }
}

/// Why a request was never sent.
enum Rejection {
    Bounds(BoundingBox),
    Request(http::Error),
}

impl PlacesFetcher {
    /// Creates a fetcher for the default search API endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        PlacesFetcher {
            endpoint: Uri::from_static(DEFAULT_ENDPOINT),
            api_host: DEFAULT_API_HOST.to_owned(),
            api_key: api_key.into(),
        }
    }

    /// Creates a fetcher with the API settings of `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConfigError> {
        let endpoint = config
            .endpoint
            .parse::<Uri>()
            .map_err(|_| ConfigError::Invalid {
                var: crate::config::ENDPOINT_ENV,
                value: config.endpoint.clone(),
            })?;
        let mut fetcher = PlacesFetcher::new(config.api_key.clone());
        fetcher.endpoint(endpoint).api_host(config.api_host.clone());
        Ok(fetcher)
    }

    /// Reset the base URI of the search API.
    pub fn endpoint(&mut self, endpoint: Uri) -> &mut Self {
        self.endpoint = endpoint;
        self
    }

    /// Reset the value of the `x-rapidapi-host` header.
    pub fn api_host(&mut self, api_host: impl Into<String>) -> &mut Self {
        self.api_host = api_host.into();
        self
    }

    /// Reset the key sent in the `x-rapidapi-key` header.
    pub fn api_key(&mut self, api_key: impl Into<String>) -> &mut Self {
        self.api_key = api_key.into();
        self
    }

    /// Fetches the places of `category` within `bbox`, returning a `Future` which
    /// resolves to a `FetchOutcome`.
    ///
    /// # Panics
    ///
    /// This will panic if the underlying HTTPS connector failed to initialize.
    #[cfg(feature = "hyper")]
    #[cfg_attr(docsrs, doc(cfg(feature = "hyper")))]
    pub fn fetch(
        &self,
        category: Category,
        bbox: BoundingBox,
        token: CancelToken,
    ) -> crate::hyper::FuturePlaces {
        let conn = hyper_tls::HttpsConnector::new();
        let client = hyper_pkg::Client::builder().build::<_, hyper_pkg::Body>(conn);
        self.fetch_with_client(client, category, bbox, token)
    }

    /// Same as `fetch` except that it uses `client` to make HTTP request to the endpoint.
    ///
    /// No request is made if `bbox` is not well-formed or `token` is already cancelled.
    /// Cancelling `token` later drops the response future of `client`,
    /// abandoning the request.
    ///
    /// # Panics
    ///
    /// This will call `<S as Service>::call` without checking for `<S as Service>::poll_ready`
    /// and may cause a panic if `client` is not ready to send an HTTP request yet.
    pub fn fetch_with_client<S, ReqB, ResB>(
        &self,
        mut client: S,
        category: Category,
        bbox: BoundingBox,
        token: CancelToken,
    ) -> FuturePlaces<S::Future, ResB>
    where
        S: Service<Request<ReqB>, Response = Response<ResB>>,
        ReqB: Default,
        ResB: Body,
    {
        let state = if token.is_cancelled() {
            State::Done
        } else if !bbox.is_well_formed() {
            State::Rejected {
                reason: Some(Rejection::Bounds(bbox)),
            }
        } else {
            match self.request(category, &bbox) {
                Ok(req) => {
                    tracing::debug!(%category, %bbox, "requesting places");
                    State::Waiting {
                        response: client.call(req),
                    }
                }
                Err(e) => State::Rejected {
                    reason: Some(Rejection::Request(e)),
                },
            }
        };

        FuturePlaces {
            state,
            category,
            token,
        }
    }

    fn request<B: Default>(
        &self,
        category: Category,
        bbox: &BoundingBox,
    ) -> Result<Request<B>, http::Error> {
        let sw = bbox.southwest();
        let ne = bbox.northeast();
        let uri = format!(
            "{}/{}/list-in-boundary?bl_latitude={}&bl_longitude={}&tr_latitude={}&tr_longitude={}",
            self.endpoint.to_string().trim_end_matches('/'),
            category,
            sw.latitude,
            sw.longitude,
            ne.latitude,
            ne.longitude,
        );

        Request::get(uri)
            .header(ACCEPT_ENCODING, HeaderValue::from_static(gzip::ACCEPT))
            .header("x-rapidapi-key", self.api_key.as_str())
            .header("x-rapidapi-host", self.api_host.as_str())
            .body(B::default())
    }
}

impl<E> FetchOutcome<E> {
    pub fn is_cancelled(&self) -> bool {
        matches!(*self, FetchOutcome::Cancelled)
    }
}

impl<F, B, E> Future for FuturePlaces<F, B>
where
    F: Future<Output = Result<Response<B>, E>>,
    B: Body,
    B::Error: Into<E>,
{
    type Output = FetchOutcome<E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();

        if this.token.poll_cancelled(cx).is_ready() {
            // Dropping the response future or body aborts the request.
            this.state.set(State::Done);
            return Poll::Ready(FetchOutcome::Cancelled);
        }

        loop {
            match this.state.as_mut().project() {
                StateProj::Rejected { reason } => {
                    let error = match reason.take() {
                        Some(Rejection::Bounds(bbox)) => Error::InvalidBounds(bbox),
                        Some(Rejection::Request(e)) => Error::Request(e),
                        None => panic!("`FuturePlaces` polled after completion"),
                    };
                    this.state.set(State::Done);
                    return Poll::Ready(FetchOutcome::Failed(error));
                }
                StateProj::Waiting { response } => {
                    let res = match ready!(response.poll(cx)) {
                        Ok(res) => res,
                        Err(e) => {
                            this.state.set(State::Done);
                            return Poll::Ready(FetchOutcome::Failed(Error::Service(e)));
                        }
                    };
                    let (parts, body) = res.into_parts();

                    if StatusCode::OK != parts.status {
                        this.state.set(State::Done);
                        return Poll::Ready(FetchOutcome::Failed(Error::Http(parts.status)));
                    }

                    this.state.set(State::Reading {
                        body: HttpBodyAsStream::new(body),
                        buf: Vec::new(),
                        gzipped: gzip::is_gzip(&parts.headers),
                    });
                }
                StateProj::Reading {
                    mut body,
                    buf,
                    gzipped,
                } => {
                    while let Some(chunk) = ready!(body.as_mut().poll_next(cx)) {
                        match chunk {
                            Ok(chunk) => buf.extend_from_slice(&chunk),
                            Err(e) => {
                                this.state.set(State::Done);
                                let e = e.map_service(Into::into);
                                return Poll::Ready(FetchOutcome::Failed(e));
                            }
                        }
                    }

                    let buf = mem::take(buf);
                    if *gzipped {
                        this.state.set(State::Inflating {
                            body: gzip::gunzip(buf),
                        });
                    } else {
                        this.state.set(State::Done);
                        return Poll::Ready(decode(&buf, *this.category));
                    }
                }
                StateProj::Inflating { body } => {
                    let result = ready!(body.poll(cx));
                    this.state.set(State::Done);
                    return Poll::Ready(match result {
                        Ok(buf) => decode(&buf, *this.category),
                        Err(e) => FetchOutcome::Failed(Error::Gzip(e)),
                    });
                }
                StateProj::Done => panic!("`FuturePlaces` polled after completion"),
            }
        }
    }
}

fn decode<E>(body: &[u8], category: Category) -> FetchOutcome<E> {
    match place::decode(body, category) {
        Ok(places) => FetchOutcome::Places(places),
        Err(e) => FetchOutcome::Failed(Error::Json(e)),
    }
}
