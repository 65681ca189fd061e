//! Type aliases for use with `hyper` crate's HTTP client.

pub type Client = hyper_pkg::Client<hyper_tls::HttpsConnector<hyper_pkg::client::HttpConnector>>;
pub type FuturePlaces = crate::FuturePlaces<hyper_pkg::client::ResponseFuture, hyper_pkg::Body>;
pub type Error = crate::Error<hyper_pkg::Error>;
pub type FetchOutcome = crate::FetchOutcome<hyper_pkg::Error>;
pub type Driver<H> = crate::Driver<Client, H>;
