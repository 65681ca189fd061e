//! Decoding of response bodies sent with `Content-Encoding: gzip`.
//!
//! Listings are small and read whole, so the body is inflated after it has
//! been buffered.

use http::header::{HeaderMap, CONTENT_ENCODING};

pub use imp::{gunzip, Gunzip};

/// Returns `true` if the response body is gzip-encoded.
pub fn is_gzip(headers: &HeaderMap) -> bool {
    headers
        .get_all(CONTENT_ENCODING)
        .iter()
        .any(|e| e == "gzip")
}

/// The value of the `Accept-Encoding` request header.
pub const ACCEPT: &str = if cfg!(feature = "gzip") {
    "gzip"
} else {
    "identity"
};

#[cfg(feature = "gzip")]
mod imp {
    use std::future::Future;
    use std::io::{self, Cursor};
    use std::mem;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use async_compression::tokio::bufread::GzipDecoder;
    use futures_util::ready;
    use pin_project_lite::pin_project;
    use tokio_util::io::poll_read_buf;

    pin_project! {
        /// A future inflating a buffered gzip body.
        pub struct Gunzip {
            #[pin]
            decoder: GzipDecoder<Cursor<Vec<u8>>>,
            inflated: Vec<u8>,
        }
    }

    pub fn gunzip(body: Vec<u8>) -> Gunzip {
        let capacity = body.len().saturating_mul(4);
        Gunzip {
            decoder: GzipDecoder::new(Cursor::new(body)),
            inflated: Vec::with_capacity(capacity),
        }
    }

    impl Future for Gunzip {
        type Output = io::Result<Vec<u8>>;

        fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            let mut this = self.project();
            loop {
                if this.inflated.len() == this.inflated.capacity() {
                    this.inflated.reserve(8 * 1024);
                }
                if ready!(poll_read_buf(this.decoder.as_mut(), cx, this.inflated))? == 0 {
                    return Poll::Ready(Ok(mem::take(this.inflated)));
                }
            }
        }
    }
}

#[cfg(not(feature = "gzip"))]
mod imp {
    use std::future::Future;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// Resolves to an error: the server is never offered gzip without the decoder.
    pub struct Gunzip(());

    pub fn gunzip(_body: Vec<u8>) -> Gunzip {
        Gunzip(())
    }

    impl Future for Gunzip {
        type Output = io::Result<Vec<u8>>;

        fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Self::Output> {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::InvalidData,
                "gzip-encoded response without the `gzip` feature",
            )))
        }
    }
}
