use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::{Buf, Bytes};
use futures_core::Stream;
use http_body::Body;
use pin_project_lite::pin_project;

use crate::error::Error;

/// Creates an enum with `AsRef<str>`, `Display` and `FromStr` impls.
macro_rules! str_enum {
    (
        $(#[$attr:meta])*
        pub enum $E:ident {
            $(
                $(#[$v_attr:meta])*
                $V:ident = $by:literal
            ),*$(,)?
        }
    ) => {
        $(#[$attr])*
        pub enum $E {
            $(
                $(#[$v_attr])*
                $V,
            )*
        }

        impl $E {
            /// All the variants, in declaration order.
            pub const ALL: &'static [$E] = &[$($E::$V),*];
        }

        impl std::convert::AsRef<str> for $E {
            fn as_ref(&self) -> &str {
                match *self {
                    $($E::$V => $by,)*
                }
            }
        }

        impl std::fmt::Display for $E {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                std::fmt::Display::fmt(std::convert::AsRef::<str>::as_ref(self), f)
            }
        }

        impl std::str::FromStr for $E {
            type Err = crate::error::UnknownValue;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($by => Ok($E::$V),)*
                    _ => Err(crate::error::UnknownValue::new(stringify!($E), s)),
                }
            }
        }
    }
}

pin_project! {
    /// Wraps `http_body::Body` to make it a `Stream`.
    pub struct HttpBodyAsStream<B> {
        #[pin]
        pub inner: B,
    }
}

impl<B: Body> HttpBodyAsStream<B> {
    pub fn new(inner: B) -> Self {
        HttpBodyAsStream { inner }
    }
}

impl<B: Body> Stream for HttpBodyAsStream<B> {
    type Item = Result<Bytes, Error<B::Error>>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.project().inner.poll_data(cx).map(|opt| {
            opt.map(|result| {
                result
                    .map(|mut buf| buf.copy_to_bytes(buf.remaining()))
                    .map_err(Error::Service)
            })
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use futures::executor::block_on_stream;

    #[test]
    fn body_chunks() {
        let body = hyper_pkg::Body::from("{\"data\": []}");
        let chunks = block_on_stream(HttpBodyAsStream::new(body))
            .map(|c| c.unwrap())
            .collect::<Vec<_>>();
        assert_eq!(chunks.concat(), b"{\"data\": []}");
    }
}
