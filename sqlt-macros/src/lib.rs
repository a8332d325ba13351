//! Derive macros for the [`sqlt`] crate.
//!
//! These are re-exported from `sqlt` itself when its `derive` feature is
//! enabled, which is where they are documented.
//!
//! [`sqlt`]: https://docs.rs/sqlt

extern crate proc_macro;

mod implement;

use proc_macro::TokenStream;

#[proc_macro_derive(Bind, attributes(sql))]
pub fn bind(input: TokenStream) -> TokenStream {
    implement::expand(input.into(), implement::What::Bind).into()
}

#[proc_macro_derive(Row, attributes(sql))]
pub fn row(input: TokenStream) -> TokenStream {
    implement::expand(input.into(), implement::What::Row).into()
}
