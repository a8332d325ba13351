use core::cell::RefCell;
use core::fmt;

use proc_macro2::{Span, TokenStream};
use quote::{ToTokens, quote};
use syn::punctuated::Punctuated;
use syn::{
    Data, DataStruct, DeriveInput, Error, Index, Lifetime, LifetimeParam, LitInt, LitStr, Member,
    Path, Type,
};

#[derive(Clone, Copy)]
pub(super) enum What {
    Bind,
    Row,
}

impl What {
    /// Parameters are numbered from 1, columns from 0.
    fn first_index(self) -> i32 {
        match self {
            What::Bind => 1,
            What::Row => 0,
        }
    }

    fn name(self) -> &'static str {
        match self {
            What::Bind => "Bind",
            What::Row => "Row",
        }
    }
}

struct Ctxt {
    errors: RefCell<Vec<Error>>,
}

impl Ctxt {
    fn new() -> Self {
        Self {
            errors: RefCell::new(Vec::new()),
        }
    }

    fn error(&self, error: Error) {
        self.errors.borrow_mut().push(error);
    }

    fn spanned(&self, span: impl ToTokens, message: impl fmt::Display) {
        self.error(Error::new_spanned(span, message));
    }
}

pub(super) fn expand(input: TokenStream, what: What) -> TokenStream {
    let cx = Ctxt::new();

    if let Ok(stream) = inner(&cx, input, what) {
        if cx.errors.borrow().is_empty() {
            return stream;
        }
    }

    let mut out = TokenStream::new();

    for error in cx.errors.into_inner() {
        out.extend(error.to_compile_error());
    }

    out
}

struct Attrs {
    crate_path: Path,
    named: bool,
}

/// How a field is addressed.
enum Slot {
    Index(i32),
    Name(LitStr),
}

struct Field {
    member: Member,
    ty: Type,
    slot: Slot,
}

fn inner(cx: &Ctxt, input: TokenStream, what: What) -> Result<TokenStream, ()> {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(error) => {
            cx.error(error);
            return Err(());
        }
    };

    let attrs = container_attrs(cx, &input, what)?;

    let Data::Struct(data) = &input.data else {
        cx.spanned(
            &input.ident,
            format_args!("`{}` can only be derived for structs", what.name()),
        );
        return Err(());
    };

    let fields = fields(cx, data, &attrs, what)?;

    let krate = &attrs.crate_path;
    let ident = &input.ident;

    match what {
        What::Bind => {
            let binds = fields.iter().map(|Field { member, slot, .. }| match slot {
                Slot::Index(index) => quote! {
                    stmt.bind_value(#index, &self.#member)?;
                },
                Slot::Name(name) => quote! {
                    stmt.bind_by_name(#name, &self.#member)?;
                },
            });

            let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

            Ok(quote! {
                #[automatically_derived]
                impl #impl_generics #krate::Bind for #ident #ty_generics #where_clause {
                    #[inline]
                    fn bind(&self, stmt: &mut #krate::Statement<'_>) -> #krate::Result<()> {
                        #(#binds)*
                        ::core::result::Result::Ok(())
                    }
                }
            })
        }
        What::Row => {
            let mut generics = input.generics.clone();

            let lt = match input.generics.lifetimes().next() {
                Some(param) => param.lifetime.clone(),
                None => {
                    let lt = Lifetime::new("'__stmt", Span::call_site());

                    generics.params.push(
                        LifetimeParam {
                            attrs: Vec::new(),
                            lifetime: lt.clone(),
                            colon_token: None,
                            bounds: Punctuated::new(),
                        }
                        .into(),
                    );

                    lt
                }
            };

            let mut reads = Vec::new();

            for Field { member, ty, slot } in &fields {
                match slot {
                    Slot::Index(index) => reads.push(quote! {
                        #member: stmt.get::<#ty>(#index)?
                    }),
                    Slot::Name(name) => {
                        cx.spanned(name, "named fields are not supported when deriving `Row`");
                    }
                }
            }

            let (impl_generics, _, _) = generics.split_for_impl();
            let (_, ty_generics, where_clause) = input.generics.split_for_impl();

            Ok(quote! {
                #[automatically_derived]
                impl #impl_generics #krate::Row<#lt> for #ident #ty_generics #where_clause {
                    #[inline]
                    fn from_row(stmt: &#lt #krate::Statement<'_>) -> #krate::Result<Self> {
                        ::core::result::Result::Ok(Self { #(#reads),* })
                    }
                }
            })
        }
    }
}

fn container_attrs(cx: &Ctxt, input: &DeriveInput, what: What) -> Result<Attrs, ()> {
    let mut attrs = Attrs {
        crate_path: syn::parse_quote!(::sqlt),
        named: false,
    };

    for attr in &input.attrs {
        if !attr.path().is_ident("sql") {
            continue;
        }

        let result = attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("crate") {
                attrs.crate_path = meta.value()?.parse()?;
                return Ok(());
            }

            if meta.path.is_ident("named") {
                attrs.named = true;
                return Ok(());
            }

            Err(meta.error(format_args!(
                "unknown container attribute for `{}` derive",
                what.name()
            )))
        });

        if let Err(error) = result {
            cx.error(error);
            return Err(());
        }
    }

    Ok(attrs)
}

fn fields(cx: &Ctxt, data: &DataStruct, attrs: &Attrs, what: What) -> Result<Vec<Field>, ()> {
    let mut out = Vec::new();
    let mut next = what.first_index();

    for (position, field) in data.fields.iter().enumerate() {
        let mut name = None::<LitStr>;

        for attr in &field.attrs {
            if !attr.path().is_ident("sql") {
                continue;
            }

            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("index") {
                    next = meta.value()?.parse::<LitInt>()?.base10_parse::<i32>()?;
                    return Ok(());
                }

                if meta.path.is_ident("name") {
                    if name.is_some() {
                        return Err(meta.error("duplicate `name` attribute"));
                    }

                    name = Some(meta.value()?.parse()?);
                    return Ok(());
                }

                Err(meta.error(format_args!(
                    "unknown field attribute for `{}` derive",
                    what.name()
                )))
            });

            if let Err(error) = result {
                cx.error(error);
                return Err(());
            }
        }

        if name.is_none() && attrs.named && matches!(what, What::Bind) {
            match &field.ident {
                Some(ident) => {
                    name = Some(LitStr::new(&format!(":{ident}"), ident.span()));
                }
                None => {
                    cx.spanned(field, "`named` requires a struct with named fields");
                    continue;
                }
            }
        }

        let slot = match name {
            Some(name) => Slot::Name(name),
            None => {
                if next < what.first_index() {
                    cx.spanned(
                        field,
                        format_args!(
                            "index {next} is out of range, the first index is {}",
                            what.first_index()
                        ),
                    );
                    continue;
                }

                let index = next;
                next = next.saturating_add(1);
                Slot::Index(index)
            }
        };

        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(position)),
        };

        out.push(Field {
            member,
            ty: field.ty.clone(),
            slot,
        });
    }

    Ok(out)
}
