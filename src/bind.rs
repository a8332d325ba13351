use crate::bind_value::BindValue;
use crate::error::Result;
use crate::statement::Statement;
use crate::utils::repeat;

/// Structured binding of several parameters into a [`Statement`] through
/// [`Statement::bind`].
///
/// Parameters are bound by position, starting at index 1. This is implemented
/// for tuples of [`BindValue`] types, and can be implemented for structs
/// through the [`Bind` derive].
///
/// [`Bind` derive]: derive@crate::Bind
///
/// # Examples
///
/// ```
/// use sqlt::{Bind, Connection};
///
/// #[derive(Bind)]
/// struct Binding<'a> {
///     name: &'a str,
///     age: u32,
/// }
///
/// let c = Connection::open_in_memory()?;
///
/// c.execute(r#"
///     CREATE TABLE users (name TEXT, age INTEGER);
///     INSERT INTO users VALUES ('Alice', 42);
///     INSERT INTO users VALUES ('Bob', 72);
/// "#)?;
///
/// let mut stmt = c.prepare("SELECT name, age FROM users WHERE name = ? AND age = ?")?;
/// stmt.bind(Binding { name: "Bob", age: 72 })?;
///
/// assert_eq!(stmt.next::<(String, u32)>()?, Some(("Bob".to_string(), 72)));
/// assert_eq!(stmt.next::<(String, u32)>()?, None);
/// # Ok::<_, sqlt::Error>(())
/// ```
pub trait Bind {
    /// Bind this value into the given [`Statement`].
    fn bind(&self, stmt: &mut Statement<'_>) -> Result<()>;
}

impl<T> Bind for &T
where
    T: ?Sized + Bind,
{
    #[inline]
    fn bind(&self, stmt: &mut Statement<'_>) -> Result<()> {
        (**self).bind(stmt)
    }
}

/// [`Bind`] implementation which binds nothing.
///
/// # Examples
///
/// ```
/// use sqlt::Connection;
///
/// let c = Connection::open_in_memory()?;
/// c.execute("CREATE TABLE config (key TEXT, value TEXT)")?;
///
/// let mut insert = c.prepare_with("INSERT INTO config VALUES ('version', '1.0.0')", ())?;
/// assert!(insert.execute()?.is_done());
/// # Ok::<_, sqlt::Error>(())
/// ```
impl Bind for () {
    #[inline]
    fn bind(&self, _: &mut Statement<'_>) -> Result<()> {
        Ok(())
    }
}

macro_rules! implement_tuple {
    ($ty0:ident $var0:ident $column0:literal $index0:literal $(, $ty:ident $var:ident $column:literal $index:literal)* $(,)?) => {
        /// [`Bind`] implementation for a tuple.
        ///
        /// Elements are bound one after another starting from index 1.
        impl<$ty0, $($ty,)*> Bind for ($ty0, $($ty,)*)
        where
            $ty0: BindValue,
            $($ty: BindValue,)*
        {
            #[inline]
            fn bind(&self, stmt: &mut Statement<'_>) -> Result<()> {
                let ($var0, $($var,)*) = self;
                stmt.bind_value($index0, $var0)?;
                $(stmt.bind_value($index, $var)?;)*
                Ok(())
            }
        }
    };
}

repeat!(implement_tuple);
