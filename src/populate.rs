/*!
Mapping named columns onto the fields of a struct.

A type opts into population by implementing [`Populate`](trait.Populate.html),
which lists the type's tagged fields as pairs of a column name and a setter.
The list is a constant, so it is built once per type rather than discovered
at runtime. Fields that are not listed are never touched.

The [`populate_fields!`](../macro.populate_fields.html) macro writes the
implementation for you:

```
use csv_scanner::populate_fields;

#[derive(Debug, Default)]
struct Person {
    name: String,
    age: i64,
    height: f64,
    // Not tagged, so never populated.
    notes: String,
}

populate_fields!(Person {
    name => "first_name",
    age => "age",
    height => "height",
});
```
*/

/// A single tagged field of a type `T`: the column it is populated from,
/// and how to assign raw column text to it.
pub struct Field<T> {
    /// The header name of the column this field is populated from.
    pub column: &'static str,
    /// Coerce the raw text and assign it to the field.
    ///
    /// Returns `false`, leaving the field unchanged, if the text could not
    /// be coerced to the field's type.
    pub set: fn(&mut T, &str) -> bool,
}

/// A type whose fields can be populated from named columns.
///
/// Implement this with the `populate_fields!` macro, or by hand when a
/// field needs custom handling.
///
/// # Example
///
/// ```
/// use csv_scanner::{Field, Populate};
///
/// #[derive(Default)]
/// struct Flag {
///     on: bool,
/// }
///
/// impl Populate for Flag {
///     const FIELDS: &'static [Field<Flag>] = &[Field {
///         column: "enabled",
///         set: |flag, raw| match raw {
///             "yes" => { flag.on = true; true }
///             "no" => { flag.on = false; true }
///             _ => false,
///         },
///     }];
/// }
/// ```
pub trait Populate: Sized + 'static {
    /// Every tagged field of this type, in declaration order.
    const FIELDS: &'static [Field<Self>];
}

/// Best effort conversion of raw column text to a field's type.
///
/// Returns `None` when the text cannot be converted, in which case the field
/// is left as it was.
pub trait FromField: Sized {
    /// Convert `raw` to a value of this type.
    fn from_field(raw: &str) -> Option<Self>;
}

impl FromField for String {
    fn from_field(raw: &str) -> Option<String> {
        Some(raw.to_owned())
    }
}

/// An empty column becomes `None`. Otherwise, the text must convert to `T`.
impl<T: FromField> FromField for Option<T> {
    fn from_field(raw: &str) -> Option<Option<T>> {
        if raw.is_empty() {
            return Some(None);
        }
        T::from_field(raw).map(Some)
    }
}

macro_rules! from_field_parse {
    ($($ty:ty),*) => {
        $(
            impl FromField for $ty {
                fn from_field(raw: &str) -> Option<$ty> {
                    raw.parse().ok()
                }
            }
        )*
    }
}

from_field_parse!(i8, i16, i32, i64, i128, isize);
from_field_parse!(u8, u16, u32, u64, u128, usize);
from_field_parse!(f32, f64);

/// Implement `Populate` for a struct by tagging its fields with column names.
///
/// Each entry is `field => "column"`. A field may be of any type that
/// implements `FromField`: `String`, the primitive integers, `f32`, `f64`
/// and `Option`s of those. Several fields may share one column.
///
/// # Example
///
/// ```
/// use csv_scanner::{populate_fields, StructScanner};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Row {
///     name: String,
///     age: i64,
///     height: f64,
/// }
///
/// populate_fields!(Row {
///     name => "first_name",
///     age => "age",
///     height => "height",
/// });
///
/// # fn main() -> csv_scanner::Result<()> {
/// let data = "first_name,height,age\nJim,4.2,18\n";
/// let mut scanner = StructScanner::from_reader(data.as_bytes())?;
/// assert!(scanner.advance());
///
/// let mut row = Row::default();
/// scanner.populate(&mut row)?;
/// assert_eq!(row, Row { name: "Jim".to_string(), age: 18, height: 4.2 });
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! populate_fields {
    ($ty:ty { $($field:ident => $column:expr),* $(,)* }) => {
        impl $crate::Populate for $ty {
            const FIELDS: &'static [$crate::Field<$ty>] = &[
                $(
                    $crate::Field {
                        column: $column,
                        set: |target: &mut $ty, raw: &str| -> bool {
                            match $crate::FromField::from_field(raw) {
                                Some(value) => {
                                    target.$field = value;
                                    true
                                }
                                None => false,
                            }
                        },
                    },
                )*
            ];
        }
    };
}
