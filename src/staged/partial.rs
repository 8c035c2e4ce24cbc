//! The `partial!` macro: per-type partial structs with named setters.
//!
//! ```rust,ignore
//! drydock::partial! {
//!     #[derive(Debug)]
//!     pub struct InfoPartial {
//!         pub author: String,
//!         pub year: u16,
//!     }
//! }
//! ```
//!
//! expands to a struct whose fields are `Option<Field<_>>`, a `Default` impl,
//! and for every field `f`:
//!
//! - `with_f(value)`: by-value setter for seeding defaults
//! - `set_f(value)`: in-place setter, usable through a `Builder`
//! - `nest_f(builder)`: store a nested builder in the field
//! - `clear_f()`: unset the field
//!
//! plus a shallow `merge` that overlays the set fields of another partial.

/// Declare a partial struct. See the [module docs](crate::staged::partial).
#[macro_export]
macro_rules! partial {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Default)]
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: ::std::option::Option<$crate::staged::Field<$ty>>,
            )*
        }

        $crate::__paste! {
            #[allow(dead_code)]
            impl $name {
                $(
                    #[doc = concat!("Set `", stringify!($field), "` to a plain value.")]
                    pub fn [<with_ $field>](mut self, value: impl ::std::convert::Into<$ty>) -> Self {
                        self.$field = ::std::option::Option::Some(
                            $crate::staged::Field::Plain(value.into()),
                        );
                        self
                    }

                    #[doc = concat!("Set `", stringify!($field), "` to a plain value in place.")]
                    pub fn [<set_ $field>](&mut self, value: impl ::std::convert::Into<$ty>) -> &mut Self {
                        self.$field = ::std::option::Option::Some(
                            $crate::staged::Field::Plain(value.into()),
                        );
                        self
                    }

                    #[doc = concat!("Store a builder in `", stringify!($field), "`, assembled when the field is read.")]
                    pub fn [<nest_ $field>]<B>(&mut self, builder: B) -> &mut Self
                    where
                        B: $crate::staged::Assemble<Output = $ty> + 'static,
                    {
                        self.$field = ::std::option::Option::Some(
                            $crate::staged::Field::nested(builder),
                        );
                        self
                    }

                    #[doc = concat!("Unset `", stringify!($field), "`.")]
                    pub fn [<clear_ $field>](&mut self) -> &mut Self {
                        self.$field = ::std::option::Option::None;
                        self
                    }
                )*

                /// Overlay every field set in `other` onto `self`.
                ///
                /// Fields are replaced whole; nested partials are not merged.
                pub fn merge(&mut self, other: Self) -> &mut Self {
                    $(
                        if other.$field.is_some() {
                            self.$field = other.$field;
                        }
                    )*
                    self
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::staged::{AssembleResult, Assemble, Buildable, Field, MissingFieldError};

    #[derive(Debug, Clone, PartialEq)]
    struct Info {
        author: String,
        year: u16,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Record {
        name: String,
        info: Info,
    }

    crate::partial! {
        #[derive(Debug)]
        struct InfoPartial {
            author: String,
            year: u16,
        }
    }

    crate::partial! {
        #[derive(Debug)]
        struct RecordPartial {
            name: String,
            info: Info,
        }
    }

    impl Buildable for Info {
        type Partial = InfoPartial;

        fn assemble_from(src: &InfoPartial) -> AssembleResult<Self> {
            Ok(Info {
                author: crate::required!(src, author)?,
                year: crate::required!(src, year)?,
            })
        }
    }

    impl Buildable for Record {
        type Partial = RecordPartial;

        fn assemble_from(src: &RecordPartial) -> AssembleResult<Self> {
            Ok(Record {
                name: crate::required!(src, name)?,
                info: crate::required!(src, info)?,
            })
        }
    }

    #[test]
    fn test_setters_fill_fields() {
        let partial = InfoPartial::default().with_author("a").with_year(2018_u16);
        assert!(partial.author.as_ref().is_some_and(|f| *f == "a".to_string()));
        assert!(partial.year.as_ref().is_some_and(|f| *f == 2018));
    }

    #[test]
    fn test_nested_builder_assembles() {
        let mut record = Record::builder();
        record.set_name("x");
        record.nest_info(Info::builder_with(
            InfoPartial::default().with_author("a").with_year(2018_u16),
        ));

        assert!(record.info.as_ref().is_some_and(Field::is_builder));
        assert_eq!(
            record.assemble().unwrap(),
            Record {
                name: "x".to_string(),
                info: Info {
                    author: "a".to_string(),
                    year: 2018
                }
            }
        );
    }

    #[test]
    fn test_nested_missing_field_is_reported_from_inner_builder() {
        let mut record = Record::builder();
        record.set_name("x");
        record.nest_info(Info::builder_with(InfoPartial::default().with_author("a")));

        assert_eq!(
            record.assemble().unwrap_err(),
            MissingFieldError::new("year")
        );
    }

    #[test]
    fn test_plain_nested_value_is_used_as_is() {
        let mut record = Record::builder();
        record.set_name("x").set_info(Info {
            author: "a".to_string(),
            year: 1999,
        });

        assert!(!record.info.as_ref().is_some_and(Field::is_builder));
        assert_eq!(record.assemble().unwrap().info.year, 1999);
    }

    #[test]
    fn test_clear_makes_field_absent() {
        let mut info = Info::builder_with(InfoPartial::default().with_author("a").with_year(1_u16));
        info.clear_author();

        assert_eq!(info.assemble().unwrap_err().field(), "author");
    }

    #[test]
    fn test_merge_is_shallow() {
        let mut base = InfoPartial::default().with_author("a").with_year(1_u16);
        base.merge(InfoPartial::default().with_year(2_u16));

        let info = Info::builder_with(base).assemble().unwrap();
        assert_eq!(info.author, "a");
        assert_eq!(info.year, 2);
    }
}
