//! Helper macro generating port error enums.
//!
//! Each variant gets a `thiserror` message and a snake_case constructor whose
//! fields accept anything convertible into the declared type.

macro_rules! define_port_error {
    (@ctor $variant:ident) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]() -> Self {
                Self::$variant
            }
        }
    };

    (@ctor $variant:ident { $($field:ident : $ty:ty),* $(,)? }) => {
        define_port_error!(@ctor_impl $variant () () $( $field : $ty, )*);
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) ) => {
        ::paste::paste! {
            pub fn [<$variant:snake>]($($params)*) -> Self {
                Self::$variant { $($inits)* }
            }
        }
    };

    (@ctor_impl $variant:ident ($($params:tt)*) ($($inits:tt)*) $field:ident : $ty:ty, $($rest:tt)*) => {
        define_port_error!(
            @ctor_impl
            $variant
            ($($params)* $field: impl Into<$ty>,)
            ($($inits)* $field: $field.into(),)
            $($rest)*
        );
    };
    (
        $(#[$outer:meta])*
        pub enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident $( { $($field:ident : $ty:ty),* $(,)? } )? => $message:expr
            ),* $(,)?
        }
    ) => {
        $(#[$outer])*
        #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
        pub enum $name {
            $(
                $(#[$variant_meta])*
                #[error($message)]
                $variant $( { $($field : $ty),* } )?,
            )*
        }

        impl $name {
            $(
                define_port_error!(@ctor $variant $( { $($field : $ty),* } )?);
            )*
        }
    };
}

pub(crate) use define_port_error;

#[cfg(test)]
mod tests {
    //! Constructors generated by `define_port_error!`.
    define_port_error! {
        pub enum ExamplePortError {
            Unreachable => "store unreachable",
            Rejected { reason: String } => "rejected: {reason}",
            Limit { bytes: usize } => "limit: {bytes}",
            Slot { key: String, attempt: u32 } => "slot {key} (attempt {attempt})",
        }
    }

    #[test]
    fn unit_variants_get_nullary_constructors() {
        assert_eq!(ExamplePortError::unreachable(), ExamplePortError::Unreachable);
        assert_eq!(ExamplePortError::unreachable().to_string(), "store unreachable");
    }

    #[test]
    fn constructors_accept_str_for_string_fields() {
        let err = ExamplePortError::rejected("listing claimed");
        assert_eq!(err.to_string(), "rejected: listing claimed");
    }

    #[test]
    fn constructors_preserve_non_string_types() {
        let err = ExamplePortError::limit(5_usize);
        assert_eq!(err.to_string(), "limit: 5");
    }

    #[test]
    fn constructors_support_mixed_fields() {
        let err = ExamplePortError::slot("a.png", 2_u32);
        assert_eq!(err.to_string(), "slot a.png (attempt 2)");
    }
}
