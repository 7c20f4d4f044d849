//! Macros for defining models.

/// Defines a unit struct implementing [`crate::entity::Model`] together with a
/// constant per column name.
///
/// ```
/// use sqldb::{define_model, entity::Model};
///
/// define_model!(
///     User {
///         table: "users",
///         keys: ["Id"],
///         columns: {
///             ID => "Id",
///             NAME => "Name",
///         }
///     }
/// );
///
/// assert_eq!(User::TABLE, "users");
/// assert_eq!(User::KEYS, &["Id"]);
/// assert_eq!(User::NAME, "Name");
/// ```
#[macro_export]
macro_rules! define_model {
    (
        $model:ident {
            table: $table:literal,
            keys: [$($key:literal),+ $(,)?],
            columns: {
                $($col_name:ident => $db_col:literal),* $(,)?
            }
        }
    ) => {
        #[derive(Clone, Copy, Debug, Default)]
        pub struct $model;

        impl $crate::entity::Model for $model {
            const TABLE: &'static str = $table;
            const KEYS: &'static [&'static str] = &[$($key),+];
        }

        #[allow(dead_code)]
        impl $model {
            $(
                pub const $col_name: &'static str = $db_col;
            )*
        }
    };
}
