// schema
/// Declare a shared schema as a `LazyLock` static.
///
/// ```ignore
/// schema! {
///     pub static TELESCOPE = "TelescopeContainer" {
///         Field::new("image", Vec::<Value>::new()).description("pixel amplitudes"),
///         Field::new("peak_time", -1.0).unit(Unit::new("ns")),
///     }
/// }
///
/// schema! {
///     pub static EVENT = "EventContainer": TELESCOPE {
///         Field::new("event_id", -1),
///     }
/// }
/// ```
#[macro_export]
macro_rules! schema {
    (
        $vis:vis static $name:ident = $type_name:literal $( : $parent:path )? {
            $( $field:expr ),* $(,)?
        }
    ) => {
        $vis static $name: ::std::sync::LazyLock<::std::sync::Arc<$crate::schema::Schema>> =
            ::std::sync::LazyLock::new(|| {
                let builder = $crate::schema::Schema::builder($type_name);
                $( let builder = builder.extends(&$parent); )?
                $( let builder = builder.field($field); )*
                builder.build().expect("schema declaration must be valid")
            });
    };
}
