//! # Declaration Macros
//!
//! Resource types are declared, not reflected over. Two macros generate the
//! per-type glue once, at compile time:
//!
//! - [`redfish_resource!`](crate::redfish_resource) implements [`Resource`](crate::Resource)
//!   for a struct with an `entity: Entity` field and emits the typed
//!   `get_<type>` / `list_referenced_<plural>` accessors.
//! - [`updatable!`](crate::updatable) implements [`Updatable`](crate::Updatable) from
//!   a list of `"WireName" => field` pairs: `MUTABLE_FIELDS` and a field-by-field
//!   `diff_against`.
//!
//! ```rust
//! use redfish_common::{redfish_resource, updatable, Entity, Updatable};
//! use serde::Deserialize;
//!
//! #[derive(Debug, Clone, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! pub struct PowerSupply {
//!     #[serde(flatten)]
//!     entity: Entity,
//!     #[serde(default)]
//!     power_capacity_watts: f64,
//!     #[serde(default)]
//!     hot_pluggable: bool,
//! }
//!
//! redfish_resource!(PowerSupply, power_supplies);
//! updatable!(PowerSupply {
//!     "HotPluggable" => hot_pluggable,
//! });
//!
//! assert_eq!(PowerSupply::MUTABLE_FIELDS, &["HotPluggable"]);
//! // Generated: get_power_supply(&client, uri) and list_referenced_power_supplies(&client, link)
//! ```

/// Implement [`Resource`](crate::Resource) and the typed accessors for a resource struct.
///
/// The struct must have a field named `entity` of type [`Entity`](crate::Entity).
#[macro_export]
macro_rules! redfish_resource {
    ($ty:ident, $plural:ident) => {
        impl $crate::Resource for $ty {
            fn entity(&self) -> &$crate::Entity {
                &self.entity
            }

            fn entity_mut(&mut self) -> &mut $crate::Entity {
                &mut self.entity
            }
        }

        $crate::__private::paste::paste! {
            /// Fetch one resource of this type from the service.
            #[allow(dead_code)]
            pub async fn [<get_ $ty:snake>](
                client: &$crate::ServiceClient,
                uri: &str,
            ) -> $crate::Result<$ty> {
                $crate::get::<$ty>(client, uri).await
            }

            /// Resolve every resource of this type referenced by the collection at `link`.
            #[allow(dead_code)]
            pub async fn [<list_referenced_ $plural>](
                client: &$crate::ServiceClient,
                link: &str,
            ) -> (Vec<$ty>, Option<$crate::CollectionError>) {
                $crate::list_referenced::<$ty>(client, link).await
            }
        }
    };
}

/// Implement [`Updatable`](crate::Updatable) from `"WireName" => field` pairs.
///
/// Each listed field is compared with `!=` against the decoded snapshot; the
/// field types must be `PartialEq + Serialize`.
#[macro_export]
macro_rules! updatable {
    ($ty:ty { $($wire:literal => $field:ident),* $(,)? }) => {
        impl $crate::Updatable for $ty {
            const MUTABLE_FIELDS: &'static [&'static str] = &[$($wire),*];

            fn diff_against(&self, original: &Self) -> $crate::Result<$crate::Payload> {
                #[allow(unused_mut)]
                let mut payload = $crate::Payload::new();
                $(
                    if self.$field != original.$field {
                        let value = $crate::__private::serde_json::to_value(&self.$field)
                            .map_err(|source| $crate::Error::Encode { field: $wire, source })?;
                        payload.insert($wire.to_string(), value);
                    }
                )*
                Ok(payload)
            }
        }
    };
}
