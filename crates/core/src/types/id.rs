//! Typed primary keys.
//!
//! Every table uses a `SERIAL` key, so each ID wraps an `i32`. Distinct types
//! keep a `CartItemId` from being passed where a `ProductId` is expected.

macro_rules! entity_ids {
    ($($(#[$meta:meta])* $name:ident;)+) => {
        $(
            $(#[$meta])*
            #[derive(
                Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
                serde::Serialize, serde::Deserialize,
            )]
            #[cfg_attr(feature = "postgres", derive(sqlx::Type), sqlx(transparent))]
            #[serde(transparent)]
            pub struct $name(i32);

            impl $name {
                #[must_use]
                pub const fn new(id: i32) -> Self {
                    Self(id)
                }

                #[must_use]
                pub const fn as_i32(self) -> i32 {
                    self.0
                }
            }

            impl core::fmt::Display for $name {
                fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                    core::fmt::Display::fmt(&self.0, f)
                }
            }

            impl From<i32> for $name {
                fn from(id: i32) -> Self {
                    Self(id)
                }
            }

            impl From<$name> for i32 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }
        )+
    };
}

entity_ids! {
    /// A shopper or admin account.
    UserId;
    /// An issued bearer token row.
    ApiTokenId;
    CategoryId;
    ProductId;
    /// One line in a user's cart.
    CartItemId;
    OrderId;
    /// One line of a placed order.
    OrderItemId;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_bare_json_numbers() {
        assert_eq!(serde_json::to_string(&ProductId::new(42)).unwrap(), "42");

        let parsed: CartItemId = serde_json::from_str("7").unwrap();
        assert_eq!(parsed, CartItemId::new(7));
        assert!(serde_json::from_str::<OrderId>("\"7\"").is_err());
    }

    #[test]
    fn test_display_and_conversion() {
        let id = OrderId::from(9);
        assert_eq!(id.to_string(), "9");
        assert_eq!(i32::from(id), 9);
        assert_eq!(format!("{:>3}", UserId::new(5)), "  5");
    }
}
