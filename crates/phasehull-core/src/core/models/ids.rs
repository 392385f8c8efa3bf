use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    pub struct CandidateHandle;
}

macro_rules! index_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

index_id!(
    /// Position of an endpoint in the configured endpoint list.
    EndpointId,
    "endpoint#"
);
index_id!(
    /// Registration order of an accepted entry. Never reused.
    EntryId,
    "entry#"
);
index_id!(
    /// Index of a point in the point set of one particular hull build.
    HullPointId,
    "point#"
);
