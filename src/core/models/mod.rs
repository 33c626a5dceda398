use serde::{Deserialize, Deserializer};

pub mod billing;
pub mod report;
pub mod roster;
pub mod usage;

/// Reads an explicit `null` as the type's default, so a null counter decodes as 0.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
