use anyhow::bail;
use async_trait::async_trait;
use uuid::Uuid;

/// An entity stored as a whole, updated through a column patch.
pub trait AggregateRoot: Send + Sync + 'static {
    type UpdateEntity: Send + 'static;
}

/// One column of an update patch.
#[derive(Debug, Clone, PartialEq)]
pub enum DbField<T> {
    /// Write this value.
    Set(T),
    /// Known current value, used as a key or for optimistic checks.
    Unchanged(T),
    /// Leave the column alone.
    NotSet,
}

impl<T> Default for DbField<T> {
    fn default() -> Self {
        Self::NotSet
    }
}

impl<T> DbField<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Set(v) | Self::Unchanged(v) => Some(v),
            Self::NotSet => None,
        }
    }

    /// The value to write, if any.
    pub fn into_set(self) -> Option<T> {
        match self {
            Self::Set(v) => Some(v),
            _ => None,
        }
    }
}

#[async_trait]
pub trait ReadOnlyRepository<T: AggregateRoot>: Send + Sync {
    async fn get_by_id(&self, _id: Uuid) -> anyhow::Result<T> {
        bail!("get_by_id is not supported by this repository")
    }
}

#[async_trait]
pub trait MutableRepository<T: AggregateRoot>: Send + Sync {
    async fn update(&self, _entity: T::UpdateEntity) -> anyhow::Result<()> {
        bail!("update is not supported by this repository")
    }

    async fn insert(&self, _entity: &T) -> anyhow::Result<Uuid> {
        bail!("insert is not supported by this repository")
    }

    /// Commit point of the unit of work.
    async fn save_changed(&self) -> anyhow::Result<bool> {
        Ok(true)
    }
}

pub trait DBRepository<T: AggregateRoot>: ReadOnlyRepository<T> + MutableRepository<T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_set_fields_are_written() {
        assert_eq!(DbField::Set(1).into_set(), Some(1));
        assert_eq!(DbField::Unchanged(1).into_set(), None);
        assert_eq!(DbField::Unchanged(1).value(), Some(&1));
        assert_eq!(DbField::<i32>::default().value(), None);
    }
}
