//! User — the account that owns sleep records and follow edges.
//!
//! A user holds only identity metadata. Everything interesting about them is
//! reachable through their sleep records and their side of the follow graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, store::SleepStore};

/// Display-name length bounds, enforced on the single create path.
pub const NAME_MIN_LEN: usize = 2;
pub const NAME_MAX_LEN: usize = 100;

/// An account. Owns zero or more sleep records (destroyed with the user) and
/// participates in follow edges on either side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:    Uuid,
  pub name:       String,
  pub created_at: DateTime<Utc>,
}

/// Check the display-name bounds: non-blank, 2 to 100 characters.
pub fn validate_name(name: &str) -> Result<()> {
  if name.trim().is_empty() {
    return Err(Error::InvalidName("must be filled"));
  }
  let len = name.chars().count();
  if len < NAME_MIN_LEN {
    return Err(Error::InvalidName("must be at least 2 characters long"));
  }
  if len > NAME_MAX_LEN {
    return Err(Error::InvalidName("must be at most 100 characters long"));
  }
  Ok(())
}

/// Create a user. The name bound is enforced here and nowhere else; the
/// store persists whatever this function hands it.
pub async fn create<S: SleepStore>(store: &S, name: String) -> Result<User> {
  validate_name(&name)?;
  store.add_user(name).await
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn accepts_names_within_bounds() {
    assert!(validate_name("Al").is_ok());
    assert!(validate_name("Alice Liddell").is_ok());
    assert!(validate_name(&"x".repeat(100)).is_ok());
  }

  #[test]
  fn rejects_blank_name() {
    assert!(matches!(
      validate_name("   "),
      Err(Error::InvalidName("must be filled"))
    ));
  }

  #[test]
  fn rejects_single_character_name() {
    assert!(matches!(validate_name("A"), Err(Error::InvalidName(_))));
  }

  #[test]
  fn rejects_overlong_name() {
    assert!(matches!(
      validate_name(&"x".repeat(101)),
      Err(Error::InvalidName(_))
    ));
  }
}
